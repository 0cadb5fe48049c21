pub mod db;
pub mod error;
pub mod migrations;
pub mod models;

pub use db::{format_timestamp, Database, SprintTransaction};
pub use error::{Result, StoreError};
pub use models::{Assignee, Issue, Sprint, StoryPointAggregate};
