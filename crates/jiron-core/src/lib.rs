//! Sync orchestration and story-point aggregation on top of the Jira client
//! and the local snapshot store.

pub mod chart;
pub mod config;
pub mod error;
pub mod sync;

pub use chart::{build_chart, story_points_chart, ChartData, Dataset, LABEL_FORMAT};
pub use config::Config;
pub use error::{Result, SyncError};
pub use sync::{SyncReport, SyncService, SyncTarget};
