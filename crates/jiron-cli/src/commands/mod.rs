pub mod chart;
pub mod helpers;
pub mod issues;
pub mod sprint;
pub mod sync;
