pub mod cache;
pub mod indicators;
pub mod insights;
pub mod report;
pub mod sentiment;
pub mod technical;
