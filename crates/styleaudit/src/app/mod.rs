//! Application layer orchestrating the audit pipeline and the config patcher.

pub mod audit;
pub mod comments;
pub mod patch;
pub mod presence;
pub mod prune;
pub mod report;
pub mod selectors;
