//! Core types shared by the audit pipeline and the config patcher.

pub mod errors;
pub mod model;
