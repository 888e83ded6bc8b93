//! Infrastructure adapters for config, logging, prompting, and scratch files.

pub mod config;
pub mod logging;
pub mod prompt;
pub mod scratch;
