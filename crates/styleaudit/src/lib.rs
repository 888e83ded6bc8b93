pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

/// Install the stderr log subscriber at the requested verbosity.
pub fn init(verbosity: u8) {
    infra::logging::init(verbosity);
}
