//! Process-level plumbing shared by the user records binaries:
//! layered configuration and logging bootstrap.

pub mod config;
pub mod logging;

pub use config::{
    default_logging_config, ApiConfig, AppConfig, CliArgs, EntryMode, LoggingConfig, Section,
    UiConfig,
};
