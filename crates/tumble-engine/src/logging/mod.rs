//! Logging utilities.
//!
//! This module centralizes logger initialization. Code throughout the
//! workspace logs through the `log` facade; `env_logger` is the backend.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
