//! Configuration utilities

pub mod config;

pub use config::{AppConfig, ConfigError, ConfigResult};
