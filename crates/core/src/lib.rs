//! Climate API Core Library
//!
//! Shared plumbing for the API service:
//! - Configuration loading (XDG-compliant)
//! - Common constants

mod config;

pub use config::{find_config_file, load_config, ConfigSource};

/// Application name used for XDG paths
pub const APP_NAME: &str = "climate-api";

/// Default port the API listens on
pub const DEFAULT_API_PORT: u16 = 5000;
