//! Soak Core - Configuration model and target validation for the cluster
//! soak drivers
//!
//! This crate provides:
//! - The cluster client configuration (load, merge, serialize)
//! - Probe target validation
//! - Configuration error types with miette diagnostics

pub mod config;
pub mod error;
pub mod target;

// Re-export commonly used types
pub use config::{
    ClusterConfig, CONFIG_FILE_NAME, CONF_DIR_VAR, SECONDARY_CONF_DIR_VAR,
    SECURITY_AUTHENTICATION, SECURITY_PROPERTIES,
};
pub use error::{ConfigError, Result};
pub use target::DirectoryTarget;
