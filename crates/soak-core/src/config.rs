use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// File name looked up inside each configuration directory
pub const CONFIG_FILE_NAME: &str = "cluster.yaml";

/// Primary configuration directory variable
pub const CONF_DIR_VAR: &str = "SOAK_CONF_DIR";

/// Optional secondary configuration directory variable
pub const SECONDARY_CONF_DIR_VAR: &str = "SOAK_CONF_DIR2";

/// Property holding the authentication mode; must be "kerberos"
pub const SECURITY_AUTHENTICATION: &str = "security.authentication";

/// Security-relevant properties logged at driver startup
pub const SECURITY_PROPERTIES: &[&str] = &[
    SECURITY_AUTHENTICATION,
    "security.rpc.protection",
    "security.master.principal",
    "security.token.autorenewal.enabled",
    "security.token.min-seconds-before-relogin",
];

/// Client configuration for one storage cluster (or several merged ones)
///
/// Mirrors the site-file model the cluster tooling uses: a list of filesystem
/// nameservices plus a flat map of dotted property keys. Per-nameservice keys
/// carry the nameservice as a dotted segment, e.g. `dfs.endpoint.alpha`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Filesystem nameservices this configuration knows about
    #[serde(default)]
    pub nameservices: Vec<String>,
    /// Dotted-key client properties
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl ClusterConfig {
    /// Load the configuration from `<dir>/cluster.yaml`
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        let path_display = path.display().to_string();
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::io(&path_display, e))?;
        let config: ClusterConfig =
            serde_yaml::from_str(&raw).map_err(|e| ConfigError::parse(&path_display, e))?;
        debug!(
            path = %path_display,
            nameservices = config.nameservices.len(),
            properties = config.properties.len(),
            "Loaded cluster configuration"
        );
        Ok(config)
    }

    /// Assemble the configuration from the environment: the primary directory
    /// is required, the secondary optional and merged in when present.
    pub fn load_from_env() -> Result<Self> {
        let primary = std::env::var(CONF_DIR_VAR)
            .map_err(|_| ConfigError::missing_conf_dir(CONF_DIR_VAR))?;
        let mut config = Self::load_from_dir(Path::new(&primary))?;

        if let Ok(secondary) = std::env::var(SECONDARY_CONF_DIR_VAR) {
            let other = Self::load_from_dir(Path::new(&secondary))?;
            config = Self::merge(&config, &other);
        }

        Ok(config)
    }

    /// Combine two cluster configurations into one covering both filesystems.
    ///
    /// The secondary's nameservices are appended to the primary's, and every
    /// secondary `dfs.*` property scoped to one of those nameservices (the
    /// nameservice appears as a dotted key segment) is copied across.
    pub fn merge(primary: &ClusterConfig, secondary: &ClusterConfig) -> ClusterConfig {
        let mut merged = primary.clone();

        for ns in &secondary.nameservices {
            if !merged.nameservices.contains(ns) {
                merged.nameservices.push(ns.clone());
            }

            for (key, value) in &secondary.properties {
                if key.starts_with("dfs.") && key.split('.').any(|segment| segment == ns) {
                    warn!("Adding configuration {}", key);
                    merged.properties.insert(key.clone(), value.clone());
                }
            }
        }

        merged
    }

    /// Look up a property, trimmed
    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|v| v.trim())
    }

    /// Look up a property the caller cannot run without
    pub fn require_property(&self, key: &str) -> Result<&str> {
        self.get_property(key)
            .ok_or_else(|| ConfigError::missing_property(key))
    }

    /// Set a property, replacing any existing value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Remove a property if present
    pub fn remove_property(&mut self, key: &str) {
        self.properties.remove(key);
    }

    /// Whether the cluster requires authenticated sessions
    pub fn security_enabled(&self) -> bool {
        self.get_property(SECURITY_AUTHENTICATION) == Some("kerberos")
    }

    /// Fail fast when security is disabled; the drivers are authentication
    /// exercisers and must not run against an unauthenticated cluster.
    pub fn ensure_security_enabled(&self) -> Result<()> {
        if self.security_enabled() {
            Ok(())
        } else {
            Err(ConfigError::SecurityDisabled)
        }
    }

    /// Serialize the configuration to `path` as a diagnostic artifact.
    /// A pre-existing file at that path is deleted first.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let path_display = path.display().to_string();
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| ConfigError::io(&path_display, e))?;
        }
        let raw = serde_yaml::to_string(self).map_err(|e| ConfigError::parse(&path_display, e))?;
        std::fs::write(path, raw).map_err(|e| ConfigError::io(&path_display, e))?;
        debug!(path = %path_display, "Wrote merged configuration artifact");
        Ok(())
    }
}
