use miette::Diagnostic;
use thiserror::Error;

/// Configuration error type for driver startup
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    /// Required configuration directory variable is unset
    #[error("Configuration directory variable '{var}' is not set")]
    #[diagnostic(
        code(soak::config::missing_conf_dir),
        help("Export {var} pointing at a directory containing cluster.yaml")
    )]
    MissingConfDir {
        #[allow(unused)]
        var: String,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration file '{path}': {source}")]
    #[diagnostic(
        code(soak::config::io),
        help("Verify the file exists and is readable")
    )]
    Io {
        #[allow(unused)]
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration file '{path}': {source}")]
    #[diagnostic(
        code(soak::config::parse),
        help("The file must be valid YAML with 'nameservices' and 'properties' keys")
    )]
    Parse {
        #[allow(unused)]
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A property the driver depends on is absent from the merged configuration
    #[error("Required property '{key}' is not set in the cluster configuration")]
    #[diagnostic(
        code(soak::config::missing_property),
        help("Add '{key}' to cluster.yaml under 'properties'")
    )]
    MissingProperty {
        #[allow(unused)]
        key: String,
    },

    /// Malformed probe target supplied on the command line
    #[error("Malformed probe target '{target}': {reason}")]
    #[diagnostic(
        code(soak::config::malformed_target),
        help("Directory targets must end with a path separator, e.g. /test/")
    )]
    MalformedTarget {
        #[allow(unused)]
        target: String,
        #[allow(unused)]
        reason: String,
    },

    /// Cluster security is not enabled
    #[error("Security is not enabled for this cluster")]
    #[diagnostic(
        code(soak::config::security_disabled),
        help("Set 'security.authentication: kerberos' in cluster.yaml. These drivers exercise authenticated sessions and refuse to run without one")
    )]
    SecurityDisabled,
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    pub fn missing_conf_dir(var: impl Into<String>) -> Self {
        Self::MissingConfDir { var: var.into() }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn missing_property(key: impl Into<String>) -> Self {
        Self::MissingProperty { key: key.into() }
    }

    pub fn malformed_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }
}
