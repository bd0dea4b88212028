use miette::Diagnostic;
use thiserror::Error;

/// Client error type for cluster operations
#[derive(Error, Debug, Diagnostic)]
pub enum ClientError {
    /// The addressed data unit is momentarily not being served, e.g. a region
    /// mid-reassignment. Callers treat this as transient.
    #[error("Not currently served: {resource}")]
    #[diagnostic(
        code(soak::client::not_serving),
        help("The region or file is mid-reassignment; the condition is expected to clear on its own")
    )]
    NotServing {
        #[allow(unused)]
        resource: String,
    },

    /// The cluster rejected the request
    #[error("Request failed with status {status}: {message}")]
    #[diagnostic(
        code(soak::client::request_failed),
        help("Check the cluster endpoint logs for the failing operation")
    )]
    RequestFailed {
        #[allow(unused)]
        status: u16,
        #[allow(unused)]
        message: String,
    },

    /// The request never reached the cluster, or the connection dropped
    #[error("Transport failure: {message}")]
    #[diagnostic(
        code(soak::client::transport),
        help("Verify the endpoint is reachable and the authenticated session is still valid")
    )]
    Transport {
        #[allow(unused)]
        message: String,
    },

    /// The cluster's response could not be decoded
    #[error("Failed to parse cluster response: {message}")]
    #[diagnostic(
        code(soak::client::parse),
        help("The endpoint may be running an incompatible API version")
    )]
    Parse {
        #[allow(unused)]
        message: String,
    },

    /// Configuration error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] soak_core::ConfigError),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn not_serving(resource: impl Into<String>) -> Self {
        Self::NotServing {
            resource: resource.into(),
        }
    }

    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Whether this failure is the transient not-being-served condition
    pub fn is_not_serving(&self) -> bool {
        matches!(self, Self::NotServing { .. })
    }
}
