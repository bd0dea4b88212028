use miette::Diagnostic;
use soak_client::ClientError;
use thiserror::Error;

/// Error raised by one probe iteration
#[derive(Error, Debug, Diagnostic)]
pub enum ProbeError {
    /// Cluster client failure
    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),

    /// The target table has no regions to act on
    #[error("Table '{table}' has no regions")]
    #[diagnostic(
        code(soak::probe::no_regions),
        help("Verify the table exists and has been assigned at least one region")
    )]
    NoRegions {
        #[allow(unused)]
        table: String,
    },

    /// Every live server already hosts the region; there is nowhere to move it
    #[error("No viable destination server for region of table '{table}': '{current}' is the only live server")]
    #[diagnostic(
        code(soak::probe::no_viable_server),
        help("The region-move probe needs at least two live servers to exercise reassignment")
    )]
    NoViableServer {
        #[allow(unused)]
        table: String,
        #[allow(unused)]
        current: String,
    },
}

/// Result type alias for probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    pub fn no_regions(table: impl Into<String>) -> Self {
        Self::NoRegions {
            table: table.into(),
        }
    }

    pub fn no_viable_server(table: impl Into<String>, current: impl Into<String>) -> Self {
        Self::NoViableServer {
            table: table.into(),
            current: current.into(),
        }
    }

    /// Whether the failure is expected to clear on its own. Only the
    /// not-being-served condition qualifies; everything else is fatal to the
    /// driver.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_not_serving())
    }
}
