use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one storage server in the cluster, e.g. "rs-03.example.com:16020"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerName(pub String);

impl ServerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where one region of a table currently lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionLocation {
    /// Encoded region name, stable across moves
    pub region: String,
    /// Server currently hosting the region
    pub server: ServerName,
}

/// One cell of a row: "family:qualifier" column plus its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub column: String,
    pub value: String,
}

/// A row returned by a point get or a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowResult {
    pub row: String,
    pub cells: Vec<Cell>,
}

/// List envelope the cluster API wraps collection responses in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_name_serializes_transparently() {
        let server = ServerName::new("rs-01:16020");
        let json = serde_json::to_string(&server).unwrap();
        assert_eq!(json, "\"rs-01:16020\"");

        let parsed: ServerName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, server);
    }

    #[test]
    fn test_region_location_round_trip() {
        let loc = RegionLocation {
            region: "d41d8cd98f".to_string(),
            server: ServerName::new("rs-02:16020"),
        };
        let json = serde_json::to_string(&loc).unwrap();
        let parsed: RegionLocation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, loc);
    }
}
