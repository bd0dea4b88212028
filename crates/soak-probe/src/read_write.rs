use crate::error::ProbeError;
use crate::runner::Probe;
use crate::timestamp_now;
use async_trait::async_trait;
use soak_client::TableStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed row the probe writes and reads back
pub const PROBE_ROW_KEY: &str = "probe-row";

/// Fixed column ("family:qualifier") the probe writes
pub const PROBE_COLUMN: &str = "info:column";

/// Start key of the bounded scan
pub const SCAN_START_ROW: &str = "row3";

/// Writes the current timestamp to a fixed row, reads it back, and runs two
/// scans against the target table, logging every returned row.
pub struct ReadWriteProbe {
    client: Arc<dyn TableStore>,
    table: String,
}

impl ReadWriteProbe {
    pub fn new(client: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl Probe for ReadWriteProbe {
    fn name(&self) -> &str {
        "read-write"
    }

    async fn execute(&mut self) -> Result<String, ProbeError> {
        let now = timestamp_now();

        self.client
            .put_cell(&self.table, PROBE_ROW_KEY, PROBE_COLUMN, &now)
            .await?;

        match self.client.get_row(&self.table, PROBE_ROW_KEY).await? {
            Some(row) => info!("Get: {:?}", row),
            None => warn!("Get: row '{}' missing immediately after put", PROBE_ROW_KEY),
        }

        for row in self.client.scan(&self.table, None).await? {
            info!("Scan: {:?}", row);
        }

        for row in self.client.scan(&self.table, Some(SCAN_START_ROW)).await? {
            info!("Scan: {:?}", row);
        }

        Ok(format!(
            "wrote '{}' to {}/{}",
            now, self.table, PROBE_ROW_KEY
        ))
    }
}
