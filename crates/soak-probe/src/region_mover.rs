use crate::error::ProbeError;
use crate::runner::Probe;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use soak_client::{RegionAdmin, ServerName};
use std::sync::Arc;
use tracing::info;

/// Moves one region of the target table to a randomly chosen other live
/// server each iteration. Useful for exercising authentication and client
/// behavior while the addressed data keeps changing hosts.
pub struct RegionMoveProbe<R> {
    client: Arc<dyn RegionAdmin>,
    table: String,
    rng: R,
}

impl<R: Rng + Send> RegionMoveProbe<R> {
    pub fn new(client: Arc<dyn RegionAdmin>, table: impl Into<String>, rng: R) -> Self {
        Self {
            client,
            table: table.into(),
            rng,
        }
    }
}

#[async_trait]
impl<R: Rng + Send> Probe for RegionMoveProbe<R> {
    fn name(&self) -> &str {
        "region-mover"
    }

    async fn execute(&mut self) -> Result<String, ProbeError> {
        let locations = self.client.region_locations(&self.table).await?;
        let location = locations
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::no_regions(&self.table))?;
        let current = location.server;
        info!("Current server {}", current);

        // Membership may change between iterations; re-fetch every time
        let servers = self.client.live_servers().await?;
        let viable: Vec<ServerName> = servers.into_iter().filter(|s| *s != current).collect();

        let destination = viable
            .choose(&mut self.rng)
            .ok_or_else(|| ProbeError::no_viable_server(&self.table, current.as_str()))?
            .clone();
        info!("Next server {}", destination);

        self.client
            .move_region(&location.region, &destination)
            .await?;

        Ok(format!(
            "moved region {} of table '{}' from {} to {}",
            location.region, self.table, current, destination
        ))
    }
}
