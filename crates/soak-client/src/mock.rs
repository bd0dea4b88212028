use crate::error::{ClientError, Result};
use crate::traits::{FileStore, RegionAdmin, TableStore};
use crate::types::{Cell, RegionLocation, RowResult, ServerName};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// In-memory cluster for testing the probes without a live deployment.
///
/// Region moves are applied to the in-memory placement map, so a subsequent
/// location lookup observes the move. Failures can be scripted with
/// [`MockCluster::queue_failure`]; the next operation of any kind pops and
/// returns the queued error instead of acting.
#[derive(Default)]
pub struct MockCluster {
    servers: RwLock<Vec<ServerName>>,
    // table -> region locations
    regions: RwLock<HashMap<String, Vec<RegionLocation>>>,
    // table -> row -> column -> value
    tables: RwLock<HashMap<String, BTreeMap<String, BTreeMap<String, String>>>>,
    // path -> contents
    files: RwLock<HashMap<String, String>>,
    dirs: RwLock<HashSet<String>>,
    moves: RwLock<Vec<(String, ServerName)>>,
    queued_failures: Mutex<VecDeque<ClientError>>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_servers(&self, servers: Vec<ServerName>) {
        *self.servers.write().await = servers;
    }

    pub async fn add_region(&self, table: &str, region: &str, server: ServerName) {
        self.regions
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(RegionLocation {
                region: region.to_string(),
                server,
            });
    }

    /// Script the next operation to fail with `error`
    pub async fn queue_failure(&self, error: ClientError) {
        self.queued_failures.lock().await.push_back(error);
    }

    /// Move commands issued so far, in order
    pub async fn recorded_moves(&self) -> Vec<(String, ServerName)> {
        self.moves.read().await.clone()
    }

    /// Contents of a file, if it exists
    pub async fn file_contents(&self, path: &str) -> Option<String> {
        self.files.read().await.get(path).cloned()
    }

    /// Seed a file directly, bypassing the FileStore surface
    pub async fn seed_file(&self, path: &str, contents: &str) {
        self.files
            .write()
            .await
            .insert(path.to_string(), contents.to_string());
    }

    /// Value of one cell, if present
    pub async fn cell_value(&self, table: &str, row: &str, column: &str) -> Option<String> {
        self.tables
            .read()
            .await
            .get(table)
            .and_then(|rows| rows.get(row))
            .and_then(|cells| cells.get(column))
            .cloned()
    }

    async fn take_failure(&self) -> Result<()> {
        match self.queued_failures.lock().await.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RegionAdmin for MockCluster {
    async fn region_locations(&self, table: &str) -> Result<Vec<RegionLocation>> {
        self.take_failure().await?;
        Ok(self
            .regions
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    async fn live_servers(&self) -> Result<Vec<ServerName>> {
        self.take_failure().await?;
        Ok(self.servers.read().await.clone())
    }

    async fn move_region(&self, region: &str, destination: &ServerName) -> Result<()> {
        self.take_failure().await?;

        let mut regions = self.regions.write().await;
        let location = regions
            .values_mut()
            .flat_map(|locations| locations.iter_mut())
            .find(|location| location.region == region)
            .ok_or_else(|| {
                ClientError::request_failed(404, format!("unknown region '{}'", region))
            })?;

        location.server = destination.clone();
        self.moves
            .write()
            .await
            .push((region.to_string(), destination.clone()));
        debug!("Mock: region {} moved to {}", region, destination);
        Ok(())
    }
}

#[async_trait]
impl TableStore for MockCluster {
    async fn put_cell(&self, table: &str, row: &str, column: &str, value: &str) -> Result<()> {
        self.take_failure().await?;
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .entry(row.to_string())
            .or_default()
            .insert(column.to_string(), value.to_string());
        debug!("Mock: put {}/{}/{}", table, row, column);
        Ok(())
    }

    async fn get_row(&self, table: &str, row: &str) -> Result<Option<RowResult>> {
        self.take_failure().await?;
        Ok(self
            .tables
            .read()
            .await
            .get(table)
            .and_then(|rows| rows.get(row))
            .map(|cells| RowResult {
                row: row.to_string(),
                cells: cells
                    .iter()
                    .map(|(column, value)| Cell {
                        column: column.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            }))
    }

    async fn scan(&self, table: &str, start_row: Option<&str>) -> Result<Vec<RowResult>> {
        self.take_failure().await?;
        let tables = self.tables.read().await;
        let rows = match tables.get(table) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .filter(|(row, _)| start_row.is_none_or(|start| row.as_str() >= start))
            .map(|(row, cells)| RowResult {
                row: row.clone(),
                cells: cells
                    .iter()
                    .map(|(column, value)| Cell {
                        column: column.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            })
            .collect())
    }
}

#[async_trait]
impl FileStore for MockCluster {
    async fn mkdirs(&self, path: &str) -> Result<()> {
        self.take_failure().await?;
        self.dirs.write().await.insert(path.to_string());
        debug!("Mock: mkdirs {}", path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.take_failure().await?;
        Ok(self.files.read().await.contains_key(path)
            || self.dirs.read().await.contains(path))
    }

    async fn create(&self, path: &str, contents: &str) -> Result<()> {
        self.take_failure().await?;
        self.files
            .write()
            .await
            .insert(path.to_string(), contents.to_string());
        debug!("Mock: create {}", path);
        Ok(())
    }

    async fn append(&self, path: &str, contents: &str) -> Result<()> {
        self.take_failure().await?;
        let mut files = self.files.write().await;
        let existing = files.get_mut(path).ok_or_else(|| {
            ClientError::request_failed(404, format!("append target '{}' does not exist", path))
        })?;
        existing.push_str(contents);
        debug!("Mock: append {}", path);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.take_failure().await?;
        self.files.write().await.remove(path);
        self.dirs.write().await.remove(path);
        debug!("Mock: delete {}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_move_updates_placement() {
        let cluster = MockCluster::new();
        cluster
            .add_region("t1", "region-1", ServerName::new("rs-1"))
            .await;

        cluster
            .move_region("region-1", &ServerName::new("rs-2"))
            .await
            .unwrap();

        let locations = cluster.region_locations("t1").await.unwrap();
        assert_eq!(locations[0].server, ServerName::new("rs-2"));
        assert_eq!(
            cluster.recorded_moves().await,
            vec![("region-1".to_string(), ServerName::new("rs-2"))]
        );
    }

    #[tokio::test]
    async fn test_move_unknown_region_fails() {
        let cluster = MockCluster::new();
        let result = cluster
            .move_region("region-x", &ServerName::new("rs-1"))
            .await;
        assert!(matches!(result, Err(ClientError::RequestFailed { .. })));
    }

    #[tokio::test]
    async fn test_queued_failure_pops_once() {
        let cluster = MockCluster::new();
        cluster
            .queue_failure(ClientError::not_serving("region-1"))
            .await;

        let first = cluster.live_servers().await;
        assert!(matches!(first, Err(ClientError::NotServing { .. })));

        // The queue is drained; the next call succeeds
        assert!(cluster.live_servers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_table_put_get_scan() {
        let cluster = MockCluster::new();
        cluster
            .put_cell("t1", "row1", "info:column", "a")
            .await
            .unwrap();
        cluster
            .put_cell("t1", "row3", "info:column", "b")
            .await
            .unwrap();
        cluster
            .put_cell("t1", "row5", "info:column", "c")
            .await
            .unwrap();

        let row = cluster.get_row("t1", "row1").await.unwrap().unwrap();
        assert_eq!(row.cells[0].value, "a");
        assert!(cluster.get_row("t1", "row9").await.unwrap().is_none());

        let all = cluster.scan("t1", None).await.unwrap();
        assert_eq!(all.len(), 3);

        let bounded = cluster.scan("t1", Some("row3")).await.unwrap();
        let rows: Vec<&str> = bounded.iter().map(|r| r.row.as_str()).collect();
        assert_eq!(rows, vec!["row3", "row5"]);
    }

    #[tokio::test]
    async fn test_file_create_append_delete() {
        let cluster = MockCluster::new();

        assert!(!cluster.exists("/test/f").await.unwrap());
        cluster.create("/test/f", "one\n").await.unwrap();
        assert!(cluster.exists("/test/f").await.unwrap());

        cluster.append("/test/f", "two\n").await.unwrap();
        assert_eq!(
            cluster.file_contents("/test/f").await.unwrap(),
            "one\ntwo\n"
        );

        // Overwrite replaces contents entirely
        cluster.create("/test/f", "three\n").await.unwrap();
        assert_eq!(cluster.file_contents("/test/f").await.unwrap(), "three\n");

        cluster.delete("/test/f").await.unwrap();
        assert!(!cluster.exists("/test/f").await.unwrap());
    }

    #[tokio::test]
    async fn test_append_requires_existing_file() {
        let cluster = MockCluster::new();
        let result = cluster.append("/test/missing", "line\n").await;
        assert!(matches!(result, Err(ClientError::RequestFailed { .. })));
    }
}
