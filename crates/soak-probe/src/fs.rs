use crate::error::ProbeError;
use crate::runner::Probe;
use crate::timestamp_now;
use async_trait::async_trait;
use soak_client::FileStore;
use soak_core::DirectoryTarget;
use std::sync::Arc;
use tracing::info;

/// File overwritten with the latest timestamp every iteration
pub const OVERWRITE_FILE_NAME: &str = "overwrite_file";

/// File appended to every iteration, one timestamp line per pass
pub const APPEND_FILE_NAME: &str = "append_file";

/// One named filesystem endpoint the probe writes to
pub struct FsEndpoint {
    pub name: String,
    pub store: Arc<dyn FileStore>,
}

impl FsEndpoint {
    pub fn new(name: impl Into<String>, store: Arc<dyn FileStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }
}

/// Overwrites and appends fixed files under the target directory on every
/// configured filesystem, exercising create and append paths while
/// authentication tokens age.
pub struct FsProbe {
    dir: DirectoryTarget,
    endpoints: Vec<FsEndpoint>,
}

impl FsProbe {
    pub fn new(dir: DirectoryTarget, endpoints: Vec<FsEndpoint>) -> Self {
        Self { dir, endpoints }
    }

    /// Startup pass: make the target directory if absent and remove the fixed
    /// files so each run starts from a known state.
    pub async fn prepare(&self) -> Result<(), ProbeError> {
        for endpoint in &self.endpoints {
            info!(
                "Preparing directory {} on filesystem {}",
                self.dir, endpoint.name
            );
            if !endpoint.store.exists(self.dir.dir()).await? {
                info!("Making directory {}", self.dir);
                endpoint.store.mkdirs(self.dir.dir()).await?;
            }

            for file_name in [APPEND_FILE_NAME, OVERWRITE_FILE_NAME] {
                let path = self.dir.file_path(file_name);
                if endpoint.store.exists(&path).await? {
                    info!("Deleting file at {}", path);
                    endpoint.store.delete(&path).await?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Probe for FsProbe {
    fn name(&self) -> &str {
        "fs"
    }

    async fn execute(&mut self) -> Result<String, ProbeError> {
        for endpoint in &self.endpoints {
            let now = timestamp_now();

            let overwrite_path = self.dir.file_path(OVERWRITE_FILE_NAME);
            info!(
                "Writing overwrite file at {} on {}",
                overwrite_path, endpoint.name
            );
            endpoint.store.create(&overwrite_path, &now).await?;

            let append_path = self.dir.file_path(APPEND_FILE_NAME);
            info!("Appending at {} on {}", append_path, endpoint.name);
            if !endpoint.store.exists(&append_path).await? {
                endpoint
                    .store
                    .create(&append_path, &format!("Initial write {}\n", now))
                    .await?;
            }
            endpoint
                .store
                .append(&append_path, &format!("{}\n", now))
                .await?;
        }

        Ok(format!(
            "wrote timestamps under {} on {} filesystem(s)",
            self.dir,
            self.endpoints.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soak_client::{ClientError, MockCluster};

    fn target() -> DirectoryTarget {
        DirectoryTarget::parse("/test/").unwrap()
    }

    fn probe_over(clusters: &[(&str, Arc<MockCluster>)]) -> FsProbe {
        let endpoints = clusters
            .iter()
            .map(|(name, cluster)| {
                FsEndpoint::new(*name, cluster.clone() as Arc<dyn FileStore>)
            })
            .collect();
        FsProbe::new(target(), endpoints)
    }

    #[tokio::test]
    async fn test_one_iteration_writes_both_files_on_every_endpoint() {
        let fs1 = Arc::new(MockCluster::new());
        let fs2 = Arc::new(MockCluster::new());
        let mut probe = probe_over(&[("fs1", fs1.clone()), ("fs2", fs2.clone())]);

        probe.prepare().await.unwrap();
        probe.execute().await.unwrap();

        for cluster in [&fs1, &fs2] {
            let overwrite = cluster
                .file_contents("/test/overwrite_file")
                .await
                .expect("overwrite file written");
            // Only the latest timestamp, no newline accumulation
            assert_eq!(overwrite.len(), 19);

            let append = cluster
                .file_contents("/test/append_file")
                .await
                .expect("append file written");
            let lines: Vec<&str> = append.lines().collect();
            assert_eq!(lines.len(), 2);
            assert!(lines[0].starts_with("Initial write "));
            assert_eq!(lines[1].len(), 19);
        }
    }

    #[tokio::test]
    async fn test_append_file_grows_one_line_per_iteration_in_order() {
        let fs1 = Arc::new(MockCluster::new());
        let mut probe = probe_over(&[("fs1", fs1.clone())]);

        probe.prepare().await.unwrap();
        for _ in 0..3 {
            probe.execute().await.unwrap();
        }

        let append = fs1.file_contents("/test/append_file").await.unwrap();
        let lines: Vec<&str> = append.lines().collect();
        // Initial marker plus one line per iteration
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Initial write "));
        let mut stamps = lines[1..].to_vec();
        stamps.sort();
        assert_eq!(stamps, lines[1..].to_vec(), "lines must be chronological");

        // Overwrite file still holds exactly one timestamp
        let overwrite = fs1.file_contents("/test/overwrite_file").await.unwrap();
        assert_eq!(overwrite.len(), 19);
    }

    #[tokio::test]
    async fn test_existing_append_file_gets_no_initial_marker() {
        let fs1 = Arc::new(MockCluster::new());
        fs1.seed_file("/test/append_file", "pre-existing\n").await;

        let mut probe = probe_over(&[("fs1", fs1.clone())]);
        // No prepare: the file survives and is appended to directly
        probe.execute().await.unwrap();

        let append = fs1.file_contents("/test/append_file").await.unwrap();
        let lines: Vec<&str> = append.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "pre-existing");
        assert!(!lines[1].starts_with("Initial write "));
    }

    #[tokio::test]
    async fn test_prepare_removes_stale_files() {
        let fs1 = Arc::new(MockCluster::new());
        fs1.seed_file("/test/append_file", "stale\n").await;
        fs1.seed_file("/test/overwrite_file", "stale").await;

        let probe = probe_over(&[("fs1", fs1.clone())]);
        probe.prepare().await.unwrap();

        assert!(fs1.file_contents("/test/append_file").await.is_none());
        assert!(fs1.file_contents("/test/overwrite_file").await.is_none());
    }

    #[tokio::test]
    async fn test_endpoint_failure_propagates() {
        let fs1 = Arc::new(MockCluster::new());
        let mut probe = probe_over(&[("fs1", fs1.clone())]);
        probe.prepare().await.unwrap();

        fs1.queue_failure(ClientError::transport("token expired"))
            .await;
        let err = probe.execute().await.unwrap_err();
        assert!(!err.is_recoverable());
    }
}
