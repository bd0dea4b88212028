use crate::error::Result;
use crate::types::{RegionLocation, RowResult, ServerName};
use async_trait::async_trait;

/// Administrative view of region placement
#[async_trait]
pub trait RegionAdmin: Send + Sync {
    /// Current locations of every region of `table`
    async fn region_locations(&self, table: &str) -> Result<Vec<RegionLocation>>;

    /// Servers currently live in the cluster
    async fn live_servers(&self) -> Result<Vec<ServerName>>;

    /// Move `region` to `destination`
    async fn move_region(&self, region: &str, destination: &ServerName) -> Result<()>;
}

/// Row-oriented table access
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Write one cell of one row
    async fn put_cell(&self, table: &str, row: &str, column: &str, value: &str) -> Result<()>;

    /// Point read of one row; `None` when the row does not exist
    async fn get_row(&self, table: &str, row: &str) -> Result<Option<RowResult>>;

    /// Range scan; unbounded when `start_row` is `None`, otherwise starting
    /// from (and including) `start_row`
    async fn scan(&self, table: &str, start_row: Option<&str>) -> Result<Vec<RowResult>>;
}

/// File access against one filesystem nameservice
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Create the parent directory chain if absent
    async fn mkdirs(&self, path: &str) -> Result<()>;

    /// Whether `path` exists
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Create or overwrite `path` with `contents`
    async fn create(&self, path: &str, contents: &str) -> Result<()>;

    /// Append `contents` to an existing file
    async fn append(&self, path: &str, contents: &str) -> Result<()>;

    /// Delete `path` if it exists
    async fn delete(&self, path: &str) -> Result<()>;
}
