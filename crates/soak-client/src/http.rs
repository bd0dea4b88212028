use crate::error::{ClientError, Result};
use crate::traits::{FileStore, RegionAdmin, TableStore};
use crate::types::{ListResponse, RegionLocation, RowResult, ServerName};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use soak_core::ClusterConfig;
use tracing::debug;

/// Property naming the cluster master endpoint
pub const MASTER_ENDPOINT_PROPERTY: &str = "master.endpoint";

/// Authenticated HTTP session to one cluster endpoint.
///
/// Holds a single connection pool for the process lifetime; re-connection and
/// per-request re-authentication are the pool's job, never the caller's.
pub struct HttpClusterClient {
    base_url: String,
    client: Client,
}

/// Error envelope the cluster API returns on failure
#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    reason: Option<String>,
}

/// Map a non-success response to a client error. The not-being-served
/// condition is surfaced distinctly so callers can treat it as transient.
fn classify_error(status: u16, body: &str) -> ClientError {
    if let Ok(parsed) = serde_json::from_str::<StatusBody>(body) {
        if parsed.reason.as_deref() == Some("RegionNotServing") {
            return ClientError::not_serving(parsed.message);
        }
        if !parsed.message.is_empty() {
            return ClientError::request_failed(status, parsed.message);
        }
    }
    ClientError::request_failed(status, body)
}

impl HttpClusterClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Client for the cluster master, resolved from `master.endpoint`
    pub fn for_master(config: &ClusterConfig) -> Result<Self> {
        let endpoint = config.require_property(MASTER_ENDPOINT_PROPERTY)?;
        Ok(Self::new(endpoint))
    }

    /// Client for one filesystem nameservice, resolved from
    /// `dfs.endpoint.<nameservice>`
    pub fn for_nameservice(config: &ClusterConfig, nameservice: &str) -> Result<Self> {
        let key = format!("dfs.endpoint.{}", nameservice);
        let endpoint = config.require_property(&key)?;
        Ok(Self::new(endpoint))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;
        Self::check(resp).await
    }
}

#[async_trait]
impl RegionAdmin for HttpClusterClient {
    async fn region_locations(&self, table: &str) -> Result<Vec<RegionLocation>> {
        let url = format!("{}/api/v1/tables/{}/regions", self.base_url, table);
        let resp = self.get(&url, &[]).await?;
        let list = resp
            .json::<ListResponse<RegionLocation>>()
            .await
            .map_err(|e| ClientError::parse(format!("Failed to parse region list: {}", e)))?;
        Ok(list.items)
    }

    async fn live_servers(&self) -> Result<Vec<ServerName>> {
        let url = format!("{}/api/v1/servers", self.base_url);
        let resp = self.get(&url, &[("state", "live")]).await?;
        let list = resp
            .json::<ListResponse<ServerName>>()
            .await
            .map_err(|e| ClientError::parse(format!("Failed to parse server list: {}", e)))?;
        Ok(list.items)
    }

    async fn move_region(&self, region: &str, destination: &ServerName) -> Result<()> {
        let url = format!("{}/api/v1/regions/{}/move", self.base_url, region);
        debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "destination": destination }))
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl TableStore for HttpClusterClient {
    async fn put_cell(&self, table: &str, row: &str, column: &str, value: &str) -> Result<()> {
        let url = format!(
            "{}/api/v1/tables/{}/rows/{}/cells/{}",
            self.base_url, table, row, column
        );
        debug!("PUT {}", url);
        let resp = self
            .client
            .put(&url)
            .json(&json!({ "value": value }))
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get_row(&self, table: &str, row: &str) -> Result<Option<RowResult>> {
        let url = format!("{}/api/v1/tables/{}/rows/{}", self.base_url, table, row);
        debug!("GET {}", url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp).await?;
        let result = resp
            .json::<RowResult>()
            .await
            .map_err(|e| ClientError::parse(format!("Failed to parse row: {}", e)))?;
        Ok(Some(result))
    }

    async fn scan(&self, table: &str, start_row: Option<&str>) -> Result<Vec<RowResult>> {
        let url = format!("{}/api/v1/tables/{}/rows", self.base_url, table);
        let query: Vec<(&str, &str)> = match start_row {
            Some(start) => vec![("start", start)],
            None => vec![],
        };
        let resp = self.get(&url, &query).await?;
        let list = resp
            .json::<ListResponse<RowResult>>()
            .await
            .map_err(|e| ClientError::parse(format!("Failed to parse scan result: {}", e)))?;
        Ok(list.items)
    }
}

#[async_trait]
impl FileStore for HttpClusterClient {
    async fn mkdirs(&self, path: &str) -> Result<()> {
        let url = format!("{}/api/v1/fs/mkdirs", self.base_url);
        debug!("POST {} path={}", url, path);
        let resp = self
            .client
            .post(&url)
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let url = format!("{}/api/v1/fs/status", self.base_url);
        debug!("GET {} path={}", url, path);
        let resp = self
            .client
            .get(&url)
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(resp).await?;
        Ok(true)
    }

    async fn create(&self, path: &str, contents: &str) -> Result<()> {
        let url = format!("{}/api/v1/fs/file", self.base_url);
        debug!("PUT {} path={}", url, path);
        let resp = self
            .client
            .put(&url)
            .query(&[("path", path), ("overwrite", "true")])
            .body(contents.to_string())
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn append(&self, path: &str, contents: &str) -> Result<()> {
        let url = format!("{}/api/v1/fs/append", self.base_url);
        debug!("POST {} path={}", url, path);
        let resp = self
            .client
            .post(&url)
            .query(&[("path", path)])
            .body(contents.to_string())
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = format!("{}/api/v1/fs/file", self.base_url);
        debug!("DELETE {} path={}", url, path);
        let resp = self
            .client
            .delete(&url)
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("HTTP request failed: {}", e)))?;
        Self::check(resp).await?;
        Ok(())
    }
}
