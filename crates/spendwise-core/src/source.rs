//! Expense sources
//!
//! Where the engine's input comes from. The backend owns the records and
//! exposes them through:
//!
//! - `GET /get_expenses` - every record
//! - `GET /get_expenses/{user_id}` - one user's records
//!
//! Both return a JSON array of [`ExpenseRecord`]. A [`FileSource`] reads the
//! same array from a snapshot on disk. Sources only read; creating, updating
//! and deleting records stays with the backend.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::aggregate::filter_by_user;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::ExpenseRecord;

/// A snapshot of expense records to aggregate
#[async_trait]
pub trait ExpenseSource: Send + Sync {
    /// Fetch the full current set of records
    async fn fetch(&self) -> Result<Vec<ExpenseRecord>>;

    /// Human-readable origin, for logs and report headers
    fn describe(&self) -> String;
}

/// Parse a JSON array of expense records
pub fn parse_records(json: &str) -> Result<Vec<ExpenseRecord>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(Error::InvalidData(
            "Expected a JSON array of expense records".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

/// Records read from a JSON snapshot file
pub struct FileSource {
    path: PathBuf,
    user_id: Option<String>,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            user_id: None,
        }
    }

    /// Only return records owned by `user_id`
    pub fn for_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ExpenseSource for FileSource {
    async fn fetch(&self) -> Result<Vec<ExpenseRecord>> {
        debug!(path = %self.path.display(), "Reading expense snapshot");
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records = parse_records(&content)?;

        Ok(match &self.user_id {
            Some(user_id) => filter_by_user(&records, user_id),
            None => records,
        })
    }

    fn describe(&self) -> String {
        match &self.user_id {
            Some(user) => format!("{} (user {})", self.path.display(), user),
            None => self.path.display().to_string(),
        }
    }
}

/// Read-only client for the expense backend
#[derive(Clone)]
pub struct HttpSource {
    http_client: Client,
    base_url: Url,
    user_id: Option<String>,
}

impl HttpSource {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("Invalid API URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Invalid API URL: {}", base_url)));
        }

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url,
            user_id: None,
        })
    }

    /// Create from config, if a backend URL is configured
    pub fn from_config(config: &Config) -> Option<Result<Self>> {
        config
            .api_url
            .as_deref()
            .map(|url| Self::new(url, config.timeout))
    }

    /// Fetch only `user_id`'s records (`GET /get_expenses/{user_id}`)
    pub fn for_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// URL of the listing endpoint this source reads
    pub fn endpoint(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("get_expenses");
            if let Some(user_id) = &self.user_id {
                segments.push(user_id);
            }
        }
        url
    }
}

#[async_trait]
impl ExpenseSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<ExpenseRecord>> {
        let url = self.endpoint();
        debug!(%url, "Fetching expenses");

        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let records = parse_records(&body)?;
        info!(count = records.len(), %url, "Fetched expenses");
        Ok(records)
    }

    fn describe(&self) -> String {
        self.endpoint().to_string()
    }
}
