//! Access to the hosted `download_history` table.
//!
//! The store owns record identity and timestamps; callers only create, list and delete rows.

use crate::{
    config::StoreConfig,
    model::{DownloadHistoryRecord, NewDownloadRecord},
};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{event, instrument, Level};

/// Table holding one row per completed simulated download
pub const TABLE: &str = "download_history";

#[derive(Debug, Error)]
pub enum StoreErrorKind {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
    #[error("store rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("no record matched")]
    NotFound,
    #[error("store returned no representation of the inserted row")]
    EmptyRepresentation,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading download history failed: {0}")]
    Read(#[source] StoreErrorKind),
    #[error("storing download record failed: {0}")]
    Write(#[source] StoreErrorKind),
    #[error("deleting download record `{id}` failed: {source}")]
    Delete {
        id: String,
        #[source]
        source: StoreErrorKind,
    },
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Inserts one row and returns it with the store-assigned id and timestamps
    async fn insert(&self, record: NewDownloadRecord) -> Result<DownloadHistoryRecord, StoreError>;

    /// All rows, newest `download_date` first
    async fn list_all(&self) -> Result<Vec<DownloadHistoryRecord>, StoreError>;

    /// Fails with [`StoreErrorKind::NotFound`] when no row has `id`
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;
}

/// [`HistoryStore`] speaking the hosted service's REST dialect (PostgREST)
pub struct RestHistoryStore {
    client: Client,
    endpoint: String,
    anon_key: Box<str>,
}

impl RestHistoryStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/rest/v1/{TABLE}", config.url),
            anon_key: config.anon_key.clone(),
        }
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &*self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, StoreErrorKind> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreErrorKind::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let raw = response.bytes().await?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Decodes rows one by one; rows written by other clients with values outside the known
/// platforms or qualities are skipped instead of failing the whole list.
fn decode_rows(raw_rows: Vec<serde_json::Value>) -> Vec<DownloadHistoryRecord> {
    raw_rows
        .into_iter()
        .filter_map(|raw| {
            let id = raw.get("id").and_then(serde_json::Value::as_str).unwrap_or_default().to_owned();
            match serde_json::from_value(raw) {
                Ok(record) => Some(record),
                Err(err) => {
                    event!(Level::WARN, %err, %id, "Skipping undecodable download history row");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl HistoryStore for RestHistoryStore {
    #[instrument(skip_all, fields(platform = %record.platform, quality = %record.quality))]
    async fn insert(&self, record: NewDownloadRecord) -> Result<DownloadHistoryRecord, StoreError> {
        let request = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&record);

        let rows: Vec<DownloadHistoryRecord> = send_json(request).await.map_err(StoreError::Write)?;
        let stored = rows
            .into_iter()
            .next()
            .ok_or(StoreError::Write(StoreErrorKind::EmptyRepresentation))?;

        event!(Level::DEBUG, id = %stored.id, "Download record stored");

        Ok(stored)
    }

    #[instrument(skip_all)]
    async fn list_all(&self) -> Result<Vec<DownloadHistoryRecord>, StoreError> {
        let request = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", "download_date.desc")]);

        let raw_rows: Vec<serde_json::Value> = send_json(request).await.map_err(StoreError::Read)?;
        let rows = decode_rows(raw_rows);

        event!(Level::DEBUG, count = rows.len(), "Download history loaded");

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let request = self
            .request(Method::DELETE)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{id}"))]);

        let delete_error = |source| StoreError::Delete { id: id.to_owned(), source };

        // Only the row count matters; the deleted row may not decode as a record
        let rows: Vec<serde_json::Value> = send_json(request).await.map_err(delete_error)?;
        if rows.is_empty() {
            return Err(delete_error(StoreErrorKind::NotFound));
        }

        event!(Level::DEBUG, "Download record deleted");

        Ok(())
    }
}
