//! Best-effort destinations for finished result sets.

use async_trait::async_trait;
use mapscout_core::{SearchResultSet, SinkConfig, UserId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A result set tagged with the user who ran it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    #[serde(flatten)]
    pub result_set: SearchResultSet,
    pub user_id: UserId,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint rejected payload with status {0}")]
    Status(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Somewhere a finished result set is forwarded to. Failures never affect the
/// run that produced the payload.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Deliver one payload
    async fn forward(&self, payload: &ResultPayload) -> Result<(), SinkError>;
}

/// POSTs the payload as JSON to an ingestion endpoint.
#[derive(Debug, Clone)]
pub struct IngestionSink {
    client: reqwest::Client,
    url: String,
}

impl IngestionSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ResultSink for IngestionSink {
    fn name(&self) -> &str {
        "ingestion"
    }

    async fn forward(&self, payload: &ResultPayload) -> Result<(), SinkError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// Writes the latest payload to a local JSON file, replacing the previous one.
#[derive(Debug, Clone)]
pub struct SnapshotSink {
    path: PathBuf,
}

impl SnapshotSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultSink for SnapshotSink {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn forward(&self, payload: &ResultPayload) -> Result<(), SinkError> {
        let json = serde_json::to_vec_pretty(payload)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Build the sinks enabled by configuration.
pub fn sinks_from_config(config: &SinkConfig) -> Result<Vec<Box<dyn ResultSink>>, SinkError> {
    let mut sinks: Vec<Box<dyn ResultSink>> = Vec::new();
    if let Some(url) = &config.ingest_url {
        sinks.push(Box::new(IngestionSink::new(
            url.clone(),
            Duration::from_secs(config.ingest_timeout_secs),
        )?));
    }
    if let Some(path) = &config.snapshot_path {
        sinks.push(Box::new(SnapshotSink::new(path.clone())));
    }
    Ok(sinks)
}

/// Forward a payload to every sink in order, logging failures. Returns how
/// many sinks accepted it.
pub async fn forward_all(sinks: &[Box<dyn ResultSink>], payload: &ResultPayload) -> usize {
    let mut delivered = 0;
    for sink in sinks {
        match sink.forward(payload).await {
            Ok(()) => {
                delivered += 1;
                tracing::info!(sink = sink.name(), "Results forwarded");
            }
            Err(e) => {
                tracing::warn!(sink = sink.name(), error = %e, "Failed to forward results");
            }
        }
    }
    delivered
}
