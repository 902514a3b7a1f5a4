//! HTTP query engine.
//!
//! Talks to a query service that accepts `POST <base>/api/query` with a
//! `{"query": "..."}` body and answers `{"data": [...]}` on success or
//! `{"error": "..."}` otherwise.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;
use url::Url;

use super::{ConnectionConfig, EngineKind, QueryEngine};
use crate::Result;
use crate::error::{TableLensError, redact_database_url};
use crate::models::RowSet;

/// Path of the query endpoint relative to the base URL.
const QUERY_PATH: &str = "api/query";

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// Query engine reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
    endpoint: Url,
    config: ConnectionConfig,
}

impl HttpEngine {
    /// Creates an engine for the service at `base_url` with default
    /// configuration.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, ConnectionConfig::for_kind(EngineKind::Http))
    }

    /// Creates an engine with custom configuration.
    pub fn with_config(base_url: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = query_endpoint(base_url)?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.max_connections as usize)
            .build()
            .map_err(|e| TableLensError::connection_failed("Failed to build HTTP client", e))?;

        debug!("HTTP engine endpoint: {}", redact_database_url(endpoint.as_str()));
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// The resolved query endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

#[async_trait]
impl QueryEngine for HttpEngine {
    async fn execute(&self, query: &str) -> Result<RowSet> {
        debug!("Posting query to engine: {}", query);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(|e| TableLensError::query_failed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TableLensError::query_failed(e.to_string()))?;
        let payload: Option<JsonValue> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = payload
                .as_ref()
                .and_then(|p| p.get("error"))
                .and_then(JsonValue::as_str)
                .map_or_else(|| status.to_string(), str::to_string);
            return Err(TableLensError::query_failed(message));
        }

        match payload {
            Some(payload) => Ok(payload
                .get("data")
                .map(RowSet::from_json)
                .unwrap_or_default()),
            None => Err(TableLensError::query_failed(format!(
                "Engine returned a non-JSON response ({})",
                status
            ))),
        }
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Http
    }
}

/// Resolves `<base>/api/query`, keeping any base path prefix.
fn query_endpoint(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url).map_err(|e| {
        TableLensError::configuration(format!(
            "Invalid engine URL '{}': {}",
            redact_database_url(base_url),
            e
        ))
    })?;

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(QUERY_PATH).map_err(|e| {
        TableLensError::configuration(format!("Invalid engine URL: {}", e))
    })
}
