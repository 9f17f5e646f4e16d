//! Elasticsearch REST client
//!
//! A thin client over the three cluster operations cinesync uses: index
//! existence checks, index creation, and `_bulk` upserts. Errors never
//! expose the underlying HTTP client types; see
//! [`SearchError`](crate::domain::SearchError).

use crate::config::ElasticsearchConfig;
use crate::domain::{IndexDocument, Result, SearchError, SearchIndex};
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// REST client for the search cluster
pub struct SearchClient {
    base_url: String,
    client: Client,
    auth_header: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<BulkItem>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(default)]
    index: Option<BulkItemStatus>,
}

#[derive(Debug, Deserialize)]
struct BulkItemStatus {
    status: u16,
}

impl SearchClient {
    /// Create a new search client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                crate::domain::CinesyncError::Configuration(format!(
                    "Failed to build HTTP client: {e}"
                ))
            })?;

        let auth_header = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                let credentials = format!("{username}:{}", password.expose_secret().as_ref());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        };

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            auth_header,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_header {
            Some(auth) => builder.header("Authorization", auth),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Response> {
        self.request(builder)
            .send()
            .await
            .map_err(|e| SearchError::ConnectionFailed(e.to_string()).into())
    }

    /// Check that the cluster answers at all
    pub async fn ping(&self) -> Result<()> {
        let response = self.send(self.client.get(&self.base_url)).await?;

        if response.status().is_success() {
            tracing::info!(url = %self.base_url, "Elasticsearch connection test successful");
            Ok(())
        } else {
            Err(SearchError::ServerError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            }
            .into())
        }
    }

    /// Whether `index` exists on the cluster
    pub async fn has_index(&self, index: SearchIndex) -> Result<bool> {
        let url = format!("{}/{}", self.base_url, index);
        let response = self.send(self.client.head(&url)).await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(SearchError::ServerError {
                status: status.as_u16(),
                message: format!("unexpected status for HEAD {url}"),
            }
            .into()),
        }
    }

    /// Create `index` with the given settings-and-mappings body
    pub async fn create_index(&self, index: SearchIndex, body: &Value) -> Result<()> {
        let url = format!("{}/{}", self.base_url, index);
        let response = self.send(self.client.put(&url).json(body)).await?;

        if response.status().is_success() {
            tracing::info!(index = %index, "Created search index");
            Ok(())
        } else {
            Err(SearchError::IndexCreationFailed {
                index: index.to_string(),
                message: format!(
                    "status {}: {}",
                    response.status().as_u16(),
                    response.text().await.unwrap_or_default()
                ),
            }
            .into())
        }
    }

    /// Upsert `documents` into `index` in one `_bulk` request
    ///
    /// Each document is sent as an `index` action keyed by its id, so
    /// re-sending the same document overwrites rather than duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::BulkRejected`] when the request was accepted
    /// but some items failed; the whole batch is safe to re-send.
    pub async fn bulk_upsert(&self, index: SearchIndex, documents: &[IndexDocument]) -> Result<()> {
        let mut body = String::new();
        for doc in documents {
            body.push_str(&serde_json::to_string(&serde_json::json!({
                "index": {"_index": index.as_str(), "_id": doc.id}
            }))?);
            body.push('\n');
            body.push_str(&serde_json::to_string(&doc.body)?);
            body.push('\n');
        }

        let url = format!("{}/_bulk", self.base_url);
        let response = self
            .send(
                self.client
                    .post(&url)
                    .header("Content-Type", "application/x-ndjson")
                    .body(body),
            )
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::ServerError {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            }
            .into());
        }

        let bulk: BulkResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        if bulk.errors {
            let failed = bulk
                .items
                .iter()
                .filter_map(|item| item.index.as_ref())
                .filter(|status| status.status >= 300)
                .count();

            return Err(SearchError::BulkRejected {
                failed,
                total: documents.len(),
            }
            .into());
        }

        tracing::debug!(index = %index, count = documents.len(), "Bulk upsert accepted");
        Ok(())
    }
}
