//! HTTP client for the terminal's sync backend.
//!
//! Two endpoints: `GET /api/sync` returns the whole catalog plus store
//! settings, `POST /api/transactions` records a completed sale. Every call
//! is bounded by the configured request timeout.

use std::time::Duration;

use posterm_core::{AppConfig, TransactionRecord};
use reqwest::{Client, Url};

use crate::error::SyncError;
use crate::retry::retry_with_backoff;
use crate::types::{SyncPayload, TransactionAck};

const SYNC_PATH: &str = "api/sync";
const TRANSACTIONS_PATH: &str = "api/transactions";

/// Client for the sync backend.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so the
/// terminal hands a clone to each spawned request.
#[derive(Debug, Clone)]
pub struct SyncClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SyncClient {
    /// Creates a client for `base_url` with the given timeout and user agent.
    /// Retries are disabled; see [`SyncClient::with_retries`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`SyncError::InvalidBaseUrl`] if `base_url` does not
    /// parse as an absolute URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SyncError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SyncError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(SyncError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            max_retries: 0,
            backoff_base_ms: 500,
        })
    }

    /// Builds a client from the backend settings in [`AppConfig`].
    ///
    /// Returns `Ok(None)` when no backend URL is configured (offline mode).
    ///
    /// # Errors
    ///
    /// See [`SyncClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, SyncError> {
        let Some(base_url) = config.backend_url.as_deref() else {
            return Ok(None);
        };
        let client = Self::new(base_url, config.request_timeout_secs, &config.user_agent)?
            .with_retries(config.sync_max_retries, config.sync_backoff_base_ms);
        Ok(Some(client))
    }

    /// Enables retry with exponential back-off on transient failures.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches the full catalog snapshot from `GET /api/sync`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Http`] on network failure or timeout.
    /// - [`SyncError::UnexpectedStatus`] on a non-2xx response.
    /// - [`SyncError::Deserialize`] if the body is not a sync payload.
    pub async fn fetch_sync(&self) -> Result<SyncPayload, SyncError> {
        let url = self.endpoint(SYNC_PATH)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.get_payload(&url)
        })
        .await
    }

    /// Reports a completed sale to `POST /api/transactions`.
    ///
    /// The backend may answer with an empty body; that yields a default
    /// [`TransactionAck`].
    ///
    /// # Errors
    ///
    /// - [`SyncError::Http`] on network failure or timeout.
    /// - [`SyncError::UnexpectedStatus`] on a non-2xx response.
    /// - [`SyncError::Deserialize`] if a non-empty body is not valid JSON.
    pub async fn post_transaction(
        &self,
        record: &TransactionRecord,
    ) -> Result<TransactionAck, SyncError> {
        let url = self.endpoint(TRANSACTIONS_PATH)?;
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_transaction(&url, record)
        })
        .await
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        self.base_url
            .join(path)
            .map_err(|e| SyncError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get_payload(&self, url: &Url) -> Result<SyncPayload, SyncError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let payload: SyncPayload =
            serde_json::from_str(&body).map_err(|e| SyncError::Deserialize {
                context: format!("GET {url}"),
                source: e,
            })?;

        tracing::debug!(
            products = payload.products.len(),
            categories = payload.categories.len(),
            "fetched sync payload"
        );
        Ok(payload)
    }

    async fn send_transaction(
        &self,
        url: &Url,
        record: &TransactionRecord,
    ) -> Result<TransactionAck, SyncError> {
        let response = self.client.post(url.clone()).json(record).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(TransactionAck::default());
        }
        parse_ack(&body).map_err(|e| SyncError::Deserialize {
            context: format!("POST {url}"),
            source: e,
        })
    }
}

/// Accepts either a bare `{"reference": ..}` object or one wrapped in the
/// `{"data": {..}}` envelope the preview server uses.
fn parse_ack(body: &str) -> Result<TransactionAck, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    match value.get("data") {
        Some(inner) if inner.is_object() => serde_json::from_value(inner.clone()),
        _ => serde_json::from_value(value),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
