use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::application::models::order_page::{ArchivedRecord, OrderPage};
use crate::constants::STORAGE_TIMEOUT_SECS;
use crate::error::AppError;
use crate::storage::config::StorageConfig;
use crate::transport::http_client::HttpClient;

/// Append-only destination for raw pages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RawSink: Send + Sync {
    async fn insert_page(&self, page: &OrderPage) -> Result<(), AppError>;
}

/// Inserts through a PostgREST-style `/rest/v1/<table>` endpoint.
#[derive(Debug)]
pub struct RestSink {
    http: HttpClient,
    endpoint: String,
    service_key: String,
}

impl RestSink {
    pub fn new(cfg: &StorageConfig) -> Result<Self, AppError> {
        let http = HttpClient::new(&cfg.url, Duration::from_secs(STORAGE_TIMEOUT_SECS))
            .map_err(|e| AppError::Storage(e.into()))?;
        Ok(Self {
            http,
            endpoint: cfg.insert_path(),
            service_key: cfg.service_key.clone(),
        })
    }
}

#[async_trait]
impl RawSink for RestSink {
    #[instrument(skip(self, page), fields(results = page.result_count()))]
    async fn insert_page(&self, page: &OrderPage) -> Result<(), AppError> {
        let body = [ArchivedRecord::from(page)];
        let headers = [
            ("apikey", self.service_key.clone()),
            ("Authorization", format!("Bearer {}", self.service_key)),
        ];

        let status = self
            .http
            .post_json_with_headers(
                &self.endpoint,
                &[("prefer", "return=minimal")],
                &body,
                &headers,
                Duration::from_secs(STORAGE_TIMEOUT_SECS),
            )
            .await
            .map_err(|e| AppError::Storage(e.into()))?;

        debug!("Archived page into {} ({})", self.endpoint, status);
        Ok(())
    }
}
