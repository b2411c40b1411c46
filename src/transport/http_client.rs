use reqwest::{header, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::error::FetchError;

/// Thin reqwest wrapper bound to one base URL.
///
/// Every call is a single attempt: non-2xx answers come back as
/// [`FetchError::Status`] carrying the body, so callers can decide whether to
/// retry, remap or give up.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Creates a client for `base_url` whose requests time out after `timeout`
    /// unless a call overrides it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("meli-orders-archiver/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Sends a bearer-authenticated GET and decodes the JSON body.
    #[instrument(skip(self, bearer))]
    pub async fn get_json<T: DeserializeOwned + Debug>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        bearer: &str,
    ) -> Result<T, FetchError> {
        let url = self.url(endpoint);
        debug!("Sending GET request to {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send GET request: {:?}", e);
                FetchError::Network(e)
            })?;

        Self::handle_response(response).await
    }

    /// Sends a form-encoded POST and decodes the JSON body.
    #[instrument(skip(self, form))]
    pub async fn post_form<T: DeserializeOwned + Debug>(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<T, FetchError> {
        let url = self.url(endpoint);
        debug!("Sending form POST request to {}", url);

        let response = self
            .client
            .post(&url)
            .form(form)
            .timeout(timeout)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Sends a JSON POST with extra headers, ignoring whatever body comes back.
    #[instrument(skip(self, body, headers))]
    pub async fn post_json_with_headers<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &B,
        headers: &[(&str, String)],
        timeout: Duration,
    ) -> Result<StatusCode, FetchError> {
        let url = self.url(endpoint);
        debug!("Sending JSON POST request to {}", url);

        let mut request = self.client.post(&url).query(query).json(body).timeout(timeout);
        for (key, value) in headers {
            request = request.header(*key, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!("Response Status: {}", status);
            Ok(status)
        } else {
            let body_text = response.text().await.unwrap_or_default();
            error!("API request failed. Status: {}, Body: {}", status, body_text);
            Err(FetchError::Status(status, body_text))
        }
    }

    async fn handle_response<T: DeserializeOwned + Debug>(
        response: Response,
    ) -> Result<T, FetchError> {
        let status = response.status();
        debug!("Response Status: {}", status);

        if !status.is_success() {
            // the status decides retries, a broken error body must not hide it
            let body_text = response.text().await.unwrap_or_default();
            error!(
                "API request failed. Status: {}, Body: {}",
                status, body_text
            );
            return Err(FetchError::Status(status, body_text));
        }

        let body_text = response.text().await?;
        debug!("Response Body: {}", body_text);
        let body: T = serde_json::from_str(&body_text)?;
        Ok(body)
    }
}
