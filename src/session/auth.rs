use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::constants::{AUTH_TIMEOUT_SECS, TOKEN_PATH};
use crate::error::{AuthError, FetchError};
use crate::session::interface::{Authenticator, MeliSession};
use crate::transport::http_client::HttpClient;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub user_id: Option<u64>,
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Exchanges the configured refresh token for a short-lived access token.
#[derive(Debug)]
pub struct MeliAuth<'a> {
    cfg: &'a Config,
    client: HttpClient,
}

impl<'a> MeliAuth<'a> {
    pub fn new(cfg: &'a Config) -> Result<Self, AuthError> {
        let client = HttpClient::new(
            &cfg.rest_api.base_url,
            Duration::from_secs(AUTH_TIMEOUT_SECS),
        )
        .map_err(Self::map_error)?;
        Ok(Self { cfg, client })
    }

    fn map_error(err: FetchError) -> AuthError {
        match err {
            FetchError::Network(e) => AuthError::Network(e),
            FetchError::Json(e) => AuthError::Json(e),
            FetchError::Status(StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED, _) => {
                AuthError::BadCredentials
            }
            FetchError::Status(status, _) => AuthError::Unexpected(status),
        }
    }
}

#[async_trait]
impl Authenticator for MeliAuth<'_> {
    #[instrument(skip(self))]
    async fn login(&self) -> Result<MeliSession, AuthError> {
        let creds = &self.cfg.credentials;
        debug!("Refreshing access token for client {}", creds.client_id);

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
        ];

        let response: TokenResponse = self
            .client
            .post_form(TOKEN_PATH, &form, Duration::from_secs(AUTH_TIMEOUT_SECS))
            .await
            .map_err(Self::map_error)?;

        let rotated = response
            .refresh_token
            .filter(|token| *token != creds.refresh_token);
        if rotated.is_some() {
            warn!("Refresh token was rotated by the API; update MELI_REFRESH_TOKEN before the next run");
        }

        info!(
            "Access token obtained (type {}, expires in {:?}s, scope {:?})",
            response.token_type, response.expires_in, response.scope
        );

        Ok(MeliSession {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            user_id: response.user_id,
            rotated_refresh_token: rotated,
        })
    }
}
