use crate::error::AuthError;

/// Bearer session obtained from the refresh-token exchange.
#[derive(Debug, Clone)]
pub struct MeliSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub user_id: Option<u64>,
    pub rotated_refresh_token: Option<String>,
}

impl MeliSession {
    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self) -> Result<MeliSession, AuthError>;
}
