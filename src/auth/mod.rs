//! Credentials, session tokens and third-party sign-in.

mod google;
mod password;
mod token;

pub use google::{GoogleConfig, GoogleOAuth, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer, TOKEN_TTL_DAYS};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("invalid token: {0}")]
    Token(String),
    #[error("oauth exchange failed: {0}")]
    OAuth(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Profile returned by an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthIdentity {
    pub email: String,
    pub name: String,
}

/// Turns an authorization code into a verified identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<OAuthIdentity, AuthError>;
}

/// Used when no Google credentials are configured.
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn exchange_code(&self, _code: &str) -> Result<OAuthIdentity, AuthError> {
        Err(AuthError::NotConfigured("Google login"))
    }
}
