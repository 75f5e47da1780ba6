//! # Google sign-in
//!
//! The frontend runs Google's popup flow and posts the resulting authorization
//! code to `/auth/google-login`. [`GoogleOAuth::exchange_code`] then:
//!
//! 1. Exchanges the code for an access token at the token endpoint. Popup codes
//!    are bound to the special `postmessage` redirect URI, which is not a URL, so
//!    it is sent as an extra form parameter instead of a configured redirect.
//! 2. Fetches the profile from the OpenID userinfo endpoint.
//!
//! Creating or fetching the matching account is the caller's job.

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet, TokenResponse, TokenUrl};
use reqwest::Client;
use serde::Deserialize;

use super::{AuthError, IdentityProvider, OAuthIdentity};

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Google userinfo response (OpenID Connect fields).
#[derive(Debug, Deserialize)]
struct GoogleUser {
    email: Option<String>,
    name: Option<String>,
}

/// OAuth client with only the token endpoint set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

pub struct GoogleOAuth {
    client: ConfiguredClient,
    http: Client,
    userinfo_url: String,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig) -> Result<Self, AuthError> {
        let token_url =
            TokenUrl::new(config.token_url).map_err(|e| AuthError::OAuth(e.to_string()))?;

        let client = BasicClient::new(ClientId::new(config.client_id))
            .set_client_secret(ClientSecret::new(config.client_secret))
            .set_token_uri(token_url);

        // The token endpoint must not be allowed to redirect (SSRF guard).
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        Ok(Self {
            client,
            http,
            userinfo_url: config.userinfo_url,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    async fn exchange_code(&self, code: &str) -> Result<OAuthIdentity, AuthError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .add_extra_param("redirect_uri", "postmessage")
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::OAuth(format!("Token exchange failed: {e}")))?;

        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::OAuth(format!(
                "Userinfo request failed with status {}",
                response.status()
            )));
        }

        let profile: GoogleUser = response
            .json()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        let email = profile
            .email
            .ok_or_else(|| AuthError::OAuth("Google profile has no email".to_string()))?;
        let name = profile
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

        Ok(OAuthIdentity { email, name })
    }
}
