//! Runtime configuration from the environment (and `.env`, when present).

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::ai::{GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::auth::GoogleConfig;
use crate::storage::CloudinaryConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` means the per-user data directory.
    pub database_path: Option<PathBuf>,
    pub jwt_secret: String,
    pub client_url: String,
    pub gemini: Option<GeminiConfig>,
    pub cloudinary: Option<CloudinaryConfig>,
    pub google: Option<GoogleConfig>,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {e}");
        }

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None => bail!("JWT_SECRET must be set"),
        };

        let gemini = match var("GEMINI_API_KEY") {
            Some(api_key) => Some(GeminiConfig {
                api_key,
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                base_url: var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                timeout: Duration::from_secs(parse_or("AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)?),
            }),
            None => {
                warn!("GEMINI_API_KEY not set, AI features are disabled");
                None
            }
        };

        let cloudinary = match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud), Some(key), Some(secret)) => Some(CloudinaryConfig::new(cloud, key, secret)),
            _ => {
                warn!("Cloudinary credentials incomplete, file uploads are disabled");
                None
            }
        };

        let google = match (var("GOOGLE_CLIENT_ID"), var("GOOGLE_CLIENT_SECRET")) {
            (Some(id), Some(secret)) => Some(GoogleConfig::new(id, secret)),
            _ => {
                warn!("Google OAuth credentials incomplete, Google login is disabled");
                None
            }
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", DEFAULT_PORT)?,
            database_path: var("DATABASE_PATH").map(PathBuf::from),
            jwt_secret,
            client_url: var("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string()),
            gemini,
            cloudinary,
            google,
        })
    }
}

/// `DATABASE_PATH` alone, for commands that need no other settings.
pub fn database_path_from_env() -> Option<PathBuf> {
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {e}");
    }
    var("DATABASE_PATH").map(PathBuf::from)
}

/// A set, non-blank variable.
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw.parse().with_context(|| format!("Invalid {key} value: {raw}")),
        None => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
