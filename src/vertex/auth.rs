//! Bearer tokens for Vertex AI.
//!
//! The credential file fetched at cold start is a Google service-account key.
//! It is exchanged for an OAuth access token through the JWT bearer grant and
//! the token is reused until shortly before it expires.

use crate::error::{Result, WizardyError};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const EXPIRY_SAFETY_WINDOW: i64 = 300;
const ASSERTION_LIFETIME: i64 = 3600;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// A fixed token, e.g. from `GOOGLE_OAUTH_ACCESS_TOKEN`.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountCredentials {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            WizardyError::ConfigError(format!("Invalid service account JSON: {}", e))
        })
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            WizardyError::ConfigError(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    exp_unix: i64,
}

pub struct ServiceAccountTokenProvider {
    creds: ServiceAccountCredentials,
    key: EncodingKey,
    http: reqwest::Client,
    // Held across the exchange so concurrent callers wait for one refresh.
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    /// Parses the private key up front so a broken credential fails here
    /// rather than on the first request.
    pub fn new(creds: ServiceAccountCredentials, http: reqwest::Client) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(creds.private_key.as_bytes())
            .map_err(|e| WizardyError::AuthError(format!("Invalid RSA private key: {}", e)))?;

        Ok(Self {
            creds,
            key,
            http,
            cache: Mutex::new(None),
        })
    }

    fn sign_assertion(&self, now: i64) -> Result<String> {
        let claims = Claims {
            iss: &self.creds.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: self.creds.token_uri(),
            iat: now,
            exp: now + ASSERTION_LIFETIME,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| WizardyError::AuthError(format!("Failed to sign JWT: {}", e)))
    }

    async fn exchange(&self, now: i64) -> Result<CachedToken> {
        let assertion = self.sign_assertion(now)?;
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        log::debug!("Requesting access token for {}", self.creds.client_email);

        let response = self
            .http
            .post(self.creds.token_uri())
            .form(&form)
            .send()
            .await
            .map_err(|e| WizardyError::AuthError(format!("Token endpoint request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WizardyError::AuthError(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            WizardyError::AuthError(format!("Failed to parse token response: {}", e))
        })?;

        Ok(CachedToken {
            token: token.access_token,
            exp_unix: now + token.expires_in,
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(cached) = cache.as_ref() {
            if cached.exp_unix - EXPIRY_SAFETY_WINDOW > now {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}

/// Resolves the provider used by the Vertex client: an explicit
/// `GOOGLE_OAUTH_ACCESS_TOKEN` wins, otherwise the service-account key at
/// `credentials_path` is used.
pub async fn token_provider_from_env(
    credentials_path: &Path,
    http: reqwest::Client,
) -> Result<Arc<dyn TokenProvider>> {
    if let Ok(token) = std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN") {
        if !token.is_empty() {
            log::info!("Using access token from GOOGLE_OAUTH_ACCESS_TOKEN");
            return Ok(Arc::new(StaticTokenProvider::new(token)));
        }
    }

    let creds = ServiceAccountCredentials::from_file(credentials_path).await?;
    log::info!("Using service account {}", creds.client_email);
    Ok(Arc::new(ServiceAccountTokenProvider::new(creds, http)?))
}
