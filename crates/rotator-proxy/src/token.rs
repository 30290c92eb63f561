//! App access token cache.
//!
//! One process-wide credential obtained through the OAuth2 client-credentials
//! grant.  Concurrent requests may refresh it redundantly; the last writer
//! wins and readers always see a whole credential.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use rotator_core::config::Credentials;

use crate::error::{ProxyError, Result};

/// Upstream tokens live 60 days; refresh 5 days early.
pub const TOKEN_LIFETIME_DAYS: i64 = 55;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn issued_now(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: Utc::now() + Duration::days(TOKEN_LIFETIME_DAYS),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Storage for the cached credential.  Swappable so tests can plant expired
/// credentials or watch invalidation.
pub trait CredentialCache: Send + Sync {
    fn get(&self) -> Option<Credential>;
    fn set(&self, credential: Credential);
    fn invalidate(&self);
}

#[derive(Debug, Default)]
pub struct MemoryCredentialCache {
    slot: RwLock<Option<Credential>>,
}

impl MemoryCredentialCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialCache for MemoryCredentialCache {
    fn get(&self) -> Option<Credential> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credential: Credential) {
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential);
    }

    fn invalidate(&self) {
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Hands out app tokens, exchanging credentials only when the cache is empty
/// or expired.
#[derive(Clone)]
pub struct TokenProvider {
    http: Client,
    token_url: String,
    cache: Arc<dyn CredentialCache>,
}

impl TokenProvider {
    pub fn new(http: Client, token_url: impl Into<String>, cache: Arc<dyn CredentialCache>) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            cache,
        }
    }

    pub async fn token(&self, credentials: &Credentials) -> Result<String> {
        if let Some(cached) = self.cache.get() {
            if cached.is_valid_at(Utc::now()) {
                debug!("token: cache hit (expires {})", cached.expires_at);
                return Ok(cached.token);
            }
            debug!("token: cached credential expired at {}", cached.expires_at);
        }

        let credential = self.exchange(credentials).await?;
        let token = credential.token.clone();
        self.cache.set(credential);
        Ok(token)
    }

    /// Drop the cached credential, e.g. after the upstream rejected it.
    pub fn invalidate(&self) {
        warn!("token: invalidating cached credential");
        self.cache.invalidate();
    }

    async fn exchange(&self, credentials: &Credentials) -> Result<Credential> {
        info!("token: requesting app access token from {}", self.token_url);
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("token: exchange rejected with {}", status);
            return Err(ProxyError::AuthFailure(status.to_string()));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProxyError::AuthFailure(format!("unreadable token response: {}", e)))?;
        Ok(Credential::issued_now(body.access_token))
    }
}
