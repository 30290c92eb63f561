//! Upstream live-status adapter.
//!
//! Queries the platform's batch streams endpoint and turns its list of live
//! streams into a [`StatusSnapshot`] covering every requested channel.

use std::collections::HashMap;

use futures_util::future::try_join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use rotator_core::config::Credentials;
use rotator_core::protocol::{StatusRecord, StatusSnapshot};

use crate::error::{ProxyError, Result};
use crate::token::TokenProvider;

/// Upstream cap on `user_login` parameters per request.
pub const MAX_LOGINS_PER_REQUEST: usize = 100;

#[derive(Debug, Deserialize)]
struct StreamsResponse {
    #[serde(default)]
    data: Vec<StreamData>,
}

#[derive(Debug, Deserialize)]
struct StreamData {
    user_login: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    game_name: Option<String>,
    #[serde(default)]
    viewer_count: Option<u64>,
}

impl StreamData {
    fn into_record(self) -> StatusRecord {
        StatusRecord::live(
            self.title.unwrap_or_default(),
            self.game_name.unwrap_or_default(),
            self.viewer_count.unwrap_or(0),
        )
    }
}

#[derive(Clone)]
pub struct StatusAdapter {
    http: Client,
    streams_url: String,
    tokens: TokenProvider,
}

impl StatusAdapter {
    /// `api_url` is the API base; `/streams` is appended.
    pub fn new(http: Client, api_url: &str, tokens: TokenProvider) -> Self {
        Self {
            http,
            streams_url: format!("{}/streams", api_url.trim_end_matches('/')),
            tokens,
        }
    }

    /// One record per identifier, keyed by the caller's casing.  Channels the
    /// upstream does not list as live come back offline.
    pub async fn fetch_status(
        &self,
        credentials: &Credentials,
        identifiers: &[String],
    ) -> Result<StatusSnapshot> {
        if identifiers.is_empty() {
            return Err(ProxyError::BadRequest);
        }

        let token = self.tokens.token(credentials).await?;
        let batches = identifiers
            .chunks(MAX_LOGINS_PER_REQUEST)
            .map(|batch| self.fetch_batch(credentials, &token, batch));

        let mut live: HashMap<String, StatusRecord> = HashMap::new();
        for streams in try_join_all(batches).await? {
            for stream in streams {
                live.insert(stream.user_login.to_lowercase(), stream.into_record());
            }
        }
        debug!(
            "helix: {} of {} requested channel(s) live",
            live.len(),
            identifiers.len()
        );

        Ok(identifiers
            .iter()
            .map(|id| {
                let record = live
                    .get(&id.to_lowercase())
                    .cloned()
                    .unwrap_or_else(StatusRecord::offline);
                (id.clone(), record)
            })
            .collect())
    }

    async fn fetch_batch(
        &self,
        credentials: &Credentials,
        token: &str,
        batch: &[String],
    ) -> Result<Vec<StreamData>> {
        let query: Vec<(&str, &str)> = batch
            .iter()
            .map(|id| ("user_login", id.as_str()))
            .collect();

        let response = self
            .http
            .get(&self.streams_url)
            .query(&query)
            .header("Client-ID", &credentials.client_id)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!("helix: streams call failed with {}: {}", status, details);
            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate();
            }
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let body: StreamsResponse = response.json().await?;
        Ok(body.data)
    }
}
