use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use rotator_core::config::{Credentials, ProxyConfig};
use rotator_core::protocol::StatusSnapshot;

use crate::error::{ProxyError, Result};
use crate::helix::StatusAdapter;
use crate::token::{CredentialCache, TokenProvider};

/// Path the original serverless client calls; served by the same handler.
pub const LEGACY_STATUS_PATH: &str = "/.netlify/functions/streams";

#[derive(Clone)]
pub struct AppState {
    adapter: StatusAdapter,
    credentials: Option<Arc<Credentials>>,
}

impl AppState {
    pub fn new(
        config: &ProxyConfig,
        credentials: Option<Credentials>,
        cache: Arc<dyn CredentialCache>,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let tokens = TokenProvider::new(http.clone(), config.token_url.clone(), cache);
        Ok(Self {
            adapter: StatusAdapter::new(http, &config.api_url, tokens),
            credentials: credentials.map(Arc::new),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    streamers: Option<String>,
}

/// Comma-separated identifiers, trimmed, empties dropped.
fn parse_streamers(raw: Option<&str>) -> Result<Vec<String>> {
    let ids: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        return Err(ProxyError::BadRequest);
    }
    Ok(ids)
}

async fn get_status(
    State(state): State<AppState>,
    query: std::result::Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<StatusSnapshot>> {
    // Missing secrets are reported before anything about the request.
    let credentials = state.credentials.as_deref().ok_or(ProxyError::Config)?;
    let streamers = match &query {
        Ok(Query(q)) => q.streamers.as_deref(),
        Err(e) => {
            debug!("status: unreadable query ({})", e);
            None
        }
    };
    let ids = parse_streamers(streamers)?;

    match state.adapter.fetch_status(credentials, &ids).await {
        Ok(snapshot) => {
            info!(
                "status: {} channel(s), {} live",
                snapshot.len(),
                snapshot.live_count()
            );
            Ok(Json(snapshot))
        }
        Err(e) => {
            error!("status: {}", e);
            Err(e)
        }
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/status", get(get_status).options(preflight))
        .route(LEGACY_STATUS_PATH, get(get_status).options(preflight))
        .layer(cors)
        .with_state(state)
}

/// Bind the listener, then serve on a spawned task.  A bind failure is
/// returned to the caller instead of being swallowed by the task.
pub async fn start_server(
    bind_address: &str,
    port: u16,
    state: AppState,
) -> anyhow::Result<tokio::task::JoinHandle<anyhow::Result<()>>> {
    let addr = format!("{}:{}", bind_address, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!("Failed to bind status proxy to {}: {}", addr, e);
        anyhow::anyhow!("cannot bind status proxy to {}: {}", addr, e)
    })?;
    info!("Status proxy listening on http://{}/status", addr);

    let app = router(state);
    Ok(tokio::spawn(async move {
        axum::serve(listener, app).await.map_err(|e| {
            error!("Status proxy error: {}", e);
            anyhow::Error::from(e)
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_streamers_trims_and_drops_empties() {
        let ids = parse_streamers(Some(" A, ,B ,")).unwrap();
        assert_eq!(ids, ["A", "B"]);
    }

    #[test]
    fn test_parse_streamers_rejects_missing_or_blank() {
        assert!(matches!(parse_streamers(None), Err(ProxyError::BadRequest)));
        assert!(matches!(parse_streamers(Some("")), Err(ProxyError::BadRequest)));
        assert!(matches!(parse_streamers(Some(" , ")), Err(ProxyError::BadRequest)));
    }

    #[tokio::test]
    async fn test_start_server_reports_occupied_port() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let state = AppState::new(
            &ProxyConfig::default(),
            None,
            Arc::new(crate::token::MemoryCredentialCache::new()),
        )
        .unwrap();

        let result = start_server("127.0.0.1", port, state).await;
        assert!(result.is_err());
    }
}
