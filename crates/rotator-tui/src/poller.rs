//! Status poller: asks the proxy for the live state of the roster.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use rotator_core::protocol::{ErrorBody, StatusSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("proxy unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Proxy { status: u16, message: String },

    #[error("unexpected reply from proxy: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct StatusPoller {
    http: Client,
    url: String,
}

impl StatusPoller {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }

    pub async fn fetch(&self, channels: &[String]) -> Result<StatusSnapshot, PollError> {
        if channels.is_empty() {
            return Ok(StatusSnapshot::new());
        }
        debug!("poller: requesting {} channel(s)", channels.len());

        let response = self
            .http
            .get(&self.url)
            .query(&[("streamers", channels.join(","))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PollError::Proxy {
                status: status.as_u16(),
                message: describe_error(&text),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Best human-readable line from a proxy error body.
fn describe_error(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(e) => match e.details.or(e.message) {
            Some(extra) if !extra.is_empty() => format!("{}: {}", e.error, extra),
            _ => e.error,
        },
        Err(_) if body.trim().is_empty() => "proxy error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn poller(server: &MockServer) -> StatusPoller {
        StatusPoller::new(format!("{}/status", server.uri()), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_comma_joined_roster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(query_param("streamers", "A,B"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "A": {"live": true, "title": "t", "game": "Chess", "viewers": 5},
                "B": {"live": false}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let snap = poller(&server)
            .await
            .fetch(&["A".to_string(), "B".to_string()])
            .await
            .unwrap();
        assert!(snap.is_live("A"));
        assert!(!snap.is_live("B"));
        assert_eq!(snap.get("A").unwrap().category.as_deref(), Some("Chess"));
    }

    #[tokio::test]
    async fn test_empty_roster_skips_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let snap = poller(&server).await.fetch(&[]).await.unwrap();
        assert!(snap.is_empty());
    }

    #[tokio::test]
    async fn test_proxy_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "Twitch API error",
                "status": 401,
                "details": "invalid token"
            })))
            .mount(&server)
            .await;

        let err = poller(&server)
            .await
            .fetch(&["A".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Twitch API error: invalid token (HTTP 401)");
    }

    #[tokio::test]
    async fn test_slow_proxy_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let result = poller(&server).await.fetch(&["A".to_string()]).await;
        assert!(matches!(result, Err(PollError::Network(_))));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = poller(&server)
            .await
            .fetch(&["A".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::Decode(_)));
        assert!(err.to_string().starts_with("unexpected reply from proxy"));
    }

    #[test]
    fn test_describe_error_falls_back_to_raw_text() {
        assert_eq!(describe_error("bad gateway"), "bad gateway");
        assert_eq!(describe_error(""), "proxy error");
        assert_eq!(
            describe_error(r#"{"error":"Missing streamers parameter"}"#),
            "Missing streamers parameter"
        );
    }
}
