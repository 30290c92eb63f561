use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rotator_core::protocol::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Missing streamers parameter")]
    BadRequest,

    #[error(
        "Twitch credentials not configured. Set TWITCH_CLIENT_ID and TWITCH_CLIENT_SECRET in the environment."
    )]
    Config,

    #[error("Failed to get access token: {0}")]
    AuthFailure(String),

    #[error("upstream returned {status}: {details}")]
    Upstream { status: u16, details: String },

    #[error("{0}")]
    Network(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Config | Self::AuthFailure(_) | Self::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::BadRequest | Self::Config => ErrorBody::new(self.to_string()),
            Self::Upstream { status, details } => ErrorBody {
                status: Some(*status),
                details: Some(details.clone()),
                ..ErrorBody::new("Twitch API error")
            },
            Self::AuthFailure(_) | Self::Network(_) => ErrorBody {
                message: Some(self.to_string()),
                ..ErrorBody::new("Internal server error")
            },
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_keeps_status_and_details() {
        let err = ProxyError::Upstream {
            status: 429,
            details: "slow down".into(),
        };
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        let body = err.body();
        assert_eq!(body.error, "Twitch API error");
        assert_eq!(body.status, Some(429));
        assert_eq!(body.details.as_deref(), Some("slow down"));
        assert_eq!(body.message, None);
    }

    #[test]
    fn test_auth_failure_is_an_internal_error() {
        let err = ProxyError::AuthFailure("400 Bad Request".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body.error, "Internal server error");
        assert_eq!(
            body.message.as_deref(),
            Some("Failed to get access token: 400 Bad Request")
        );
    }

    #[test]
    fn test_bad_request_body() {
        let body = ProxyError::BadRequest.body();
        assert_eq!(body, ErrorBody::new("Missing streamers parameter"));
    }
}
