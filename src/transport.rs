//! Transport layer for the bot.
//!
//! Supports two front ends:
//! - console: interactive prompt on stdin/stdout, for local testing
//! - http: Bot Framework messaging endpoint for Teams
//!
//! The HTTP transport is optional and requires the `http` feature flag.

/// Available transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    /// Interactive console.
    Console,

    /// Bot Framework messaging endpoint.
    #[cfg(feature = "http")]
    Http,
}

impl Default for TransportType {
    #[cfg(feature = "http")]
    fn default() -> Self {
        TransportType::Http
    }

    #[cfg(not(feature = "http"))]
    fn default() -> Self {
        TransportType::Console
    }
}

/// Error returned when parsing a transport type fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTransportTypeError(String);

impl std::fmt::Display for ParseTransportTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid transport type: '{}'", self.0)
    }
}

impl std::error::Error for ParseTransportTypeError {}

impl std::str::FromStr for TransportType {
    type Err = ParseTransportTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdio" | "cli" => Ok(TransportType::Console),
            #[cfg(feature = "http")]
            "http" | "web" => Ok(TransportType::Http),
            _ => Err(ParseTransportTypeError(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportType::Console => write!(f, "console"),
            #[cfg(feature = "http")]
            TransportType::Http => write!(f, "http"),
        }
    }
}

/// HTTP server implementation (only available with `http` feature).
///
/// Endpoints:
/// - `POST /api/messages`: Bot Framework activities, replies returned inline
/// - `GET /health`: Liveness check
#[cfg(feature = "http")]
pub mod http_server {
    use crate::activity::{Activity, ExpectedReplies};
    use crate::bot::SharedBot;
    use crate::constants::MAX_ACTIVITY_BODY_BYTES;
    use crate::shutdown::ShutdownSignal;
    use axum::{
        body::Bytes,
        extract::{DefaultBodyLimit, State},
        http::{header, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use tower_http::trace::TraceLayer;
    use tracing::{info, warn};

    /// Build the application router.
    pub fn router(bot: SharedBot) -> Router {
        Router::new()
            .route("/api/messages", post(messages_handler))
            .route("/health", get(health_handler))
            .layer(DefaultBodyLimit::max(MAX_ACTIVITY_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
            .with_state(bot)
    }

    /// Start the HTTP server, stopping when `shutdown` fires.
    pub async fn start_http_server_with_shutdown(
        bot: SharedBot,
        host: &str,
        port: u16,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), anyhow::Error> {
        let addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("HTTP server listening on http://{}", addr);
        info!("Messaging endpoint: http://{}/api/messages", addr);
        info!("Health endpoint: http://{}/health", addr);

        axum::serve(listener, router(bot))
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                info!("HTTP server received shutdown signal");
            })
            .await?;

        Ok(())
    }

    fn is_json(headers: &HeaderMap) -> bool {
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false)
    }

    async fn messages_handler(
        State(bot): State<SharedBot>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        if !is_json(&headers) {
            return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
        }

        let activity: Activity = match serde_json::from_slice(&body) {
            Ok(activity) => activity,
            Err(e) => {
                warn!("Rejected undecodable activity: {}", e);
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        let activities = bot.handle(&activity).await;
        if activities.is_empty() {
            StatusCode::CREATED.into_response()
        } else {
            (StatusCode::OK, Json(ExpectedReplies { activities })).into_response()
        }
    }

    async fn health_handler() -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "healthy",
            "message": "Bot is running!"
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transport_type() {
        assert_eq!("console".parse::<TransportType>().unwrap(), TransportType::Console);
        assert_eq!("STDIO".parse::<TransportType>().unwrap(), TransportType::Console);
        assert!("pigeon".parse::<TransportType>().is_err());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_is_default() {
        assert_eq!("web".parse::<TransportType>().unwrap(), TransportType::Http);
        assert_eq!(TransportType::default(), TransportType::Http);
        assert_eq!(TransportType::Http.to_string(), "http");
    }

    #[test]
    fn test_display_round_trip() {
        let t = TransportType::Console;
        assert_eq!(t.to_string().parse::<TransportType>().unwrap(), t);
    }
}
