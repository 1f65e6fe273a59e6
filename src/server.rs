//! HTTP surface: the reading endpoint and the diagnostics endpoint.
//!
//! `POST /api/palm-reading` accepts a multipart submission with two named
//! image fields and responds with the raw model text (the browser client
//! renders it into sections itself). Failures come back as a JSON error
//! object with a category-appropriate status — see
//! [`ReadingError::http_status`]. Validation failures never reach the
//! provider.
//!
//! `GET /api/health` reports process, environment, and credential-presence
//! diagnostics for operators; it is intentionally unauthenticated and leaks
//! only key *presence* and length, never key material.
//!
//! The body limit on the reading route is disabled: no size limit is
//! enforced on uploads and oversized photos are passed through to the
//! provider unmodified. Known soft spot — the provider's own upload cap is
//! the only backstop.

use crate::config::ReadingConfig;
use crate::error::{HandSide, ReadingError};
use crate::output::PalmImage;
use crate::pipeline::input::sniff_mime_type;
use crate::reading::{read_palms, resolve_provider};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Multipart field name for the left palm image.
pub const FIELD_LEFT: &str = "leftPalmImage";
/// Multipart field name for the right palm image.
pub const FIELD_RIGHT: &str = "rightPalmImage";

/// Application state shared across routes.
#[derive(Clone)]
struct AppState {
    config: Arc<ReadingConfig>,
}

/// Build the application router.
///
/// Exposed separately from [`serve`] so tests can drive it without binding
/// a socket.
pub fn router(config: Arc<ReadingConfig>) -> Router {
    Router::new()
        .route(
            "/api/palm-reading",
            post(palm_reading).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(AppState { config })
}

/// Start the HTTP server and run until the process is stopped.
pub async fn serve(addr: SocketAddr, config: ReadingConfig) -> Result<(), ReadingError> {
    let app = router(Arc::new(config));
    info!("Reading server listening on {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ReadingError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ReadingError::Internal(format!("Server error: {}", e)))
}

// ── POST /api/palm-reading ───────────────────────────────────────────────

async fn palm_reading(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut left: Option<PalmImage> = None;
    let mut right: Option<PalmImage> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(&ReadingError::InvalidImage {
                    detail: format!("malformed multipart body: {}", e),
                });
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        let declared_type = field.content_type().map(str::to_string);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return error_response(&ReadingError::InvalidImage {
                    detail: format!("failed to read field '{}': {}", name, e),
                });
            }
        };

        // Prefer the client's declared media type; sniff when it is absent.
        let mime_type = declared_type
            .or_else(|| sniff_mime_type(&bytes).ok())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        match name.as_str() {
            FIELD_LEFT => left = Some(PalmImage::new(bytes.to_vec(), mime_type)),
            FIELD_RIGHT => right = Some(PalmImage::new(bytes.to_vec(), mime_type)),
            _ => {} // unknown fields ignored
        }
    }

    let Some(left) = left else {
        return error_response(&ReadingError::MissingImage {
            side: HandSide::Left,
        });
    };
    let Some(right) = right else {
        return error_response(&ReadingError::MissingImage {
            side: HandSide::Right,
        });
    };

    match read_palms(left, right, &state.config).await {
        Ok(output) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            output.raw,
        )
            .into_response(),
        Err(e) => {
            error!("Palm reading failed: {}", e);
            error_response(&e)
        }
    }
}

fn error_response(err: &ReadingError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(serde_json::json!({ "error": err.user_message() })),
    )
        .into_response()
}

// ── GET /api/health ──────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    timestamp: DateTime<Utc>,
    environment: EnvironmentReport,
    provider: ProviderReport,
}

#[derive(Serialize)]
struct EnvironmentReport {
    service_version: &'static str,
    log_filter: String,
}

#[derive(Serialize)]
struct ProviderReport {
    has_key: bool,
    key_length: usize,
    client_status: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let key = ["OPENAI_API_KEY", "ANTHROPIC_API_KEY", "GEMINI_API_KEY"]
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()));

    let client_status = if key.is_some() || state.config.provider.is_some() {
        match resolve_provider(&state.config) {
            Ok(_) => "initialized".to_string(),
            Err(e) => format!("error: {}", e),
        }
    } else {
        "missing API key".to_string()
    };

    Json(HealthReport {
        status: "healthy",
        timestamp: Utc::now(),
        environment: EnvironmentReport {
            service_version: env!("CARGO_PKG_VERSION"),
            log_filter: std::env::var("RUST_LOG").unwrap_or_else(|_| "unset".to_string()),
        },
        provider: ProviderReport {
            has_key: key.is_some(),
            key_length: key.map(|k| k.len()).unwrap_or(0),
            client_status,
        },
    })
}
