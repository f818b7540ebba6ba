//! HTTP front end
//!
//! Routes requests to the [`Assistant`] and renders every failure as
//! `{"error": "<message>"}`.

pub mod routes;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::assistant::Assistant;
use crate::error::{GmailApiError, MailPalError, Result};

pub const HEALTH_PATH: &str = "/health";
pub const ANALYZE_PATH: &str = "/api/analyze";
pub const REFINE_PATH: &str = "/api/refine";
pub const FEEDBACK_PATH: &str = "/api/feedback";
pub const FEEDBACK_SUMMARY_PATH: &str = "/api/feedback/summary";
pub const FEEDBACK_ENTRY_PATH: &str = "/api/feedback/entries/:feedback_id";
pub const DRAFTS_PATH: &str = "/api/drafts";
pub const DRAFT_PATH: &str = "/api/drafts/:draft_id";
pub const APPLY_DRAFT_PATH: &str = "/api/drafts/:draft_id/apply";

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

/// Build the full router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(routes::health))
        .route(ANALYZE_PATH, post(routes::analyze))
        .route(REFINE_PATH, post(routes::refine))
        .route(FEEDBACK_PATH, get(routes::list_feedback).post(routes::feedback))
        .route(FEEDBACK_SUMMARY_PATH, get(routes::feedback_summary))
        .route(FEEDBACK_ENTRY_PATH, get(routes::get_feedback))
        .route(DRAFTS_PATH, get(routes::list_drafts))
        .route(DRAFT_PATH, get(routes::get_draft))
        .route(APPLY_DRAFT_PATH, post(routes::apply_draft))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MailPal listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

impl MailPalError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            MailPalError::Validation(_) => StatusCode::BAD_REQUEST,
            MailPalError::Auth(_) => StatusCode::UNAUTHORIZED,
            MailPalError::Gmail(GmailApiError::DraftNotFound { .. })
            | MailPalError::FeedbackNotFound { .. } => StatusCode::NOT_FOUND,
            MailPalError::Gmail(_) | MailPalError::Llm(_) | MailPalError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            MailPalError::Config(_) | MailPalError::Io(_) | MailPalError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for MailPalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", message);
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LlmError, ValidationError};

    #[test]
    fn test_status_codes() {
        let validation: MailPalError = ValidationError::MissingField {
            field: "draft_id".to_string(),
        }
        .into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let not_found: MailPalError = GmailApiError::DraftNotFound {
            draft_id: "x".to_string(),
        }
        .into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let no_feedback = MailPalError::FeedbackNotFound {
            feedback_id: "feedback_x".to_string(),
        };
        assert_eq!(no_feedback.status_code(), StatusCode::NOT_FOUND);

        let upstream: MailPalError = LlmError::EmptyCompletion.into();
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
    }
}
