//! Route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::error::{MailPalError, Result, ValidationError};
use crate::feedback::{FeedbackRecord, FeedbackSummary};
use crate::server::types::*;
use crate::server::AppState;
use crate::types::{Analysis, DraftSummary, EmailData};

/// Unwrap a JSON body, turning extractor rejections into error payloads
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        MailPalError::Validation(ValidationError::InvalidBody {
            message: rejection.body_text(),
        })
    })
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Analysis>> {
    let request = body(payload)?;
    request.validate()?;

    let analysis = state.assistant.analyze(&request.draft_id).await?;
    Ok(Json(analysis))
}

pub async fn refine(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefineRequest>, JsonRejection>,
) -> Result<Json<RefineResponse>> {
    let request = body(payload)?;

    let email_data = request.email_data.ok_or_else(|| missing("email_data"))?;
    let context_info = request.context_info.ok_or_else(|| missing("context_info"))?;

    let refined_text = state
        .assistant
        .refine(&email_data, &context_info, &request.user_instruction)
        .await?;

    Ok(Json(RefineResponse { refined_text }))
}

pub async fn feedback(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<Ack>> {
    let request = body(payload)?;

    let record = state
        .assistant
        .submit_feedback(request.feedback, request.rating, request.category)
        .await;

    Ok(Json(Ack {
        feedback_id: Some(record.feedback_id),
        ..Ack::success()
    }))
}

pub async fn feedback_summary(State(state): State<AppState>) -> Result<Json<FeedbackSummary>> {
    Ok(Json(state.assistant.feedback_summary().await?))
}

pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<ListFeedbackQuery>,
) -> Result<Json<Vec<FeedbackRecord>>> {
    Ok(Json(state.assistant.list_feedback(query.limit).await?))
}

pub async fn get_feedback(
    State(state): State<AppState>,
    Path(feedback_id): Path<String>,
) -> Result<Json<FeedbackRecord>> {
    Ok(Json(state.assistant.get_feedback(&feedback_id).await?))
}

pub async fn list_drafts(
    State(state): State<AppState>,
    Query(query): Query<ListDraftsQuery>,
) -> Result<Json<Vec<DraftSummary>>> {
    let max_results = query.max_results.clamp(1, 100);
    Ok(Json(state.assistant.list_drafts(max_results).await?))
}

pub async fn get_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<String>,
) -> Result<Json<EmailData>> {
    Ok(Json(state.assistant.get_draft(&draft_id).await?))
}

pub async fn apply_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<String>,
    payload: std::result::Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<Json<Ack>> {
    let request = body(payload)?;
    request.validate()?;

    state
        .assistant
        .apply(&draft_id, request.subject.as_deref(), &request.refined_text)
        .await?;

    Ok(Json(Ack {
        draft_id: Some(draft_id),
        ..Ack::success()
    }))
}

fn missing(field: &str) -> MailPalError {
    MailPalError::Validation(ValidationError::MissingField {
        field: field.to_string(),
    })
}
