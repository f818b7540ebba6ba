//! Request and response bodies of the HTTP API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::types::{ContextInfo, EmailData};

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "draft_id is required"))]
    pub draft_id: String,
}

/// Body of `POST /api/refine`
///
/// Both snapshots are optional on the wire so a missing one is reported as
/// an error payload instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub email_data: Option<EmailData>,

    #[serde(default)]
    pub context_info: Option<ContextInfo>,

    #[serde(default)]
    pub user_instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineResponse {
    pub refined_text: String,
}

/// Body of `POST /api/feedback`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub feedback: String,

    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<i64>,

    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<String>,
}

/// Feedback text; non-string values are kept as their JSON text
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Accept any JSON value as a rating so feedback is never rejected for it
///
/// Integers pass through, fractional numbers are rounded and numeric strings
/// are parsed. Anything else becomes `None`.
fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let rating = coerce_rating(&value);
        if rating.is_none() && !value.is_null() {
            tracing::warn!("Ignoring non-numeric feedback rating: {}", value);
        }
        rating
    }))
}

fn coerce_rating(value: &Value) -> Option<i64> {
    let from_float = |f: f64| f.is_finite().then(|| f.round() as i64);
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(from_float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_float))
        }
        _ => None,
    }
}

/// Plain acknowledgment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
}

impl Ack {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            feedback_id: None,
            draft_id: None,
        }
    }
}

/// Query of `GET /api/drafts`
#[derive(Debug, Clone, Deserialize)]
pub struct ListDraftsQuery {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    10
}

/// Query of `GET /api/feedback`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFeedbackQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Body of `POST /api/drafts/:draft_id/apply`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ApplyRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "refined_text is required"))]
    pub refined_text: String,

    #[serde(default)]
    pub subject: Option<String>,
}
