//! The analyze → refine → feedback workflow
//!
//! Stateless: every call goes out to the draft store and the model again.

use std::sync::Arc;

use crate::analysis::{self, refinement};
use crate::error::{LlmError, MailPalError, Result, ValidationError};
use crate::feedback::{FeedbackCollector, FeedbackRecord, FeedbackSummary};
use crate::gmail::DraftStore;
use crate::llm::prompts::{analysis_prompt, parse_labels, refine_prompt};
use crate::llm::LanguageModel;
use crate::types::{Analysis, ContextInfo, DraftSummary, EmailData};

/// Draft assistant shared by all request handlers
pub struct Assistant {
    drafts: Arc<dyn DraftStore>,
    model: Arc<dyn LanguageModel>,
    feedback: FeedbackCollector,
}

impl Assistant {
    pub fn new(
        drafts: Arc<dyn DraftStore>,
        model: Arc<dyn LanguageModel>,
        feedback: FeedbackCollector,
    ) -> Self {
        Self {
            drafts,
            model,
            feedback,
        }
    }

    /// Fetch a draft and label its intent and tone
    pub async fn analyze(&self, draft_id: &str) -> Result<Analysis> {
        let draft_id = require_draft_id(draft_id)?;

        let email_data = self.drafts.capture_draft(draft_id).await?;
        let mut context_info = analysis::analyze(&email_data);

        let reply = self.model.complete(&analysis_prompt(&email_data)).await?;
        match parse_labels(&reply) {
            Some(labels) => {
                if labels.intent.is_empty() || labels.tone.is_empty() {
                    tracing::warn!(draft_id, "Model left a label empty, keeping heuristic value");
                }
                if !labels.intent.is_empty() {
                    context_info.intent = labels.intent;
                }
                if !labels.tone.is_empty() {
                    context_info.tone = labels.tone;
                }
            }
            None => {
                tracing::warn!(draft_id, "Model reply had no JSON labels, using heuristics");
            }
        }

        tracing::info!(
            draft_id,
            intent = %context_info.intent,
            tone = %context_info.tone,
            "Analyzed draft"
        );

        Ok(Analysis {
            email_data,
            context_info,
        })
    }

    /// Ask the model for a rewrite in the merged tone
    pub async fn refine(
        &self,
        email_data: &EmailData,
        context_info: &ContextInfo,
        user_instruction: &str,
    ) -> Result<String> {
        let refined_tone =
            refinement::merge_user_instructions(&context_info.tone, user_instruction);
        let prompt = refine_prompt(email_data, &context_info.intent, &refined_tone);

        let refined = self.model.complete(&prompt).await?;
        let refined = refined.trim();
        if refined.is_empty() {
            return Err(MailPalError::Llm(LlmError::EmptyCompletion));
        }

        tracing::info!(tone = %refined_tone, chars = refined.len(), "Refined draft");
        Ok(refined.to_string())
    }

    /// Record feedback; storage failures are logged, never returned
    pub async fn submit_feedback(
        &self,
        feedback: String,
        rating: Option<i64>,
        category: Option<String>,
    ) -> FeedbackRecord {
        let record = FeedbackCollector::new_record(feedback, rating, category);

        tracing::info!(
            feedback_id = %record.feedback_id,
            rating = ?record.rating,
            category = ?record.category,
            "Feedback received: {}",
            record.feedback
        );

        if let Err(e) = self.feedback.store(&record).await {
            tracing::warn!(
                feedback_id = %record.feedback_id,
                "Failed to store feedback in {}: {}",
                self.feedback.dir().display(),
                e
            );
        }

        record
    }

    pub async fn feedback_summary(&self) -> Result<FeedbackSummary> {
        self.feedback.summary().await
    }

    /// Stored feedback, newest first
    pub async fn list_feedback(&self, limit: Option<usize>) -> Result<Vec<FeedbackRecord>> {
        self.feedback.list(limit).await
    }

    pub async fn get_feedback(&self, feedback_id: &str) -> Result<FeedbackRecord> {
        self.feedback
            .get(feedback_id)
            .await?
            .ok_or_else(|| MailPalError::FeedbackNotFound {
                feedback_id: feedback_id.to_string(),
            })
    }

    pub async fn list_drafts(&self, max_results: u32) -> Result<Vec<DraftSummary>> {
        self.drafts.list_drafts(max_results).await
    }

    pub async fn get_draft(&self, draft_id: &str) -> Result<EmailData> {
        self.drafts.capture_draft(require_draft_id(draft_id)?).await
    }

    /// Write refined text back into the draft
    pub async fn apply(&self, draft_id: &str, subject: Option<&str>, body: &str) -> Result<()> {
        let draft_id = require_draft_id(draft_id)?;
        if body.trim().is_empty() {
            return Err(MailPalError::Validation(ValidationError::MissingField {
                field: "refined_text".to_string(),
            }));
        }
        self.drafts.update_draft(draft_id, subject, body).await
    }
}

fn require_draft_id(draft_id: &str) -> Result<&str> {
    let draft_id = draft_id.trim();
    if draft_id.is_empty() {
        return Err(MailPalError::Validation(ValidationError::MissingField {
            field: "draft_id".to_string(),
        }));
    }
    Ok(draft_id)
}
