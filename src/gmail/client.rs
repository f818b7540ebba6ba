//! Gmail API client
//!
//! High-level client for the Gmail draft endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::gmail::USER_ID;
use crate::error::{GmailApiError, MailPalError, Result};
use crate::gmail::auth::Authenticator;
use crate::gmail::types::*;
use crate::gmail::utils::{
    create_draft_message, encode_raw_message, message_body, message_header, DraftParams,
};
use crate::gmail::DraftStore;
use crate::types::{DraftSummary, EmailData};

/// Gmail API client
pub struct GmailClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// OAuth authenticator
    authenticator: Arc<Authenticator>,

    /// API base URL, e.g. `https://gmail.googleapis.com/gmail/v1`
    base_url: String,
}

impl GmailClient {
    /// Create a new Gmail client
    pub fn new(authenticator: Arc<Authenticator>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            authenticator,
            base_url: base_url.into(),
        }
    }

    /// Get a valid access token
    async fn access_token(&self) -> Result<String> {
        self.authenticator.get_access_token().await
    }

    /// Base URL for drafts
    fn drafts_url(&self) -> String {
        format!("{}/users/{}/drafts", self.base_url, USER_ID)
    }

    /// Get a draft by ID
    pub async fn get_draft(&self, draft_id: &str, format: &str) -> Result<Draft> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/{}?format={}",
            self.drafts_url(),
            urlencoding::encode(draft_id),
            format
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            // Gmail answers 400 for ids that are not draft ids at all
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                Err(MailPalError::Gmail(GmailApiError::DraftNotFound {
                    draft_id: draft_id.to_string(),
                }))
            }
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(MailPalError::Gmail(GmailApiError::RequestFailed {
                    message: format!("Failed to get draft ({}): {}", status, text),
                }))
            }
        }
    }

    /// List draft references
    pub async fn list_draft_refs(&self, max_results: u32) -> Result<DraftList> {
        let token = self.access_token().await?;
        let url = format!("{}?maxResults={}", self.drafts_url(), max_results);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(MailPalError::Gmail(GmailApiError::RequestFailed {
                message: format!("Failed to list drafts ({}): {}", status, text),
            }))
        }
    }

    /// Replace the message of a draft
    pub async fn put_draft(&self, draft_id: &str, message: RawMessage) -> Result<Draft> {
        let token = self.access_token().await?;
        let url = format!("{}/{}", self.drafts_url(), urlencoding::encode(draft_id));

        let request = UpdateDraftRequest {
            id: draft_id.to_string(),
            message,
        };

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(MailPalError::Gmail(GmailApiError::DraftNotFound {
                draft_id: draft_id.to_string(),
            })),
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(MailPalError::Gmail(GmailApiError::RequestFailed {
                    message: format!("Failed to update draft ({}): {}", status, text),
                }))
            }
        }
    }
}

#[async_trait]
impl DraftStore for GmailClient {
    async fn list_drafts(&self, max_results: u32) -> Result<Vec<DraftSummary>> {
        let list = self.list_draft_refs(max_results).await?;

        let mut results = Vec::with_capacity(list.drafts.len());
        for draft_ref in list.drafts {
            // Drafts can disappear between the list and the fetch
            let draft = match self.get_draft(&draft_ref.id, "metadata").await {
                Ok(draft) => draft,
                Err(MailPalError::Gmail(GmailApiError::DraftNotFound { .. })) => continue,
                Err(e) => return Err(e),
            };

            results.push(DraftSummary {
                subject: message_header(&draft.message, "subject"),
                snippet: draft.message.snippet.clone().unwrap_or_default(),
                message_id: draft_ref.message.id,
                id: draft.id,
            });
        }

        Ok(results)
    }

    async fn capture_draft(&self, draft_id: &str) -> Result<EmailData> {
        let draft = self.get_draft(draft_id, "full").await?;

        Ok(EmailData {
            subject: message_header(&draft.message, "subject"),
            content: message_body(&draft.message),
        })
    }

    async fn update_draft(&self, draft_id: &str, subject: Option<&str>, body: &str) -> Result<()> {
        let current = self.get_draft(draft_id, "metadata").await?;
        let message = &current.message;

        let params = DraftParams {
            to: message_header(message, "to"),
            cc: message_header(message, "cc"),
            subject: subject
                .map(str::to_string)
                .unwrap_or_else(|| message_header(message, "subject")),
            body: body.to_string(),
            in_reply_to: message_header(message, "in-reply-to"),
        };

        let raw = RawMessage {
            raw: encode_raw_message(&create_draft_message(&params)),
            thread_id: message.thread_id.clone(),
        };

        let updated = self.put_draft(draft_id, raw).await?;
        tracing::info!("Updated draft {} (message {})", updated.id, updated.message.id);

        Ok(())
    }
}
