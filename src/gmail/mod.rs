//! Gmail API module
//!
//! Contains types, authentication, and client for interacting with the Gmail API.

pub mod auth;
pub mod client;
pub mod types;
pub mod utils;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DraftSummary, EmailData};

/// Source and sink of drafts
///
/// Implemented by [`client::GmailClient`]; the HTTP layer only sees this trait.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// List up to `max_results` drafts
    async fn list_drafts(&self, max_results: u32) -> Result<Vec<DraftSummary>>;

    /// Read a draft as a subject/content snapshot
    async fn capture_draft(&self, draft_id: &str) -> Result<EmailData>;

    /// Replace a draft's body, and its subject when `subject` is given
    async fn update_draft(&self, draft_id: &str, subject: Option<&str>, body: &str) -> Result<()>;
}
