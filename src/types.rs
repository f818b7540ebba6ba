//! Domain types exchanged between the HTTP front end and the workflow.

use serde::{Deserialize, Serialize};

/// Read-only snapshot of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailData {
    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub content: String,
}

impl EmailData {
    pub fn new(subject: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            content: content.into(),
        }
    }

    /// Subject and content joined for text analysis
    pub fn full_text(&self) -> String {
        format!("{} {}", self.subject, self.content)
    }
}

/// Labels inferred for a draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextInfo {
    #[serde(default)]
    pub intent: String,

    #[serde(default)]
    pub tone: String,

    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One row of the draft listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSummary {
    pub id: String,
    pub message_id: String,
    pub subject: String,
    pub snippet: String,
}

/// Result of the analyze step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub email_data: EmailData,
    pub context_info: ContextInfo,
}
