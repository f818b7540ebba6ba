//! Local text heuristics
//!
//! Keyword extraction, rule-based intent classification and tone merging.
//! The language model's labels take precedence; these fill the gaps.

pub mod intent;
pub mod keywords;
pub mod refinement;

use crate::types::{ContextInfo, EmailData};

pub use intent::Intent;

/// Heuristic context for a draft: keywords, intent and the intent's usual tone
pub fn analyze(email: &EmailData) -> ContextInfo {
    let text = email.full_text();
    let intent = intent::classify(&text);

    ContextInfo {
        intent: intent.as_str().to_string(),
        tone: intent.recommended_tone().to_string(),
        keywords: keywords::extract(&text),
    }
}
