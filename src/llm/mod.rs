//! Language model access
//!
//! An OpenAI-compatible chat-completions client plus the prompts MailPal sends.

pub mod client;
pub mod prompts;

use async_trait::async_trait;

use crate::error::Result;

/// Text-in, text-out completion
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single user prompt and return the model's reply
    async fn complete(&self, prompt: &str) -> Result<String>;
}
