//! MailPal
//!
//! A drafting assistant for Gmail: reads a draft, labels its intent and tone,
//! asks a language model for a refined rewrite and collects feedback on the
//! result. Served over a small JSON HTTP API.

pub mod analysis;
pub mod assistant;
pub mod config;
pub mod error;
pub mod feedback;
pub mod gmail;
pub mod llm;
pub mod server;
pub mod types;

pub use assistant::Assistant;
pub use config::Config;
pub use error::{MailPalError, Result};
