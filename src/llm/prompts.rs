//! Prompt construction and reply parsing

use schemars::JsonSchema;
use serde::Deserialize;

use crate::types::EmailData;

/// Labels the model is asked to return during analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct ContextLabels {
    /// Purpose of the email, e.g. `meeting_request`, `follow_up`, `apology`
    #[serde(default)]
    pub intent: String,

    /// Short description of the tone the email should have
    #[serde(default)]
    pub tone: String,
}

/// Prompt asking for intent/tone labels as a JSON object
pub fn analysis_prompt(email: &EmailData) -> String {
    let schema = serde_json::to_string_pretty(&schemars::schema_for!(ContextLabels))
        .unwrap_or_default();

    format!(
        "You label email drafts. Read the draft below and decide what it is for \
         (its intent, a short snake_case label) and which tone it should be written in \
         (a few words).\n\n\
         Reply with a single JSON object matching this schema and nothing else:\n{}\n\n\
         Subject: {}\n\n{}",
        schema, email.subject, email.content
    )
}

/// Parse the first JSON object in a model reply
///
/// Models often wrap JSON in prose or code fences. Each `{` is tried in turn
/// and only the one value starting there is read, so anything after it is
/// ignored. Returns `None` when no object parses.
pub fn parse_labels(reply: &str) -> Option<ContextLabels> {
    reply.match_indices('{').find_map(|(start, _)| {
        let mut labels = serde_json::Deserializer::from_str(&reply[start..])
            .into_iter::<ContextLabels>()
            .next()?
            .ok()?;
        labels.intent = labels.intent.trim().to_string();
        labels.tone = labels.tone.trim().to_string();
        Some(labels)
    })
}

/// Prompt asking for a rewritten email
pub fn refine_prompt(email: &EmailData, intent: &str, refined_tone: &str) -> String {
    let intent = if intent.trim().is_empty() { "general" } else { intent };

    format!(
        "You are an expert email editor who helps refine emails to make them more effective. \
         Please rewrite the following email with the subject line: '{}'\n\n\
         The email's purpose is {}, and it should have a tone that is {}.\n\n\
         Original email content:\n\n{}\n\n\
         Please provide an improved version that maintains the same information and intent, \
         but with refined language, tone, and structure. Keep the email concise and impactful.",
        email.subject, intent, refined_tone, email.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_embeds_schema_and_draft() {
        let email = EmailData::new("Sync next week", "Can we meet on Tuesday?");
        let prompt = analysis_prompt(&email);
        assert!(prompt.contains("\"intent\""));
        assert!(prompt.contains("\"tone\""));
        assert!(prompt.contains("Subject: Sync next week"));
        assert!(prompt.contains("Can we meet on Tuesday?"));
    }

    #[test]
    fn test_parse_labels_in_code_fence() {
        let reply = "Sure:\n```json\n{\"intent\": \" meeting_request \", \"tone\": \"courteous\"}\n```";
        let labels = parse_labels(reply).unwrap();
        assert_eq!(labels.intent, "meeting_request");
        assert_eq!(labels.tone, "courteous");
    }

    #[test]
    fn test_parse_labels_ignores_trailing_braces() {
        let reply = "{\"intent\": \"apology\", \"tone\": \"warm\"}\nLet me know if you want {more} detail.";
        let labels = parse_labels(reply).unwrap();
        assert_eq!(labels.intent, "apology");
        assert_eq!(labels.tone, "warm");
    }

    #[test]
    fn test_parse_labels_takes_first_of_two_objects() {
        let reply = "{\"intent\": \"apology\", \"tone\": \"warm\"}\n{\"intent\": \"request\", \"tone\": \"firm\"}";
        assert_eq!(parse_labels(reply).unwrap().intent, "apology");
    }

    #[test]
    fn test_parse_labels_skips_braced_prose() {
        let reply = "Labels {as requested}: {\"intent\": \"follow_up\", \"tone\": \"polite\"}";
        assert_eq!(parse_labels(reply).unwrap().intent, "follow_up");
    }

    #[test]
    fn test_parse_labels_rejects_prose() {
        assert!(parse_labels("It is a meeting request.").is_none());
        assert!(parse_labels("} nope {").is_none());
    }

    #[test]
    fn test_refine_prompt_defaults_intent() {
        let email = EmailData::new("Hi", "Body");
        let prompt = refine_prompt(&email, "", "friendly");
        assert!(prompt.contains("purpose is general"));
        assert!(prompt.contains("tone that is friendly"));
    }
}
