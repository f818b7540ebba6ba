//! Gmail utility functions
//!
//! Draft message creation and content extraction utilities.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::{MailPalError, Result, ValidationError};
use crate::gmail::types::{EmailContent, Message, MessagePart};

/// Encode text for MIME header (RFC 2047)
pub fn encode_mime_header(text: &str) -> String {
    // Check if encoding is needed (non-ASCII characters)
    if text.chars().all(|c| c.is_ascii() && c != '\r' && c != '\n') {
        return text.to_string();
    }

    format!(
        "=?UTF-8?B?{}?=",
        base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
    )
}

/// Encode a raw email message for Gmail API (base64url, no padding)
pub fn encode_raw_message(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

/// Decode base64url data from Gmail API
/// Handles both padded and non-padded base64url encoding
pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(data)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE.decode(data))
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(data))
        .map_err(|e| {
            MailPalError::Validation(ValidationError::InvalidParameter {
                name: "base64 data".to_string(),
                message: e.to_string(),
            })
        })
}

/// Decode base64url data to string
pub fn decode_base64url_string(data: &str) -> Result<String> {
    let bytes = decode_base64url(data)?;
    String::from_utf8(bytes).map_err(|e| {
        MailPalError::Validation(ValidationError::InvalidParameter {
            name: "UTF-8 content".to_string(),
            message: e.to_string(),
        })
    })
}

/// Recursively extract email body content from MIME message parts
pub fn extract_email_content(message_part: &MessagePart) -> EmailContent {
    let mut content = EmailContent::default();

    let mime_type = message_part.mime_type.as_deref().unwrap_or("");

    if let Some(data) = message_part.body.as_ref().and_then(|b| b.data.as_ref()) {
        // Only text parts; attachments carry no inline data we care about
        if mime_type.starts_with("text/") {
            match decode_base64url_string(data) {
                Ok(decoded) => {
                    if mime_type == "text/plain" {
                        content.text = decoded;
                    } else if mime_type == "text/html" {
                        content.html = decoded;
                    }
                }
                Err(e) => {
                    tracing::debug!("Failed to decode {} part: {}", mime_type, e);
                }
            }
        }
    }

    // multipart/alternative, multipart/mixed, multipart/related, ...
    for part in &message_part.parts {
        let nested = extract_email_content(part);
        content.text.push_str(&nested.text);
        content.html.push_str(&nested.html);
    }

    content
}

/// Find header value by name (case-insensitive)
pub fn find_header<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Header value from a message payload, empty when absent
pub fn message_header(message: &Message, name: &str) -> String {
    message
        .payload
        .as_ref()
        .and_then(|p| find_header(p, name))
        .unwrap_or("")
        .to_string()
}

/// Body text of a message: plain text, then HTML, then the snippet
pub fn message_body(message: &Message) -> String {
    let content = message
        .payload
        .as_ref()
        .map(extract_email_content)
        .unwrap_or_default();

    if !content.text.is_empty() {
        content.text
    } else if !content.html.is_empty() {
        content.html
    } else {
        tracing::debug!(
            "Message {} body extraction returned empty, using snippet fallback",
            message.id
        );
        message.snippet.clone().unwrap_or_default()
    }
}

/// Fields needed to rebuild a draft message
#[derive(Debug, Clone, Default)]
pub struct DraftParams {
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub body: String,
    pub in_reply_to: String,
}

/// Create a plain-text RFC822 message for a draft
pub fn create_draft_message(params: &DraftParams) -> String {
    let mut lines = Vec::new();

    if !params.to.is_empty() {
        lines.push(format!("To: {}", params.to));
    }
    if !params.cc.is_empty() {
        lines.push(format!("Cc: {}", params.cc));
    }

    lines.push(format!("Subject: {}", encode_mime_header(&params.subject)));

    if !params.in_reply_to.is_empty() {
        lines.push(format!("In-Reply-To: {}", params.in_reply_to));
        lines.push(format!("References: {}", params.in_reply_to));
    }

    lines.push("MIME-Version: 1.0".to_string());
    lines.push("Content-Type: text/plain; charset=UTF-8".to_string());
    lines.push("Content-Transfer-Encoding: 8bit".to_string());
    lines.push(String::new());
    lines.push(params.body.replace("\r\n", "\n").replace('\n', "\r\n"));

    lines.join("\r\n")
}
