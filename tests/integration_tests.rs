//! Integration tests for the MailPal HTTP API
//!
//! The router runs in-process against a fake draft store and a scripted
//! language model; nothing leaves the machine.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use mailpal::assistant::Assistant;
use mailpal::error::{GmailApiError, MailPalError, Result};
use mailpal::feedback::FeedbackCollector;
use mailpal::gmail::DraftStore;
use mailpal::llm::LanguageModel;
use mailpal::server::{router, AppState};
use mailpal::types::{DraftSummary, EmailData};

/// In-memory drafts keyed by id
#[derive(Default)]
struct FakeDrafts {
    drafts: Mutex<Vec<(String, EmailData)>>,
}

impl FakeDrafts {
    fn with(drafts: &[(&str, &str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            drafts: Mutex::new(
                drafts
                    .iter()
                    .map(|(id, subject, content)| (id.to_string(), EmailData::new(*subject, *content)))
                    .collect(),
            ),
        })
    }

    fn content_of(&self, draft_id: &str) -> Option<EmailData> {
        self.drafts
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == draft_id)
            .map(|(_, data)| data.clone())
    }
}

fn not_found(draft_id: &str) -> MailPalError {
    MailPalError::Gmail(GmailApiError::DraftNotFound {
        draft_id: draft_id.to_string(),
    })
}

#[async_trait]
impl DraftStore for FakeDrafts {
    async fn list_drafts(&self, max_results: u32) -> Result<Vec<DraftSummary>> {
        Ok(self
            .drafts
            .lock()
            .unwrap()
            .iter()
            .take(max_results as usize)
            .map(|(id, data)| DraftSummary {
                id: id.clone(),
                message_id: format!("m-{}", id),
                subject: data.subject.clone(),
                snippet: data.content.chars().take(20).collect(),
            })
            .collect())
    }

    async fn capture_draft(&self, draft_id: &str) -> Result<EmailData> {
        self.content_of(draft_id).ok_or_else(|| not_found(draft_id))
    }

    async fn update_draft(&self, draft_id: &str, subject: Option<&str>, body: &str) -> Result<()> {
        let mut drafts = self.drafts.lock().unwrap();
        let (_, data) = drafts
            .iter_mut()
            .find(|(id, _)| id == draft_id)
            .ok_or_else(|| not_found(draft_id))?;
        if let Some(subject) = subject {
            data.subject = subject.to_string();
        }
        data.content = body.to_string();
        Ok(())
    }
}

/// Answers analysis prompts with JSON labels and anything else with a rewrite
struct ScriptedModel {
    labels: String,
    rewrite: String,
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.contains("JSON") {
            Ok(self.labels.clone())
        } else {
            Ok(self.rewrite.clone())
        }
    }
}

struct TestApp {
    app: axum::Router,
    drafts: Arc<FakeDrafts>,
    feedback_dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let drafts = FakeDrafts::with(&[
        ("d1", "Sync", "can we meet tomorrow to go over the roadmap"),
        ("d2", "Thanks", "thank you for the help yesterday"),
    ]);
    let model = Arc::new(ScriptedModel {
        labels: r#"Sure: {"intent": "meeting_request", "tone": "friendly and clear"}"#.to_string(),
        rewrite: "Hi team,\n\nCould we meet tomorrow to review the roadmap?\n\nThanks".to_string(),
    });
    let feedback_dir = tempfile::tempdir().unwrap();

    let assistant = Assistant::new(
        drafts.clone(),
        model,
        FeedbackCollector::new(feedback_dir.path()),
    );
    let app = router(AppState {
        assistant: Arc::new(assistant),
    });

    TestApp {
        app,
        drafts,
        feedback_dir,
    }
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

mod analyze_tests {
    use super::*;

    #[tokio::test]
    async fn test_analyze_returns_snapshot_and_labels() {
        let t = test_app();
        let (status, body) = send(&t.app, post_json("/api/analyze", json!({"draft_id": "d1"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email_data"]["subject"], "Sync");
        assert_eq!(
            body["email_data"]["content"],
            "can we meet tomorrow to go over the roadmap"
        );
        assert_eq!(body["context_info"]["intent"], "meeting_request");
        assert_eq!(body["context_info"]["tone"], "friendly and clear");
        assert!(body["context_info"]["keywords"]
            .as_array()
            .unwrap()
            .contains(&json!("roadmap")));
    }

    #[tokio::test]
    async fn test_analyze_without_draft_id_is_an_error_payload() {
        let t = test_app();
        let (status, body) = send(&t.app, post_json("/api/analyze", json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("draft_id"));
    }

    #[tokio::test]
    async fn test_analyze_unknown_draft() {
        let t = test_app();
        let (status, body) =
            send(&t.app, post_json("/api/analyze", json!({"draft_id": "nope"}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Gmail API error: Draft not found: nope");
    }

    #[tokio::test]
    async fn test_analyze_malformed_body() {
        let t = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&t.app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

mod refine_tests {
    use super::*;

    #[tokio::test]
    async fn test_refine_returns_text() {
        let t = test_app();
        let request = post_json(
            "/api/refine",
            json!({
                "email_data": {"subject": "Sync", "content": "can we meet tomorrow"},
                "context_info": {"intent": "meeting_request", "tone": "friendly and clear"},
                "user_instruction": "make it more formal"
            }),
        );
        let (status, body) = send(&t.app, request).await;

        assert_eq!(status, StatusCode::OK);
        let text = body["refined_text"].as_str().unwrap();
        assert!(text.starts_with("Hi team,"));
    }

    #[tokio::test]
    async fn test_refine_without_context_info() {
        let t = test_app();
        let request = post_json(
            "/api/refine",
            json!({
                "email_data": {"subject": "Sync", "content": "can we meet tomorrow"},
                "user_instruction": ""
            }),
        );
        let (status, body) = send(&t.app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("context_info"));
    }

    #[tokio::test]
    async fn test_refine_without_email_data() {
        let t = test_app();
        let request = post_json(
            "/api/refine",
            json!({"context_info": {"intent": "inquiry", "tone": "polite"}}),
        );
        let (status, body) = send(&t.app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("email_data"));
    }
}

mod feedback_tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_feedback_is_acknowledged() {
        let t = test_app();
        let (status, body) = send(&t.app, post_json("/api/feedback", json!({"feedback": ""}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        let id = body["feedback_id"].as_str().unwrap();
        assert!(t.feedback_dir.path().join(format!("{}.json", id)).exists());
    }

    #[tokio::test]
    async fn test_odd_ratings_are_acknowledged() {
        let t = test_app();
        for body in [
            json!({"feedback": "good", "rating": 4.5}),
            json!({"feedback": "good", "rating": "5"}),
            json!({"feedback": "good", "rating": "five", "category": 7}),
        ] {
            let (status, ack) = send(&t.app, post_json("/api/feedback", body)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(ack["status"], "success");
            assert!(ack["feedback_id"].is_string());
        }

        let (_, summary) = send(&t.app, get("/api/feedback/summary")).await;
        assert_eq!(summary["total_entries"], 3);
        assert_eq!(summary["positive"], 2);
        assert_eq!(summary["negative"], 1);
        assert_eq!(summary["categories"]["7"], 1);
    }

    #[tokio::test]
    async fn test_list_and_get_feedback() {
        let t = test_app();
        let mut ids = Vec::new();
        for text in ["first", "second"] {
            let (_, ack) = send(&t.app, post_json("/api/feedback", json!({"feedback": text}))).await;
            ids.push(ack["feedback_id"].as_str().unwrap().to_string());
        }

        let (status, all) = send(&t.app, get("/api/feedback")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (status, limited) = send(&t.app, get("/api/feedback?limit=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(limited.as_array().unwrap().len(), 1);

        let (status, record) =
            send(&t.app, get(&format!("/api/feedback/entries/{}", ids[0]))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["feedback"], "first");

        let (status, body) = send(&t.app, get("/api/feedback/entries/feedback_missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Feedback not found: feedback_missing");
    }

    #[tokio::test]
    async fn test_feedback_summary() {
        let t = test_app();
        for (rating, category) in [(5, "tone"), (1, "tone"), (3, "accuracy")] {
            let request = post_json(
                "/api/feedback",
                json!({"feedback": "noted", "rating": rating, "category": category}),
            );
            let (status, _) = send(&t.app, request).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&t.app, get("/api/feedback/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_entries"], 3);
        assert_eq!(body["positive"], 1);
        assert_eq!(body["negative"], 1);
        assert_eq!(body["neutral"], 1);
        assert_eq!(body["categories"]["tone"], 2);
    }
}

mod draft_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let t = test_app();
        let (status, _) = send(&t.app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_drafts() {
        let t = test_app();
        let (status, body) = send(&t.app, get("/api/drafts?max_results=1")).await;

        assert_eq!(status, StatusCode::OK);
        let drafts = body.as_array().unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0]["id"], "d1");
        assert_eq!(drafts[0]["subject"], "Sync");
    }

    #[tokio::test]
    async fn test_get_draft() {
        let t = test_app();
        let (status, body) = send(&t.app, get("/api/drafts/d2")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "Thanks");
    }

    #[tokio::test]
    async fn test_apply_writes_back() {
        let t = test_app();
        let request = post_json(
            "/api/drafts/d1/apply",
            json!({"refined_text": "Could we meet tomorrow?", "subject": "Roadmap review"}),
        );
        let (status, body) = send(&t.app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["draft_id"], "d1");

        let stored = t.drafts.content_of("d1").unwrap();
        assert_eq!(stored.subject, "Roadmap review");
        assert_eq!(stored.content, "Could we meet tomorrow?");
    }

    #[tokio::test]
    async fn test_apply_requires_text() {
        let t = test_app();
        let (status, body) =
            send(&t.app, post_json("/api/drafts/d1/apply", json!({"refined_text": ""}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("refined_text"));
        assert_eq!(
            t.drafts.content_of("d1").unwrap().content,
            "can we meet tomorrow to go over the roadmap"
        );
    }
}
