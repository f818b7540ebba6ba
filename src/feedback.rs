//! Feedback storage
//!
//! Each submission becomes one JSON file in the feedback directory. Nothing
//! links a record back to the draft it was about.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ensure_dir;
use crate::error::Result;

/// A stored feedback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub feedback_id: String,

    #[serde(default)]
    pub feedback: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// RFC 3339 time of submission
    pub timestamp: String,
}

/// Aggregate view over all stored feedback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total_entries: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub positive_percent: f64,
    pub negative_percent: f64,
    pub neutral_percent: f64,
    pub categories: BTreeMap<String, usize>,
}

/// File-backed feedback sink
pub struct FeedbackCollector {
    dir: PathBuf,
}

impl FeedbackCollector {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build a record with a fresh id and timestamp
    pub fn new_record(
        feedback: String,
        rating: Option<i64>,
        category: Option<String>,
    ) -> FeedbackRecord {
        let now = chrono::Utc::now();
        let suffix = uuid::Uuid::new_v4().simple().to_string();

        FeedbackRecord {
            feedback_id: format!("feedback_{}_{}", now.format("%Y%m%d%H%M%S"), &suffix[..8]),
            feedback,
            rating,
            category,
            timestamp: now.to_rfc3339(),
        }
    }

    fn path_for(&self, feedback_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", feedback_id))
    }

    /// Write a record to disk
    pub async fn store(&self, record: &FeedbackRecord) -> Result<()> {
        ensure_dir(&self.dir)?;
        let content = serde_json::to_string_pretty(record)?;
        tokio::fs::write(self.path_for(&record.feedback_id), content).await?;
        Ok(())
    }

    /// Read one record, `None` when it does not exist
    pub async fn get(&self, feedback_id: &str) -> Result<Option<FeedbackRecord>> {
        // Ids become file names
        if feedback_id.is_empty()
            || !feedback_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Ok(None);
        }

        let path = self.path_for(feedback_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// All records, newest first, at most `limit` when given
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<FeedbackRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<FeedbackRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping unreadable feedback file {}: {}", path.display(), e),
            }
        }

        // RFC 3339 timestamps in UTC sort lexicographically
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            records.truncate(limit);
        }

        Ok(records)
    }

    /// Rating buckets and category counts over all records
    pub async fn summary(&self) -> Result<FeedbackSummary> {
        Ok(summarize(&self.list(None).await?))
    }
}

/// Bucket ratings (>3 positive, <3 negative, 3 neutral; missing counts as 0)
pub fn summarize(records: &[FeedbackRecord]) -> FeedbackSummary {
    let total = records.len();
    if total == 0 {
        return FeedbackSummary::default();
    }

    let mut summary = FeedbackSummary {
        total_entries: total,
        ..Default::default()
    };

    for record in records {
        match record.rating.unwrap_or(0) {
            r if r > 3 => summary.positive += 1,
            r if r < 3 => summary.negative += 1,
            _ => summary.neutral += 1,
        }

        let category = record.category.clone().unwrap_or_else(|| "unknown".to_string());
        *summary.categories.entry(category).or_insert(0) += 1;
    }

    let percent = |n: usize| n as f64 / total as f64 * 100.0;
    summary.positive_percent = percent(summary.positive);
    summary.negative_percent = percent(summary.negative);
    summary.neutral_percent = percent(summary.neutral);

    summary
}
