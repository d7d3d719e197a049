//! CAPS curriculum topics and the resources catalogue.
//!
//! The topic table is a hand-curated JSON list of explanations keyed by
//! grade, subject and trigger keywords. It is consulted before any textbook
//! retrieval; the first matching entry wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::meta::{Grade, Subject};

/// One curated explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub grade: Grade,
    pub subject: Subject,
    pub keywords: Vec<String>,
    pub topic: String,
    pub explanation: String,
    #[serde(default)]
    pub video: Option<String>,
}

/// Ordered list of curated topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicTable {
    topics: Vec<Topic>,
}

impl TopicTable {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    /// Loads the table from a JSON array. A missing file gives an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "topics file not found, CAPS lookup disabled");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read topics file: {}", path.display()))?;
        let topics: Vec<Topic> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse topics file: {}", path.display()))?;
        info!(path = %path.display(), topics = topics.len(), "loaded CAPS topics");
        Ok(Self { topics })
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// First topic with this grade and subject whose keyword appears in the question.
    pub fn lookup(&self, grade: Grade, subject: Subject, question: &str) -> Option<&Topic> {
        let q = question.to_lowercase();
        self.topics.iter().find(|t| {
            t.grade == grade
                && t.subject == subject
                && t.keywords
                    .iter()
                    .any(|kw| !kw.is_empty() && q.contains(&kw.to_lowercase()))
        })
    }
}

/// Loads the resources catalogue (grade → subject → topic list) as raw JSON.
///
/// The catalogue is served verbatim, so its shape is not validated beyond
/// being a JSON object. A missing file gives an empty object.
pub fn load_resources(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        warn!(path = %path.display(), "resources file not found");
        return Ok(serde_json::Value::Object(Default::default()));
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resources file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse resources file: {}", path.display()))?;
    if !value.is_object() {
        anyhow::bail!("resources file must contain a JSON object: {}", path.display());
    }
    Ok(value)
}
