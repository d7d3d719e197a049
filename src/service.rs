//! The homework-help service: CAPS lookup, textbook retrieval and reindexing.
//!
//! [`HomeworkService`] is what the HTTP server and the CLI call into. Every
//! method returns a structured response; retrieval misses are reported as
//! `found: false` with a guiding message, never as errors. Only invalid
//! input (and a reindex that cannot write its file) produce a
//! [`ServiceError`].
//!
//! # Answer pipeline
//!
//! ```text
//! question ─▶ CAPS topic? ──yes──▶ curated explanation
//!                 │no
//!                 ▼
//!           index empty? ──yes──▶ "add textbooks and reindex"
//!                 │no
//!                 ▼
//!           analyze terms ──none──▶ "ask with more detail"
//!                 │
//!                 ▼
//!     filter by grade/subject ──none──▶ "no textbook for this grade + subject"
//!                 │
//!                 ▼
//!        retrieve top documents ──none──▶ "couldn't find this"
//!                 │
//!                 ▼
//!         compose bulleted answer
//! ```

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::calc::{self, AngleMode};
use crate::compose::compose_with;
use crate::config::Config;
use crate::curriculum::{load_resources, TopicTable};
use crate::error::ServiceError;
use crate::extract::{PdfExtractor, TextExtractor};
use crate::index::{self, IndexStore};
use crate::meta::{Grade, Subject};
use crate::models::{Index, ScoredDocument};
use crate::query::analyze;
use crate::retrieval::retrieve_with;

pub const DEFAULT_TITLE: &str = "Answer";

pub const NO_INDEX_MESSAGE: &str = "I couldn\u{2019}t find a match in saved lessons yet. Please add textbooks (PDFs) and reindex them, or try rephrasing your question.";
pub const VAGUE_QUERY_MESSAGE: &str = "Please ask with more detail (include key topic words).";
pub const NO_TEXTBOOK_MESSAGE: &str = "I don't have a textbook loaded for this Grade + Subject yet. Please ensure the correct PDF exists and reindex.";
pub const NO_MATCH_MESSAGE: &str = "I couldn\u{2019}t find this in your saved textbooks. Try different keywords or a simpler version of the question.";
pub const NO_CAPS_MATCH_MESSAGE: &str = "No CAPS match found yet. Try 'Search Textbooks' below.";

pub const SEARCH_NO_INDEX_MESSAGE: &str =
    "No PDFs indexed yet. Put PDFs in the library directory and call /pdf/reindex.";
pub const SEARCH_VAGUE_MESSAGE: &str = "Query too short. Use a longer question or keywords.";
pub const SEARCH_NO_MATCH_MESSAGE: &str = "No matches found in your indexed PDFs.";
pub const SEARCH_NO_TEXTBOOK_MESSAGE: &str = "No indexed textbook matches this grade and subject.";

/// Body of `POST /answer` and `POST /ask`.
///
/// Grade and subject arrive as loosely typed JSON (the browser sends strings)
/// and are validated by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub grade: Option<serde_json::Value>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Body of `POST /pdf/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub grade: Option<serde_json::Value>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// How an answer was produced, or why none was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Curriculum,
    Textbook,
    NoIndex,
    VagueQuery,
    NoTextbook,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub ok: bool,
    pub found: bool,
    pub outcome: AnswerOutcome,
    pub title: String,
    pub answer: String,
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl AnswerResponse {
    fn miss(outcome: AnswerOutcome, message: &str) -> Self {
        Self {
            ok: true,
            found: false,
            outcome,
            title: DEFAULT_TITLE.to_string(),
            answer: message.to_string(),
            video: None,
            sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub ok: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
    pub phrases: Vec<String>,
    pub results: Vec<ScoredDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SearchResponse {
    fn message(ok: bool, updated_at: Option<DateTime<Utc>>, message: &str) -> Self {
        Self {
            ok,
            updated_at,
            keywords: Vec::new(),
            phrases: Vec::new(),
            results: Vec::new(),
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexSummary {
    pub updated_at: DateTime<Utc>,
    pub document_count: usize,
}

pub struct HomeworkService {
    config: Config,
    store: IndexStore,
    topics: TopicTable,
    resources: serde_json::Value,
    extractor: Arc<dyn TextExtractor>,
    reindex_lock: tokio::sync::Mutex<()>,
}

impl HomeworkService {
    pub fn new(
        config: Config,
        index: Index,
        topics: TopicTable,
        resources: serde_json::Value,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            config,
            store: IndexStore::new(index),
            topics,
            resources,
            extractor,
            reindex_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Loads the persisted index and curriculum files named in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let index = index::load_index(&config.library.index_path);
        let topics = match &config.curriculum.topics_path {
            Some(path) => TopicTable::load(path)?,
            None => TopicTable::default(),
        };
        let resources = match &config.curriculum.resources_path {
            Some(path) => load_resources(path)?,
            None => serde_json::Value::Object(Default::default()),
        };
        Ok(Self::new(
            config.clone(),
            index,
            topics,
            resources,
            Arc::new(PdfExtractor),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current index snapshot.
    pub fn index(&self) -> Arc<Index> {
        self.store.snapshot()
    }

    pub fn topics(&self) -> &TopicTable {
        &self.topics
    }

    pub fn resources(&self) -> &serde_json::Value {
        &self.resources
    }

    /// Answers a question from the CAPS table, falling back to textbooks.
    pub fn answer(&self, request: &QuestionRequest) -> Result<AnswerResponse, ServiceError> {
        let question = require_question(request.question.as_deref())?;
        let grade = parse_grade(request.grade.as_ref())?;
        let subject = parse_subject(request.subject.as_deref())?;

        if let (Some(g), Some(s)) = (grade, subject) {
            if let Some(topic) = self.topics.lookup(g, s, question) {
                debug!(topic = %topic.topic, "answered from CAPS topics");
                return Ok(AnswerResponse {
                    ok: true,
                    found: true,
                    outcome: AnswerOutcome::Curriculum,
                    title: topic.topic.clone(),
                    answer: topic.explanation.clone(),
                    video: topic.video.clone(),
                    sources: Vec::new(),
                });
            }
        }

        let index = self.index();
        if index.is_empty() {
            return Ok(AnswerResponse::miss(AnswerOutcome::NoIndex, NO_INDEX_MESSAGE));
        }

        let terms = analyze(question);
        if terms.is_empty() {
            return Ok(AnswerResponse::miss(AnswerOutcome::VagueQuery, VAGUE_QUERY_MESSAGE));
        }
        let all_terms = terms.all_terms();

        // No fallback to the unfiltered corpus: a Natural Sciences question
        // must never be answered from a Mathematics book.
        let candidates = index.filter(grade, subject);
        if candidates.is_empty() {
            return Ok(AnswerResponse::miss(AnswerOutcome::NoTextbook, NO_TEXTBOOK_MESSAGE));
        }

        let scored = retrieve_with(&candidates, &all_terms, self.config.retrieval.params());
        if scored.is_empty() {
            return Ok(AnswerResponse::miss(AnswerOutcome::NoMatch, NO_MATCH_MESSAGE));
        }

        let snippets: Vec<String> = scored
            .iter()
            .filter_map(|s| s.snippet.clone())
            .filter(|s| !s.is_empty())
            .collect();
        let answer = compose_with(&snippets, self.config.answer.params());
        info!(
            terms = all_terms.len(),
            candidates = candidates.len(),
            matched = scored.len(),
            "answered from textbooks"
        );

        Ok(AnswerResponse {
            ok: true,
            found: true,
            outcome: AnswerOutcome::Textbook,
            title: DEFAULT_TITLE.to_string(),
            answer,
            video: None,
            sources: scored.into_iter().map(|s| s.file_id).collect(),
        })
    }

    /// Strict CAPS-only lookup. Grade and subject are required.
    pub fn ask(&self, request: &QuestionRequest) -> Result<AskResponse, ServiceError> {
        let question = require_question(request.question.as_deref())?;
        let grade = parse_grade(request.grade.as_ref())?;
        let subject = parse_subject(request.subject.as_deref())?;
        let (Some(grade), Some(subject)) = (grade, subject) else {
            return Err(ServiceError::invalid_input("Grade and subject are required"));
        };

        Ok(match self.topics.lookup(grade, subject, question) {
            Some(topic) => AskResponse {
                found: true,
                topic: Some(topic.topic.clone()),
                explanation: Some(topic.explanation.clone()),
                video: topic.video.clone(),
                message: None,
            },
            None => AskResponse {
                found: false,
                topic: None,
                explanation: None,
                video: None,
                message: Some(NO_CAPS_MATCH_MESSAGE.to_string()),
            },
        })
    }

    /// Raw textbook retrieval: scored documents with snippets.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ServiceError> {
        let query = request
            .query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ServiceError::invalid_input("query is required"))?;
        let grade = parse_grade(request.grade.as_ref())?;
        let subject = parse_subject(request.subject.as_deref())?;

        let index = self.index();
        if index.is_empty() {
            return Ok(SearchResponse::message(false, None, SEARCH_NO_INDEX_MESSAGE));
        }

        let terms = analyze(query);
        if terms.is_empty() {
            return Ok(SearchResponse::message(false, index.built_at, SEARCH_VAGUE_MESSAGE));
        }

        let candidates = index.filter(grade, subject);
        let results = if candidates.is_empty() {
            Vec::new()
        } else {
            retrieve_with(&candidates, &terms.all_terms(), self.config.retrieval.params())
        };

        let message = if candidates.is_empty() {
            Some(SEARCH_NO_TEXTBOOK_MESSAGE.to_string())
        } else if results.is_empty() {
            Some(SEARCH_NO_MATCH_MESSAGE.to_string())
        } else {
            None
        };

        Ok(SearchResponse {
            ok: true,
            updated_at: index.built_at,
            keywords: terms.keywords,
            phrases: terms.phrases,
            results,
            message,
        })
    }

    /// Rebuilds the index from the library directory and swaps it in.
    pub async fn reindex(&self) -> Result<ReindexSummary, ServiceError> {
        let _guard = self.reindex_lock.lock().await;
        let library = &self.config.library;
        let index = index::reindex(
            &self.store,
            &library.pdf_dir,
            &library.index_path,
            Arc::clone(&self.extractor),
            library.extract_timeout(),
        )
        .await
        .map_err(ServiceError::Reindex)?;

        info!(documents = index.len(), "reindex complete");
        Ok(ReindexSummary {
            updated_at: index.built_at.unwrap_or_else(Utc::now),
            document_count: index.len(),
        })
    }

    pub fn calculate(&self, expression: &str, mode: AngleMode) -> Result<f64, ServiceError> {
        Ok(calc::evaluate(expression, mode)?)
    }
}

fn require_question(question: Option<&str>) -> Result<&str, ServiceError> {
    question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ServiceError::invalid_input("Question is required"))
}

/// Blank or absent means "not supplied"; anything else must be a grade 4..=9.
pub fn parse_grade(value: Option<&serde_json::Value>) -> Result<Option<Grade>, ServiceError> {
    let grade = match value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(serde_json::Value::String(s)) => Grade::parse(s),
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(Grade::new),
        Some(_) => None,
    };
    grade
        .map(Some)
        .ok_or_else(|| ServiceError::invalid_input("grade must be between 4 and 9"))
}

/// Blank or absent means "not supplied"; anything else must name a known subject.
pub fn parse_subject(value: Option<&str>) -> Result<Option<Subject>, ServiceError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Subject::parse(s).map(Some).ok_or_else(|| {
            ServiceError::invalid_input(format!(
                "unknown subject '{}': expected Mathematics or Natural Sciences",
                s
            ))
        }),
    }
}
