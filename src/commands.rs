//! CLI front ends for the service operations.
//!
//! Each `run_*` function builds a [`HomeworkService`] from config, calls one
//! operation and prints the result for a terminal.

use anyhow::Result;

use crate::calc::AngleMode;
use crate::config::Config;
use crate::service::{AnswerResponse, HomeworkService, QuestionRequest, SearchRequest, SearchResponse};

/// Rebuilds the index from the library directory.
pub async fn run_reindex(config: &Config) -> Result<()> {
    let service = HomeworkService::from_config(config)?;
    let summary = service.reindex().await?;
    println!(
        "Indexed {} PDF{} from {} at {}",
        summary.document_count,
        if summary.document_count == 1 { "" } else { "s" },
        config.library.pdf_dir.display(),
        summary.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Index written to {}", config.library.index_path.display());
    Ok(())
}

pub fn run_answer(
    config: &Config,
    question: &str,
    grade: Option<String>,
    subject: Option<String>,
) -> Result<()> {
    let service = HomeworkService::from_config(config)?;
    let response = service.answer(&QuestionRequest {
        question: Some(question.to_string()),
        grade: grade.map(serde_json::Value::String),
        subject,
    })?;
    print!("{}", format_answer(&response));
    Ok(())
}

pub fn run_search(
    config: &Config,
    query: &str,
    grade: Option<String>,
    subject: Option<String>,
) -> Result<()> {
    let service = HomeworkService::from_config(config)?;
    let response = service.search(&SearchRequest {
        query: Some(query.to_string()),
        grade: grade.map(serde_json::Value::String),
        subject,
    })?;
    print!("{}", format_search(&response));
    Ok(())
}

pub fn run_calc(expression: &str, mode: AngleMode) -> Result<()> {
    let result = crate::calc::evaluate(expression, mode)?;
    println!("{}", result);
    Ok(())
}

fn format_answer(response: &AnswerResponse) -> String {
    let mut out = String::new();
    if response.found {
        out.push_str(&format!("{}\n\n", response.title));
    }
    out.push_str(&response.answer);
    out.push('\n');
    if let Some(video) = &response.video {
        out.push_str(&format!("\nVideo: {}\n", video));
    }
    if !response.sources.is_empty() {
        out.push_str(&format!("\nSources: {}\n", response.sources.join(", ")));
    }
    out
}

fn format_search(response: &SearchResponse) -> String {
    let mut out = String::new();
    if !response.keywords.is_empty() {
        out.push_str(&format!("Keywords: {}\n", response.keywords.join(", ")));
    }
    if !response.phrases.is_empty() {
        out.push_str(&format!("Phrases:  {}\n", response.phrases.join(", ")));
    }
    if let Some(message) = &response.message {
        out.push_str(&format!("{}\n", message));
    }
    for (i, result) in response.results.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. [{}] {}\n",
            i + 1,
            result.score,
            result.file_id
        ));
        if let Some(snippet) = &result.snippet {
            out.push_str(&format!("    {}\n", snippet));
        }
    }
    out
}
