//! TOML configuration.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [library]
//! pdf_dir = "./pdfs"
//! index_path = "./data/pdf_index.json"
//! extract_timeout_secs = 60
//!
//! [retrieval]
//! top_k = 3
//! snippet_before = 180
//! snippet_after = 420
//!
//! [answer]
//! max_sentences = 7
//! min_sentence_chars = 40
//!
//! [curriculum]
//! topics_path = "./data/topics.json"
//! resources_path = "./data/resources.json"
//! ```
//!
//! Every section except `[server]` and `[library]` is optional.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compose::{ComposeParams, MAX_SENTENCES, MIN_SENTENCE_CHARS};
use crate::retrieval::{RetrievalParams, SNIPPET_AFTER, SNIPPET_BEFORE, TOP_K};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub library: LibraryConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub curriculum: CurriculumConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LibraryConfig {
    pub pdf_dir: PathBuf,
    pub index_path: PathBuf,
    /// Per-file extraction timeout; 0 disables it.
    #[serde(default = "default_extract_timeout_secs")]
    pub extract_timeout_secs: u64,
}

fn default_extract_timeout_secs() -> u64 {
    60
}

impl LibraryConfig {
    pub fn extract_timeout(&self) -> Option<Duration> {
        (self.extract_timeout_secs > 0).then(|| Duration::from_secs(self.extract_timeout_secs))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_snippet_before")]
    pub snippet_before: usize,
    #[serde(default = "default_snippet_after")]
    pub snippet_after: usize,
}

fn default_top_k() -> usize {
    TOP_K
}
fn default_snippet_before() -> usize {
    SNIPPET_BEFORE
}
fn default_snippet_after() -> usize {
    SNIPPET_AFTER
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: TOP_K,
            snippet_before: SNIPPET_BEFORE,
            snippet_after: SNIPPET_AFTER,
        }
    }
}

impl RetrievalConfig {
    pub fn params(&self) -> RetrievalParams {
        RetrievalParams {
            top_k: self.top_k,
            snippet_before: self.snippet_before,
            snippet_after: self.snippet_after,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnswerConfig {
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,
}

fn default_max_sentences() -> usize {
    MAX_SENTENCES
}
fn default_min_sentence_chars() -> usize {
    MIN_SENTENCE_CHARS
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_sentences: MAX_SENTENCES,
            min_sentence_chars: MIN_SENTENCE_CHARS,
        }
    }
}

impl AnswerConfig {
    pub fn params(&self) -> ComposeParams {
        ComposeParams {
            max_sentences: self.max_sentences,
            min_sentence_chars: self.min_sentence_chars,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CurriculumConfig {
    #[serde(default)]
    pub topics_path: Option<PathBuf>,
    #[serde(default)]
    pub resources_path: Option<PathBuf>,
}

impl Config {
    /// Defaults for running without a config file: everything relative to
    /// the working directory, no curriculum files.
    pub fn minimal() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
            },
            library: LibraryConfig {
                pdf_dir: PathBuf::from("./pdfs"),
                index_path: PathBuf::from("./data/pdf_index.json"),
                extract_timeout_secs: default_extract_timeout_secs(),
            },
            retrieval: RetrievalConfig::default(),
            answer: AnswerConfig::default(),
            curriculum: CurriculumConfig::default(),
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if config.retrieval.snippet_after == 0 {
        anyhow::bail!("retrieval.snippet_after must be > 0");
    }

    if config.answer.max_sentences < 1 {
        anyhow::bail!("answer.max_sentences must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[server]
bind = "127.0.0.1:5000"

[library]
pdf_dir = "./pdfs"
index_path = "./data/pdf_index.json"
"#;

    #[test]
    fn optional_sections_take_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.retrieval.params(), RetrievalParams::default());
        assert_eq!(config.answer.params(), ComposeParams::default());
        assert_eq!(config.library.extract_timeout(), Some(Duration::from_secs(60)));
        assert!(config.curriculum.topics_path.is_none());
    }

    #[test]
    fn zero_timeout_disables_it() {
        let content = MINIMAL.replace(
            "index_path = \"./data/pdf_index.json\"",
            "index_path = \"./data/pdf_index.json\"\nextract_timeout_secs = 0",
        );
        let config = parse_config(&content).unwrap();
        assert_eq!(config.library.extract_timeout(), None);
    }

    #[test]
    fn overrides_are_read() {
        let content = format!(
            "{}\n[retrieval]\ntop_k = 5\n\n[answer]\nmax_sentences = 3\n\n[curriculum]\ntopics_path = \"topics.json\"\n",
            MINIMAL
        );
        let config = parse_config(&content).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.snippet_before, SNIPPET_BEFORE);
        assert_eq!(config.answer.max_sentences, 3);
        assert_eq!(
            config.curriculum.topics_path,
            Some(PathBuf::from("topics.json"))
        );
    }

    #[test]
    fn rejects_invalid_values() {
        let zero_k = format!("{}\n[retrieval]\ntop_k = 0\n", MINIMAL);
        assert!(parse_config(&zero_k).is_err());

        let zero_sentences = format!("{}\n[answer]\nmax_sentences = 0\n", MINIMAL);
        assert!(parse_config(&zero_sentences).is_err());
    }

    #[test]
    fn requires_library_section() {
        assert!(parse_config("[server]\nbind = \"127.0.0.1:5000\"\n").is_err());
    }

    #[test]
    fn minimal_matches_defaults() {
        let config = Config::minimal();
        assert_eq!(config.retrieval.params(), RetrievalParams::default());
        assert_eq!(config.server.bind, "127.0.0.1:5000");
    }
}
