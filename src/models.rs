//! Core data models shared by the indexer, retrieval engine and service.
//!
//! [`Index`] and [`IndexedDocument`] are also the on-disk format of the
//! index file; their serde names (`updatedAt`, `index`, `file`, `text`,
//! `chars`, `meta`) are the persisted layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meta::{DocumentMetadata, Grade, Subject};

/// One textbook after extraction and normalization. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Filename within the library directory.
    #[serde(rename = "file")]
    pub file_id: String,
    /// Normalized extracted text.
    #[serde(rename = "text")]
    pub raw_text: String,
    /// Length of `raw_text` in characters.
    #[serde(rename = "chars")]
    pub char_count: usize,
    #[serde(rename = "meta", default)]
    pub metadata: DocumentMetadata,
}

/// A complete snapshot of the indexed library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// When the index was built; `None` for an empty fallback index.
    #[serde(rename = "updatedAt", default)]
    pub built_at: Option<DateTime<Utc>>,
    #[serde(rename = "index", default)]
    pub documents: Vec<IndexedDocument>,
}

impl Index {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Documents whose metadata satisfies every supplied filter field, in index order.
    pub fn filter(&self, grade: Option<Grade>, subject: Option<Subject>) -> Vec<&IndexedDocument> {
        self.documents
            .iter()
            .filter(|doc| doc.metadata.matches(grade, subject))
            .collect()
    }
}

/// A snippet extracted around the earliest matching term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub term: String,
    pub snippet: String,
}

/// A document that matched at least one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredDocument {
    #[serde(rename = "file")]
    pub file_id: String,
    pub score: usize,
    pub snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::detect;

    fn doc(file: &str) -> IndexedDocument {
        IndexedDocument {
            file_id: file.to_string(),
            raw_text: "text".to_string(),
            char_count: 4,
            metadata: detect(file),
        }
    }

    #[test]
    fn persisted_layout_uses_short_field_names() {
        let index = Index {
            built_at: None,
            documents: vec![doc("grade7_nst.pdf")],
        };
        let value = serde_json::to_value(&index).unwrap();
        assert!(value["updatedAt"].is_null());
        let entry = &value["index"][0];
        assert_eq!(entry["file"], "grade7_nst.pdf");
        assert_eq!(entry["text"], "text");
        assert_eq!(entry["chars"], 4);
        assert_eq!(entry["meta"]["grade"], 7);
        assert_eq!(entry["meta"]["subject"], "Natural Sciences");
    }

    #[test]
    fn loads_index_written_with_string_grades() {
        let json = r#"{
            "updatedAt": "2026-01-05T08:30:00Z",
            "index": [
                {"file": "gr6_maths.pdf", "text": "fractions", "chars": 9,
                 "meta": {"grade": "6", "subject": "Mathematics"}}
            ]
        }"#;
        let index: Index = serde_json::from_str(json).unwrap();
        assert!(index.built_at.is_some());
        assert_eq!(index.len(), 1);
        assert_eq!(index.documents[0].metadata.grade, Grade::new(6));
    }

    #[test]
    fn filter_matches_grade_and_subject() {
        let index = Index {
            built_at: None,
            documents: vec![doc("grade7_nst.pdf"), doc("grade7_maths.pdf"), doc("grade8_nst.pdf")],
        };
        let hits = index.filter(Grade::new(7), Some(Subject::NaturalSciences));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_id, "grade7_nst.pdf");
        assert_eq!(index.filter(None, Some(Subject::NaturalSciences)).len(), 2);
        assert_eq!(index.filter(None, None).len(), 3);
        assert!(index.filter(Grade::new(4), None).is_empty());
    }
}
