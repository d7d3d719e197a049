//! Grade and subject detection from textbook filenames.
//!
//! Textbooks are dropped into the library directory with names like
//! `Grade7_NST_Learner_Book.pdf` or `gr5-maths.pdf`. The filename is the
//! only metadata source: it is inspected once at indexing time and the
//! result travels with the document in the persisted index.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Matches "grade 7", "gr7" or a standalone "g 7" (4..=9).
static GRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"grade\s*([4-9])|gr\s*([4-9])|\bg\s*([4-9])\b").expect("grade regex is valid")
});

const MATHEMATICS_TOKENS: &[&str] = &["math", "maths", "mathematics"];
const NATURAL_SCIENCES_TOKENS: &[&str] = &["nst", "natural", "science", "sciences"];

/// A school grade in the supported range 4..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 4;
    pub const MAX: u8 = 9;

    /// Returns `None` for grades outside 4..=9.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Parses `"7"`, `" 7 "`, `"Grade 7"` or `"gr7"`.
    pub fn parse(input: &str) -> Option<Self> {
        let lower = input.trim().to_lowercase();
        let digits = lower
            .strip_prefix("grade")
            .or_else(|| lower.strip_prefix("gr"))
            .unwrap_or(&lower)
            .trim();
        digits.parse::<u8>().ok().and_then(Self::new)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

/// Accepts either a JSON number (`7`) or a string (`"7"`, `"Grade 7"`).
impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        let grade = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => u8::try_from(n).ok().and_then(Grade::new),
            Raw::Text(s) => Grade::parse(&s),
        };
        grade.ok_or_else(|| serde::de::Error::custom("grade must be between 4 and 9"))
    }
}

/// Curriculum subjects that textbooks are tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Mathematics,
    NaturalSciences,
}

impl Subject {
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::NaturalSciences => "Natural Sciences",
        }
    }

    /// Parses display names and the short forms used in filenames.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "mathematics" | "maths" | "math" => Some(Subject::Mathematics),
            "natural sciences" | "natural science" | "naturalsciences" | "nst" | "ns" => {
                Some(Subject::NaturalSciences)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Subject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Subject::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown subject: '{}'", raw)))
    }
}

/// Metadata inferred from a textbook filename. `None` means "not detected".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub grade: Option<Grade>,
    #[serde(default)]
    pub subject: Option<Subject>,
}

impl DocumentMetadata {
    /// True when every supplied filter field equals the detected value.
    /// A document whose field was not detected never matches a filter on it.
    pub fn matches(&self, grade: Option<Grade>, subject: Option<Subject>) -> bool {
        let grade_ok = grade.map_or(true, |g| self.grade == Some(g));
        let subject_ok = subject.map_or(true, |s| self.subject == Some(s));
        grade_ok && subject_ok
    }
}

/// Infers grade and subject from a filename.
///
/// Both subject token families are checked in turn and Natural Sciences is
/// checked last, so a filename carrying both (`grade7_maths_science.pdf`) is
/// tagged Natural Sciences.
pub fn detect(filename: &str) -> DocumentMetadata {
    let name = filename.to_lowercase();

    let grade = GRADE_RE.captures(&name).and_then(|caps| {
        caps.iter()
            .skip(1)
            .flatten()
            .next()
            .and_then(|m| m.as_str().parse::<u8>().ok())
            .and_then(Grade::new)
    });

    let mut subject = None;
    if MATHEMATICS_TOKENS.iter().any(|t| name.contains(t)) {
        subject = Some(Subject::Mathematics);
    }
    if NATURAL_SCIENCES_TOKENS.iter().any(|t| name.contains(t)) {
        subject = Some(Subject::NaturalSciences);
    }

    DocumentMetadata { grade, subject }
}
