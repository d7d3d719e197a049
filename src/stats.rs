//! Index statistics.
//!
//! A quick summary of what is indexed: document and character counts, the
//! index file size and a per grade/subject breakdown. Used by `hwh stats` to
//! confirm that a reindex picked up every textbook with the right tags.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::config::Config;
use crate::index::load_index;
use crate::models::Index;

/// Documents sharing one grade/subject tag.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub documents: usize,
    pub chars: usize,
}

/// Groups documents by their detected tags. Undetected fields show as `?`.
pub fn group_by_tags(index: &Index) -> BTreeMap<(String, String), GroupStats> {
    let mut groups: BTreeMap<(String, String), GroupStats> = BTreeMap::new();
    for doc in &index.documents {
        let grade = doc
            .metadata
            .grade
            .map(|g| format!("Grade {}", g))
            .unwrap_or_else(|| "?".to_string());
        let subject = doc
            .metadata
            .subject
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string());
        let entry = groups.entry((grade, subject)).or_default();
        entry.documents += 1;
        entry.chars += doc.char_count;
    }
    groups
}

/// Run the stats command: load the persisted index and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let path = &config.library.index_path;
    let index = load_index(path);
    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let total_chars: usize = index.documents.iter().map(|d| d.char_count).sum();

    println!("Homework Helper: Index Stats");
    println!("============================");
    println!();
    println!("  Index file:  {}", path.display());
    println!("  Size:        {}", format_bytes(file_size));
    println!(
        "  Updated:     {}",
        index
            .built_at
            .map(format_relative)
            .unwrap_or_else(|| "never".to_string())
    );
    println!();
    println!("  Documents:   {}", index.len());
    println!("  Characters:  {}", total_chars);

    let groups = group_by_tags(&index);
    if !groups.is_empty() {
        println!();
        println!("  By grade and subject:");
        println!("  {:<10} {:<18} {:>6} {:>12}", "GRADE", "SUBJECT", "DOCS", "CHARS");
        println!("  {}", "-".repeat(50));
        for ((grade, subject), s) in &groups {
            println!(
                "  {:<10} {:<18} {:>6} {:>12}",
                grade, subject, s.documents, s.chars
            );
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Format a timestamp relative to now, e.g. "3 hours ago".
fn format_relative(at: DateTime<Utc>) -> String {
    let delta = (Utc::now() - at).num_seconds();

    if delta < 0 {
        at.format("%Y-%m-%d %H:%M").to_string()
    } else if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        at.format("%Y-%m-%d %H:%M").to_string()
    }
}
