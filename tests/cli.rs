mod common;

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use common::{hwh_binary, setup_library};

fn run_hwh(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = hwh_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run hwh binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_reindex_skips_unreadable_pdfs() {
    let (tmp, config_path) = setup_library("127.0.0.1:5000");

    let (stdout, stderr, success) = run_hwh(&config_path, &["reindex"]);
    assert!(success, "reindex failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Indexed 1 PDF from"), "got: {}", stdout);
    assert!(tmp.path().join("data").join("pdf_index.json").exists());
}

#[test]
fn test_reindex_is_idempotent() {
    let (tmp, config_path) = setup_library("127.0.0.1:5000");
    let index_path = tmp.path().join("data").join("pdf_index.json");

    run_hwh(&config_path, &["reindex"]);
    let first: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&index_path).unwrap()).unwrap();
    run_hwh(&config_path, &["reindex"]);
    let second: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&index_path).unwrap()).unwrap();

    assert_eq!(first["index"], second["index"]);
    assert_eq!(second["index"][0]["file"], "grade7_nst.pdf");
    assert_eq!(second["index"][0]["meta"]["grade"], 7);
    assert_eq!(second["index"][0]["meta"]["subject"], "Natural Sciences");
}

#[test]
fn test_answer_from_indexed_textbook() {
    let (_tmp, config_path) = setup_library("127.0.0.1:5000");
    run_hwh(&config_path, &["reindex"]);

    let (stdout, stderr, success) = run_hwh(
        &config_path,
        &[
            "answer",
            "how do plants make glucose from light",
            "--grade",
            "7",
            "--subject",
            "Natural Sciences",
        ],
    );
    assert!(success, "answer failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("glucose"), "got: {}", stdout);
    assert!(stdout.contains("Sources: grade7_nst.pdf"), "got: {}", stdout);
}

#[test]
fn test_answer_from_caps_topic() {
    let (_tmp, config_path) = setup_library("127.0.0.1:5000");

    let (stdout, _, success) = run_hwh(
        &config_path,
        &["answer", "what does chlorophyll do", "--grade", "7", "--subject", "nst"],
    );
    assert!(success);
    assert!(stdout.starts_with("Chlorophyll\n"), "got: {}", stdout);
    assert!(stdout.contains("Video: https://example.org/chlorophyll"));
}

#[test]
fn test_answer_never_crosses_subjects() {
    let (_tmp, config_path) = setup_library("127.0.0.1:5000");
    run_hwh(&config_path, &["reindex"]);

    let (stdout, _, success) = run_hwh(
        &config_path,
        &["answer", "plants glucose", "--grade", "7", "--subject", "maths"],
    );
    assert!(success);
    assert!(
        stdout.contains("I don't have a textbook loaded for this Grade + Subject yet"),
        "got: {}",
        stdout
    );
}

#[test]
fn test_answer_before_reindex() {
    let (_tmp, config_path) = setup_library("127.0.0.1:5000");

    let (stdout, _, success) = run_hwh(&config_path, &["answer", "photosynthesis"]);
    assert!(success);
    assert!(stdout.contains("add textbooks (PDFs) and reindex"), "got: {}", stdout);
}

#[test]
fn test_answer_rejects_unknown_grade() {
    let (_tmp, config_path) = setup_library("127.0.0.1:5000");

    let (_, stderr, success) = run_hwh(&config_path, &["answer", "cells", "--grade", "12"]);
    assert!(!success);
    assert!(stderr.contains("grade must be between 4 and 9"), "got: {}", stderr);
}

#[test]
fn test_search_lists_matches() {
    let (_tmp, config_path) = setup_library("127.0.0.1:5000");
    run_hwh(&config_path, &["reindex"]);

    let (stdout, _, success) = run_hwh(&config_path, &["search", "green plants"]);
    assert!(success);
    assert!(stdout.contains("Keywords: green, plants"), "got: {}", stdout);
    assert!(stdout.contains("grade7_nst.pdf"), "got: {}", stdout);
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_library("127.0.0.1:5000");
    run_hwh(&config_path, &["reindex"]);

    let (stdout, _, success) = run_hwh(&config_path, &["search", "volcanoes"]);
    assert!(success);
    assert!(stdout.contains("No matches found in your indexed PDFs."));
}

#[test]
fn test_stats_after_reindex() {
    let (_tmp, config_path) = setup_library("127.0.0.1:5000");
    run_hwh(&config_path, &["reindex"]);

    let (stdout, _, success) = run_hwh(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Documents:   1"), "got: {}", stdout);
    assert!(stdout.contains("Natural Sciences"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let output = Command::new(hwh_binary())
        .current_dir(tmp.path())
        .args(["--config", "does-not-exist.toml", "stats"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Documents:   0"), "got: {}", stdout);
}

#[test]
fn test_invalid_config_errors() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("hwh.toml");
    std::fs::write(
        &config_path,
        "[server]\nbind = \"127.0.0.1:5000\"\n[library]\npdf_dir = \"p\"\nindex_path = \"i.json\"\n[retrieval]\ntop_k = 0\n",
    )
    .unwrap();

    let (_, stderr, success) = run_hwh(&config_path, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("top_k"), "got: {}", stderr);
}

#[test]
fn test_calc() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("unused.toml");

    let (stdout, _, success) = run_hwh(&config_path, &["calc", "2*(3+4)"]);
    assert!(success);
    assert_eq!(stdout.trim(), "14");

    let (stdout, _, success) = run_hwh(&config_path, &["calc", "sin(30)"]);
    assert!(success);
    assert_eq!(stdout.trim(), "0.5");

    let (stdout, _, success) = run_hwh(&config_path, &["calc", "cos(0)", "--rad"]);
    assert!(success);
    assert_eq!(stdout.trim(), "1");
}

#[test]
fn test_calc_rejects_malformed_expression() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_hwh(&tmp.path().join("unused.toml"), &["calc", "(1+2"]);
    assert!(!success);
    assert!(stderr.contains("mismatched parentheses"), "got: {}", stderr);
}

#[test]
fn test_completions() {
    let tmp = TempDir::new().unwrap();
    let (stdout, _, success) = run_hwh(&tmp.path().join("unused.toml"), &["completions", "bash"]);
    assert!(success);
    assert!(stdout.contains("hwh"));
}
