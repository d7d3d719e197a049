//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PHOTOSYNTHESIS: &str =
    "Photosynthesis is how green plants make glucose from light energy.";

pub fn hwh_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("hwh");
    path
}

/// Single-page PDF showing `text` in Helvetica.
/// Builds body then xref with correct byte offsets so pdf-extract can parse it.
pub fn minimal_pdf_with_text(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 700 Td ({}) Tj ET", text);

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
            content.len(),
            content
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

/// Temp workspace with `pdfs/`, `data/` and `config/hwh.toml`.
///
/// `pdfs/` holds a Grade 7 Natural Sciences textbook and a corrupt file
/// that extraction must skip.
pub fn setup_library(bind: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let pdf_dir = root.join("pdfs");
    fs::create_dir_all(&pdf_dir).unwrap();
    fs::write(
        pdf_dir.join("grade7_nst.pdf"),
        minimal_pdf_with_text(PHOTOSYNTHESIS),
    )
    .unwrap();
    fs::write(pdf_dir.join("grade7_maths.pdf"), b"this is not a pdf").unwrap();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("topics.json"),
        r#"[{"grade": 7, "subject": "Natural Sciences", "keywords": ["chlorophyll"],
             "topic": "Chlorophyll", "explanation": "Chlorophyll is the green pigment in leaves.",
             "video": "https://example.org/chlorophyll"}]"#,
    )
    .unwrap();
    fs::write(
        data_dir.join("resources.json"),
        r#"{"Grade 7": {"Natural Sciences": ["Photosynthesis", "Cells"]}}"#,
    )
    .unwrap();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let config_path = config_dir.join("hwh.toml");
    fs::write(&config_path, config_toml(root, bind)).unwrap();

    (tmp, config_path)
}

fn config_toml(root: &Path, bind: &str) -> String {
    format!(
        r#"[server]
bind = "{bind}"

[library]
pdf_dir = "{root}/pdfs"
index_path = "{root}/data/pdf_index.json"
extract_timeout_secs = 30

[curriculum]
topics_path = "{root}/data/topics.json"
resources_path = "{root}/data/resources.json"
"#,
        bind = bind,
        root = root.display()
    )
}
