//! # Homework Helper
//!
//! An offline homework-help service for South African Grade 4 to 9 learners.
//!
//! Questions are answered from two local sources: a hand-curated table of
//! CAPS curriculum topics, and a keyword index over PDF textbooks dropped
//! into a library directory. There is no language model; answers are
//! sentences lifted from the textbooks around the best keyword match.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ PDF folder │──▶│  Extract +  │──▶│ pdf_index    │
//! │            │   │  normalize  │   │ (JSON file)  │
//! └────────────┘   └─────────────┘   └──────┬───────┘
//!                                           │ Arc<Index>
//!                  ┌──────────────┐   ┌─────▼────────┐
//!                  │ CAPS topics  │──▶│   Service    │
//!                  └──────────────┘   └──┬────────┬──┘
//!                                        ▼        ▼
//!                                   ┌───────┐ ┌───────┐
//!                                   │  CLI  │ │ HTTP  │
//!                                   │ (hwh) │ │ (axum)│
//!                                   └───────┘ └───────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! hwh reindex                                   # index ./pdfs
//! hwh answer "how do plants make food" --grade 7 --subject nst
//! hwh serve                                     # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Service error type |
//! | [`models`] | Index and result types |
//! | [`text`] | Whitespace normalization |
//! | [`meta`] | Grade and subject detection from filenames |
//! | [`query`] | Question to keywords and phrases |
//! | [`extract`] | PDF text extraction |
//! | [`index`] | Index build, persistence and snapshot store |
//! | [`retrieval`] | Scoring, ranking and snippets |
//! | [`compose`] | Bulleted answers from snippets |
//! | [`curriculum`] | CAPS topics and resources catalogue |
//! | [`calc`] | Scientific calculator |
//! | [`service`] | The operations behind the CLI and HTTP API |
//! | [`server`] | HTTP server |
//! | [`commands`] | CLI front ends for the service operations |
//! | [`stats`] | Index statistics for `hwh stats` |

pub mod calc;
pub mod commands;
pub mod compose;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod extract;
pub mod index;
pub mod meta;
pub mod models;
pub mod query;
pub mod retrieval;
pub mod server;
pub mod service;
pub mod stats;
pub mod text;
