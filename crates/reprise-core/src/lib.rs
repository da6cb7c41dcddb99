//! Core library for reprise.
//!
//! Finds phrases that repeat within a body of prose, ranks them longest and
//! most frequent first, and marks every occurrence of a chosen phrase in a
//! document.
//!
//! # Modules
//!
//! - [`repetition`] - Candidate generation, counting and ranking
//! - [`locate`] - The mark-and-select policy over a [`TextSource`]
//! - [`document`] - In-memory paragraphs that implement [`TextSource`]
//! - [`text`] / [`markdown`] - Splitting raw input into paragraphs, sentences and words
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! use reprise_core::{DetectionParams, Document, detect_repetitions, locate};
//!
//! let mut doc = Document::from_paragraphs(vec![
//!     "the quick fox the quick fox the quick fox.".to_string(),
//! ]);
//! let records = detect_repetitions(&doc.raw_text(), &DetectionParams::new(2, 2, 3));
//! assert!(records.iter().any(|r| r.sequence == "quick fox" && r.hits == 3));
//!
//! let outcome = locate("quick fox", &mut doc).unwrap();
//! assert_eq!(outcome.matches.len(), 3);
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod document;
pub mod error;
pub mod locate;
pub mod markdown;
pub mod repetition;
pub mod text;

pub use config::{Config, ConfigLoader, ConfigSources, DEFAULT_MAX_INPUT_BYTES, LogLevel};
pub use document::{Document, Highlight, InputFormat, Span};
pub use error::{
    AnalysisError, AnalysisResult, ConfigError, ConfigResult, DocumentError, LocateError,
};
pub use locate::{LocateOutcome, TextSource, locate};
pub use repetition::{
    DetectionParams, PhrasePattern, RepetitionRecord, RepetitionReport, cap_results,
    count_occurrences, detect_repetitions,
};
