//! Validation engine for MoFaCTS content packages.
//!
//! A content package is a zip archive pairing TDF lesson-definition files
//! with stimulus content files, plus media assets. This crate is the engine
//! that rejects malformed packages before a runtime consumer trips over
//! them:
//!
//! ```text
//! ArchiveIndex → parse (per JSON entry) → {StimulusValidator, TdfValidator}
//!              → CrossReferenceResolver → Verdict
//!                                       → build_timeline (per TDF, on demand)
//! ```
//!
//! Archive extraction, CLI handling, and report formatting are external
//! collaborators: the engine consumes an [`ArchiveIndex`] of entry names and
//! decoded JSON text and produces a structured [`Verdict`], never formatted
//! output. Validators collect every finding for a document before moving on;
//! expected malformed input never panics or returns `Err`.
//!
//! # Quick Start
//!
//! ```rust
//! let mut index = tdfpack::ArchiveIndex::new();
//! index.add_json(
//!     "lesson.json",
//!     r#"{"tutor": {"setspec": {"lessonname": "Lesson 1",
//!                               "stimulusfile": "s.json"},
//!                   "unit": [{"clusterIndex": 0}]}}"#,
//! );
//! index.add_json(
//!     "s.json",
//!     r#"{"setspec": {"clusters": [
//!           {"stims": [{"response": {"correctResponse": "cat"}}]}]}}"#,
//! );
//!
//! let verdict = tdfpack::validate_package(&index);
//! assert!(verdict.passed());
//! assert_eq!(verdict.counts.tdf, 1);
//! ```

pub mod crossref;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod rangelist;
pub mod rules;
pub mod stimulus;
pub mod tdf;
pub mod timeline;

pub use error::*;
pub use pipeline::{ArchiveIndex, FileCounts, ValidationPipeline, Verdict};
pub use timeline::{SessionInfo, TimelineUnit, UnitKind};

// Re-export entry-point functions at the crate root for convenience.
pub use rangelist::parse_range_list;
pub use stimulus::validate_stimulus;
pub use tdf::validate_tdf;
pub use timeline::build_timeline;

/// Convenience entry point: run the full pipeline over an archive index.
///
/// Equivalent to `ValidationPipeline::new(index).run()`.
pub fn validate_package(index: &ArchiveIndex) -> Verdict {
    ValidationPipeline::new(index).run()
}
