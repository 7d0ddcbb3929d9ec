//! # Canonical sequence variants from a pairwise diff
//!
//! This crate compares a reference sequence with a sample sequence and
//! describes the differences as HGVS-style variant calls
//! (`8C>G`, `32_33insA`, `5_7del`, ...). It is part of the
//! [gtars](https://github.com/databio/gtars) project.
//!
//! The pipeline has four stages:
//!
//! - [`align`]: Myers bisection diff, with an optional deadline
//! - [`cleanup`]: merge and compact the raw edit script
//! - [`normalize`]: rewrite the script into a canonical, left-aligned form
//! - [`variant`]: turn the script into positioned [`Variant`]s
//!
//! Identical input pairs always give byte-identical output, and applying the
//! variants to the reference reproduces the sample.
//!
//! ## Quick Start
//!
//! ```rust
//! use gtars_hgvs::{DiffOptions, diff};
//!
//! let result = diff("AAAA", "AACAA", &DiffOptions::default());
//! let calls: Vec<String> = result.variants.iter().map(|v| v.to_string()).collect();
//!
//! // insertions are placed between the two flanking positions
//! assert_eq!(calls, vec!["2_3insC"]);
//! assert!(!result.timed_out);
//! ```
//!
//! Sequences are compared byte for byte; no case folding or alphabet checks
//! are applied.

pub mod align;
pub mod cleanup;
pub mod config;
pub mod diff;
pub mod models;
pub mod normalize;
pub mod report;
pub mod variant;

pub use config::{ConfigError, ConfigResult, ReportConfig};
pub use diff::{DiffOptions, DiffResult, diff, diff_edits};
pub use models::{Edit, EditKind, EditScript, source_text, target_text};
pub use report::{ReportWriter, sort_variants};
pub use variant::{Variant, less, variants_from_edits};
