//! Pipeline entry points.
//!
//! [`diff`] aligns a reference against a sample, compacts and normalizes the
//! edit script, and reports it as variants. [`diff_edits`] stops before the
//! variant step and returns the canonical script.

use std::time::{Duration, Instant};

use log::debug;

use crate::align::align;
use crate::cleanup::compact;
use crate::models::EditScript;
use crate::normalize::normalize;
use crate::variant::{Variant, variants_from_edits};

/// Tuning knobs for [`diff`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Wall-clock budget for the aligner. `None` or zero means unlimited.
    pub timeout: Option<Duration>,
}

impl DiffOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        DiffOptions {
            timeout: Some(timeout),
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.timeout
            .filter(|t| !t.is_zero())
            .and_then(|t| Instant::now().checked_add(t))
    }
}

/// Variants found between a reference and a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub variants: Vec<Variant>,
    /// The aligner ran out of time; the variants are valid but may not be
    /// the most parsimonious description.
    pub timed_out: bool,
}

/// Align, compact and normalize, returning the canonical edit script and
/// whether the aligner timed out.
pub fn diff_edits(
    reference: impl AsRef<[u8]>,
    sample: impl AsRef<[u8]>,
    options: &DiffOptions,
) -> (EditScript, bool) {
    let alignment = align(reference.as_ref(), sample.as_ref(), options.deadline());
    let edits = normalize(compact(alignment.edits));
    (edits, alignment.timed_out)
}

/// Describe `sample` as a list of variants against `reference`.
pub fn diff(
    reference: impl AsRef<[u8]>,
    sample: impl AsRef<[u8]>,
    options: &DiffOptions,
) -> DiffResult {
    let (edits, timed_out) = diff_edits(reference, sample, options);
    let variants = variants_from_edits(&edits);
    debug!(
        "{} variants from {} edits (timed out: {})",
        variants.len(),
        edits.len(),
        timed_out
    );

    DiffResult {
        variants,
        timed_out,
    }
}
