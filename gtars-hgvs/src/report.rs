//! Tab-separated variant report.
//!
//! One row per variant:
//!
//! ```text
//! {seq}:g.{hgvs}  {seq}  {position}  {ref}  {alt}  {timed_out}
//! ```
//!
//! Positions are shifted by the configured offset. With left padding enabled
//! the position and allele columns carry the anchored representation while
//! the label keeps the HGVS notation.

use std::io::{self, Write};

use crate::diff::DiffResult;
use crate::variant::Variant;

pub struct ReportWriter<W: Write> {
    writer: W,
    sequence: String,
    offset: usize,
    pad_left: bool,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W, sequence: impl Into<String>) -> Self {
        ReportWriter {
            writer,
            sequence: sequence.into(),
            offset: 0,
            pad_left: false,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_pad_left(mut self, pad_left: bool) -> Self {
        self.pad_left = pad_left;
        self
    }

    pub fn write_variant(&mut self, variant: &Variant, timed_out: bool) -> io::Result<()> {
        let shifted = variant.with_offset(self.offset);
        let columns = if self.pad_left {
            shifted.pad_left()
        } else {
            shifted.clone()
        };

        writeln!(
            self.writer,
            "{seq}:g.{shifted}\t{seq}\t{}\t{}\t{}\t{timed_out}",
            columns.position,
            String::from_utf8_lossy(&columns.ref_allele),
            String::from_utf8_lossy(&columns.alt_allele),
            seq = self.sequence,
        )
    }

    pub fn write_result(&mut self, result: &DiffResult) -> io::Result<()> {
        for variant in &result.variants {
            self.write_variant(variant, result.timed_out)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Sort by the variant order and drop duplicates, e.g. after merging the
/// results of several comparisons.
pub fn sort_variants(variants: &mut Vec<Variant>) {
    variants.sort();
    variants.dedup();
}
