//! Variant records and HGVS-style formatting.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::models::{Edit, concat};

/// A single change between the reference and the sample, at a 1-based
/// position in the reference.
///
/// Two variants are the same variant when position and alleles agree; the
/// `left` context base is informational and takes no part in equality,
/// hashing or ordering.
#[derive(Debug, Clone, Default)]
pub struct Variant {
    pub position: usize,
    pub ref_allele: Vec<u8>,
    pub alt_allele: Vec<u8>,
    /// Reference base immediately before `position`, when one is known.
    pub left: Option<u8>,
}

impl Variant {
    pub fn new(position: usize, ref_allele: impl Into<Vec<u8>>, alt_allele: impl Into<Vec<u8>>) -> Self {
        Variant {
            position,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
            left: None,
        }
    }

    pub fn with_left(mut self, left: u8) -> Self {
        self.left = Some(left);
        self
    }

    /// Representation without an empty allele: an insertion or deletion is
    /// anchored on the left context base, which is prepended to both alleles.
    /// Substitutions, and variants without context, are returned unchanged.
    pub fn pad_left(&self) -> Variant {
        if !self.ref_allele.is_empty() && !self.alt_allele.is_empty() {
            return self.clone();
        }
        match self.left {
            Some(base) => Variant {
                position: self.position - 1,
                ref_allele: concat(&[&[base], &self.ref_allele]),
                alt_allele: concat(&[&[base], &self.alt_allele]),
                left: None,
            },
            None => self.clone(),
        }
    }

    /// Shift the position, e.g. to place a sub-sequence diff on a larger
    /// coordinate system.
    pub fn with_offset(&self, offset: usize) -> Variant {
        Variant {
            position: self.position + offset,
            ..self.clone()
        }
    }
}

/// Strict ordering by position, then alternate allele, then reference allele.
pub fn less(a: &Variant, b: &Variant) -> bool {
    a < b
}

fn text(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.position;
        let (r, a) = (&self.ref_allele, &self.alt_allele);
        let last = (p + r.len()).saturating_sub(1);

        match (r.len(), a.len()) {
            (0, 0) => write!(f, "{p}="),
            (_, 1) if r == a => write!(f, "{p}="),
            _ if r == a => write!(f, "{p}_{last}="),
            (1, 0) => write!(f, "{p}del"),
            (_, 0) => write!(f, "{p}_{last}del"),
            (1, 1) => write!(f, "{p}{}>{}", text(r), text(a)),
            (0, _) => write!(f, "{}_{p}ins{}", p.saturating_sub(1), text(a)),
            (1, _) => write!(f, "{p}delins{}", text(a)),
            _ => write!(f, "{p}_{last}delins{}", text(a)),
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.ref_allele == other.ref_allele
            && self.alt_allele == other.alt_allele
    }
}

impl Eq for Variant {}

impl Hash for Variant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.hash(state);
        self.ref_allele.hash(state);
        self.alt_allele.hash(state);
    }
}

impl Ord for Variant {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.alt_allele.cmp(&other.alt_allele))
            .then_with(|| self.ref_allele.cmp(&other.ref_allele))
    }
}

impl PartialOrd for Variant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Walk a normalized script and emit one variant per maximal run of
/// non-equal edits. A run that is exactly a two-byte substitution is split
/// into two single-byte substitutions. A run whose deleted and inserted bytes
/// are identical changes nothing and is not reported.
pub fn variants_from_edits(script: &[Edit]) -> Vec<Variant> {
    let mut variants = Vec::new();
    let mut position = 1;
    let mut i = 0;

    while i < script.len() {
        let mut left = None;
        while let Some(Edit::Equal(run)) = script.get(i) {
            position += run.len();
            if let Some(&base) = run.last() {
                left = Some(base);
            }
            i += 1;
        }
        if i >= script.len() {
            break;
        }

        let mut variant = Variant {
            position,
            left,
            ..Default::default()
        };
        while let Some(edit) = script.get(i) {
            match edit {
                Edit::Equal(_) => break,
                Edit::Delete(run) => variant.ref_allele.extend_from_slice(run),
                Edit::Insert(run) => variant.alt_allele.extend_from_slice(run),
            }
            i += 1;
        }

        if let ([r0, r1], [a0, a1]) = (&variant.ref_allele[..], &variant.alt_allele[..]) {
            let first = Variant {
                position,
                ref_allele: vec![*r0],
                alt_allele: vec![*a0],
                left: variant.left,
            };
            variant = Variant {
                position: position + 1,
                ref_allele: vec![*r1],
                alt_allele: vec![*a1],
                left: Some(*r0),
            };
            position += 1;
            push_change(&mut variants, first);
        }

        position += variant.ref_allele.len();
        push_change(&mut variants, variant);
    }

    variants
}

fn push_change(variants: &mut Vec<Variant>, variant: Variant) {
    if variant.ref_allele != variant.alt_allele {
        variants.push(variant);
    }
}
