//! Edit-script data model shared by the aligner, the cleanup passes and
//! the normalizer.
//!
//! An [`EditScript`] transforms a source sequence A into a target sequence B:
//! the `Delete` and `Equal` runs concatenate to A, the `Insert` and `Equal`
//! runs concatenate to B. Every stage of the pipeline preserves that.

/// Payload-free tag of an [`Edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    Equal,
    Insert,
    Delete,
}

/// One run of an edit script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Edit {
    /// Text present in both sequences.
    Equal(Vec<u8>),
    /// Text present only in the target sequence.
    Insert(Vec<u8>),
    /// Text present only in the source sequence.
    Delete(Vec<u8>),
}

/// An ordered list of edits.
pub type EditScript = Vec<Edit>;

impl Edit {
    pub fn new(kind: EditKind, text: impl Into<Vec<u8>>) -> Self {
        let text = text.into();
        match kind {
            EditKind::Equal => Edit::Equal(text),
            EditKind::Insert => Edit::Insert(text),
            EditKind::Delete => Edit::Delete(text),
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            Edit::Equal(_) => EditKind::Equal,
            Edit::Insert(_) => EditKind::Insert,
            Edit::Delete(_) => EditKind::Delete,
        }
    }

    pub fn text(&self) -> &[u8] {
        match self {
            Edit::Equal(text) | Edit::Insert(text) | Edit::Delete(text) => text,
        }
    }

    pub fn text_mut(&mut self) -> &mut Vec<u8> {
        match self {
            Edit::Equal(text) | Edit::Insert(text) | Edit::Delete(text) => text,
        }
    }

    /// Replace the payload, keeping the tag.
    pub fn set_text(&mut self, text: Vec<u8>) {
        *self.text_mut() = text;
    }

    pub fn len(&self) -> usize {
        self.text().len()
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal(_))
    }
}

/// Reconstruct the source sequence (A) described by a script.
pub fn source_text(script: &[Edit]) -> Vec<u8> {
    script
        .iter()
        .filter(|e| e.kind() != EditKind::Insert)
        .flat_map(|e| e.text().iter().copied())
        .collect()
}

/// Reconstruct the target sequence (B) described by a script.
pub fn target_text(script: &[Edit]) -> Vec<u8> {
    script
        .iter()
        .filter(|e| e.kind() != EditKind::Delete)
        .flat_map(|e| e.text().iter().copied())
        .collect()
}

/// Concatenate byte runs into a fresh buffer.
pub(crate) fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// Number of leading bytes shared by `a` and `b`.
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Number of trailing bytes shared by `a` and `b`.
pub(crate) fn common_suffix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Position of the first occurrence of `needle` in `haystack` at or after `from`.
pub(crate) fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    let rest = &haystack[from..];
    if needle.is_empty() {
        return Some(from);
    }
    if needle.len() > rest.len() {
        return None;
    }
    rest.windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}
