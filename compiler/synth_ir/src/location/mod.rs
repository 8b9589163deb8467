//! Compilation-wide source locations.
//!
//! A [`Span`] is only meaningful within one file. Deterministic ordering of
//! synthesized types needs a total order across the whole compilation, so a
//! location pairs the span with the file's ordinal in compilation order.

use std::fmt;

use crate::Span;

/// Ordinal of a source file within one compilation, in input order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn new(ordinal: u32) -> Self {
        FileId(ordinal)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

/// A span in a specific file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct SourceLocation {
    pub file: FileId,
    pub span: Span,
}

impl SourceLocation {
    #[inline]
    pub const fn new(file: FileId, span: Span) -> Self {
        SourceLocation { file, span }
    }

    /// Pack `(file, span.start)` into one word whose integer order matches
    /// the lexicographic order of the pair.
    ///
    /// Two locations in the same file starting at the same offset share a key;
    /// that is fine for ordering since they would be indistinguishable anyway.
    #[inline]
    pub const fn order_key(self) -> u64 {
        ((self.file.0 as u64) << 32) | self.span.start as u64
    }
}

impl Ord for SourceLocation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.file, self.span).cmp(&(other.file, other.span))
    }
}

impl PartialOrd for SourceLocation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.file.0, self.span)
    }
}
