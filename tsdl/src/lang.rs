//! Source locations shared by the lexer, the grammar layer, and the
//! resolver's diagnostics.

pub mod ast;

/// File identifier.
pub type FileId = usize;

/// A range of source code.
///
/// This is added to simplify working with ranges, because [`std::ops::Range`]
/// does not implement [`Copy`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl From<Range> for std::ops::Range<usize> {
    fn from(src: Range) -> std::ops::Range<usize> {
        src.start..src.end
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(src: std::ops::Range<usize>) -> Range {
        Range {
            start: src.start,
            end: src.end,
        }
    }
}

/// Data that covers some range of source code.
#[derive(Debug, Clone)]
pub struct Ranged<Data> {
    pub range: Range,
    pub data: Data,
}

impl<Data> Ranged<Data> {
    pub fn new(range: Range, data: Data) -> Ranged<Data> {
        Ranged { range, data }
    }
}

impl<Data: PartialEq> PartialEq for Ranged<Data> {
    /// Ignores source location metadata.
    fn eq(&self, other: &Ranged<Data>) -> bool {
        self.data == other.data
    }
}
