//! Block-level types and addressing.

use serde::{Deserialize, Serialize};

use super::Paragraph;

/// A top-level block of the content model.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph of inline content
    Paragraph(Paragraph),

    /// An explicit empty line
    LineBreak,
}

impl Block {
    /// Number of addressable positions in the block.
    pub fn len(&self) -> usize {
        match self {
            Block::Paragraph(p) => p.len(),
            Block::LineBreak => 0,
        }
    }

    /// Check if the block holds no content.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the text of the block. Line breaks yield an empty string.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::LineBreak => String::new(),
        }
    }

    /// Borrow the paragraph, if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::LineBreak => None,
        }
    }

    /// Turn the block into a paragraph, converting line breaks into an
    /// empty paragraph.
    pub(crate) fn into_paragraph(self) -> Paragraph {
        match self {
            Block::Paragraph(p) => p,
            Block::LineBreak => Paragraph::new(),
        }
    }

    /// Wrap a paragraph, collapsing an empty one into a line break.
    pub(crate) fn from_paragraph(p: Paragraph) -> Self {
        if p.content.is_empty() {
            Block::LineBreak
        } else {
            Block::Paragraph(p)
        }
    }
}

/// A caret position: block index plus offset within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Block index (0-based)
    pub block: usize,

    /// Offset in characters; an inline image counts as one position
    pub offset: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocRange {
    /// Inclusive start
    pub start: Position,

    /// Exclusive end
    pub end: Position,
}

impl DocRange {
    /// Create a range. The endpoints are reordered if given backwards.
    pub fn new(start: Position, end: Position) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Range within a single block.
    pub fn within(block: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(block, start), Position::new(block, end))
    }

    /// Check if the range is collapsed to a caret.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_len() {
        assert_eq!(Block::LineBreak.len(), 0);
        assert_eq!(Block::Paragraph(Paragraph::with_text("abc")).len(), 3);
    }

    #[test]
    fn test_from_paragraph_collapses_empty() {
        assert_eq!(Block::from_paragraph(Paragraph::new()), Block::LineBreak);
    }

    #[test]
    fn test_range_ordering() {
        let r = DocRange::new(Position::new(2, 0), Position::new(1, 4));
        assert_eq!(r.start, Position::new(1, 4));
        assert_eq!(r.end, Position::new(2, 0));
        assert!(DocRange::within(0, 3, 3).is_collapsed());
    }
}
