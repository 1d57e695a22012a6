//! Paragraph and inline-level types.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::ImageNode;

/// A paragraph of rich text.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// Inline items in the paragraph
    pub content: Vec<InlineContent>,

    /// Paragraph style
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            style: ParagraphStyle::default(),
        }
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Add plain text to the paragraph.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.content.push(InlineContent::Text(TextRun::new(text)));
    }

    /// Add a styled text run.
    pub fn add_run(&mut self, run: TextRun) {
        self.content.push(InlineContent::Text(run));
    }

    /// Add an image node at the end of the paragraph.
    pub fn add_image(&mut self, image: ImageNode) {
        self.content.push(InlineContent::Image(image));
    }

    /// Get the text content of the paragraph. Images are omitted.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                InlineContent::Text(run) => Some(run.text.as_str()),
                InlineContent::Image(_) => None,
            })
            .collect()
    }

    /// Number of addressable positions (characters plus one per image).
    pub fn len(&self) -> usize {
        self.content.iter().map(InlineContent::len).sum()
    }

    /// Check if the paragraph has no inline items.
    pub fn is_empty(&self) -> bool {
        self.content.iter().all(|c| c.len() == 0)
    }

    /// Iterate over the text runs overlapping `[start, end)`.
    pub(crate) fn runs_overlapping(&self, start: usize, end: usize) -> Vec<&TextRun> {
        let mut offset = 0;
        let mut runs = Vec::new();
        for item in &self.content {
            let len = item.len();
            let item_end = offset + len;
            if let InlineContent::Text(run) = item {
                if len > 0 && offset < end && start < item_end {
                    runs.push(run);
                }
            }
            offset = item_end;
        }
        runs
    }

    /// Ensure an item boundary exists at `pos` and return the index of the
    /// first item starting at or after it.
    pub(crate) fn split_at(&mut self, pos: usize) -> usize {
        let mut offset = 0;
        for idx in 0..self.content.len() {
            if offset == pos {
                return idx;
            }
            let len = self.content[idx].len();
            if pos < offset + len {
                if let InlineContent::Text(run) = &mut self.content[idx] {
                    let byte = char_to_byte(&run.text, pos - offset);
                    let tail = TextRun {
                        text: run.text.split_off(byte),
                        marks: run.marks,
                        link: run.link.clone(),
                    };
                    self.content.insert(idx + 1, InlineContent::Text(tail));
                }
                return idx + 1;
            }
            offset += len;
        }
        self.content.len()
    }

    /// Split at both ends of `[start, end)` and return the item index range
    /// covering exactly those positions.
    pub(crate) fn split_range(&mut self, start: usize, end: usize) -> Range<usize> {
        let first = self.split_at(start);
        let last = self.split_at(end);
        first..last
    }

    /// Insert an inline item at `pos`.
    pub(crate) fn insert_inline(&mut self, pos: usize, item: InlineContent) {
        let idx = self.split_at(pos);
        self.content.insert(idx, item);
        self.normalize();
    }

    /// Insert text at `pos`, inheriting the marks and link of the run that
    /// precedes the insertion point.
    pub(crate) fn insert_text(&mut self, pos: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let template = self.run_before(pos).cloned().unwrap_or_default();
        let run = TextRun {
            text: text.to_string(),
            marks: template.marks,
            link: template.link,
        };
        self.insert_inline(pos, InlineContent::Text(run));
    }

    /// Remove the positions `[start, end)`, returning the removed items.
    pub(crate) fn remove_range(&mut self, start: usize, end: usize) -> Vec<InlineContent> {
        let range = self.split_range(start, end);
        let removed = self.content.drain(range).collect();
        self.normalize();
        removed
    }

    /// Split the paragraph at `pos`, returning the tail as a new paragraph
    /// with the same style.
    pub(crate) fn split_off(&mut self, pos: usize) -> Paragraph {
        let idx = self.split_at(pos);
        let tail = self.content.split_off(idx);
        self.normalize();
        let mut p = Paragraph {
            content: tail,
            style: self.style.clone(),
        };
        p.normalize();
        p
    }

    /// Append another paragraph's inline items.
    pub(crate) fn append(&mut self, mut other: Paragraph) {
        self.content.append(&mut other.content);
        self.normalize();
    }

    /// Merge adjacent runs with identical formatting and drop empty runs.
    pub(crate) fn normalize(&mut self) {
        let mut merged: Vec<InlineContent> = Vec::with_capacity(self.content.len());
        for item in self.content.drain(..) {
            match item {
                InlineContent::Text(run) if run.text.is_empty() => {}
                InlineContent::Text(run) => match merged.last_mut() {
                    Some(InlineContent::Text(prev)) if prev.same_format(&run) => {
                        prev.text.push_str(&run.text);
                    }
                    _ => merged.push(InlineContent::Text(run)),
                },
                image => merged.push(image),
            }
        }
        self.content = merged;
    }

    fn run_before(&self, pos: usize) -> Option<&TextRun> {
        let mut offset = 0;
        let mut candidate = None;
        for item in &self.content {
            if offset >= pos && candidate.is_some() {
                break;
            }
            if let InlineContent::Text(run) = item {
                candidate = Some(run);
            }
            offset += item.len();
        }
        candidate
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineContent {
    /// A text run with marks
    Text(TextRun),

    /// An embedded image (ordinary or signature)
    Image(ImageNode),
}

impl InlineContent {
    /// Number of positions this item occupies.
    pub fn len(&self) -> usize {
        match self {
            InlineContent::Text(run) => run.text.chars().count(),
            InlineContent::Image(_) => 1,
        }
    }

    /// Check if this item occupies no positions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A run of text with consistent formatting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Inline marks
    pub marks: Marks,

    /// Hyperlink target, if the run is a link
    pub link: Option<String>,
}

impl TextRun {
    /// Create a new text run without marks.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a run with a single mark set.
    pub fn marked(text: impl Into<String>, kind: MarkKind) -> Self {
        let mut run = Self::new(text);
        run.marks.set(kind, true);
        run
    }

    /// Create a hyperlink run.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
            link: Some(url.into()),
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn same_format(&self, other: &TextRun) -> bool {
        self.marks == other.marks && self.link == other.link
    }
}

/// Kinds of inline marks the editor can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    /// Bold weight
    Bold,
    /// Italic style
    Italic,
    /// Underline decoration
    Underline,
    /// Yellow highlight background
    Highlight,
    /// Black-out redaction. Visual only: the text stays in the model.
    Redact,
}

impl MarkKind {
    /// All mark kinds.
    pub const ALL: [MarkKind; 5] = [
        MarkKind::Bold,
        MarkKind::Italic,
        MarkKind::Underline,
        MarkKind::Highlight,
        MarkKind::Redact,
    ];

    /// Whether applying this mark twice removes it again.
    pub fn is_toggle(self) -> bool {
        !matches!(self, MarkKind::Redact)
    }
}

/// Set of inline marks on a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Highlighted text
    pub highlight: bool,

    /// Redacted text (painted over, still present)
    pub redact: bool,
}

impl Marks {
    /// Check whether a mark is set.
    pub fn has(&self, kind: MarkKind) -> bool {
        match kind {
            MarkKind::Bold => self.bold,
            MarkKind::Italic => self.italic,
            MarkKind::Underline => self.underline,
            MarkKind::Highlight => self.highlight,
            MarkKind::Redact => self.redact,
        }
    }

    /// Set or clear a mark.
    pub fn set(&mut self, kind: MarkKind, value: bool) {
        match kind {
            MarkKind::Bold => self.bold = value,
            MarkKind::Italic => self.italic = value,
            MarkKind::Underline => self.underline = value,
            MarkKind::Highlight => self.highlight = value,
            MarkKind::Redact => self.redact = value,
        }
    }

    /// Check if any mark is applied.
    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }
}

/// Paragraph styling properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphStyle {
    /// Text alignment
    pub alignment: Alignment,

    /// Bullet list item
    pub list_item: bool,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// CSS `text-align` keyword.
    pub fn css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new();
        p.add_text("Hello ");
        p.add_run(TextRun::marked("world", MarkKind::Bold));
        p.add_text("!");

        assert_eq!(p.plain_text(), "Hello world!");
        assert_eq!(p.len(), 12);
    }

    #[test]
    fn test_split_at_inside_run() {
        let mut p = Paragraph::with_text("abcdef");
        let idx = p.split_at(2);
        assert_eq!(idx, 1);
        assert_eq!(p.content.len(), 2);
        assert_eq!(p.plain_text(), "abcdef");
    }

    #[test]
    fn test_split_at_multibyte() {
        let mut p = Paragraph::with_text("héllo");
        p.split_at(2);
        match &p.content[0] {
            InlineContent::Text(run) => assert_eq!(run.text, "hé"),
            _ => panic!("expected text run"),
        }
    }

    #[test]
    fn test_normalize_merges_runs() {
        let mut p = Paragraph::new();
        p.add_text("a");
        p.add_text("");
        p.add_text("b");
        p.normalize();
        assert_eq!(p.content.len(), 1);
    }

    #[test]
    fn test_insert_text_inherits_marks() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::marked("bold", MarkKind::Bold));
        p.add_text(" plain");
        p.insert_text(4, "er");

        assert_eq!(p.plain_text(), "bolder plain");
        match &p.content[0] {
            InlineContent::Text(run) => {
                assert_eq!(run.text, "bolder");
                assert!(run.marks.bold);
            }
            _ => panic!("expected text run"),
        }
    }

    #[test]
    fn test_remove_range() {
        let mut p = Paragraph::with_text("Hello world");
        p.remove_range(5, 11);
        assert_eq!(p.plain_text(), "Hello");
    }

    #[test]
    fn test_split_off_keeps_style() {
        let mut p = Paragraph::with_text("left right");
        p.style.alignment = Alignment::Center;
        let tail = p.split_off(5);
        assert_eq!(p.plain_text(), "left ");
        assert_eq!(tail.plain_text(), "right");
        assert_eq!(tail.style.alignment, Alignment::Center);
    }

    #[test]
    fn test_marks() {
        let mut marks = Marks::default();
        assert!(marks.is_plain());
        marks.set(MarkKind::Highlight, true);
        assert!(marks.has(MarkKind::Highlight));
        assert!(!marks.is_plain());
        assert!(!MarkKind::Redact.is_toggle());
        assert!(MarkKind::Bold.is_toggle());
    }
}
