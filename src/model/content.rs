//! The editable content model.

use serde::{Deserialize, Serialize};

use super::{
    Alignment, Block, DocRange, ImageId, ImageKind, ImageNode, ImageSource, InlineContent,
    MarkKind, Paragraph, Position, TextRun, UndoStack,
};

/// Rich-text content being edited.
///
/// A flat sequence of blocks. Each non-empty line of the source text becomes
/// one paragraph and each empty line an explicit line break. Edit operations
/// that receive an invalid range or a missing image reference do nothing and
/// report `false` / `None`.
///
/// Every edit that changes the blocks is recorded for [`undo`](Self::undo).
/// A model built with [`from_text`](Self::from_text) starts with an empty
/// history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentModel {
    blocks: Vec<Block>,
    selected_image: Option<ImageId>,
    next_image_id: u64,
    history: UndoStack,
}

impl ContentModel {
    /// Create an empty content model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from plain text.
    ///
    /// Lines are split on `\n` with a trailing `\r` removed. No heading,
    /// list or table inference is done.
    pub fn from_text(text: &str) -> Self {
        let blocks = text
            .lines()
            .map(|line| {
                let line = line.strip_suffix('\r').unwrap_or(line);
                if line.is_empty() {
                    Block::LineBreak
                } else {
                    Block::Paragraph(Paragraph::with_text(line))
                }
            })
            .collect();
        Self {
            blocks,
            ..Default::default()
        }
    }

    /// Build a model from existing blocks.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let next_image_id = blocks
            .iter()
            .filter_map(Block::as_paragraph)
            .flat_map(|p| p.content.iter())
            .filter_map(|c| match c {
                InlineContent::Image(node) => Some(node.id.0 + 1),
                InlineContent::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            blocks,
            next_image_id,
            ..Default::default()
        }
    }

    /// All blocks in order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the model has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Linearize to plain text: images omitted, one line per block.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tag-based (HTML) snapshot of the content.
    pub fn markup_snapshot(&self) -> String {
        crate::export::markup::to_markup(self)
    }

    /// Toggle a mark over a range.
    ///
    /// If every text character in the range already carries the mark it is
    /// removed, otherwise it is added to all of them. Redaction can only be
    /// added.
    pub fn apply_mark(&mut self, range: DocRange, kind: MarkKind) -> bool {
        self.recorded(|model| {
            let Some(segments) = model.segments(range) else {
                return false;
            };

            let current: Vec<bool> = segments
                .iter()
                .filter_map(|&(b, s, e)| model.blocks[b].as_paragraph().map(|p| (p, s, e)))
                .flat_map(|(p, s, e)| p.runs_overlapping(s, e))
                .map(|run| run.marks.has(kind))
                .collect();
            if current.is_empty() {
                return false;
            }

            let value = !kind.is_toggle() || !current.iter().all(|&set| set);
            log::debug!("apply_mark {:?}={} over {} block(s)", kind, value, segments.len());
            model.update_runs(&segments, |run| run.marks.set(kind, value));
            true
        })
    }

    /// Turn the text in a range into a hyperlink.
    pub fn apply_link(&mut self, range: DocRange, url: &str) -> bool {
        self.recorded(|model| {
            let url = url.trim();
            if url.is_empty() || !model.has_text_in(range) {
                return false;
            }
            let Some(segments) = model.segments(range) else {
                return false;
            };
            model.update_runs(&segments, |run| run.link = Some(url.to_string()));
            true
        })
    }

    /// Remove hyperlinks from a range.
    pub fn remove_link(&mut self, range: DocRange) -> bool {
        self.recorded(|model| {
            if !model.has_text_in(range) {
                return false;
            }
            let Some(segments) = model.segments(range) else {
                return false;
            };
            model.update_runs(&segments, |run| run.link = None);
            true
        })
    }

    /// Insert text at a position and return the caret after it.
    ///
    /// The new text inherits the marks of the run before the caret. Each
    /// `\n` splits the paragraph.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Option<Position> {
        self.recorded(|model| {
            if !model.prepare_position(pos) {
                return None;
            }

            let mut caret = pos;
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    caret = model.split_block(caret)?;
                }
                let line = line.strip_suffix('\r').unwrap_or(line);
                if line.is_empty() {
                    continue;
                }
                model.paragraph_mut(caret.block)?
                    .insert_text(caret.offset, line);
                caret.offset += line.chars().count();
            }
            Some(caret)
        })
    }

    /// Delete the content of a range, merging the boundary blocks.
    pub fn delete_range(&mut self, range: DocRange) -> bool {
        self.recorded(|model| {
            if model.segments(range).is_none() || range.is_collapsed() {
                return false;
            }

            let DocRange { start, end } = range;
            if start.block == end.block {
                if let Block::Paragraph(p) = &mut model.blocks[start.block] {
                    p.remove_range(start.offset, end.offset);
                }
                model.collapse(start.block);
            } else {
                let tail = model.take_block(end.block).split_off(end.offset);
                let mut head = model.take_block(start.block);
                head.split_off(start.offset);
                head.append(tail);
                model.blocks[start.block] = Block::from_paragraph(head);
                model.blocks.drain(start.block + 1..=end.block);
            }

            model.prune_selection();
            true
        })
    }

    /// Split the block at a position, returning the start of the new block.
    pub fn split_block(&mut self, pos: Position) -> Option<Position> {
        self.recorded(|model| {
            if !model.prepare_position(pos) {
                return None;
            }
            let mut head = model.take_block(pos.block);
            let tail = head.split_off(pos.offset);
            model.blocks[pos.block] = Block::from_paragraph(head);
            model.blocks.insert(pos.block + 1, Block::from_paragraph(tail));
            Some(Position::new(pos.block + 1, 0))
        })
    }

    /// Set the alignment of a paragraph.
    pub fn set_alignment(&mut self, block: usize, alignment: Alignment) -> bool {
        self.recorded(|model| match model.blocks.get_mut(block) {
            Some(Block::Paragraph(p)) => {
                p.style.alignment = alignment;
                true
            }
            _ => false,
        })
    }

    /// Turn paragraphs `first..=last` into bullet list items, or back into
    /// plain paragraphs if all of them already are. Line breaks in the range
    /// are skipped.
    pub fn toggle_list(&mut self, first: usize, last: usize) -> bool {
        self.recorded(|model| {
            if first > last || last >= model.blocks.len() {
                return false;
            }
            let paragraphs: Vec<usize> = (first..=last)
                .filter(|&b| model.blocks[b].as_paragraph().is_some())
                .collect();
            if paragraphs.is_empty() {
                return false;
            }
            let value = !paragraphs
                .iter()
                .all(|&b| model.blocks[b].as_paragraph().is_some_and(|p| p.style.list_item));
            for b in paragraphs {
                if let Block::Paragraph(p) = &mut model.blocks[b] {
                    p.style.list_item = value;
                }
            }
            true
        })
    }

    /// Insert an image at a position.
    pub fn insert_image(
        &mut self,
        pos: Position,
        source: ImageSource,
        kind: ImageKind,
    ) -> Option<ImageId> {
        self.recorded(|model| {
            if !model.prepare_position(pos) {
                return None;
            }
            let id = ImageId(model.next_image_id);
            let paragraph = model.paragraph_mut(pos.block)?;
            paragraph.insert_inline(
                pos.offset,
                InlineContent::Image(ImageNode::new(id, source, kind)),
            );
            model.next_image_id += 1;
            log::debug!("inserted {:?} image {} at {:?}", kind, id, pos);
            Some(id)
        })
    }

    /// Insert an image given as raw encoded bytes.
    pub fn insert_image_bytes(
        &mut self,
        pos: Position,
        data: Vec<u8>,
        kind: ImageKind,
    ) -> Option<ImageId> {
        match ImageSource::from_bytes(data) {
            Ok(source) => self.insert_image(pos, source, kind),
            Err(e) => {
                log::debug!("ignoring image insert: {}", e);
                None
            }
        }
    }

    /// Insert an image given as a `data:` URI.
    pub fn insert_image_data_uri(
        &mut self,
        pos: Position,
        uri: &str,
        kind: ImageKind,
    ) -> Option<ImageId> {
        match ImageSource::from_data_uri(uri) {
            Ok(source) => self.insert_image(pos, source, kind),
            Err(e) => {
                log::debug!("ignoring image insert: {}", e);
                None
            }
        }
    }

    /// Select an image for resizing or removal.
    pub fn select_image(&mut self, id: ImageId) -> bool {
        if self.locate_image(id).is_some() {
            self.selected_image = Some(id);
            true
        } else {
            false
        }
    }

    /// Clear the image selection.
    pub fn clear_image_selection(&mut self) {
        self.selected_image = None;
    }

    /// The currently selected image, if any.
    pub fn selected_image(&self) -> Option<ImageId> {
        self.selected_image
    }

    /// Resize the selected image to a percentage of the content width.
    ///
    /// Values above 100 are clamped; zero is rejected.
    pub fn resize_image(&mut self, percent: u8) -> bool {
        self.recorded(|model| {
            if percent == 0 {
                return false;
            }
            let Some(id) = model.selected_image else {
                return false;
            };
            match model.image_mut(id) {
                Some(node) => {
                    node.width_percent = Some(percent.min(100));
                    true
                }
                None => false,
            }
        })
    }

    /// Remove the selected image and clear the selection.
    pub fn remove_image(&mut self) -> bool {
        self.recorded(|model| {
            let Some(id) = model.selected_image.take() else {
                return false;
            };
            let Some((block, index)) = model.locate_image(id) else {
                return false;
            };
            if let Block::Paragraph(p) = &mut model.blocks[block] {
                p.content.remove(index);
                p.normalize();
            }
            model.collapse(block);
            true
        })
    }

    /// Look up an image node.
    pub fn image(&self, id: ImageId) -> Option<&ImageNode> {
        let (block, index) = self.locate_image(id)?;
        match self.blocks[block].as_paragraph()?.content.get(index)? {
            InlineContent::Image(node) => Some(node),
            InlineContent::Text(_) => None,
        }
    }

    /// All image nodes in document order.
    pub fn images(&self) -> Vec<&ImageNode> {
        self.blocks
            .iter()
            .filter_map(Block::as_paragraph)
            .flat_map(|p| p.content.iter())
            .filter_map(|c| match c {
                InlineContent::Image(node) => Some(node),
                InlineContent::Text(_) => None,
            })
            .collect()
    }

    /// Revert the last recorded edit.
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.blocks);
        if undone {
            self.prune_selection();
        }
        undone
    }

    /// Re-apply the last undone edit.
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.blocks);
        if redone {
            self.prune_selection();
        }
        redone
    }

    /// Check if an edit can be undone.
    pub fn can_undo(&self) -> bool {
        self.history.undo_len() > 0
    }

    /// Check if an undone edit can be redone.
    pub fn can_redo(&self) -> bool {
        self.history.redo_len() > 0
    }

    /// Forget the edit history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Word, character and image counts.
    pub fn stats(&self) -> ContentStats {
        let text = self.plain_text();
        ContentStats {
            words: text.split_whitespace().count(),
            characters: text.chars().filter(|c| *c != '\n').count(),
            paragraphs: self
                .blocks
                .iter()
                .filter(|b| matches!(b, Block::Paragraph(_)))
                .count(),
            images: self.images().len(),
        }
    }

    /// Run an edit and record the previous blocks if it changed them.
    fn recorded<R>(&mut self, edit: impl FnOnce(&mut Self) -> R) -> R {
        if !self.history.begin() {
            return edit(self);
        }
        let before = self.blocks.clone();
        let result = edit(self);
        self.history.end();
        if self.blocks != before {
            self.history.record(before);
        }
        result
    }

    fn is_valid(&self, pos: Position) -> bool {
        self.blocks
            .get(pos.block)
            .is_some_and(|b| pos.offset <= b.len())
    }

    /// Allow the caret at the origin of an empty model.
    fn prepare_position(&mut self, pos: Position) -> bool {
        if self.blocks.is_empty() && pos == Position::new(0, 0) {
            self.blocks.push(Block::LineBreak);
        }
        self.is_valid(pos)
    }

    /// Resolve a range into `(block, start, end)` segments.
    fn segments(&self, range: DocRange) -> Option<Vec<(usize, usize, usize)>> {
        let DocRange { start, end } = range;
        if end < start || !self.is_valid(start) || !self.is_valid(end) {
            return None;
        }
        Some(
            (start.block..=end.block)
                .map(|b| {
                    let s = if b == start.block { start.offset } else { 0 };
                    let e = if b == end.block {
                        end.offset
                    } else {
                        self.blocks[b].len()
                    };
                    (b, s, e)
                })
                .collect(),
        )
    }

    fn has_text_in(&self, range: DocRange) -> bool {
        self.segments(range).is_some_and(|segments| {
            segments.iter().any(|&(b, s, e)| {
                self.blocks[b]
                    .as_paragraph()
                    .is_some_and(|p| !p.runs_overlapping(s, e).is_empty())
            })
        })
    }

    fn update_runs(&mut self, segments: &[(usize, usize, usize)], mut f: impl FnMut(&mut TextRun)) {
        for &(b, s, e) in segments {
            if let Block::Paragraph(p) = &mut self.blocks[b] {
                let items = p.split_range(s, e);
                for item in &mut p.content[items] {
                    if let InlineContent::Text(run) = item {
                        f(run);
                    }
                }
                p.normalize();
            }
        }
    }

    fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        let block = self.blocks.get_mut(index)?;
        if matches!(block, Block::LineBreak) {
            *block = Block::Paragraph(Paragraph::new());
        }
        match block {
            Block::Paragraph(p) => Some(p),
            Block::LineBreak => None,
        }
    }

    fn take_block(&mut self, index: usize) -> Paragraph {
        std::mem::replace(&mut self.blocks[index], Block::LineBreak).into_paragraph()
    }

    fn collapse(&mut self, index: usize) {
        let paragraph = self.take_block(index);
        self.blocks[index] = Block::from_paragraph(paragraph);
    }

    fn locate_image(&self, id: ImageId) -> Option<(usize, usize)> {
        self.blocks.iter().enumerate().find_map(|(b, block)| {
            block.as_paragraph().and_then(|p| {
                p.content
                    .iter()
                    .position(|c| matches!(c, InlineContent::Image(node) if node.id == id))
                    .map(|i| (b, i))
            })
        })
    }

    fn image_mut(&mut self, id: ImageId) -> Option<&mut ImageNode> {
        let (block, index) = self.locate_image(id)?;
        match &mut self.blocks[block] {
            Block::Paragraph(p) => match p.content.get_mut(index)? {
                InlineContent::Image(node) => Some(node),
                InlineContent::Text(_) => None,
            },
            Block::LineBreak => None,
        }
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selected_image {
            if self.locate_image(id).is_none() {
                self.selected_image = None;
            }
        }
    }
}

/// Content statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    /// Whitespace-separated words
    pub words: usize,
    /// Characters excluding line breaks
    pub characters: usize,
    /// Paragraph blocks
    pub paragraphs: usize,
    /// Embedded images
    pub images: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn run_at(model: &ContentModel, block: usize, index: usize) -> &TextRun {
        match &model.blocks()[block] {
            Block::Paragraph(p) => match &p.content[index] {
                InlineContent::Text(run) => run,
                other => panic!("expected text, got {:?}", other),
            },
            Block::LineBreak => panic!("expected paragraph"),
        }
    }

    #[test]
    fn test_from_text_blocks() {
        let model = ContentModel::from_text("Line A\r\n\r\nLine B");
        assert_eq!(model.block_count(), 3);
        assert!(matches!(model.blocks()[1], Block::LineBreak));
        assert_eq!(model.plain_text(), "Line A\n\nLine B");
    }

    #[test]
    fn test_from_text_whitespace_line_is_paragraph() {
        let model = ContentModel::from_text("a\n  \nb");
        assert!(matches!(model.blocks()[1], Block::Paragraph(_)));
    }

    #[test]
    fn test_apply_mark_partial_then_full() {
        let mut model = ContentModel::from_text("Hello world");
        assert!(model.apply_mark(DocRange::within(0, 0, 5), MarkKind::Bold));
        assert!(run_at(&model, 0, 0).marks.bold);

        // Mixed range: mark gets added everywhere.
        assert!(model.apply_mark(DocRange::within(0, 0, 11), MarkKind::Bold));
        assert!(run_at(&model, 0, 0).marks.bold);
        assert_eq!(run_at(&model, 0, 0).text, "Hello world");

        // Fully marked: toggled off.
        assert!(model.apply_mark(DocRange::within(0, 0, 11), MarkKind::Bold));
        assert!(!run_at(&model, 0, 0).marks.bold);
    }

    #[test]
    fn test_redact_is_additive() {
        let mut model = ContentModel::from_text("secret");
        let range = DocRange::within(0, 0, 6);
        model.apply_mark(range, MarkKind::Redact);
        model.apply_mark(range, MarkKind::Redact);
        assert!(run_at(&model, 0, 0).marks.redact);
        assert_eq!(model.plain_text(), "secret");
    }

    #[test]
    fn test_invalid_range_is_noop() {
        let mut model = ContentModel::from_text("abc");
        let before = model.clone();
        assert!(!model.apply_mark(DocRange::within(0, 0, 10), MarkKind::Italic));
        assert!(!model.apply_mark(DocRange::within(4, 0, 1), MarkKind::Italic));
        assert!(!model.delete_range(DocRange::within(0, 2, 9)));
        assert_eq!(model, before);
    }

    #[test]
    fn test_insert_text_with_newline() {
        let mut model = ContentModel::from_text("HelloWorld");
        let caret = model.insert_text(Position::new(0, 5), ",\nNew ").unwrap();
        assert_eq!(caret, Position::new(1, 4));
        assert_eq!(model.plain_text(), "Hello,\nNew World");
    }

    #[test]
    fn test_insert_into_empty_model() {
        let mut model = ContentModel::new();
        assert!(model.insert_text(Position::new(0, 0), "hi").is_some());
        assert_eq!(model.plain_text(), "hi");
    }

    #[test]
    fn test_delete_across_blocks() {
        let mut model = ContentModel::from_text("first line\n\nsecond line");
        assert!(model.delete_range(DocRange::new(Position::new(0, 5), Position::new(2, 6))));
        assert_eq!(model.block_count(), 1);
        assert_eq!(model.plain_text(), "first line");
    }

    #[test]
    fn test_delete_whole_paragraph_becomes_line_break() {
        let mut model = ContentModel::from_text("abc\ndef");
        model.delete_range(DocRange::within(0, 0, 3));
        assert!(matches!(model.blocks()[0], Block::LineBreak));
        assert_eq!(model.plain_text(), "\ndef");
    }

    #[test]
    fn test_links() {
        let mut model = ContentModel::from_text("see docs here");
        assert!(model.apply_link(DocRange::within(0, 4, 8), "https://example.com"));
        assert_eq!(run_at(&model, 0, 1).link.as_deref(), Some("https://example.com"));
        assert!(!model.apply_link(DocRange::within(0, 4, 8), "  "));

        assert!(model.remove_link(DocRange::within(0, 0, 13)));
        assert_eq!(run_at(&model, 0, 0).text, "see docs here");
        assert!(run_at(&model, 0, 0).link.is_none());
    }

    #[test]
    fn test_image_lifecycle() {
        let mut model = ContentModel::from_text("before after");
        let id = model
            .insert_image_bytes(Position::new(0, 7), PNG_MAGIC.to_vec(), ImageKind::Ordinary)
            .unwrap();
        assert_eq!(model.plain_text(), "before after");
        assert_eq!(model.blocks()[0].len(), 13);

        // Nothing selected yet.
        assert!(!model.resize_image(50));
        assert!(!model.remove_image());

        assert!(model.select_image(id));
        assert!(model.resize_image(150));
        assert_eq!(model.image(id).unwrap().width_percent, Some(100));

        assert!(model.remove_image());
        assert!(model.selected_image().is_none());
        assert!(model.images().is_empty());
        assert!(!model.select_image(id));
    }

    #[test]
    fn test_insert_signature_from_data_uri() {
        let mut model = ContentModel::from_text("Signed:");
        let uri = ImageSource::from_bytes(PNG_MAGIC.to_vec())
            .unwrap()
            .to_data_uri();
        let id = model
            .insert_image_data_uri(Position::new(0, 7), &uri, ImageKind::Signature)
            .unwrap();
        assert!(model.image(id).unwrap().is_signature());
        assert!(model
            .insert_image_data_uri(Position::new(0, 0), "data:,oops", ImageKind::Signature)
            .is_none());
    }

    #[test]
    fn test_delete_clears_selected_image() {
        let mut model = ContentModel::from_text("ab");
        let id = model
            .insert_image_bytes(Position::new(0, 1), PNG_MAGIC.to_vec(), ImageKind::Ordinary)
            .unwrap();
        model.select_image(id);
        model.delete_range(DocRange::within(0, 0, 3));
        assert!(model.selected_image().is_none());
    }

    #[test]
    fn test_set_alignment() {
        let mut model = ContentModel::from_text("a\n\nb");
        assert!(model.set_alignment(0, Alignment::Center));
        assert!(!model.set_alignment(1, Alignment::Center));
        assert!(!model.set_alignment(9, Alignment::Center));
    }

    #[test]
    fn test_stats() {
        let model = ContentModel::from_text("one two\n\nthree");
        let stats = model.stats();
        assert_eq!(stats.words, 3);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.characters, 12);
        assert_eq!(stats.images, 0);
    }
}
