//! Line breaking and pagination.
//!
//! The layout pass turns blocks into positioned text spans and image boxes,
//! page by page. Coordinates are PDF user space: origin at the bottom-left
//! corner, y growing upwards.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::export::PageGeometry;
use crate::model::{Alignment, Block, ContentModel, ImageId, ImageKind, ImageNode, InlineContent, Marks, Paragraph, TextRun};

use super::fonts::{self, FontStyle};
use super::images::{PreparedImage, PX_TO_PT};

/// Vertical margin above and below block images.
const BLOCK_IMAGE_MARGIN: f32 = 7.5;

/// Default height of an inline signature.
const SIGNATURE_HEIGHT: f32 = crate::model::SIGNATURE_HEIGHT_PX as f32 * PX_TO_PT;

/// Horizontal gap on each side of an inline signature.
const SIGNATURE_GAP: f32 = 3.0;

/// Prefix drawn before list items.
const BULLET: char = '\u{2022}';

/// A run of text placed on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Left edge
    pub x: f32,
    /// Baseline
    pub baseline: f32,
    /// Advance width
    pub width: f32,
    /// WinAnsi bytes
    pub bytes: Vec<u8>,
    /// Font face
    pub font: FontStyle,
    /// Font size
    pub size: f32,
    /// Inline marks
    pub marks: Marks,
    /// Hyperlink target
    pub link: Option<String>,
}

/// An image placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBox {
    /// Image node
    pub id: ImageId,
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Drawn width
    pub width: f32,
    /// Drawn height
    pub height: f32,
}

/// Content of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Text spans in drawing order
    pub spans: Vec<TextSpan>,
    /// Images in drawing order
    pub images: Vec<ImageBox>,
}

impl PageLayout {
    /// Text of every span, decoded from WinAnsi as Latin-1.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.bytes.iter().map(|&b| b as char).collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lay out a content model.
///
/// Unencodable characters become `?`. Every image must be present in
/// `images`.
pub fn layout(
    content: &ContentModel,
    geometry: &PageGeometry,
    images: &HashMap<ImageId, PreparedImage>,
) -> Result<Vec<PageLayout>> {
    let mut engine = LayoutEngine::new(geometry, images);
    for block in content.blocks() {
        match block {
            Block::LineBreak => engine.empty_line(),
            Block::Paragraph(p) => engine.paragraph(p)?,
        }
    }
    Ok(engine.finish())
}

#[derive(Debug, Clone)]
struct Piece {
    bytes: Vec<u8>,
    width: f32,
    font: FontStyle,
    marks: Marks,
    link: Option<String>,
}

impl Piece {
    fn same_style(&self, other: &Piece) -> bool {
        self.font == other.font && self.marks == other.marks && self.link == other.link
    }
}

#[derive(Debug, Clone)]
enum Token {
    Word(Vec<Piece>),
    Space(Piece),
    Inline { id: ImageId, width: f32, height: f32 },
    Block { id: ImageId, width: f32, height: f32 },
}

#[derive(Debug, Clone)]
enum LineItem {
    Text { x: f32, piece: Piece },
    Image { x: f32, id: ImageId, width: f32, height: f32 },
}

#[derive(Debug, Default)]
struct Line {
    items: Vec<LineItem>,
    width: f32,
    image_height: f32,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push_piece(&mut self, piece: Piece) {
        let width = piece.width;
        if let Some(LineItem::Text { piece: last, .. }) = self.items.last_mut() {
            if last.same_style(&piece) {
                last.bytes.extend_from_slice(&piece.bytes);
                last.width += piece.width;
                self.width += width;
                return;
            }
        }
        self.items.push(LineItem::Text {
            x: self.width,
            piece,
        });
        self.width += width;
    }

    fn push_image(&mut self, id: ImageId, width: f32, height: f32) {
        self.items.push(LineItem::Image {
            x: self.width + SIGNATURE_GAP,
            id,
            width,
            height,
        });
        self.width += width + 2.0 * SIGNATURE_GAP;
        self.image_height = self.image_height.max(height);
    }
}

struct LayoutEngine<'a> {
    geometry: &'a PageGeometry,
    images: &'a HashMap<ImageId, PreparedImage>,
    pages: Vec<PageLayout>,
    current: PageLayout,
    cursor: f32,
}

impl<'a> LayoutEngine<'a> {
    fn new(
        geometry: &'a PageGeometry,
        images: &'a HashMap<ImageId, PreparedImage>,
    ) -> Self {
        Self {
            geometry,
            images,
            pages: Vec::new(),
            current: PageLayout::default(),
            cursor: geometry.height - geometry.margin_top,
        }
    }

    fn top(&self) -> f32 {
        self.geometry.height - self.geometry.margin_top
    }

    fn max_width(&self) -> f32 {
        self.geometry.content_width().max(1.0)
    }

    /// Start a new page if `height` does not fit below the cursor. A page
    /// that has nothing on it yet always accepts the item.
    fn reserve(&mut self, height: f32) {
        if self.cursor - height < self.geometry.margin_bottom && self.cursor < self.top() {
            self.pages.push(std::mem::take(&mut self.current));
            self.cursor = self.top();
        }
    }

    fn empty_line(&mut self) {
        self.reserve(self.geometry.line_height);
        self.cursor -= self.geometry.line_height;
    }

    fn paragraph(&mut self, paragraph: &Paragraph) -> Result<()> {
        let tokens = self.tokenize(paragraph)?;
        let alignment = paragraph.style.alignment;
        let max_width = self.max_width();

        let mut line = Line::default();
        let mut pending: Vec<Piece> = Vec::new();
        let mut lines_emitted = 0usize;

        for token in tokens {
            match token {
                Token::Space(piece) => pending.push(piece),
                Token::Word(pieces) => {
                    let word_width: f32 = pieces.iter().map(|p| p.width).sum();
                    let space_width: f32 = pending.iter().map(|p| p.width).sum();

                    if !line.is_empty() && line.width + space_width + word_width > max_width {
                        self.emit_line(std::mem::take(&mut line), alignment);
                        lines_emitted += 1;
                        pending.clear();
                    }
                    for space in pending.drain(..) {
                        line.push_piece(space);
                    }

                    if line.width + word_width > max_width {
                        for piece in pieces {
                            lines_emitted += self.push_breaking(&mut line, piece, alignment);
                        }
                    } else {
                        for piece in pieces {
                            line.push_piece(piece);
                        }
                    }
                }
                Token::Inline { id, width, height } => {
                    let space_width: f32 = pending.iter().map(|p| p.width).sum();
                    let needed = width + 2.0 * SIGNATURE_GAP;
                    if !line.is_empty() && line.width + space_width + needed > max_width {
                        self.emit_line(std::mem::take(&mut line), alignment);
                        lines_emitted += 1;
                        pending.clear();
                    }
                    for space in pending.drain(..) {
                        line.push_piece(space);
                    }
                    line.push_image(id, width, height);
                }
                Token::Block { id, width, height } => {
                    if !line.is_empty() {
                        self.emit_line(std::mem::take(&mut line), alignment);
                        lines_emitted += 1;
                    }
                    pending.clear();
                    self.emit_block_image(id, width, height, alignment);
                    lines_emitted += 1;
                }
            }
        }

        if !line.is_empty() || lines_emitted == 0 {
            self.emit_line(line, alignment);
        }
        Ok(())
    }

    /// Place a piece that does not fit on one line, breaking it between
    /// characters. Returns the number of lines emitted.
    fn push_breaking(&mut self, line: &mut Line, piece: Piece, alignment: Alignment) -> usize {
        let max_width = self.max_width();
        let size = self.geometry.font_size;
        let mut emitted = 0;
        let mut chunk = Vec::new();
        let mut chunk_width = 0.0;

        for byte in piece.bytes.iter().copied() {
            let w = fonts::byte_width(byte, piece.font) * size / 1000.0;
            if line.width + chunk_width + w > max_width && (!chunk.is_empty() || !line.is_empty()) {
                if !chunk.is_empty() {
                    line.push_piece(Piece {
                        bytes: std::mem::take(&mut chunk),
                        width: chunk_width,
                        ..piece.clone()
                    });
                }
                self.emit_line(std::mem::take(line), alignment);
                emitted += 1;
                chunk_width = 0.0;
            }
            chunk.push(byte);
            chunk_width += w;
        }
        if !chunk.is_empty() {
            line.push_piece(Piece {
                bytes: chunk,
                width: chunk_width,
                ..piece
            });
        }
        emitted
    }

    fn tokenize(&self, paragraph: &Paragraph) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut joinable = false;

        if paragraph.style.list_item {
            let bullet = TextRun::new(format!("{}  ", BULLET));
            self.tokenize_run(&bullet, &mut tokens, false);
        }

        for item in &paragraph.content {
            match item {
                InlineContent::Text(run) => {
                    joinable = self.tokenize_run(run, &mut tokens, joinable);
                }
                InlineContent::Image(node) => {
                    tokens.push(self.image_token(node)?);
                    joinable = false;
                }
            }
        }
        Ok(tokens)
    }

    /// Split a run into words and spaces. A word that touches the previous
    /// run without whitespace continues the previous word token.
    fn tokenize_run(&self, run: &TextRun, tokens: &mut Vec<Token>, mut joinable: bool) -> bool {
        let font = FontStyle::for_marks(&run.marks);
        let size = self.geometry.font_size;

        for (is_space, group) in group_whitespace(&run.text) {
            let bytes = fonts::encode(&group);
            let piece = Piece {
                width: fonts::encoded_width(&bytes, font, size),
                bytes,
                font,
                marks: run.marks,
                link: run.link.clone(),
            };
            if is_space {
                tokens.push(Token::Space(piece));
                joinable = false;
            } else {
                match tokens.last_mut() {
                    Some(Token::Word(pieces)) if joinable => pieces.push(piece),
                    _ => tokens.push(Token::Word(vec![piece])),
                }
                joinable = true;
            }
        }
        joinable
    }

    fn image_token(&self, node: &ImageNode) -> Result<Token> {
        let prepared = self
            .images
            .get(&node.id)
            .ok_or_else(|| Error::Render(format!("image {} was not prepared", node.id)))?;
        let content_width = self.max_width();
        let content_height = self.geometry.content_height().max(1.0);
        let aspect = prepared.aspect();

        let (mut width, mut height) = match (node.kind, node.width_percent) {
            (_, Some(pct)) => {
                let w = content_width * pct as f32 / 100.0;
                (w, w * aspect)
            }
            (ImageKind::Signature, None) => {
                let h = SIGNATURE_HEIGHT.min(prepared.natural_size().1.max(1.0));
                (h / aspect.max(f32::EPSILON), h)
            }
            (ImageKind::Ordinary, None) => {
                let w = prepared.natural_size().0.min(content_width);
                (w, w * aspect)
            }
        };

        let limit_width = match node.kind {
            ImageKind::Signature => content_width - 2.0 * SIGNATURE_GAP,
            ImageKind::Ordinary => content_width,
        };
        let limit_height = match node.kind {
            ImageKind::Signature => content_height - self.geometry.line_height,
            ImageKind::Ordinary => content_height - 2.0 * BLOCK_IMAGE_MARGIN,
        }
        .max(1.0);
        let scale = (limit_width / width).min(limit_height / height).min(1.0);
        if scale.is_finite() && scale > 0.0 {
            width *= scale;
            height *= scale;
        }

        Ok(match node.kind {
            ImageKind::Signature => Token::Inline {
                id: node.id,
                width,
                height,
            },
            ImageKind::Ordinary => Token::Block {
                id: node.id,
                width,
                height,
            },
        })
    }

    fn align_offset(&self, alignment: Alignment, width: f32) -> f32 {
        let free = (self.geometry.content_width() - width).max(0.0);
        match alignment {
            Alignment::Left | Alignment::Justify => 0.0,
            Alignment::Center => free / 2.0,
            Alignment::Right => free,
        }
    }

    fn emit_line(&mut self, line: Line, alignment: Alignment) {
        let g = self.geometry;
        let gap = (g.line_height - g.font_size).max(0.0) / 2.0;
        let height = g.line_height.max(line.image_height + 2.0 * gap);
        self.reserve(height);

        let top = self.cursor;
        let bottom = top - height;
        let baseline = bottom + gap - fonts::DESCENT * g.font_size / 1000.0;
        let left = g.margin_x + self.align_offset(alignment, line.width);

        for item in line.items {
            match item {
                LineItem::Text { x, piece } => self.current.spans.push(TextSpan {
                    x: left + x,
                    baseline,
                    width: piece.width,
                    bytes: piece.bytes,
                    font: piece.font,
                    size: g.font_size,
                    marks: piece.marks,
                    link: piece.link,
                }),
                LineItem::Image {
                    x,
                    id,
                    width,
                    height,
                } => self.current.images.push(ImageBox {
                    id,
                    x: left + x,
                    y: bottom + gap,
                    width,
                    height,
                }),
            }
        }
        self.cursor = bottom;
    }

    fn emit_block_image(&mut self, id: ImageId, width: f32, height: f32, alignment: Alignment) {
        let total = height + 2.0 * BLOCK_IMAGE_MARGIN;
        self.reserve(total);
        let x = self.geometry.margin_x + self.align_offset(alignment, width);
        self.current.images.push(ImageBox {
            id,
            x,
            y: self.cursor - BLOCK_IMAGE_MARGIN - height,
            width,
            height,
        });
        self.cursor -= total;
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Split text into alternating whitespace and non-whitespace groups.
fn group_whitespace(text: &str) -> Vec<(bool, String)> {
    let mut groups: Vec<(bool, String)> = Vec::new();
    for c in text.chars() {
        let space = c.is_whitespace();
        match groups.last_mut() {
            Some((kind, group)) if *kind == space => group.push(c),
            _ => groups.push((space, c.to_string())),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocRange, MarkKind};

    fn lay(content: &ContentModel) -> Vec<PageLayout> {
        layout(content, &PageGeometry::a4(), &HashMap::new()).unwrap()
    }

    #[test]
    fn test_group_whitespace() {
        let groups = group_whitespace("ab  c\t");
        assert_eq!(
            groups,
            vec![
                (false, "ab".to_string()),
                (true, "  ".to_string()),
                (false, "c".to_string()),
                (true, "\t".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_line() {
        let pages = lay(&ContentModel::from_text("Hello world"));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].spans.len(), 1);
        assert_eq!(pages[0].text(), "Hello world");

        let g = PageGeometry::a4();
        let span = &pages[0].spans[0];
        assert_eq!(span.x, g.margin_x);
        assert!(span.baseline < g.height - g.margin_top);
        assert!(span.baseline > g.height - g.margin_top - g.line_height);
    }

    #[test]
    fn test_empty_model_has_one_page() {
        let pages = lay(&ContentModel::new());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].spans.is_empty());
    }

    #[test]
    fn test_wrapping_stays_in_content_width() {
        let text = "lorem ipsum dolor ".repeat(40);
        let pages = lay(&ContentModel::from_text(&text));
        let g = PageGeometry::a4();

        assert!(pages[0].spans.len() > 1);
        for span in &pages[0].spans {
            assert!(span.x + span.width <= g.width - g.margin_x + 0.01);
        }
        // wrapped lines do not start with a space
        assert!(pages[0].spans.iter().all(|s| s.bytes[0] != b' '));
    }

    #[test]
    fn test_long_word_is_broken() {
        let text = "x".repeat(500);
        let pages = lay(&ContentModel::from_text(&text));
        let total: usize = pages[0].spans.iter().map(|s| s.bytes.len()).sum();
        assert_eq!(total, 500);
        assert!(pages[0].spans.len() > 1);
    }

    #[test]
    fn test_pagination() {
        let text = vec!["line"; 120].join("\n");
        let pages = lay(&ContentModel::from_text(&text));
        assert!(pages.len() >= 3);

        let g = PageGeometry::a4();
        for page in &pages {
            for span in &page.spans {
                assert!(span.baseline > g.margin_bottom);
            }
        }
        let count: usize = pages.iter().map(|p| p.spans.len()).sum();
        assert_eq!(count, 120);
    }

    #[test]
    fn test_mark_splits_spans_and_selects_font() {
        let mut content = ContentModel::from_text("plain bold");
        content.apply_mark(DocRange::within(0, 6, 10), MarkKind::Bold);
        let pages = lay(&content);

        let spans = &pages[0].spans;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].font, FontStyle::Regular);
        assert_eq!(spans[1].font, FontStyle::Bold);
        assert_eq!(spans[1].bytes, b"bold".to_vec());
        assert!((spans[1].x - (spans[0].x + spans[0].width)).abs() < 0.001);
    }

    #[test]
    fn test_center_alignment() {
        let mut content = ContentModel::from_text("hi");
        content.set_alignment(0, Alignment::Center);
        let pages = lay(&content);
        let g = PageGeometry::a4();
        let span = &pages[0].spans[0];
        let mid = span.x + span.width / 2.0;
        assert!((mid - g.width / 2.0).abs() < 0.01);
    }

    #[test]
    fn test_list_item_has_bullet() {
        let mut content = ContentModel::from_text("plain\nitem");
        content.toggle_list(1, 1);
        let pages = lay(&content);

        assert_eq!(pages[0].spans[0].bytes, b"plain".to_vec());
        assert_eq!(pages[0].spans[1].bytes, b"\x95  item".to_vec());
    }

    #[test]
    fn test_unencodable_text_is_substituted() {
        let pages = lay(&ContentModel::from_text("日本語 ok"));
        assert_eq!(pages[0].text(), "??? ok");
    }
}
