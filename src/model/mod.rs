//! Document model types.
//!
//! The content model is an in-memory block tree independent of any
//! renderer. Exporters read it; the editor and the transformation gateway
//! write it.

mod analysis;
mod block;
mod content;
mod decoration;
mod history;
mod image;
mod paragraph;

pub use analysis::{AnalysisResult, ChartItem, MAX_KEYWORDS, MAX_TOPICS};
pub use block::{Block, DocRange, Position};
pub use content::{ContentModel, ContentStats};
pub use decoration::PageDecoration;
pub use history::{UndoStack, DEFAULT_HISTORY_LIMIT};
pub use image::{ImageId, ImageKind, ImageNode, ImageSource, SIGNATURE_HEIGHT_PX};
pub use paragraph::{
    Alignment, InlineContent, MarkKind, Marks, Paragraph, ParagraphStyle, TextRun,
};
