//! Tag-based (HTML) snapshot of the content model.
//!
//! The snapshot mirrors what the editing surface shows. It is meant for
//! office export and inspection, and is not parsed back.

use crate::model::{
    Alignment, Block, ContentModel, ImageKind, ImageNode, InlineContent, Paragraph, TextRun,
    SIGNATURE_HEIGHT_PX,
};

/// Highlight background color.
pub const HIGHLIGHT_COLOR: &str = "#fef08a";

/// Serialize content to HTML.
///
/// Consecutive list items share one `<ul>`.
pub fn to_markup(content: &ContentModel) -> String {
    let mut output = String::new();
    let mut in_list = false;
    for block in content.blocks() {
        let list_item = block.as_paragraph().is_some_and(|p| p.style.list_item);
        if list_item != in_list {
            output.push_str(if list_item { "<ul>\n" } else { "</ul>\n" });
            in_list = list_item;
        }
        render_block(&mut output, block);
    }
    if in_list {
        output.push_str("</ul>\n");
    }
    output
}

fn render_block(output: &mut String, block: &Block) {
    match block {
        Block::Paragraph(p) => render_paragraph(output, p),
        Block::LineBreak => output.push_str("<p><br></p>\n"),
    }
}

fn render_paragraph(output: &mut String, para: &Paragraph) {
    let tag = if para.style.list_item { "li" } else { "p" };
    if para.style.alignment == Alignment::Left {
        output.push_str(&format!("<{}>", tag));
    } else {
        output.push_str(&format!(
            "<{} style=\"text-align: {};\">",
            tag,
            para.style.alignment.css()
        ));
    }
    for item in &para.content {
        match item {
            InlineContent::Text(run) => render_text_run(output, run),
            InlineContent::Image(node) => render_image(output, node),
        }
    }
    output.push_str(&format!("</{}>\n", tag));
}

fn render_text_run(output: &mut String, run: &TextRun) {
    let mut result = escape_html(&run.text);

    // Innermost first
    if run.marks.bold {
        result = format!("<b>{}</b>", result);
    }
    if run.marks.italic {
        result = format!("<i>{}</i>", result);
    }
    if run.marks.underline {
        result = format!("<u>{}</u>", result);
    }
    if run.marks.highlight {
        result = format!(
            "<span style=\"background-color: {};\">{}</span>",
            HIGHLIGHT_COLOR, result
        );
    }
    if run.marks.redact {
        result = format!(
            "<span style=\"background-color: black; color: black;\">{}</span>",
            result
        );
    }
    if let Some(url) = &run.link {
        result = format!("<a href=\"{}\">{}</a>", escape_html(url), result);
    }

    output.push_str(&result);
}

fn render_image(output: &mut String, node: &ImageNode) {
    let style = match (node.kind, node.width_percent) {
        (ImageKind::Signature, None) => format!(
            "max-height: {}px; vertical-align: middle; display: inline-block; margin: 0 4px;",
            SIGNATURE_HEIGHT_PX
        ),
        (ImageKind::Signature, Some(pct)) => format!(
            "width: {}%; height: auto; vertical-align: middle; display: inline-block; margin: 0 4px;",
            pct
        ),
        (ImageKind::Ordinary, None) => "max-width:100%; height:auto; margin:10px 0".to_string(),
        (ImageKind::Ordinary, Some(pct)) => {
            format!("width: {}%; height:auto; margin:10px 0", pct)
        }
    };
    output.push_str(&format!(
        "<img src=\"{}\" alt=\"{}\" style=\"{}\">",
        node.source.to_data_uri(),
        node.kind.alt_text(),
        style
    ));
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}
