//! PDF object assembly with lopdf.
//!
//! Layout output is drawn in a second pass once the page count is known, so
//! decoration can print "Page i of N".

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::Result;
use crate::export::PageGeometry;
use crate::model::{ImageId, PageDecoration};

use super::fonts::{self, FontStyle, ASCENT, DESCENT};
use super::images::PreparedImage;
use super::layout::{PageLayout, TextSpan};

const TEXT_GRAY: f32 = 0.235;
const LINK_RGB: [f32; 3] = [0.0, 0.0, 0.8];
const HIGHLIGHT_RGB: [f32; 3] = [0.996, 0.941, 0.541];
const DECORATION_GRAY: f32 = 0.4;
const DECORATION_SIZE: f32 = 9.0;
const WATERMARK_SIZE: f32 = 60.0;
const WATERMARK_GRAY: f32 = 0.5;
const WATERMARK_OPACITY: f32 = 0.15;

/// Document-level settings for the writer.
#[derive(Debug, Clone, Copy)]
pub struct WriteSettings<'a> {
    pub geometry: &'a PageGeometry,
    pub decoration: Option<&'a PageDecoration>,
    pub title: Option<&'a str>,
}

/// Serialize laid-out pages into a PDF file.
pub fn write_pdf(
    pages: &[PageLayout],
    images: &HashMap<ImageId, PreparedImage>,
    settings: WriteSettings<'_>,
) -> Result<Vec<u8>> {
    let g = settings.geometry;
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font_dict = Dictionary::new();
    for style in FontStyle::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => style.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(style.resource_name(), font_id);
    }

    let mut xobjects = Dictionary::new();
    let mut ids: Vec<&ImageId> = images.keys().collect();
    ids.sort();
    for id in ids {
        let image = &images[id];
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            image.data.clone(),
        );
        xobjects.set(image_name(*id), doc.add_object(stream));
    }

    let gs_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => WATERMARK_OPACITY,
        "CA" => WATERMARK_OPACITY,
    });

    let resources_id = doc.add_object(dictionary! {
        "Font" => font_dict,
        "XObject" => xobjects,
        "ExtGState" => dictionary! { "GS1" => gs_id },
    });

    let total = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (index, page) in pages.iter().enumerate() {
        let mut ops = draw_page(page);
        if let Some(decoration) = settings.decoration {
            ops.extend(draw_decoration(decoration, g, index + 1, total));
        }

        let content = Content { operations: ops }.encode()?;
        let content_id = doc.add_object(Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            deflate(&content)?,
        ));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        let annots = link_annotations(&mut doc, page);
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), g.width.into(), g.height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = dictionary! {
        "Producer" => Object::string_literal(format!("smartpdf {}", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(
            chrono::Utc::now().format("D:%Y%m%d%H%M%S+00'00'").to_string(),
        ),
    };
    if let Some(title) = settings.title {
        info.set("Title", Object::string_literal(fonts::encode(title)));
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    log::debug!("wrote {} page(s), {} bytes", total, buffer.len());
    Ok(buffer)
}

fn image_name(id: ImageId) -> String {
    format!("Im{}", id.0)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn op(name: &str, operands: Vec<Object>) -> Operation {
    Operation::new(name, operands)
}

fn literal(bytes: Vec<u8>) -> Object {
    Object::String(bytes, StringFormat::Literal)
}

fn rect(x: f32, y: f32, w: f32, h: f32) -> Operation {
    op("re", vec![x.into(), y.into(), w.into(), h.into()])
}

fn fill_rgb(rgb: [f32; 3]) -> Operation {
    op("rg", vec![rgb[0].into(), rgb[1].into(), rgb[2].into()])
}

fn stroke_rgb(rgb: [f32; 3]) -> Operation {
    op("RG", vec![rgb[0].into(), rgb[1].into(), rgb[2].into()])
}

/// Vertical extent of a span's glyph box: (bottom, height).
fn glyph_box(span: &TextSpan) -> (f32, f32) {
    let bottom = span.baseline + DESCENT * span.size / 1000.0;
    (bottom, (ASCENT - DESCENT) * span.size / 1000.0)
}

fn text_rgb(span: &TextSpan) -> [f32; 3] {
    if span.marks.redact {
        [0.0; 3]
    } else if span.link.is_some() {
        LINK_RGB
    } else {
        [TEXT_GRAY; 3]
    }
}

fn show_text(font: FontStyle, size: f32, x: f32, y: f32, bytes: Vec<u8>) -> Vec<Operation> {
    vec![
        op("BT", vec![]),
        op("Tf", vec![font.resource_name().into(), size.into()]),
        op("Td", vec![x.into(), y.into()]),
        op("Tj", vec![literal(bytes)]),
        op("ET", vec![]),
    ]
}

fn draw_page(page: &PageLayout) -> Vec<Operation> {
    let mut ops = Vec::new();

    for span in page.spans.iter().filter(|s| s.marks.highlight) {
        let (bottom, height) = glyph_box(span);
        ops.push(op("q", vec![]));
        ops.push(fill_rgb(HIGHLIGHT_RGB));
        ops.push(rect(span.x, bottom, span.width, height));
        ops.push(op("f", vec![]));
        ops.push(op("Q", vec![]));
    }

    for image in &page.images {
        ops.push(op("q", vec![]));
        ops.push(op(
            "cm",
            vec![
                image.width.into(),
                0.into(),
                0.into(),
                image.height.into(),
                image.x.into(),
                image.y.into(),
            ],
        ));
        ops.push(op("Do", vec![Object::Name(image_name(image.id).into_bytes())]));
        ops.push(op("Q", vec![]));
    }

    for span in &page.spans {
        ops.push(fill_rgb(text_rgb(span)));
        ops.extend(show_text(
            span.font,
            span.size,
            span.x,
            span.baseline,
            span.bytes.clone(),
        ));
    }

    for span in page
        .spans
        .iter()
        .filter(|s| s.marks.underline || s.link.is_some())
    {
        let y = span.baseline - span.size * 0.12;
        ops.push(op("q", vec![]));
        ops.push(stroke_rgb(text_rgb(span)));
        ops.push(op("w", vec![(span.size * 0.06).into()]));
        ops.push(op("m", vec![span.x.into(), y.into()]));
        ops.push(op("l", vec![(span.x + span.width).into(), y.into()]));
        ops.push(op("S", vec![]));
        ops.push(op("Q", vec![]));
    }

    for span in page.spans.iter().filter(|s| s.marks.redact) {
        let (bottom, height) = glyph_box(span);
        ops.push(op("q", vec![]));
        ops.push(fill_rgb([0.0; 3]));
        ops.push(rect(span.x, bottom, span.width, height));
        ops.push(op("f", vec![]));
        ops.push(op("Q", vec![]));
    }

    ops
}

fn link_annotations(doc: &mut Document, page: &PageLayout) -> Vec<Object> {
    page.spans
        .iter()
        .filter_map(|span| {
            let url = span.link.as_ref()?;
            let (bottom, height) = glyph_box(span);
            let id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![
                    span.x.into(),
                    bottom.into(),
                    (span.x + span.width).into(),
                    (bottom + height).into(),
                ],
                "Border" => vec![0.into(), 0.into(), 0.into()],
                "A" => dictionary! {
                    "S" => "URI",
                    "URI" => Object::string_literal(url.as_bytes().to_vec()),
                },
            });
            Some(id.into())
        })
        .collect()
}

/// Header, footer, page number and watermark for one page.
fn draw_decoration(
    decoration: &PageDecoration,
    g: &PageGeometry,
    page: usize,
    total: usize,
) -> Vec<Operation> {
    let mut ops = Vec::new();
    let font = FontStyle::Regular;

    let centered = |text: &str, y: f32| -> Vec<Operation> {
        let bytes = fonts::encode(text);
        let width = fonts::encoded_width(&bytes, font, DECORATION_SIZE);
        let mut ops = vec![op("g", vec![DECORATION_GRAY.into()])];
        ops.extend(show_text(font, DECORATION_SIZE, (g.width - width) / 2.0, y, bytes));
        ops
    };

    if let Some(header) = decoration.header_text() {
        ops.extend(centered(header, g.height - g.header_offset));
    }
    if let Some(footer) = decoration.footer_text() {
        ops.extend(centered(footer, g.footer_offset));
    }
    if decoration.show_page_numbers {
        let bytes = fonts::encode(&format!("Page {} of {}", page, total));
        let width = fonts::encoded_width(&bytes, font, DECORATION_SIZE);
        ops.push(op("g", vec![DECORATION_GRAY.into()]));
        ops.extend(show_text(
            font,
            DECORATION_SIZE,
            g.width - g.margin_x - width,
            g.footer_offset,
            bytes,
        ));
    }
    if let Some(watermark) = decoration.watermark_text() {
        ops.extend(draw_watermark(watermark, g));
    }
    ops
}

/// Large translucent text rotated 45 degrees around the page centre.
fn draw_watermark(text: &str, g: &PageGeometry) -> Vec<Operation> {
    let font = FontStyle::Bold;
    let bytes = fonts::encode(text);
    let diagonal = (g.width * g.width + g.height * g.height).sqrt();

    let mut size = WATERMARK_SIZE;
    let natural = fonts::encoded_width(&bytes, font, size);
    if natural > diagonal * 0.8 {
        size *= diagonal * 0.8 / natural;
    }
    let width = fonts::encoded_width(&bytes, font, size);

    let (sin, cos) = std::f32::consts::FRAC_PI_4.sin_cos();
    vec![
        op("q", vec![]),
        op("gs", vec!["GS1".into()]),
        op("g", vec![WATERMARK_GRAY.into()]),
        op("BT", vec![]),
        op("Tf", vec![font.resource_name().into(), size.into()]),
        op(
            "Tm",
            vec![
                cos.into(),
                sin.into(),
                (-sin).into(),
                cos.into(),
                (g.width / 2.0).into(),
                (g.height / 2.0).into(),
            ],
        ),
        op("Td", vec![(-width / 2.0).into(), (-size * 0.35).into()]),
        op("Tj", vec![literal(bytes)]),
        op("ET", vec![]),
        op("Q", vec![]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operators(ops: &[Operation]) -> Vec<&str> {
        ops.iter().map(|o| o.operator.as_str()).collect()
    }

    #[test]
    fn test_decoration_only_when_set() {
        let g = PageGeometry::a4();
        let ops = draw_decoration(&PageDecoration::default(), &g, 1, 1);
        assert!(ops.is_empty());

        let decoration = PageDecoration::new().with_watermark("DRAFT");
        let ops = draw_decoration(&decoration, &g, 1, 1);
        let names = operators(&ops);
        assert!(names.contains(&"gs"));
        assert!(names.contains(&"Tm"));
    }

    #[test]
    fn test_watermark_fits_diagonal() {
        let g = PageGeometry::a4();
        let ops = draw_watermark(&"W".repeat(200), &g);
        let tf = ops.iter().find(|o| o.operator == "Tf").unwrap();
        let size = tf.operands[1].as_float().unwrap();
        assert!(size < WATERMARK_SIZE);
    }

    #[test]
    fn test_unencodable_header_is_substituted() {
        let g = PageGeometry::a4();
        let decoration = PageDecoration::new().with_header("機密 draft");
        let ops = draw_decoration(&decoration, &g, 1, 1);
        let tj = ops.iter().find(|o| o.operator == "Tj").unwrap();
        assert_eq!(tj.operands[0].as_str().unwrap(), b"?? draft");
    }
}
