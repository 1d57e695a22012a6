//! Image preparation for embedding as PDF XObjects.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::Result;
use crate::model::{Block, ContentModel, ImageId, InlineContent};

/// Points per CSS pixel (96 dpi).
pub const PX_TO_PT: f32 = 0.75;

/// A decoded image, flattened onto white and stored as compressed RGB.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Flate-compressed 8-bit RGB samples
    pub data: Vec<u8>,
}

impl PreparedImage {
    /// Decode an encoded image.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for px in rgba.pixels() {
            let alpha = px[3] as u32;
            for channel in &px.0[..3] {
                // composite over white
                let c = (*channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
                rgb.push(c as u8);
            }
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&rgb)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Natural size in points.
    pub fn natural_size(&self) -> (f32, f32) {
        (
            self.width as f32 * PX_TO_PT,
            self.height as f32 * PX_TO_PT,
        )
    }

    /// Height divided by width.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            1.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}

/// Decode every image in the model, keyed by node id.
///
/// Fails on the first image that cannot be decoded.
pub fn prepare_all(content: &ContentModel) -> Result<HashMap<ImageId, PreparedImage>> {
    let mut prepared = HashMap::new();
    for block in content.blocks() {
        let Block::Paragraph(p) = block else { continue };
        for item in &p.content {
            if let InlineContent::Image(node) = item {
                if !prepared.contains_key(&node.id) {
                    log::debug!("decoding {} ({})", node.id, node.source.mime_type());
                    prepared.insert(node.id, PreparedImage::decode(node.source.data())?);
                }
            }
        }
    }
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageOutputFormat, Rgba};
    use std::io::Cursor;

    fn png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn inflate(data: &[u8]) -> Vec<u8> {
        use flate2::read::ZlibDecoder;
        use std::io::Read;
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_decode_png() {
        let prepared = PreparedImage::decode(&png(4, 2, [255, 0, 0, 255])).unwrap();
        assert_eq!((prepared.width, prepared.height), (4, 2));
        assert_eq!(prepared.natural_size(), (3.0, 1.5));
        assert_eq!(prepared.aspect(), 0.5);

        let rgb = inflate(&prepared.data);
        assert_eq!(rgb.len(), 4 * 2 * 3);
        assert_eq!(&rgb[..3], &[255, 0, 0]);
    }

    #[test]
    fn test_transparency_flattened_to_white() {
        let prepared = PreparedImage::decode(&png(1, 1, [0, 0, 0, 0])).unwrap();
        assert_eq!(inflate(&prepared.data), vec![255, 255, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(PreparedImage::decode(&[0x89, 0x50, 0x4E, 0x47, 0, 0, 0, 0]).is_err());
    }
}
