//! Standard Helvetica fonts: metrics and WinAnsi encoding.

use unicode_normalization::char::decompose_canonical;

use crate::model::Marks;

/// Byte used in place of characters WinAnsi cannot encode.
pub const SUBSTITUTE: u8 = b'?';

/// Ascender of the Helvetica family, in 1/1000 em.
pub const ASCENT: f32 = 718.0;

/// Descender of the Helvetica family, in 1/1000 em (negative).
pub const DESCENT: f32 = -207.0;

/// The four faces of the Helvetica family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontStyle {
    /// Helvetica
    Regular,
    /// Helvetica-Bold
    Bold,
    /// Helvetica-Oblique
    Oblique,
    /// Helvetica-BoldOblique
    BoldOblique,
}

impl FontStyle {
    /// All faces, in resource order.
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Regular,
        FontStyle::Bold,
        FontStyle::Oblique,
        FontStyle::BoldOblique,
    ];

    /// Face for a set of marks.
    pub fn for_marks(marks: &Marks) -> Self {
        match (marks.bold, marks.italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Oblique,
            (true, true) => FontStyle::BoldOblique,
        }
    }

    /// PostScript name of the standard font.
    pub fn base_font(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Oblique => "Helvetica-Oblique",
            FontStyle::BoldOblique => "Helvetica-BoldOblique",
        }
    }

    /// Name of the font in the page resource dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Oblique => "F3",
            FontStyle::BoldOblique => "F4",
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldOblique)
    }
}

// Widths of ASCII 0x20..=0x7E in 1/1000 em (Adobe AFM). Oblique faces share
// the widths of their upright counterparts.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// WinAnsi code points 0x80..=0x9F that differ from Latin-1.
const WIN_ANSI_SPECIALS: [(char, u8, u16); 27] = [
    ('\u{20AC}', 0x80, 556),
    ('\u{201A}', 0x82, 222),
    ('\u{0192}', 0x83, 556),
    ('\u{201E}', 0x84, 333),
    ('\u{2026}', 0x85, 1000),
    ('\u{2020}', 0x86, 556),
    ('\u{2021}', 0x87, 556),
    ('\u{02C6}', 0x88, 333),
    ('\u{2030}', 0x89, 1000),
    ('\u{0160}', 0x8A, 667),
    ('\u{2039}', 0x8B, 333),
    ('\u{0152}', 0x8C, 1000),
    ('\u{017D}', 0x8E, 611),
    ('\u{2018}', 0x91, 222),
    ('\u{2019}', 0x92, 222),
    ('\u{201C}', 0x93, 333),
    ('\u{201D}', 0x94, 333),
    ('\u{2022}', 0x95, 350),
    ('\u{2013}', 0x96, 556),
    ('\u{2014}', 0x97, 1000),
    ('\u{02DC}', 0x98, 333),
    ('\u{2122}', 0x99, 1000),
    ('\u{0161}', 0x9A, 500),
    ('\u{203A}', 0x9B, 333),
    ('\u{0153}', 0x9C, 944),
    ('\u{017E}', 0x9E, 500),
    ('\u{0178}', 0x9F, 667),
];

/// Map a character to its WinAnsi byte.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(c as u32 as u8),
        _ => WIN_ANSI_SPECIALS
            .iter()
            .find(|(ch, _, _)| *ch == c)
            .map(|(_, byte, _)| *byte),
    }
}

/// Encode text for a standard font.
///
/// Tabs become spaces; characters outside WinAnsi become [`SUBSTITUTE`].
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            c => win_ansi_byte(c).unwrap_or(SUBSTITUTE),
        })
        .collect()
}

/// Number of characters [`encode`] would replace. Line breaks are not
/// counted.
pub fn unencodable_count(text: &str) -> usize {
    text.chars()
        .filter(|&c| !matches!(c, '\t' | '\n' | '\r') && win_ansi_byte(c).is_none())
        .count()
}

/// Width of one WinAnsi byte in 1/1000 em.
pub fn byte_width(byte: u8, style: FontStyle) -> f32 {
    let table = if style.is_bold() {
        &HELVETICA_BOLD_WIDTHS
    } else {
        &HELVETICA_WIDTHS
    };
    match byte {
        0x20..=0x7E => table[(byte - 0x20) as usize] as f32,
        0x80..=0x9F => WIN_ANSI_SPECIALS
            .iter()
            .find(|(_, b, _)| *b == byte)
            .map(|(_, _, w)| *w as f32)
            .unwrap_or(500.0),
        0xA0 => table[0] as f32,
        _ => latin1_width(byte as char, table),
    }
}

/// Accented Latin-1 letters take the width of their base letter.
fn latin1_width(c: char, table: &[u16; 95]) -> f32 {
    let mut base = None;
    decompose_canonical(c, |d| {
        if base.is_none() {
            base = Some(d);
        }
    });
    match base {
        Some(b) if b != c && (b as u32) >= 0x20 && (b as u32) <= 0x7E => {
            table[(b as u32 - 0x20) as usize] as f32
        }
        _ => 556.0,
    }
}

/// Width of encoded bytes in points.
pub fn encoded_width(bytes: &[u8], style: FontStyle, size: f32) -> f32 {
    bytes.iter().map(|&b| byte_width(b, style)).sum::<f32>() * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_for_marks() {
        let mut marks = Marks::default();
        assert_eq!(FontStyle::for_marks(&marks), FontStyle::Regular);
        marks.bold = true;
        marks.italic = true;
        assert_eq!(FontStyle::for_marks(&marks).base_font(), "Helvetica-BoldOblique");
    }

    #[test]
    fn test_encode_latin() {
        assert_eq!(encode("Café"), vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(encode("\u{20AC}5"), vec![0x80, b'5']);
        assert_eq!(encode("a\tb"), b"a b".to_vec());
    }

    #[test]
    fn test_encode_unencodable() {
        assert_eq!(encode("日本"), b"??".to_vec());
        assert_eq!(unencodable_count("\u{2192} done\n\u{2713}"), 2);
        assert_eq!(unencodable_count("Café\t\r\n"), 0);
    }

    #[test]
    fn test_widths() {
        assert_eq!(byte_width(b' ', FontStyle::Regular), 278.0);
        assert_eq!(byte_width(b'W', FontStyle::Regular), 944.0);
        assert_eq!(byte_width(b'b', FontStyle::Bold), 611.0);
        assert_eq!(byte_width(b'b', FontStyle::Oblique), 556.0);
        // é takes the width of e
        assert_eq!(byte_width(0xE9, FontStyle::Regular), 556.0);
        assert!((encoded_width(b"Hello", FontStyle::Regular, 10.0) - 22.78).abs() < 0.01);
    }
}
