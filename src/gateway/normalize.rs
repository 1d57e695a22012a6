//! Cleanup of text returned by the AI service.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Options for service output normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Convert CRLF and lone CR line endings to LF
    pub normalize_line_endings: bool,

    /// Replace typographic ligatures (fi, fl, ...) with plain letters
    pub fix_ligatures: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Unwrap a single surrounding markdown code fence
    pub strip_code_fence: bool,

    /// Strip trailing whitespace on each line
    pub trim_line_ends: bool,

    /// Drop leading and trailing newlines
    pub trim_outer_newlines: bool,
}

impl NormalizeOptions {
    /// Options for free text produced by a transformation.
    ///
    /// Only NFC and line endings are touched, so the answer segments into
    /// blocks exactly like freshly extracted text.
    pub fn text() -> Self {
        Self {
            normalize_unicode: true,
            normalize_line_endings: true,
            fix_ligatures: false,
            remove_replacement_char: false,
            strip_code_fence: false,
            trim_line_ends: false,
            trim_outer_newlines: false,
        }
    }

    /// Text options plus ligature, U+FFFD and whitespace cleanup.
    pub fn thorough() -> Self {
        Self {
            fix_ligatures: true,
            remove_replacement_char: true,
            trim_line_ends: true,
            trim_outer_newlines: true,
            ..Self::text()
        }
    }

    /// Options for JSON answers, which models sometimes wrap in a fence.
    pub fn json() -> Self {
        Self {
            normalize_unicode: false,
            normalize_line_endings: true,
            fix_ligatures: false,
            remove_replacement_char: false,
            strip_code_fence: true,
            trim_line_ends: false,
            trim_outer_newlines: true,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::text()
    }
}

/// Normalization pipeline for service output.
pub struct Normalizer {
    options: NormalizeOptions,
    fence_regex: Regex,
    ligature_map: Vec<(&'static str, &'static str)>,
}

impl Normalizer {
    /// Create a pipeline with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            fence_regex: Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\n(.*?)\n?[ \t]*```\s*$")
                .unwrap(),
            ligature_map: vec![
                ("\u{FB00}", "ff"),
                ("\u{FB01}", "fi"),
                ("\u{FB02}", "fl"),
                ("\u{FB03}", "ffi"),
                ("\u{FB04}", "ffl"),
            ],
        }
    }

    /// Pipeline for transformation output.
    pub fn text() -> Self {
        Self::new(NormalizeOptions::text())
    }

    /// Pipeline for JSON answers.
    pub fn json() -> Self {
        Self::new(NormalizeOptions::json())
    }

    /// Run the pipeline.
    pub fn process(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.options.normalize_line_endings {
            result = result.replace("\r\n", "\n").replace('\r', "\n");
        }

        if self.options.strip_code_fence {
            if let Some(inner) = self.fence_regex.captures(&result).and_then(|c| c.get(1)) {
                result = inner.as_str().to_string();
            }
        }

        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        if self.options.fix_ligatures {
            for (ligature, replacement) in &self.ligature_map {
                result = result.replace(ligature, replacement);
            }
        }

        if self.options.remove_replacement_char {
            result = result.replace('\u{FFFD}', "");
        }

        if self.options.trim_line_ends {
            result = result
                .split('\n')
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n");
        }

        if self.options.trim_outer_newlines {
            result = result.trim_matches('\n').to_string();
        }

        result
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::text()
    }
}

/// Normalize transformation output with default options.
pub fn normalize_text(text: &str) -> String {
    Normalizer::text().process(text)
}

/// Normalize a JSON answer with default options.
pub fn normalize_json(text: &str) -> String {
    Normalizer::json().process(text)
}
