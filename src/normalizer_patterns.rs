//! # Normalizer Patterns Module
//!
//! This module contains the regex patterns used to clean extracted label text,
//! locate the ingredients section and split it into ingredient names.

use lazy_static::lazy_static;
use regex::Regex;

/// Bold markdown wrapper, e.g. `**Ingredients**`
pub const BOLD_MARKDOWN_PATTERN: &str = r"\*\*(.*?)\*\*";

/// Blank line (two newlines with optional whitespace in between)
pub const PARAGRAPH_BREAK_PATTERN: &str = r"\n\s*\n";

/// Marker word that opens the ingredients section (English and Indonesian labels)
pub const SECTION_MARKER_PATTERN: &str =
    r"(?is)(?:Ingredients|Bahan-bahan|Bahan)\s*[:：]?\s*(.+)";

/// Chemical names such as `1,2-hexanediol` whose comma is not a list separator
pub const NUMERIC_COMPOUND_PATTERN: &str = r"(\d+),(\d+)-";

/// Trailing net content annotation such as `30 ml/1.01 fl.oz`
pub const SIZE_ANNOTATION_PATTERN: &str = r"(?i)\s*\d+.*?(?:ml|oz|g|kg|fl\.oz).*$";

/// Characters kept by the index normalization besides word characters and whitespace
pub const INDEX_NOISE_PATTERN: &str = r"[^\w\s,.\-]";

// Compiled once, shared by every normalizer and parser call
lazy_static! {
    pub static ref BOLD_MARKDOWN_REGEX: Regex =
        Regex::new(BOLD_MARKDOWN_PATTERN).expect("Bold markdown pattern should be valid");
    pub static ref PARAGRAPH_BREAK_REGEX: Regex =
        Regex::new(PARAGRAPH_BREAK_PATTERN).expect("Paragraph break pattern should be valid");
    pub static ref STRAY_ASTERISK_REGEX: Regex =
        Regex::new(r"\*+").expect("Asterisk pattern should be valid");
    pub static ref REPEATED_WHITESPACE_REGEX: Regex =
        Regex::new(r"\s{2,}").expect("Whitespace pattern should be valid");
    pub static ref SECTION_MARKER_REGEX: Regex =
        Regex::new(SECTION_MARKER_PATTERN).expect("Section marker pattern should be valid");
    pub static ref NUMERIC_COMPOUND_REGEX: Regex =
        Regex::new(NUMERIC_COMPOUND_PATTERN).expect("Numeric compound pattern should be valid");
    pub static ref SIZE_ANNOTATION_REGEX: Regex =
        Regex::new(SIZE_ANNOTATION_PATTERN).expect("Size annotation pattern should be valid");
    pub static ref INDEX_NOISE_REGEX: Regex =
        Regex::new(INDEX_NOISE_PATTERN).expect("Index noise pattern should be valid");
    pub static ref ANY_WHITESPACE_REGEX: Regex =
        Regex::new(r"\s+").expect("Whitespace pattern should be valid");
}
