//! # Text Normalizer Module
//!
//! Cleans free-form text extracted from a photographed product label and
//! isolates the ingredients section from the surrounding label copy.
//!
//! ## Features
//!
//! - Strips markdown emphasis and stray bullet asterisks left by the vision model
//! - Collapses newlines and whitespace runs into single spaces
//! - Locates the section after "Ingredients", "Bahan-bahan" or "Bahan"
//! - Normalizes ingredient strings for the similarity index
//!
//! Every function here is total: absent or odd input yields a placeholder or
//! the [`IngredientsSection::NotFound`] sentinel, never an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

use crate::normalizer_patterns::{
    ANY_WHITESPACE_REGEX, BOLD_MARKDOWN_REGEX, INDEX_NOISE_REGEX, PARAGRAPH_BREAK_REGEX,
    REPEATED_WHITESPACE_REGEX, SECTION_MARKER_REGEX, STRAY_ASTERISK_REGEX,
};

/// Placeholder returned by [`clean`] when there is no text at all
pub const DESCRIPTION_UNAVAILABLE: &str = "description unavailable";

/// Textual rendering of [`IngredientsSection::NotFound`], as stored in the product corpus
pub const NOT_FOUND_PHRASE: &str = "Ingredients tidak ditemukan.";

/// The part of a label that lists ingredients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngredientsSection {
    /// Text following the marker word, trimmed
    Found(String),
    /// No marker word in the text
    NotFound,
}

impl IngredientsSection {
    /// Whether a marker word was found
    pub fn is_found(&self) -> bool {
        matches!(self, IngredientsSection::Found(_))
    }

    /// The section text, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            IngredientsSection::Found(text) => Some(text),
            IngredientsSection::NotFound => None,
        }
    }
}

impl fmt::Display for IngredientsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngredientsSection::Found(text) => write!(f, "{text}"),
            IngredientsSection::NotFound => write!(f, "{NOT_FOUND_PHRASE}"),
        }
    }
}

/// Clean raw text returned by OCR or a vision model
///
/// Removes `**bold**` wrappers, turns blank lines into paragraph breaks and
/// single newlines into spaces, drops stray `*`, collapses whitespace runs
/// and trims. Applying it to already clean text returns the text unchanged.
///
/// # Examples
///
/// ```rust
/// use skinsight::text_normalizer::clean;
///
/// assert_eq!(clean(Some("**Ingredients**:\nWater,\n\nGlycerin")), "Ingredients: Water, Glycerin");
/// assert_eq!(clean(None), "description unavailable");
/// ```
pub fn clean(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        debug!("No text to clean, returning placeholder");
        return DESCRIPTION_UNAVAILABLE.to_string();
    };

    let cleaned = BOLD_MARKDOWN_REGEX.replace_all(raw, "$1");
    let cleaned = PARAGRAPH_BREAK_REGEX.replace_all(&cleaned, "\n\n");
    let cleaned = cleaned.replace('\n', " ");
    let cleaned = STRAY_ASTERISK_REGEX.replace_all(&cleaned, "");
    let cleaned = REPEATED_WHITESPACE_REGEX.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim().to_string();

    trace!(
        input_chars = raw.len(),
        output_chars = cleaned.len(),
        "Cleaned extracted text"
    );
    cleaned
}

/// Isolate the ingredients section of a label
///
/// Searches case-insensitively for the first "Ingredients", "Bahan-bahan" or
/// "Bahan" marker, optionally followed by a colon, and returns everything
/// after it up to the end of the text.
///
/// # Examples
///
/// ```rust
/// use skinsight::text_normalizer::{extract_ingredients_section, IngredientsSection};
///
/// assert_eq!(
///     extract_ingredients_section("Product X. Ingredients: Water, Glycerin."),
///     IngredientsSection::Found("Water, Glycerin.".to_string())
/// );
/// assert_eq!(extract_ingredients_section("Net 30 ml"), IngredientsSection::NotFound);
/// ```
pub fn extract_ingredients_section(text: &str) -> IngredientsSection {
    match SECTION_MARKER_REGEX
        .captures(text)
        .and_then(|captures| captures.get(1))
    {
        Some(section) => {
            let section = section.as_str().trim().to_string();
            debug!(section_chars = section.len(), "Found ingredients section");
            IngredientsSection::Found(section)
        }
        None => {
            debug!("No ingredients marker found in text");
            IngredientsSection::NotFound
        }
    }
}

/// Normalize an ingredients string for vectorization
///
/// Lowercases, replaces every character other than word characters,
/// whitespace, `,`, `.` and `-` by a space and collapses whitespace. Returns
/// an empty string for blank input and for the not-found phrase.
pub fn normalize_ingredients_text(ingredients: &str) -> String {
    let lowered = ingredients.to_lowercase();
    let stripped = INDEX_NOISE_REGEX.replace_all(&lowered, " ");
    let collapsed = ANY_WHITESPACE_REGEX.replace_all(&stripped, " ");
    let normalized = collapsed.trim();

    if normalized.is_empty() || normalized == NOT_FOUND_PHRASE.to_lowercase() {
        return String::new();
    }
    normalized.to_string()
}
