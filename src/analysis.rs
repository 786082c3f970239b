//! # Ingredient Analysis Module
//!
//! The safety-check path: clean the extracted label text, isolate and parse
//! the ingredients section, and look for ingredients the skin type should
//! avoid. This path never touches the recommendation index.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::OcrError;
use crate::harmful_matcher::{is_safe, HarmfulIngredientMatcher, HarmfulMatch};
use crate::ingredient_parser::{parse_ingredients, IngredientList};
use crate::ocr::{validate_image, TextExtractor};
use crate::ocr_config::OcrConfig;
use crate::skin_profile::SkinType;
use crate::text_normalizer::{clean, extract_ingredients_section, IngredientsSection};

/// Safety verdict for a scanned product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientAnalysis {
    pub skin_type: SkinType,
    /// Whether the label had an ingredients section at all
    pub ingredients_found: bool,
    pub ingredients: IngredientList,
    pub harmful: Vec<HarmfulMatch>,
    pub is_safe: bool,
    pub total_harmful_ingredients: usize,
}

/// Outcome of scanning a product photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Analyzed(IngredientAnalysis),
    /// The photo has no readable text
    NoText,
}

/// Analyze raw label text for a skin type
///
/// Absent text and labels without an ingredients marker yield an empty,
/// safe analysis with `ingredients_found == false`.
///
/// ```rust
/// use skinsight::analysis::analyze_ingredients;
/// use skinsight::harmful_matcher::HarmfulIngredientMatcher;
/// use skinsight::skin_profile::SkinType;
///
/// let matcher = HarmfulIngredientMatcher::with_embedded_details();
/// let analysis = analyze_ingredients(
///     Some("**Ingredients**: Aqua, Mineral Oil, Glycerin"),
///     SkinType::Oily,
///     &matcher,
/// );
/// assert_eq!(analysis.ingredients, vec!["Aqua", "Mineral Oil", "Glycerin"]);
/// assert!(!analysis.is_safe);
/// ```
pub fn analyze_ingredients(
    raw_text: Option<&str>,
    skin_type: SkinType,
    matcher: &HarmfulIngredientMatcher,
) -> IngredientAnalysis {
    let cleaned = clean(raw_text);
    let section = extract_ingredients_section(&cleaned);
    let ingredients = parse_ingredients(&section);

    let harmful = match &section {
        IngredientsSection::Found(text) => matcher.find_harmful_for(text, skin_type),
        IngredientsSection::NotFound => {
            warn!(skin_type = %skin_type, "No ingredients section in label text");
            Vec::new()
        }
    };

    info!(
        skin_type = %skin_type,
        ingredients = ingredients.len(),
        harmful = harmful.len(),
        "Analyzed ingredients"
    );

    IngredientAnalysis {
        skin_type,
        ingredients_found: section.is_found(),
        ingredients,
        is_safe: is_safe(&harmful),
        total_harmful_ingredients: harmful.len(),
        harmful,
    }
}

/// Extract the text of a product photo and analyze it
pub async fn scan_product_image(
    image: &[u8],
    extractor: &dyn TextExtractor,
    skin_type: SkinType,
    matcher: &HarmfulIngredientMatcher,
    config: &OcrConfig,
) -> Result<ScanOutcome, OcrError> {
    let format = match validate_image(image, config) {
        Ok(format) => format,
        Err(e) => {
            warn!(error = %e, "Rejected product image");
            return Err(e);
        }
    };

    match extractor.extract_text_from_image(image, format).await? {
        Some(text) if !text.trim().is_empty() => Ok(ScanOutcome::Analyzed(analyze_ingredients(
            Some(&text),
            skin_type,
            matcher,
        ))),
        _ => {
            info!("No text found in product image");
            Ok(ScanOutcome::NoText)
        }
    }
}
