//! # Ingredient Parser
//!
//! This module splits an ingredients section into canonical ingredient names.
//!
//! ## Features
//!
//! - Splits on commas while protecting numeric compounds (`1,2-hexanediol`)
//! - Title-cases and trims every name, dropping empty tokens
//! - Strips a trailing net content annotation (`30 ml/1.01 fl.oz`) from the last name
//!
//! Only the exact `<digits>,<digits>-` shape is protected; any other comma
//! inside a chemical name is treated as a separator.
//!
//! ## Usage
//!
//! ```rust
//! use skinsight::ingredient_parser::parse_ingredient_text;
//!
//! let parsed = parse_ingredient_text("Water, 1,3-Butylene Glycol, 30 ml");
//! assert_eq!(parsed, vec!["Water", "1.3-Butylene Glycol"]);
//! ```

use tracing::{debug, trace};

use crate::normalizer_patterns::{NUMERIC_COMPOUND_REGEX, SIZE_ANNOTATION_REGEX};
use crate::text_normalizer::IngredientsSection;

/// Ordered ingredient names as printed on the label; duplicates are kept
pub type IngredientList = Vec<String>;

/// Parse an ingredients section; the not-found sentinel yields an empty list
pub fn parse_ingredients(section: &IngredientsSection) -> IngredientList {
    match section {
        IngredientsSection::Found(text) => parse_ingredient_text(text),
        IngredientsSection::NotFound => {
            debug!("Ingredients section not found, nothing to parse");
            Vec::new()
        }
    }
}

/// Parse raw ingredients text into canonical ingredient names
pub fn parse_ingredient_text(text: &str) -> IngredientList {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let protected = NUMERIC_COMPOUND_REGEX.replace_all(text, "${1}.${2}-");

    let mut ingredients: IngredientList = protected
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(title_case)
        .collect();

    if let Some(last) = ingredients.pop() {
        let stripped = SIZE_ANNOTATION_REGEX.replace(&last, "");
        let stripped = stripped.trim();
        if stripped.is_empty() {
            trace!(token = %last, "Dropped trailing size annotation");
        } else {
            if stripped != last {
                trace!(token = %last, kept = %stripped, "Stripped size annotation from last ingredient");
            }
            ingredients.push(stripped.to_string());
        }
    }

    debug!(count = ingredients.len(), "Parsed ingredient list");
    ingredients
}

/// Title-case a name: the first cased letter after any uncased character is
/// uppercased, every other cased letter is lowercased.
///
/// ```rust
/// use skinsight::ingredient_parser::title_case;
///
/// assert_eq!(title_case("1.2-HEXANEDIOL"), "1.2-Hexanediol");
/// assert_eq!(title_case("sodium hyaluronate"), "Sodium Hyaluronate");
/// ```
pub fn title_case(token: &str) -> String {
    let mut result = String::with_capacity(token.len());
    let mut previous_cased = false;

    for c in token.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && previous_cased {
            result.extend(c.to_lowercase());
        } else if cased {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        previous_cased = cased;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_protects_numeric_compounds() {
        assert_eq!(
            parse_ingredient_text("Water, 1,3-Butylene Glycol, 30 ml"),
            vec!["Water", "1.3-Butylene Glycol"]
        );
        assert_eq!(
            parse_ingredient_text("aqua, 1,2-hexanediol, glycerin"),
            vec!["Aqua", "1.2-Hexanediol", "Glycerin"]
        );
    }

    #[test]
    fn test_parse_only_protects_digit_comma_digit_dash() {
        // "2,4" without a trailing dash is split like any other separator
        assert_eq!(
            parse_ingredient_text("Water, Compound 2,4 Dione"),
            vec!["Water", "Compound 2", "4 Dione"]
        );
    }

    #[test]
    fn test_parse_strips_trailing_volume() {
        assert_eq!(
            parse_ingredient_text("Aqua, Niacinamide, Panthenol 30 ml/1.01 fl.oz"),
            vec!["Aqua", "Niacinamide", "Panthenol"]
        );
        assert_eq!(
            parse_ingredient_text("Aqua, Glycerin 100G"),
            vec!["Aqua", "Glycerin"]
        );
    }

    #[test]
    fn test_parse_drops_last_token_when_only_size_remains() {
        assert_eq!(parse_ingredient_text("Aqua, 50 ml"), vec!["Aqua"]);
        assert_eq!(parse_ingredient_text("15 g"), Vec::<String>::new());
    }

    #[test]
    fn test_parse_size_stripping_only_applies_to_last_token() {
        assert_eq!(
            parse_ingredient_text("Peg-40 Castor Oil, Aqua"),
            vec!["Peg-40 Castor Oil", "Aqua"]
        );
    }

    #[test]
    fn test_parse_discards_empty_tokens() {
        assert_eq!(
            parse_ingredient_text("water,, ,glycerin,"),
            vec!["Water", "Glycerin"]
        );
    }

    #[test]
    fn test_parse_keeps_duplicates_in_label_order() {
        assert_eq!(
            parse_ingredient_text("glycerin, water, glycerin"),
            vec!["Glycerin", "Water", "Glycerin"]
        );
    }

    #[test]
    fn test_parse_empty_and_sentinel() {
        assert!(parse_ingredient_text("").is_empty());
        assert!(parse_ingredient_text("   ").is_empty());
        assert!(parse_ingredients(&IngredientsSection::NotFound).is_empty());
        assert_eq!(
            parse_ingredients(&IngredientsSection::Found("water".to_string())),
            vec!["Water"]
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("mineral oil"), "Mineral Oil");
        assert_eq!(title_case("SODIUM LAURYL SULFATE"), "Sodium Lauryl Sulfate");
        assert_eq!(title_case("d&c red 7"), "D&C Red 7");
        assert_eq!(title_case("peg-100 stearate"), "Peg-100 Stearate");
        assert_eq!(title_case("ci77491"), "Ci77491");
        assert_eq!(title_case("o'neil"), "O'Neil");
    }
}
