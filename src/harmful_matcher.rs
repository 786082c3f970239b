//! # Harmful Ingredient Matcher
//!
//! Finds avoid-listed ingredients in a piece of ingredients text and attaches
//! a human-readable reason to each match.
//!
//! Matching is a case-insensitive substring test of every avoid-list entry
//! against the whole text, not a token comparison: a short entry can match
//! inside a longer unrelated word. Results follow the avoid-list order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ingredient_details::IngredientDetails;
use crate::skin_profile::SkinType;

/// An avoid-listed ingredient found in a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmfulMatch {
    /// The avoid-list entry that matched
    pub name: String,
    /// Why it is unsuitable for the skin type
    pub reason: String,
}

/// Matcher holding the reason table
#[derive(Debug, Clone, Default)]
pub struct HarmfulIngredientMatcher {
    details: IngredientDetails,
}

impl HarmfulIngredientMatcher {
    /// Create a matcher with the given reason table
    pub fn new(details: IngredientDetails) -> Self {
        Self { details }
    }

    /// Create a matcher with the bundled reason table
    pub fn with_embedded_details() -> Self {
        Self::new(IngredientDetails::embedded())
    }

    /// Find the entries of `avoid_list` contained in `candidate_text`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use skinsight::harmful_matcher::{is_safe, HarmfulIngredientMatcher};
    /// use skinsight::skin_profile::SkinType;
    ///
    /// let matcher = HarmfulIngredientMatcher::with_embedded_details();
    /// let skin_type = SkinType::Oily;
    /// let matches = matcher.find_harmful(
    ///     "contains mineral oil and glycerin",
    ///     skin_type.avoid_list(),
    ///     skin_type,
    /// );
    ///
    /// assert_eq!(matches.len(), 1);
    /// assert_eq!(matches[0].name, "Mineral Oil");
    /// assert!(!is_safe(&matches));
    /// ```
    pub fn find_harmful(
        &self,
        candidate_text: &str,
        avoid_list: &[&str],
        skin_type: SkinType,
    ) -> Vec<HarmfulMatch> {
        let candidate = candidate_text.to_lowercase();

        let matches: Vec<HarmfulMatch> = avoid_list
            .iter()
            .filter(|ingredient| candidate.contains(&ingredient.to_lowercase()))
            .map(|ingredient| HarmfulMatch {
                name: ingredient.to_string(),
                reason: self
                    .details
                    .reason_or_generic(skin_type, ingredient)
                    .to_string(),
            })
            .collect();

        debug!(
            skin_type = %skin_type,
            checked = avoid_list.len(),
            found = matches.len(),
            "Checked text against avoid-list"
        );
        matches
    }

    /// [`find_harmful`](Self::find_harmful) with the skin type's own avoid-list
    pub fn find_harmful_for(&self, candidate_text: &str, skin_type: SkinType) -> Vec<HarmfulMatch> {
        self.find_harmful(candidate_text, skin_type.avoid_list(), skin_type)
    }
}

/// A product is safe when no avoid-listed ingredient matched
pub fn is_safe(matches: &[HarmfulMatch]) -> bool {
    matches.is_empty()
}
