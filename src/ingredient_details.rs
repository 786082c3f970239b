//! # Ingredient Details Module
//!
//! Reason table explaining why an avoid-listed ingredient is unsuitable for a
//! skin type. The table is keyed by skin type detail key (`oily`, `dry`,
//! `normal`, `acne_prone`, `sensitive`) and then by the exact avoid-list entry.
//! A default table ships with the crate; a JSON file with the same shape can
//! replace it.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::skin_profile::SkinType;

/// Reason used when the table has no entry for an ingredient
pub const GENERIC_REASON: &str =
    "Not suitable for this skin type based on dermatological research.";

const EMBEDDED_DETAILS: &str = include_str!("../data/ingredient_details.json");

/// Per skin type ingredient explanations
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct IngredientDetails {
    tables: HashMap<String, HashMap<String, String>>,
}

impl IngredientDetails {
    /// The table bundled with the crate
    pub fn embedded() -> Self {
        Self::from_json(EMBEDDED_DETAILS).unwrap_or_else(|e| {
            warn!(error = %e, "Bundled ingredient details are invalid, using generic reasons");
            Self::default()
        })
    }

    /// Parse a table from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a table from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ingredient details from {}", path.display()))?;
        let details = Self::from_json(&content)
            .with_context(|| format!("Failed to parse ingredient details in {}", path.display()))?;
        info!(
            path = %path.display(),
            skin_types = details.tables.len(),
            "Loaded ingredient details"
        );
        Ok(details)
    }

    /// Specific reason for an avoid-list entry, if the table has one
    pub fn reason(&self, skin_type: SkinType, ingredient: &str) -> Option<&str> {
        self.tables
            .get(skin_type.details_key())
            .and_then(|table| table.get(ingredient))
            .map(String::as_str)
    }

    /// Reason for an avoid-list entry, falling back to [`GENERIC_REASON`]
    pub fn reason_or_generic(&self, skin_type: SkinType, ingredient: &str) -> &str {
        self.reason(skin_type, ingredient).unwrap_or(GENERIC_REASON)
    }
}
