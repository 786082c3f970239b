//! # Skin Profile Module
//!
//! Defines the closed set of skin types and the static data attached to each:
//! the avoid-list of ingredients, the key of its reason table and the
//! keyword patterns used to match product descriptions.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Skin type of the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Oily,
    Dry,
    Normal,
    Acne,
    Sensitive,
}

const AVOID_OILY: &[&str] = &[
    "Mineral Oil",
    "Lanolin",
    "Petrolatum",
    "Coconut Oil",
    "Isopropyl Myristate",
    "Isopropyl Palmitate",
    "Myristyl Myristate",
    "Stearic Acid",
    "Beeswax",
    "Silicone",
    "Dimethicone",
    "Sodium Lauryl Sulfate",
    "Alcohol Denat",
    "Fragrance",
    "Cocoa Butter",
    "PEGs (Polyethylene Glycols)",
    "Algae Extract",
    "Butyl Stearate",
    "Oleyl Alcohol",
];

const AVOID_DRY: &[&str] = &[
    "Alcohol Denat",
    "Ethanol",
    "SD Alcohol",
    "Isopropyl Alcohol",
    "Fragrance",
    "Menthol",
    "Camphor",
    "Witch Hazel",
    "Sodium Lauryl Sulfate",
    "Benzoyl Peroxide",
    "Retinol (tanpa moisturizer)",
    "Clay",
    "Charcoal",
    "Salicylic Acid (dalam kadar tinggi)",
    "AHA/BHA dalam konsentrasi tinggi",
];

const AVOID_NORMAL: &[&str] = &[
    "Fragrance",
    "Essential Oils (Tea Tree, Peppermint, Citrus Oils)",
    "Alcohol Denat",
    "Sodium Lauryl Sulfate",
    "Harsh Exfoliants (Walnut Shells, Apricot Scrub)",
    "Synthetic Dyes",
    "Bismuth Oxychloride",
    "Parabens (bagi yang sensitif)",
];

const AVOID_ACNE: &[&str] = &[
    "Coconut Oil",
    "Lanolin",
    "Isopropyl Myristate",
    "Isopropyl Palmitate",
    "Laureth-4",
    "Myristyl Myristate",
    "Butyl Stearate",
    "Algae Extract",
    "Silicone",
    "Fragrance",
    "Alcohol Denat",
    "Sodium Lauryl Sulfate",
    "Benzaldehyde",
    "Cocoa Butter",
    "Ethylhexyl Palmitate",
    "Oxybenzone",
    "Mineral Oil",
    "Petrolatum",
    "D&C Red Dyes",
];

const AVOID_SENSITIVE: &[&str] = &[
    "Fragrance",
    "Essential Oils (Lavender, Citrus, Peppermint, Eucalyptus)",
    "Alcohol Denat",
    "Ethanol",
    "SD Alcohol",
    "Menthol",
    "Camphor",
    "Witch Hazel",
    "Benzoyl Peroxide",
    "Salicylic Acid (konsentrasi tinggi)",
    "Retinol/Retinoids (tanpa pengawasan dokter)",
    "AHA/BHA dalam konsentrasi tinggi",
    "Sodium Lauryl Sulfate",
    "Artificial Colorants",
    "Methylisothiazolinone",
    "Formaldehyde Releasers (DMDM Hydantoin, Quaternium-15)",
    "Phenoxyethanol",
    "Aluminum Compounds",
    "Propylene Glycol",
    "Octinoxate",
    "Oxybenzone",
];

/// Description pattern shared by every skin type
pub const ALL_SKIN_TYPES_PATTERN: &str =
    r"\b(semua\s+jenis\s+kulit|all\s+skin\s+types?|segala\s+jenis\s+kulit|untuk\s+semua\s+kulit)\b";

lazy_static! {
    static ref DESCRIPTION_REGEXES: [Regex; 5] = SkinType::ALL.map(|skin_type| {
        Regex::new(&skin_type.description_pattern())
            .expect("Description pattern should be valid")
    });
}

impl SkinType {
    /// Every skin type, in declaration order
    pub const ALL: [SkinType; 5] = [
        SkinType::Oily,
        SkinType::Dry,
        SkinType::Normal,
        SkinType::Acne,
        SkinType::Sensitive,
    ];

    /// Lowercase name used in requests and description patterns
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Oily => "oily",
            SkinType::Dry => "dry",
            SkinType::Normal => "normal",
            SkinType::Acne => "acne",
            SkinType::Sensitive => "sensitive",
        }
    }

    /// Ingredients this skin type should avoid, in reporting order
    pub fn avoid_list(&self) -> &'static [&'static str] {
        match self {
            SkinType::Oily => AVOID_OILY,
            SkinType::Dry => AVOID_DRY,
            SkinType::Normal => AVOID_NORMAL,
            SkinType::Acne => AVOID_ACNE,
            SkinType::Sensitive => AVOID_SENSITIVE,
        }
    }

    /// Key of this skin type in the ingredient details table
    pub fn details_key(&self) -> &'static str {
        match self {
            SkinType::Acne => "acne_prone",
            other => other.as_str(),
        }
    }

    /// Synonyms that mark a product description as suited to this skin type
    pub fn description_keywords(&self) -> &'static str {
        match self {
            SkinType::Oily => r"\b(berminyak|oily|excess\s+oil|kontrol\s+minyak|oil\s+control)\b",
            SkinType::Dry => r"\b(kering|dry|dehidrasi|dehydrat|moisturiz|pelembab)\b",
            SkinType::Sensitive => r"\b(sensitif|sensitive|gentle|lembut|hypoallergenic)\b",
            SkinType::Acne => r"\b(jerawat|acne|breakout|blemish|anti\s+acne)\b",
            SkinType::Normal => r"\b(normal|seimbang|balanced)\b",
        }
    }

    /// Full case-insensitive description pattern: universal, generic and specific alternatives
    pub fn description_pattern(&self) -> String {
        let name = self.as_str();
        format!(
            r"(?i){ALL_SKIN_TYPES_PATTERN}|\b(untuk\s+kulit\s+{name}|{name}\s+skin|kulit\s+{name})\b|{}",
            self.description_keywords()
        )
    }

    /// Compiled [`description_pattern`](Self::description_pattern)
    pub fn description_regex(&self) -> &'static Regex {
        &DESCRIPTION_REGEXES[*self as usize]
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown skin type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown skin type '{0}', expected one of oily, dry, normal, acne, sensitive")]
pub struct UnknownSkinType(pub String);

impl FromStr for SkinType {
    type Err = UnknownSkinType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oily" => Ok(SkinType::Oily),
            "dry" => Ok(SkinType::Dry),
            "normal" => Ok(SkinType::Normal),
            "acne" | "acne_prone" => Ok(SkinType::Acne),
            "sensitive" => Ok(SkinType::Sensitive),
            _ => Err(UnknownSkinType(s.to_string())),
        }
    }
}
