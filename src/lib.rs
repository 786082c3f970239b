//! # SkinSight
//!
//! Checks a photographed cosmetic label against a skin type and recommends
//! similar products that are safe for it.
//!
//! ## Pipeline
//!
//! - [`text_normalizer`] cleans the extracted label text and isolates the ingredients section
//! - [`ingredient_parser`] splits it into canonical ingredient names
//! - [`harmful_matcher`] finds avoid-listed ingredients for the [`skin_profile::SkinType`]
//! - [`similarity_index`] ranks corpus products by TF-IDF cosine similarity
//! - [`recommendation`] filters the ranking down to safe, distinct products

pub mod analysis;
pub mod catalog;
pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod harmful_matcher;
pub mod ingredient_details;
pub mod ingredient_parser;
pub mod normalizer_patterns;
pub mod ocr;
pub mod ocr_config;
pub mod product;
pub mod recommendation;
pub mod similarity_index;
pub mod skin_profile;
pub mod text_normalizer;
