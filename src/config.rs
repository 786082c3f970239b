//! # Application Configuration
//!
//! Settings read from the environment (and a `.env` file, loaded by the binary).

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::catalog::DEFAULT_PRODUCTS_TABLE;
use crate::ocr_config::DEFAULT_MODEL;
use crate::recommendation::DEFAULT_TOP_K;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// PostgreSQL product store
    pub database_url: Option<String>,
    pub products_table: String,
    /// JSON product file, used instead of the database when set
    pub products_json: Option<PathBuf>,
    /// Replacement for the bundled ingredient reason table
    pub ingredient_details_path: Option<PathBuf>,
    /// Text extraction is disabled without a key
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            products_table: DEFAULT_PRODUCTS_TABLE.to_string(),
            products_json: None,
            ingredient_details_path: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl AppConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let top_k = match get("RECOMMENDATION_TOP_K") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|top_k| *top_k > 0)
                .with_context(|| format!("RECOMMENDATION_TOP_K must be a positive integer, got '{value}'"))?,
            None => defaults.top_k,
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            products_table: get("PRODUCTS_TABLE").unwrap_or(defaults.products_table),
            products_json: get("PRODUCTS_JSON").map(PathBuf::from),
            ingredient_details_path: get("INGREDIENT_DETAILS_PATH").map(PathBuf::from),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            top_k,
        })
    }
}
