//! # Pipeline Tests
//!
//! End-to-end checks of label analysis and recommendations through the
//! public API.

use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;
use tempfile::NamedTempFile;

use skinsight::analysis::analyze_ingredients;
use skinsight::catalog::{JsonFileProductSource, ProductSource};
use skinsight::errors::{CatalogError, RecommendationError};
use skinsight::harmful_matcher::{is_safe, HarmfulIngredientMatcher};
use skinsight::ingredient_parser::parse_ingredient_text;
use skinsight::product::Product;
use skinsight::recommendation::RecommendationEngine;
use skinsight::similarity_index::VectorizerConfig;
use skinsight::skin_profile::SkinType;
use skinsight::text_normalizer::{clean, extract_ingredients_section, IngredientsSection};

struct OfflineSource;

#[async_trait]
impl ProductSource for OfflineSource {
    async fn load_product_corpus(&self) -> Result<Vec<Product>, CatalogError> {
        Err(CatalogError::Connection("could not reach database".to_string()))
    }
}

const CATALOG_JSON: &str = r#"[
  {"title": "Gentle Niacinamide Serum", "ingredients": "Aqua, Niacinamide, Glycerin, Panthenol, Allantoin",
   "price": "Rp89.000", "link": "https://shop.example/serum", "description": "Cocok untuk semua jenis kulit"},
  {"title": "Gentle Niacinamide Serum", "ingredients": "Aqua, Niacinamide, Glycerin, Panthenol",
   "price": "Rp89.000", "description": "Duplicate listing"},
  {"title": "Barrier Cream", "ingredients": "Aqua, Glycerin, Ceramide NP, Mineral Oil, Petrolatum",
   "description": "Rich cream for dry skin"},
  {"title": "Perfumed Toner", "ingredients": "Aqua, Niacinamide, Glycerin, Fragrance",
   "description": "Refreshing toner for oily skin"},
  {"title": "Centella Gel", "ingredients": "Aqua, Centella Asiatica, Niacinamide, Glycerin",
   "description": "Soothing gel for sensitive skin"},
  {"title": "Mystery Jar", "ingredients": "Ingredients tidak ditemukan.", "description": "nan"}
]"#;

fn catalog_file() -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{CATALOG_JSON}")?;
    Ok(file)
}

fn engine() -> RecommendationEngine {
    RecommendationEngine::new(
        HarmfulIngredientMatcher::with_embedded_details(),
        VectorizerConfig::default(),
    )
}

#[test]
fn test_label_text_to_ingredient_list() {
    let raw = "**SERUM**\nNet 30 ml\n\nIngredients: Water, 1,3-Butylene Glycol, 30 ml";
    let cleaned = clean(Some(raw));
    assert_eq!(cleaned, "SERUM Net 30 ml Ingredients: Water, 1,3-Butylene Glycol, 30 ml");

    let section = extract_ingredients_section(&cleaned);
    assert_eq!(
        section,
        IngredientsSection::Found("Water, 1,3-Butylene Glycol, 30 ml".to_string())
    );
    assert_eq!(
        parse_ingredient_text(section.as_text().unwrap()),
        vec!["Water", "1.3-Butylene Glycol"]
    );
}

#[test]
fn test_mineral_oil_is_unsafe_for_oily_skin() {
    let matcher = HarmfulIngredientMatcher::with_embedded_details();
    let skin_type = SkinType::Oily;
    let matches = matcher.find_harmful(
        "contains mineral oil and glycerin",
        skin_type.avoid_list(),
        skin_type,
    );

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "Mineral Oil");
    assert!(!matches[0].reason.is_empty());
    assert!(!is_safe(&matches));
}

#[tokio::test]
async fn test_unreachable_store_yields_error_result() {
    let engine = engine();
    assert!(engine.rebuild(&OfflineSource).await.is_err());

    let result = engine.recommend_by_ingredients(&vec!["Niacinamide".to_string()], SkinType::Oily, 5);
    assert!(matches!(result.error, Some(RecommendationError::Unavailable(_))));
    assert_eq!(result.recommendation_count, 0);
    assert!(result.recommendations.is_empty());

    // The safety check does not depend on the index
    let matcher = HarmfulIngredientMatcher::with_embedded_details();
    let analysis = analyze_ingredients(Some("Ingredients: Aqua, Fragrance"), SkinType::Oily, &matcher);
    assert!(!analysis.is_safe);
}

#[tokio::test]
async fn test_recommendations_are_distinct_and_safe_for_every_skin_type() -> Result<()> {
    let file = catalog_file()?;
    let engine = engine();
    let status = engine.rebuild(&JsonFileProductSource::new(file.path())).await?;
    assert_eq!(status.product_count, 6);
    assert_eq!(status.indexed_count, 5);

    let matcher = HarmfulIngredientMatcher::with_embedded_details();
    let products = JsonFileProductSource::new(file.path()).load_product_corpus().await?;
    let scanned = parse_ingredient_text("Aqua, Niacinamide, Glycerin, Ceramide NP, Centella Asiatica");

    for skin_type in SkinType::ALL {
        let result = engine.recommend_by_ingredients(&scanned, skin_type, 5);
        assert!(result.error.is_none());

        let mut titles: Vec<&str> = result
            .recommendations
            .iter()
            .map(|r| r.summary.product_name.as_str())
            .collect();
        let count = titles.len();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), count, "duplicate titles for {skin_type}");

        for recommendation in &result.recommendations {
            let product = products
                .iter()
                .find(|p| p.title == recommendation.summary.product_name)
                .unwrap();
            assert!(
                is_safe(&matcher.find_harmful_for(recommendation.product.ingredients_text(), skin_type)),
                "{} is unsafe for {skin_type}",
                product.title
            );
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_oily_recommendations_exclude_unsafe_products() -> Result<()> {
    let file = catalog_file()?;
    let engine = engine();
    engine.rebuild(&JsonFileProductSource::new(file.path())).await?;

    let scanned = parse_ingredient_text("Aqua, Niacinamide, Glycerin, Fragrance");
    let result = engine.recommend_by_ingredients(&scanned, SkinType::Oily, 5);

    let titles: Vec<&str> = result
        .recommendations
        .iter()
        .map(|r| r.summary.product_name.as_str())
        .collect();
    assert!(!titles.contains(&"Perfumed Toner"));
    assert!(!titles.contains(&"Barrier Cream"));
    assert!(titles.contains(&"Gentle Niacinamide Serum"));
    assert!(result.total_safe.unwrap() <= result.total_found);

    let serum = &result
        .recommendations
        .iter()
        .find(|r| r.summary.product_name == "Gentle Niacinamide Serum")
        .unwrap()
        .summary;
    assert_eq!(serum.price, "Rp89.000");
    assert_eq!(serum.product_image, "Unknown");
    Ok(())
}

#[tokio::test]
async fn test_skin_type_recommendations_from_descriptions() -> Result<()> {
    let file = catalog_file()?;
    let engine = engine();
    engine.rebuild(&JsonFileProductSource::new(file.path())).await?;

    let result = engine.recommend_by_description(SkinType::Sensitive, 5);
    let titles: Vec<&str> = result
        .recommendations
        .iter()
        .map(|r| r.summary.product_name.as_str())
        .collect();
    assert_eq!(titles, vec!["Gentle Niacinamide Serum", "Centella Gel"]);
    assert_eq!(result.total_found, 2);
    assert!(result
        .recommendations
        .iter()
        .all(|r| r.match_reason.as_deref() == Some("Suitable for sensitive skin type")));
    Ok(())
}

#[test]
fn test_clean_is_a_fixed_point_on_clean_text() {
    for raw in [
        "Ingredients: Aqua, Glycerin",
        "**Bahan**:\n* Aqua\n* Gliserin\n\n\nNetto 50 g",
        "",
    ] {
        let once = clean(Some(raw));
        assert_eq!(clean(Some(&once)), once);
    }
}
