use anyhow::{bail, Context, Result};
use serde_json::json;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use skinsight::analysis::{analyze_ingredients, scan_product_image, ScanOutcome};
use skinsight::catalog::{JsonFileProductSource, PostgresProductSource, ProductSource};
use skinsight::config::AppConfig;
use skinsight::harmful_matcher::HarmfulIngredientMatcher;
use skinsight::ingredient_details::IngredientDetails;
use skinsight::ocr::GeminiExtractor;
use skinsight::ocr_config::OcrConfig;
use skinsight::recommendation::RecommendationEngine;
use skinsight::similarity_index::VectorizerConfig;
use skinsight::skin_profile::SkinType;

const USAGE: &str = "usage: skinsight <skin-type> [label-text-file | --image <photo>]";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skinsight=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn product_source(config: &AppConfig) -> Result<Box<dyn ProductSource>> {
    if let Some(path) = &config.products_json {
        return Ok(Box::new(JsonFileProductSource::new(path)));
    }
    let Some(database_url) = &config.database_url else {
        bail!("set PRODUCTS_JSON or DATABASE_URL to load the product corpus");
    };
    let source = PostgresProductSource::connect(database_url, &config.products_table)
        .await
        .context("Failed to connect to the product database")?;
    Ok(Box::new(source))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(skin_type) = args.first() else {
        bail!(USAGE);
    };
    let skin_type: SkinType = skin_type.parse()?;
    let config = AppConfig::from_env()?;

    let details = match &config.ingredient_details_path {
        Some(path) => IngredientDetails::from_path(path)?,
        None => IngredientDetails::embedded(),
    };
    let matcher = HarmfulIngredientMatcher::new(details);

    let analysis = match args.get(1).map(String::as_str) {
        Some("--image") => {
            let path = args.get(2).context(USAGE)?;
            let api_key = config
                .gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required to read product photos")?;
            let image = std::fs::read(Path::new(path)).with_context(|| format!("Failed to read {path}"))?;

            let ocr_config = OcrConfig {
                model: config.gemini_model.clone(),
                ..OcrConfig::default()
            };
            let extractor = GeminiExtractor::new(api_key, ocr_config.clone())?;
            match scan_product_image(&image, &extractor, skin_type, &matcher, &ocr_config).await? {
                ScanOutcome::Analyzed(analysis) => analysis,
                ScanOutcome::NoText => bail!("No text found in {path}"),
            }
        }
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
            analyze_ingredients(Some(&text), skin_type, &matcher)
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read label text from stdin")?;
            analyze_ingredients(Some(&text), skin_type, &matcher)
        }
    };

    let engine = RecommendationEngine::new(matcher, VectorizerConfig::default());
    match product_source(&config).await {
        Ok(source) => {
            if let Err(e) = engine.rebuild(source.as_ref()).await {
                warn!(error = %e, "Recommendations unavailable");
            }
        }
        Err(e) => warn!(error = %e, "Recommendations unavailable"),
    }

    let recommendations = engine.recommend_by_ingredients(&analysis.ingredients, skin_type, config.top_k);
    let by_skin_type = engine.recommend_by_description(skin_type, config.top_k);
    info!(status = ?engine.status(), "Done");

    let report = json!({
        "analysis": analysis,
        "recommendations": recommendations,
        "skin_type_recommendations": by_skin_type,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
