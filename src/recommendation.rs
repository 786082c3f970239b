//! # Recommendation Engine Module
//!
//! Suggests alternative products for a user's skin type.
//!
//! ## Modes
//!
//! - **By ingredients**: similarity search over the index, deduplicated by
//!   title, with every candidate containing an avoid-listed ingredient removed
//! - **By description**: products whose description mentions the skin type,
//!   in corpus order
//!
//! The engine owns its corpus snapshot. [`RecommendationEngine::rebuild`]
//! builds a complete new snapshot before swapping it in, so concurrent
//! readers only ever see a finished index. Every rebuild takes a generation
//! number when it starts; a build that finishes after a newer one has been
//! swapped in is discarded. Until a build succeeds the engine
//! is disabled and every request returns a result carrying an error.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::catalog::ProductSource;
use crate::errors::RecommendationError;
use crate::harmful_matcher::{is_safe, HarmfulIngredientMatcher};
use crate::ingredient_parser::IngredientList;
use crate::product::{Product, ProductSummary};
use crate::similarity_index::{SimilarityIndex, VectorizerConfig};
use crate::skin_profile::SkinType;

/// Candidates fetched per requested recommendation, to survive filtering
pub const OVERFETCH_FACTOR: usize = 3;

/// Default number of recommendations
pub const DEFAULT_TOP_K: usize = 5;

/// Minimum time between automatic rebuild attempts of a disabled engine
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// One recommended product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(skip)]
    pub product: Arc<Product>,
    #[serde(flatten)]
    pub summary: ProductSummary,
    /// Cosine similarity to the scanned product (ingredient mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    /// Why the product was selected (description mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
}

impl Recommendation {
    fn new(product: Arc<Product>) -> Self {
        Self {
            summary: product.summary(),
            product,
            similarity_score: None,
            match_reason: None,
        }
    }
}

/// Ranked recommendations with search metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<Recommendation>,
    /// Distinct candidates found before the safety filter
    pub total_found: usize,
    /// Candidates passing the safety filter (ingredient mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_safe: Option<usize>,
    pub skin_type: SkinType,
    pub recommendation_count: usize,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<RecommendationError>,
}

fn serialize_error<S: Serializer>(
    error: &Option<RecommendationError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

impl RecommendationResult {
    fn unavailable(skin_type: SkinType, error: RecommendationError, with_safe_count: bool) -> Self {
        Self {
            recommendations: Vec::new(),
            total_found: 0,
            total_safe: with_safe_count.then_some(0),
            skin_type,
            recommendation_count: 0,
            error: Some(error),
        }
    }

    /// The request was served but nothing matched
    pub fn is_no_match(&self) -> bool {
        self.error.is_none() && self.recommendations.is_empty()
    }
}

/// Health of the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub enabled: bool,
    pub product_count: usize,
    pub indexed_count: usize,
    pub vocabulary_size: usize,
    pub built_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Corpus and index served together
#[derive(Debug)]
struct Snapshot {
    products: Vec<Arc<Product>>,
    index: SimilarityIndex,
    built_at: DateTime<Utc>,
    generation: u64,
}

#[derive(Debug, Default)]
struct EngineState {
    snapshot: Option<Arc<Snapshot>>,
    last_error: Option<RecommendationError>,
}

/// Recommendation service owned by the application
#[derive(Debug)]
pub struct RecommendationEngine {
    matcher: HarmfulIngredientMatcher,
    config: VectorizerConfig,
    retry_interval: Duration,
    state: RwLock<EngineState>,
    last_attempt: Mutex<Option<Instant>>,
    generations: AtomicU64,
}

impl RecommendationEngine {
    /// Create a disabled engine; call [`rebuild`](Self::rebuild) to enable it
    pub fn new(matcher: HarmfulIngredientMatcher, config: VectorizerConfig) -> Self {
        Self {
            matcher,
            config,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            state: RwLock::new(EngineState {
                snapshot: None,
                last_error: Some(RecommendationError::Unavailable(
                    "recommendation index has not been built".to_string(),
                )),
            }),
            last_attempt: Mutex::new(None),
            generations: AtomicU64::new(0),
        }
    }

    /// Minimum time between [`ensure_ready`](Self::ensure_ready) rebuilds
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Load the corpus from `source` and swap in a freshly built index
    ///
    /// On failure the previously served snapshot, if any, stays in place.
    pub async fn rebuild(&self, source: &dyn ProductSource) -> Result<EngineStatus, RecommendationError> {
        self.mark_attempt();
        let generation = self.next_generation();
        match source.load_product_corpus().await {
            Ok(products) => self.build_and_swap(products, generation),
            Err(e) => {
                let err = RecommendationError::from(e);
                error!(error = %err, "Failed to load product corpus");
                self.record_failure(err.clone());
                Err(err)
            }
        }
    }

    /// Build and swap in an index over an already loaded corpus
    pub fn rebuild_from_products(&self, products: Vec<Product>) -> Result<EngineStatus, RecommendationError> {
        let generation = self.next_generation();
        self.build_and_swap(products, generation)
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn build_and_swap(&self, products: Vec<Product>, generation: u64) -> Result<EngineStatus, RecommendationError> {
        let products: Vec<Arc<Product>> = products.into_iter().map(Arc::new).collect();
        info!(products = products.len(), generation, "Building recommendation index");

        match SimilarityIndex::build(&products, &self.config) {
            Ok(index) => {
                let snapshot = Arc::new(Snapshot {
                    products,
                    index,
                    built_at: Utc::now(),
                    generation,
                });
                {
                    let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
                    if let Some(current) = state.snapshot.as_ref().filter(|s| s.generation > generation) {
                        warn!(
                            generation,
                            current = current.generation,
                            "Discarding index from a rebuild superseded by a newer one"
                        );
                        drop(state);
                        return Ok(self.status());
                    }
                    state.snapshot = Some(snapshot);
                    state.last_error = None;
                }
                let status = self.status();
                info!(
                    indexed = status.indexed_count,
                    vocabulary = status.vocabulary_size,
                    "Recommendation engine enabled"
                );
                Ok(status)
            }
            Err(e) => {
                let err = RecommendationError::from(e);
                error!(error = %err, "Failed to build recommendation index");
                self.record_failure(err.clone());
                Err(err)
            }
        }
    }

    /// Rebuild a disabled engine, at most once per retry interval
    ///
    /// Returns whether the engine is ready afterwards.
    pub async fn ensure_ready(&self, source: &dyn ProductSource) -> bool {
        if self.is_ready() {
            return true;
        }

        let due = {
            let last_attempt = self.last_attempt.lock().unwrap_or_else(|e| e.into_inner());
            last_attempt.map_or(true, |at| at.elapsed() >= self.retry_interval)
        };
        if !due {
            debug!("Recommendation engine disabled, retry not due yet");
            return false;
        }

        warn!("Recommendation engine disabled, retrying initialization");
        self.rebuild(source).await.is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn status(&self) -> EngineStatus {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let last_error = state.last_error.as_ref().map(ToString::to_string);
        match &state.snapshot {
            Some(snapshot) => EngineStatus {
                enabled: true,
                product_count: snapshot.products.len(),
                indexed_count: snapshot.index.len(),
                vocabulary_size: snapshot.index.vocabulary_size(),
                built_at: Some(snapshot.built_at),
                last_error,
            },
            None => EngineStatus {
                enabled: false,
                product_count: 0,
                indexed_count: 0,
                vocabulary_size: 0,
                built_at: None,
                last_error,
            },
        }
    }

    /// Safe alternatives whose ingredients resemble the scanned product
    pub fn recommend_by_ingredients(
        &self,
        scanned: &IngredientList,
        skin_type: SkinType,
        top_k: usize,
    ) -> RecommendationResult {
        let snapshot = match self.snapshot_or_error() {
            Ok(snapshot) => snapshot,
            Err(err) => return RecommendationResult::unavailable(skin_type, err, true),
        };

        let candidates = snapshot.index.query(scanned, top_k.saturating_mul(OVERFETCH_FACTOR));

        let mut seen = HashSet::new();
        let distinct: Vec<_> = candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.product.title.clone()))
            .collect();
        let total_found = distinct.len();

        let safe: Vec<Recommendation> = distinct
            .into_iter()
            .filter(|candidate| {
                let harmful = self
                    .matcher
                    .find_harmful_for(candidate.product.ingredients_text(), skin_type);
                if !harmful.is_empty() {
                    debug!(
                        product = %candidate.product.title,
                        harmful = harmful.len(),
                        "Filtered out candidate with harmful ingredients"
                    );
                }
                is_safe(&harmful)
            })
            .map(|candidate| Recommendation {
                similarity_score: Some(candidate.score),
                ..Recommendation::new(candidate.product)
            })
            .collect();
        let total_safe = safe.len();

        let recommendations: Vec<Recommendation> = safe.into_iter().take(top_k).collect();
        info!(
            skin_type = %skin_type,
            total_found,
            total_safe,
            returned = recommendations.len(),
            "Ingredient based recommendations"
        );

        RecommendationResult {
            recommendation_count: recommendations.len(),
            recommendations,
            total_found,
            total_safe: Some(total_safe),
            skin_type,
            error: None,
        }
    }

    /// First `top_k` products whose description suits the skin type
    pub fn recommend_by_description(&self, skin_type: SkinType, top_k: usize) -> RecommendationResult {
        let snapshot = match self.snapshot_or_error() {
            Ok(snapshot) => snapshot,
            Err(err) => return RecommendationResult::unavailable(skin_type, err, false),
        };

        let pattern = skin_type.description_regex();
        let match_reason = format!("Suitable for {skin_type} skin type");
        let mut seen = HashSet::new();
        let mut recommendations = Vec::new();

        for product in &snapshot.products {
            if recommendations.len() >= top_k {
                break;
            }
            let description = product.description.as_deref().unwrap_or_default().trim();
            if description.is_empty() || description.eq_ignore_ascii_case("nan") {
                continue;
            }
            if !pattern.is_match(description) || !seen.insert(product.title.as_str()) {
                continue;
            }
            recommendations.push(Recommendation {
                match_reason: Some(match_reason.clone()),
                ..Recommendation::new(Arc::clone(product))
            });
        }

        info!(skin_type = %skin_type, returned = recommendations.len(), "Description based recommendations");
        RecommendationResult {
            total_found: recommendations.len(),
            recommendation_count: recommendations.len(),
            recommendations,
            total_safe: None,
            skin_type,
            error: None,
        }
    }

    fn snapshot(&self) -> Option<Arc<Snapshot>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.snapshot.clone()
    }

    fn snapshot_or_error(&self) -> Result<Arc<Snapshot>, RecommendationError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.snapshot.clone().ok_or_else(|| {
            let cause = state
                .last_error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "not initialized".to_string());
            RecommendationError::Unavailable(cause)
        })
    }

    fn record_failure(&self, err: RecommendationError) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.last_error = Some(err);
    }

    fn mark_attempt(&self) {
        let mut last_attempt = self.last_attempt.lock().unwrap_or_else(|e| e.into_inner());
        *last_attempt = Some(Instant::now());
    }
}
