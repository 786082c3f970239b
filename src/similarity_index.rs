//! # Similarity Index Module
//!
//! Content-based nearest neighbour search over the product corpus.
//!
//! Every product with usable ingredients text is turned into a TF-IDF vector
//! over unigrams and bigrams of its normalized ingredients. A query is an
//! ingredient list; it is vectorized with the fitted vocabulary (unknown terms
//! are ignored) and compared to every product by cosine similarity.
//!
//! The index is immutable once built. Rebuilding means building a new index.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::IndexError;
use crate::product::Product;
use crate::text_normalizer::normalize_ingredients_text;

/// Tokens are runs of two or more word characters
pub const TOKEN_PATTERN: &str = r"\b\w\w+\b";

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(TOKEN_PATTERN).expect("Token pattern should be valid");
    static ref STOP_WORDS: HashSet<&'static str> = ENGLISH_STOP_WORDS.iter().copied().collect();
}

/// English stop words removed before n-grams are built
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "amount",
    "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "bottom", "but", "by", "can", "cannot", "could", "de", "do", "done", "down",
    "due", "during", "each", "eg", "eight", "either", "eleven", "else", "elsewhere", "enough",
    "etc", "even", "ever", "every", "everyone", "everything", "everywhere", "except", "few",
    "fifteen", "fifty", "first", "five", "for", "former", "formerly", "forty", "found", "four",
    "from", "front", "full", "further", "get", "give", "go", "had", "has", "have", "he", "hence",
    "her", "here", "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "ie", "if", "in", "inc", "indeed", "into", "is", "it", "its",
    "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many", "may",
    "me", "meanwhile", "might", "more", "moreover", "most", "mostly", "much", "must", "my",
    "myself", "namely", "neither", "never", "nevertheless", "next", "nine", "no", "nobody",
    "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often", "on",
    "once", "one", "only", "onto", "or", "other", "others", "otherwise", "our", "ours",
    "ourselves", "out", "over", "own", "part", "per", "perhaps", "please", "put", "rather", "re",
    "same", "see", "seem", "seemed", "seeming", "seems", "several", "she", "should", "show",
    "side", "since", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "take", "ten", "than", "that", "the", "their",
    "them", "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore",
    "therein", "thereupon", "these", "they", "third", "this", "those", "though", "three",
    "through", "throughout", "thru", "thus", "to", "together", "too", "top", "toward", "towards",
    "twelve", "twenty", "two", "un", "under", "until", "up", "upon", "us", "very", "via", "was",
    "we", "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
    "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Vectorizer and search settings
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizerConfig {
    /// Vocabulary size cap, keeping the most frequent terms
    pub max_features: usize,
    /// Terms in fewer documents are dropped
    pub min_df: usize,
    /// Terms in more than this fraction of documents are dropped
    pub max_df: f64,
    /// Smallest and largest n-gram length
    pub ngram_range: (usize, usize),
    /// Results scoring below this are never returned
    pub min_score: f64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 3000,
            min_df: 1,
            max_df: 0.95,
            ngram_range: (1, 2),
            min_score: 0.05,
        }
    }
}

/// Sparse L2-normalized vector, entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_weights(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(index, _)| *index);
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in entries.iter_mut() {
                *weight /= norm;
            }
        }
        Self { entries }
    }

    fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cosine similarity of two normalized vectors
    fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_index, a_weight) = self.entries[i];
            let (b_index, b_weight) = other.entries[j];
            match a_index.cmp(&b_index) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Fitted TF-IDF model
#[derive(Debug, Clone)]
struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
}

/// Lowercase, tokenize, drop stop words, then emit the n-grams in range
fn analyze(text: &str, ngram_range: (usize, usize)) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !STOP_WORDS.contains(token))
        .collect();

    let (min_n, max_n) = ngram_range;
    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}

fn count_terms(terms: Vec<String>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

impl TfidfVectorizer {
    /// Fit the vocabulary and idf weights, returning the document vectors
    fn fit_transform(
        documents: &[String],
        config: &VectorizerConfig,
    ) -> Result<(Self, Vec<SparseVector>), IndexError> {
        if config.ngram_range.0 == 0 || config.ngram_range.0 > config.ngram_range.1 {
            return Err(IndexError::InvalidParameters(format!(
                "invalid n-gram range {:?}",
                config.ngram_range
            )));
        }

        let document_count = documents.len();
        let max_doc_count = config.max_df * document_count as f64;
        if max_doc_count < config.min_df as f64 {
            return Err(IndexError::InvalidParameters(format!(
                "max_df {} of {} documents is less than min_df {}",
                config.max_df, document_count, config.min_df
            )));
        }

        let counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|document| count_terms(analyze(document, config.ngram_range)))
            .collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<&str, usize> = HashMap::new();
        for document in &counts {
            for (term, count) in document {
                *document_frequency.entry(term).or_insert(0) += 1;
                *corpus_frequency.entry(term).or_insert(0) += count;
            }
        }
        if document_frequency.is_empty() {
            return Err(IndexError::EmptyVocabulary);
        }

        let mut kept: Vec<(&str, usize)> = document_frequency
            .iter()
            .filter(|&(_, &df)| df >= config.min_df && df as f64 <= max_doc_count)
            .map(|(&term, _)| (term, corpus_frequency[term]))
            .collect();
        if kept.is_empty() {
            return Err(IndexError::EmptyVocabulary);
        }

        // Most frequent first, alphabetical among equals
        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        kept.truncate(config.max_features);
        let mut terms: Vec<&str> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        let idf: Vec<f64> = terms
            .iter()
            .map(|term| {
                let df = document_frequency[term] as f64;
                ((1.0 + document_count as f64) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        let vectorizer = Self {
            vocabulary,
            idf,
            ngram_range: config.ngram_range,
        };
        let vectors = counts.iter().map(|c| vectorizer.weigh(c)).collect();
        Ok((vectorizer, vectors))
    }

    fn weigh(&self, counts: &HashMap<String, usize>) -> SparseVector {
        let entries = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&index| (index, count as f64 * self.idf[index]))
            })
            .collect();
        SparseVector::from_weights(entries)
    }

    fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&count_terms(analyze(text, self.ngram_range)))
    }
}

#[derive(Debug, Clone)]
struct IndexedProduct {
    product: Arc<Product>,
    vector: SparseVector,
}

/// A product returned by a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProduct {
    pub product: Arc<Product>,
    /// Cosine similarity in `[0, 1]`
    pub score: f64,
}

/// Fitted vocabulary and per-product vectors
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    vectorizer: TfidfVectorizer,
    documents: Vec<IndexedProduct>,
    min_score: f64,
    corpus_size: usize,
}

impl SimilarityIndex {
    /// Build an index over every product with usable ingredients text
    ///
    /// Products whose normalized ingredients are empty or the not-found
    /// phrase are left out. Fails when none remain or the vocabulary is empty.
    pub fn build(products: &[Arc<Product>], config: &VectorizerConfig) -> Result<Self, IndexError> {
        let (eligible, texts): (Vec<Arc<Product>>, Vec<String>) = products
            .iter()
            .filter_map(|product| {
                let normalized = normalize_ingredients_text(product.ingredients_text());
                (!normalized.is_empty()).then(|| (Arc::clone(product), normalized))
            })
            .unzip();

        info!(
            eligible = eligible.len(),
            total = products.len(),
            "Found products with valid ingredients"
        );
        if eligible.is_empty() {
            return Err(IndexError::NoEligibleProducts {
                total: products.len(),
            });
        }

        let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&texts, config)?;
        info!(
            documents = eligible.len(),
            vocabulary = vectorizer.vocabulary.len(),
            "Built TF-IDF index"
        );

        let documents = eligible
            .into_iter()
            .zip(vectors)
            .map(|(product, vector)| IndexedProduct { product, vector })
            .collect();

        Ok(Self {
            vectorizer,
            documents,
            min_score: config.min_score,
            corpus_size: products.len(),
        })
    }

    /// The `top_k` products most similar to an ingredient list
    ///
    /// Scores below the minimum relevance are dropped, so fewer than `top_k`
    /// results may come back. Equal scores keep corpus order.
    pub fn query(&self, ingredients: &[String], top_k: usize) -> Vec<ScoredProduct> {
        let query_text = ingredients
            .iter()
            .map(|name| normalize_ingredients_text(name))
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if query_text.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let query_vector = self.vectorizer.transform(&query_text);
        if query_vector.is_zero() {
            debug!("Query has no terms in the index vocabulary");
            return Vec::new();
        }

        let mut scored: Vec<ScoredProduct> = self
            .documents
            .iter()
            .map(|document| ScoredProduct {
                product: Arc::clone(&document.product),
                score: document.vector.dot(&query_vector).clamp(0.0, 1.0),
            })
            .filter(|scored| scored.score >= self.min_score)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        debug!(results = scored.len(), top_k, "Similarity query complete");
        scored
    }

    /// Number of indexed products
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of products offered to [`build`](Self::build), eligible or not
    pub fn corpus_size(&self) -> usize {
        self.corpus_size
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary.len()
    }

    /// Indexed products in corpus order
    pub fn products(&self) -> impl Iterator<Item = &Arc<Product>> {
        self.documents.iter().map(|document| &document.product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(items: &[(&str, Option<&str>)]) -> Vec<Arc<Product>> {
        items
            .iter()
            .map(|(title, ingredients)| {
                let product = Product::new(title);
                Arc::new(match ingredients {
                    Some(text) => product.with_ingredients(text),
                    None => product,
                })
            })
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample_index() -> SimilarityIndex {
        let products = corpus(&[
            ("Niacinamide Serum", Some("Aqua, Niacinamide, Zinc PCA, Glycerin")),
            ("Rich Balm", Some("Aqua, Mineral Oil, Petrolatum, Lanolin")),
            ("Spot Gel", Some("Aqua, Salicylic Acid, Tea Tree Oil")),
            ("Unknown Label", Some("Ingredients tidak ditemukan.")),
            ("No Data", None),
        ]);
        SimilarityIndex::build(&products, &VectorizerConfig::default()).unwrap()
    }

    #[test]
    fn test_analyze_builds_unigrams_and_bigrams_without_stop_words() {
        assert_eq!(
            analyze("Mineral Oil and the Water", (1, 2)),
            vec!["mineral", "oil", "water", "mineral oil", "oil water"]
        );
        assert_eq!(analyze("1.3-butylene glycol", (1, 1)), vec!["butylene", "glycol"]);
    }

    #[test]
    fn test_build_skips_ineligible_products() {
        let index = sample_index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.corpus_size(), 5);
        let titles: Vec<&str> = index.products().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Niacinamide Serum", "Rich Balm", "Spot Gel"]);
    }

    #[test]
    fn test_terms_in_every_document_are_pruned() {
        let index = sample_index();
        assert!(!index.vectorizer.vocabulary.contains_key("aqua"));
        assert!(index.vectorizer.vocabulary.contains_key("mineral oil"));
    }

    #[test]
    fn test_query_ranks_closest_product_first() {
        let index = sample_index();
        let results = index.query(&names(&["Water", "Niacinamide", "Zinc Pca"]), 5);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product.title, "Niacinamide Serum");
        assert!(results[0].score > 0.0 && results[0].score <= 1.0);
    }

    #[test]
    fn test_query_top_k_larger_than_corpus() {
        let index = sample_index();
        let results = index.query(&names(&["Niacinamide", "Mineral Oil", "Salicylic Acid"]), 5);
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_query_truncates_to_top_k() {
        let index = sample_index();
        let results = index.query(&names(&["Niacinamide", "Mineral Oil", "Salicylic Acid"]), 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_equal_scores_keep_corpus_order() {
        let products = corpus(&[
            ("Barrier Cream A", Some("Ceramide NP, Squalane")),
            ("Barrier Cream B", Some("Ceramide NP, Squalane")),
            ("Night Serum", Some("Retinol, Bakuchiol")),
        ]);
        let index = SimilarityIndex::build(&products, &VectorizerConfig::default()).unwrap();
        let results = index.query(&names(&["Ceramide Np"]), 5);

        let titles: Vec<&str> = results.iter().map(|r| r.product.title.as_str()).collect();
        assert_eq!(titles, vec!["Barrier Cream A", "Barrier Cream B"]);
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn test_empty_and_unknown_queries_return_nothing() {
        let index = sample_index();
        assert!(index.query(&[], 5).is_empty());
        assert!(index.query(&names(&["  "]), 5).is_empty());
        assert!(index.query(&names(&["Bakuchiol"]), 5).is_empty());
        assert!(index.query(&names(&["Niacinamide"]), 0).is_empty());
    }

    #[test]
    fn test_build_fails_without_eligible_products() {
        let products = corpus(&[("A", None), ("B", Some("Ingredients tidak ditemukan."))]);
        let err = SimilarityIndex::build(&products, &VectorizerConfig::default()).unwrap_err();
        assert_eq!(err, IndexError::NoEligibleProducts { total: 2 });
    }

    #[test]
    fn test_build_fails_on_stop_word_only_corpus() {
        let products = corpus(&[("A", Some("the, and")), ("B", Some("of, with"))]);
        let err = SimilarityIndex::build(&products, &VectorizerConfig::default()).unwrap_err();
        assert_eq!(err, IndexError::EmptyVocabulary);
    }

    #[test]
    fn test_single_document_conflicts_with_max_df() {
        let products = corpus(&[("A", Some("Aqua, Glycerin"))]);
        let err = SimilarityIndex::build(&products, &VectorizerConfig::default()).unwrap_err();
        assert!(matches!(err, IndexError::InvalidParameters(_)));
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let products = corpus(&[
            ("A", Some("Niacinamide, Glycerin, Panthenol")),
            ("B", Some("Retinol, Squalane")),
        ]);
        let config = VectorizerConfig {
            max_features: 2,
            ..VectorizerConfig::default()
        };
        let index = SimilarityIndex::build(&products, &config).unwrap();
        assert_eq!(index.vocabulary_size(), 2);
    }

    #[test]
    fn test_sparse_dot_of_normalized_vectors() {
        let a = SparseVector::from_weights(vec![(2, 3.0), (0, 4.0)]);
        assert!((a.dot(&a) - 1.0).abs() < 1e-12);
        let b = SparseVector::from_weights(vec![(1, 1.0)]);
        assert_eq!(a.dot(&b), 0.0);
    }
}
