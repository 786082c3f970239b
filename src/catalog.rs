//! # Product Catalog Module
//!
//! Sources the recommendation corpus is loaded from. The engine only sees the
//! [`ProductSource`] trait; PostgreSQL and JSON file implementations are
//! provided.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::postgres::PgPool;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::errors::CatalogError;
use crate::product::{Product, UNKNOWN_ATTRIBUTE};

/// Default table holding the collected products
pub const DEFAULT_PRODUCTS_TABLE: &str = "products";

lazy_static! {
    static ref TABLE_NAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Table name pattern should be valid");
}

/// Loads the full product corpus
///
/// An empty corpus is a valid answer; connectivity and query failures are errors.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn load_product_corpus(&self) -> Result<Vec<Product>, CatalogError>;
}

/// Row of the products table, every column nullable
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    title: Option<String>,
    ingredients: Option<String>,
    image_url: Option<String>,
    price: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            title: row.title.unwrap_or_else(|| UNKNOWN_ATTRIBUTE.to_string()),
            ingredients: row.ingredients,
            image_url: row.image_url,
            price: row.price,
            link: row.link,
            description: row.description,
        }
    }
}

/// Products stored in a PostgreSQL table
#[derive(Debug, Clone)]
pub struct PostgresProductSource {
    pool: PgPool,
    table: String,
}

impl PostgresProductSource {
    /// Use `table` of the given pool; the name must be a plain SQL identifier
    pub fn new(pool: PgPool, table: &str) -> Result<Self, CatalogError> {
        if !TABLE_NAME_REGEX.is_match(table) {
            return Err(CatalogError::Query(format!("invalid table name '{table}'")));
        }
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Connect to `database_url` and read from `table`
    pub async fn connect(database_url: &str, table: &str) -> Result<Self, CatalogError> {
        info!(table, "Connecting to product database");
        let pool = PgPool::connect(database_url).await?;
        Self::new(pool, table)
    }
}

#[async_trait]
impl ProductSource for PostgresProductSource {
    async fn load_product_corpus(&self) -> Result<Vec<Product>, CatalogError> {
        let query = format!(
            "SELECT title::text, ingredients::text, image_url::text, price::text, link::text, description::text FROM {}",
            self.table
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;

        info!(table = %self.table, products = rows.len(), "Loaded products from database");
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

/// Products stored as a JSON array in a file
#[derive(Debug, Clone)]
pub struct JsonFileProductSource {
    path: PathBuf,
}

impl JsonFileProductSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProductSource for JsonFileProductSource {
    async fn load_product_corpus(&self) -> Result<Vec<Product>, CatalogError> {
        debug!(path = %self.path.display(), "Reading product file");
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::Io(format!("{}: {e}", self.path.display())))?;
        let products: Vec<Product> = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Parse(format!("{}: {e}", self.path.display())))?;

        info!(path = %self.path.display(), products = products.len(), "Loaded products from file");
        Ok(products)
    }
}

/// Products held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductSource {
    products: Vec<Product>,
}

impl InMemoryProductSource {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductSource for InMemoryProductSource {
    async fn load_product_corpus(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.clone())
    }
}
