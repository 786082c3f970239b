//! # OCR Configuration Module
//!
//! This module defines configuration structures for label text extraction,
//! including recovery settings, image size limits and the vision model request.

// Constants for OCR configuration
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PROMPT: &str = "baca teks yang ada dalam gambar ini";
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit for image files

/// Recovery configuration for error handling
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single extraction request in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000,  // 1 second
            max_retry_delay_ms: 10000,  // 10 seconds
            operation_timeout_secs: 30, // 30 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Per-format upper bounds on uploaded photo size
#[derive(Debug, Clone)]
pub struct FormatSizeLimits {
    pub png_max: u64,
    pub jpeg_max: u64,
    pub webp_max: u64,
    /// Uncompressed, kept low
    pub bmp_max: u64,
    pub tiff_max: u64,
    pub gif_max: u64,
}

impl Default for FormatSizeLimits {
    fn default() -> Self {
        Self {
            png_max: 15 * 1024 * 1024,  // 15MB
            jpeg_max: 10 * 1024 * 1024, // 10MB
            webp_max: 10 * 1024 * 1024, // 10MB
            bmp_max: 5 * 1024 * 1024,   // 5MB
            tiff_max: 20 * 1024 * 1024, // 20MB
            gif_max: 5 * 1024 * 1024,   // 5MB
        }
    }
}

/// Configuration structure for label text extraction
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Vision model name
    pub model: String,
    /// Base URL of the generative language API
    pub api_base: String,
    /// Instruction sent along with the image
    pub prompt: String,
    /// Minimum bytes required for format detection
    pub min_format_bytes: usize,
    /// Maximum allowed image size in bytes (general limit)
    pub max_file_size: u64,
    /// Format-specific size limits
    pub format_limits: FormatSizeLimits,
    /// Recovery and error handling configuration
    pub recovery: RecoveryConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            min_format_bytes: MIN_FORMAT_BYTES,
            max_file_size: MAX_FILE_SIZE,
            format_limits: FormatSizeLimits::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}
