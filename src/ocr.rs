//! # Label Text Extraction Module
//!
//! Reads the text printed on a product photo. Extraction sits behind the
//! [`TextExtractor`] trait; [`GeminiExtractor`] sends the image to a hosted
//! vision model with retries, a request timeout and a circuit breaker.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use rand::Rng;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::errors::OcrError;
use crate::ocr_config::OcrConfig;

/// Reads label text from an image
///
/// `image` has already passed [`validate_image`], which detected `format`.
/// `Ok(None)` means the image contains no readable text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text_from_image(&self, image: &[u8], format: ImageFormat) -> Result<Option<String>, OcrError>;
}

/// MIME type sent to the vision model for a detected format
pub fn mime_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

/// Check an uploaded photo before it is sent for extraction
///
/// Detects the format from the magic bytes and applies the general and
/// per-format size limits.
pub fn validate_image(image: &[u8], config: &OcrConfig) -> Result<ImageFormat, OcrError> {
    let size = image.len() as u64;
    if image.len() < config.min_format_bytes {
        return Err(OcrError::Validation(format!(
            "image too small to detect its format ({size} bytes)"
        )));
    }
    if size > config.max_file_size {
        return Err(OcrError::Validation(format!(
            "image is {size} bytes, the limit is {} bytes",
            config.max_file_size
        )));
    }

    let format = image::guess_format(image)
        .map_err(|e| OcrError::UnsupportedFormat(e.to_string()))?;

    let limits = &config.format_limits;
    let format_limit = match format {
        ImageFormat::Png => limits.png_max,
        ImageFormat::Jpeg => limits.jpeg_max,
        ImageFormat::WebP => limits.webp_max,
        ImageFormat::Bmp => limits.bmp_max,
        ImageFormat::Tiff => limits.tiff_max,
        ImageFormat::Gif => limits.gif_max,
        other => return Err(OcrError::UnsupportedFormat(format!("{other:?}"))),
    };
    if size > format_limit {
        return Err(OcrError::Validation(format!(
            "{format:?} image is {size} bytes, the limit is {format_limit} bytes"
        )));
    }

    debug!(?format, size, "Validated image");
    Ok(format)
}

/// Delay before retry `attempt` (1-based): exponential backoff capped at the
/// maximum, plus up to 10% random jitter
pub fn calculate_retry_delay(attempt: u32, config: &crate::ocr_config::RecoveryConfig) -> u64 {
    let exponent = attempt.saturating_sub(1).min(16);
    let base = config
        .base_retry_delay_ms
        .saturating_mul(1u64 << exponent)
        .min(config.max_retry_delay_ms);
    let jitter = rand::thread_rng().gen_range(0..=base / 10);
    base + jitter
}

/// Error for a non-success HTTP status
///
/// Client errors other than `429 Too Many Requests` will not go away on
/// retry and map to [`OcrError::Rejected`].
fn status_error(status: StatusCode, detail: &str) -> OcrError {
    let message = format!("{status}: {detail}");
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        OcrError::Rejected(message)
    } else {
        OcrError::Request(message)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData { inline_data: InlineData<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, `None` when it is blank
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Text extraction through the Gemini `generateContent` API
#[derive(Debug)]
pub struct GeminiExtractor {
    client: reqwest::Client,
    api_key: String,
    config: OcrConfig,
    breaker: CircuitBreaker,
}

impl GeminiExtractor {
    pub fn new(api_key: &str, config: OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.recovery.operation_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            breaker: CircuitBreaker::new(config.recovery.clone()),
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn request_once(&self, mime_type: &str, encoded: &str) -> Result<Option<String>, OcrError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type,
                            data: encoded.to_string(),
                        },
                    },
                    RequestPart::Text {
                        text: &self.config.prompt,
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(status_error(status, &detail));
        }

        let payload: GenerateContentResponse = response.json().await?;
        Ok(payload.into_text())
    }
}

#[async_trait]
impl TextExtractor for GeminiExtractor {
    async fn extract_text_from_image(&self, image: &[u8], format: ImageFormat) -> Result<Option<String>, OcrError> {
        if self.breaker.is_open() {
            warn!("Circuit breaker open, refusing text extraction");
            return Err(OcrError::CircuitOpen);
        }

        let mime_type = mime_type(format).ok_or_else(|| OcrError::UnsupportedFormat(format!("{format:?}")))?;
        let encoded = STANDARD.encode(image);

        let max_attempts = self.config.recovery.max_retries + 1;
        let mut attempt = 1;
        loop {
            match self.request_once(mime_type, &encoded).await {
                Ok(text) => {
                    self.breaker.record_success();
                    info!(
                        chars = text.as_ref().map_or(0, String::len),
                        attempt,
                        "Extracted label text"
                    );
                    return Ok(text);
                }
                Err(e) if !e.is_retryable() => {
                    warn!(error = %e, attempts = attempt, "Text extraction rejected");
                    return Err(e);
                }
                Err(e) if attempt < max_attempts => {
                    let delay = calculate_retry_delay(attempt, &self.config.recovery);
                    warn!(error = %e, attempt, delay_ms = delay, "Text extraction failed, retrying");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => {
                    self.breaker.record_failure();
                    warn!(error = %e, attempts = attempt, "Text extraction failed");
                    return Err(e);
                }
            }
        }
    }
}
