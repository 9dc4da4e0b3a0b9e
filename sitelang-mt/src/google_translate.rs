//! Google Translate API v2 provider
//!
//! The API key is read from an environment variable, `GOOGLE_TRANSLATE_API_KEY`
//! unless configured otherwise. It is never written to logs.
//!
//! # Example
//!
//! ```ignore
//! use sitelang_mt::{GoogleTranslateProvider, MachineTranslator, MimeType};
//!
//! let provider = GoogleTranslateProvider::from_env()?;
//! let result = provider.translate("Hello, world!", "en", "fr", MimeType::PlainText).await?;
//! ```

use crate::error::{MtError, MtResult};
use crate::field::MimeType;
use crate::translator::{MachineTranslator, validate_locale};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// Default environment variable holding the API key
pub const API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Google Translate v2 accepts up to 128 texts per request
    const MAX_BATCH_SIZE: usize = 128;

    /// Maximum characters per string
    const MAX_CHARS_PER_STRING: usize = 30_000;

    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn from_env() -> MtResult<Self> {
        Self::from_env_var(API_KEY_ENV)
    }

    /// Read the API key from the environment variable `name`
    pub fn from_env_var(name: &str) -> MtResult<Self> {
        let api_key = std::env::var(name).map_err(|_| {
            MtError::ConfigError(format!("{} environment variable not set", name))
        })?;

        Self::new(api_key)
    }

    /// Point the provider at another endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn chunk_batch(texts: &[String]) -> Vec<&[String]> {
        texts.chunks(Self::MAX_BATCH_SIZE).collect()
    }

    /// Translate one chunk of at most `MAX_BATCH_SIZE` texts
    async fn translate_chunk(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
        mime_type: MimeType,
    ) -> MtResult<Vec<String>> {
        let url = format!("{}?key={}", self.base_url, self.api_key);

        let body = json!({
            "q": texts,
            "source": source_locale,
            "target": target_locale,
            "format": mime_type.google_format()
        });

        debug!(
            "Requesting {} translations {} -> {} ({})",
            texts.len(),
            source_locale,
            target_locale,
            mime_type
        );
        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("API server error ({}): {}", status, error_text))
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        parse_translations(&json)
    }
}

/// Extract `data.translations[].translatedText` from an API reply
fn parse_translations(json: &serde_json::Value) -> MtResult<Vec<String>> {
    let translations = json["data"]["translations"].as_array().ok_or_else(|| {
        MtError::TranslationError(
            "Invalid API response: missing 'data.translations' array".to_string(),
        )
    })?;

    translations
        .iter()
        .map(|t| {
            t["translatedText"]
                .as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    MtError::TranslationError(
                        "Invalid API response: missing 'translatedText' field".to_string(),
                    )
                })
        })
        .collect()
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
        mime_type: MimeType,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        if text.len() > Self::MAX_CHARS_PER_STRING {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let results = self
            .translate_chunk(&[text.to_string()], source_locale, target_locale, mime_type)
            .await?;

        results.into_iter().next().ok_or_else(|| {
            MtError::TranslationError("Invalid API response: no translation returned".to_string())
        })
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
        mime_type: MimeType,
    ) -> MtResult<Vec<String>> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        for (i, text) in texts.iter().enumerate() {
            if text.len() > Self::MAX_CHARS_PER_STRING {
                return Err(MtError::TranslationError(format!(
                    "Text at index {} exceeds maximum length of {} characters",
                    i,
                    Self::MAX_CHARS_PER_STRING
                )));
            }
        }

        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in Self::chunk_batch(texts) {
            let chunk_results = self
                .translate_chunk(chunk, source_locale, target_locale, mime_type)
                .await?;
            all_results.extend(chunk_results);
        }

        Ok(all_results)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
