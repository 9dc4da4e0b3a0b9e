//! Machine translation trait and locale helpers
//!
//! `MachineTranslator` is the one external capability the gateway needs.
//! Providers (Google Translate, mock) implement it; nothing above this
//! module knows which one is in use.
//!
//! # Example
//!
//! ```ignore
//! use sitelang_mt::{GoogleTranslateProvider, MachineTranslator, MimeType};
//!
//! let provider = GoogleTranslateProvider::from_env()?;
//! let texts = vec!["Hello".to_string(), "<b>Goodbye</b>".to_string()];
//! let results = provider.translate_batch(&texts, "en", "fr", MimeType::Html).await?;
//! ```

use crate::error::{MtError, MtResult};
use crate::field::MimeType;
use async_trait::async_trait;
use icu_locale::Locale;

/// Generic trait for machine translation providers
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target language
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
        mime_type: MimeType,
    ) -> MtResult<String>;

    /// Translate multiple strings in one request
    ///
    /// Output order matches input order. Implementations may chunk large
    /// batches internally. A reply shorter than the input is tolerated by the
    /// gateway, so providers pass through whatever the backend returned.
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
        mime_type: MimeType,
    ) -> MtResult<Vec<String>>;

    /// Used for logging to identify which provider handled a translation
    fn provider_name(&self) -> &str;
}

/// Map a site language to the provider's language code
///
/// The base language subtag, lowercased: `en-US` → `en`, `fr` → `fr`.
/// Chinese keeps its written variant: `zh-Hant`, `zh-TW`, `zh-HK` and `zh-MO`
/// become `zh-TW`; any other `zh` becomes `zh-CN`.
///
/// ```ignore
/// assert_eq!(resolve_language_code("pt-BR"), "pt");
/// assert_eq!(resolve_language_code("zh-Hant-HK"), "zh-TW");
/// ```
pub fn resolve_language_code(locale: &str) -> String {
    let normalized = locale.trim().replace('_', "-");
    let Ok(parsed) = normalized.parse::<Locale>() else {
        return normalized
            .split('-')
            .next()
            .unwrap_or_default()
            .to_lowercase();
    };

    let language = parsed.id.language.as_str().to_lowercase();
    if language != "zh" {
        return language;
    }

    let traditional_script = parsed
        .id
        .script
        .is_some_and(|script| script.as_str().eq_ignore_ascii_case("hant"));
    let traditional_region = parsed
        .id
        .region
        .is_some_and(|region| matches!(region.as_str(), "TW" | "HK" | "MO"));

    if traditional_script || traditional_region {
        "zh-TW".to_string()
    } else {
        "zh-CN".to_string()
    }
}

/// Validate that a locale code is in acceptable format
///
/// Only alphanumeric characters, hyphens and underscores are allowed.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
