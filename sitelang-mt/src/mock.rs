//! Mock machine translator for testing
//!
//! Deterministic and API-free. Every instance counts the provider calls it
//! receives, so tests can assert that a batch caused exactly one request or
//! none at all.
//!
//! # Example
//!
//! ```ignore
//! let mock = MockTranslator::new(MockMode::Suffix);
//! let result = mock.translate("hello", "en", "fr", MimeType::PlainText).await?;
//! assert_eq!(result, "hello_fr");
//! assert_eq!(mock.call_count(), 1);
//! ```

use crate::error::{MtError, MtResult};
use crate::field::MimeType;
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append target suffix: "hello" → "hello_fr"
    Suffix,

    /// (text, target_locale) → translation, falling back to suffix
    Mappings(HashMap<(String, String), String>),

    /// Always return this reply, whatever the input length
    Fixed(Vec<String>),

    /// Simulate API errors
    Error(String),
}

#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Shared between clones
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `translate`/`translate_batch` calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Fixed(reply) => Ok(reply.first().cloned().unwrap_or_default()),
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
        _mime_type: MimeType,
    ) -> MtResult<String> {
        self.begin_call();
        self.apply_translation(text, target_locale)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        _source_locale: &str,
        target_locale: &str,
        _mime_type: MimeType,
    ) -> MtResult<Vec<String>> {
        // one call per batch
        self.begin_call();

        if let MockMode::Fixed(reply) = &self.mode {
            return Ok(reply.clone());
        }

        texts
            .iter()
            .map(|text| self.apply_translation(text, target_locale))
            .collect()
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
