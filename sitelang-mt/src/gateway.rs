//! Batch translation gateway
//!
//! Sits between callers and a [`MachineTranslator`]. It skips the provider
//! when there is nothing to do, sends only non-empty texts, and puts the
//! results back at their original positions so callers can translate a
//! column of cells with gaps in it.

use crate::error::{MtError, MtResult};
use crate::field::{FieldKind, MimeType};
use crate::translator::MachineTranslator;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct TranslationGateway {
    translator: Arc<dyn MachineTranslator>,
}

impl TranslationGateway {
    pub fn new(translator: Arc<dyn MachineTranslator>) -> Self {
        Self { translator }
    }

    pub fn provider_name(&self) -> &str {
        self.translator.provider_name()
    }

    /// Translate one field value; blank input is a caller error
    pub async fn translate_one(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        mime_type: MimeType,
    ) -> MtResult<String> {
        if text.trim().is_empty() {
            return Err(MtError::EmptySource("Source field is empty.".to_string()));
        }

        let texts = [text.to_string()];
        let results = self
            .translate_batch(&texts, source_lang, target_lang, mime_type)
            .await?;
        Ok(results.into_iter().next().unwrap_or_else(|| text.to_string()))
    }

    /// False when the languages match or every text is blank; such a batch
    /// comes back unchanged without a provider
    pub fn needs_provider(texts: &[String], source_lang: &str, target_lang: &str) -> bool {
        if source_lang.eq_ignore_ascii_case(target_lang) {
            debug!("Source and target are both '{}', nothing to translate", source_lang);
            return false;
        }
        texts.iter().any(|text| !text.trim().is_empty())
    }

    /// Translate `texts` keeping their length and order
    ///
    /// Blank entries are not sent and come back unchanged. At most one
    /// provider call is made; when the languages match or nothing is left
    /// to translate, none is.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
        mime_type: MimeType,
    ) -> MtResult<Vec<String>> {
        if !Self::needs_provider(texts, source_lang, target_lang) {
            return Ok(texts.to_vec());
        }

        let (indices, pending): (Vec<usize>, Vec<String>) = texts
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(index, text)| (index, text.clone()))
            .unzip();

        info!(
            "Translating {} of {} texts {} -> {} via {}",
            pending.len(),
            texts.len(),
            source_lang,
            target_lang,
            self.translator.provider_name()
        );
        let translated = self
            .translator
            .translate_batch(&pending, source_lang, target_lang, mime_type)
            .await?;

        if translated.len() != pending.len() {
            warn!(
                "{} returned {} translations for {} texts",
                self.translator.provider_name(),
                translated.len(),
                pending.len()
            );
        }

        let mut results = texts.to_vec();
        for (index, text) in indices.into_iter().zip(translated) {
            results[index] = text;
        }
        Ok(results)
    }

    /// Translate a set of entry fields, one batch per mime type
    ///
    /// Results are in input order. Unsupported fields are returned as they are.
    pub async fn translate_fields(
        &self,
        fields: &[(FieldKind, String)],
        source_lang: &str,
        target_lang: &str,
    ) -> MtResult<Vec<String>> {
        let mut by_mime: BTreeMap<MimeType, Vec<usize>> = BTreeMap::new();
        for (index, (kind, _)) in fields.iter().enumerate() {
            if let Some(mime_type) = kind.mime_type() {
                by_mime.entry(mime_type).or_default().push(index);
            }
        }

        let mut results: Vec<String> = fields.iter().map(|(_, text)| text.clone()).collect();
        for (mime_type, indices) in by_mime {
            let texts: Vec<String> = indices.iter().map(|&i| fields[i].1.clone()).collect();
            let translated = self
                .translate_batch(&texts, source_lang, target_lang, mime_type)
                .await?;
            for (index, text) in indices.into_iter().zip(translated) {
                results[index] = text;
            }
        }
        Ok(results)
    }
}

impl std::fmt::Debug for TranslationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationGateway")
            .field("provider", &self.translator.provider_name())
            .finish()
    }
}
