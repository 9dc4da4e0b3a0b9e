//! Autotranslate service
//!
//! Two request shapes: one entry field between two sites, or an ordered list
//! of texts between two languages. Failures never escape as `Err`; they are
//! reported in the response as `{success: false, error}`.

use crate::entry::{self, EntryId, EntryRowRequest, EntrySource};
use crate::error::{MtError, MtResult};
use crate::field::MimeType;
use crate::gateway::TranslationGateway;
use crate::google_translate::GoogleTranslateProvider;
use crate::translator::{MachineTranslator, resolve_language_code};
use serde::{Deserialize, Serialize};
use sitelang::{AutotranslateConfig, LanguageMap, SiteDirectory, SiteId};
use std::sync::Arc;
use tracing::{info, warn};

/// Whether autotranslate can be offered right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Ready,
    Disabled(String),
}

impl Availability {
    /// Disabled when turned off in config or the key variable is unset or blank
    pub fn from_config(config: &AutotranslateConfig) -> Self {
        if !config.enabled {
            return Availability::Disabled("Autotranslate is disabled.".to_string());
        }
        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Availability::Ready,
            _ => Availability::Disabled("Google Translate API key is missing.".to_string()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Availability::Ready)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Availability::Ready => None,
            Availability::Disabled(reason) => Some(reason),
        }
    }
}

/// Returned by the options endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutotranslateOptions {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutotranslateRequest {
    pub entry_id: Option<EntryId>,
    pub field_handle: Option<String>,
    pub source_site_id: Option<SiteId>,
    pub target_site_id: Option<SiteId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutotranslateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<MtResult<String>> for AutotranslateResponse {
    fn from(result: MtResult<String>) -> Self {
        match result {
            Ok(text) => Self {
                success: true,
                text: Some(text),
                error: None,
            },
            Err(err) => Self {
                success: false,
                text: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutotranslateTextRequest {
    pub texts: Option<Vec<String>>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutotranslateTextResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<MtResult<Vec<String>>> for AutotranslateTextResponse {
    fn from(result: MtResult<Vec<String>>) -> Self {
        match result {
            Ok(translations) => Self {
                success: true,
                translations: Some(translations),
                error: None,
            },
            Err(err) => Self {
                success: false,
                translations: None,
                error: Some(err.to_string()),
            },
        }
    }
}

fn missing_parameters() -> MtError {
    MtError::InvalidRequest("Missing required parameters.".to_string())
}

pub struct Autotranslator {
    gateway: Option<TranslationGateway>,
    availability: Availability,
    sites: Arc<dyn SiteDirectory>,
    entries: Arc<dyn EntrySource>,
}

impl Autotranslator {
    /// Always available, backed by `translator`
    pub fn new(
        translator: Arc<dyn MachineTranslator>,
        sites: Arc<dyn SiteDirectory>,
        entries: Arc<dyn EntrySource>,
    ) -> Self {
        Self {
            gateway: Some(TranslationGateway::new(translator)),
            availability: Availability::Ready,
            sites,
            entries,
        }
    }

    /// Google Translate when configured and keyed, otherwise disabled with a reason
    pub fn from_config(
        config: &AutotranslateConfig,
        sites: Arc<dyn SiteDirectory>,
        entries: Arc<dyn EntrySource>,
    ) -> Self {
        let mut availability = Availability::from_config(config);
        let gateway = if availability.is_ready() {
            match GoogleTranslateProvider::from_env_var(&config.api_key_env) {
                Ok(provider) => Some(TranslationGateway::new(Arc::new(provider))),
                Err(err) => {
                    warn!("Autotranslate unavailable: {}", err);
                    availability = Availability::Disabled(err.to_string());
                    None
                }
            }
        } else {
            None
        };

        Self {
            gateway,
            availability,
            sites,
            entries,
        }
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn options(&self) -> AutotranslateOptions {
        AutotranslateOptions {
            available: self.availability.is_ready(),
            reason: self.availability.reason().map(str::to_string),
            provider: self
                .gateway
                .as_ref()
                .map(|gateway| gateway.provider_name().to_string()),
        }
    }

    /// Translate one entry field from the source site's text into the target site's language
    pub async fn autotranslate(&self, request: &AutotranslateRequest) -> AutotranslateResponse {
        self.try_autotranslate(request).await.into()
    }

    /// Translate an ordered list of texts, keeping length and order
    pub async fn autotranslate_text(
        &self,
        request: &AutotranslateTextRequest,
    ) -> AutotranslateTextResponse {
        self.try_autotranslate_text(request).await.into()
    }

    /// Save one entry grid row, fanning each language's value out to its sites
    pub fn save_entry_row(&self, row: &EntryRowRequest) -> MtResult<usize> {
        let map = LanguageMap::from_sites(&self.sites.list_sites());
        entry::save_entry_row(self.entries.as_ref(), &map, row)
    }

    fn gateway(&self) -> MtResult<&TranslationGateway> {
        match (&self.gateway, &self.availability) {
            (Some(gateway), Availability::Ready) => Ok(gateway),
            (_, Availability::Disabled(reason)) => Err(MtError::Unavailable(reason.clone())),
            (None, Availability::Ready) => {
                Err(MtError::Unavailable("Autotranslate is disabled.".to_string()))
            }
        }
    }

    async fn try_autotranslate(&self, request: &AutotranslateRequest) -> MtResult<String> {
        let (Some(entry_id), Some(handle), Some(source_site_id), Some(target_site_id)) = (
            request.entry_id.filter(|id| *id != 0),
            request.field_handle.as_deref().filter(|h| !h.is_empty()),
            request.source_site_id.filter(|id| *id != 0),
            request.target_site_id.filter(|id| *id != 0),
        ) else {
            return Err(missing_parameters());
        };
        let gateway = self.gateway()?;

        let kind = self
            .entries
            .field_kind(handle)
            .ok_or_else(|| MtError::NotFound("Field not found.".to_string()))?;
        let mime_type = kind
            .mime_type()
            .ok_or_else(|| MtError::Unsupported("Field type not supported.".to_string()))?;

        if !self.entries.has_entry(entry_id, source_site_id) {
            return Err(MtError::NotFound("Source entry not found.".to_string()));
        }

        let (Some(source_site), Some(target_site)) = (
            self.sites.site_by_id(source_site_id),
            self.sites.site_by_id(target_site_id),
        ) else {
            return Err(MtError::InvalidRequest("Invalid site selection.".to_string()));
        };

        let text = self
            .entries
            .field_text(entry_id, handle, source_site_id)
            .unwrap_or_default();

        let source_lang = resolve_language_code(&source_site.language);
        let target_lang = resolve_language_code(&target_site.language);
        info!(
            "Autotranslating entry {} field '{}' from site {} to site {}",
            entry_id, handle, source_site.handle, target_site.handle
        );
        gateway
            .translate_one(&text, &source_lang, &target_lang, mime_type)
            .await
    }

    async fn try_autotranslate_text(
        &self,
        request: &AutotranslateTextRequest,
    ) -> MtResult<Vec<String>> {
        let (Some(texts), Some(source_lang), Some(target_lang)) = (
            request.texts.as_ref(),
            request.source_lang.as_deref().filter(|l| !l.is_empty()),
            request.target_lang.as_deref().filter(|l| !l.is_empty()),
        ) else {
            return Err(missing_parameters());
        };
        let mime_type: MimeType = request.mime_type.as_deref().unwrap_or_default().parse()?;

        if !TranslationGateway::needs_provider(texts, source_lang, target_lang) {
            return Ok(texts.clone());
        }
        self.gateway()?
            .translate_batch(texts, source_lang, target_lang, mime_type)
            .await
    }
}

impl std::fmt::Debug for Autotranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autotranslator")
            .field("gateway", &self.gateway)
            .field("availability", &self.availability)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::InMemoryEntrySource;
    use crate::field::FieldKind;
    use crate::mock::{MockMode, MockTranslator};
    use sitelang::{Site, StaticSiteDirectory};

    fn sites() -> Arc<dyn SiteDirectory> {
        Arc::new(
            StaticSiteDirectory::new(vec![
                Site::new(1, "default", "en-US"),
                Site::new(2, "taiwan", "zh-Hant"),
                Site::new(3, "france", "fr"),
            ])
            .unwrap(),
        )
    }

    fn entries() -> Arc<dyn EntrySource> {
        Arc::new(
            InMemoryEntrySource::new()
                .with_field("body", FieldKind::RichText)
                .with_field("summary", FieldKind::PlainText)
                .with_field("gallery", FieldKind::Unsupported)
                .with_entry(
                    7,
                    1,
                    "Opening hours",
                    &[("body", "<p>Open daily</p>"), ("summary", "   ")],
                ),
        )
    }

    fn service(mock: &MockTranslator) -> Autotranslator {
        Autotranslator::new(Arc::new(mock.clone()), sites(), entries())
    }

    fn request(entry: i64, handle: &str, source: i64, target: i64) -> AutotranslateRequest {
        AutotranslateRequest {
            entry_id: Some(entry),
            field_handle: Some(handle.to_string()),
            source_site_id: Some(source),
            target_site_id: Some(target),
        }
    }

    fn error_of(response: AutotranslateResponse) -> String {
        assert!(!response.success);
        response.error.unwrap()
    }

    // ========== Availability Tests ==========

    #[test]
    fn test_availability_disabled_in_config() {
        let config = AutotranslateConfig {
            enabled: false,
            api_key_env: "SITELANG_TEST_KEY_DISABLED".to_string(),
        };
        assert_eq!(
            Availability::from_config(&config).reason(),
            Some("Autotranslate is disabled.")
        );
    }

    #[test]
    fn test_availability_missing_key() {
        let config = AutotranslateConfig {
            enabled: true,
            api_key_env: "SITELANG_TEST_KEY_NEVER_SET".to_string(),
        };
        let availability = Availability::from_config(&config);
        assert!(!availability.is_ready());
        assert_eq!(
            availability.reason(),
            Some("Google Translate API key is missing.")
        );
    }

    #[tokio::test]
    async fn test_disabled_service_reports_reason() {
        let config = AutotranslateConfig {
            enabled: false,
            api_key_env: "SITELANG_TEST_KEY_DISABLED".to_string(),
        };
        let service = Autotranslator::from_config(&config, sites(), entries());
        let options = service.options();
        assert!(!options.available);
        assert!(options.provider.is_none());

        let response = service.autotranslate(&request(7, "title", 1, 3)).await;
        assert_eq!(error_of(response), "Autotranslate is disabled.");
    }

    // ========== Single Field Tests ==========

    #[tokio::test]
    async fn test_title_translated_with_resolved_languages() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let response = service(&mock).autotranslate(&request(7, "title", 1, 2)).await;
        assert_eq!(
            response,
            AutotranslateResponse {
                success: true,
                text: Some("Opening hours_zh-TW".to_string()),
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn test_rich_text_field() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let response = service(&mock).autotranslate(&request(7, "body", 1, 3)).await;
        assert_eq!(response.text.as_deref(), Some("<p>Open daily</p>_fr"));
    }

    #[tokio::test]
    async fn test_missing_parameters() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service(&mock);
        let empty = service.autotranslate(&AutotranslateRequest::default()).await;
        assert_eq!(error_of(empty), "Missing required parameters.");

        let zero_site = service.autotranslate(&request(7, "title", 0, 3)).await;
        assert_eq!(error_of(zero_site), "Missing required parameters.");
    }

    #[tokio::test]
    async fn test_field_errors() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service(&mock);
        assert_eq!(
            error_of(service.autotranslate(&request(7, "nope", 1, 3)).await),
            "Field not found."
        );
        assert_eq!(
            error_of(service.autotranslate(&request(7, "gallery", 1, 3)).await),
            "Field type not supported."
        );
    }

    #[tokio::test]
    async fn test_entry_and_site_errors() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let service = service(&mock);
        assert_eq!(
            error_of(service.autotranslate(&request(8, "title", 1, 3)).await),
            "Source entry not found."
        );
        assert_eq!(
            error_of(service.autotranslate(&request(7, "title", 1, 42)).await),
            "Invalid site selection."
        );
    }

    #[tokio::test]
    async fn test_empty_source_field() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let response = service(&mock)
            .autotranslate(&request(7, "summary", 1, 3))
            .await;
        assert_eq!(error_of(response), "Source field is empty.");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_message_passed_through() {
        let mock = MockTranslator::new(MockMode::Error("Daily limit exceeded".to_string()));
        let response = service(&mock).autotranslate(&request(7, "title", 1, 3)).await;
        assert_eq!(error_of(response), "Translation error: Daily limit exceeded");
    }

    // ========== Batch Text Tests ==========

    #[tokio::test]
    async fn test_text_batch_preserves_gaps() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let response = service(&mock)
            .autotranslate_text(&AutotranslateTextRequest {
                texts: Some(vec!["".to_string(), "Cart".to_string()]),
                source_lang: Some("en".to_string()),
                target_lang: Some("de".to_string()),
                mime_type: None,
            })
            .await;
        assert!(response.success);
        assert_eq!(
            response.translations,
            Some(vec!["".to_string(), "Cart_de".to_string()])
        );
    }

    #[tokio::test]
    async fn test_text_batch_missing_parameters() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let response = service(&mock)
            .autotranslate_text(&AutotranslateTextRequest {
                texts: Some(vec!["Cart".to_string()]),
                source_lang: Some("en".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(response.error.as_deref(), Some("Missing required parameters."));
    }

    #[tokio::test]
    async fn test_text_batch_rejects_unknown_mime_type() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let response = service(&mock)
            .autotranslate_text(&AutotranslateTextRequest {
                texts: Some(vec!["Cart".to_string()]),
                source_lang: Some("en".to_string()),
                target_lang: Some("de".to_string()),
                mime_type: Some("image/png".to_string()),
            })
            .await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("image/png"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_batch_needs_no_provider_when_disabled() {
        let config = AutotranslateConfig {
            enabled: false,
            api_key_env: "SITELANG_TEST_KEY_DISABLED".to_string(),
        };
        let service = Autotranslator::from_config(&config, sites(), entries());
        let same_language = service
            .autotranslate_text(&AutotranslateTextRequest {
                texts: Some(vec!["Hi".to_string(), "".to_string()]),
                source_lang: Some("en".to_string()),
                target_lang: Some("EN".to_string()),
                mime_type: None,
            })
            .await;
        assert_eq!(
            same_language,
            AutotranslateTextResponse {
                success: true,
                translations: Some(vec!["Hi".to_string(), "".to_string()]),
                error: None,
            }
        );

        let all_blank = service
            .autotranslate_text(&AutotranslateTextRequest {
                texts: Some(vec!["".to_string(), "  ".to_string()]),
                source_lang: Some("en".to_string()),
                target_lang: Some("fr".to_string()),
                mime_type: None,
            })
            .await;
        assert!(all_blank.success);
        assert_eq!(
            all_blank.translations,
            Some(vec!["".to_string(), "  ".to_string()])
        );

        let needs_provider = service
            .autotranslate_text(&AutotranslateTextRequest {
                texts: Some(vec!["Hi".to_string()]),
                source_lang: Some("en".to_string()),
                target_lang: Some("fr".to_string()),
                mime_type: None,
            })
            .await;
        assert_eq!(needs_provider.error.as_deref(), Some("Autotranslate is disabled."));
    }

    #[test]
    fn test_response_serialization_omits_empty_fields() {
        let ok: AutotranslateResponse = Ok("Hallo".to_string()).into();
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"success": true, "text": "Hallo"})
        );
    }
}
