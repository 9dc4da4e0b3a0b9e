//! Content entries whose fields get autotranslated and edited per language

use crate::error::{MtError, MtResult};
use crate::field::FieldKind;
use serde::Deserialize;
use sitelang::{LanguageMap, SiteId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

pub type EntryId = i64;

/// Handle of the built-in title field
pub const TITLE_FIELD: &str = "title";

/// Host content the autotranslate service reads from and the entry grid writes to
pub trait EntrySource: Send + Sync {
    /// Kind of the field named `handle`; `None` if no such field exists
    fn field_kind(&self, handle: &str) -> Option<FieldKind>;

    /// Whether the entry exists at `site_id`
    fn has_entry(&self, entry_id: EntryId, site_id: SiteId) -> bool;

    /// The field's text for the entry at `site_id`
    fn field_text(&self, entry_id: EntryId, handle: &str, site_id: SiteId) -> Option<String>;

    /// Store `text` in the field at `site_id`; false when the entry does not exist there
    fn set_field_text(
        &self,
        entry_id: EntryId,
        handle: &str,
        site_id: SiteId,
        text: &str,
    ) -> bool;
}

/// One edited row of the entry grid: a field's value per language
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryRowRequest {
    pub entry_id: Option<EntryId>,
    pub field_handle: Option<String>,
    pub values: BTreeMap<String, String>,
}

/// Write each language's value to the entry on every site of that language
///
/// Unknown languages and sites where the entry does not exist are skipped.
/// Returns the number of sites written.
pub fn save_entry_row(
    entries: &dyn EntrySource,
    map: &LanguageMap,
    row: &EntryRowRequest,
) -> MtResult<usize> {
    let (Some(entry_id), Some(handle)) = (
        row.entry_id.filter(|id| *id != 0),
        row.field_handle.as_deref().filter(|h| !h.is_empty()),
    ) else {
        return Err(MtError::InvalidRequest("Missing entry data.".to_string()));
    };

    let mut saved = 0;
    for (language, value) in &row.values {
        let Some(site_ids) = map.sites_for(language) else {
            debug!("Skipping value for unknown language '{}'", language);
            continue;
        };
        for site_id in site_ids {
            if entries.set_field_text(entry_id, handle, *site_id, value) {
                saved += 1;
            }
        }
    }

    info!("Saved entry {} field '{}' on {} sites", entry_id, handle, saved);
    Ok(saved)
}

/// One entry as stored for one site
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord {
    id: EntryId,
    site_id: SiteId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    fields: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct EntryFixture {
    #[serde(default)]
    fields: HashMap<String, FieldKind>,
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

/// Entry source backed by a JSON document
///
/// ```json
/// {
///   "fields": { "body": "richText", "summary": "plainText" },
///   "entries": [
///     { "id": 10, "siteId": 1, "title": "Hello", "fields": { "body": "<p>Hi</p>" } }
///   ]
/// }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEntrySource {
    kinds: HashMap<String, FieldKind>,
    entries: RwLock<HashMap<(EntryId, SiteId), EntryRecord>>,
}

impl InMemoryEntrySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(content: &str) -> MtResult<Self> {
        let fixture: EntryFixture = serde_json::from_str(content)
            .map_err(|e| MtError::ConfigError(format!("Invalid entry fixture: {}", e)))?;

        let entries = fixture
            .entries
            .into_iter()
            .map(|entry| ((entry.id, entry.site_id), entry))
            .collect();
        Ok(Self {
            kinds: fixture.fields,
            entries: RwLock::new(entries),
        })
    }

    pub fn load(path: &Path) -> MtResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MtError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn with_field(mut self, handle: &str, kind: FieldKind) -> Self {
        self.kinds.insert(handle.to_string(), kind);
        self
    }

    pub fn with_entry(
        mut self,
        id: EntryId,
        site_id: SiteId,
        title: &str,
        fields: &[(&str, &str)],
    ) -> Self {
        let record = EntryRecord {
            id,
            site_id,
            title: title.to_string(),
            fields: fields
                .iter()
                .map(|(handle, text)| (handle.to_string(), text.to_string()))
                .collect(),
        };
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((id, site_id), record);
        self
    }
}

impl EntrySource for InMemoryEntrySource {
    fn field_kind(&self, handle: &str) -> Option<FieldKind> {
        if handle == TITLE_FIELD {
            return Some(FieldKind::Title);
        }
        self.kinds.get(handle).copied()
    }

    fn has_entry(&self, entry_id: EntryId, site_id: SiteId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(entry_id, site_id))
    }

    fn field_text(&self, entry_id: EntryId, handle: &str, site_id: SiteId) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(&(entry_id, site_id))?;
        if handle == TITLE_FIELD {
            return Some(entry.title.clone());
        }
        entry.fields.get(handle).cloned()
    }

    fn set_field_text(
        &self,
        entry_id: EntryId,
        handle: &str,
        site_id: SiteId,
        text: &str,
    ) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = entries.get_mut(&(entry_id, site_id)) else {
            return false;
        };
        if handle == TITLE_FIELD {
            entry.title = text.to_string();
        } else {
            entry.fields.insert(handle.to_string(), text.to_string());
        }
        true
    }
}
