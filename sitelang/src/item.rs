//! Catalog records and the canonical item shape
//!
//! `Translation` is what the store returns. `CatalogItem` is the pivot used
//! by save, import and export; it is keyed by site id at the persistence
//! boundary (`SiteItem`) and by language at the editing/export boundary
//! (`LanguageItem`).

use crate::site::SiteId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier assigned by the store to a translation key
pub type TranslationId = i64;

/// Group used when a translation has none
pub const DEFAULT_GROUP: &str = "site";

/// A stored translation key with its per-site values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub id: TranslationId,
    pub key: String,
    pub group: Option<String>,
    pub description: Option<String>,
    pub values: BTreeMap<SiteId, String>,
}

impl Translation {
    /// The stored group, or [`DEFAULT_GROUP`] when none is set
    pub fn group_or_default(&self) -> &str {
        self.group.as_deref().unwrap_or(DEFAULT_GROUP)
    }
}

/// Canonical item used for saving, importing and exporting
///
/// `group` and `description` distinguish "absent" (`None`) from "explicitly
/// set" (`Some`, where an empty string clears the stored value). An explicit
/// JSON `null` counts as set and clears. `key` may be omitted on deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem<K: Ord> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TranslationId>,
    #[serde(default)]
    pub key: String,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<K, String>,
    /// Delete the translation identified by `id` and ignore everything else
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub delete: bool,
    /// Keep stored group/description unless this item carries them explicitly
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub preserve_meta: bool,
}

/// Present-but-null reads as an empty value; only a missing field stays `None`
fn null_as_cleared<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::<String>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Item keyed by site id, as persisted
pub type SiteItem = CatalogItem<SiteId>;

/// Item keyed by language code, as edited and exchanged
pub type LanguageItem = CatalogItem<String>;

impl<K: Ord> CatalogItem<K> {
    pub fn new(key: &str) -> Self {
        CatalogItem {
            id: None,
            key: key.to_string(),
            group: None,
            description: None,
            values: BTreeMap::new(),
            delete: false,
            preserve_meta: false,
        }
    }

    pub fn with_id(mut self, id: TranslationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_value(mut self, at: K, value: &str) -> Self {
        self.values.insert(at, value.to_string());
        self
    }

    pub fn preserving_meta(mut self) -> Self {
        self.preserve_meta = true;
        self
    }

    /// An item that deletes the translation `id`
    pub fn deletion(id: TranslationId) -> Self {
        CatalogItem {
            id: Some(id),
            delete: true,
            ..CatalogItem::new("")
        }
    }
}
