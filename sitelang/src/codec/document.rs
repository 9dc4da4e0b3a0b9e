//! JSON document: `{ "<key>": { "group": ..., "translations": { "<language>": "<value>" } } }`

use crate::error::{CatalogError, CatalogResult};
use crate::item::{DEFAULT_GROUP, LanguageItem};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct DocumentEntry<'a> {
    group: Option<&'a str>,
    translations: BTreeMap<&'a str, &'a str>,
}

/// Pretty-printed, non-ASCII characters left unescaped
pub fn encode(items: &[LanguageItem], languages: &[String]) -> CatalogResult<Vec<u8>> {
    let document: BTreeMap<&str, DocumentEntry<'_>> = items
        .iter()
        .map(|item| {
            let translations = languages
                .iter()
                .map(|language| {
                    let value = item.values.get(language).map(String::as_str).unwrap_or("");
                    (language.as_str(), value)
                })
                .collect();
            (
                item.key.as_str(),
                DocumentEntry {
                    group: item.group.as_deref(),
                    translations,
                },
            )
        })
        .collect();

    serde_json::to_vec_pretty(&document)
        .map_err(|e| CatalogError::Format(format!("Failed to encode JSON: {}", e)))
}

pub fn decode(bytes: &[u8]) -> CatalogResult<Vec<LanguageItem>> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| CatalogError::Format(format!("Invalid JSON payload: {}", e)))?;
    let entries = document
        .as_object()
        .ok_or_else(|| CatalogError::Format("Invalid JSON payload: root must be an object".to_string()))?;

    let mut items = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let entry = entry.as_object().ok_or_else(|| {
            CatalogError::Format(format!("Invalid JSON payload: entry '{}' must be an object", key))
        })?;

        let group = entry
            .get("group")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_GROUP);

        let mut item = LanguageItem::new(key).with_group(group);
        if let Some(translations) = entry.get("translations").and_then(Value::as_object) {
            for (language, value) in translations {
                item.values.insert(language.clone(), scalar_to_string(value));
            }
        }
        items.push(item);
    }

    Ok(items)
}

/// Non-string scalars are accepted and stringified; null and containers become ""
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
