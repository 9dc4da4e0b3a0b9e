//! ZIP archive of per-language, per-group maps
//!
//! Each entry lives at `translations/<language>/<group>.json` and holds a
//! JSON object `key -> value` for that language and group.

use crate::error::{CatalogError, CatalogResult};
use crate::item::{DEFAULT_GROUP, LanguageItem};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const ROOT: &str = "translations";
const EXTENSION: &str = ".json";

pub fn entry_path(language: &str, group: &str) -> String {
    format!("{}/{}/{}{}", ROOT, language, group, EXTENSION)
}

/// `(language, group)` of an entry path, if it follows the layout
fn parse_entry_path(name: &str) -> Option<(&str, &str)> {
    let mut parts = name.trim_start_matches("./").split('/');
    let (root, language, file) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || root != ROOT || language.is_empty() {
        return None;
    }
    let group = file.strip_suffix(EXTENSION)?;
    if group.is_empty() {
        return None;
    }
    Some((language, group))
}

/// One file per language and group present in `items`, empty maps included
pub fn encode(items: &[LanguageItem], languages: &[String]) -> CatalogResult<Vec<u8>> {
    let groups: BTreeSet<&str> = items
        .iter()
        .map(|item| item.group.as_deref().unwrap_or(DEFAULT_GROUP))
        .collect();

    if let Some(bad) = groups.iter().find(|group| group.contains(['/', '\\'])) {
        return Err(CatalogError::Validation(format!(
            "Group '{}' cannot be used as an archive file name",
            bad
        )));
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for language in languages {
        for group in &groups {
            let map: BTreeMap<&str, &str> = items
                .iter()
                .filter(|item| item.group.as_deref().unwrap_or(DEFAULT_GROUP) == *group)
                .map(|item| {
                    let value = item.values.get(language).map(String::as_str).unwrap_or("");
                    (item.key.as_str(), value)
                })
                .collect();

            let mut content = serde_json::to_vec_pretty(&map)
                .map_err(|e| CatalogError::Format(format!("Failed to encode map: {}", e)))?;
            content.push(b'\n');

            writer.start_file(entry_path(language, group), options)?;
            writer.write_all(&content)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}

/// Merge every map in the archive into one item per key
///
/// Items carry the group of the file they were last seen in and keep any
/// stored description.
pub fn decode(bytes: &[u8]) -> CatalogResult<Vec<LanguageItem>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut items: BTreeMap<String, LanguageItem> = BTreeMap::new();

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        let Some((language, group)) = parse_entry_path(&name) else {
            debug!("Ignoring archive entry '{}'", name);
            continue;
        };

        let mut content = String::new();
        file.read_to_string(&mut content)?;
        let map: Value = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Format(format!("Invalid map in '{}': {}", name, e)))?;
        let Some(map) = map.as_object() else {
            return Err(CatalogError::Format(format!(
                "Archive entry '{}' is not a key/value map",
                name
            )));
        };

        for (key, value) in map {
            let item = items
                .entry(key.clone())
                .or_insert_with(|| LanguageItem::new(key).preserving_meta());
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            item.values.insert(language.to_string(), value);
            item.group = Some(group.to_string());
        }
    }

    Ok(items.into_values().collect())
}
