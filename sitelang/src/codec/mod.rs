//! Interchange codec
//!
//! Converts between language-keyed [`LanguageItem`]s and the exchange
//! formats: a CSV table ([`table`]), a JSON document ([`document`]) and a
//! ZIP archive holding one map per language and group ([`archive`]).
//!
//! The format is always chosen by the caller; payloads are never sniffed.
//! Everything is encoded and decoded in memory, so no temporary files are
//! left behind on any path.

pub mod archive;
pub mod document;
pub mod table;

use crate::error::{CatalogError, CatalogResult};
use crate::item::LanguageItem;
use crate::language_map::LanguageMap;
use crate::reconcile;
use crate::site::Site;
use crate::store::{CatalogStore, TranslationQuery};
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    /// ZIP of `translations/<language>/<group>.json`
    Archive,
}

impl Format {
    pub fn file_name(&self) -> &'static str {
        match self {
            Format::Csv => "translations.csv",
            Format::Json => "translations.json",
            Format::Archive => "translations-php.zip",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Csv => "text/csv",
            Format::Json => "application/json",
            Format::Archive => "application/zip",
        }
    }
}

impl FromStr for Format {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            // "php" is the archive's historical name
            "zip" | "php" => Ok(Format::Archive),
            other => Err(CatalogError::Validation(format!(
                "Unsupported format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Csv => write!(f, "csv"),
            Format::Json => write!(f, "json"),
            Format::Archive => write!(f, "zip"),
        }
    }
}

/// Serialize items; `languages` fixes the language columns/files, sorted ascending
pub fn encode(
    format: Format,
    items: &[LanguageItem],
    languages: &[String],
) -> CatalogResult<Vec<u8>> {
    match format {
        Format::Csv => table::encode(items, languages),
        Format::Json => document::encode(items, languages),
        Format::Archive => archive::encode(items, languages),
    }
}

pub fn decode(format: Format, bytes: &[u8]) -> CatalogResult<Vec<LanguageItem>> {
    match format {
        Format::Csv => table::decode(bytes),
        Format::Json => document::decode(bytes),
        Format::Archive => archive::decode(bytes),
    }
}

/// Export the whole catalog, one value per language
pub fn export_catalog(
    store: &CatalogStore,
    sites: &[Site],
    format: Format,
) -> CatalogResult<Vec<u8>> {
    let map = LanguageMap::from_sites(sites);
    let translations = store.list(&TranslationQuery::new())?;
    let items = reconcile::collapse_all(&translations, &map);
    info!("Exporting {} translations as {}", items.len(), format);
    encode(format, &items, &map.languages())
}

/// Decode, fan out to sites and save atomically; returns the number of items saved
pub fn import_catalog(
    store: &mut CatalogStore,
    sites: &[Site],
    format: Format,
    bytes: &[u8],
) -> CatalogResult<usize> {
    if bytes.is_empty() {
        return Err(CatalogError::Validation("No file uploaded.".to_string()));
    }
    let map = LanguageMap::from_sites(sites);
    let items = reconcile::expand(decode(format, bytes)?, &map);
    store.save_batch(&items)?;
    info!("Imported {} translations from {}", items.len(), format);
    Ok(items.len())
}
