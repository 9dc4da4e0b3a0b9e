//! Localized string catalog for multi-site deployments
//!
//! A catalog holds translation keys, each with an optional group and
//! description and zero or more per-site values. Several sites may share a
//! language; editing and interchange happen per language, storage per site.
//!
//! # Overview
//!
//! 1. **Site directory** ([`site`]) - the host's ordered sites
//! 2. **Language map** ([`language_map`]) - `language -> sites` and back
//! 3. **Catalog store** ([`store`]) - SQLite persistence with atomic batch saves
//! 4. **Resolver** ([`resolver`]) - fallback lookups with a per-operation cache
//! 5. **Reconciliation** ([`reconcile`]) - language/site expansion and collapse
//! 6. **Interchange codec** ([`codec`]) - CSV, JSON and ZIP import/export
//!
//! # Example
//!
//! ```ignore
//! use sitelang::{CatalogStore, LanguageItem, LanguageMap, Site, reconcile};
//!
//! let sites = vec![Site::new(1, "default", "en"), Site::new(2, "us", "en")];
//! let map = LanguageMap::from_sites(&sites);
//!
//! let mut store = CatalogStore::open_in_memory()?;
//! let item = LanguageItem::new("greeting").with_value("en".to_string(), "Hi");
//! store.save_batch(&reconcile::expand(vec![item], &map))?;
//!
//! assert_eq!(store.value("greeting", 2)?.as_deref(), Some("Hi"));
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod item;
pub mod language_map;
pub mod paging;
pub mod reconcile;
pub mod resolver;
pub mod site;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use codec::{Format, decode, encode, export_catalog, import_catalog};
pub use config::{AutotranslateConfig, CatalogConfig};
pub use error::{CatalogError, CatalogResult};
pub use item::{
    CatalogItem, DEFAULT_GROUP, LanguageItem, SiteItem, Translation, TranslationId,
};
pub use language_map::LanguageMap;
pub use paging::Page;
pub use resolver::{RequestCache, ResolveOptions, Resolver, substitute_placeholders};
pub use site::{Site, SiteDirectory, SiteId, StaticSiteDirectory};
pub use store::{CatalogStore, TranslationQuery};
