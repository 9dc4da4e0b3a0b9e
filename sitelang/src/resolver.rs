//! Fallback resolution with a per-operation lookup cache
//!
//! A [`Resolver`] borrows the store mutably for the length of one logical
//! operation (a page render, a CLI command). Lookups are memoised in a
//! [`RequestCache`] owned by the resolver; the cache dies with it. Mutations
//! made through the resolver clear the cache, and the exclusive borrow keeps
//! anything else from writing to the store while a resolver is alive.
//!
//! # Example
//!
//! ```ignore
//! let mut resolver = store.resolver(primary_site_id);
//! let text = resolver.resolve("cart.items", site_id, &params, ResolveOptions::default())?;
//! ```

use crate::error::CatalogResult;
use crate::item::{SiteItem, TranslationId};
use crate::site::SiteId;
use crate::store::CatalogStore;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// Controls the fallback chain of [`Resolver::resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Use the primary site's value when the requested site has none
    pub fallback_to_primary: bool,
    /// Register unknown keys so they show up for editing
    pub create_if_missing: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            fallback_to_primary: true,
            create_if_missing: true,
        }
    }
}

impl ResolveOptions {
    pub fn without_fallback(mut self) -> Self {
        self.fallback_to_primary = false;
        self
    }

    pub fn without_create(mut self) -> Self {
        self.create_if_missing = false;
        self
    }
}

/// `(site, key) -> value-or-absent`, scoped to one operation
#[derive(Debug, Default)]
pub struct RequestCache {
    entries: HashMap<(SiteId, String), Option<String>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, site_id: SiteId, key: &str) -> Option<&Option<String>> {
        self.entries.get(&(site_id, key.to_string()))
    }

    fn insert(&mut self, site_id: SiteId, key: &str, value: Option<String>) {
        self.entries.insert((site_id, key.to_string()), value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogStore {
    /// Start a resolution scope against `primary_site`
    pub fn resolver(&mut self, primary_site: SiteId) -> Resolver<'_> {
        Resolver {
            store: self,
            primary_site,
            cache: RequestCache::new(),
        }
    }
}

#[derive(Debug)]
pub struct Resolver<'a> {
    store: &'a mut CatalogStore,
    primary_site: SiteId,
    cache: RequestCache,
}

impl Resolver<'_> {
    /// Resolve `key` for `site_id`, substituting `{name}` placeholders from `params`
    ///
    /// Never fails to produce text: when no value exists anywhere the key
    /// itself is returned.
    pub fn resolve(
        &mut self,
        key: &str,
        site_id: SiteId,
        params: &HashMap<String, String>,
        options: ResolveOptions,
    ) -> CatalogResult<String> {
        let value = self
            .value_with_fallback(key, site_id, options)?
            .unwrap_or_else(|| key.to_string());
        Ok(substitute_placeholders(&value, params))
    }

    /// The fallback chain without passthrough or placeholder substitution
    pub fn value_with_fallback(
        &mut self,
        key: &str,
        site_id: SiteId,
        options: ResolveOptions,
    ) -> CatalogResult<Option<String>> {
        let mut value = self.lookup(key, site_id)?;

        if value.is_none() && options.fallback_to_primary && self.primary_site != site_id {
            value = self.lookup(key, self.primary_site)?;
        }

        if value.is_none() && options.create_if_missing {
            self.store.ensure_key_exists(key)?;
        }

        Ok(value)
    }

    pub fn save_batch(&mut self, items: &[SiteItem]) -> CatalogResult<()> {
        let result = self.store.save_batch(items);
        self.cache.clear();
        result
    }

    pub fn delete_by_id(&mut self, id: TranslationId) -> CatalogResult<bool> {
        let result = self.store.delete_by_id(id);
        self.cache.clear();
        result
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    fn lookup(&mut self, key: &str, site_id: SiteId) -> CatalogResult<Option<String>> {
        if let Some(cached) = self.cache.get(site_id, key) {
            debug!("Cache hit for '{}' at site {}", key, site_id);
            return Ok(cached.clone());
        }
        let value = self.store.value(key, site_id)?;
        self.cache.insert(site_id, key, value.clone());
        Ok(value)
    }
}

/// Replace `{name}` tokens with entries of `params`; unknown tokens stay as they are
pub fn substitute_placeholders(text: &str, params: &HashMap<String, String>) -> String {
    if params.is_empty() {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TranslationQuery;

    const PRIMARY: SiteId = 1;
    const SECONDARY: SiteId = 2;

    fn store() -> CatalogStore {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store
            .save_batch(&[
                SiteItem::new("welcome").with_value(PRIMARY, "Welcome"),
                SiteItem::new("cart.items")
                    .with_value(PRIMARY, "{count} items in {place}")
                    .with_value(SECONDARY, "{count} articles"),
            ])
            .unwrap();
        store
    }

    fn no_params() -> HashMap<String, String> {
        HashMap::new()
    }

    // ========== Fallback Chain Tests ==========

    #[test]
    fn test_local_value_wins() {
        let mut store = store();
        let mut resolver = store.resolver(PRIMARY);
        let text = resolver
            .resolve("cart.items", SECONDARY, &no_params(), ResolveOptions::default())
            .unwrap();
        assert_eq!(text, "{count} articles");
    }

    #[test]
    fn test_falls_back_to_primary() {
        let mut store = store();
        let mut resolver = store.resolver(PRIMARY);
        let text = resolver
            .resolve("welcome", SECONDARY, &no_params(), ResolveOptions::default())
            .unwrap();
        assert_eq!(text, "Welcome");
    }

    #[test]
    fn test_no_fallback_returns_key() {
        let mut store = store();
        let mut resolver = store.resolver(PRIMARY);
        let text = resolver
            .resolve(
                "welcome",
                SECONDARY,
                &no_params(),
                ResolveOptions::default().without_fallback(),
            )
            .unwrap();
        assert_eq!(text, "welcome");
    }

    #[test]
    fn test_missing_key_is_created_and_passed_through() {
        let mut store = store();
        {
            let mut resolver = store.resolver(PRIMARY);
            let text = resolver
                .resolve("brand.new", SECONDARY, &no_params(), ResolveOptions::default())
                .unwrap();
            assert_eq!(text, "brand.new");
        }
        let created = store.find_by_key("brand.new").unwrap().unwrap();
        assert!(created.values.is_empty());
    }

    #[test]
    fn test_missing_key_not_created_when_disabled() {
        let mut store = store();
        {
            let mut resolver = store.resolver(PRIMARY);
            let value = resolver
                .value_with_fallback(
                    "ghost",
                    PRIMARY,
                    ResolveOptions::default().without_create(),
                )
                .unwrap();
            assert_eq!(value, None);
        }
        assert!(store.find_by_key("ghost").unwrap().is_none());
        assert_eq!(store.count(&TranslationQuery::new()).unwrap(), 2);
    }

    // ========== Placeholder Tests ==========

    #[test]
    fn test_placeholders_substituted() {
        let mut store = store();
        let mut resolver = store.resolver(PRIMARY);
        let params = HashMap::from([
            ("count".to_string(), "3".to_string()),
            ("place".to_string(), "your cart".to_string()),
        ]);
        let text = resolver
            .resolve("cart.items", PRIMARY, &params, ResolveOptions::default())
            .unwrap();
        assert_eq!(text, "3 items in your cart");
    }

    #[test]
    fn test_unknown_placeholder_left_intact() {
        let params = HashMap::from([("count".to_string(), "2".to_string())]);
        assert_eq!(
            substitute_placeholders("{count} of {total}", &params),
            "2 of {total}"
        );
    }

    #[test]
    fn test_placeholder_values_not_reexpanded() {
        let params = HashMap::from([
            ("a".to_string(), "{b}".to_string()),
            ("b".to_string(), "x".to_string()),
        ]);
        assert_eq!(substitute_placeholders("{a}", &params), "{b}");
    }

    // ========== Cache Tests ==========

    #[test]
    fn test_lookups_are_cached() {
        let mut store = store();
        let mut resolver = store.resolver(PRIMARY);
        resolver
            .value_with_fallback("welcome", SECONDARY, ResolveOptions::default())
            .unwrap();
        // Secondary miss and primary hit are both remembered
        assert_eq!(resolver.cache().len(), 2);
        resolver
            .value_with_fallback("welcome", SECONDARY, ResolveOptions::default())
            .unwrap();
        assert_eq!(resolver.cache().len(), 2);
    }

    #[test]
    fn test_save_invalidates_cache() {
        let mut store = store();
        let mut resolver = store.resolver(PRIMARY);
        let before = resolver
            .value_with_fallback("welcome", PRIMARY, ResolveOptions::default())
            .unwrap();
        assert_eq!(before.as_deref(), Some("Welcome"));

        resolver
            .save_batch(&[SiteItem::new("welcome").with_value(PRIMARY, "Hello there")])
            .unwrap();
        assert!(resolver.cache().is_empty());

        let after = resolver
            .value_with_fallback("welcome", PRIMARY, ResolveOptions::default())
            .unwrap();
        assert_eq!(after.as_deref(), Some("Hello there"));
    }

    #[test]
    fn test_emptied_value_is_absent_not_empty() {
        let mut store = store();
        let mut resolver = store.resolver(PRIMARY);
        resolver
            .save_batch(&[SiteItem::new("cart.items").with_value(SECONDARY, "")])
            .unwrap();
        let value = resolver
            .value_with_fallback(
                "cart.items",
                SECONDARY,
                ResolveOptions::default().without_fallback(),
            )
            .unwrap();
        assert_eq!(value, None);
    }
}
