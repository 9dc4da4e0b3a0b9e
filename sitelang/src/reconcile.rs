//! Site <-> language reconciliation
//!
//! Editors and interchange files author one value per *language*; the store
//! keeps one value per *site*. [`expand`] fans a language value out to every
//! site of that language, and [`collapse`] picks one representative value
//! per language for display and export.
//!
//! Language is the unit of authorship: two sites sharing a language always
//! receive the same text through this path, and any divergence between them
//! is overwritten on the next save.

use crate::item::{CatalogItem, LanguageItem, SiteItem, Translation};
use crate::language_map::LanguageMap;
use crate::site::SiteId;
use std::collections::BTreeMap;
use tracing::debug;

/// Turn language-keyed items into site-keyed items
///
/// Languages without a site in `map` are dropped.
pub fn expand(items: Vec<LanguageItem>, map: &LanguageMap) -> Vec<SiteItem> {
    items
        .into_iter()
        .map(|item| expand_item(item, map))
        .collect()
}

pub fn expand_item(item: LanguageItem, map: &LanguageMap) -> SiteItem {
    let mut values = BTreeMap::new();
    for (language, value) in &item.values {
        let Some(site_ids) = map.sites_for(language) else {
            debug!(
                "Dropping value for unknown language '{}' on key '{}'",
                language, item.key
            );
            continue;
        };
        for site_id in site_ids {
            values.insert(*site_id, value.clone());
        }
    }

    CatalogItem {
        id: item.id,
        key: item.key,
        group: item.group,
        description: item.description,
        values,
        delete: item.delete,
        preserve_meta: item.preserve_meta,
    }
}

/// One value per known language, taken from the first site (in directory
/// order) of that language holding a non-empty value; "" when none does
pub fn collapse(values: &BTreeMap<SiteId, String>, map: &LanguageMap) -> BTreeMap<String, String> {
    map.by_language()
        .iter()
        .map(|(language, site_ids)| {
            let value = site_ids
                .iter()
                .filter_map(|site_id| values.get(site_id))
                .find(|value| !value.is_empty())
                .cloned()
                .unwrap_or_default();
            (language.clone(), value)
        })
        .collect()
}

/// A stored translation as a language-keyed item
pub fn collapse_translation(translation: &Translation, map: &LanguageMap) -> LanguageItem {
    CatalogItem {
        id: Some(translation.id),
        key: translation.key.clone(),
        group: translation.group.clone(),
        description: translation.description.clone(),
        values: collapse(&translation.values, map),
        delete: false,
        preserve_meta: false,
    }
}

pub fn collapse_all(translations: &[Translation], map: &LanguageMap) -> Vec<LanguageItem> {
    translations
        .iter()
        .map(|translation| collapse_translation(translation, map))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;

    fn map() -> LanguageMap {
        LanguageMap::from_sites(&[
            Site::new(1, "default", "en"),
            Site::new(2, "us", "en"),
            Site::new(3, "france", "fr"),
        ])
    }

    // ========== Expand Tests ==========

    #[test]
    fn test_expand_fans_out_to_every_site_of_language() {
        let item = LanguageItem::new("greeting").with_value("en".to_string(), "Hi");
        let expanded = expand(vec![item], &map());
        assert_eq!(expanded.len(), 1);
        let values = &expanded[0].values;
        assert_eq!(values.get(&1).map(String::as_str), Some("Hi"));
        assert_eq!(values.get(&2).map(String::as_str), Some("Hi"));
        assert!(!values.contains_key(&3));
    }

    #[test]
    fn test_expand_drops_unknown_languages() {
        let item = LanguageItem::new("greeting")
            .with_value("de".to_string(), "Hallo")
            .with_value("fr".to_string(), "Salut");
        let expanded = expand_item(item, &map());
        assert_eq!(expanded.values.len(), 1);
        assert_eq!(expanded.values.get(&3).map(String::as_str), Some("Salut"));
    }

    #[test]
    fn test_expand_keeps_metadata_and_flags() {
        let item = LanguageItem::new("greeting")
            .with_id(9)
            .with_group("ui")
            .with_description("Shown on login")
            .preserving_meta();
        let expanded = expand_item(item, &map());
        assert_eq!(expanded.id, Some(9));
        assert_eq!(expanded.group.as_deref(), Some("ui"));
        assert_eq!(expanded.description.as_deref(), Some("Shown on login"));
        assert!(expanded.preserve_meta);
    }

    #[test]
    fn test_expand_keeps_empty_values_for_deletion() {
        let item = LanguageItem::new("greeting").with_value("fr".to_string(), "");
        let expanded = expand_item(item, &map());
        assert_eq!(expanded.values.get(&3).map(String::as_str), Some(""));
    }

    // ========== Collapse Tests ==========

    #[test]
    fn test_collapse_takes_first_site_with_value() {
        let values = BTreeMap::from([(2, "Howdy".to_string()), (1, "Hello".to_string())]);
        let collapsed = collapse(&values, &map());
        assert_eq!(collapsed.get("en").map(String::as_str), Some("Hello"));
    }

    #[test]
    fn test_collapse_skips_sites_without_value() {
        let values = BTreeMap::from([(2, "Howdy".to_string())]);
        let collapsed = collapse(&values, &map());
        assert_eq!(collapsed.get("en").map(String::as_str), Some("Howdy"));
    }

    #[test]
    fn test_collapse_fills_missing_languages_with_empty() {
        let values = BTreeMap::from([(1, "Hello".to_string())]);
        let collapsed = collapse(&values, &map());
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed.get("fr").map(String::as_str), Some(""));
    }

    #[test]
    fn test_collapse_ignores_sites_outside_directory() {
        let values = BTreeMap::from([(99, "Orphan".to_string())]);
        let collapsed = collapse(&values, &map());
        assert!(collapsed.values().all(String::is_empty));
    }

    #[test]
    fn test_collapse_translation() {
        let translation = Translation {
            id: 5,
            key: "nav.home".to_string(),
            group: Some("nav".to_string()),
            description: None,
            values: BTreeMap::from([(3, "Accueil".to_string())]),
        };
        let item = collapse_translation(&translation, &map());
        assert_eq!(item.id, Some(5));
        assert_eq!(item.group.as_deref(), Some("nav"));
        assert_eq!(item.values.get("fr").map(String::as_str), Some("Accueil"));
        assert_eq!(item.values.get("en").map(String::as_str), Some(""));
    }

    #[test]
    fn test_expand_then_collapse_is_stable() {
        let item = LanguageItem::new("k")
            .with_value("en".to_string(), "Yes")
            .with_value("fr".to_string(), "Oui");
        let expanded = expand_item(item.clone(), &map());
        assert_eq!(collapse(&expanded.values, &map()), item.values);
    }
}
