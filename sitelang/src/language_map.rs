//! Language map builder
//!
//! Derives `language -> [site ids]` and `site id -> language` from a site
//! directory snapshot. The map holds no state of its own and is rebuilt for
//! every operation that needs it.

use crate::site::{Site, SiteId};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
pub struct LanguageMap {
    by_language: BTreeMap<String, Vec<SiteId>>,
    by_site: HashMap<SiteId, String>,
}

impl LanguageMap {
    pub fn from_sites(sites: &[Site]) -> Self {
        let mut map = LanguageMap::default();
        for site in sites {
            let ids = map.by_language.entry(site.language.clone()).or_default();
            if !ids.contains(&site.id) {
                ids.push(site.id);
            }
            map.by_site.insert(site.id, site.language.clone());
        }
        map
    }

    /// Sites publishing `language`, in directory order
    pub fn sites_for(&self, language: &str) -> Option<&[SiteId]> {
        self.by_language.get(language).map(|ids| ids.as_slice())
    }

    pub fn language_of(&self, site_id: SiteId) -> Option<&str> {
        self.by_site.get(&site_id).map(|language| language.as_str())
    }

    /// Distinct languages, sorted ascending
    pub fn languages(&self) -> Vec<String> {
        self.by_language.keys().cloned().collect()
    }

    pub fn by_language(&self) -> &BTreeMap<String, Vec<SiteId>> {
        &self.by_language
    }

    pub fn by_site(&self) -> &HashMap<SiteId, String> {
        &self.by_site
    }

    pub fn is_empty(&self) -> bool {
        self.by_site.is_empty()
    }
}
