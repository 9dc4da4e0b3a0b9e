//! Site directory abstraction
//!
//! A deployment is made of several sites, each publishing in one language.
//! The host owns the sites; the catalog only reads an ordered snapshot of them.

use serde::{Deserialize, Serialize};

/// Identifier of a host site
pub type SiteId = i64;

/// A site as seen by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub handle: String,
    /// BCP 47 language code, e.g. "en", "en-GB", "fr"
    pub language: String,
}

impl Site {
    pub fn new(id: SiteId, handle: &str, language: &str) -> Self {
        Site {
            id,
            handle: handle.to_string(),
            language: language.to_string(),
        }
    }
}

/// Read-only access to the host's sites
///
/// `list_sites` must return sites in the host's configured order; the
/// reconciliation engine relies on that order when several sites share a
/// language.
pub trait SiteDirectory: Send + Sync {
    fn list_sites(&self) -> Vec<Site>;

    fn primary_site(&self) -> Site;

    fn site_by_id(&self, id: SiteId) -> Option<Site> {
        self.list_sites().into_iter().find(|site| site.id == id)
    }
}

/// A fixed list of sites, usually loaded from configuration
#[derive(Debug, Clone)]
pub struct StaticSiteDirectory {
    sites: Vec<Site>,
    primary: usize,
}

impl StaticSiteDirectory {
    /// Build a directory whose primary site is the first one listed.
    ///
    /// Returns `None` when `sites` is empty.
    pub fn new(sites: Vec<Site>) -> Option<Self> {
        if sites.is_empty() {
            return None;
        }
        Some(StaticSiteDirectory { sites, primary: 0 })
    }

    /// Build a directory with an explicit primary site.
    ///
    /// Returns `None` when `primary_id` is not one of `sites`.
    pub fn with_primary(sites: Vec<Site>, primary_id: SiteId) -> Option<Self> {
        let primary = sites.iter().position(|site| site.id == primary_id)?;
        Some(StaticSiteDirectory { sites, primary })
    }
}

impl SiteDirectory for StaticSiteDirectory {
    fn list_sites(&self) -> Vec<Site> {
        self.sites.clone()
    }

    fn primary_site(&self) -> Site {
        self.sites[self.primary].clone()
    }
}
