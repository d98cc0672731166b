//! Component I: the referential index (§4.I). Populated during lowering and linking;
//! this module owns storage and reverse lookup only — site construction and
//! `resourceKey` formatting happen where the sites are produced, using
//! `viewc_core::semantics::{catalog_key, bindable_catalog_key}`.
//!
//! `sites` is kept sorted by `(uri, span.start)` at all times rather than sorted on
//! read: the `allSites()` ordering invariant holds continuously, not just at query
//! time, so a caller iterating mid-update never observes an unsorted snapshot.

pub mod harvest;

pub use harvest::harvest_template_sites;

use indexmap::IndexMap;
use viewc_core::ids::DocumentUri;
use viewc_core::refsite::TextReferenceSite;

#[derive(Debug, Default)]
pub struct ReferentialIndex {
    sites: Vec<TextReferenceSite>,
    by_key: IndexMap<String, Vec<usize>>,
}

impl ReferentialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, site: TextReferenceSite) {
        let pos = self.sites.partition_point(|existing| existing.sort_key() < site.sort_key());
        self.sites.insert(pos, site);
        self.reindex();
    }

    pub fn extend(&mut self, sites: impl IntoIterator<Item = TextReferenceSite>) {
        for site in sites {
            let pos = self.sites.partition_point(|existing| existing.sort_key() < site.sort_key());
            self.sites.insert(pos, site);
        }
        self.reindex();
    }

    /// Drops every site in `uri`. Called before re-inserting a document's sites after
    /// a recompile.
    pub fn clear_uri(&mut self, uri: &DocumentUri) {
        self.sites.retain(|s| &s.file != uri);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_key.clear();
        for (idx, site) in self.sites.iter().enumerate() {
            self.by_key.entry(site.resource_key.clone()).or_default().push(idx);
        }
    }

    /// All sites, in `(uri, span.start)` order (§8 ordering invariant).
    pub fn all_sites(&self) -> Vec<&TextReferenceSite> {
        self.sites.iter().collect()
    }

    /// Reverse lookup: every site referencing `resource_key`, declaration included,
    /// in `(uri, span.start)` order.
    pub fn sites_for(&self, resource_key: &str) -> Vec<&TextReferenceSite> {
        self.by_key.get(resource_key).into_iter().flatten().map(|&idx| &self.sites[idx]).collect()
    }

    /// The reference site covering `offset` in `uri`, if any — the cursor-at-offset
    /// lookup hover/definition/rename build on.
    pub fn site_at(&self, uri: &DocumentUri, offset: u32) -> Option<&TextReferenceSite> {
        self.sites.iter().find(|s| &s.file == uri && s.span.contains_offset(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::ids::{SourceFileId, Span};
    use viewc_core::refsite::{ReferenceDomain, ReferenceKind};

    fn site(uri: &DocumentUri, start: u32, end: u32, key: &str) -> TextReferenceSite {
        TextReferenceSite {
            domain: ReferenceDomain::Template,
            reference_kind: ReferenceKind::TagName,
            file: uri.clone(),
            span: Span { file: Some(SourceFileId::new(0)), start, end },
            name_form: "nav-bar".to_string(),
            resource_key: key.to_string(),
        }
    }

    #[test]
    fn reverse_lookup_finds_every_site_for_a_key() {
        let uri = DocumentUri::new("app.html");
        let mut idx = ReferentialIndex::new();
        idx.insert(site(&uri, 0, 7, "custom-element:nav-bar"));
        idx.insert(site(&uri, 20, 27, "custom-element:nav-bar"));
        idx.insert(site(&uri, 40, 47, "custom-element:other"));

        let found = idx.sites_for("custom-element:nav-bar");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn all_sites_are_sorted_by_uri_then_start() {
        let uri_a = DocumentUri::new("a.html");
        let uri_b = DocumentUri::new("b.html");
        let mut idx = ReferentialIndex::new();
        idx.insert(site(&uri_b, 5, 10, "custom-element:x"));
        idx.insert(site(&uri_a, 20, 25, "custom-element:x"));
        idx.insert(site(&uri_a, 0, 5, "custom-element:x"));

        let all = idx.all_sites();
        assert_eq!(all[0].file, uri_a);
        assert_eq!(all[0].span.start, 0);
        assert_eq!(all[1].file, uri_a);
        assert_eq!(all[1].span.start, 20);
        assert_eq!(all[2].file, uri_b);
    }

    #[test]
    fn cursor_at_offset_finds_the_covering_site() {
        let uri = DocumentUri::new("app.html");
        let mut idx = ReferentialIndex::new();
        idx.insert(site(&uri, 10, 18, "custom-element:nav-bar"));

        assert!(idx.site_at(&uri, 12).is_some());
        assert!(idx.site_at(&uri, 18).is_none());
        assert!(idx.site_at(&uri, 9).is_none());
    }

    #[test]
    fn clear_uri_drops_sites_and_their_key_entries() {
        let uri = DocumentUri::new("app.html");
        let mut idx = ReferentialIndex::new();
        idx.insert(site(&uri, 0, 7, "custom-element:nav-bar"));
        idx.clear_uri(&uri);

        assert!(idx.sites_for("custom-element:nav-bar").is_empty());
        assert!(idx.all_sites().is_empty());
    }
}
