use viewc_core::refsite::TextReferenceSite;

use crate::refindex::ReferentialIndex;

/// Reverse lookup in the referential index; includes the declaration site.
pub fn references(resource_key: &str, refs: &ReferentialIndex) -> Vec<TextReferenceSite> {
    refs.sites_for(resource_key).into_iter().cloned().collect()
}
