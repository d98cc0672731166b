//! Component J: the query layer (§4.J). Every query is a pure function over the
//! latest artifacts for a document's version — no query here mutates the resource
//! catalog, the provenance index, or the referential index.

pub mod completions;
pub mod definition;
pub mod hover;
pub mod references;
pub mod rename;
pub mod semantic_tokens;

pub use completions::{completions, CompletionItem, CompletionPosition};
pub use definition::{definition, DefinitionResult};
pub use hover::{hover, HoverResult};
pub use references::references;
pub use rename::{rename, TextEdit};
pub use semantic_tokens::{semantic_tokens, SemanticToken, SemanticTokenModifier, SemanticTokenType};

use viewc_core::envelope::Confidence;
use viewc_core::semantics::{CatalogConfidence, ResourceCatalog, ResourceKind};

/// A parsed `resourceKey` (§4.I: `<kind>:<name>` or `<kind>:<container>:bindable:<name>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKeyRef<'a> {
    Resource { kind: ResourceKind, name: &'a str },
    Bindable { kind: ResourceKind, container: &'a str, name: &'a str },
}

pub fn parse_resource_kind(s: &str) -> Option<ResourceKind> {
    match s {
        "custom-element" => Some(ResourceKind::CustomElement),
        "custom-attribute" => Some(ResourceKind::CustomAttribute),
        "template-controller" => Some(ResourceKind::TemplateController),
        "value-converter" => Some(ResourceKind::ValueConverter),
        "binding-behavior" => Some(ResourceKind::BindingBehavior),
        _ => None,
    }
}

pub fn parse_resource_key(key: &str) -> Option<ResourceKeyRef<'_>> {
    let parts: Vec<&str> = key.split(':').collect();
    match parts.as_slice() {
        [kind, name] => Some(ResourceKeyRef::Resource { kind: parse_resource_kind(kind)?, name }),
        [kind, container, "bindable", name] => {
            Some(ResourceKeyRef::Bindable { kind: parse_resource_kind(kind)?, container, name })
        }
        _ => None,
    }
}

/// Maps a catalog confidence to the query layer's four-tier scale. The catalog only
/// ever produces three tiers (§4.F's gap rollup has no "high" — a resource is either
/// fully resolved, partially resolved, or conservatively degraded); `high` is reserved
/// for confidence sources the catalog rollup doesn't model yet (ambient DOM knowledge,
/// built-ins resolved via the host's own analysis rather than static discovery).
pub(crate) fn confidence_of(catalog: &ResourceCatalog, kind: ResourceKind, name: &str) -> Confidence {
    match catalog.get(kind, name).map(|entry| entry.confidence) {
        Some(CatalogConfidence::Exact) => Confidence::Exact,
        Some(CatalogConfidence::Partial) => Confidence::Partial,
        Some(CatalogConfidence::Conservative) => Confidence::Low,
        None => Confidence::Unknown,
    }
}
