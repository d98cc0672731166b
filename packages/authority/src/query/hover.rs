use viewc_core::envelope::Confidence;
use viewc_core::ids::{DocumentUri, Span};
use viewc_core::semantics::ResourceCatalog;

use crate::refindex::ReferentialIndex;

use super::{confidence_of, parse_resource_key, ResourceKeyRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    pub text: String,
    pub span: Span,
    pub confidence: Confidence,
}

/// Offset → entity → formatted signature. `None` when no reference site covers the
/// offset ("`unknown` hover when no edge covers the offset", §4.J).
pub fn hover(uri: &DocumentUri, offset: u32, refs: &ReferentialIndex, catalog: &ResourceCatalog) -> Option<HoverResult> {
    let site = refs.site_at(uri, offset)?;
    let (text, confidence) = match parse_resource_key(&site.resource_key)? {
        ResourceKeyRef::Resource { kind, name } => {
            let label = match kind {
                viewc_core::semantics::ResourceKind::CustomElement => "custom element",
                viewc_core::semantics::ResourceKind::CustomAttribute => "custom attribute",
                viewc_core::semantics::ResourceKind::TemplateController => "template controller",
                viewc_core::semantics::ResourceKind::ValueConverter => "value converter",
                viewc_core::semantics::ResourceKind::BindingBehavior => "binding behavior",
            };
            (format!("{label} {name}"), confidence_of(catalog, kind, name))
        }
        ResourceKeyRef::Bindable { kind, container, name } => {
            (format!("bindable {name} of {container}"), confidence_of(catalog, kind, container))
        }
    };
    Some(HoverResult { text, span: site.span, confidence })
}
