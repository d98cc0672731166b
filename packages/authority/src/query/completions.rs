use indexmap::IndexSet;
use viewc_core::envelope::Confidence;
use viewc_core::semantics::{to_kebab_case, DomSchema, ResourceCatalog, ResourceKind, TemplateSyntaxRegistry};

use super::confidence_of;

/// Where in the authored markup a completion request landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionPosition {
    TagName,
    /// `element` is the enclosing tag name, when it resolves to a known custom
    /// element — narrows the bindable suggestions to that element's own.
    AttributeName { element: Option<String> },
    BindingCommand,
    ValueConverterOrBindingBehavior,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub confidence: Confidence,
}

/// `visible` is the resource graph's materialized scope (`<kind>:<name>` catalog keys
/// visible at the completion site, per §4.F).
pub fn completions(
    position: &CompletionPosition,
    visible: &IndexSet<String>,
    catalog: &ResourceCatalog,
    dom_schema: &DomSchema,
    syntax: &TemplateSyntaxRegistry,
) -> Vec<CompletionItem> {
    match position {
        CompletionPosition::TagName => {
            let mut items = visible_of_kind(visible, catalog, ResourceKind::CustomElement);
            items.extend(dom_schema.tag_props.keys().map(|tag| CompletionItem { label: tag.clone(), confidence: Confidence::High }));
            items
        }
        CompletionPosition::AttributeName { element } => {
            let mut items = Vec::new();
            if let Some(tag) = element {
                if let Some(entry) = catalog.get(ResourceKind::CustomElement, tag) {
                    if let Some(bindables) = entry.def.bindables() {
                        for bindable in bindables.values() {
                            let label = bindable.attribute.clone().unwrap_or_else(|| to_kebab_case(&bindable.property));
                            items.push(CompletionItem { label, confidence: entry_confidence(entry.confidence) });
                        }
                    }
                }
                if let Some(props) = dom_schema.tag_props.get(tag) {
                    items.extend(props.iter().map(|p| CompletionItem { label: p.clone(), confidence: Confidence::High }));
                }
            }
            items.extend(visible_of_kind(visible, catalog, ResourceKind::CustomAttribute));
            items.extend(visible_of_kind(visible, catalog, ResourceKind::TemplateController));
            items
        }
        CompletionPosition::BindingCommand => syntax
            .commands
            .keys()
            .map(|name| CompletionItem { label: name.clone(), confidence: Confidence::Exact })
            .collect(),
        CompletionPosition::ValueConverterOrBindingBehavior => {
            let mut items = visible_of_kind(visible, catalog, ResourceKind::ValueConverter);
            items.extend(visible_of_kind(visible, catalog, ResourceKind::BindingBehavior));
            items
        }
    }
}

fn visible_of_kind(visible: &IndexSet<String>, catalog: &ResourceCatalog, kind: ResourceKind) -> Vec<CompletionItem> {
    let prefix = format!("{}:", kind.as_str());
    visible
        .iter()
        .filter(|key| key.starts_with(&prefix))
        .filter_map(|key| {
            let name = key.strip_prefix(&prefix)?;
            Some(CompletionItem { label: name.to_string(), confidence: confidence_of(catalog, kind, name) })
        })
        .collect()
}

fn entry_confidence(confidence: viewc_core::semantics::CatalogConfidence) -> Confidence {
    use viewc_core::semantics::CatalogConfidence::*;
    match confidence {
        Exact => Confidence::Exact,
        Partial => Confidence::Partial,
        Conservative => Confidence::Low,
    }
}
