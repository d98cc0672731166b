use viewc_core::ids::{DocumentUri, Span};
use viewc_core::semantics::{ResourceCatalog, ResourceDef};

use super::{parse_resource_key, ResourceKeyRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionResult {
    pub file: DocumentUri,
    /// The declaring name's span, when discovery recorded one (built-ins have none).
    pub span: Option<Span>,
}

/// Entity → declaring file + span, via `ResourceDef.file` and `name.location`. For
/// bindables, the declaring element's file (`BindableDef` carries no span of its own).
pub fn definition(resource_key: &str, catalog: &ResourceCatalog) -> Option<DefinitionResult> {
    match parse_resource_key(resource_key)? {
        ResourceKeyRef::Resource { kind, name } => {
            let def = &catalog.get(kind, name)?.def;
            Some(DefinitionResult { file: def.file().clone(), span: name_location(def) })
        }
        ResourceKeyRef::Bindable { kind, container, .. } => {
            let def = &catalog.get(kind, container)?.def;
            Some(DefinitionResult { file: def.file().clone(), span: name_location(def) })
        }
    }
}

fn name_location(def: &ResourceDef) -> Option<Span> {
    match def {
        ResourceDef::CustomElement(d) => d.name.location,
        ResourceDef::CustomAttribute(d) => d.name.location,
        ResourceDef::TemplateController(d) => d.name.location,
        ResourceDef::ValueConverter(d) => d.name.location,
        ResourceDef::BindingBehavior(d) => d.name.location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use viewc_core::ids::SourceFileId;
    use viewc_core::semantics::{CustomElementDef, Origin, Sourced};

    fn nav_bar() -> ResourceDef {
        ResourceDef::CustomElement(CustomElementDef {
            name: Sourced::new("nav-bar".to_string(), Origin::Source).at(Span { file: Some(SourceFileId::new(0)), start: 0, end: 7 }),
            class_name: Sourced::new("NavBar".to_string(), Origin::Source),
            file: DocumentUri::new("nav-bar.ts"),
            aliases: Sourced::new(vec![], Origin::Source),
            bindables: Sourced::new(IndexMap::new(), Origin::Source),
            containerless: Sourced::new(false, Origin::Source),
            template: Sourced::new(None, Origin::Source),
        })
    }

    #[test]
    fn definition_resolves_to_the_declaring_file_and_span() {
        let mut catalog = ResourceCatalog::default();
        catalog.insert(nav_bar(), vec![]);

        let result = definition("custom-element:nav-bar", &catalog).unwrap();
        assert_eq!(result.file, DocumentUri::new("nav-bar.ts"));
        assert_eq!(result.span, Some(Span { file: Some(SourceFileId::new(0)), start: 0, end: 7 }));
    }

    #[test]
    fn bindable_definition_falls_back_to_the_declaring_element_file() {
        let mut catalog = ResourceCatalog::default();
        catalog.insert(nav_bar(), vec![]);

        let result = definition("custom-element:nav-bar:bindable:displayData", &catalog).unwrap();
        assert_eq!(result.file, DocumentUri::new("nav-bar.ts"));
    }
}
