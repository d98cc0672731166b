//! Convention recognizer: an exported class named `<Pascal>CustomElement`,
//! `<Pascal>CustomAttribute`, or `<Pascal>TemplateController` derives its resource name
//! from the class name, and — for elements — picks up a same-directory sibling template
//! (`foo.ts` + `foo.html`) if one exists.
//!
//! Grounded on the teacher's filename-convention resolution in the indexer's component
//! lookup, re-targeted from Angular's module/component pairing to resource suffix
//! stripping.

use super::candidate::{Candidate, CandidateSource};
use indexmap::IndexMap;
use viewc_core::gap::Gap;
use viewc_core::ids::DocumentUri;
use viewc_core::semantics::{
    BindableDef, CustomAttributeDef, CustomElementDef, Origin, ResourceDef, Sourced,
    TemplateControllerDef, ScopeBehavior, to_kebab_case,
};
use viewc_host::reflect::ReflectedClass;
use viewc_host::resolver::ModuleResolver;

const SUFFIXES: &[(&str, &str)] = &[
    ("CustomElement", "element"),
    ("CustomAttribute", "attribute"),
    ("TemplateController", "controller"),
];

fn strip_suffix(class_name: &str) -> Option<(&str, &'static str)> {
    SUFFIXES.iter().find_map(|(suffix, kind)| {
        class_name
            .strip_suffix(suffix)
            .filter(|base| !base.is_empty())
            .map(|base| (base, *kind))
    })
}

fn bindables_from_properties(class: &ReflectedClass) -> IndexMap<String, BindableDef> {
    let mut out = IndexMap::new();
    for prop in &class.properties {
        if prop.decorators.iter().any(|d| d.name == "bindable") {
            out.insert(
                prop.name.clone(),
                BindableDef {
                    property: prop.name.clone(),
                    attribute: None,
                    mode: viewc_core::semantics::BindingMode::Default,
                    primary: false,
                },
            );
        }
    }
    out
}

pub fn analyze(
    file: &DocumentUri,
    class: &ReflectedClass,
    resolver: &dyn ModuleResolver,
) -> (Vec<Candidate>, Vec<Gap>) {
    let gaps = Vec::new();
    if !class.is_exported {
        return (vec![], gaps);
    }
    let Some((base, kind)) = strip_suffix(&class.name) else {
        return (vec![], gaps);
    };
    let name = Sourced::new(to_kebab_case(base), Origin::Source);
    let class_name = Sourced::new(class.name.clone(), Origin::Source).at(class.name_span);
    let bindables = Sourced::new(bindables_from_properties(class), Origin::Source);

    let def = match kind {
        "element" => {
            let template = resolver.sibling(file, "html").map(|_| ()).is_some();
            ResourceDef::CustomElement(CustomElementDef {
                name,
                class_name,
                file: file.clone(),
                aliases: Sourced::new(vec![], Origin::Source),
                bindables,
                containerless: Sourced::new(false, Origin::Source),
                template: Sourced::new(if template { Some(String::new()) } else { None }, Origin::Source),
            })
        }
        "attribute" => ResourceDef::CustomAttribute(CustomAttributeDef {
            name,
            class_name,
            file: file.clone(),
            aliases: Sourced::new(vec![], Origin::Source),
            bindables,
            default_property: Sourced::new(None, Origin::Source),
            no_multi_bindings: Sourced::new(false, Origin::Source),
        }),
        "controller" => ResourceDef::TemplateController(TemplateControllerDef {
            name,
            class_name,
            file: file.clone(),
            aliases: Sourced::new(vec![], Origin::Source),
            bindables,
            default_property: Sourced::new(None, Origin::Source),
            no_multi_bindings: Sourced::new(false, Origin::Source),
            scope: ScopeBehavior::Reuse,
            frame_pattern: None,
        }),
        _ => unreachable!("exhaustive over SUFFIXES"),
    };

    (vec![Candidate::new(def, CandidateSource::Convention)], gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::ids::Span;
    use viewc_host::memory::MemoryProject;

    fn class(name: &str) -> ReflectedClass {
        ReflectedClass {
            name: name.to_string(),
            name_span: Span::synthetic(0, 1),
            is_exported: true,
            decorators: vec![],
            static_members: IndexMap::new(),
            properties: vec![],
        }
    }

    #[test]
    fn custom_element_suffix_with_sibling_template() {
        let file = DocumentUri::new("nav-bar.ts");
        let mut project = MemoryProject::new();
        project = project.with_file(DocumentUri::new("nav-bar.html"));
        let c = class("NavBarCustomElement");
        let (candidates, gaps) = analyze(&file, &c, &project);
        assert!(gaps.is_empty());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].def.name(), "nav-bar");
        match &candidates[0].def {
            ResourceDef::CustomElement(d) => assert!(d.template.value.is_some()),
            _ => panic!("expected custom element"),
        }
    }

    #[test]
    fn no_suffix_yields_no_candidate() {
        let file = DocumentUri::new("plain.ts");
        let project = MemoryProject::new();
        let c = class("PlainClass");
        let (candidates, _) = analyze(&file, &c, &project);
        assert!(candidates.is_empty());
    }

    #[test]
    fn not_exported_yields_no_candidate() {
        let file = DocumentUri::new("nav-bar.ts");
        let project = MemoryProject::new();
        let mut c = class("NavBarCustomElement");
        c.is_exported = false;
        let (candidates, _) = analyze(&file, &c, &project);
        assert!(candidates.is_empty());
    }
}
