//! Decorator recognizer. Matches a class adorned with `@customElement`,
//! `@customAttribute`, or `@templateController` and extracts name, bindables (from
//! `@bindable`-annotated properties), and static aliases.
//!
//! Grounded on the detect/analyze split of the teacher's directive decorator handler
//! (`DirectiveDecoratorHandler::detect` / `::analyze`), re-targeted from Angular's
//! `@Directive`/`@Component` to this framework's resource decorators.

use super::candidate::{Candidate, CandidateSource};
use indexmap::IndexMap;
use viewc_core::gap::{Gap, GapKind};
use viewc_core::ids::DocumentUri;
use viewc_core::semantics::{
    BindableDef, BindingMode, CustomAttributeDef, CustomElementDef, Origin, ResourceDef, Sourced,
    TemplateControllerDef, to_kebab_case, ScopeBehavior,
};
use viewc_host::reflect::{ReflectedClass, ReflectedValue};

const ELEMENT_DECORATORS: &[&str] = &["customElement"];
const ATTRIBUTE_DECORATORS: &[&str] = &["customAttribute"];
const CONTROLLER_DECORATORS: &[&str] = &["templateController"];

pub fn detect(class: &ReflectedClass) -> Option<&'static str> {
    class.decorators.iter().find_map(|d| {
        ELEMENT_DECORATORS
            .iter()
            .chain(ATTRIBUTE_DECORATORS)
            .chain(CONTROLLER_DECORATORS)
            .find(|name| **name == d.name)
            .copied()
    })
}

/// Extracts `@bindable` properties. `mode`/`attribute`/`primary` come from the
/// decorator's object-literal argument when present, otherwise default.
fn extract_bindables(class: &ReflectedClass, gaps: &mut Vec<Gap>) -> IndexMap<String, BindableDef> {
    let mut out = IndexMap::new();
    for prop in &class.properties {
        let Some(dec) = prop.decorators.iter().find(|d| d.name == "bindable") else {
            continue;
        };
        let mut attribute = None;
        let mut mode = BindingMode::Default;
        let mut primary = false;
        if let Some(ReflectedValue::Object(obj)) = dec.args.first() {
            if let Some(ReflectedValue::String(s, _)) = obj.get("attribute") {
                attribute = Some(s.clone());
            }
            if let Some(ReflectedValue::Bool(b)) = obj.get("primary") {
                primary = *b;
            }
            if let Some(ReflectedValue::Dynamic) = obj.get("mode") {
                gaps.push(
                    Gap::new(
                        format!("bindable '{}' mode could not be statically evaluated", prop.name),
                        GapKind::PartialEval,
                    )
                    .at(prop.name_span),
                );
            }
        } else if let Some(first) = dec.args.first() {
            if first.is_dynamic() {
                gaps.push(
                    Gap::new(
                        format!("bindable '{}' configuration could not be statically evaluated", prop.name),
                        GapKind::PartialEval,
                    )
                    .at(prop.name_span),
                );
            }
        }
        out.insert(
            prop.name.clone(),
            BindableDef {
                property: prop.name.clone(),
                attribute,
                mode,
                primary,
            },
        );
    }
    out
}

fn extract_aliases(class: &ReflectedClass) -> Vec<String> {
    match class.static_members.get("aliases") {
        Some(ReflectedValue::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => vec![],
    }
}

/// The decorator's first argument is either a bare string name or an object with a
/// `name` field (and possibly `bindables`/`containerless`/etc, mirroring `.define`'s
/// spec shape but authored as a decorator argument instead).
fn resolve_name(class: &ReflectedClass, dec_args: &[ReflectedValue], gaps: &mut Vec<Gap>) -> Sourced<String> {
    match dec_args.first() {
        Some(ReflectedValue::String(s, span)) => Sourced::new(s.clone(), Origin::Source).at(*span),
        Some(ReflectedValue::Object(obj)) => match obj.get("name") {
            Some(ReflectedValue::String(s, span)) => Sourced::new(s.clone(), Origin::Source).at(*span),
            Some(ReflectedValue::Dynamic) | None => {
                gaps.push(Gap::new(
                    format!("resource name for class '{}' could not be statically evaluated", class.name),
                    GapKind::PartialEval,
                ));
                Sourced::new(to_kebab_case(&class.name), Origin::Source)
            }
            _ => Sourced::new(to_kebab_case(&class.name), Origin::Source),
        },
        None => Sourced::new(to_kebab_case(&class.name), Origin::Source),
        _ => Sourced::new(to_kebab_case(&class.name), Origin::Source),
    }
}

pub fn analyze(file: &DocumentUri, class: &ReflectedClass) -> (Vec<Candidate>, Vec<Gap>) {
    let mut gaps = Vec::new();
    let Some(decorator_name) = detect(class) else {
        return (vec![], gaps);
    };
    let dec = class.decorators.iter().find(|d| d.name == decorator_name).unwrap();
    let name = resolve_name(class, &dec.args, &mut gaps);
    let bindables = extract_bindables(class, &mut gaps);
    let aliases = extract_aliases(class);
    let class_name = Sourced::new(class.name.clone(), Origin::Source).at(class.name_span);

    let def = if ELEMENT_DECORATORS.contains(&decorator_name) {
        ResourceDef::CustomElement(CustomElementDef {
            name,
            class_name,
            file: file.clone(),
            aliases: Sourced::new(aliases, Origin::Source),
            bindables: Sourced::new(bindables, Origin::Source),
            containerless: Sourced::new(false, Origin::Source),
            template: Sourced::new(None, Origin::Source),
        })
    } else if ATTRIBUTE_DECORATORS.contains(&decorator_name) {
        ResourceDef::CustomAttribute(CustomAttributeDef {
            name,
            class_name,
            file: file.clone(),
            aliases: Sourced::new(aliases, Origin::Source),
            bindables: Sourced::new(bindables, Origin::Source),
            default_property: Sourced::new(None, Origin::Source),
            no_multi_bindings: Sourced::new(false, Origin::Source),
        })
    } else {
        ResourceDef::TemplateController(TemplateControllerDef {
            name,
            class_name,
            file: file.clone(),
            aliases: Sourced::new(aliases, Origin::Source),
            bindables: Sourced::new(bindables, Origin::Source),
            default_property: Sourced::new(None, Origin::Source),
            no_multi_bindings: Sourced::new(false, Origin::Source),
            scope: ScopeBehavior::Reuse,
            frame_pattern: None,
        })
    };

    (vec![Candidate::new(def, CandidateSource::Decorator)], gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::ids::Span;
    use viewc_host::reflect::ReflectedDecorator;

    fn class_with_decorator(name: &str, args: Vec<ReflectedValue>) -> ReflectedClass {
        ReflectedClass {
            name: "NavBarCustomElement".to_string(),
            name_span: Span::synthetic(0, 1),
            is_exported: true,
            decorators: vec![ReflectedDecorator {
                name: name.to_string(),
                name_span: Span::synthetic(0, 1),
                args,
            }],
            static_members: IndexMap::new(),
            properties: vec![],
        }
    }

    #[test]
    fn decorator_with_object_arg_extracts_name() {
        let mut obj = IndexMap::new();
        obj.insert(
            "name".to_string(),
            ReflectedValue::String("nav-bar".to_string(), Span::synthetic(0, 7)),
        );
        let class = class_with_decorator("customElement", vec![ReflectedValue::Object(obj)]);
        let file = DocumentUri::new("nav-bar.ts");
        let (candidates, gaps) = analyze(&file, &class);
        assert!(gaps.is_empty());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].def.name(), "nav-bar");
        assert_eq!(candidates[0].source, CandidateSource::Decorator);
    }

    #[test]
    fn decorator_with_dynamic_name_emits_gap() {
        let mut obj = IndexMap::new();
        obj.insert("name".to_string(), ReflectedValue::Dynamic);
        let class = class_with_decorator("customElement", vec![ReflectedValue::Object(obj)]);
        let file = DocumentUri::new("nav-bar.ts");
        let (_candidates, gaps) = analyze(&file, &class);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].why, GapKind::PartialEval);
    }

    #[test]
    fn no_decorator_yields_no_candidates() {
        let class = ReflectedClass {
            name: "PlainClass".to_string(),
            name_span: Span::synthetic(0, 1),
            is_exported: true,
            decorators: vec![],
            static_members: IndexMap::new(),
            properties: vec![],
        };
        let file = DocumentUri::new("plain.ts");
        let (candidates, gaps) = analyze(&file, &class);
        assert!(candidates.is_empty());
        assert!(gaps.is_empty());
    }
}
