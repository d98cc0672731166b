//! `.define` recognizer: `CustomElement.define(spec, ClassRef)` and its attribute /
//! template-controller / value-converter / binding-behavior counterparts. `spec` is
//! either a bare string name or an object literal carrying `name`, `bindables`, and the
//! resource-specific fields.
//!
//! Grounded on the teacher's `resource`/`metadata` static-registration scanning, which
//! likewise matches a fixed callee shape before reading its argument list.

use super::candidate::{Candidate, CandidateSource};
use indexmap::IndexMap;
use viewc_core::gap::{Gap, GapKind};
use viewc_core::ids::DocumentUri;
use viewc_core::semantics::{
    BindableDef, BindingMode, CustomAttributeDef, CustomElementDef, Origin, ResourceDef, Sourced,
    TemplateControllerDef, ValueConverterDef, BindingBehaviorDef, ScopeBehavior,
};
use viewc_host::reflect::{ReflectedCall, ReflectedModule, ReflectedValue};

const DEFINE_CALLEES: &[(&[&str], &str)] = &[
    (&["CustomElement", "define"], "element"),
    (&["CustomAttribute", "define"], "attribute"),
    (&["TemplateController", "define"], "controller"),
    (&["ValueConverter", "define"], "converter"),
    (&["BindingBehavior", "define"], "behavior"),
];

fn matches_callee(call: &ReflectedCall) -> Option<&'static str> {
    DEFINE_CALLEES
        .iter()
        .find(|(path, _)| path.len() == call.callee_path.len() && path.iter().zip(&call.callee_path).all(|(a, b)| a == b))
        .map(|(_, kind)| *kind)
}

fn class_ref_name(call: &ReflectedCall) -> Option<(String, viewc_core::ids::Span)> {
    match call.args.get(1) {
        Some(ReflectedValue::Reference(name, span)) => Some((name.clone(), *span)),
        _ => None,
    }
}

fn extract_bindables_from_spec(obj: &IndexMap<String, ReflectedValue>, gaps: &mut Vec<Gap>) -> IndexMap<String, BindableDef> {
    let mut out = IndexMap::new();
    let Some(ReflectedValue::Array(items)) = obj.get("bindables") else {
        return out;
    };
    for item in items {
        match item {
            ReflectedValue::String(name, _) => {
                out.insert(
                    name.clone(),
                    BindableDef {
                        property: name.clone(),
                        attribute: None,
                        mode: BindingMode::Default,
                        primary: false,
                    },
                );
            }
            ReflectedValue::Object(bobj) => {
                let Some(name) = bobj.get("property").and_then(ReflectedValue::as_str) else {
                    gaps.push(Gap::new(
                        "bindable entry missing 'property' field",
                        GapKind::PartialEval,
                    ));
                    continue;
                };
                let attribute = bobj.get("attribute").and_then(ReflectedValue::as_str).map(str::to_string);
                let primary = matches!(bobj.get("primary"), Some(ReflectedValue::Bool(true)));
                out.insert(
                    name.to_string(),
                    BindableDef {
                        property: name.to_string(),
                        attribute,
                        mode: BindingMode::Default,
                        primary,
                    },
                );
            }
            ReflectedValue::Dynamic => {
                gaps.push(Gap::new(
                    "bindables list entry could not be statically evaluated",
                    GapKind::PartialEval,
                ));
            }
            _ => {}
        }
    }
    out
}

/// Resolves the `spec` argument (arg 0) of a `.define` call into a name plus raw object
/// fields, or emits an `invalid-resource-name`/`dynamic-value` gap.
fn resolve_spec(call: &ReflectedCall, gaps: &mut Vec<Gap>) -> Option<(Sourced<String>, IndexMap<String, ReflectedValue>)> {
    match call.args.first() {
        Some(ReflectedValue::String(s, span)) => {
            Some((Sourced::new(s.clone(), Origin::Source).at(*span), IndexMap::new()))
        }
        Some(ReflectedValue::Object(obj)) => match obj.get("name") {
            Some(ReflectedValue::String(s, span)) => {
                Some((Sourced::new(s.clone(), Origin::Source).at(*span), obj.clone()))
            }
            Some(ReflectedValue::Dynamic) => {
                gaps.push(
                    Gap::new(
                        "'.define' spec name could not be statically evaluated",
                        GapKind::PartialEval,
                    )
                    .at(call.callee_span),
                );
                None
            }
            None => {
                gaps.push(
                    Gap::new("'.define' spec object is missing a 'name' field", GapKind::Conservative)
                        .at(call.callee_span)
                        .suggest("add an explicit name: field to the define() spec"),
                );
                None
            }
            _ => None,
        },
        Some(ReflectedValue::Dynamic) => {
            gaps.push(
                Gap::new("'.define' spec could not be statically evaluated", GapKind::PartialEval)
                    .at(call.callee_span),
            );
            None
        }
        _ => {
            gaps.push(
                Gap::new("'.define' called with an unrecognized spec shape", GapKind::Conservative)
                    .at(call.callee_span),
            );
            None
        }
    }
}

pub fn analyze(file: &DocumentUri, module: &ReflectedModule) -> (Vec<Candidate>, Vec<Gap>) {
    let mut candidates = Vec::new();
    let mut gaps = Vec::new();

    for call in &module.calls {
        let Some(kind) = matches_callee(call) else {
            continue;
        };
        let Some((name, spec_obj)) = resolve_spec(call, &mut gaps) else {
            continue;
        };
        let Some((class_name, class_span)) = class_ref_name(call) else {
            gaps.push(
                Gap::new("'.define' missing a class reference argument", GapKind::Conservative)
                    .at(call.callee_span),
            );
            continue;
        };
        let class_name_sourced = Sourced::new(class_name, Origin::Source).at(class_span);
        let bindables = extract_bindables_from_spec(&spec_obj, &mut gaps);
        let aliases = match spec_obj.get("aliases") {
            Some(ReflectedValue::Array(items)) => items.iter().filter_map(ReflectedValue::as_str).map(str::to_string).collect(),
            _ => vec![],
        };

        let def = match kind {
            "element" => ResourceDef::CustomElement(CustomElementDef {
                name,
                class_name: class_name_sourced,
                file: file.clone(),
                aliases: Sourced::new(aliases, Origin::Source),
                bindables: Sourced::new(bindables, Origin::Source),
                containerless: Sourced::new(
                    matches!(spec_obj.get("containerless"), Some(ReflectedValue::Bool(true))),
                    Origin::Source,
                ),
                template: Sourced::new(None, Origin::Source),
            }),
            "attribute" => ResourceDef::CustomAttribute(CustomAttributeDef {
                name,
                class_name: class_name_sourced,
                file: file.clone(),
                aliases: Sourced::new(aliases, Origin::Source),
                bindables: Sourced::new(bindables, Origin::Source),
                default_property: Sourced::new(None, Origin::Source),
                no_multi_bindings: Sourced::new(
                    matches!(spec_obj.get("noMultiBindings"), Some(ReflectedValue::Bool(true))),
                    Origin::Source,
                ),
            }),
            "controller" => ResourceDef::TemplateController(TemplateControllerDef {
                name,
                class_name: class_name_sourced,
                file: file.clone(),
                aliases: Sourced::new(aliases, Origin::Source),
                bindables: Sourced::new(bindables, Origin::Source),
                default_property: Sourced::new(None, Origin::Source),
                no_multi_bindings: Sourced::new(false, Origin::Source),
                scope: ScopeBehavior::Reuse,
                frame_pattern: None,
            }),
            "converter" => ResourceDef::ValueConverter(ValueConverterDef {
                name,
                class_name: class_name_sourced,
                file: file.clone(),
                aliases: Sourced::new(aliases, Origin::Source),
            }),
            "behavior" => ResourceDef::BindingBehavior(BindingBehaviorDef {
                name,
                class_name: class_name_sourced,
                file: file.clone(),
                aliases: Sourced::new(aliases, Origin::Source),
            }),
            _ => unreachable!("exhaustive over DEFINE_CALLEES kinds"),
        };
        candidates.push(Candidate::new(def, CandidateSource::Define));
    }

    (candidates, gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::ids::Span;

    fn module_with_call(callee: &[&str], args: Vec<ReflectedValue>) -> ReflectedModule {
        ReflectedModule {
            file: DocumentUri::new("nav-bar.ts"),
            classes: vec![],
            calls: vec![ReflectedCall {
                callee_path: callee.iter().map(|s| s.to_string()).collect(),
                callee_span: Span::synthetic(0, 1),
                args,
            }],
            imports: vec![],
        }
    }

    #[test]
    fn string_spec_and_class_ref_produces_candidate() {
        let module = module_with_call(
            &["CustomElement", "define"],
            vec![
                ReflectedValue::String("nav-bar".to_string(), Span::synthetic(0, 7)),
                ReflectedValue::Reference("NavBar".to_string(), Span::synthetic(9, 15)),
            ],
        );
        let file = DocumentUri::new("nav-bar.ts");
        let (candidates, gaps) = analyze(&file, &module);
        assert!(gaps.is_empty());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].def.name(), "nav-bar");
        assert_eq!(candidates[0].source, CandidateSource::Define);
    }

    #[test]
    fn object_spec_with_bindables() {
        let mut spec = IndexMap::new();
        spec.insert(
            "name".to_string(),
            ReflectedValue::String("nav-bar".to_string(), Span::synthetic(0, 7)),
        );
        spec.insert(
            "bindables".to_string(),
            ReflectedValue::Array(vec![ReflectedValue::String("title".to_string(), Span::synthetic(0, 5))]),
        );
        let module = module_with_call(
            &["CustomElement", "define"],
            vec![
                ReflectedValue::Object(spec),
                ReflectedValue::Reference("NavBar".to_string(), Span::synthetic(9, 15)),
            ],
        );
        let file = DocumentUri::new("nav-bar.ts");
        let (candidates, gaps) = analyze(&file, &module);
        assert!(gaps.is_empty());
        let bindables = candidates[0].def.bindables().unwrap();
        assert!(bindables.contains_key("title"));
    }

    #[test]
    fn missing_class_ref_emits_gap() {
        let module = module_with_call(
            &["CustomElement", "define"],
            vec![ReflectedValue::String("nav-bar".to_string(), Span::synthetic(0, 7))],
        );
        let file = DocumentUri::new("nav-bar.ts");
        let (candidates, gaps) = analyze(&file, &module);
        assert!(candidates.is_empty());
        assert_eq!(gaps.len(), 1);
    }

    #[test]
    fn unrelated_call_ignored() {
        let module = module_with_call(&["console", "log"], vec![]);
        let file = DocumentUri::new("nav-bar.ts");
        let (candidates, gaps) = analyze(&file, &module);
        assert!(candidates.is_empty());
        assert!(gaps.is_empty());
    }
}
