//! Plugin-activation recognizer: a root-level `.register(SomePlugin)` call (on a
//! container / Aurelia app builder) where `SomePlugin` is a known manifest entry
//! contributing a fixed set of global resources (e.g. a router plugin registering
//! `<au-viewport>`/`<au-nav>` custom elements).
//!
//! Grounded on the teacher's plugin-options static registration scan, re-targeted from
//! Angular module providers to Aurelia-style container registrations. The manifest
//! itself is ambient knowledge (§12), not discovered from source.

use super::candidate::{Candidate, CandidateSource};
use indexmap::IndexMap;
use viewc_core::gap::{Gap, GapKind};
use viewc_core::ids::DocumentUri;
use viewc_core::semantics::{CustomElementDef, Origin, ResourceDef, Sourced};
use viewc_host::reflect::{ReflectedCall, ReflectedModule, ReflectedValue};

const REGISTER_CALLEES: &[&[&str]] = &[&["Aurelia", "register"], &["container", "register"]];

/// A fixed mapping from a plugin's exported activation symbol to the resources it
/// globally contributes, e.g. `"RouterConfiguration" -> ["au-viewport", "au-nav"]`.
#[derive(Debug, Clone, Default)]
pub struct PluginManifest {
    pub entries: IndexMap<String, Vec<String>>,
}

impl PluginManifest {
    pub fn builtin() -> Self {
        let mut entries = IndexMap::new();
        entries.insert(
            "RouterConfiguration".to_string(),
            vec!["au-viewport".to_string(), "au-nav".to_string()],
        );
        PluginManifest { entries }
    }
}

fn matches_register_call(call: &ReflectedCall) -> bool {
    REGISTER_CALLEES
        .iter()
        .any(|path| path.len() == call.callee_path.len() && path.iter().zip(&call.callee_path).all(|(a, b)| a == b))
}

pub fn analyze(file: &DocumentUri, module: &ReflectedModule, manifest: &PluginManifest) -> (Vec<Candidate>, Vec<Gap>) {
    let mut candidates = Vec::new();
    let mut gaps = Vec::new();

    for call in &module.calls {
        if !matches_register_call(call) {
            continue;
        }
        for arg in &call.args {
            match arg {
                ReflectedValue::Reference(name, span) => {
                    let Some(resources) = manifest.entries.get(name) else {
                        continue;
                    };
                    for resource_name in resources {
                        let def = ResourceDef::CustomElement(CustomElementDef {
                            name: Sourced::new(resource_name.clone(), Origin::Source).at(*span),
                            class_name: Sourced::new(format!("{name}::{resource_name}"), Origin::Source),
                            file: file.clone(),
                            aliases: Sourced::new(vec![], Origin::Source),
                            bindables: Sourced::new(IndexMap::new(), Origin::Source),
                            containerless: Sourced::new(false, Origin::Source),
                            template: Sourced::new(None, Origin::Source),
                        });
                        candidates.push(Candidate::new(def, CandidateSource::PluginActivation));
                    }
                }
                ReflectedValue::Dynamic => {
                    gaps.push(
                        Gap::new(
                            "register() argument could not be statically evaluated; plugin resources may be missing",
                            GapKind::Conservative,
                        )
                        .at(call.callee_span),
                    );
                }
                _ => {}
            }
        }
    }

    (candidates, gaps)
}
