//! Component D: resource discovery. Six pattern recognizers each propose zero or more
//! `Candidate` resource definitions for a file, plus any `Gap`s they could not resolve.
//! The convergence assembler (component E) folds candidates for the same `(kind, name)`
//! down to one authoritative `ResourceDef`.

pub mod candidate;
pub mod convention;
pub mod decorator;
pub mod define_call;
pub mod plugin_activation;
pub mod sibling_template;
pub mod third_party;

pub use candidate::{Candidate, CandidateSource};

use viewc_core::gap::Gap;
use viewc_core::ids::DocumentUri;
use viewc_host::reflect::ReflectedModule;
use viewc_host::resolver::ModuleResolver;

/// Runs the per-module recognizers (decorator, `.define`, convention) over every class
/// and call in a reflected module. Sibling-template, plugin-activation, and third-party
/// recognizers operate over broader project state and are driven separately by the
/// workspace engine, not per-module.
pub fn discover_module(
    file: &DocumentUri,
    module: &ReflectedModule,
    resolver: &dyn ModuleResolver,
) -> (Vec<Candidate>, Vec<Gap>) {
    let mut candidates = Vec::new();
    let mut gaps = Vec::new();

    for class in &module.classes {
        let (c, g) = decorator::analyze(file, class);
        candidates.extend(c);
        gaps.extend(g);

        // Decorator recognition takes precedence per §4.E's ranking, but a class may
        // also independently match the naming convention (e.g. `NavBarCustomElement`
        // with no decorator at all); convergence resolves any resulting overlap.
        if decorator::detect(class).is_none() {
            let (c, g) = convention::analyze(file, class, resolver);
            candidates.extend(c);
            gaps.extend(g);
        }
    }

    let (c, g) = define_call::analyze(file, module);
    candidates.extend(c);
    gaps.extend(g);

    (candidates, gaps)
}
