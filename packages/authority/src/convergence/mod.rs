//! Component E: convergence assembler. Folds the candidate list discovery produced
//! into a `MaterializedSemantics`, plus every `DefinitionConvergenceRecord` describing a
//! field-level disagreement along the way.

pub mod fold;
pub mod record;

pub use record::{CandidateValue, DefinitionConvergenceRecord};

use crate::discovery::Candidate;
use viewc_core::gap::Gap;
use viewc_core::semantics::{MaterializedSemantics, ResourceKind, Semantics};

pub struct ConvergenceOutput {
    pub semantics: MaterializedSemantics,
    pub records: Vec<DefinitionConvergenceRecord>,
}

fn gap_matches(gap: &Gap, kind: ResourceKind, name: &str) -> bool {
    gap.resource
        .as_ref()
        .map(|r| r.kind == kind.as_str() && r.name == name)
        .unwrap_or(false)
}

/// Assembles the final catalog from discovery's candidate list and gap list, onto the
/// immutable built-in base semantics.
pub fn converge(base: Semantics, candidates: Vec<Candidate>, gaps: &[Gap]) -> ConvergenceOutput {
    let mut catalog = viewc_core::semantics::ResourceCatalog::default();
    let mut all_records = Vec::new();

    for (_, group) in fold::partition(candidates) {
        let (def, records) = fold::fold_partition(group);
        let kind = def.kind();
        let name = def.name().to_string();
        let matched_gaps: Vec<Gap> = gaps
            .iter()
            .filter(|g| gap_matches(g, kind, &name))
            .cloned()
            .collect();
        catalog.insert(def, matched_gaps);
        all_records.extend(records);
    }

    ConvergenceOutput {
        semantics: MaterializedSemantics { base, catalog },
        records: all_records,
    }
}
