//! A single recognizer's proposal for a resource's definition, ranked by the fixed
//! precedence order the convergence assembler folds over.

use viewc_core::semantics::ResourceDef;

/// Declaration order doubles as priority rank (lower = higher priority), matching
/// §4.E's fixed precedence: explicit config < decorator < `.define` < static class
/// members < convention < sibling-template < plugin-activation < builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateSource {
    Config,
    Decorator,
    Define,
    StaticMembers,
    Convention,
    SiblingTemplate,
    PluginActivation,
    Builtin,
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub def: ResourceDef,
    pub source: CandidateSource,
}

impl Candidate {
    pub fn new(def: ResourceDef, source: CandidateSource) -> Self {
        Candidate { def, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_order_matches_spec() {
        assert!(CandidateSource::Config < CandidateSource::Decorator);
        assert!(CandidateSource::Decorator < CandidateSource::Define);
        assert!(CandidateSource::Define < CandidateSource::StaticMembers);
        assert!(CandidateSource::StaticMembers < CandidateSource::Convention);
        assert!(CandidateSource::Convention < CandidateSource::SiblingTemplate);
        assert!(CandidateSource::SiblingTemplate < CandidateSource::PluginActivation);
        assert!(CandidateSource::PluginActivation < CandidateSource::Builtin);
    }
}
