//! `DefinitionConvergenceRecord`: emitted whenever two candidates for the same
//! `(kind, name)` disagree on a field, surfaced later as an
//! `aurelia/project/definition-convergence` diagnostic.

use crate::discovery::CandidateSource;
use crate::diagnostics::Severity;
use viewc_core::semantics::ResourceKind;

#[derive(Debug, Clone)]
pub struct CandidateValue {
    pub source: CandidateSource,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct DefinitionConvergenceRecord {
    pub resource_kind: ResourceKind,
    pub resource_name: String,
    pub field: String,
    pub candidates: Vec<CandidateValue>,
    pub reasons: Vec<String>,
}

impl DefinitionConvergenceRecord {
    /// Severity is a deterministic function of the field name alone — never of which
    /// candidates were involved, so the same field disagreement always reports the
    /// same severity (see §4.E: "if two paths could assign different severities,
    /// treat that as a normalization bug").
    pub fn severity(&self) -> Severity {
        field_severity(&self.field)
    }
}

pub fn field_severity(field: &str) -> Severity {
    if field == "name" {
        Severity::Error
    } else if field.ends_with(".attribute") {
        Severity::Warning
    } else if field.ends_with(".mode") || field.ends_with(".primary") {
        Severity::Info
    } else {
        Severity::Info
    }
}
