//! Staged emitter: accumulates diagnostics across lowering/link/bind/typecheck/convergence,
//! dedups, sorts deterministically, and asserts gap conservation.

use super::codes;
use super::model::{Diagnostic, DiagnosticData, Severity};
use std::collections::HashSet;
use viewc_core::gap::Gap;

#[derive(Debug, Default)]
pub struct DiagnosticsRuntime {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsRuntime {
    pub fn new() -> Self {
        DiagnosticsRuntime::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Diagnostic lists are sorted `(file, span, code)` and deduplicated on that same
    /// key per design notes — a recompile that re-derives the same fact twice must not
    /// produce a doubled diagnostic list.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let mut seen = HashSet::new();
        self.diagnostics
            .retain(|d| seen.insert((d.sort_key(), d.message.clone())));
        self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Appends one `aurelia/gap/*` diagnostic per gap kind, so `conserve_gaps` below has
    /// something to find. Call this once discovery finishes producing `Gap` records.
    pub fn emit_gaps(&mut self, gaps: &[Gap]) {
        for gap in gaps {
            let code = gap_diagnostic_code(gap);
            let mut diagnostic = Diagnostic::new(code, gap.what.clone(), gap_severity(gap));
            if let Some(span) = gap.location {
                diagnostic.span = Some(span);
            }
            diagnostic.data = DiagnosticData {
                legacy_code: codes::legacy_code_for(code).map(str::to_string),
                resource_kind: gap.resource.as_ref().map(|r| r.kind.clone()),
                attempted_name: gap.resource.as_ref().map(|r| r.name.clone()),
                gap_kind: Some(gap.why),
                ..Default::default()
            };
            self.emit(diagnostic);
        }
    }

    /// Supplemented gap-to-diagnostic conservation pass (SPEC_FULL §12): every gap
    /// produced anywhere must have a matching `aurelia/gap/*` diagnostic, unless policy
    /// explicitly suppressed it (passed in `suppressed`).
    pub fn conserve_gaps(&self, gaps: &[Gap], suppressed: &HashSet<String>) {
        for gap in gaps {
            if suppressed.contains(&gap.what) {
                continue;
            }
            let expected_code = gap_diagnostic_code(gap);
            let found = self.diagnostics.iter().any(|d| {
                d.code == expected_code && d.data.gap_kind == Some(gap.why)
            });
            debug_assert!(
                found,
                "gap '{}' (kind {:?}) has no conserved diagnostic",
                gap.what, gap.why
            );
        }
    }
}

fn gap_diagnostic_code(gap: &Gap) -> &'static str {
    use viewc_core::gap::GapKind;
    match gap.why {
        GapKind::Conservative | GapKind::PartialEval => codes::GAP_PARTIAL_EVAL,
        GapKind::CacheCorrupt => codes::GAP_CACHE_CORRUPT,
    }
}

fn gap_severity(gap: &Gap) -> Severity {
    use viewc_core::gap::GapKind;
    match gap.why {
        GapKind::CacheCorrupt => Severity::Warning,
        GapKind::Conservative | GapKind::PartialEval => Severity::Info,
    }
}
