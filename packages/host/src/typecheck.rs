//! The host type-checker used for overlay generation (§4.G.4, §6). Out of scope for
//! this subsystem's own implementation — the typecheck stage only depends on this trait.

use viewc_core::ids::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayDiagnosticCategory {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct OverlayDiagnostic {
    pub category: OverlayDiagnosticCategory,
    pub message: String,
    /// Span into the *overlay* source; the typecheck stage translates this back to a
    /// template span through the provenance index.
    pub overlay_span: Span,
}

/// A synthesized overlay source file: one statement per template expression, each
/// carrying the `overlaySpan` it occupies in `text`.
#[derive(Debug, Clone)]
pub struct OverlayProgram {
    pub text: String,
    pub statement_spans: Vec<Span>,
}

pub trait HostTypeChecker {
    fn check(&self, overlay: &OverlayProgram) -> Vec<OverlayDiagnostic>;
}
