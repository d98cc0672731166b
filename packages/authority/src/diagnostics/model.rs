//! The diagnostic shape itself, and the fatal/recoverable split: recoverable failures
//! become a `Diagnostic` and compilation continues; an `AuthorityFault` is an internal
//! invariant violation that surfaces at the command boundary instead.

use serde::{Deserialize, Serialize};
use viewc_core::gap::GapKind;
use viewc_core::ids::{DocumentUri, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticData {
    pub legacy_code: Option<String>,
    pub resource_kind: Option<String>,
    pub attempted_name: Option<String>,
    pub command: Option<String>,
    pub field: Option<String>,
    pub candidates: Vec<String>,
    pub gap_kind: Option<GapKind>,
    pub recovery: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub severity: Severity,
    pub file: Option<DocumentUri>,
    pub span: Option<Span>,
    pub data: DiagnosticData,
}

impl Diagnostic {
    pub fn new(code: &'static str, message: impl Into<String>, severity: Severity) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            severity,
            file: None,
            span: None,
            data: DiagnosticData {
                legacy_code: crate::diagnostics::codes::legacy_code_for(code).map(str::to_string),
                ..Default::default()
            },
        }
    }

    pub fn at(mut self, file: DocumentUri, span: Span) -> Self {
        self.file = Some(file);
        self.span = Some(span);
        self
    }

    pub fn with_data(mut self, f: impl FnOnce(&mut DiagnosticData)) -> Self {
        f(&mut self.data);
        self
    }

    /// Sort key per design notes: all diagnostic lists are ordered `(file, span, code)`.
    pub fn sort_key(&self) -> (String, u32, &'static str) {
        (
            self.file.as_ref().map(|f| f.as_str().to_string()).unwrap_or_default(),
            self.span.map(|s| s.start).unwrap_or(0),
            self.code,
        )
    }
}

/// An internal invariant violation — "should never happen" per §7. Carried in the
/// command envelope's error status with an `anyhow` context chain, never surfaced as a
/// regular diagnostic and never allowed to corrupt workspace state.
#[derive(Debug, thiserror::Error)]
#[error("authority fault: {context}")]
pub struct AuthorityFault {
    pub context: String,
    #[source]
    pub source: anyhow::Error,
}

impl AuthorityFault {
    pub fn new(context: impl Into<String>, source: anyhow::Error) -> Self {
        AuthorityFault {
            context: context.into(),
            source,
        }
    }
}
