//! The gap contract: a structured record of a fact a recognizer could not determine.
//!
//! Gaps are never swallowed. Every gap produced anywhere in discovery or the template
//! pipeline must eventually be conserved into a diagnostic — see
//! `viewc_authority::diagnostics::conserve_gaps`.

use crate::ids::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapKind {
    /// Forces the owning resource's catalog confidence down to `conservative`.
    Conservative,
    /// Reduces confidence to `partial`; the fact is knowable but wasn't resolved statically.
    PartialEval,
    /// Diagnostic-only — does not affect confidence (e.g. a corrupt cache entry).
    CacheCorrupt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapResource {
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    pub what: String,
    pub why: GapKind,
    pub location: Option<Span>,
    pub suggestion: Option<String>,
    pub resource: Option<GapResource>,
}

impl Gap {
    pub fn new(what: impl Into<String>, why: GapKind) -> Self {
        Gap {
            what: what.into(),
            why,
            location: None,
            suggestion: None,
            resource: None,
        }
    }

    pub fn at(mut self, location: Span) -> Self {
        self.location = Some(location);
        self
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn for_resource(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.resource = Some(GapResource {
            kind: kind.into(),
            name: name.into(),
        });
        self
    }
}
