//! Markup tokenizer interface. Parsing markup text into a DOM tree is an external
//! collaborator per scope — this crate only defines the seam `lower` calls through.

use viewc_core::ids::Span;
use viewc_core::ir::DomNode;

#[derive(Debug, Clone)]
pub struct MarkupDiagnostic {
    pub message: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParsedMarkup {
    pub root: DomNode,
    pub diagnostics: Vec<MarkupDiagnostic>,
}

pub trait MarkupParser {
    fn parse(&self, text: &str, file: Option<viewc_core::ids::SourceFileId>) -> ParsedMarkup;
}
