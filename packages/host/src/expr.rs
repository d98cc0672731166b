//! Expression parser interface. Out of scope per §1 — the real parser lives outside
//! this system; `lower` only depends on this trait.

use viewc_core::expr_ast::ExprNode;
use viewc_core::ids::SourceFileId;

#[derive(Debug, Clone)]
pub struct ExprParseResult {
    pub ast: ExprNode,
    /// `true` when `ast` is (or contains) a `BadExpression` and the caller should attach
    /// a recoverable `aurelia/expr-parse-error` diagnostic rather than fail the binding.
    pub recovered: bool,
}

pub trait ExprParser {
    fn parse(&self, text: &str, offset: u32, file: Option<SourceFileId>) -> ExprParseResult;

    /// `repeat.for` has its own grammar (`<declaration> of <iterable>`); kept as a
    /// separate entry point rather than overloading `parse`.
    fn parse_for_of(&self, text: &str, offset: u32, file: Option<SourceFileId>) -> ExprParseResult;
}
