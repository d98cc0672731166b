//! Scope graph IR: the frame tree `bind` produces, mapping every expression occurrence
//! in a template to the lexical frame it evaluates in.

use crate::expr_ast::IteratorDeclaration;
use crate::ids::{ExprId, FrameId, TemplateId};
use crate::semantics::FramePatternKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    Root,
    Overlay,
}

/// The value expression whose properties act as the implicit `this` for an overlay
/// frame (`with.bind="value"`, `repeat.for="item of items"`'s per-iteration scope).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayBase {
    pub expr: ExprId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOrigin {
    pub pattern: FramePatternKind,
    pub host_node_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SymbolKind {
    Let,
    IteratorLocal,
    Contextual,
    Alias,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeSymbol {
    pub name: String,
    pub kind: SymbolKind,
}

pub const ITERATOR_CONTEXTUALS: &[&str] = &[
    "$index", "$first", "$last", "$even", "$odd", "$length", "$middle",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeFrame {
    pub id: FrameId,
    pub parent: Option<FrameId>,
    pub kind: FrameKind,
    pub overlay_base: Option<OverlayBase>,
    pub symbols: Vec<ScopeSymbol>,
    pub origin: Option<FrameOrigin>,
    pub let_value_exprs: Vec<ExprId>,
    pub iterator_declaration: Option<IteratorDeclaration>,
}

impl ScopeFrame {
    pub fn has_symbol(&self, name: &str) -> bool {
        self.symbols.iter().any(|s| s.name == name) || ITERATOR_CONTEXTUALS.contains(&name)
    }

    /// Invariant (§3): an overlay frame may carry `overlay_base` *or* locals that match
    /// its origin pattern, never both contradicting each other — e.g. an iterator-origin
    /// frame has locals but no overlay_base; a value-overlay frame has overlay_base but
    /// no iterator locals.
    pub fn is_consistent_with_origin(&self) -> bool {
        match self.origin.as_ref().map(|o| o.pattern) {
            Some(FramePatternKind::Iterator) => self.overlay_base.is_none(),
            Some(FramePatternKind::ValueOverlay) => {
                self.overlay_base.is_some()
                    && !self.symbols.iter().any(|s| matches!(s.kind, SymbolKind::IteratorLocal))
            }
            Some(FramePatternKind::PromiseValue) | Some(FramePatternKind::PromiseBranch) => true,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeTemplate {
    pub template: TemplateId,
    pub frames: Vec<ScopeFrame>,
    pub root_frame: Option<FrameId>,
    pub expr_to_frame: IndexMap<ExprId, FrameId>,
}

impl ScopeTemplate {
    pub fn frame(&self, id: FrameId) -> Option<&ScopeFrame> {
        self.frames.iter().find(|f| f.id == id)
    }

    /// Invariant (§3): frame parents precede children in `frames`.
    pub fn parents_precede_children(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for frame in &self.frames {
            if let Some(parent) = frame.parent {
                if !seen.contains(&parent) {
                    return false;
                }
            }
            seen.insert(frame.id);
        }
        true
    }

    /// Invariant (§3): every expression occurring anywhere in the template has exactly
    /// one frame mapping. Callers pass in the complete set of expression ids that occur
    /// in the template's bindings (from the IR module's instruction rows).
    pub fn every_expr_mapped(&self, occurring: &[ExprId]) -> bool {
        occurring.iter().all(|id| self.expr_to_frame.contains_key(id))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeModule {
    pub templates: Vec<ScopeTemplate>,
}

impl ScopeModule {
    pub fn template(&self, id: TemplateId) -> Option<&ScopeTemplate> {
        self.templates.iter().find(|t| t.template == id)
    }
}
