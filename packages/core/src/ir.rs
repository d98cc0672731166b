//! Compiled-template IR: the DOM tree, binding sources, and the tagged-union
//! instruction set that `lower` produces and `plan+emit` consumes.

use crate::expr_ast::ExprTableEntry;
use crate::ids::{ExprId, NodeId, Span, TemplateId};
use crate::semantics::BindingMode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Either a single parsed expression or an interpolation made of literal text parts
/// interleaved with expressions. Invariant: `parts.len() == exprs.len() + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BindingSource {
    Expr(ExprRef),
    Interp(InterpIR),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExprRef {
    pub id: ExprId,
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpIR {
    pub parts: Vec<String>,
    pub exprs: Vec<ExprRef>,
}

impl InterpIR {
    pub fn is_well_formed(&self) -> bool {
        self.parts.len() == self.exprs.len() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomNodeKind {
    Element,
    Text,
    Comment,
}

/// A node of the DOM tree preserved by lowering. Authored case is kept verbatim for
/// tag names and attribute names; `tag_span`/`close_tag_span` cover only the name text
/// (not the surrounding angle brackets), matching what hover/rename need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub id: NodeId,
    pub kind: DomNodeKind,
    pub tag: Option<String>,
    pub tag_span: Option<Span>,
    pub close_tag_span: Option<Span>,
    pub end_of_open_span: Option<Span>,
    pub text: Option<String>,
    pub attrs: Vec<AuthoredAttr>,
    pub children: Vec<DomNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoredAttr {
    pub name: String,
    pub name_span: Span,
    pub value: String,
    pub value_span: Span,
}

/// One targeted node's compiled instructions, in deterministic authoring order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionRow {
    pub target: NodeId,
    pub instructions: Vec<Instruction>,
}

/// Tagged union over every instruction kind `lower`/`link` can emit. Context-restricted
/// subsets (element props vs. custom-attribute props vs. template-controller props) are
/// enforced by the stage that builds these, not by the type itself — the type stays
/// flat so `plan+emit` can serialize it uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Instruction {
    PropertyBinding {
        to: String,
        from: BindingSource,
        mode: BindingMode,
    },
    AttributeBinding {
        attr: String,
        to: String,
        from: BindingSource,
    },
    StyleBinding {
        to: String,
        from: BindingSource,
    },
    ListenerBinding {
        event: String,
        from: BindingSource,
        capture: bool,
    },
    RefBinding {
        from: BindingSource,
        target_kind: RefTargetKind,
    },
    LetBinding {
        to_view_model: bool,
        bindings: Vec<LetBindingInstruction>,
    },
    IteratorBinding {
        to: String,
        from: BindingSource,
    },
    TextBinding {
        from: BindingSource,
    },
    TranslationBinding {
        to: String,
        from: BindingSource,
    },
    SetAttribute {
        attr: String,
        value: String,
    },
    SetClassAttribute {
        value: String,
    },
    SetStyleAttribute {
        value: String,
    },
    SetProperty {
        to: String,
        value: String,
    },
    HydrateElement {
        resource: String,
        props: Vec<Instruction>,
        captures: Vec<AuthoredAttr>,
    },
    HydrateAttribute {
        resource: String,
        props: Vec<Instruction>,
    },
    HydrateTemplateController {
        resource: String,
        template: TemplateId,
        props: Vec<Instruction>,
        /// The preceding sibling controller this one continues (`else` -> its `if`,
        /// `then`/`catch` -> their `promise`, `case`/`default-case` -> their `switch`),
        /// linked by `lower`'s post-pass. `None` for a controller with no predecessor.
        continuation_of: Option<NodeId>,
    },
    HydrateLetElement {
        bindings: Vec<LetBindingInstruction>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetBindingInstruction {
    pub to: String,
    pub from: BindingSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefTargetKind {
    Element,
    Controller,
    Component,
    Custom(u8),
}

/// Template-meta elements (`<import>`, `<bindable>`, `<use-shadow-dom>`, …) extracted
/// from the root template only, per lowering's responsibilities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateMetaIR {
    pub imports: Vec<ImportMeta>,
    pub requires: Vec<ImportMeta>,
    pub bindables: Vec<BindableMeta>,
    pub use_shadow_dom: Option<ShadowDomMeta>,
    pub containerless: bool,
    pub capture: bool,
    pub aliases: Vec<AliasMeta>,
    pub has_slot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportMeta {
    pub from: String,
    pub from_span: Span,
    pub as_element: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindableMeta {
    pub name: String,
    pub name_span: Span,
    pub attribute: Option<String>,
    pub mode: Option<BindingMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowDomMeta {
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasMeta {
    pub name: String,
    pub name_span: Span,
}

/// Controller-host reference carried by a nested template, letting `bind` find the
/// controller's own scope frame when it opens one for this subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateOrigin {
    pub host_node: NodeId,
    pub controller_resource: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateIR {
    pub id: TemplateId,
    pub fragment_root: DomNode,
    pub rows: Vec<InstructionRow>,
    pub meta: Option<TemplateMetaIR>,
    pub origin: Option<TemplateOrigin>,
}

impl TemplateIR {
    pub fn is_root(&self) -> bool {
        self.origin.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoweringDiagnostic {
    pub code: String,
    pub message: String,
    pub span: Option<Span>,
    pub recovery: bool,
}

/// The complete compiled output of `lower`: one root template, zero or more nested
/// templates (one per template-controller host), the shared expr table, and any
/// lowering diagnostics. Immutable once produced; consumed by `link`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrModule {
    pub templates: Vec<TemplateIR>,
    pub expr_table: IndexMap<ExprId, ExprTableEntry>,
    pub diagnostics: Vec<LoweringDiagnostic>,
}

impl IrModule {
    pub fn root(&self) -> &TemplateIR {
        &self.templates[0]
    }

    pub fn template(&self, id: TemplateId) -> Option<&TemplateIR> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Node ids are unique within their own template only, so uniqueness must be
    /// checked per template, not across the whole module.
    pub fn node_ids_unique_within_templates(&self) -> bool {
        self.templates.iter().all(|t| {
            let mut seen = std::collections::HashSet::new();
            let mut ok = true;
            visit_nodes(&t.fragment_root, &mut |n| {
                if !seen.insert(n.id) {
                    ok = false;
                }
            });
            ok
        })
    }

    pub fn template_ids_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.templates.iter().all(|t| seen.insert(t.id))
    }
}

fn visit_nodes(node: &DomNode, f: &mut impl FnMut(&DomNode)) {
    f(node);
    for child in &node.children {
        visit_nodes(child, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_root() -> TemplateIR {
        TemplateIR {
            id: TemplateId::new(0),
            fragment_root: DomNode {
                id: NodeId::new(0),
                kind: DomNodeKind::Element,
                tag: None,
                tag_span: None,
                close_tag_span: None,
                end_of_open_span: None,
                text: None,
                attrs: vec![],
                children: vec![],
            },
            rows: vec![],
            meta: None,
            origin: None,
        }
    }

    #[test]
    fn empty_template_has_no_rows_or_diagnostics() {
        let module = IrModule {
            templates: vec![empty_root()],
            expr_table: IndexMap::new(),
            diagnostics: vec![],
        };
        assert!(module.root().rows.is_empty());
        assert!(module.diagnostics.is_empty());
        assert!(module.root().is_root());
    }

    #[test]
    fn interp_well_formed_requires_one_more_part_than_expr() {
        let interp = InterpIR {
            parts: vec!["a".into(), "b".into()],
            exprs: vec![ExprRef {
                id: ExprId::new(0),
                text: "x".into(),
                span: Span::synthetic(0, 1),
            }],
        };
        assert!(interp.is_well_formed());
        let bad = InterpIR {
            parts: vec!["a".into()],
            exprs: vec![ExprRef {
                id: ExprId::new(0),
                text: "x".into(),
                span: Span::synthetic(0, 1),
            }],
        };
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn node_ids_unique_per_template_detected() {
        let mut root = empty_root();
        root.fragment_root.children.push(DomNode {
            id: NodeId::new(0),
            kind: DomNodeKind::Element,
            tag: Some("div".into()),
            tag_span: None,
            close_tag_span: None,
            end_of_open_span: None,
            text: None,
            attrs: vec![],
            children: vec![],
        });
        let module = IrModule {
            templates: vec![root],
            expr_table: IndexMap::new(),
            diagnostics: vec![],
        };
        assert!(!module.node_ids_unique_within_templates());
    }
}
