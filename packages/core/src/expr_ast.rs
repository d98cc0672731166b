//! Expression AST shapes. Parsing itself is an external collaborator (`viewc-host`'s
//! `ExprParser`) but the shape of the tree is part of the IR model this crate owns, since
//! the link/bind stages and the referential index all need to walk it.

use crate::ids::{ExprId, Span};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Void,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    In,
    Instanceof,
}

/// Node in a parsed binding expression. Named after the shapes the link/bind stages
/// need to distinguish scope reads, member access, calls, and the `|`/`&` operators
/// that reference value converters and binding behaviors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprNode {
    /// `foo`, or `foo` read from `ancestor` scopes up (`$parent.$parent.foo`).
    AccessScope {
        name: String,
        ancestor: u32,
        span: Span,
    },
    AccessThis {
        ancestor: u32,
        span: Span,
    },
    AccessMember {
        object: Box<ExprNode>,
        name: String,
        optional: bool,
        span: Span,
    },
    AccessKeyed {
        object: Box<ExprNode>,
        key: Box<ExprNode>,
        span: Span,
    },
    CallScope {
        name: String,
        ancestor: u32,
        args: Vec<ExprNode>,
        span: Span,
    },
    CallMember {
        object: Box<ExprNode>,
        name: String,
        args: Vec<ExprNode>,
        span: Span,
    },
    CallFunction {
        callee: Box<ExprNode>,
        args: Vec<ExprNode>,
        span: Span,
    },
    /// `expr | name:arg1:arg2`.
    ValueConverter {
        expr: Box<ExprNode>,
        name: String,
        name_span: Span,
        args: Vec<ExprNode>,
        span: Span,
    },
    /// `expr & name:arg1:arg2`.
    BindingBehavior {
        expr: Box<ExprNode>,
        name: String,
        name_span: Span,
        args: Vec<ExprNode>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprNode>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
        span: Span,
    },
    Conditional {
        cond: Box<ExprNode>,
        yes: Box<ExprNode>,
        no: Box<ExprNode>,
        span: Span,
    },
    ArrayLiteral {
        elements: Vec<ExprNode>,
        span: Span,
    },
    ObjectLiteral {
        keys: Vec<String>,
        values: Vec<ExprNode>,
        span: Span,
    },
    Literal {
        value: LiteralValue,
        span: Span,
    },
    Template {
        cooked: Vec<String>,
        expressions: Vec<ExprNode>,
        span: Span,
    },
    /// `for` of `repeat.for`: destructuring iterator declaration over `iterable`.
    ForOfStatement {
        declaration: IteratorDeclaration,
        iterable: Box<ExprNode>,
        span: Span,
    },
    /// A fragment that failed to parse. Recoverable: the surrounding binding is still
    /// emitted with this node standing in for the unparseable expression.
    BadExpression { message: String, span: Span },
}

impl ExprNode {
    pub fn span(&self) -> Span {
        match self {
            ExprNode::AccessScope { span, .. }
            | ExprNode::AccessThis { span, .. }
            | ExprNode::AccessMember { span, .. }
            | ExprNode::AccessKeyed { span, .. }
            | ExprNode::CallScope { span, .. }
            | ExprNode::CallMember { span, .. }
            | ExprNode::CallFunction { span, .. }
            | ExprNode::ValueConverter { span, .. }
            | ExprNode::BindingBehavior { span, .. }
            | ExprNode::Unary { span, .. }
            | ExprNode::Binary { span, .. }
            | ExprNode::Conditional { span, .. }
            | ExprNode::ArrayLiteral { span, .. }
            | ExprNode::ObjectLiteral { span, .. }
            | ExprNode::Literal { span, .. }
            | ExprNode::Template { span, .. }
            | ExprNode::ForOfStatement { span, .. }
            | ExprNode::BadExpression { span, .. } => *span,
        }
    }

    pub fn is_bad(&self) -> bool {
        matches!(self, ExprNode::BadExpression { .. })
    }

    /// Every value-converter name referenced anywhere in this expression tree, including
    /// chained converters (`expr | a | b`), outermost first.
    pub fn converter_names(&self) -> Vec<(&str, Span)> {
        let mut out = Vec::new();
        self.walk_converters_and_behaviors(&mut out, &mut Vec::new());
        out
    }

    pub fn behavior_names(&self) -> Vec<(&str, Span)> {
        let mut out = Vec::new();
        let mut converters = Vec::new();
        self.walk_converters_and_behaviors(&mut converters, &mut out);
        out
    }

    /// Every scope-rooted identifier read anywhere in this expression tree
    /// (`AccessScope`/`CallScope`), each paired with the span of the identifier itself.
    /// Member names on the right of `.`/`[]` are not scope reads and are excluded.
    pub fn identifier_occurrences(&self) -> Vec<(&str, Span)> {
        let mut out = Vec::new();
        self.walk_identifiers(&mut out);
        out
    }

    fn walk_identifiers<'a>(&'a self, out: &mut Vec<(&'a str, Span)>) {
        match self {
            ExprNode::AccessScope { name, span, .. } => out.push((name.as_str(), *span)),
            ExprNode::AccessThis { .. } => {}
            ExprNode::AccessMember { object, .. } => object.walk_identifiers(out),
            ExprNode::AccessKeyed { object, key, .. } => {
                object.walk_identifiers(out);
                key.walk_identifiers(out);
            }
            ExprNode::CallScope { name, span, args, .. } => {
                out.push((name.as_str(), *span));
                for a in args {
                    a.walk_identifiers(out);
                }
            }
            ExprNode::CallMember { object, args, .. } => {
                object.walk_identifiers(out);
                for a in args {
                    a.walk_identifiers(out);
                }
            }
            ExprNode::CallFunction { callee, args, .. } => {
                callee.walk_identifiers(out);
                for a in args {
                    a.walk_identifiers(out);
                }
            }
            ExprNode::ValueConverter { expr, args, .. } | ExprNode::BindingBehavior { expr, args, .. } => {
                expr.walk_identifiers(out);
                for a in args {
                    a.walk_identifiers(out);
                }
            }
            ExprNode::Unary { operand, .. } => operand.walk_identifiers(out),
            ExprNode::Binary { left, right, .. } => {
                left.walk_identifiers(out);
                right.walk_identifiers(out);
            }
            ExprNode::Conditional { cond, yes, no, .. } => {
                cond.walk_identifiers(out);
                yes.walk_identifiers(out);
                no.walk_identifiers(out);
            }
            ExprNode::ArrayLiteral { elements, .. } => {
                for e in elements {
                    e.walk_identifiers(out);
                }
            }
            ExprNode::ObjectLiteral { values, .. } => {
                for v in values {
                    v.walk_identifiers(out);
                }
            }
            ExprNode::Literal { .. } => {}
            ExprNode::Template { expressions, .. } => {
                for e in expressions {
                    e.walk_identifiers(out);
                }
            }
            ExprNode::ForOfStatement { iterable, .. } => iterable.walk_identifiers(out),
            ExprNode::BadExpression { .. } => {}
        }
    }

    fn walk_converters_and_behaviors<'a>(
        &'a self,
        converters: &mut Vec<(&'a str, Span)>,
        behaviors: &mut Vec<(&'a str, Span)>,
    ) {
        match self {
            ExprNode::ValueConverter { expr, name, name_span, args, .. } => {
                converters.push((name.as_str(), *name_span));
                expr.walk_converters_and_behaviors(converters, behaviors);
                for a in args {
                    a.walk_converters_and_behaviors(converters, behaviors);
                }
            }
            ExprNode::BindingBehavior { expr, name, name_span, args, .. } => {
                behaviors.push((name.as_str(), *name_span));
                expr.walk_converters_and_behaviors(converters, behaviors);
                for a in args {
                    a.walk_converters_and_behaviors(converters, behaviors);
                }
            }
            ExprNode::AccessMember { object, .. } | ExprNode::Unary { operand: object, .. } => {
                object.walk_converters_and_behaviors(converters, behaviors);
            }
            ExprNode::AccessKeyed { object, key, .. } => {
                object.walk_converters_and_behaviors(converters, behaviors);
                key.walk_converters_and_behaviors(converters, behaviors);
            }
            ExprNode::CallMember { object, args, .. } => {
                object.walk_converters_and_behaviors(converters, behaviors);
                for a in args {
                    a.walk_converters_and_behaviors(converters, behaviors);
                }
            }
            ExprNode::CallScope { args, .. } => {
                for a in args {
                    a.walk_converters_and_behaviors(converters, behaviors);
                }
            }
            ExprNode::CallFunction { callee, args, .. } => {
                callee.walk_converters_and_behaviors(converters, behaviors);
                for a in args {
                    a.walk_converters_and_behaviors(converters, behaviors);
                }
            }
            ExprNode::Binary { left, right, .. } => {
                left.walk_converters_and_behaviors(converters, behaviors);
                right.walk_converters_and_behaviors(converters, behaviors);
            }
            ExprNode::Conditional { cond, yes, no, .. } => {
                cond.walk_converters_and_behaviors(converters, behaviors);
                yes.walk_converters_and_behaviors(converters, behaviors);
                no.walk_converters_and_behaviors(converters, behaviors);
            }
            ExprNode::ArrayLiteral { elements, .. } => {
                for e in elements {
                    e.walk_converters_and_behaviors(converters, behaviors);
                }
            }
            ExprNode::ObjectLiteral { values, .. } => {
                for v in values {
                    v.walk_converters_and_behaviors(converters, behaviors);
                }
            }
            ExprNode::Template { expressions, .. } => {
                for e in expressions {
                    e.walk_converters_and_behaviors(converters, behaviors);
                }
            }
            ExprNode::ForOfStatement { iterable, .. } => {
                iterable.walk_converters_and_behaviors(converters, behaviors);
            }
            ExprNode::AccessScope { .. }
            | ExprNode::AccessThis { .. }
            | ExprNode::Literal { .. }
            | ExprNode::BadExpression { .. } => {}
        }
    }
}

/// A single destructured or plain binding target in `repeat.for`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IteratorDeclaration {
    Identifier(String),
    ArrayDestructure(Vec<String>),
    ObjectDestructure(Vec<(String, String)>),
}

/// A parsed (or partially-parsed) expression keyed by its `ExprId` in the shared
/// expr table. `text` preserves the authored source so the link stage can report
/// span-precise diagnostics without re-deriving it from `ast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExprTableEntry {
    pub id: ExprId,
    pub text: String,
    pub span: Span,
    pub ast: ExprNode,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_span() -> Span {
        Span::synthetic(0, 1)
    }

    #[test]
    fn converter_names_chain_outermost_first() {
        let expr = ExprNode::ValueConverter {
            expr: Box::new(ExprNode::ValueConverter {
                expr: Box::new(ExprNode::AccessScope {
                    name: "items".into(),
                    ancestor: 0,
                    span: id_span(),
                }),
                name: "sort".into(),
                name_span: id_span(),
                args: vec![],
                span: id_span(),
            }),
            name: "take".into(),
            name_span: id_span(),
            args: vec![],
            span: id_span(),
        };
        let names: Vec<&str> = expr.converter_names().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["take", "sort"]);
    }

    #[test]
    fn bad_expression_is_recoverable_marker() {
        let bad = ExprNode::BadExpression {
            message: "unexpected end of expression".into(),
            span: id_span(),
        };
        assert!(bad.is_bad());
    }
}
