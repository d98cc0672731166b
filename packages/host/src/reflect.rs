//! View-model reflection: the AST transform named in §4.D/§6 that turns a view-model
//! source file into the flat set of facts discovery's recognizers pattern-match over
//! (decorator usages, `.define`/`.register` calls, static class members, imports).
//! Real static evaluation of a typed scripting language's AST is external; this crate
//! only defines the shape that evaluation produces.

use serde::{Deserialize, Serialize};
use viewc_core::ids::{DocumentUri, Span};
use indexmap::IndexMap;

/// The statically-evaluated form of an argument/member value. `Dynamic` means the
/// reflector could not reduce the expression to a literal — recognizers turn this into
/// a `partial-eval` gap rather than guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReflectedValue {
    String(String, Span),
    Number(f64),
    Bool(bool),
    Array(Vec<ReflectedValue>),
    Object(IndexMap<String, ReflectedValue>),
    /// A reference to an imported or locally-declared symbol (e.g. a `ClassRef` in
    /// `.define(spec, ClassRef)`), carrying the name as authored and its span.
    Reference(String, Span),
    Dynamic,
}

impl ReflectedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReflectedValue::String(s, _) => Some(s),
            _ => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ReflectedValue::String(_, s) | ReflectedValue::Reference(_, s) => Some(*s),
            _ => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, ReflectedValue::Dynamic)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectedDecorator {
    pub name: String,
    pub name_span: Span,
    pub args: Vec<ReflectedValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectedCall {
    /// Dotted callee path, e.g. `["container", "register"]` for `container.register(...)`
    /// or `["CustomElement", "define"]` for `CustomElement.define(...)`.
    pub callee_path: Vec<String>,
    pub callee_span: Span,
    pub args: Vec<ReflectedValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectedImport {
    pub specifier: String,
    pub specifier_span: Span,
    pub imported_name: Option<String>,
    pub local_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectedProperty {
    pub name: String,
    pub name_span: Span,
    pub decorators: Vec<ReflectedDecorator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectedClass {
    pub name: String,
    pub name_span: Span,
    pub is_exported: bool,
    pub decorators: Vec<ReflectedDecorator>,
    pub static_members: IndexMap<String, ReflectedValue>,
    pub properties: Vec<ReflectedProperty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectedModule {
    pub file: DocumentUri,
    pub classes: Vec<ReflectedClass>,
    pub calls: Vec<ReflectedCall>,
    pub imports: Vec<ReflectedImport>,
}

/// The two hooks the typecheck stage needs from the host's type system, named directly
/// in §6: the synthetic view-model type expression for overlay generation, and the
/// naming prefix used for synthesized overlay identifiers.
pub trait VmReflection {
    fn reflect(&self, file: &DocumentUri) -> ReflectedModule;
    fn get_root_vm_type_expr(&self, file: &DocumentUri, class_name: &str) -> String;
    fn get_synthetic_prefix(&self) -> &str;
}
