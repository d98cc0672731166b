//! Referential index site shapes. The index (storage, insertion-sorted maintenance,
//! reverse lookup) lives in `viewc-authority`; this crate owns the data shape since the
//! lowering/link stages (in `viewc-authority`, but built from `viewc-core` types)
//! produce these directly.

use crate::ids::{DocumentUri, Span};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceDomain {
    Template,
    ViewModel,
}

/// Closed taxonomy of reference-site kinds (§3). Deliberately not marked
/// `#[non_exhaustive]` — any new kind is a spec change, not an extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    TagName,
    CloseTagName,
    AttributeName,
    AsElementValue,
    ExpressionIdentifier,
    ExpressionPipe,
    ExpressionBehavior,
    LocalTemplateAttr,
    ImportElementFrom,
    DecoratorNameProperty,
    DecoratorStringArg,
    StaticAuName,
    DefineName,
    ImportPath,
    DependenciesClass,
    DependenciesString,
    ClassName,
    PropertyAccess,
    BindableConfigKey,
    BindableCallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextReferenceSite {
    pub domain: ReferenceDomain,
    pub reference_kind: ReferenceKind,
    pub file: DocumentUri,
    pub span: Span,
    pub name_form: String,
    pub resource_key: String,
}

impl TextReferenceSite {
    pub fn sort_key(&self) -> (String, u32) {
        (self.file.as_str().to_string(), self.span.start)
    }
}
