//! Identifier/span primitives, the IR and scope-graph data model, the built-in
//! semantics registry, and the other shared shapes (provenance edges, referential
//! sites, the command envelope) that both `viewc-authority` and `viewc-host` build on.

pub mod builtins;
pub mod envelope;
pub mod expr_ast;
pub mod gap;
pub mod ids;
pub mod ir;
pub mod provenance;
pub mod refsite;
pub mod scope_ir;
pub mod semantics;
pub mod version;

pub use ids::{
    DocumentUri, ExprId, FileTable, FrameId, NodeId, ResourceScopeId, SourceFileId, Span,
    TemplateId,
};
