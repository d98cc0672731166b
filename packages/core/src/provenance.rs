//! Provenance edge shapes shared between the template pipeline (which produces them)
//! and the provenance index (which stores and projects them).

use crate::ids::{DocumentUri, ExprId, NodeId, Span};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    OverlayExpr,
    OverlayMember,
    RuntimeExpr,
    RuntimeMember,
    RuntimeNode,
    Custom,
}

impl EdgeKind {
    /// Lower is better in projection ranking (§4.H): `overlayMember < overlayExpr <
    /// runtimeMember < runtimeExpr < runtimeNode < custom`.
    pub fn priority(self) -> u8 {
        match self {
            EdgeKind::OverlayMember => 0,
            EdgeKind::OverlayExpr => 1,
            EdgeKind::RuntimeMember => 2,
            EdgeKind::RuntimeExpr => 3,
            EdgeKind::RuntimeNode => 4,
            EdgeKind::Custom => 5,
        }
    }

    pub fn is_member(self) -> bool {
        matches!(self, EdgeKind::OverlayMember | EdgeKind::RuntimeMember)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEndpoint {
    pub uri: DocumentUri,
    pub span: Span,
    pub expr_id: Option<ExprId>,
    pub node_id: Option<NodeId>,
}

/// A directed edge from a *generated* span (overlay or runtime) to its *template*
/// source span. `tag` carries the dotted member path for member edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub from: EdgeEndpoint,
    pub to: EdgeEndpoint,
    pub tag: Option<String>,
}

impl Edge {
    pub fn member_path_len(&self) -> usize {
        self.tag.as_ref().map(|t| t.split('.').count()).unwrap_or(0)
    }
}
