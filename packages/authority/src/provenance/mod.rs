//! Component H: bidirectional provenance lookup with proportional span projection
//! (§4.H). `harvest::harvest_overlay_edges` derives `OverlayExpr` edges from a
//! template's typecheck overlay; this module itself only stores and projects them.

pub mod harvest;
pub use harvest::harvest_overlay_edges;

use indexmap::IndexMap;
use viewc_core::ids::{DocumentUri, Span};
use viewc_core::provenance::{Edge, EdgeKind};

/// Which side of an edge a query span is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The generated side: overlay program text or runtime codegen output.
    From,
    /// The authored template side.
    To,
}

#[derive(Debug, Clone)]
pub struct ProjectionResult {
    pub edge: Edge,
    pub span: Span,
    /// The longest dotted member path among edges that overlapped the query, even
    /// when the winning edge itself is not the member edge that path came from.
    pub deepest_member_path: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProvenanceIndex {
    edges_by_from: IndexMap<DocumentUri, Vec<Edge>>,
    edges_by_to: IndexMap<DocumentUri, Vec<Edge>>,
    /// Overlay-kind edges re-grouped by template uri, so repeated typecheck
    /// diagnostic translation doesn't filter the full `edges_by_to` bucket each time.
    overlay_cache: IndexMap<DocumentUri, Vec<Edge>>,
}

impl ProvenanceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edge: Edge) {
        self.edges_by_from.entry(edge.from.uri.clone()).or_default().push(edge.clone());
        self.edges_by_to.entry(edge.to.uri.clone()).or_default().push(edge.clone());
        if matches!(edge.kind, EdgeKind::OverlayExpr | EdgeKind::OverlayMember) {
            self.overlay_cache.entry(edge.to.uri.clone()).or_default().push(edge);
        }
    }

    pub fn extend(&mut self, edges: impl IntoIterator<Item = Edge>) {
        for edge in edges {
            self.insert(edge);
        }
    }

    /// Drops every edge touching `uri` on either side. Called before re-inserting a
    /// recompiled template's edges so no stale entry survives (§9 "Incremental
    /// invalidation").
    pub fn clear_uri(&mut self, uri: &DocumentUri) {
        let keep = |e: &Edge| &e.from.uri != uri && &e.to.uri != uri;
        for bucket in self.edges_by_from.values_mut() {
            bucket.retain(keep);
        }
        for bucket in self.edges_by_to.values_mut() {
            bucket.retain(keep);
        }
        for bucket in self.overlay_cache.values_mut() {
            bucket.retain(keep);
        }
        self.edges_by_from.retain(|_, v| !v.is_empty());
        self.edges_by_to.retain(|_, v| !v.is_empty());
        self.overlay_cache.retain(|_, v| !v.is_empty());
    }

    pub fn edges_from(&self, uri: &DocumentUri) -> &[Edge] {
        self.edges_by_from.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edges_to(&self, uri: &DocumentUri) -> &[Edge] {
        self.edges_by_to.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn overlay_edges_for_template(&self, template_uri: &DocumentUri) -> &[Edge] {
        self.overlay_cache.get(template_uri).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Projects a query span `query` on `uri`/`side` to its counterpart span on the
    /// other side, per the ranked-projection algorithm in §4.H.
    pub fn project(&self, uri: &DocumentUri, query: Span, side: Side) -> Option<ProjectionResult> {
        let bucket = match side {
            Side::From => self.edges_from(uri),
            Side::To => self.edges_to(uri),
        };

        let source_span = |e: &Edge| match side {
            Side::From => e.from.span,
            Side::To => e.to.span,
        };

        let candidates: Vec<&Edge> = bucket.iter().filter(|e| overlaps(source_span(e), query)).collect();
        if candidates.is_empty() {
            return None;
        }

        let deepest_member_path = candidates
            .iter()
            .filter(|e| e.kind.is_member())
            .max_by_key(|e| e.member_path_len())
            .and_then(|e| e.tag.clone());

        // An exact full-expression query matches the broadest overlapping source span
        // exactly; that's the signal to prefer shallow member paths in the tie-break
        // below instead of the usual "deeper wins" rule for partial slices.
        let broadest_len = candidates.iter().map(|e| source_span(e).len()).max().unwrap_or(0);
        let exact_full_query = query.len() == broadest_len;

        let best = candidates.into_iter().max_by(|a, b| {
            let span_a = source_span(a);
            let span_b = source_span(b);
            let overlap_a = overlap_len(span_a, query);
            let overlap_b = overlap_len(span_b, query);

            // priority: lower is better, so invert for max_by.
            let pri = b.kind.priority().cmp(&a.kind.priority());
            if pri != std::cmp::Ordering::Equal {
                return pri;
            }
            let ov = overlap_a.cmp(&overlap_b);
            if ov != std::cmp::Ordering::Equal {
                return ov;
            }
            let spec = specificity(a, side).cmp(&specificity(b, side)).reverse();
            if spec != std::cmp::Ordering::Equal {
                return spec;
            }
            let path_a = a.member_path_len();
            let path_b = b.member_path_len();
            if exact_full_query {
                path_b.cmp(&path_a)
            } else {
                path_a.cmp(&path_b)
            }
        })?;

        let span = project_edge(best, query, side);
        Some(ProjectionResult { edge: best.clone(), span, deepest_member_path })
    }
}

/// `Span::overlaps`/`overlap_len` require matching `file` ids; a query span is a bare
/// offset range against whichever uri the caller already picked, so compare ranges
/// directly instead.
fn overlaps(a: Span, b: Span) -> bool {
    a.start < b.end && b.start < a.end
}

fn overlap_len(a: Span, b: Span) -> u32 {
    if !overlaps(a, b) {
        return 0;
    }
    a.end.min(b.end) - a.start.max(b.start)
}

/// Smaller is more specific. Member edges rank by generated-span length then
/// template-span length; other edges rank by query-side length then other-side length.
fn specificity(edge: &Edge, side: Side) -> (u32, u32) {
    if edge.kind.is_member() {
        (edge.from.span.len(), edge.to.span.len())
    } else {
        let (query_side, other_side) = match side {
            Side::From => (edge.from.span, edge.to.span),
            Side::To => (edge.to.span, edge.from.span),
        };
        (query_side.len(), other_side.len())
    }
}

fn project_edge(edge: &Edge, query: Span, side: Side) -> Span {
    let (src, dst) = match side {
        Side::From => (edge.from.span, edge.to.span),
        Side::To => (edge.to.span, edge.from.span),
    };

    if edge.kind == EdgeKind::RuntimeNode {
        return dst;
    }

    let slice_start = query.start.max(src.start);
    let slice_end = query.end.min(src.end);

    if edge.kind.is_member() {
        let start = dst.start + slice_start.saturating_sub(src.start);
        let end = dst.start + slice_end.saturating_sub(src.start);
        return clamp(Span { file: dst.file, start, end }, dst);
    }

    let src_len = src.len().max(1) as f64;
    let dst_len = dst.len() as f64;
    let start_off = (slice_start - src.start) as f64;
    let end_off = (slice_end - src.start) as f64;
    let start = dst.start + (start_off * dst_len / src_len).round() as u32;
    let end = dst.start + (end_off * dst_len / src_len).round() as u32;
    clamp(Span { file: dst.file, start, end }, dst)
}

fn clamp(span: Span, bounds: Span) -> Span {
    let start = span.start.clamp(bounds.start, bounds.end);
    let end = span.end.clamp(start, bounds.end);
    Span { file: span.file, start, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::ids::SourceFileId;
    use viewc_core::provenance::EdgeEndpoint;

    fn uri(s: &str) -> DocumentUri {
        DocumentUri::new(s)
    }

    fn endpoint(u: &DocumentUri, start: u32, end: u32) -> EdgeEndpoint {
        EdgeEndpoint { uri: u.clone(), span: Span { file: Some(SourceFileId::new(0)), start, end }, expr_id: None, node_id: None }
    }

    #[test]
    fn proportional_projection_scales_middle_slice() {
        let overlay = uri("overlay.ts");
        let template = uri("app.html");
        let mut idx = ProvenanceIndex::new();
        idx.insert(Edge {
            kind: EdgeKind::OverlayExpr,
            from: endpoint(&overlay, 0, 20),
            to: endpoint(&template, 100, 110),
            tag: None,
        });

        // middle 40% of the generated span: offset 8..16 of 20.
        let query = Span { file: None, start: 8, end: 16 };
        let result = idx.project(&overlay, query, Side::From).unwrap();
        // middle 40% of the 10-wide template span: 104..108.
        assert_eq!(result.span.start, 104);
        assert_eq!(result.span.end, 108);
    }

    #[test]
    fn member_edge_uses_translation_not_scaling() {
        let overlay = uri("overlay.ts");
        let template = uri("app.html");
        let mut idx = ProvenanceIndex::new();
        idx.insert(Edge {
            kind: EdgeKind::OverlayMember,
            from: endpoint(&overlay, 0, 10),
            to: endpoint(&template, 50, 60),
            tag: Some("a.b".to_string()),
        });

        let query = Span { file: None, start: 2, end: 5 };
        let result = idx.project(&overlay, query, Side::From).unwrap();
        assert_eq!(result.span, Span { file: Some(SourceFileId::new(0)), start: 52, end: 55 });
    }

    #[test]
    fn runtime_node_edge_maps_whole_span_verbatim() {
        let runtime = uri("runtime.js");
        let template = uri("app.html");
        let mut idx = ProvenanceIndex::new();
        idx.insert(Edge {
            kind: EdgeKind::RuntimeNode,
            from: endpoint(&runtime, 0, 5),
            to: endpoint(&template, 30, 40),
            tag: None,
        });

        let query = Span { file: None, start: 1, end: 2 };
        let result = idx.project(&runtime, query, Side::From).unwrap();
        assert_eq!(result.span, Span { file: Some(SourceFileId::new(0)), start: 30, end: 40 });
    }

    #[test]
    fn member_edge_outranks_expr_edge_at_equal_overlap() {
        let overlay = uri("overlay.ts");
        let template = uri("app.html");
        let mut idx = ProvenanceIndex::new();
        idx.insert(Edge {
            kind: EdgeKind::OverlayExpr,
            from: endpoint(&overlay, 0, 10),
            to: endpoint(&template, 100, 110),
            tag: None,
        });
        idx.insert(Edge {
            kind: EdgeKind::OverlayMember,
            from: endpoint(&overlay, 0, 10),
            to: endpoint(&template, 100, 110),
            tag: Some("x".to_string()),
        });

        let query = Span { file: None, start: 2, end: 4 };
        let result = idx.project(&overlay, query, Side::From).unwrap();
        assert_eq!(result.edge.kind, EdgeKind::OverlayMember);
    }

    #[test]
    fn partial_overlap_prefers_the_deeper_member_path() {
        let overlay = uri("overlay.ts");
        let template = uri("app.html");
        let mut idx = ProvenanceIndex::new();
        idx.insert(Edge {
            kind: EdgeKind::OverlayMember,
            from: endpoint(&overlay, 0, 10),
            to: endpoint(&template, 100, 110),
            tag: Some("a".to_string()),
        });
        idx.insert(Edge {
            kind: EdgeKind::OverlayMember,
            from: endpoint(&overlay, 0, 10),
            to: endpoint(&template, 100, 110),
            tag: Some("a.b.c".to_string()),
        });

        // partial slice, not the full 0..10 span: deeper path wins.
        let query = Span { file: None, start: 2, end: 6 };
        let result = idx.project(&overlay, query, Side::From).unwrap();
        assert_eq!(result.edge.tag.as_deref(), Some("a.b.c"));
    }

    #[test]
    fn exact_full_expression_query_prefers_the_shallower_member_path() {
        let overlay = uri("overlay.ts");
        let template = uri("app.html");
        let mut idx = ProvenanceIndex::new();
        idx.insert(Edge {
            kind: EdgeKind::OverlayMember,
            from: endpoint(&overlay, 0, 10),
            to: endpoint(&template, 100, 110),
            tag: Some("a".to_string()),
        });
        idx.insert(Edge {
            kind: EdgeKind::OverlayMember,
            from: endpoint(&overlay, 0, 10),
            to: endpoint(&template, 100, 110),
            tag: Some("a.b.c".to_string()),
        });

        let query = Span { file: None, start: 0, end: 10 };
        let result = idx.project(&overlay, query, Side::From).unwrap();
        assert_eq!(result.edge.tag.as_deref(), Some("a"));
        assert_eq!(result.deepest_member_path.as_deref(), Some("a.b.c"));
    }

    #[test]
    fn clear_uri_drops_all_edges_touching_either_side() {
        let overlay = uri("overlay.ts");
        let template = uri("app.html");
        let mut idx = ProvenanceIndex::new();
        idx.insert(Edge {
            kind: EdgeKind::OverlayExpr,
            from: endpoint(&overlay, 0, 10),
            to: endpoint(&template, 100, 110),
            tag: None,
        });
        idx.clear_uri(&template);
        assert!(idx.edges_from(&overlay).is_empty());
        assert!(idx.edges_to(&template).is_empty());
    }
}
