//! Derives `OverlayExpr` edges from a template's overlay program: one edge per
//! overlay statement, linking its synthesized span back to the template expression
//! it re-expresses. Run once per recompile, after `typecheck`, over every overlay in
//! its output.
//!
//! `OverlayMember` edges (member-access sub-node granularity) aren't produced here —
//! that needs a second traversal of each expression's AST correlated against the
//! overlay's member-access positions, which no stage in the pipeline computes yet.

use viewc_core::ids::DocumentUri;
use viewc_core::ir::IrModule;
use viewc_core::provenance::{Edge, EdgeEndpoint, EdgeKind};

use crate::pipeline::typecheck::TemplateOverlay;

/// The synthetic uri an overlay's statements live under, distinct from the real
/// template file so `ProvenanceIndex::clear_uri(file)` and an overlay-side query can
/// both address their own side of the edge unambiguously.
fn overlay_uri(file: &DocumentUri, overlay: &TemplateOverlay) -> DocumentUri {
    DocumentUri::new(format!("{}#overlay-{}", file.as_str(), overlay.template.0))
}

pub fn harvest_overlay_edges(overlays: &[TemplateOverlay], module: &IrModule, file: &DocumentUri) -> Vec<Edge> {
    let mut edges = Vec::new();
    for overlay in overlays {
        let overlay_file = overlay_uri(file, overlay);
        for (stmt_span, expr_id) in overlay.program.statement_spans.iter().zip(&overlay.expr_order) {
            let Some(entry) = module.expr_table.get(expr_id) else { continue };
            edges.push(Edge {
                kind: EdgeKind::OverlayExpr,
                from: EdgeEndpoint { uri: overlay_file.clone(), span: *stmt_span, expr_id: Some(*expr_id), node_id: None },
                to: EdgeEndpoint { uri: file.clone(), span: entry.span, expr_id: Some(*expr_id), node_id: None },
                tag: None,
            });
        }
    }
    edges
}
