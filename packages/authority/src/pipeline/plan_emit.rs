//! 4.G.5 Plan & Emit: computes final per-template instruction ordering, collects
//! hydration targets, resolves nested-template indices, and serializes the result into
//! a compact instruction+expression table plus hydration-marker-annotated HTML (and a
//! parallel marker-free overlay HTML for editor queries). Deterministic: identical
//! linked+scoped inputs (an unchanged `IrModule`) always produce a byte-identical
//! `Plan`, since every map here is insertion-ordered and the walk order is fixed by
//! `lower`'s own deterministic node numbering.

use indexmap::{IndexMap, IndexSet};
use viewc_core::expr_ast::ExprTableEntry;
use viewc_core::ids::{ExprId, NodeId, Span, TemplateId};
use viewc_core::ir::{DomNode, DomNodeKind, InstructionRow, IrModule, TemplateIR};

#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    /// Zeroes every expr table entry's top-level span. Production builds don't ship
    /// source spans; editor builds do (`§4.G.5`'s "optional span-stripping").
    pub strip_spans: bool,
    /// Collapses expressions with identical authored text to a single table entry.
    pub dedup_exprs: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions { strip_spans: false, dedup_exprs: false }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub template: TemplateId,
    /// Nodes that need a hydration marker, in document order.
    pub targets: Vec<NodeId>,
    pub rows: Vec<InstructionRow>,
    /// AOT template HTML with `<!--au-->` sentinels inserted before each target.
    pub html: String,
    /// Marker-free HTML, parallel output for editor queries.
    pub overlay_html: String,
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub templates: Vec<CompiledTemplate>,
    /// A nested template's position in `templates`, so `HydrateTemplateController`'s
    /// `TemplateId` can be resolved to a direct array index at runtime instead of a
    /// lookup by id.
    pub template_index: IndexMap<TemplateId, usize>,
    pub expr_table: IndexMap<ExprId, ExprTableEntry>,
    /// Populated only when `dedup_exprs` collapsed a duplicate onto an earlier id;
    /// maps the dropped id to the canonical one it was folded into.
    pub expr_aliases: IndexMap<ExprId, ExprId>,
}

pub fn plan_and_emit(module: &IrModule, options: &EmitOptions) -> Plan {
    let mut templates = Vec::new();
    let mut template_index = IndexMap::new();
    for (idx, template) in module.templates.iter().enumerate() {
        template_index.insert(template.id, idx);
        templates.push(compile_template(template));
    }

    let (mut expr_table, expr_aliases) = if options.dedup_exprs {
        dedup_expr_table(&module.expr_table)
    } else {
        (module.expr_table.clone(), IndexMap::new())
    };
    if options.strip_spans {
        strip_spans(&mut expr_table);
    }

    Plan { templates, template_index, expr_table, expr_aliases }
}

fn compile_template(template: &TemplateIR) -> CompiledTemplate {
    let targets: IndexSet<NodeId> = template.rows.iter().map(|row| row.target).collect();

    let mut html = String::new();
    render_node(&template.fragment_root, &targets, true, &mut html);

    let mut overlay_html = String::new();
    render_node(&template.fragment_root, &targets, false, &mut overlay_html);

    CompiledTemplate {
        template: template.id,
        targets: targets.into_iter().collect(),
        rows: template.rows.clone(),
        html,
        overlay_html,
    }
}

fn render_node(node: &DomNode, targets: &IndexSet<NodeId>, with_markers: bool, out: &mut String) {
    match node.kind {
        DomNodeKind::Text => {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
            return;
        }
        DomNodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(node.text.as_deref().unwrap_or(""));
            out.push_str("-->");
            return;
        }
        DomNodeKind::Element => {}
    }

    if with_markers && targets.contains(&node.id) {
        out.push_str("<!--au-->");
    }

    let tag = node.tag.as_deref().unwrap_or("div");
    out.push('<');
    out.push_str(tag);
    for attr in &node.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&attr.value);
        out.push('"');
    }
    out.push('>');

    for child in &node.children {
        render_node(child, targets, with_markers, out);
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn dedup_expr_table(expr_table: &IndexMap<ExprId, ExprTableEntry>) -> (IndexMap<ExprId, ExprTableEntry>, IndexMap<ExprId, ExprId>) {
    let mut canonical_by_text: IndexMap<&str, ExprId> = IndexMap::new();
    let mut deduped = IndexMap::new();
    let mut aliases = IndexMap::new();

    for (id, entry) in expr_table {
        match canonical_by_text.get(entry.text.as_str()) {
            Some(canonical) => {
                aliases.insert(*id, *canonical);
            }
            None => {
                canonical_by_text.insert(entry.text.as_str(), *id);
                deduped.insert(*id, entry.clone());
            }
        }
    }
    (deduped, aliases)
}

/// Strips only the entry's own top-level span; the expression's AST keeps its
/// internal per-node spans intact, since provenance edges (§4.H) are built from those
/// and a production build never runs the provenance index anyway.
fn strip_spans(expr_table: &mut IndexMap<ExprId, ExprTableEntry>) {
    for entry in expr_table.values_mut() {
        entry.span = Span::synthetic(0, 0);
    }
}
