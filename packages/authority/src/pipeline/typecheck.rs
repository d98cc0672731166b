//! 4.G.4 Typecheck: synthesizes one overlay program per template, feeds each to the
//! host type-checker, and translates its diagnostics back through the overlay↔template
//! span mapping. The overlay <-> component-H provenance edges themselves (§4.H) are
//! built from this stage's `TemplateOverlay::expr_order`/`program.statement_spans` by
//! `provenance::harvest_overlay_edges`, not here — this stage only needs the same
//! projection math to translate its own diagnostics.

use indexmap::IndexSet;
use viewc_core::ids::{DocumentUri, ExprId, Span, TemplateId};
use viewc_core::ir::{BindingSource, Instruction, IrModule};
use viewc_core::scope_ir::{ScopeModule, ScopeTemplate, ITERATOR_CONTEXTUALS};
use viewc_core::semantics::FramePatternKind;
use viewc_host::typecheck::{HostTypeChecker, OverlayDiagnostic, OverlayDiagnosticCategory, OverlayProgram};

use crate::diagnostics::codes;
use crate::diagnostics::model::{Diagnostic, Severity};

/// `if.bind`'s value accepts any type via implicit truthy coercion (§4.G.4's
/// coercion policy). No other built-in controller's primary gets this treatment: a
/// `with.bind` or `switch.bind` value genuinely needs its declared type checked.
const TRUTHY_COERCED_CONTROLLERS: &[&str] = &["if"];

pub struct TemplateOverlay {
    pub template: TemplateId,
    pub program: OverlayProgram,
    /// Parallel to `program.statement_spans`: the expression each emitted statement
    /// re-expresses.
    pub expr_order: Vec<ExprId>,
}

pub struct TypecheckOutput {
    pub overlays: Vec<TemplateOverlay>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn typecheck(
    module: &IrModule,
    scopes: &ScopeModule,
    checker: &dyn HostTypeChecker,
    file: Option<DocumentUri>,
) -> TypecheckOutput {
    let truthy = collect_truthy_exprs(module);
    let mut overlays = Vec::new();
    let mut diagnostics = Vec::new();

    for template in &module.templates {
        let Some(scope_template) = scopes.template(template.id) else { continue };
        let (program, expr_order) = build_overlay(module, scope_template, &truthy);
        for overlay_diag in checker.check(&program) {
            if let Some(translated) = translate(&overlay_diag, &program.statement_spans, &expr_order, module, file.clone()) {
                diagnostics.push(translated);
            }
        }
        overlays.push(TemplateOverlay { template: template.id, program, expr_order });
    }

    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    TypecheckOutput { overlays, diagnostics }
}

fn collect_truthy_exprs(module: &IrModule) -> IndexSet<ExprId> {
    let mut out = IndexSet::new();
    for template in &module.templates {
        for row in &template.rows {
            for instruction in &row.instructions {
                collect_truthy_from_instruction(instruction, &mut out);
            }
        }
    }
    out
}

fn collect_truthy_from_instruction(instruction: &Instruction, out: &mut IndexSet<ExprId>) {
    if let Instruction::HydrateTemplateController { resource, props, .. } = instruction {
        if TRUTHY_COERCED_CONTROLLERS.contains(&resource.as_str()) {
            for prop in props {
                collect_source_ids_from(prop, out);
            }
        }
    }
}

fn collect_source_ids_from(instruction: &Instruction, out: &mut IndexSet<ExprId>) {
    let source = match instruction {
        Instruction::PropertyBinding { from, .. }
        | Instruction::AttributeBinding { from, .. }
        | Instruction::StyleBinding { from, .. }
        | Instruction::ListenerBinding { from, .. }
        | Instruction::RefBinding { from, .. }
        | Instruction::IteratorBinding { from, .. }
        | Instruction::TextBinding { from }
        | Instruction::TranslationBinding { from, .. } => from,
        _ => return,
    };
    match source {
        BindingSource::Expr(expr) => {
            out.insert(expr.id);
        }
        BindingSource::Interp(interp) => {
            out.extend(interp.exprs.iter().map(|e| e.id));
        }
    }
}

fn build_overlay(module: &IrModule, scope_template: &ScopeTemplate, truthy: &IndexSet<ExprId>) -> (OverlayProgram, Vec<ExprId>) {
    let mut text = String::new();

    for frame in &scope_template.frames {
        for symbol in &frame.symbols {
            text.push_str(&format!("let {}: any;\n", symbol.name));
        }
        if frame.origin.as_ref().map(|o| o.pattern) == Some(FramePatternKind::Iterator) {
            for contextual in ITERATOR_CONTEXTUALS {
                text.push_str(&format!("let {contextual}: any;\n"));
            }
        }
    }

    let mut statement_spans = Vec::new();
    let mut expr_order = Vec::new();
    for expr_id in scope_template.expr_to_frame.keys() {
        let Some(entry) = module.expr_table.get(expr_id) else { continue };
        let coerced = truthy.contains(expr_id);
        if coerced {
            text.push_str("Boolean(");
        }
        let expr_start = text.len() as u32;
        text.push_str(&entry.text);
        let expr_end = text.len() as u32;
        if coerced {
            text.push(')');
        }
        text.push_str(";\n");

        statement_spans.push(Span::synthetic(expr_start, expr_end));
        expr_order.push(*expr_id);
    }

    (OverlayProgram { text, statement_spans }, expr_order)
}

/// Projects an overlay diagnostic's span back onto the template expression it came
/// from. Statement spans cover exactly the expression's own text (sans the
/// `Boolean(...)` wrapper), byte-for-byte identical to the template expression's
/// source text, so the translation is a straightforward proportional scale — equal
/// lengths make it exact, not merely approximate.
fn translate(
    diag: &OverlayDiagnostic,
    statement_spans: &[Span],
    expr_order: &[ExprId],
    module: &IrModule,
    file: Option<DocumentUri>,
) -> Option<Diagnostic> {
    let (idx, _) = statement_spans
        .iter()
        .enumerate()
        .map(|(i, span)| (i, span.overlap_len(&diag.overlay_span)))
        .filter(|(_, overlap)| *overlap > 0)
        .max_by_key(|(_, overlap)| *overlap)?;

    let stmt_span = statement_spans[idx];
    let expr_id = expr_order[idx];
    let target_span = module.expr_table.get(&expr_id)?.span;

    let clamped_start = diag.overlay_span.start.max(stmt_span.start);
    let clamped_end = diag.overlay_span.end.min(stmt_span.end).max(clamped_start);
    let from_len = stmt_span.len().max(1) as u64;
    let target_len = target_span.len() as u64;

    let project = |offset: u32| -> u32 {
        let scaled = (offset as u64 * target_len) / from_len;
        (target_span.start + scaled as u32).min(target_span.end)
    };

    let mapped_start = project(clamped_start.saturating_sub(stmt_span.start));
    let mapped_end = project(clamped_end.saturating_sub(stmt_span.start)).max(mapped_start);

    let severity = match diag.category {
        OverlayDiagnosticCategory::Error => Severity::Error,
        OverlayDiagnosticCategory::Warning => Severity::Warning,
    };

    let mut diagnostic = Diagnostic::new(codes::EXPR_TYPE_MISMATCH, diag.message.clone(), severity);
    if let Some(file) = file {
        diagnostic = diagnostic.at(file, Span::new(target_span.file, mapped_start, mapped_end));
    }
    Some(diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet as IdxSet;
    use viewc_core::builtins::builtin_semantics;
    use viewc_core::ids::SourceFileId;
    use viewc_core::semantics::{MaterializedSemantics, ResourceCatalog, ResourceKind, TemplateSyntaxRegistry};
    use viewc_host::memory::MemoryExprParser;

    use crate::pipeline::bind::bind;
    use crate::pipeline::lower::{lower, LowerInput};

    struct FixedMarkup(viewc_core::ir::DomNode);

    impl viewc_host::markup::MarkupParser for FixedMarkup {
        fn parse(&self, _text: &str, _file: Option<SourceFileId>) -> viewc_host::markup::ParsedMarkup {
            viewc_host::markup::ParsedMarkup { root: self.0.clone(), diagnostics: vec![] }
        }
    }

    struct RejectEverything;
    impl HostTypeChecker for RejectEverything {
        fn check(&self, overlay: &OverlayProgram) -> Vec<OverlayDiagnostic> {
            overlay
                .statement_spans
                .iter()
                .map(|span| OverlayDiagnostic {
                    category: OverlayDiagnosticCategory::Error,
                    message: "type mismatch".to_string(),
                    overlay_span: *span,
                })
                .collect()
        }
    }

    struct Quiet;
    impl HostTypeChecker for Quiet {
        fn check(&self, _overlay: &OverlayProgram) -> Vec<OverlayDiagnostic> {
            Vec::new()
        }
    }

    fn span(s: u32, e: u32) -> viewc_core::ids::Span {
        viewc_core::ids::Span::synthetic(s, e)
    }

    fn attr(name: &str, value: &str) -> viewc_core::ir::AuthoredAttr {
        viewc_core::ir::AuthoredAttr { name: name.to_string(), name_span: span(0, 0), value: value.to_string(), value_span: span(0, value.len() as u32) }
    }

    fn element(tag: &str, attrs: Vec<viewc_core::ir::AuthoredAttr>, children: Vec<viewc_core::ir::DomNode>) -> viewc_core::ir::DomNode {
        viewc_core::ir::DomNode {
            id: viewc_core::ids::NodeId::new(0),
            kind: viewc_core::ir::DomNodeKind::Element,
            tag: Some(tag.to_string()),
            tag_span: Some(span(0, tag.len() as u32)),
            close_tag_span: None,
            end_of_open_span: None,
            text: None,
            attrs,
            children,
        }
    }

    fn materialized() -> MaterializedSemantics {
        MaterializedSemantics { base: builtin_semantics(), catalog: ResourceCatalog::default() }
    }

    fn syntax() -> TemplateSyntaxRegistry {
        viewc_core::builtins::builtin_syntax_registry()
    }

    fn visible_with(names: &[(ResourceKind, &str)]) -> IdxSet<String> {
        names.iter().map(|(k, n)| viewc_core::semantics::catalog_key(*k, n)).collect()
    }

    #[test]
    fn diagnostic_translates_back_to_the_template_expression_span() {
        let root = element("div", vec![attr("title.bind", "profileName")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syn = syntax();
        let visible = IdxSet::new();
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syn, visible: &visible };
        let module = lower(input);
        let semantics = materialized();
        let scopes = bind(&module, &semantics);

        let checker = RejectEverything;
        let output = typecheck(&module, &scopes, &checker, None);

        assert_eq!(output.diagnostics.len(), 1);
        let diag = &output.diagnostics[0];
        assert_eq!(diag.code, codes::EXPR_TYPE_MISMATCH);
        let original_span = module.expr_table.values().next().unwrap().span;
        assert_eq!(diag.span.unwrap(), original_span);
    }

    #[test]
    fn if_bind_primary_is_truthy_coerced_in_overlay_text() {
        let root = element("div", vec![attr("if.bind", "maybeString")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syn = syntax();
        let visible = visible_with(&[(ResourceKind::TemplateController, "if")]);
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syn, visible: &visible };
        let module = lower(input);
        let semantics = materialized();
        let scopes = bind(&module, &semantics);

        let checker = Quiet;
        let output = typecheck(&module, &scopes, &checker, None);
        let root_overlay = output.overlays.iter().find(|o| o.template == module.root().id).unwrap();
        assert!(root_overlay.program.text.contains("Boolean(maybeString)"));
    }

    #[test]
    fn repeat_overlay_declares_iterator_locals_and_contextuals() {
        let root = element("li", vec![attr("repeat.for", "item of items"), attr("title.bind", "item")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syn = syntax();
        let visible = visible_with(&[(ResourceKind::TemplateController, "repeat")]);
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syn, visible: &visible };
        let module = lower(input);
        let semantics = materialized();
        let scopes = bind(&module, &semantics);

        let checker = Quiet;
        let output = typecheck(&module, &scopes, &checker, None);
        let repeat_template = module.templates[1].id;
        let overlay = output.overlays.iter().find(|o| o.template == repeat_template).unwrap();
        assert!(overlay.program.text.contains("let item: any;"));
        assert!(overlay.program.text.contains("let $index: any;"));
    }
}
