//! Derives template-side `TextReferenceSite`s from a lowered `IrModule` by walking its
//! fragment trees and matching tag/attribute names against the resource catalog, plus
//! walking every bound expression's AST for identifier/pipe/behavior sites and the
//! template's `<import>` metadata for import-source sites.
//! Run once per recompile, after `lower`, over every template in the module.

use indexmap::IndexMap;
use viewc_core::expr_ast::{ExprNode, ExprTableEntry};
use viewc_core::ids::{DocumentUri, ExprId};
use viewc_core::ir::{BindingSource, DomNode, DomNodeKind, Instruction, IrModule};
use viewc_core::refsite::{ReferenceDomain, ReferenceKind, TextReferenceSite};
use viewc_core::semantics::{catalog_key, ResourceCatalog, ResourceKind};

const ELEMENT_KINDS: &[ResourceKind] = &[ResourceKind::CustomElement];
const ATTR_KINDS: &[ResourceKind] = &[ResourceKind::CustomAttribute, ResourceKind::TemplateController];

pub fn harvest_template_sites(module: &IrModule, file: &DocumentUri, catalog: &ResourceCatalog) -> Vec<TextReferenceSite> {
    let mut sites = Vec::new();
    for template in &module.templates {
        walk(&template.fragment_root, file, catalog, &mut sites);
        for row in &template.rows {
            for instruction in &row.instructions {
                walk_instruction(instruction, file, &module.expr_table, &mut sites);
            }
        }
        if let Some(meta) = &template.meta {
            for import in &meta.imports {
                sites.push(TextReferenceSite {
                    domain: ReferenceDomain::Template,
                    reference_kind: ReferenceKind::ImportElementFrom,
                    file: file.clone(),
                    span: import.from_span,
                    name_form: import.from.clone(),
                    resource_key: format!("import-source:{}", import.from),
                });
            }
        }
    }
    sites
}

/// Mirrors `query::semantic_tokens`'s instruction walk, but collects reference sites
/// from each bound expression's AST instead of delimiter tokens.
fn walk_instruction(instruction: &Instruction, file: &DocumentUri, expr_table: &IndexMap<ExprId, ExprTableEntry>, out: &mut Vec<TextReferenceSite>) {
    match instruction {
        Instruction::PropertyBinding { from, .. }
        | Instruction::AttributeBinding { from, .. }
        | Instruction::StyleBinding { from, .. }
        | Instruction::ListenerBinding { from, .. }
        | Instruction::RefBinding { from, .. }
        | Instruction::IteratorBinding { from, .. }
        | Instruction::TextBinding { from }
        | Instruction::TranslationBinding { from, .. } => walk_source(from, file, expr_table, out),
        Instruction::LetBinding { bindings, .. } | Instruction::HydrateLetElement { bindings } => {
            for binding in bindings {
                walk_source(&binding.from, file, expr_table, out);
            }
        }
        Instruction::HydrateElement { props, .. } | Instruction::HydrateAttribute { props, .. } | Instruction::HydrateTemplateController { props, .. } => {
            for prop in props {
                walk_instruction(prop, file, expr_table, out);
            }
        }
        Instruction::SetAttribute { .. } | Instruction::SetClassAttribute { .. } | Instruction::SetStyleAttribute { .. } | Instruction::SetProperty { .. } => {}
    }
}

fn walk_source(source: &BindingSource, file: &DocumentUri, expr_table: &IndexMap<ExprId, ExprTableEntry>, out: &mut Vec<TextReferenceSite>) {
    match source {
        BindingSource::Expr(expr_ref) => {
            if let Some(entry) = expr_table.get(&expr_ref.id) {
                walk_expr(&entry.ast, file, out);
            }
        }
        BindingSource::Interp(interp) => {
            for expr_ref in &interp.exprs {
                if let Some(entry) = expr_table.get(&expr_ref.id) {
                    walk_expr(&entry.ast, file, out);
                }
            }
        }
    }
}

/// Scope identifiers get a synthetic, non-catalog resource key (`property:<name>`) since
/// view-model properties aren't catalog resources; `hover`/`semantic_tokens` skip keys they
/// can't parse, but `references`/`rename` treat the key as opaque and work correctly.
fn walk_expr(ast: &ExprNode, file: &DocumentUri, out: &mut Vec<TextReferenceSite>) {
    for (name, span) in ast.identifier_occurrences() {
        out.push(TextReferenceSite {
            domain: ReferenceDomain::Template,
            reference_kind: ReferenceKind::ExpressionIdentifier,
            file: file.clone(),
            span,
            name_form: name.to_string(),
            resource_key: format!("property:{name}"),
        });
    }
    for (name, span) in ast.converter_names() {
        out.push(site(ReferenceKind::ExpressionPipe, file, span, name, ResourceKind::ValueConverter, name));
    }
    for (name, span) in ast.behavior_names() {
        out.push(site(ReferenceKind::ExpressionBehavior, file, span, name, ResourceKind::BindingBehavior, name));
    }
}

fn walk(node: &DomNode, file: &DocumentUri, catalog: &ResourceCatalog, out: &mut Vec<TextReferenceSite>) {
    if node.kind == DomNodeKind::Element {
        if let Some(tag) = &node.tag {
            if let Some(kind) = matching_kind(catalog, ELEMENT_KINDS, tag) {
                if let Some(span) = node.tag_span {
                    out.push(site(ReferenceKind::TagName, file, span, tag, kind, tag));
                }
                if let Some(span) = node.close_tag_span {
                    out.push(site(ReferenceKind::CloseTagName, file, span, tag, kind, tag));
                }
            }
        }
        for attr in &node.attrs {
            let base = attr_base_name(&attr.name);
            if let Some(kind) = matching_kind(catalog, ATTR_KINDS, base) {
                out.push(site(ReferenceKind::AttributeName, file, attr.name_span, &attr.name, kind, base));
            }
        }
    }
    for child in &node.children {
        walk(child, file, catalog, out);
    }
}

fn matching_kind(catalog: &ResourceCatalog, kinds: &[ResourceKind], name: &str) -> Option<ResourceKind> {
    kinds.iter().copied().find(|&kind| catalog.get(kind, name).is_some())
}

fn attr_base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

fn site(reference_kind: ReferenceKind, file: &DocumentUri, span: viewc_core::ids::Span, name_form: &str, kind: ResourceKind, name: &str) -> TextReferenceSite {
    TextReferenceSite {
        domain: ReferenceDomain::Template,
        reference_kind,
        file: file.clone(),
        span,
        name_form: name_form.to_string(),
        resource_key: catalog_key(kind, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::expr_ast::ExprTableEntry;
    use viewc_core::ids::{NodeId, Span};
    use viewc_core::ir::TemplateIR;
    use viewc_core::semantics::{CustomElementDef, Origin, ResourceDef, Sourced};
    use indexmap::IndexMap;

    fn catalog_with_nav_bar() -> ResourceCatalog {
        let mut catalog = ResourceCatalog::default();
        catalog.insert(
            ResourceDef::CustomElement(CustomElementDef {
                name: Sourced::new("nav-bar".to_string(), Origin::Source),
                class_name: Sourced::new("NavBar".to_string(), Origin::Source),
                file: DocumentUri::new("nav-bar.ts"),
                aliases: Sourced::new(vec![], Origin::Source),
                bindables: Sourced::new(IndexMap::new(), Origin::Source),
                containerless: Sourced::new(false, Origin::Source),
                template: Sourced::new(None, Origin::Source),
            }),
            vec![],
        );
        catalog
    }

    fn nav_bar_node() -> DomNode {
        DomNode {
            id: NodeId::new(0),
            kind: DomNodeKind::Element,
            tag: Some("nav-bar".to_string()),
            tag_span: Some(Span::synthetic(0, 7)),
            close_tag_span: Some(Span::synthetic(9, 16)),
            end_of_open_span: None,
            text: None,
            attrs: vec![],
            children: vec![],
        }
    }

    #[test]
    fn tag_name_and_close_tag_both_harvested_for_a_known_element() {
        let catalog = catalog_with_nav_bar();
        let file = DocumentUri::new("app.html");
        let module = IrModule {
            templates: vec![TemplateIR { id: viewc_core::ids::TemplateId::new(0), fragment_root: nav_bar_node(), rows: vec![], meta: None, origin: None }],
            expr_table: IndexMap::<viewc_core::ids::ExprId, ExprTableEntry>::new(),
            diagnostics: vec![],
        };

        let sites = harvest_template_sites(&module, &file, &catalog);
        assert_eq!(sites.len(), 2);
        assert!(sites.iter().any(|s| s.reference_kind == ReferenceKind::TagName));
        assert!(sites.iter().any(|s| s.reference_kind == ReferenceKind::CloseTagName));
        assert!(sites.iter().all(|s| s.resource_key == "custom-element:nav-bar"));
    }

    #[test]
    fn expression_identifier_and_pipe_sites_are_harvested_from_bound_expressions() {
        let catalog = catalog_with_nav_bar();
        let file = DocumentUri::new("app.html");
        let expr_id = viewc_core::ids::ExprId::new(0);
        let ast = ExprNode::ValueConverter {
            expr: Box::new(ExprNode::AccessScope { name: "status".to_string(), ancestor: 0, span: Span::synthetic(20, 26) }),
            name: "sort".to_string(),
            name_span: Span::synthetic(29, 33),
            args: vec![],
            span: Span::synthetic(20, 33),
        };
        let expr_ref = viewc_core::ir::ExprRef { id: expr_id, text: "status | sort".to_string(), span: Span::synthetic(20, 33) };
        let mut expr_table = IndexMap::new();
        expr_table.insert(expr_id, ExprTableEntry { id: expr_id, text: expr_ref.text.clone(), span: expr_ref.span, ast });

        let row = viewc_core::ir::InstructionRow {
            target: NodeId::new(0),
            instructions: vec![Instruction::PropertyBinding {
                to: "textContent".to_string(),
                from: BindingSource::Expr(expr_ref),
                mode: viewc_core::semantics::BindingMode::ToView,
            }],
        };
        let module = IrModule {
            templates: vec![TemplateIR { id: viewc_core::ids::TemplateId::new(0), fragment_root: nav_bar_node(), rows: vec![row], meta: None, origin: None }],
            expr_table,
            diagnostics: vec![],
        };

        let sites = harvest_template_sites(&module, &file, &catalog);
        let identifier = sites.iter().find(|s| s.reference_kind == ReferenceKind::ExpressionIdentifier).unwrap();
        assert_eq!(identifier.name_form, "status");
        assert_eq!(identifier.resource_key, "property:status");

        let pipe = sites.iter().find(|s| s.reference_kind == ReferenceKind::ExpressionPipe).unwrap();
        assert_eq!(pipe.name_form, "sort");
        assert_eq!(pipe.resource_key, "value-converter:sort");
    }

    #[test]
    fn import_from_is_harvested_as_a_reference_site() {
        let catalog = catalog_with_nav_bar();
        let file = DocumentUri::new("app.html");
        let meta = viewc_core::ir::TemplateMetaIR {
            imports: vec![viewc_core::ir::ImportMeta {
                from: "./nav-bar".to_string(),
                from_span: Span::synthetic(10, 19),
                as_element: None,
            }],
            ..Default::default()
        };
        let module = IrModule {
            templates: vec![TemplateIR {
                id: viewc_core::ids::TemplateId::new(0),
                fragment_root: nav_bar_node(),
                rows: vec![],
                meta: Some(meta),
                origin: None,
            }],
            expr_table: IndexMap::<viewc_core::ids::ExprId, ExprTableEntry>::new(),
            diagnostics: vec![],
        };

        let sites = harvest_template_sites(&module, &file, &catalog);
        let import = sites.iter().find(|s| s.reference_kind == ReferenceKind::ImportElementFrom).unwrap();
        assert_eq!(import.name_form, "./nav-bar");
        assert_eq!(import.resource_key, "import-source:./nav-bar");
    }

    #[test]
    fn unknown_tag_is_not_harvested() {
        let catalog = catalog_with_nav_bar();
        let file = DocumentUri::new("app.html");
        let mut node = nav_bar_node();
        node.tag = Some("matrix-panel".to_string());
        let module = IrModule {
            templates: vec![TemplateIR { id: viewc_core::ids::TemplateId::new(0), fragment_root: node, rows: vec![], meta: None, origin: None }],
            expr_table: IndexMap::new(),
            diagnostics: vec![],
        };

        let sites = harvest_template_sites(&module, &file, &catalog);
        assert!(sites.is_empty());
    }
}
