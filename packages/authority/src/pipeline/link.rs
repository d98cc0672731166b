//! 4.G.2 Link: resolves every binding target against the catalog/DOM schema, resolves
//! `default`-authored binding modes, and emits the `unknown-*` resolution diagnostics.
//! Does not rewrite the IR module — resolved modes are returned in a side table keyed
//! by the bound expression, since each binding carries exactly one `ExprRef`.

use indexmap::IndexMap;
use viewc_core::ids::{DocumentUri, ExprId, NodeId};
use viewc_core::ir::{BindingSource, DomNode, Instruction, IrModule};
use viewc_core::semantics::{to_camel_case, BindingMode, MaterializedSemantics, ResourceKind, TemplateSyntaxRegistry};

use crate::diagnostics::{codes, Diagnostic, DiagnosticData, Severity};

pub struct LinkOutput {
    pub diagnostics: Vec<Diagnostic>,
    /// Effective binding mode for every `PropertyBinding` authored with `BindingMode::Default`,
    /// keyed by the bound expression's id. Absent entries mean the mode was already explicit.
    pub resolved_modes: IndexMap<ExprId, BindingMode>,
}

fn find_node(root: &DomNode, id: NodeId) -> Option<&DomNode> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|c| find_node(c, id))
}

fn expr_id_of(source: &BindingSource) -> Option<ExprId> {
    match source {
        BindingSource::Expr(r) => Some(r.id),
        BindingSource::Interp(_) => None,
    }
}

/// The host node's other statically-authored attributes (no recognized binding
/// command suffix), consulted by `TwoWayDefaults::is_two_way` for e.g.
/// `<input type="checkbox">` forcing `checked` two-way.
fn static_attrs_of(node: &DomNode, syntax: &TemplateSyntaxRegistry) -> IndexMap<String, String> {
    node.attrs
        .iter()
        .filter(|a| match a.name.rfind('.') {
            Some(idx) => !syntax.commands.contains_key(&a.name[idx + 1..]),
            None => true,
        })
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect()
}

/// Detects `foo.unknowncommand="bar"`: an authored name with a dot suffix that isn't a
/// recognized binding command, which `lower` can only represent as a plain attribute.
fn dangling_command_suffix<'a>(attr_name: &'a str, syntax: &TemplateSyntaxRegistry) -> Option<&'a str> {
    let idx = attr_name.rfind('.')?;
    let suffix = &attr_name[idx + 1..];
    if suffix.is_empty() || syntax.commands.contains_key(suffix) {
        return None;
    }
    if !suffix.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return None;
    }
    Some(suffix)
}

pub fn link(module: &IrModule, semantics: &MaterializedSemantics, syntax: &TemplateSyntaxRegistry, file: Option<DocumentUri>) -> LinkOutput {
    let mut diagnostics = Vec::new();
    let mut resolved_modes = IndexMap::new();

    for template in &module.templates {
        let tag = template.fragment_root.tag.clone().unwrap_or_default();

        for row in &template.rows {
            let host_node = find_node(&template.fragment_root, row.target);
            let host_tag = host_node.and_then(|n| n.tag.clone()).unwrap_or_else(|| tag.clone());
            let observed = host_node.map(|n| static_attrs_of(n, syntax)).unwrap_or_default();

            for instruction in &row.instructions {
                link_instruction(instruction, &host_tag, &observed, semantics, syntax, file.clone(), &mut diagnostics, &mut resolved_modes);
            }
        }
    }

    for entry in module.expr_table.values() {
        for (name, span) in entry.ast.converter_names() {
            if semantics.base.get(ResourceKind::ValueConverter, name).is_none() && semantics.catalog.get(ResourceKind::ValueConverter, name).is_none() {
                diagnostics.push(
                    Diagnostic::new(codes::UNKNOWN_CONVERTER, format!("unknown value converter '{name}'"), Severity::Error)
                        .at(file.clone().unwrap_or_else(|| DocumentUri::new("")), span)
                        .with_data(|d| {
                            d.resource_kind = Some(ResourceKind::ValueConverter.as_str().to_string());
                            d.attempted_name = Some(name.to_string());
                        }),
                );
            }
        }
        for (name, span) in entry.ast.behavior_names() {
            if semantics.base.get(ResourceKind::BindingBehavior, name).is_none() && semantics.catalog.get(ResourceKind::BindingBehavior, name).is_none() {
                diagnostics.push(
                    Diagnostic::new(codes::UNKNOWN_BEHAVIOR, format!("unknown binding behavior '{name}'"), Severity::Error)
                        .at(file.clone().unwrap_or_else(|| DocumentUri::new("")), span)
                        .with_data(|d| {
                            d.resource_kind = Some(ResourceKind::BindingBehavior.as_str().to_string());
                            d.attempted_name = Some(name.to_string());
                        }),
                );
            }
        }
    }

    LinkOutput { diagnostics, resolved_modes }
}

fn resolve_def(semantics: &MaterializedSemantics, kind: ResourceKind, name: &str) -> Option<viewc_core::semantics::ResourceDef> {
    semantics
        .catalog
        .get(kind, name)
        .map(|e| e.def.clone())
        .or_else(|| semantics.base.get(kind, name).cloned())
}

fn link_instruction(
    instruction: &Instruction,
    host_tag: &str,
    observed: &IndexMap<String, String>,
    semantics: &MaterializedSemantics,
    syntax: &TemplateSyntaxRegistry,
    file: Option<DocumentUri>,
    diagnostics: &mut Vec<Diagnostic>,
    resolved_modes: &mut IndexMap<ExprId, BindingMode>,
) {
    match instruction {
        Instruction::HydrateElement { resource, props, .. } => {
            if resolve_def(semantics, ResourceKind::CustomElement, resource).is_none() {
                diagnostics.push(unknown(codes::UNKNOWN_ELEMENT, ResourceKind::CustomElement, resource, file.clone()));
                return;
            }
            let def = resolve_def(semantics, ResourceKind::CustomElement, resource).unwrap();
            for prop in props {
                link_bindable_prop(prop, &def, resource, ResourceKind::CustomElement, file.clone(), diagnostics, resolved_modes);
            }
        }
        Instruction::HydrateAttribute { resource, props } => {
            let Some(def) = resolve_def(semantics, ResourceKind::CustomAttribute, resource) else {
                diagnostics.push(unknown(codes::UNKNOWN_ATTRIBUTE, ResourceKind::CustomAttribute, resource, file.clone()));
                return;
            };
            for prop in props {
                link_bindable_prop(prop, &def, resource, ResourceKind::CustomAttribute, file.clone(), diagnostics, resolved_modes);
            }
        }
        Instruction::HydrateTemplateController { resource, props, .. } => {
            let Some(def) = resolve_def(semantics, ResourceKind::TemplateController, resource) else {
                diagnostics.push(unknown(codes::UNKNOWN_CONTROLLER, ResourceKind::TemplateController, resource, file.clone()));
                return;
            };
            for prop in props {
                link_bindable_prop(prop, &def, resource, ResourceKind::TemplateController, file.clone(), diagnostics, resolved_modes);
            }
        }
        Instruction::PropertyBinding { to, from, mode } => {
            let normalized = semantics.base.naming.resolve_property_name(host_tag, to, &semantics.base.dom_schema.naming);
            if !semantics.base.dom_schema.has_property(host_tag, &normalized) {
                diagnostics.push(
                    Diagnostic::new(codes::UNKNOWN_ATTRIBUTE, format!("'{to}' is not a known property of <{host_tag}>"), Severity::Warning)
                        .with_data(|d| d.attempted_name = Some(to.clone())),
                );
            }
            if *mode == BindingMode::Default {
                if let Some(id) = expr_id_of(from) {
                    let effective = if semantics.base.two_way.is_two_way(host_tag, &normalized, observed) {
                        BindingMode::TwoWay
                    } else {
                        BindingMode::ToView
                    };
                    resolved_modes.insert(id, effective);
                }
            }
        }
        Instruction::SetAttribute { attr, .. } | Instruction::AttributeBinding { attr, .. } => {
            if let Some(command) = dangling_command_suffix(attr, syntax) {
                diagnostics.push(
                    Diagnostic::new(codes::UNKNOWN_COMMAND, format!("unknown binding command '{command}'"), Severity::Error)
                        .with_data(|d| d.command = Some(command.to_string())),
                );
            }
        }
        _ => {}
    }
}

fn link_bindable_prop(
    prop: &Instruction,
    def: &viewc_core::semantics::ResourceDef,
    resource: &str,
    kind: ResourceKind,
    file: Option<DocumentUri>,
    diagnostics: &mut Vec<Diagnostic>,
    resolved_modes: &mut IndexMap<ExprId, BindingMode>,
) {
    let Instruction::PropertyBinding { to, from, mode } = prop else { return };
    let bindables = def.bindables();
    // Bindable properties are declared in camelCase; the authored attribute name is
    // kebab-case, same normalization as native DOM properties.
    let camel = to_camel_case(to);
    let bindable = bindables.and_then(|b| b.get(to).or_else(|| b.get(&camel)));
    match bindable {
        None => diagnostics.push(
            Diagnostic::new(codes::UNKNOWN_BINDABLE, format!("'{to}' is not a bindable of {resource}"), Severity::Error)
                .at(file.unwrap_or_else(|| DocumentUri::new("")), viewc_core::ids::Span::synthetic(0, 0))
                .with_data(|d| {
                    d.resource_kind = Some(kind.as_str().to_string());
                    d.attempted_name = Some(to.clone());
                }),
        ),
        Some(b) => {
            if *mode == BindingMode::Default {
                if let Some(id) = expr_id_of(from) {
                    let effective = if b.mode == BindingMode::Default { BindingMode::ToView } else { b.mode };
                    resolved_modes.insert(id, effective);
                }
            }
        }
    }
}

fn unknown(code: &'static str, kind: ResourceKind, name: &str, file: Option<DocumentUri>) -> Diagnostic {
    Diagnostic::new(code, format!("unknown {} '{name}'", kind.as_str()), Severity::Error)
        .at(file.unwrap_or_else(|| DocumentUri::new("")), viewc_core::ids::Span::synthetic(0, 0))
        .with_data(|d: &mut DiagnosticData| {
            d.resource_kind = Some(kind.as_str().to_string());
            d.attempted_name = Some(name.to_string());
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::lower::{lower, LowerInput};
    use indexmap::{IndexMap as Map, IndexSet};
    use viewc_core::ids::{Span, DocumentUri as Uri};
    use viewc_core::ir::{AuthoredAttr, DomNodeKind};
    use viewc_core::semantics::{catalog_key, CustomElementDef, Origin, Sourced, BindableDef, ResourceCatalog, ResourceDef, Semantics};
    use viewc_host::markup::{MarkupParser, ParsedMarkup};
    use viewc_host::memory::MemoryExprParser;

    struct FixedMarkup(DomNode);
    impl MarkupParser for FixedMarkup {
        fn parse(&self, _text: &str, _file: Option<viewc_core::ids::SourceFileId>) -> ParsedMarkup {
            ParsedMarkup { root: self.0.clone(), diagnostics: vec![] }
        }
    }

    fn attr(name: &str, value: &str) -> AuthoredAttr {
        AuthoredAttr { name: name.to_string(), name_span: Span::synthetic(0, 0), value: value.to_string(), value_span: Span::synthetic(0, value.len() as u32) }
    }

    fn element(tag: &str, attrs: Vec<AuthoredAttr>) -> DomNode {
        DomNode { id: NodeId::new(0), kind: DomNodeKind::Element, tag: Some(tag.to_string()), tag_span: None, close_tag_span: None, end_of_open_span: None, text: None, attrs, children: vec![] }
    }

    fn nav_bar_semantics() -> MaterializedSemantics {
        let mut bindables = Map::new();
        bindables.insert("displayData".to_string(), BindableDef { property: "displayData".to_string(), attribute: None, mode: BindingMode::ToView, primary: false });
        let def = ResourceDef::CustomElement(CustomElementDef {
            name: Sourced::new("nav-bar".to_string(), Origin::Source),
            class_name: Sourced::new("NavBar".to_string(), Origin::Source),
            file: Uri::new("nav-bar.ts"),
            aliases: Sourced::new(vec![], Origin::Source),
            bindables: Sourced::new(bindables, Origin::Source),
            containerless: Sourced::new(false, Origin::Source),
            template: Sourced::new(None, Origin::Source),
        });
        let mut catalog = ResourceCatalog::default();
        catalog.insert(def, vec![]);
        MaterializedSemantics { base: Semantics::builtin(), catalog }
    }

    #[test]
    fn unknown_bindable_on_known_element_emits_diagnostic() {
        let root = element("nav-bar", vec![attr("missing-prop.bind", "x")]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = viewc_core::builtins::builtin_syntax_registry();
        let visible: IndexSet<String> = [catalog_key(ResourceKind::CustomElement, "nav-bar")].into_iter().collect();
        let module = lower(LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible });

        let semantics = nav_bar_semantics();
        let output = link(&module, &semantics, &syntax, None);
        assert!(output.diagnostics.iter().any(|d| d.code == codes::UNKNOWN_BINDABLE));
    }

    #[test]
    fn known_bindable_resolves_default_mode_from_bindable_definition() {
        let root = element("nav-bar", vec![attr("display-data.bind", "x")]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = viewc_core::builtins::builtin_syntax_registry();
        let visible: IndexSet<String> = [catalog_key(ResourceKind::CustomElement, "nav-bar")].into_iter().collect();
        let module = lower(LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible });

        let semantics = nav_bar_semantics();
        let output = link(&module, &semantics, &syntax, None);
        assert!(
            !output.diagnostics.iter().any(|d| d.code == codes::UNKNOWN_BINDABLE),
            "display-data should resolve to the displayData bindable"
        );
    }

    #[test]
    fn checkbox_checked_bind_resolves_two_way_from_observed_type_attr() {
        let root = element("input", vec![attr("type", "checkbox"), attr("checked.bind", "x")]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = viewc_core::builtins::builtin_syntax_registry();
        let visible = IndexSet::new();
        let module = lower(LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible });

        let semantics = MaterializedSemantics { base: Semantics::builtin(), catalog: ResourceCatalog::default() };
        let output = link(&module, &semantics, &syntax, None);

        let expr_id = module.expr_table.keys().next().copied().unwrap();
        assert_eq!(output.resolved_modes.get(&expr_id), Some(&BindingMode::TwoWay));
    }

    #[test]
    fn text_input_value_bind_without_checkbox_type_stays_to_view() {
        let root = element("input", vec![attr("type", "text"), attr("checked.bind", "x")]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = viewc_core::builtins::builtin_syntax_registry();
        let visible = IndexSet::new();
        let module = lower(LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible });

        let semantics = MaterializedSemantics { base: Semantics::builtin(), catalog: ResourceCatalog::default() };
        let output = link(&module, &semantics, &syntax, None);

        let expr_id = module.expr_table.keys().next().copied().unwrap();
        assert_eq!(output.resolved_modes.get(&expr_id), Some(&BindingMode::ToView));
    }

    #[test]
    fn unrecognized_command_suffix_is_flagged() {
        let root = element("div", vec![attr("foo.unknowncommand", "bar")]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = viewc_core::builtins::builtin_syntax_registry();
        let visible = IndexSet::new();
        let module = lower(LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible });

        let semantics = MaterializedSemantics { base: Semantics::builtin(), catalog: ResourceCatalog::default() };
        let output = link(&module, &semantics, &syntax, None);
        let diag = output.diagnostics.iter().find(|d| d.code == codes::UNKNOWN_COMMAND).unwrap();
        assert_eq!(diag.data.command.as_deref(), Some("unknowncommand"));
    }
}
