//! 4.G.1 Lower: markup text -> `IrModule`. Classifies every attribute, recognizes
//! built-in template controllers by wrapping the host element's subtree into a
//! synthetic nested `TemplateIR`, parses expressions (recoverably), and assigns
//! deterministic node ids in pre-order walk order starting at 0 per template.

use indexmap::{IndexMap, IndexSet};
use viewc_core::expr_ast::ExprTableEntry;
use viewc_core::ids::{ExprId, NodeId, SourceFileId, Span, TemplateId};
use viewc_core::ir::{
    AliasMeta, AuthoredAttr, BindableMeta, BindingSource, DomNode, DomNodeKind, ExprRef,
    ImportMeta, Instruction, InstructionRow, InterpIR, IrModule, LetBindingInstruction,
    LoweringDiagnostic, RefTargetKind, ShadowDomMeta, TemplateIR, TemplateMetaIR, TemplateOrigin,
};
use viewc_core::semantics::{BindingMode, ResourceKind, TemplateSyntaxRegistry, catalog_key};
use viewc_host::expr::ExprParser;
use viewc_host::markup::MarkupParser;

use crate::diagnostics::codes;

const TEMPLATE_META_TAGS: &[&str] = &[
    "import", "require", "bindable", "use-shadow-dom", "containerless", "capture", "alias", "slot",
];

pub struct LowerInput<'a> {
    pub text: &'a str,
    pub file: Option<SourceFileId>,
    pub markup: &'a dyn MarkupParser,
    pub exprs: &'a dyn ExprParser,
    pub syntax: &'a TemplateSyntaxRegistry,
    /// Catalog keys (`<kind>:<name>`) visible at this template's scope, per
    /// `ResourceGraph::materialize`. Tells a custom element apart from an unknown tag,
    /// and a custom attribute/controller apart from an unrecognized one.
    pub visible: &'a IndexSet<String>,
}

struct LowerState {
    next_template_id: u32,
    next_expr_id: u32,
    expr_table: IndexMap<ExprId, ExprTableEntry>,
    diagnostics: Vec<LoweringDiagnostic>,
    templates: Vec<TemplateIR>,
}

impl LowerState {
    fn alloc_template_id(&mut self) -> TemplateId {
        let id = TemplateId::new(self.next_template_id);
        self.next_template_id += 1;
        id
    }

    fn alloc_expr_id(&mut self) -> ExprId {
        let id = ExprId::new(self.next_expr_id);
        self.next_expr_id += 1;
        id
    }
}

pub fn lower(input: LowerInput) -> IrModule {
    let parsed = input.markup.parse(input.text, input.file);
    let mut state = LowerState {
        next_template_id: 0,
        next_expr_id: 0,
        expr_table: IndexMap::new(),
        diagnostics: parsed
            .diagnostics
            .iter()
            .map(|d| LoweringDiagnostic {
                code: codes::IR_ERROR.to_string(),
                message: d.message.clone(),
                span: Some(d.span),
                recovery: false,
            })
            .collect(),
        templates: Vec::new(),
    };

    // Reserve id 0 for the root template up front, so nested controller templates
    // always get ids > 0 regardless of where in the walk they're discovered.
    let root_id = state.alloc_template_id();
    let mut root_node = parsed.root;
    let meta = extract_template_meta(&mut root_node);

    let mut node_counter: u32 = 0;
    let mut rows = Vec::new();
    let fragment_root = lower_element(root_node, &mut node_counter, &mut state, &input, input.file, &mut rows);

    state.templates.push(TemplateIR {
        id: root_id,
        fragment_root,
        rows,
        meta: Some(meta),
        origin: None,
    });
    // Nested controller templates were appended to `state.templates` as they were
    // discovered during the walk; the root goes back to index 0.
    let root_template = state.templates.pop().unwrap();
    state.templates.insert(0, root_template);

    let mut module = IrModule {
        templates: state.templates,
        expr_table: state.expr_table,
        diagnostics: state.diagnostics,
    };
    link_controller_continuations(&mut module);
    module
}

/// `else` is lowered as an ordinary controller, same as `then`/`catch`/`case`/
/// `default-case`; this post-pass walks each template's rows in document order and
/// records the back-link to the nearest preceding sibling anchor controller
/// (`if` for `else`, `promise` for `then`/`catch`, `switch` for `case`/`default-case`).
fn link_controller_continuations(module: &mut IrModule) {
    for template in &mut module.templates {
        link_rows(&mut template.rows);
    }
}

fn link_rows(rows: &mut [InstructionRow]) {
    let mut last_if: Option<NodeId> = None;
    let mut last_promise: Option<NodeId> = None;
    let mut last_switch: Option<NodeId> = None;

    for row in rows.iter_mut() {
        for instruction in &mut row.instructions {
            if let Instruction::HydrateTemplateController { resource, continuation_of, .. } = instruction {
                match resource.as_str() {
                    "if" => last_if = Some(row.target),
                    "else" => *continuation_of = last_if,
                    "promise" => last_promise = Some(row.target),
                    "then" | "catch" => *continuation_of = last_promise,
                    "switch" => last_switch = Some(row.target),
                    "case" | "default-case" => *continuation_of = last_switch,
                    _ => {}
                }
            }
        }
    }
}

fn extract_template_meta(root: &mut DomNode) -> TemplateMetaIR {
    let mut meta = TemplateMetaIR::default();
    let mut kept = Vec::new();
    for child in root.children.drain(..) {
        let tag_lower = child.tag.as_deref().unwrap_or("").to_lowercase();
        if !TEMPLATE_META_TAGS.contains(&tag_lower.as_str()) {
            kept.push(child);
            continue;
        }
        match tag_lower.as_str() {
            "import" | "require" => {
                let from = find_attr(&child, "from");
                let item = ImportMeta {
                    from: from.map(|a| a.value.clone()).unwrap_or_default(),
                    from_span: from.map(|a| a.value_span).unwrap_or(Span::synthetic(0, 0)),
                    as_element: find_attr(&child, "as-custom-element").map(|a| a.value.clone()),
                };
                if tag_lower == "import" {
                    meta.imports.push(item);
                } else {
                    meta.requires.push(item);
                }
            }
            "bindable" => {
                let name_attr = find_attr(&child, "name");
                meta.bindables.push(BindableMeta {
                    name: name_attr.map(|a| a.value.clone()).unwrap_or_default(),
                    name_span: name_attr.map(|a| a.value_span).unwrap_or(Span::synthetic(0, 0)),
                    attribute: find_attr(&child, "attribute").map(|a| a.value.clone()),
                    mode: find_attr(&child, "mode").and_then(|a| parse_mode(&a.value)),
                });
            }
            "use-shadow-dom" => {
                meta.use_shadow_dom = Some(ShadowDomMeta {
                    mode: find_attr(&child, "mode").map(|a| a.value.clone()),
                });
            }
            "containerless" => meta.containerless = true,
            "capture" => meta.capture = true,
            "alias" => {
                if let Some(name_attr) = find_attr(&child, "name") {
                    meta.aliases.push(AliasMeta {
                        name: name_attr.value.clone(),
                        name_span: name_attr.value_span,
                    });
                }
            }
            "slot" => meta.has_slot = true,
            _ => {}
        }
    }
    root.children = kept;
    meta
}

fn find_attr<'a>(node: &'a DomNode, name: &str) -> Option<&'a AuthoredAttr> {
    node.attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
}

fn parse_mode(text: &str) -> Option<BindingMode> {
    match text {
        "one-time" => Some(BindingMode::OneTime),
        "to-view" => Some(BindingMode::ToView),
        "from-view" => Some(BindingMode::FromView),
        "two-way" => Some(BindingMode::TwoWay),
        _ => None,
    }
}

fn is_controller_name(name: &str, input: &LowerInput) -> bool {
    input.visible.contains(&catalog_key(ResourceKind::TemplateController, name))
}

fn is_custom_element(tag: &str, input: &LowerInput) -> bool {
    input.visible.contains(&catalog_key(ResourceKind::CustomElement, tag))
}

fn is_custom_attribute(name: &str, input: &LowerInput) -> bool {
    input.visible.contains(&catalog_key(ResourceKind::CustomAttribute, name))
}

/// Splits `target.command` into its parts; returns `(whole, None)` when there is no
/// recognized command suffix (plain static attribute, or a command-less controller
/// like bare `else`).
fn split_command<'a>(authored: &'a str, syntax: &TemplateSyntaxRegistry) -> (&'a str, Option<&'a str>) {
    if let Some(idx) = authored.rfind('.') {
        let (target, command) = (&authored[..idx], &authored[idx + 1..]);
        if syntax.commands.contains_key(command) {
            return (target, Some(command));
        }
    }
    (authored, None)
}

fn has_interpolation(text: &str, syntax: &TemplateSyntaxRegistry) -> bool {
    text.contains(&syntax.interp_start)
}

/// Splits `a${b}c${d}e` into literal parts `["a", "c", "e"]` and expression texts
/// `["b", "d"]`, satisfying `InterpIR::is_well_formed`.
fn split_interpolation<'a>(text: &'a str, syntax: &TemplateSyntaxRegistry) -> (Vec<&'a str>, Vec<&'a str>) {
    let mut parts = Vec::new();
    let mut exprs = Vec::new();
    let mut rest = text;
    loop {
        match rest.find(&syntax.interp_start) {
            None => {
                parts.push(rest);
                break;
            }
            Some(start) => {
                parts.push(&rest[..start]);
                let after_start = &rest[start + syntax.interp_start.len()..];
                match after_start.find(&syntax.interp_end) {
                    None => {
                        exprs.push(after_start);
                        parts.push("");
                        break;
                    }
                    Some(end) => {
                        exprs.push(&after_start[..end]);
                        rest = &after_start[end + syntax.interp_end.len()..];
                    }
                }
            }
        }
    }
    (parts, exprs)
}

fn parse_interp(text: &str, file: Option<SourceFileId>, state: &mut LowerState, input: &LowerInput) -> InterpIR {
    let (parts, expr_texts) = split_interpolation(text, input.syntax);
    let exprs = expr_texts
        .into_iter()
        .map(|t| parse_expr_ref(t, 0, file, state, input))
        .collect();
    InterpIR {
        parts: parts.into_iter().map(str::to_string).collect(),
        exprs,
    }
}

fn parse_expr_ref(text: &str, offset: u32, file: Option<SourceFileId>, state: &mut LowerState, input: &LowerInput) -> ExprRef {
    let result = input.exprs.parse(text, offset, file);
    if result.recovered {
        state.diagnostics.push(LoweringDiagnostic {
            code: codes::EXPR_PARSE_ERROR.to_string(),
            message: format!("could not parse expression: {text}"),
            span: Some(result.ast.span()),
            recovery: true,
        });
    }
    let id = state.alloc_expr_id();
    let span = result.ast.span();
    state.expr_table.insert(id, ExprTableEntry { id, text: text.to_string(), span, ast: result.ast });
    ExprRef { id, text: text.to_string(), span }
}

fn parse_for_of_ref(text: &str, offset: u32, file: Option<SourceFileId>, state: &mut LowerState, input: &LowerInput) -> ExprRef {
    let result = input.exprs.parse_for_of(text, offset, file);
    if result.recovered {
        state.diagnostics.push(LoweringDiagnostic {
            code: codes::INVALID_BINDING_PATTERN.to_string(),
            message: format!("invalid iterator binding pattern: {text}"),
            span: Some(result.ast.span()),
            recovery: true,
        });
    }
    let id = state.alloc_expr_id();
    let span = result.ast.span();
    state.expr_table.insert(id, ExprTableEntry { id, text: text.to_string(), span, ast: result.ast });
    ExprRef { id, text: text.to_string(), span }
}

fn ref_target_kind(target: &str) -> RefTargetKind {
    match target {
        "" | "element" => RefTargetKind::Element,
        "controller" => RefTargetKind::Controller,
        "view-model" | "component" => RefTargetKind::Component,
        _ => RefTargetKind::Custom(0),
    }
}

fn property_binding(target: &str, attr: &AuthoredAttr, file: Option<SourceFileId>, state: &mut LowerState, input: &LowerInput, mode: BindingMode) -> Instruction {
    let expr = parse_expr_ref(&attr.value, attr.value_span.start, file, state, input);
    Instruction::PropertyBinding { to: target.to_string(), from: BindingSource::Expr(expr), mode }
}

fn listener(target: &str, attr: &AuthoredAttr, file: Option<SourceFileId>, state: &mut LowerState, input: &LowerInput, capture: bool) -> Instruction {
    let expr = parse_expr_ref(&attr.value, attr.value_span.start, file, state, input);
    Instruction::ListenerBinding { event: target.to_string(), from: BindingSource::Expr(expr), capture }
}

/// Classifies one authored attribute into its compiled instruction. Shorthand
/// (`:prop`/`@event`), every binding command, and plain static/interpolated attributes
/// all funnel through here; controller and custom-attribute wrapping happen one layer
/// up, in `lower_element`.
fn classify_attr(attr: &AuthoredAttr, state: &mut LowerState, input: &LowerInput, file: Option<SourceFileId>) -> Instruction {
    if let Some(target) = attr.name.strip_prefix(':') {
        return property_binding(target, attr, file, state, input, BindingMode::Default);
    }
    if let Some(target) = attr.name.strip_prefix('@') {
        return listener(target, attr, file, state, input, false);
    }

    let (target, command) = split_command(&attr.name, input.syntax);
    match command {
        None => {
            if has_interpolation(&attr.value, input.syntax) {
                let interp = parse_interp(&attr.value, file, state, input);
                Instruction::AttributeBinding { attr: attr.name.clone(), to: target.to_string(), from: BindingSource::Interp(interp) }
            } else {
                Instruction::SetAttribute { attr: attr.name.clone(), value: attr.value.clone() }
            }
        }
        Some("bind") => property_binding(target, attr, file, state, input, BindingMode::Default),
        Some("to-view") => property_binding(target, attr, file, state, input, BindingMode::ToView),
        Some("one-time") => property_binding(target, attr, file, state, input, BindingMode::OneTime),
        Some("from-view") => property_binding(target, attr, file, state, input, BindingMode::FromView),
        Some("two-way") => property_binding(target, attr, file, state, input, BindingMode::TwoWay),
        Some("trigger") => listener(target, attr, file, state, input, false),
        Some("capture") => listener(target, attr, file, state, input, true),
        Some("delegate") => listener(target, attr, file, state, input, false),
        Some("for") => {
            let expr = parse_for_of_ref(&attr.value, attr.value_span.start, file, state, input);
            Instruction::IteratorBinding { to: target.to_string(), from: BindingSource::Expr(expr) }
        }
        Some("ref") => {
            let expr = parse_expr_ref(&attr.value, attr.value_span.start, file, state, input);
            Instruction::RefBinding { from: BindingSource::Expr(expr), target_kind: ref_target_kind(target) }
        }
        Some("t") => Instruction::TranslationBinding {
            to: target.to_string(),
            from: BindingSource::Interp(InterpIR { parts: vec![attr.value.clone()], exprs: vec![] }),
        },
        Some("t.bind") => {
            let expr = parse_expr_ref(&attr.value, attr.value_span.start, file, state, input);
            Instruction::TranslationBinding { to: target.to_string(), from: BindingSource::Expr(expr) }
        }
        Some(_plugin_command) => property_binding(target, attr, file, state, input, BindingMode::Default),
    }
}

/// Lowers one node (and its descendants) within the current template's node-id space,
/// pushing every instruction row it and its descendants produce into `rows`. Template
/// controllers are cut out and re-lowered as a fresh nested template with their own
/// node-id space, leaving a comment anchor behind at the original position.
fn lower_element(
    node: DomNode,
    counter: &mut u32,
    state: &mut LowerState,
    input: &LowerInput,
    file: Option<SourceFileId>,
    rows: &mut Vec<InstructionRow>,
) -> DomNode {
    let id = NodeId::new(*counter);
    *counter += 1;

    match node.kind {
        DomNodeKind::Text => {
            if let Some(text) = &node.text {
                if has_interpolation(text, input.syntax) {
                    let interp = parse_interp(text, file, state, input);
                    rows.push(InstructionRow { target: id, instructions: vec![Instruction::TextBinding { from: BindingSource::Interp(interp) }] });
                }
            }
            return DomNode { id, ..node };
        }
        DomNodeKind::Comment => return DomNode { id, ..node },
        DomNodeKind::Element => {}
    }

    let tag = node.tag.clone().unwrap_or_default();
    let mut attrs = node.attrs;
    let children = node.children;

    if tag == "let" {
        let to_view_model = attrs.iter().any(|a| a.name == "to-view-model");
        let bindings = attrs
            .iter()
            .filter(|a| a.name != "to-view-model")
            .map(|a| {
                let (target, _command) = split_command(&a.name, input.syntax);
                let expr = parse_expr_ref(&a.value, a.value_span.start, file, state, input);
                LetBindingInstruction { to: target.to_string(), from: BindingSource::Expr(expr) }
            })
            .collect();
        rows.push(InstructionRow { target: id, instructions: vec![Instruction::LetBinding { to_view_model, bindings }] });
        return DomNode {
            id,
            kind: DomNodeKind::Element,
            tag: node.tag,
            tag_span: node.tag_span,
            close_tag_span: node.close_tag_span,
            end_of_open_span: node.end_of_open_span,
            text: node.text,
            attrs,
            children: Vec::new(),
        };
    }

    let controller_idx = attrs.iter().position(|a| {
        !a.name.starts_with(':') && !a.name.starts_with('@') && is_controller_name(split_command(&a.name, input.syntax).0, input)
    });

    if let Some(idx) = controller_idx {
        let attr = attrs.remove(idx);
        let (target, _command) = split_command(&attr.name, input.syntax);
        let resource_name = target.to_string();
        let prop_instruction = if attr.value.is_empty() { None } else { Some(classify_attr(&attr, state, input, file)) };

        let remaining = DomNode {
            id: NodeId::new(0),
            kind: DomNodeKind::Element,
            tag: node.tag,
            tag_span: node.tag_span,
            close_tag_span: node.close_tag_span,
            end_of_open_span: node.end_of_open_span,
            text: node.text,
            attrs,
            children,
        };

        let child_template_id = state.alloc_template_id();
        let mut child_counter: u32 = 0;
        let mut child_rows = Vec::new();
        let child_fragment_root = lower_element(remaining, &mut child_counter, state, input, file, &mut child_rows);

        state.templates.push(TemplateIR {
            id: child_template_id,
            fragment_root: child_fragment_root,
            rows: child_rows,
            meta: None,
            origin: Some(TemplateOrigin { host_node: id, controller_resource: resource_name.clone() }),
        });

        rows.push(InstructionRow {
            target: id,
            instructions: vec![Instruction::HydrateTemplateController {
                resource: resource_name,
                template: child_template_id,
                props: prop_instruction.into_iter().collect(),
                continuation_of: None,
            }],
        });

        return DomNode {
            id,
            kind: DomNodeKind::Comment,
            tag: None,
            tag_span: None,
            close_tag_span: None,
            end_of_open_span: None,
            text: Some("au-start".to_string()),
            attrs: Vec::new(),
            children: Vec::new(),
        };
    }

    let is_ce = is_custom_element(&tag, input);
    let mut direct_instructions = Vec::new();
    let mut element_props = Vec::new();

    for attr in &attrs {
        let (target, command) = split_command(&attr.name, input.syntax);
        let is_shorthand_prop = attr.name.starts_with(':');
        let is_shorthand_event = attr.name.starts_with('@');
        let custom_attr_target: &str = if is_shorthand_prop || is_shorthand_event { &attr.name[1..] } else { target };

        if custom_attr_target == "ref" && command.is_none() && !is_shorthand_prop && !is_shorthand_event {
            let expr = parse_expr_ref(&attr.value, attr.value_span.start, file, state, input);
            direct_instructions.push(Instruction::RefBinding { from: BindingSource::Expr(expr), target_kind: RefTargetKind::Element });
            continue;
        }

        if is_custom_attribute(custom_attr_target, input) {
            let inner = classify_attr(attr, state, input, file);
            direct_instructions.push(Instruction::HydrateAttribute { resource: custom_attr_target.to_string(), props: vec![inner] });
            continue;
        }

        let instruction = classify_attr(attr, state, input, file);
        if is_ce {
            element_props.push(instruction);
        } else {
            direct_instructions.push(instruction);
        }
    }

    if is_ce {
        direct_instructions.push(Instruction::HydrateElement { resource: tag, props: element_props, captures: Vec::new() });
    }

    if !direct_instructions.is_empty() {
        rows.push(InstructionRow { target: id, instructions: direct_instructions });
    }

    let new_children = children
        .into_iter()
        .map(|child| lower_element(child, counter, state, input, file, rows))
        .collect();

    DomNode {
        id,
        kind: DomNodeKind::Element,
        tag: node.tag,
        tag_span: node.tag_span,
        close_tag_span: node.close_tag_span,
        end_of_open_span: node.end_of_open_span,
        text: node.text,
        attrs,
        children: new_children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_host::markup::ParsedMarkup;
    use viewc_host::memory::MemoryExprParser;

    struct FixedMarkup(DomNode);

    impl MarkupParser for FixedMarkup {
        fn parse(&self, _text: &str, _file: Option<SourceFileId>) -> ParsedMarkup {
            ParsedMarkup { root: self.0.clone(), diagnostics: vec![] }
        }
    }

    fn span(s: u32, e: u32) -> Span {
        Span::synthetic(s, e)
    }

    fn attr(name: &str, value: &str) -> AuthoredAttr {
        AuthoredAttr { name: name.to_string(), name_span: span(0, 0), value: value.to_string(), value_span: span(0, value.len() as u32) }
    }

    fn element(tag: &str, attrs: Vec<AuthoredAttr>, children: Vec<DomNode>) -> DomNode {
        DomNode {
            id: NodeId::new(0),
            kind: DomNodeKind::Element,
            tag: Some(tag.to_string()),
            tag_span: Some(span(0, tag.len() as u32)),
            close_tag_span: None,
            end_of_open_span: None,
            text: None,
            attrs,
            children,
        }
    }

    fn text(value: &str) -> DomNode {
        DomNode {
            id: NodeId::new(0),
            kind: DomNodeKind::Text,
            tag: None,
            tag_span: None,
            close_tag_span: None,
            end_of_open_span: None,
            text: Some(value.to_string()),
            attrs: vec![],
            children: vec![],
        }
    }

    fn syntax() -> TemplateSyntaxRegistry {
        viewc_core::builtins::builtin_syntax_registry()
    }

    fn visible_with(names: &[(ResourceKind, &str)]) -> IndexSet<String> {
        names.iter().map(|(k, n)| catalog_key(*k, n)).collect()
    }

    #[test]
    fn static_attribute_stays_static() {
        let root = element("div", vec![attr("class", "panel")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = IndexSet::new();
        let input = LowerInput { text: "<div class=\"panel\"></div>", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        assert_eq!(module.templates.len(), 1);
        let row = &module.root().rows[0];
        assert!(matches!(row.instructions[0], Instruction::SetAttribute { .. }));
    }

    #[test]
    fn property_bind_command_produces_property_binding() {
        let root = element("div", vec![attr("title.bind", "name")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = IndexSet::new();
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        let row = &module.root().rows[0];
        match &row.instructions[0] {
            Instruction::PropertyBinding { to, mode, .. } => {
                assert_eq!(to, "title");
                assert_eq!(*mode, BindingMode::Default);
            }
            other => panic!("expected property binding, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_expression_is_recoverable() {
        let root = element("div", vec![attr("title.bind", "foo(")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = IndexSet::new();
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        let diag = module.diagnostics.iter().find(|d| d.code == codes::EXPR_PARSE_ERROR).unwrap();
        assert!(diag.recovery);
    }

    #[test]
    fn repeat_for_without_of_is_invalid_binding_pattern() {
        let root = element("div", vec![attr("repeat.for", "item items")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = visible_with(&[(ResourceKind::TemplateController, "repeat")]);
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        assert!(module.diagnostics.iter().any(|d| d.code == codes::INVALID_BINDING_PATTERN));
        // repeat wraps the host element's subtree into a synthetic nested template.
        assert_eq!(module.templates.len(), 2);
    }

    #[test]
    fn known_controller_wraps_host_into_nested_template() {
        let root = element("div", vec![attr("if.bind", "show")], vec![text("hi")]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = visible_with(&[(ResourceKind::TemplateController, "if")]);
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);

        assert_eq!(module.templates.len(), 2);
        let root_row = &module.root().rows[0];
        match &root_row.instructions[0] {
            Instruction::HydrateTemplateController { resource, template, props, .. } => {
                assert_eq!(resource, "if");
                assert_eq!(props.len(), 1);
                let nested = module.template(*template).unwrap();
                assert_eq!(nested.origin.as_ref().unwrap().controller_resource, "if");
                assert!(!nested.is_root());
            }
            other => panic!("expected hydrate-template-controller, got {other:?}"),
        }
    }

    #[test]
    fn else_sibling_is_linked_to_its_preceding_if() {
        let root = element(
            "div",
            vec![],
            vec![
                element("span", vec![attr("if.bind", "show")], vec![text("yes")]),
                element("span", vec![attr("else", "")], vec![text("no")]),
            ],
        );
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = visible_with(&[(ResourceKind::TemplateController, "if"), (ResourceKind::TemplateController, "else")]);
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);

        let root_rows = &module.root().rows;
        let if_target = match &root_rows[0].instructions[0] {
            Instruction::HydrateTemplateController { resource, continuation_of, .. } => {
                assert_eq!(resource, "if");
                assert_eq!(*continuation_of, None);
                root_rows[0].target
            }
            other => panic!("expected if controller, got {other:?}"),
        };
        match &root_rows[1].instructions[0] {
            Instruction::HydrateTemplateController { resource, continuation_of, .. } => {
                assert_eq!(resource, "else");
                assert_eq!(*continuation_of, Some(if_target));
            }
            other => panic!("expected else controller, got {other:?}"),
        }
    }

    #[test]
    fn custom_element_tag_wraps_attrs_into_hydrate_element() {
        let root = element("nav-bar", vec![attr("title.bind", "label")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = visible_with(&[(ResourceKind::CustomElement, "nav-bar")]);
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        let row = &module.root().rows[0];
        match &row.instructions[0] {
            Instruction::HydrateElement { resource, props, .. } => {
                assert_eq!(resource, "nav-bar");
                assert_eq!(props.len(), 1);
            }
            other => panic!("expected hydrate-element, got {other:?}"),
        }
    }

    #[test]
    fn shorthand_prop_and_event_are_recognized() {
        let root = element("div", vec![attr(":title", "label"), attr("@click", "onClick()")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = IndexSet::new();
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        let row = &module.root().rows[0];
        assert!(matches!(row.instructions[0], Instruction::PropertyBinding { .. }));
        assert!(matches!(row.instructions[1], Instruction::ListenerBinding { .. }));
    }

    #[test]
    fn text_interpolation_produces_text_binding() {
        let root = element("div", vec![], vec![text("hello ${name}")]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = IndexSet::new();
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        assert!(module.root().rows.iter().any(|r| matches!(r.instructions[0], Instruction::TextBinding { .. })));
    }

    #[test]
    fn bare_ref_on_native_element_is_ref_binding() {
        let root = element("div", vec![attr("ref", "myDiv")], vec![]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = IndexSet::new();
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        let row = &module.root().rows[0];
        assert!(matches!(row.instructions[0], Instruction::RefBinding { .. }));
    }

    #[test]
    fn node_ids_are_assigned_in_deterministic_preorder() {
        let root = element("div", vec![], vec![element("span", vec![], vec![]), element("span", vec![], vec![])]);
        let markup = FixedMarkup(root);
        let exprs = MemoryExprParser;
        let syntax = syntax();
        let visible = IndexSet::new();
        let input = LowerInput { text: "", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible };
        let module = lower(input);
        let root_node = &module.root().fragment_root;
        assert_eq!(root_node.id, NodeId::new(0));
        assert_eq!(root_node.children[0].id, NodeId::new(1));
        assert_eq!(root_node.children[1].id, NodeId::new(2));
    }
}
