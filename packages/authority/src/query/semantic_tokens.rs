use viewc_core::ids::Span;
use viewc_core::ir::{BindingSource, DomNode, DomNodeKind, Instruction, InterpIR, IrModule};
use viewc_core::semantics::{ResourceCatalog, TemplateSyntaxRegistry};

use super::{parse_resource_key, ResourceKeyRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticTokenType {
    AureliaElement,
    AureliaAttribute,
    AureliaController,
    AureliaCommand,
    AureliaConverter,
    AureliaBehavior,
    AureliaExpression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticTokenModifier {
    DefaultLibrary,
    Declaration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticToken {
    pub span: Span,
    pub token_type: SemanticTokenType,
    pub modifiers: Vec<SemanticTokenModifier>,
}

/// Builds the element/attribute/controller/converter/behavior tokens from the
/// referential index's sites, plus `aureliaCommand` and `aureliaExpression` delimiter
/// tokens recovered by walking the lowered IR (the referential index doesn't carry a
/// reference kind for binding-command suffixes or interpolation delimiters, since
/// neither is a resource reference). Silent on unresolved positions: a site whose
/// `resourceKey` doesn't resolve in `catalog` contributes no token. Returned in strict
/// span order with non-overlapping, non-zero-length spans.
pub fn semantic_tokens(
    module: &IrModule,
    sites: &[crate::refindex::ReferentialIndex],
    catalog: &ResourceCatalog,
    syntax: &TemplateSyntaxRegistry,
) -> Vec<SemanticToken> {
    let mut tokens = Vec::new();

    for index in sites {
        for site in index.all_sites() {
            let Some(parsed) = parse_resource_key(&site.resource_key) else { continue };
            let kind = match parsed {
                ResourceKeyRef::Resource { kind, name } => {
                    if catalog.get(kind, name).is_none() {
                        continue;
                    }
                    kind
                }
                ResourceKeyRef::Bindable { kind, container, .. } => {
                    if catalog.get(kind, container).is_none() {
                        continue;
                    }
                    kind
                }
            };
            let token_type = match resource_kind_to_token(kind, &parsed) {
                Some(t) => t,
                None => continue,
            };
            if site.span.is_empty() {
                continue;
            }
            let mut modifiers = Vec::new();
            if is_declaration_site(&parsed, &site.reference_kind) {
                modifiers.push(SemanticTokenModifier::Declaration);
            }
            tokens.push(SemanticToken { span: site.span, token_type, modifiers });
        }
    }

    for template in &module.templates {
        collect_command_tokens(&template.fragment_root, syntax, &mut tokens);
        for row in &template.rows {
            for instruction in &row.instructions {
                collect_expression_tokens(instruction, syntax, &mut tokens);
            }
        }
    }

    tokens.sort_by_key(|t| (t.span.start, t.span.end));
    tokens.retain(|t| !t.span.is_empty());
    dedup_overlaps(tokens)
}

fn resource_kind_to_token(
    kind: viewc_core::semantics::ResourceKind,
    parsed: &ResourceKeyRef<'_>,
) -> Option<SemanticTokenType> {
    use viewc_core::semantics::ResourceKind::*;
    match (kind, parsed) {
        (CustomElement, ResourceKeyRef::Resource { .. }) => Some(SemanticTokenType::AureliaElement),
        (CustomElement, ResourceKeyRef::Bindable { .. }) => Some(SemanticTokenType::AureliaAttribute),
        (CustomAttribute, _) => Some(SemanticTokenType::AureliaAttribute),
        (TemplateController, _) => Some(SemanticTokenType::AureliaController),
        (ValueConverter, _) => Some(SemanticTokenType::AureliaConverter),
        (BindingBehavior, _) => Some(SemanticTokenType::AureliaBehavior),
    }
}

fn is_declaration_site(parsed: &ResourceKeyRef<'_>, reference_kind: &viewc_core::refsite::ReferenceKind) -> bool {
    use viewc_core::refsite::ReferenceKind::*;
    matches!(parsed, ResourceKeyRef::Resource { .. }) && matches!(reference_kind, DecoratorNameProperty | DefineName | StaticAuName)
}

fn collect_command_tokens(node: &DomNode, syntax: &TemplateSyntaxRegistry, out: &mut Vec<SemanticToken>) {
    if node.kind == DomNodeKind::Element {
        for attr in &node.attrs {
            if let Some(idx) = attr.name.rfind('.') {
                let command = &attr.name[idx + 1..];
                if syntax.commands.contains_key(command) {
                    let span = attr.name_span;
                    let cmd_span = Span { file: span.file, start: span.start + (idx as u32) + 1, end: span.end };
                    out.push(SemanticToken { span: cmd_span, token_type: SemanticTokenType::AureliaCommand, modifiers: vec![] });
                }
            }
        }
    }
    for child in &node.children {
        collect_command_tokens(child, syntax, out);
    }
}

fn collect_expression_tokens(instruction: &Instruction, syntax: &TemplateSyntaxRegistry, out: &mut Vec<SemanticToken>) {
    match instruction {
        Instruction::PropertyBinding { from, .. }
        | Instruction::AttributeBinding { from, .. }
        | Instruction::StyleBinding { from, .. }
        | Instruction::ListenerBinding { from, .. }
        | Instruction::RefBinding { from, .. }
        | Instruction::IteratorBinding { from, .. }
        | Instruction::TextBinding { from }
        | Instruction::TranslationBinding { from, .. } => collect_from_source(from, syntax, out),
        Instruction::LetBinding { bindings, .. } | Instruction::HydrateLetElement { bindings } => {
            for binding in bindings {
                collect_from_source(&binding.from, syntax, out);
            }
        }
        Instruction::HydrateElement { props, .. } | Instruction::HydrateAttribute { props, .. } | Instruction::HydrateTemplateController { props, .. } => {
            for prop in props {
                collect_expression_tokens(prop, syntax, out);
            }
        }
        Instruction::SetAttribute { .. } | Instruction::SetClassAttribute { .. } | Instruction::SetStyleAttribute { .. } | Instruction::SetProperty { .. } => {}
    }
}

fn collect_from_source(source: &BindingSource, syntax: &TemplateSyntaxRegistry, out: &mut Vec<SemanticToken>) {
    if let BindingSource::Interp(interp) = source {
        collect_interp_delimiters(interp, syntax, out);
    }
}

fn collect_interp_delimiters(interp: &InterpIR, syntax: &TemplateSyntaxRegistry, out: &mut Vec<SemanticToken>) {
    let open_len = syntax.interp_start.len() as u32;
    let close_len = syntax.interp_end.len() as u32;
    for expr in &interp.exprs {
        let span = expr.span;
        if span.file.is_none() && span.start == 0 && span.end == 0 {
            continue;
        }
        let open = Span { file: span.file, start: span.start.saturating_sub(open_len), end: span.start };
        let close = Span { file: span.file, start: span.end, end: span.end + close_len };
        out.push(SemanticToken { span: open, token_type: SemanticTokenType::AureliaExpression, modifiers: vec![] });
        out.push(SemanticToken { span: close, token_type: SemanticTokenType::AureliaExpression, modifiers: vec![] });
    }
}

/// Keeps the first (lowest-priority-wins-by-appearance-order) token when two
/// candidates claim the same span — e.g. a tag-name site and a `defaultLibrary`
/// built-in both covering the same offset range never happens in practice since the
/// referential index only records one reference kind per occurrence, but IR-derived
/// command/expression tokens are computed independently of the index and could in
/// principle coincide with a zero-width site; this keeps output non-overlapping as the
/// spec requires.
fn dedup_overlaps(tokens: Vec<SemanticToken>) -> Vec<SemanticToken> {
    let mut out: Vec<SemanticToken> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(last) = out.last() {
            if token.span.start < last.span.end {
                continue;
            }
        }
        out.push(token);
    }
    out
}
