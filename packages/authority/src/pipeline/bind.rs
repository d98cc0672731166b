//! 4.G.3 Bind: maps every expression occurrence in a linked `IrModule` to the lexical
//! scope frame it evaluates in, producing the `ScopeModule` frame tree that typecheck
//! and plan+emit both consume. A template controller opens a new overlay frame only
//! when its resource's `ScopeBehavior` says so; everything else reuses the frame of
//! its enclosing template.

use indexmap::IndexMap;
use viewc_core::expr_ast::ExprNode;
use viewc_core::ids::{ExprId, FrameId};
use viewc_core::ir::{BindingSource, Instruction, IrModule, TemplateIR};
use viewc_core::scope_ir::{
    FrameKind, FrameOrigin, OverlayBase, ScopeFrame, ScopeModule, ScopeSymbol, ScopeTemplate, SymbolKind,
};
use viewc_core::semantics::{FramePatternKind, MaterializedSemantics, ResourceDef, ResourceKind, ScopeBehavior};

struct BindState {
    frames: IndexMap<FrameId, ScopeFrame>,
    next_frame: u32,
}

impl BindState {
    fn next_id(&mut self) -> FrameId {
        let id = FrameId::new(self.next_frame);
        self.next_frame += 1;
        id
    }

    fn alloc(&mut self, frame: ScopeFrame) -> FrameId {
        let id = frame.id;
        self.frames.insert(id, frame);
        id
    }

    fn frame_mut(&mut self, id: FrameId) -> &mut ScopeFrame {
        self.frames.get_mut(&id).expect("frame allocated before use")
    }

    /// Every frame from `leaf` up to the root, in root-first order, so appending the
    /// result directly to a `ScopeTemplate::frames` list keeps parents preceding
    /// children.
    fn ancestor_chain(&self, leaf: FrameId) -> Vec<ScopeFrame> {
        let mut chain = Vec::new();
        let mut current = Some(leaf);
        while let Some(id) = current {
            let frame = self.frames.get(&id).expect("frame in registry");
            current = frame.parent;
            chain.push(frame.clone());
        }
        chain.reverse();
        chain
    }
}

pub fn bind(module: &IrModule, semantics: &MaterializedSemantics) -> ScopeModule {
    let mut state = BindState { frames: IndexMap::new(), next_frame: 0 };
    let root_id = state.next_id();
    state.alloc(ScopeFrame {
        id: root_id,
        parent: None,
        kind: FrameKind::Root,
        overlay_base: None,
        symbols: Vec::new(),
        origin: None,
        let_value_exprs: Vec::new(),
        iterator_declaration: None,
    });

    let mut templates = Vec::new();
    bind_template(module, module.root(), root_id, semantics, &mut state, &mut templates);
    ScopeModule { templates }
}

fn bind_template(
    module: &IrModule,
    template: &TemplateIR,
    active_frame: FrameId,
    semantics: &MaterializedSemantics,
    state: &mut BindState,
    out: &mut Vec<ScopeTemplate>,
) {
    let mut expr_to_frame = IndexMap::new();
    for row in &template.rows {
        for instruction in &row.instructions {
            bind_instruction(module, instruction, active_frame, semantics, state, &mut expr_to_frame, out);
        }
    }

    out.push(ScopeTemplate {
        template: template.id,
        frames: state.ancestor_chain(active_frame),
        root_frame: Some(active_frame),
        expr_to_frame,
    });
}

fn bind_instruction(
    module: &IrModule,
    instruction: &Instruction,
    active_frame: FrameId,
    semantics: &MaterializedSemantics,
    state: &mut BindState,
    expr_to_frame: &mut IndexMap<ExprId, FrameId>,
    out: &mut Vec<ScopeTemplate>,
) {
    match instruction {
        Instruction::PropertyBinding { from, .. }
        | Instruction::AttributeBinding { from, .. }
        | Instruction::StyleBinding { from, .. }
        | Instruction::ListenerBinding { from, .. }
        | Instruction::RefBinding { from, .. }
        | Instruction::IteratorBinding { from, .. }
        | Instruction::TextBinding { from }
        | Instruction::TranslationBinding { from, .. } => {
            map_source(from, active_frame, expr_to_frame);
        }
        Instruction::SetAttribute { .. }
        | Instruction::SetClassAttribute { .. }
        | Instruction::SetStyleAttribute { .. }
        | Instruction::SetProperty { .. } => {}
        Instruction::LetBinding { bindings, .. } | Instruction::HydrateLetElement { bindings } => {
            let frame = state.frame_mut(active_frame);
            for binding in bindings {
                frame.symbols.push(ScopeSymbol { name: binding.to.clone(), kind: SymbolKind::Let });
                if let BindingSource::Expr(expr) = &binding.from {
                    frame.let_value_exprs.push(expr.id);
                }
            }
            for binding in bindings {
                map_source(&binding.from, active_frame, expr_to_frame);
            }
        }
        Instruction::HydrateElement { props, .. } | Instruction::HydrateAttribute { props, .. } => {
            for prop in props {
                bind_instruction(module, prop, active_frame, semantics, state, expr_to_frame, out);
            }
        }
        Instruction::HydrateTemplateController { resource, template: child_id, props, .. } => {
            for prop in props {
                bind_instruction(module, prop, active_frame, semantics, state, expr_to_frame, out);
            }
            let def = resolve_controller(semantics, resource);
            let scope = def.as_ref().map(|d| d.scope).unwrap_or(ScopeBehavior::Reuse);
            let frame_pattern = def.as_ref().and_then(|d| d.frame_pattern);

            let child_frame = match scope {
                ScopeBehavior::Reuse => active_frame,
                ScopeBehavior::Overlay => {
                    let overlay = build_overlay(module, resource, frame_pattern, props);
                    let new_id = state.next_id();
                    state.alloc(ScopeFrame {
                        id: new_id,
                        parent: Some(active_frame),
                        kind: FrameKind::Overlay,
                        overlay_base: overlay.overlay_base,
                        symbols: overlay.symbols,
                        origin: Some(FrameOrigin {
                            pattern: frame_pattern.unwrap_or(FramePatternKind::ValueOverlay),
                            host_node_text: resource.clone(),
                        }),
                        let_value_exprs: Vec::new(),
                        iterator_declaration: overlay.iterator_declaration,
                    });
                    new_id
                }
            };

            let child_template = module.template(*child_id).expect("lower always emits the controller's nested template");
            bind_template(module, child_template, child_frame, semantics, state, out);
        }
    }
}

fn map_source(source: &BindingSource, frame: FrameId, expr_to_frame: &mut IndexMap<ExprId, FrameId>) {
    match source {
        BindingSource::Expr(expr) => {
            expr_to_frame.insert(expr.id, frame);
        }
        BindingSource::Interp(interp) => {
            for expr in &interp.exprs {
                expr_to_frame.insert(expr.id, frame);
            }
        }
    }
}

fn resolve_controller(semantics: &MaterializedSemantics, name: &str) -> Option<viewc_core::semantics::TemplateControllerDef> {
    let def = semantics
        .catalog
        .get(ResourceKind::TemplateController, name)
        .map(|entry| entry.def.clone())
        .or_else(|| semantics.base.get(ResourceKind::TemplateController, name).cloned())?;
    match def {
        ResourceDef::TemplateController(tc) => Some(tc),
        _ => None,
    }
}

struct OverlayContents {
    overlay_base: Option<OverlayBase>,
    symbols: Vec<ScopeSymbol>,
    iterator_declaration: Option<viewc_core::expr_ast::IteratorDeclaration>,
}

/// The first prop carries the controller's primary bindable regardless of its
/// authored `to` name (lowering doesn't rewrite `with.bind`'s target to `value`), so
/// this takes whichever expression is present rather than matching on prop name.
fn primary_expr(props: &[Instruction]) -> Option<&BindingSource> {
    props.iter().find_map(|p| match p {
        Instruction::PropertyBinding { from, .. }
        | Instruction::AttributeBinding { from, .. }
        | Instruction::IteratorBinding { from, .. } => Some(from),
        _ => None,
    })
}

fn alias_name(module: &IrModule, source: &BindingSource) -> Option<String> {
    let BindingSource::Expr(expr) = source else { return None };
    match module.expr_table.get(&expr.id).map(|e| &e.ast) {
        Some(ExprNode::AccessScope { name, .. }) => Some(name.clone()),
        _ => None,
    }
}

fn build_overlay(
    module: &IrModule,
    resource: &str,
    pattern: Option<FramePatternKind>,
    props: &[Instruction],
) -> OverlayContents {
    let primary = primary_expr(props);
    match pattern {
        Some(FramePatternKind::Iterator) => {
            let declaration = primary.and_then(|source| {
                let BindingSource::Expr(expr) = source else { return None };
                match module.expr_table.get(&expr.id).map(|e| &e.ast) {
                    Some(ExprNode::ForOfStatement { declaration, .. }) => Some(declaration.clone()),
                    _ => None,
                }
            });
            let symbols = declaration
                .iter()
                .flat_map(iterator_local_names)
                .map(|name| ScopeSymbol { name, kind: SymbolKind::IteratorLocal })
                .collect();
            OverlayContents { overlay_base: None, symbols, iterator_declaration: declaration }
        }
        Some(FramePatternKind::ValueOverlay) => {
            let overlay_base = primary.and_then(|source| match source {
                BindingSource::Expr(expr) => Some(OverlayBase { expr: expr.id }),
                BindingSource::Interp(_) => None,
            });
            OverlayContents { overlay_base, symbols: Vec::new(), iterator_declaration: None }
        }
        Some(FramePatternKind::PromiseValue) | Some(FramePatternKind::PromiseBranch) => {
            let symbols = primary
                .and_then(|source| alias_name(module, source))
                .map(|name| vec![ScopeSymbol { name, kind: SymbolKind::Alias }])
                .unwrap_or_default();
            OverlayContents { overlay_base: None, symbols, iterator_declaration: None }
        }
        None => {
            // An overlay-scoped controller outside the built-in table with no known
            // shape; treat its primary binding as a value overlay base, the least
            // surprising default for `resource`.
            let _ = resource;
            let overlay_base = primary.and_then(|source| match source {
                BindingSource::Expr(expr) => Some(OverlayBase { expr: expr.id }),
                BindingSource::Interp(_) => None,
            });
            OverlayContents { overlay_base, symbols: Vec::new(), iterator_declaration: None }
        }
    }
}

fn iterator_local_names(declaration: &viewc_core::expr_ast::IteratorDeclaration) -> Vec<String> {
    use viewc_core::expr_ast::IteratorDeclaration;
    match declaration {
        IteratorDeclaration::Identifier(name) => vec![name.clone()],
        IteratorDeclaration::ArrayDestructure(names) => names.clone(),
        IteratorDeclaration::ObjectDestructure(pairs) => pairs.iter().map(|(_, local)| local.clone()).collect(),
    }
}
