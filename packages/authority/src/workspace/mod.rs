//! Component K: the incremental workspace engine (§4.K, §5). Holds the single
//! writer's-eye view of documents, the resource graph, and the compiled-template
//! cache; every query elsewhere in this crate reads a consistent snapshot produced
//! here.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use viewc_core::envelope::{CacheInfo, CacheTier, CommandEnvelope, CommandMeta, CommandStatus, Epistemic};
use viewc_core::ids::{DocumentUri, ResourceScopeId};
use viewc_core::ir::{IrModule, LoweringDiagnostic};
use viewc_core::scope_ir::ScopeModule;
use viewc_core::semantics::{MaterializedSemantics, TemplateSyntaxRegistry};
use viewc_host::{ExprParser, HostTypeChecker, MarkupParser};

use crate::diagnostics::Diagnostic;
use crate::graph::ResourceGraph;
use crate::pipeline::{bind, link, lower, plan_and_emit, typecheck, EmitOptions, LowerInput, Plan};
use crate::provenance::ProvenanceIndex;
use crate::refindex::ReferentialIndex;

#[derive(Debug, Clone)]
struct DocumentRecord {
    text: String,
    version: u64,
}

/// Everything produced by recompiling one document through the five pipeline stages.
/// Lowering diagnostics are kept separate from `diagnostics` (link + typecheck output)
/// since `LoweringDiagnostic` carries an owned `code: String` where `Diagnostic` needs
/// a `&'static str` — merging them would mean either leaking strings or widening
/// `Diagnostic::code`'s type for every other call site. Not worth it for a type that's
/// read-only by the time a query layer gets to it.
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    pub module: IrModule,
    pub scopes: ScopeModule,
    pub plan: Plan,
    pub lowering_diagnostics: Vec<LoweringDiagnostic>,
    pub diagnostics: Vec<Diagnostic>,
}

struct CacheEntry {
    key: u64,
    artifacts: CompiledDocument,
}

/// Host collaborators + semantic catalog needed to recompile one document. Borrowed
/// for the duration of one `recompile` call; the workspace itself owns no host
/// collaborator, only the data its own components produce.
pub struct RecompileInputs<'a> {
    pub markup: &'a dyn MarkupParser,
    pub exprs: &'a dyn ExprParser,
    pub checker: &'a dyn HostTypeChecker,
    pub semantics: &'a MaterializedSemantics,
    pub syntax: &'a TemplateSyntaxRegistry,
}

pub struct Workspace {
    documents: IndexMap<DocumentUri, DocumentRecord>,
    /// Coalesced pending updates: only the latest `(text, version)` per uri survives a
    /// storm, per §5's backpressure rule. Cleared by `drain_pending`.
    pending: IndexMap<DocumentUri, (String, u64)>,
    /// Bumped by `bump_resource_graph`; folded into the compile cache key so every
    /// open document is considered stale after a discovery-level change (§5's
    /// "no causal link across URIs beyond the resource-graph version").
    resource_graph_version: u64,
    graph: ResourceGraph,
    cache: IndexMap<DocumentUri, CacheEntry>,
    pub provenance: ProvenanceIndex,
    pub refindex: ReferentialIndex,
    next_command_id: u64,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace {
            documents: IndexMap::new(),
            pending: IndexMap::new(),
            resource_graph_version: 0,
            graph: ResourceGraph::new(),
            cache: IndexMap::new(),
            provenance: ProvenanceIndex::new(),
            refindex: ReferentialIndex::new(),
            next_command_id: 0,
        }
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ResourceGraph {
        &mut self.graph
    }

    pub fn document_version(&self, uri: &DocumentUri) -> Option<u64> {
        self.documents.get(uri).map(|d| d.version)
    }

    /// `updateDoc(uri, text, v)`. Accepted only when `v` is strictly newer than the
    /// current version; on acceptance, invalidates this uri's compiled artifacts and
    /// every provenance/referential entry that touches it.
    pub fn update_doc(&mut self, uri: DocumentUri, text: String, version: u64) -> bool {
        let current = self.documents.get(&uri).map(|d| d.version).unwrap_or(0);
        if version <= current && self.documents.contains_key(&uri) {
            return false;
        }
        self.documents.insert(uri.clone(), DocumentRecord { text, version });
        self.invalidate(&uri);
        true
    }

    fn invalidate(&mut self, uri: &DocumentUri) {
        self.cache.shift_remove(uri);
        self.provenance.clear_uri(uri);
        self.refindex.clear_uri(uri);
    }

    /// A resource-graph rebuild is triggered by any discovery-level change; bumping
    /// the version invalidates every document's cache key without individually
    /// touching each one.
    pub fn bump_resource_graph(&mut self) {
        self.resource_graph_version += 1;
    }

    pub fn resource_graph_version(&self) -> u64 {
        self.resource_graph_version
    }

    /// Coalescing entry point for a storm of updates: only the latest version per uri
    /// is kept. Call `drain_pending` to apply them.
    pub fn enqueue_update(&mut self, uri: DocumentUri, text: String, version: u64) {
        match self.pending.get(&uri) {
            Some((_, pending_version)) if *pending_version >= version => {}
            _ => {
                self.pending.insert(uri, (text, version));
            }
        }
    }

    /// Applies every coalesced pending update and returns the uris actually accepted.
    pub fn drain_pending(&mut self) -> Vec<DocumentUri> {
        let pending = std::mem::take(&mut self.pending);
        let mut applied = Vec::new();
        for (uri, (text, version)) in pending {
            if self.update_doc(uri.clone(), text, version) {
                applied.push(uri);
            }
        }
        applied
    }

    fn cache_key(text: &str, resource_graph_version: u64, options: &EmitOptions) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        resource_graph_version.hash(&mut hasher);
        options.strip_spans.hash(&mut hasher);
        options.dedup_exprs.hash(&mut hasher);
        hasher.finish()
    }

    /// Ensures `uri`'s compiled artifacts exist and are fresh, recompiling on a cache
    /// miss. On hit, returns the cached artifacts and leaves the provenance/referential
    /// indices untouched; on miss, the old entries are removed before the new ones
    /// are inserted, so no stale provenance/reference site survives (§9).
    pub fn recompile(&mut self, uri: &DocumentUri, inputs: &RecompileInputs<'_>, options: &EmitOptions) -> Option<(&CompiledDocument, bool)> {
        let record = self.documents.get(uri)?;
        let key = Self::cache_key(&record.text, self.resource_graph_version, options);

        if let Some(entry) = self.cache.get(uri) {
            if entry.key == key {
                return self.cache.get(uri).map(|e| (&e.artifacts, true));
            }
        }

        let scope = self.graph.ensure_local_scope(uri);
        let visible = self.graph.materialize(&scope);

        let text = record.text.clone();
        let lower_input = LowerInput { text: &text, file: None, markup: inputs.markup, exprs: inputs.exprs, syntax: inputs.syntax, visible: &visible };
        let module = lower(lower_input);

        let link_out = link(&module, inputs.semantics, inputs.syntax, Some(uri.clone()));
        let scopes = bind(&module, inputs.semantics);
        let tc_out = typecheck(&module, &scopes, inputs.checker, Some(uri.clone()));
        let plan = plan_and_emit(&module, options);

        self.provenance.clear_uri(uri);
        self.refindex.clear_uri(uri);
        self.refindex.extend(crate::refindex::harvest_template_sites(&module, uri, &inputs.semantics.catalog));
        for edge in crate::provenance::harvest_overlay_edges(&tc_out.overlays, &module, uri) {
            self.provenance.insert(edge);
        }

        let mut diagnostics = link_out.diagnostics;
        diagnostics.extend(tc_out.diagnostics);
        diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let artifacts = CompiledDocument {
            lowering_diagnostics: module.diagnostics.clone(),
            module,
            scopes,
            plan,
            diagnostics,
        };

        self.cache.insert(uri.clone(), CacheEntry { key, artifacts });
        Some((&self.cache.get(uri).unwrap().artifacts, false))
    }

    pub fn compiled(&self, uri: &DocumentUri) -> Option<&CompiledDocument> {
        self.cache.get(uri).map(|e| &e.artifacts)
    }

    pub fn scope_of(&mut self, uri: &DocumentUri) -> ResourceScopeId {
        self.graph.ensure_local_scope(uri)
    }

    /// Wraps a query result in the command envelope's wire shape, assigning the next
    /// monotonic command id.
    pub fn envelope<T>(&mut self, result: T, epistemic: Epistemic, cache_hit: bool) -> CommandEnvelope<T> {
        let command_id = self.next_command_id;
        self.next_command_id += 1;
        CommandEnvelope::ok(
            result,
            epistemic,
            CommandMeta { command_id, memory: None, cache: CacheInfo { hit: cache_hit, tier: if cache_hit { CacheTier::Memory } else { CacheTier::None } } },
        )
    }

    pub fn envelope_error<T>(&mut self, epistemic: Epistemic) -> CommandEnvelope<T> {
        let command_id = self.next_command_id;
        self.next_command_id += 1;
        CommandEnvelope::error(epistemic, CommandMeta { command_id, memory: None, cache: CacheInfo { hit: false, tier: CacheTier::None } })
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Workspace::new()
    }
}

/// Rolls a sweep of command statuses up monotonically: any degraded observation
/// degrades the whole sweep (§4.K).
pub fn sweep_status(statuses: impl IntoIterator<Item = CommandStatus>) -> CommandStatus {
    statuses.into_iter().fold(CommandStatus::Ok, CommandStatus::combine)
}

/// One recorded command in a replay scenario: the serialized input and the output it
/// produced when first run.
#[derive(Debug, Clone)]
pub struct RecordedCommand {
    pub label: String,
    pub input_json: String,
    pub output_json: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayScenario {
    pub commands: Vec<RecordedCommand>,
}

#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub total: usize,
    pub diverged: Vec<String>,
}

impl ReplayReport {
    pub fn divergence_count(&self) -> usize {
        self.diverged.len()
    }
}

/// Replays a pressure scenario against the live workspace via `run` (which dispatches
/// `input_json` through the same command-handling path production traffic uses) and
/// reports every command whose freshly computed output differs byte-for-byte from
/// what was recorded.
pub fn replay(scenario: &ReplayScenario, mut run: impl FnMut(&str) -> String) -> ReplayReport {
    let mut diverged = Vec::new();
    for command in &scenario.commands {
        let actual = run(&command.input_json);
        if actual != command.output_json {
            diverged.push(command.label.clone());
        }
    }
    ReplayReport { total: scenario.commands.len(), diverged }
}
