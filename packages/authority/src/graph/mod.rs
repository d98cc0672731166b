//! Component F: resource graph. Builds the scope tree (root / per-file local scopes /
//! per-local-template scopes) and implements the non-classical materialization rule:
//! a target scope sees `root ∪ target`, never the intermediate ancestor chain.

use indexmap::{IndexMap, IndexSet};
use viewc_core::ids::{DocumentUri, ResourceScopeId};
use viewc_core::semantics::{ResourceDef, ResourceKind, catalog_key};

#[derive(Debug, Clone)]
pub struct ScopeNode {
    pub id: ResourceScopeId,
    pub parent: Option<ResourceScopeId>,
    /// Catalog keys (`<kind>:<name>`) of resources registered directly in this scope.
    pub local_resources: IndexSet<String>,
}

/// The resource graph: root plus every local/local-template scope discovered in the
/// project, each holding only the catalog keys registered directly within it.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    pub scopes: IndexMap<ResourceScopeId, ScopeNode>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        let mut scopes = IndexMap::new();
        scopes.insert(
            ResourceScopeId::root(),
            ScopeNode {
                id: ResourceScopeId::root(),
                parent: None,
                local_resources: IndexSet::new(),
            },
        );
        ResourceGraph { scopes }
    }

    pub fn ensure_local_scope(&mut self, file: &DocumentUri) -> ResourceScopeId {
        let id = ResourceScopeId::local(file);
        self.scopes.entry(id.clone()).or_insert_with(|| ScopeNode {
            id: id.clone(),
            parent: Some(ResourceScopeId::root()),
            local_resources: IndexSet::new(),
        });
        id
    }

    pub fn ensure_local_template_scope(&mut self, owner_file: &DocumentUri, name: &str) -> ResourceScopeId {
        let owner_scope = self.ensure_local_scope(owner_file);
        let id = ResourceScopeId::local_template(owner_file, name);
        self.scopes.entry(id.clone()).or_insert_with(|| ScopeNode {
            id: id.clone(),
            parent: Some(owner_scope),
            local_resources: IndexSet::new(),
        });
        id
    }

    pub fn register(&mut self, scope: &ResourceScopeId, def: &ResourceDef) {
        let key = catalog_key(def.kind(), def.name());
        if let Some(node) = self.scopes.get_mut(scope) {
            node.local_resources.insert(key);
        }
    }

    /// §4.F materialization: a target scope sees `root ∪ target`; intermediate
    /// ancestors between them are never consulted, even if they exist. Deliberately
    /// does not recurse through `parent` beyond one lookup of the root.
    pub fn materialize(&self, scope: &ResourceScopeId) -> IndexSet<String> {
        let mut out = IndexSet::new();
        if let Some(root) = self.scopes.get(&ResourceScopeId::root()) {
            out.extend(root.local_resources.iter().cloned());
        }
        if !scope.is_root() {
            if let Some(node) = self.scopes.get(scope) {
                out.extend(node.local_resources.iter().cloned());
            }
        }
        out
    }

    pub fn is_visible(&self, scope: &ResourceScopeId, kind: ResourceKind, name: &str) -> bool {
        self.materialize(scope).contains(&catalog_key(kind, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::semantics::{CustomElementDef, Origin, Sourced};

    fn element(name: &str) -> ResourceDef {
        ResourceDef::CustomElement(CustomElementDef {
            name: Sourced::new(name.to_string(), Origin::Source),
            class_name: Sourced::new("Foo".to_string(), Origin::Source),
            file: DocumentUri::new("foo.ts"),
            aliases: Sourced::new(vec![], Origin::Source),
            bindables: Sourced::new(indexmap::IndexMap::new(), Origin::Source),
            containerless: Sourced::new(false, Origin::Source),
            template: Sourced::new(None, Origin::Source),
        })
    }

    #[test]
    fn local_scope_does_not_see_sibling_local_scope() {
        let mut graph = ResourceGraph::new();
        let app = graph.ensure_local_scope(&DocumentUri::new("app.html"));
        let other = graph.ensure_local_scope(&DocumentUri::new("other.html"));
        graph.register(&app, &element("nav-bar"));
        graph.register(&other, &element("card"));

        assert!(graph.is_visible(&app, ResourceKind::CustomElement, "nav-bar"));
        assert!(!graph.is_visible(&app, ResourceKind::CustomElement, "card"));
    }

    #[test]
    fn root_resources_visible_everywhere() {
        let mut graph = ResourceGraph::new();
        graph.register(&ResourceScopeId::root(), &element("au-viewport"));
        let local = graph.ensure_local_scope(&DocumentUri::new("app.html"));
        assert!(graph.is_visible(&local, ResourceKind::CustomElement, "au-viewport"));
    }

    #[test]
    fn local_template_scope_does_not_inherit_intermediate_ancestor() {
        let mut graph = ResourceGraph::new();
        let owner = DocumentUri::new("app.html");
        let owner_scope = graph.ensure_local_scope(&owner);
        graph.register(&owner_scope, &element("owner-only"));

        let template_scope = graph.ensure_local_template_scope(&owner, "local-card");
        graph.register(&template_scope, &element("inner"));

        // root ∪ template_scope only — the owner's local scope (an intermediate
        // ancestor) is not consulted, so "owner-only" must not be visible here.
        assert!(!graph.is_visible(&template_scope, ResourceKind::CustomElement, "owner-only"));
        assert!(graph.is_visible(&template_scope, ResourceKind::CustomElement, "inner"));
    }
}
