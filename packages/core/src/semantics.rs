//! Built-in framework knowledge: DOM schema, naming rules, event types, two-way
//! defaults, built-in template controllers, and the resource-definition shapes that
//! discovery candidates and converged definitions both use.
//!
//! Corresponds in spirit to `schema/dom_element_schema_registry.rs` and
//! `schema/element_schema_registry.rs` in the teacher, condensed to the subset of DOM
//! knowledge a template compiler's link stage actually consults (attribute-to-property
//! mapping and two-way defaults), not the full animation/security-context registry
//! Angular needs for its own sanitizer.

use crate::ids::{DocumentUri, Span};
use crate::gap::Gap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where a piece of semantic data came from. Threaded through every field of a
/// `ResourceDef` so the convergence assembler can rank candidates and the query layer
/// can explain provenance back to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Source,
    Config,
    Builtin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: T,
    pub origin: Origin,
    pub location: Option<Span>,
}

impl<T> Sourced<T> {
    pub fn new(value: T, origin: Origin) -> Self {
        Sourced {
            value,
            origin,
            location: None,
        }
    }

    pub fn builtin(value: T) -> Self {
        Sourced::new(value, Origin::Builtin)
    }

    pub fn at(mut self, location: Span) -> Self {
        self.location = Some(location);
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            origin: self.origin,
            location: self.location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingMode {
    OneTime,
    ToView,
    FromView,
    TwoWay,
    /// Not yet resolved to a concrete mode; the link stage resolves this via the
    /// per-bindable -> per-tag -> global -> `toView` priority chain.
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindableDef {
    pub property: String,
    pub attribute: Option<String>,
    pub mode: BindingMode,
    pub primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    CustomElement,
    CustomAttribute,
    TemplateController,
    ValueConverter,
    BindingBehavior,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::CustomElement => "custom-element",
            ResourceKind::CustomAttribute => "custom-attribute",
            ResourceKind::TemplateController => "template-controller",
            ResourceKind::ValueConverter => "value-converter",
            ResourceKind::BindingBehavior => "binding-behavior",
        }
    }
}

/// Whether a template-controller opens a new scope frame for its subtree, and if so,
/// what shape of frame. Per design notes, controllers are characterized by this triple
/// rather than by name — a custom controller with the same `(scope, frame_origin)`
/// pairing as a built-in gets identical bind-stage treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeBehavior {
    /// Opens a new overlay frame (`repeat`, `with`, `promise`/`then`/`catch`).
    Overlay,
    /// Reuses the enclosing frame (`if`, `switch`, `portal`).
    Reuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FramePatternKind {
    Iterator,
    ValueOverlay,
    PromiseValue,
    PromiseBranch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomElementDef {
    pub name: Sourced<String>,
    pub class_name: Sourced<String>,
    pub file: DocumentUri,
    pub aliases: Sourced<Vec<String>>,
    pub bindables: Sourced<IndexMap<String, BindableDef>>,
    pub containerless: Sourced<bool>,
    /// Sibling or inline template text, if known at discovery time.
    pub template: Sourced<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomAttributeDef {
    pub name: Sourced<String>,
    pub class_name: Sourced<String>,
    pub file: DocumentUri,
    pub aliases: Sourced<Vec<String>>,
    pub bindables: Sourced<IndexMap<String, BindableDef>>,
    pub default_property: Sourced<Option<String>>,
    pub no_multi_bindings: Sourced<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateControllerDef {
    pub name: Sourced<String>,
    pub class_name: Sourced<String>,
    pub file: DocumentUri,
    pub aliases: Sourced<Vec<String>>,
    pub bindables: Sourced<IndexMap<String, BindableDef>>,
    pub default_property: Sourced<Option<String>>,
    pub no_multi_bindings: Sourced<bool>,
    pub scope: ScopeBehavior,
    pub frame_pattern: Option<FramePatternKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueConverterDef {
    pub name: Sourced<String>,
    pub class_name: Sourced<String>,
    pub file: DocumentUri,
    pub aliases: Sourced<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingBehaviorDef {
    pub name: Sourced<String>,
    pub class_name: Sourced<String>,
    pub file: DocumentUri,
    pub aliases: Sourced<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ResourceDef {
    CustomElement(CustomElementDef),
    CustomAttribute(CustomAttributeDef),
    TemplateController(TemplateControllerDef),
    ValueConverter(ValueConverterDef),
    BindingBehavior(BindingBehaviorDef),
}

impl ResourceDef {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceDef::CustomElement(_) => ResourceKind::CustomElement,
            ResourceDef::CustomAttribute(_) => ResourceKind::CustomAttribute,
            ResourceDef::TemplateController(_) => ResourceKind::TemplateController,
            ResourceDef::ValueConverter(_) => ResourceKind::ValueConverter,
            ResourceDef::BindingBehavior(_) => ResourceKind::BindingBehavior,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourceDef::CustomElement(d) => &d.name.value,
            ResourceDef::CustomAttribute(d) => &d.name.value,
            ResourceDef::TemplateController(d) => &d.name.value,
            ResourceDef::ValueConverter(d) => &d.name.value,
            ResourceDef::BindingBehavior(d) => &d.name.value,
        }
    }

    pub fn file(&self) -> &DocumentUri {
        match self {
            ResourceDef::CustomElement(d) => &d.file,
            ResourceDef::CustomAttribute(d) => &d.file,
            ResourceDef::TemplateController(d) => &d.file,
            ResourceDef::ValueConverter(d) => &d.file,
            ResourceDef::BindingBehavior(d) => &d.file,
        }
    }

    pub fn bindables(&self) -> Option<&IndexMap<String, BindableDef>> {
        match self {
            ResourceDef::CustomElement(d) => Some(&d.bindables.value),
            ResourceDef::CustomAttribute(d) => Some(&d.bindables.value),
            ResourceDef::TemplateController(d) => Some(&d.bindables.value),
            _ => None,
        }
    }

    /// Catalog key per the referential index's `<kind>:<name>` format.
    pub fn catalog_key(&self) -> String {
        catalog_key(self.kind(), self.name())
    }
}

pub fn catalog_key(kind: ResourceKind, name: &str) -> String {
    format!("{}:{}", kind.as_str(), name)
}

pub fn bindable_catalog_key(kind: ResourceKind, container: &str, bindable_name: &str) -> String {
    format!("{}:{}:bindable:{}", kind.as_str(), container, bindable_name)
}

/// `normalizedName = lowercase-kebab`, except an explicit string literal from source is
/// preserved verbatim (per design notes).
pub fn normalize_resource_name(authored: &str, explicit_literal: bool) -> String {
    if explicit_literal {
        return authored.to_string();
    }
    to_kebab_case(authored)
}

pub fn to_kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for (i, ch) in input.char_indices() {
        if ch.is_uppercase() {
            if i != 0 {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn to_pascal_case(kebab: &str) -> String {
    kebab
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn to_camel_case(kebab: &str) -> String {
    let pascal = to_pascal_case(kebab);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

const PRESERVED_PREFIXES: &[&str] = &["data-", "aria-"];

pub fn has_preserved_prefix(authored_lowercase: &str) -> bool {
    PRESERVED_PREFIXES
        .iter()
        .any(|p| authored_lowercase.starts_with(p))
}

/// Per-tag attribute -> property overrides plus the global camelCase fallback, mirroring
/// (in much reduced form) the teacher's `dom_element_schema_registry.rs` line-encoded
/// schema table.
#[derive(Debug, Clone, Default)]
pub struct NamingRules {
    pub attr_to_prop_global: IndexMap<String, String>,
    pub per_tag: IndexMap<String, IndexMap<String, String>>,
}

impl NamingRules {
    /// `naming.perTag > element's attrToProp > naming.attrToPropGlobal > camelCase`,
    /// except an authored name with a preserved prefix is never camelCased.
    pub fn resolve_property_name(&self, tag: &str, authored: &str, dom_attr_to_prop: &NamingRules) -> String {
        let lower = authored.to_lowercase();
        if let Some(per_tag) = self.per_tag.get(tag) {
            if let Some(mapped) = per_tag.get(authored) {
                return mapped.clone();
            }
        }
        if let Some(mapped) = dom_attr_to_prop.per_tag.get(tag).and_then(|m| m.get(authored)) {
            return mapped.clone();
        }
        if let Some(mapped) = self.attr_to_prop_global.get(authored) {
            return mapped.clone();
        }
        if has_preserved_prefix(&lower) {
            return authored.to_string();
        }
        to_camel_case(authored)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DomSchema {
    pub tag_props: IndexMap<String, Vec<String>>,
    pub naming: NamingRules,
}

impl DomSchema {
    pub fn has_property(&self, tag: &str, prop: &str) -> bool {
        self.tag_props
            .get(tag)
            .map(|props| props.iter().any(|p| p == prop))
            .unwrap_or(false)
    }

    pub fn has_element(&self, tag: &str) -> bool {
        self.tag_props.contains_key(tag)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventSchema {
    pub known_events: IndexMap<String, ()>,
}

impl EventSchema {
    pub fn is_known(&self, event_name: &str) -> bool {
        self.known_events.contains_key(event_name)
    }
}

#[derive(Debug, Clone)]
pub struct ConditionalTwoWay {
    pub tag: String,
    pub prop: String,
    pub condition_attr: String,
    pub condition_value: String,
}

/// By-tag, global, and conditional two-way defaults consulted by the link stage when
/// resolving a `default`-authored binding mode for a DOM-native property.
#[derive(Debug, Clone, Default)]
pub struct TwoWayDefaults {
    pub global_props: Vec<String>,
    pub conditional: Vec<ConditionalTwoWay>,
}

impl TwoWayDefaults {
    /// `observed_attrs` are the host element's other statically-authored attributes,
    /// consulted for e.g. `<input type="checkbox">` forcing `checked` two-way.
    pub fn is_two_way(&self, tag: &str, prop: &str, observed_attrs: &IndexMap<String, String>) -> bool {
        for cond in &self.conditional {
            if cond.tag == tag
                && cond.prop == prop
                && observed_attrs.get(&cond.condition_attr).map(|v| v.as_str())
                    == Some(cond.condition_value.as_str())
            {
                return true;
            }
        }
        self.global_props.iter().any(|p| p == prop)
    }
}

/// Base framework knowledge, immutable after construction (per design notes, the only
/// "global state" this system carries).
#[derive(Debug, Clone, Default)]
pub struct Semantics {
    pub resources: IndexMap<String, ResourceDef>,
    pub dom_schema: DomSchema,
    pub naming: NamingRules,
    pub events: EventSchema,
    pub two_way: TwoWayDefaults,
}

impl Semantics {
    pub fn builtin() -> Self {
        crate::builtins::builtin_semantics()
    }

    pub fn get(&self, kind: ResourceKind, name: &str) -> Option<&ResourceDef> {
        self.resources.get(&catalog_key(kind, name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogConfidence {
    Exact,
    Partial,
    Conservative,
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub def: ResourceDef,
    pub gaps: Vec<Gap>,
    pub confidence: CatalogConfidence,
}

/// Derived indices over `MaterializedSemantics`, keyed by `"<kind>:<name>"`.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    pub entries: IndexMap<String, CatalogEntry>,
}

impl ResourceCatalog {
    pub fn get(&self, kind: ResourceKind, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(&catalog_key(kind, name))
    }

    pub fn insert(&mut self, def: ResourceDef, gaps: Vec<Gap>) {
        let confidence = rollup_confidence(&gaps);
        let key = def.catalog_key();
        self.entries.insert(key, CatalogEntry { def, gaps, confidence });
    }
}

fn rollup_confidence(gaps: &[Gap]) -> CatalogConfidence {
    use crate::gap::GapKind;
    if gaps.iter().any(|g| matches!(g.why, GapKind::Conservative)) {
        CatalogConfidence::Conservative
    } else if gaps.iter().any(|g| matches!(g.why, GapKind::PartialEval)) {
        CatalogConfidence::Partial
    } else {
        CatalogConfidence::Exact
    }
}

#[derive(Debug, Clone)]
pub struct MaterializedSemantics {
    pub base: Semantics,
    pub catalog: ResourceCatalog,
}

#[derive(Debug, Clone)]
pub struct BindingCommandDef {
    pub name: String,
    pub mode: Option<BindingMode>,
}

#[derive(Debug, Clone)]
pub struct AttributePatternDef {
    pub pattern: String,
    pub symbols: String,
}

/// Binding commands, attribute patterns, and interpolation delimiters — the syntactic
/// surface the lowering stage consults, as distinct from the semantic resource catalog.
#[derive(Debug, Clone)]
pub struct TemplateSyntaxRegistry {
    pub commands: IndexMap<String, BindingCommandDef>,
    pub attribute_patterns: Vec<AttributePatternDef>,
    pub interp_start: String,
    pub interp_end: String,
}

impl Default for TemplateSyntaxRegistry {
    fn default() -> Self {
        crate::builtins::builtin_syntax_registry()
    }
}
