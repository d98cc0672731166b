//! Construction of the immutable built-in `Semantics` and `TemplateSyntaxRegistry`:
//! the framework's own template controllers, DOM schema subset, and binding commands.
//! Condensed from the teacher's `dom_element_schema_registry.rs` schema-string table to
//! the handful of tags and properties the link stage actually needs to resolve.

use crate::ids::DocumentUri;
use crate::semantics::{
    AttributePatternDef, BindableDef, BindingCommandDef, BindingMode, ConditionalTwoWay,
    CustomAttributeDef, DomSchema, EventSchema, FramePatternKind, NamingRules, Origin,
    ResourceDef, ScopeBehavior, Semantics, Sourced, TemplateControllerDef, TemplateSyntaxRegistry,
    TwoWayDefaults,
};
use indexmap::IndexMap;

const BUILTIN_FILE: &str = "<builtin>";

fn builtin_file() -> DocumentUri {
    DocumentUri::new(BUILTIN_FILE)
}

fn sourced<T>(value: T) -> Sourced<T> {
    Sourced::builtin(value)
}

fn controller(
    name: &str,
    scope: ScopeBehavior,
    frame_pattern: Option<FramePatternKind>,
    bindables: &[(&str, bool)],
) -> ResourceDef {
    let mut bindable_map = IndexMap::new();
    for (prop, primary) in bindables {
        bindable_map.insert(
            prop.to_string(),
            BindableDef {
                property: prop.to_string(),
                attribute: None,
                mode: BindingMode::ToView,
                primary: *primary,
            },
        );
    }
    ResourceDef::TemplateController(TemplateControllerDef {
        name: sourced(name.to_string()),
        class_name: sourced(crate::semantics::to_pascal_case(name)),
        file: builtin_file(),
        aliases: sourced(vec![]),
        bindables: sourced(bindable_map),
        default_property: sourced(bindables.iter().find(|(_, p)| *p).map(|(n, _)| n.to_string())),
        no_multi_bindings: sourced(false),
        scope,
        frame_pattern,
    })
}

pub fn builtin_template_controllers() -> Vec<ResourceDef> {
    vec![
        controller("if", ScopeBehavior::Reuse, None, &[("value", true)]),
        controller("else", ScopeBehavior::Reuse, None, &[]),
        controller(
            "repeat",
            ScopeBehavior::Overlay,
            Some(FramePatternKind::Iterator),
            &[("items", true)],
        ),
        controller(
            "with",
            ScopeBehavior::Overlay,
            Some(FramePatternKind::ValueOverlay),
            &[("value", true)],
        ),
        controller("switch", ScopeBehavior::Reuse, None, &[("value", true)]),
        controller("case", ScopeBehavior::Reuse, None, &[("value", true)]),
        controller("default-case", ScopeBehavior::Reuse, None, &[]),
        controller("promise", ScopeBehavior::Reuse, None, &[("value", true)]),
        controller(
            "then",
            ScopeBehavior::Overlay,
            Some(FramePatternKind::PromiseValue),
            &[("value", true)],
        ),
        controller(
            "catch",
            ScopeBehavior::Overlay,
            Some(FramePatternKind::PromiseBranch),
            &[("value", true)],
        ),
        controller("pending", ScopeBehavior::Reuse, None, &[]),
        controller("portal", ScopeBehavior::Reuse, None, &[("target", true)]),
    ]
}

/// `ref`/`t`/etc. are binding commands, not controllers, but `ref` and a handful of
/// others behave like pseudo-attributes the link stage must recognize as built-in
/// custom attributes so they resolve even when no such class exists.
fn builtin_custom_attributes() -> Vec<ResourceDef> {
    vec![ResourceDef::CustomAttribute(CustomAttributeDef {
        name: sourced("ref".to_string()),
        class_name: sourced("Ref".to_string()),
        file: builtin_file(),
        aliases: sourced(vec![]),
        bindables: sourced(IndexMap::new()),
        default_property: sourced(None),
        no_multi_bindings: sourced(true),
    })]
}

const DOM_TAGS: &[(&str, &[&str])] = &[
    ("div", &["className", "id", "title", "hidden", "style"]),
    ("span", &["className", "id", "title", "hidden", "style"]),
    (
        "button",
        &["disabled", "type", "value", "className", "id", "style"],
    ),
    (
        "input",
        &[
            "value",
            "checked",
            "disabled",
            "type",
            "placeholder",
            "readOnly",
            "required",
            "className",
            "id",
            "style",
        ],
    ),
    (
        "select",
        &["value", "disabled", "multiple", "className", "id"],
    ),
    ("option", &["value", "selected", "disabled"]),
    (
        "textarea",
        &["value", "disabled", "placeholder", "readOnly"],
    ),
    (
        "a",
        &["href", "target", "rel", "className", "id", "style"],
    ),
    ("img", &["src", "alt", "width", "height", "className"]),
    ("form", &["action", "method", "className", "id"]),
    ("label", &["htmlFor", "className", "id"]),
];

fn builtin_dom_schema() -> DomSchema {
    let mut tag_props = IndexMap::new();
    for (tag, props) in DOM_TAGS {
        tag_props.insert(tag.to_string(), props.iter().map(|p| p.to_string()).collect());
    }

    let mut global = IndexMap::new();
    global.insert("class".to_string(), "className".to_string());
    global.insert("for".to_string(), "htmlFor".to_string());
    global.insert("readonly".to_string(), "readOnly".to_string());

    let mut per_tag: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
    let mut label_overrides = IndexMap::new();
    label_overrides.insert("for".to_string(), "htmlFor".to_string());
    per_tag.insert("label".to_string(), label_overrides);

    DomSchema {
        tag_props,
        naming: NamingRules {
            attr_to_prop_global: global,
            per_tag,
        },
    }
}

fn builtin_events() -> EventSchema {
    const EVENTS: &[&str] = &[
        "click", "dblclick", "input", "change", "submit", "keydown", "keyup", "keypress",
        "focus", "blur", "mouseenter", "mouseleave", "mousedown", "mouseup", "scroll", "load",
    ];
    let mut known_events = IndexMap::new();
    for e in EVENTS {
        known_events.insert(e.to_string(), ());
    }
    EventSchema { known_events }
}

fn builtin_two_way() -> TwoWayDefaults {
    TwoWayDefaults {
        global_props: vec!["value".to_string()],
        conditional: vec![ConditionalTwoWay {
            tag: "input".to_string(),
            prop: "checked".to_string(),
            condition_attr: "type".to_string(),
            condition_value: "checkbox".to_string(),
        }],
    }
}

pub fn builtin_semantics() -> Semantics {
    let mut resources = IndexMap::new();
    for def in builtin_template_controllers()
        .into_iter()
        .chain(builtin_custom_attributes())
    {
        resources.insert(def.catalog_key(), def);
    }
    Semantics {
        resources,
        dom_schema: builtin_dom_schema(),
        naming: NamingRules::default(),
        events: builtin_events(),
        two_way: builtin_two_way(),
    }
}

const BINDING_COMMANDS: &[(&str, Option<BindingMode>)] = &[
    ("bind", None),
    ("to-view", Some(BindingMode::ToView)),
    ("one-time", Some(BindingMode::OneTime)),
    ("from-view", Some(BindingMode::FromView)),
    ("two-way", Some(BindingMode::TwoWay)),
    ("trigger", None),
    ("capture", None),
    ("delegate", None),
    ("for", None),
    ("ref", None),
    ("t", None),
    ("t.bind", None),
];

pub fn builtin_syntax_registry() -> TemplateSyntaxRegistry {
    let mut commands = IndexMap::new();
    for (name, mode) in BINDING_COMMANDS {
        commands.insert(
            name.to_string(),
            BindingCommandDef {
                name: name.to_string(),
                mode: *mode,
            },
        );
    }
    TemplateSyntaxRegistry {
        commands,
        attribute_patterns: vec![
            AttributePatternDef {
                pattern: ":PART".to_string(),
                symbols: ":".to_string(),
            },
            AttributePatternDef {
                pattern: "@PART".to_string(),
                symbols: "@".to_string(),
            },
        ],
        interp_start: "${".to_string(),
        interp_end: "}".to_string(),
    }
}
