//! Diagnostic code taxonomy. Namespaced `aurelia/…` strings per §6, each with a legacy
//! numeric equivalent carried in `data` for tooling that still keys off the old codes.

pub const UNKNOWN_ELEMENT: &str = "aurelia/unknown-element";
pub const UNKNOWN_ATTRIBUTE: &str = "aurelia/unknown-attribute";
pub const UNKNOWN_CONTROLLER: &str = "aurelia/unknown-controller";
pub const UNKNOWN_BINDABLE: &str = "aurelia/unknown-bindable";
pub const UNKNOWN_COMMAND: &str = "aurelia/unknown-command";
pub const UNKNOWN_CONVERTER: &str = "aurelia/unknown-converter";
pub const UNKNOWN_BEHAVIOR: &str = "aurelia/unknown-behavior";
pub const INVALID_BINDING_PATTERN: &str = "aurelia/invalid-binding-pattern";
pub const EXPR_PARSE_ERROR: &str = "aurelia/expr-parse-error";
pub const EXPR_TYPE_MISMATCH: &str = "aurelia/expr-type-mismatch";
pub const ALIAS_CONFLICT: &str = "aurelia/alias-conflict";
pub const DEFINITION_CONVERGENCE: &str = "aurelia/project/definition-convergence";
pub const GAP_PARTIAL_EVAL: &str = "aurelia/gap/partial-eval";
pub const GAP_UNKNOWN_REGISTRATION: &str = "aurelia/gap/unknown-registration";
pub const GAP_CACHE_CORRUPT: &str = "aurelia/gap/cache-corrupt";
pub const IR_ERROR: &str = "aurelia/ir-error";
pub const TEMPLATE_IMPORT_OWNER_AMBIGUOUS: &str = "aurelia/template-import-owner-ambiguous";
pub const INVALID_RESOURCE_NAME: &str = "aurelia/invalid-resource-name";
pub const DYNAMIC_VALUE: &str = "aurelia/dynamic-value";

/// `AUR07xx` covers the seven "unknown-*" resolution failures; `AUR0101`/`0102`/`0103`/
/// `0106` are the older parse/pattern/alias/ownership codes carried forward for tooling
/// that still matches on the legacy numbering.
pub fn legacy_code_for(code: &str) -> Option<&'static str> {
    match code {
        UNKNOWN_ELEMENT => Some("AUR0701"),
        UNKNOWN_ATTRIBUTE => Some("AUR0702"),
        UNKNOWN_CONTROLLER => Some("AUR0703"),
        UNKNOWN_BINDABLE => Some("AUR0704"),
        UNKNOWN_COMMAND => Some("AUR0705"),
        UNKNOWN_CONVERTER => Some("AUR0706"),
        UNKNOWN_BEHAVIOR => Some("AUR0707"),
        EXPR_PARSE_ERROR => Some("AUR0101"),
        INVALID_BINDING_PATTERN => Some("AUR0102"),
        ALIAS_CONFLICT => Some("AUR0103"),
        TEMPLATE_IMPORT_OWNER_AMBIGUOUS => Some("AUR0106"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_resolution_codes_map_to_aur07xx() {
        for code in [
            UNKNOWN_ELEMENT,
            UNKNOWN_ATTRIBUTE,
            UNKNOWN_CONTROLLER,
            UNKNOWN_BINDABLE,
            UNKNOWN_COMMAND,
            UNKNOWN_CONVERTER,
            UNKNOWN_BEHAVIOR,
        ] {
            assert!(legacy_code_for(code).unwrap().starts_with("AUR07"));
        }
    }
}
