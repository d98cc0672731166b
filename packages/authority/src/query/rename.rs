use viewc_core::ids::{DocumentUri, Span};
use viewc_core::semantics::{to_camel_case, to_kebab_case};

use crate::refindex::ReferentialIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub uri: DocumentUri,
    pub span: Span,
    pub new_text: String,
}

/// Placeholder = entity name; edits = all reference sites; each edit is span-exact and
/// casing-preserving for kebab↔camel pairs (a tag name stays kebab-case, a bindable
/// property reference stays camelCase, even though both sites share one entity).
pub fn rename(resource_key: &str, new_name: &str, refs: &ReferentialIndex) -> Vec<TextEdit> {
    refs.sites_for(resource_key)
        .into_iter()
        .map(|site| TextEdit {
            uri: site.file.clone(),
            span: site.span,
            new_text: matching_case(&site.name_form, new_name),
        })
        .collect()
}

fn matching_case(original: &str, new_name: &str) -> String {
    if original.contains('-') {
        to_kebab_case(new_name)
    } else if original.chars().next().is_some_and(char::is_uppercase) {
        let camel = to_camel_case(&to_kebab_case(new_name));
        let mut chars = camel.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => camel,
        }
    } else {
        to_camel_case(&to_kebab_case(new_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::ids::SourceFileId;
    use viewc_core::refsite::{ReferenceDomain, ReferenceKind, TextReferenceSite};

    fn site(uri: &DocumentUri, name_form: &str, start: u32, end: u32) -> TextReferenceSite {
        TextReferenceSite {
            domain: ReferenceDomain::Template,
            reference_kind: ReferenceKind::AttributeName,
            file: uri.clone(),
            span: Span { file: Some(SourceFileId::new(0)), start, end },
            name_form: name_form.to_string(),
            resource_key: "custom-element:nav-bar:bindable:displayData".to_string(),
        }
    }

    #[test]
    fn rename_preserves_kebab_case_at_kebab_sites_and_camel_at_camel_sites() {
        let uri = DocumentUri::new("app.html");
        let mut refs = ReferentialIndex::new();
        refs.insert(site(&uri, "display-data", 0, 12));
        refs.insert(site(&uri, "displayData", 20, 31));

        let edits = rename("custom-element:nav-bar:bindable:displayData", "visibleData", &refs);
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].new_text, "visible-data");
        assert_eq!(edits[1].new_text, "visibleData");
    }
}
