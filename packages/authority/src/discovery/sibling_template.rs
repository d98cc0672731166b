//! Sibling-template recognizer: `<import from="./foo">` inside a template, where `foo`
//! resolves to a `.html` file with no co-located `.ts` exporting a matching class.
//! Ownership falls back to basename match against the importing template's directory;
//! an ambiguous basename match (more than one candidate owner) is reported rather than
//! guessed.

use super::candidate::{Candidate, CandidateSource};
use indexmap::IndexMap;
use viewc_core::gap::{Gap, GapKind};
use viewc_core::ids::DocumentUri;
use viewc_core::semantics::{CustomElementDef, Origin, ResourceDef, Sourced, to_kebab_case};
use viewc_host::resolver::ModuleResolver;

/// A `<import from="...">` reference found while walking a template's DOM tree,
/// collected upstream by the pipeline's lowering stage and handed to discovery.
#[derive(Debug, Clone)]
pub struct TemplateImportRef {
    pub from: String,
    pub span: viewc_core::ids::Span,
}

pub fn analyze(
    template_file: &DocumentUri,
    imports: &[TemplateImportRef],
    resolver: &dyn ModuleResolver,
    known_template_owners: &IndexMap<DocumentUri, DocumentUri>,
) -> (Vec<Candidate>, Vec<Gap>) {
    let mut candidates = Vec::new();
    let mut gaps = Vec::new();

    for import in imports {
        let resolved = match resolver.resolve(&import.from, template_file) {
            Ok(uri) if uri.as_str().ends_with(".html") => uri,
            _ => continue,
        };

        let owner = known_template_owners.get(&resolved).cloned();
        let owner = match owner {
            Some(uri) => uri,
            None => {
                // Fall back to basename match: `foo.html` imported with no companion
                // `foo.ts` owner registered falls back to the template file itself
                // acting as its own element (a "bare" local template).
                gaps.push(
                    Gap::new(
                        format!("no view-model owner found for imported template '{}'", import.from),
                        GapKind::Conservative,
                    )
                    .at(import.span)
                    .suggest("co-locate a .ts file exporting a matching CustomElement class"),
                );
                continue;
            }
        };

        let stem = resolved.stem().to_string();
        let name = Sourced::new(to_kebab_case(&stem), Origin::Source).at(import.span);
        let class_name = Sourced::new(owner.stem().to_string(), Origin::Source);
        let def = ResourceDef::CustomElement(CustomElementDef {
            name,
            class_name,
            file: owner.clone(),
            aliases: Sourced::new(vec![], Origin::Source),
            bindables: Sourced::new(IndexMap::new(), Origin::Source),
            containerless: Sourced::new(false, Origin::Source),
            template: Sourced::new(Some(resolved.as_str().to_string()), Origin::Source),
        });
        candidates.push(Candidate::new(def, CandidateSource::SiblingTemplate));
    }

    (candidates, gaps)
}

/// When more than one `.ts` file in the same directory could plausibly own a given
/// sibling template (basename collision across subfolders resolved to the same
/// specifier), report the ambiguity instead of picking one arbitrarily.
pub fn check_ambiguous_ownership(
    template_file: &DocumentUri,
    candidate_owners: &[DocumentUri],
) -> Option<Gap> {
    if candidate_owners.len() <= 1 {
        return None;
    }
    Some(
        Gap::new(
            format!(
                "template '{}' has {} equally-plausible owning view-models",
                template_file,
                candidate_owners.len()
            ),
            GapKind::Conservative,
        )
        .suggest("add an explicit <import from> or rename to disambiguate"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewc_core::ids::Span;
    use viewc_host::memory::MemoryProject;

    #[test]
    fn resolves_owned_sibling_template() {
        let project = MemoryProject::new()
            .with_file(DocumentUri::new("src/app.html"))
            .with_file(DocumentUri::new("src/card.html"))
            .with_file(DocumentUri::new("src/card.ts"));
        let mut owners = IndexMap::new();
        owners.insert(DocumentUri::new("src/card.html"), DocumentUri::new("src/card.ts"));

        let imports = vec![TemplateImportRef {
            from: "./card".to_string(),
            span: Span::synthetic(0, 8),
        }];
        let (candidates, gaps) = analyze(&DocumentUri::new("src/app.html"), &imports, &project, &owners);
        assert!(gaps.is_empty());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].def.name(), "card");
    }

    #[test]
    fn unowned_sibling_template_emits_gap() {
        let project = MemoryProject::new()
            .with_file(DocumentUri::new("src/app.html"))
            .with_file(DocumentUri::new("src/orphan.html"));
        let owners = IndexMap::new();
        let imports = vec![TemplateImportRef {
            from: "./orphan".to_string(),
            span: Span::synthetic(0, 10),
        }];
        let (candidates, gaps) = analyze(&DocumentUri::new("src/app.html"), &imports, &project, &owners);
        assert!(candidates.is_empty());
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].why, GapKind::Conservative);
    }

    #[test]
    fn ambiguous_ownership_detected() {
        let gap = check_ambiguous_ownership(
            &DocumentUri::new("src/card.html"),
            &[DocumentUri::new("a/card.ts"), DocumentUri::new("b/card.ts")],
        );
        assert!(gap.is_some());
    }

    #[test]
    fn single_owner_not_ambiguous() {
        let gap = check_ambiguous_ownership(&DocumentUri::new("src/card.html"), &[DocumentUri::new("a/card.ts")]);
        assert!(gap.is_none());
    }
}
