//! The fold itself: partitions candidates by `(kind, normalized name)`, orders each
//! partition by precedence rank, and folds left-to-right preferring the
//! higher-priority candidate for each field while recording every disagreement.

use super::record::{CandidateValue, DefinitionConvergenceRecord};
use crate::discovery::Candidate;
use indexmap::IndexMap;
use viewc_core::semantics::{BindableDef, ResourceDef, ResourceKind};

fn partition_key(c: &Candidate) -> (ResourceKind, String) {
    (c.def.kind(), c.def.name().to_string())
}

/// Groups candidates by `(kind, name)` and sorts each group ascending by
/// `CandidateSource` (lower rank = higher priority), matching §4.E step 1.
pub fn partition(candidates: Vec<Candidate>) -> IndexMap<(ResourceKind, String), Vec<Candidate>> {
    let mut groups: IndexMap<(ResourceKind, String), Vec<Candidate>> = IndexMap::new();
    for c in candidates {
        groups.entry(partition_key(&c)).or_default().push(c);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|c| c.source);
    }
    groups
}

fn fold_bindables(
    winner: &IndexMap<String, BindableDef>,
    challenger: &IndexMap<String, BindableDef>,
    winner_source: crate::discovery::CandidateSource,
    challenger_source: crate::discovery::CandidateSource,
    resource_kind: ResourceKind,
    resource_name: &str,
    records: &mut Vec<DefinitionConvergenceRecord>,
) -> IndexMap<String, BindableDef> {
    let mut merged = winner.clone();
    for (prop, challenger_def) in challenger {
        match merged.get(prop) {
            None => {
                merged.insert(prop.clone(), challenger_def.clone());
            }
            Some(winner_def) => {
                if winner_def.attribute != challenger_def.attribute {
                    records.push(DefinitionConvergenceRecord {
                        resource_kind,
                        resource_name: resource_name.to_string(),
                        field: format!("bindables.{prop}.attribute"),
                        candidates: vec![
                            CandidateValue {
                                source: winner_source,
                                description: format!("{:?}", winner_def.attribute),
                            },
                            CandidateValue {
                                source: challenger_source,
                                description: format!("{:?}", challenger_def.attribute),
                            },
                        ],
                        reasons: vec!["bindable attribute name disagreement".to_string()],
                    });
                }
                if winner_def.mode != challenger_def.mode {
                    records.push(DefinitionConvergenceRecord {
                        resource_kind,
                        resource_name: resource_name.to_string(),
                        field: format!("bindables.{prop}.mode"),
                        candidates: vec![
                            CandidateValue {
                                source: winner_source,
                                description: format!("{:?}", winner_def.mode),
                            },
                            CandidateValue {
                                source: challenger_source,
                                description: format!("{:?}", challenger_def.mode),
                            },
                        ],
                        reasons: vec!["bindable binding mode disagreement".to_string()],
                    });
                }
                if winner_def.primary != challenger_def.primary {
                    records.push(DefinitionConvergenceRecord {
                        resource_kind,
                        resource_name: resource_name.to_string(),
                        field: format!("bindables.{prop}.primary"),
                        candidates: vec![
                            CandidateValue {
                                source: winner_source,
                                description: format!("{}", winner_def.primary),
                            },
                            CandidateValue {
                                source: challenger_source,
                                description: format!("{}", challenger_def.primary),
                            },
                        ],
                        reasons: vec!["bindable primary-property disagreement".to_string()],
                    });
                }
            }
        }
    }
    merged
}

/// Folds one `(kind, name)` partition (already precedence-sorted) into a single
/// `ResourceDef`, plus every field-level disagreement found along the way.
pub fn fold_partition(mut candidates: Vec<Candidate>) -> (ResourceDef, Vec<DefinitionConvergenceRecord>) {
    debug_assert!(!candidates.is_empty(), "fold_partition requires at least one candidate");
    let mut records = Vec::new();
    let winner_source = candidates[0].source;
    let mut winner = candidates.remove(0).def;

    for challenger in candidates {
        let resource_kind = winner.kind();
        let resource_name = winner.name().to_string();

        if winner.name() != challenger.def.name() {
            records.push(DefinitionConvergenceRecord {
                resource_kind,
                resource_name: resource_name.clone(),
                field: "name".to_string(),
                candidates: vec![
                    CandidateValue {
                        source: winner_source,
                        description: winner.name().to_string(),
                    },
                    CandidateValue {
                        source: challenger.source,
                        description: challenger.def.name().to_string(),
                    },
                ],
                reasons: vec!["resource name disagreement across candidates".to_string()],
            });
        }

        winner = merge_fields(winner, challenger, winner_source, &mut records);
    }

    (winner, records)
}

fn merge_fields(
    winner: ResourceDef,
    challenger: Candidate,
    winner_source: crate::discovery::CandidateSource,
    records: &mut Vec<DefinitionConvergenceRecord>,
) -> ResourceDef {
    let resource_kind = winner.kind();
    let resource_name = winner.name().to_string();
    let challenger_source = challenger.source;

    match (winner, challenger.def) {
        (ResourceDef::CustomElement(mut w), ResourceDef::CustomElement(c)) => {
            w.bindables.value = fold_bindables(
                &w.bindables.value,
                &c.bindables.value,
                winner_source,
                challenger_source,
                resource_kind,
                &resource_name,
                records,
            );
            if w.template.value.is_none() {
                w.template.value = c.template.value;
            }
            ResourceDef::CustomElement(w)
        }
        (ResourceDef::CustomAttribute(mut w), ResourceDef::CustomAttribute(c)) => {
            w.bindables.value = fold_bindables(
                &w.bindables.value,
                &c.bindables.value,
                winner_source,
                challenger_source,
                resource_kind,
                &resource_name,
                records,
            );
            ResourceDef::CustomAttribute(w)
        }
        (ResourceDef::TemplateController(mut w), ResourceDef::TemplateController(c)) => {
            w.bindables.value = fold_bindables(
                &w.bindables.value,
                &c.bindables.value,
                winner_source,
                challenger_source,
                resource_kind,
                &resource_name,
                records,
            );
            ResourceDef::TemplateController(w)
        }
        (winner, _challenger_def) => winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::CandidateSource;
    use indexmap::IndexMap;
    use viewc_core::ids::DocumentUri;
    use viewc_core::semantics::{BindingMode, CustomElementDef, Origin, Sourced};

    fn element(name: &str, bindables: IndexMap<String, BindableDef>) -> ResourceDef {
        ResourceDef::CustomElement(CustomElementDef {
            name: Sourced::new(name.to_string(), Origin::Source),
            class_name: Sourced::new("Foo".to_string(), Origin::Source),
            file: DocumentUri::new("foo.ts"),
            aliases: Sourced::new(vec![], Origin::Source),
            bindables: Sourced::new(bindables, Origin::Source),
            containerless: Sourced::new(false, Origin::Source),
            template: Sourced::new(None, Origin::Source),
        })
    }

    #[test]
    fn decorator_mode_wins_over_template_meta_mode() {
        let mut class_bindables = IndexMap::new();
        class_bindables.insert(
            "displayData".to_string(),
            BindableDef {
                property: "displayData".to_string(),
                attribute: None,
                mode: BindingMode::ToView,
                primary: false,
            },
        );
        let mut meta_bindables = IndexMap::new();
        meta_bindables.insert(
            "displayData".to_string(),
            BindableDef {
                property: "displayData".to_string(),
                attribute: Some("display-data".to_string()),
                mode: BindingMode::TwoWay,
                primary: false,
            },
        );

        let candidates = vec![
            Candidate::new(element("device-list", class_bindables), CandidateSource::Decorator),
            Candidate::new(element("device-list", meta_bindables), CandidateSource::SiblingTemplate),
        ];

        let (folded, records) = fold_partition(candidates);
        let bindables = folded.bindables().unwrap();
        assert_eq!(bindables.get("displayData").unwrap().mode, BindingMode::ToView);
        assert!(records.iter().any(|r| r.field == "bindables.displayData.mode"));
        assert!(records.iter().any(|r| r.field == "bindables.displayData.attribute"));

        let mode_record = records.iter().find(|r| r.field == "bindables.displayData.mode").unwrap();
        assert_eq!(mode_record.candidates[0].source, CandidateSource::Decorator);
        assert_eq!(mode_record.candidates[0].description, "ToView");
        assert_eq!(mode_record.candidates[1].source, CandidateSource::SiblingTemplate);
        assert_eq!(mode_record.candidates[1].description, "TwoWay");
    }

    #[test]
    fn name_mismatch_produces_error_severity_record() {
        let candidates = vec![
            Candidate::new(element("nav-bar", IndexMap::new()), CandidateSource::Decorator),
            Candidate::new(element("navbar", IndexMap::new()), CandidateSource::Convention),
        ];
        let (_, records) = fold_partition(candidates);
        let name_record = records.iter().find(|r| r.field == "name").unwrap();
        assert_eq!(name_record.severity(), crate::diagnostics::Severity::Error);
    }

    #[test]
    fn partition_groups_by_kind_and_name() {
        let candidates = vec![
            Candidate::new(element("nav-bar", IndexMap::new()), CandidateSource::Decorator),
            Candidate::new(element("nav-bar", IndexMap::new()), CandidateSource::Convention),
            Candidate::new(element("card", IndexMap::new()), CandidateSource::Decorator),
        ];
        let groups = partition(candidates);
        assert_eq!(groups.len(), 2);
    }
}
