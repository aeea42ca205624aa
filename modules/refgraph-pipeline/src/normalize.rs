//! Relationship normalization: partitions classified references into the
//! episode-to-episode and external relations, resolving episode targets
//! through the resolver. No reference is ever discarded — unresolvable
//! episode references are demoted to Unknown and routed to the external
//! relation; only rows whose *source* episode is unknown are rejected.

use std::collections::BTreeSet;

use refgraph_common::{
    ClassifiedReference, Episode, EpisodeReference, ExternalReference, ReferenceType,
};
use tracing::warn;

use crate::classify::split_title_url;
use crate::report::RunReport;
use crate::resolver::EpisodeResolver;

/// The three persisted relations of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTables {
    pub episodes: Vec<Episode>,
    pub episode_references: Vec<EpisodeReference>,
    pub external_references: Vec<ExternalReference>,
}

/// Partition `classified` into the two relations. Duplicate rows collapse;
/// output order is the natural (stable) order of each relation's key, so
/// identical input yields byte-identical tables.
pub fn normalize(
    classified: &[ClassifiedReference],
    resolver: &EpisodeResolver,
    report: &mut RunReport,
) -> NormalizedTables {
    let mut episode_rows: BTreeSet<EpisodeReference> = BTreeSet::new();
    let mut external_rows: BTreeSet<ExternalReference> = BTreeSet::new();
    let mut routed = 0usize;

    for c in classified {
        let (source_title_raw, source_url) = split_title_url(&c.episode);
        let Some(source) = resolver.resolve(&source_title_raw, source_url.as_deref()) else {
            warn!(episode = c.episode.as_str(), "Rejecting row: source episode not in canonical set");
            report.rejected_rows += 1;
            continue;
        };
        let source_title = resolver.title_of(source).unwrap_or_default().to_string();

        match c.kind {
            ReferenceType::Episode => match resolver.resolve(&c.title, c.url.as_deref()) {
                Some(target) => {
                    if target == source {
                        report.self_references += 1;
                    }
                    routed += 1;
                    episode_rows.insert(EpisodeReference {
                        source_episode_number: source,
                        source_episode_title: source_title,
                        referenced_episode_number: target,
                        referenced_episode_title: resolver
                            .title_of(target)
                            .unwrap_or_default()
                            .to_string(),
                    });
                }
                None => {
                    report.demoted_to_unknown += 1;
                    routed += 1;
                    external_rows.insert(ExternalReference {
                        episode_number: source,
                        episode_title: source_title,
                        reference_title: c.title.clone(),
                        reference_url: c.url.clone(),
                        reference_type_id: ReferenceType::Unknown.id(),
                    });
                }
            },
            kind => {
                routed += 1;
                external_rows.insert(ExternalReference {
                    episode_number: source,
                    episode_title: source_title,
                    reference_title: c.title.clone(),
                    reference_url: c.url.clone(),
                    reference_type_id: kind.id(),
                });
            }
        }
    }

    report.duplicate_rows_collapsed = routed - episode_rows.len() - external_rows.len();

    // URL-less external rows get deterministic placeholder keys, assigned in
    // sorted order so re-runs produce the same graph node identities.
    let mut external_references: Vec<ExternalReference> = external_rows.into_iter().collect();
    let mut placeholder = 0usize;
    for row in &mut external_references {
        let missing = row
            .reference_url
            .as_deref()
            .map(|u| u.trim().is_empty())
            .unwrap_or(true);
        if missing {
            row.reference_url = Some(format!("unknown_reference_url_{placeholder}"));
            placeholder += 1;
        }
    }

    NormalizedTables {
        episodes: resolver.episodes().to_vec(),
        episode_references: episode_rows.into_iter().collect(),
        external_references,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::resolver::{EpisodeCandidate, EpisodeResolver};

    const EP10: &str = "https://b9.com.br/shows/naruhodo/naruhodo-10/";
    const EP05: &str = "https://b9.com.br/shows/naruhodo/naruhodo-05/";

    fn resolver() -> EpisodeResolver {
        EpisodeResolver::build(vec![
            EpisodeCandidate {
                title: "Episodio Dez".to_string(),
                url: Some(EP10.to_string()),
            },
            EpisodeCandidate {
                title: "Episodio Cinco".to_string(),
                url: Some(EP05.to_string()),
            },
        ])
    }

    #[test]
    fn episode_reference_resolves_to_canonical_numbers() {
        let r = resolver();
        let classified = vec![classify(EP10, EP05)];
        let mut report = RunReport::default();
        let tables = normalize(&classified, &r, &mut report);

        assert_eq!(tables.episode_references.len(), 1);
        let row = &tables.episode_references[0];
        assert_eq!(row.source_episode_number, 10);
        assert_eq!(row.referenced_episode_number, 5);
        assert_eq!(row.source_episode_title, "Episodio Dez");
        assert_eq!(row.referenced_episode_title, "Episodio Cinco");
        assert!(tables.external_references.is_empty());
    }

    #[test]
    fn unresolved_episode_target_demotes_to_unknown_external() {
        let r = resolver();
        let classified = vec![classify(EP10, "https://b9.com.br/shows/naruhodo/naruhodo-999/")];
        let mut report = RunReport::default();
        let tables = normalize(&classified, &r, &mut report);

        assert!(tables.episode_references.is_empty());
        assert_eq!(report.demoted_to_unknown, 1);
        assert_eq!(tables.external_references.len(), 1);
        assert_eq!(
            tables.external_references[0].reference_type_id,
            ReferenceType::Unknown.id()
        );
    }

    #[test]
    fn unknown_source_episode_rejects_the_row() {
        let r = resolver();
        let classified = vec![classify("Algum programa desconhecido", "https://youtu.be/x")];
        let mut report = RunReport::default();
        let tables = normalize(&classified, &r, &mut report);

        assert_eq!(report.rejected_rows, 1);
        assert!(tables.external_references.is_empty());
    }

    #[test]
    fn identical_rows_collapse_to_one() {
        let r = resolver();
        let classified = vec![classify(EP10, EP05), classify(EP10, EP05)];
        let mut report = RunReport::default();
        let tables = normalize(&classified, &r, &mut report);

        assert_eq!(tables.episode_references.len(), 1);
        assert_eq!(report.duplicate_rows_collapsed, 1);
    }

    #[test]
    fn self_reference_is_kept_but_counted() {
        let r = resolver();
        let classified = vec![classify(EP10, EP10)];
        let mut report = RunReport::default();
        let tables = normalize(&classified, &r, &mut report);

        assert_eq!(tables.episode_references.len(), 1);
        assert_eq!(report.self_references, 1);
    }

    #[test]
    fn urlless_rows_get_deterministic_placeholders() {
        let r = resolver();
        let classified = vec![
            classify(EP10, "Livro citado no episodio"),
            classify(EP05, "Outro livro"),
        ];
        let mut report = RunReport::default();
        let a = normalize(&classified, &r, &mut report);
        let b = normalize(&classified, &r, &mut RunReport::default());

        assert_eq!(a.external_references, b.external_references);
        // Sorted by episode number: EP05's row gets the first placeholder.
        assert_eq!(
            a.external_references[0].reference_url.as_deref(),
            Some("unknown_reference_url_0")
        );
        assert_eq!(
            a.external_references[1].reference_url.as_deref(),
            Some("unknown_reference_url_1")
        );
    }

    #[test]
    fn external_rows_are_sorted_by_episode_then_title() {
        let r = resolver();
        let classified = vec![
            classify(EP10, "Zeta https://zeta.example.org/a"),
            classify(EP10, "Alpha https://alpha.example.org/b"),
            classify(EP05, "Mid https://mid.example.org/c"),
        ];
        let mut report = RunReport::default();
        let tables = normalize(&classified, &r, &mut report);

        let keys: Vec<(i64, &str)> = tables
            .external_references
            .iter()
            .map(|e| (e.episode_number, e.reference_title.as_str()))
            .collect();
        assert_eq!(keys, vec![(5, "Mid"), (10, "Alpha"), (10, "Zeta")]);
    }
}
