//! The reference-normalization pipeline: clean → classify → resolve →
//! normalize, as pure in-memory transformations. The resolver is built
//! fully before normalization runs and is passed down explicitly — there
//! is no global state between stages.

pub mod classify;
pub mod clean;
pub mod normalize;
pub mod report;
pub mod resolver;
pub mod tables;

use std::collections::HashSet;

use refgraph_common::{ClassifiedReference, RawReference, ReferenceType};

pub use normalize::NormalizedTables;
pub use report::RunReport;
pub use resolver::{EpisodeCandidate, EpisodeResolver};

/// Run the full pipeline over the raw table. Always completes; anomalies
/// are counted in the report rather than surfaced as errors.
pub fn run(rows: Vec<RawReference>) -> (NormalizedTables, RunReport) {
    let mut report = RunReport::default();
    report.rows_read = rows.len();

    let (cleaned, dropped) = clean::clean_rows(rows);
    report.rows_dropped_by_cleaning = dropped;

    let classified: Vec<ClassifiedReference> = cleaned
        .iter()
        .map(|r| classify::classify(&r.episode, &r.reference))
        .collect();
    report.rows_classified = classified.len();
    for c in &classified {
        *report
            .classified_by_type
            .entry(c.kind.name().to_string())
            .or_default() += 1;
    }

    // Candidate pass: every distinct source-episode string, then every
    // reference classified as an episode.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<EpisodeCandidate> = Vec::new();
    for r in &cleaned {
        if seen.insert(r.episode.as_str()) {
            let (title, url) = classify::split_title_url(&r.episode);
            candidates.push(EpisodeCandidate { title, url });
        }
    }
    for c in &classified {
        if c.kind == ReferenceType::Episode {
            candidates.push(EpisodeCandidate {
                title: c.title.clone(),
                url: c.url.clone(),
            });
        }
    }

    let resolver = EpisodeResolver::build(candidates);
    report.episodes_resolved = resolver.episodes().len();
    report.unresolved_episode_candidates = resolver.unresolved_candidates();

    let tables = normalize::normalize(&classified, &resolver, &mut report);
    report.episode_reference_rows = tables.episode_references.len();
    report.external_reference_rows = tables.external_references.len();

    (tables, report)
}
