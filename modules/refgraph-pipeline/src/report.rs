use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

/// Counters for one pipeline run. The pipeline always completes; anomalies
/// land here instead of aborting the run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub rows_read: usize,
    pub rows_dropped_by_cleaning: usize,
    pub rows_classified: usize,
    pub classified_by_type: BTreeMap<String, usize>,
    pub episodes_resolved: usize,
    pub unresolved_episode_candidates: usize,
    pub demoted_to_unknown: usize,
    pub rejected_rows: usize,
    pub self_references: usize,
    pub duplicate_rows_collapsed: usize,
    pub episode_reference_rows: usize,
    pub external_reference_rows: usize,
}

impl RunReport {
    pub fn log_summary(&self) {
        info!(
            rows_read = self.rows_read,
            dropped = self.rows_dropped_by_cleaning,
            classified = self.rows_classified,
            episodes = self.episodes_resolved,
            unresolved = self.unresolved_episode_candidates,
            demoted = self.demoted_to_unknown,
            rejected = self.rejected_rows,
            self_references = self.self_references,
            duplicates_collapsed = self.duplicate_rows_collapsed,
            episode_rows = self.episode_reference_rows,
            external_rows = self.external_reference_rows,
            "Pipeline run complete"
        );
    }
}
