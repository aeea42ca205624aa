//! Batched idempotent graph load. Constraints are a hard precondition;
//! after that each batch is independent — a failed batch is logged and
//! counted while the remaining batches proceed, and already-committed
//! batches stay committed. Every store call carries a bounded timeout.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use refgraph_common::{ExternalReference, RefGraphError, ReferenceType};
use refgraph_pipeline::NormalizedTables;

use crate::store::GraphStore;

/// Per-stage batch outcome counts for one load.
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    pub episode_batches_ok: usize,
    pub episode_batches_failed: usize,
    pub reference_batches_ok: usize,
    pub reference_batches_failed: usize,
    pub episode_edge_batches_ok: usize,
    pub episode_edge_batches_failed: usize,
    pub external_edge_batches_ok: usize,
    pub external_edge_batches_failed: usize,
    /// External rows rejected before writing (undefined type id).
    pub rejected_rows: usize,
}

impl LoadReport {
    pub fn failed_batches(&self) -> usize {
        self.episode_batches_failed
            + self.reference_batches_failed
            + self.episode_edge_batches_failed
            + self.external_edge_batches_failed
    }

    pub fn log_summary(&self) {
        info!(
            episode_batches_ok = self.episode_batches_ok,
            episode_batches_failed = self.episode_batches_failed,
            reference_batches_ok = self.reference_batches_ok,
            reference_batches_failed = self.reference_batches_failed,
            episode_edge_batches_ok = self.episode_edge_batches_ok,
            episode_edge_batches_failed = self.episode_edge_batches_failed,
            external_edge_batches_ok = self.external_edge_batches_ok,
            external_edge_batches_failed = self.external_edge_batches_failed,
            rejected_rows = self.rejected_rows,
            "Graph load complete"
        );
    }
}

pub struct GraphLoader {
    store: Arc<dyn GraphStore>,
    batch_size: usize,
    timeout: Duration,
}

impl GraphLoader {
    pub fn new(store: Arc<dyn GraphStore>, batch_size: usize, timeout: Duration) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
            timeout,
        }
    }

    /// Load the normalized relations. Node and edge identity is natural
    /// (episode number, reference URL), so running this twice on the same
    /// input leaves the graph unchanged.
    pub async fn load(&self, tables: &NormalizedTables) -> Result<LoadReport, RefGraphError> {
        let mut report = LoadReport::default();

        // Constraints must exist before any write; failure here is fatal.
        self.bounded(self.store.ensure_constraints()).await?;

        // Referential integrity gate: undefined type ids never reach the store.
        let external: Vec<&ExternalReference> = tables
            .external_references
            .iter()
            .filter(|r| {
                if ReferenceType::from_id(r.reference_type_id).is_none() {
                    warn!(
                        episode = r.episode_number,
                        type_id = r.reference_type_id,
                        title = r.reference_title.as_str(),
                        "Rejecting external row: undefined reference type id"
                    );
                    report.rejected_rows += 1;
                    false
                } else {
                    true
                }
            })
            .collect();

        for batch in tables.episodes.chunks(self.batch_size) {
            match self.bounded(self.store.upsert_episodes(batch)).await {
                Ok(()) => report.episode_batches_ok += 1,
                Err(e) => {
                    warn!(error = %e, batch_len = batch.len(), "Episode batch failed");
                    report.episode_batches_failed += 1;
                }
            }
        }

        let reference_nodes = distinct_reference_nodes(&external);
        for batch in reference_nodes.chunks(self.batch_size) {
            match self.bounded(self.store.upsert_references(batch)).await {
                Ok(()) => report.reference_batches_ok += 1,
                Err(e) => {
                    warn!(error = %e, batch_len = batch.len(), "Reference batch failed");
                    report.reference_batches_failed += 1;
                }
            }
        }

        for batch in tables.episode_references.chunks(self.batch_size) {
            match self.bounded(self.store.link_episode_references(batch)).await {
                Ok(()) => report.episode_edge_batches_ok += 1,
                Err(e) => {
                    warn!(error = %e, batch_len = batch.len(), "Episode edge batch failed");
                    report.episode_edge_batches_failed += 1;
                }
            }
        }

        let external_rows: Vec<ExternalReference> = external.iter().map(|r| (*r).clone()).collect();
        for batch in external_rows.chunks(self.batch_size) {
            match self.bounded(self.store.link_external_references(batch)).await {
                Ok(()) => report.external_edge_batches_ok += 1,
                Err(e) => {
                    warn!(error = %e, batch_len = batch.len(), "External edge batch failed");
                    report.external_edge_batches_failed += 1;
                }
            }
        }

        report.log_summary();
        Ok(report)
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, RefGraphError>>,
    ) -> Result<T, RefGraphError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RefGraphError::Timeout(self.timeout.as_secs())),
        }
    }
}

/// One node per distinct URL; the first (title, type) observed for a URL
/// wins, matching the relation's stable sort order.
fn distinct_reference_nodes(rows: &[&ExternalReference]) -> Vec<ExternalReference> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::new();
    for row in rows {
        if let Some(url) = row.reference_url.as_deref() {
            if seen.insert(url) {
                nodes.push((*row).clone());
            }
        }
    }
    nodes
}
