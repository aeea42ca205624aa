//! Trait abstraction over the graph store.
//!
//! The loader only needs constraint creation, node upserts, edge upserts
//! and counts — nothing else. Putting those behind `GraphStore` lets the
//! normalization and load logic run against `MemoryGraph` in tests and
//! dry runs: no network, no database, no Docker.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use refgraph_common::{Episode, EpisodeReference, ExternalReference, RefGraphError};

/// Node and edge counts after a load, used for the import summary and the
/// idempotence checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub episode_nodes: u64,
    pub reference_nodes: u64,
    pub episode_edges: u64,
    pub external_edges: u64,
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create uniqueness constraints on Episode.episode_number and
    /// Reference.url. Must run before any write; idempotent.
    async fn ensure_constraints(&self) -> Result<(), RefGraphError>;

    /// Upsert one Episode node per row, keyed by episode number.
    async fn upsert_episodes(&self, episodes: &[Episode]) -> Result<(), RefGraphError>;

    /// Upsert one Reference node per row, keyed by URL.
    async fn upsert_references(&self, references: &[ExternalReference]) -> Result<(), RefGraphError>;

    /// Merge one Episode→Episode REFERENCES edge per row. Rows whose
    /// endpoints are missing match nothing and are silently skipped,
    /// mirroring Cypher MATCH semantics.
    async fn link_episode_references(&self, rows: &[EpisodeReference]) -> Result<(), RefGraphError>;

    /// Merge one Episode→Reference REFERENCES edge per row.
    async fn link_external_references(&self, rows: &[ExternalReference]) -> Result<(), RefGraphError>;

    async fn stats(&self) -> Result<GraphStats, RefGraphError>;
}

#[derive(Default)]
struct MemoryInner {
    constraints_ready: bool,
    /// episode_number → (title, url)
    episodes: BTreeMap<i64, (String, String)>,
    /// url → (title, type_id)
    references: BTreeMap<String, (String, i64)>,
    episode_edges: BTreeSet<(i64, i64)>,
    /// (episode_number, reference_url)
    external_edges: BTreeSet<(i64, String)>,
}

/// In-memory GraphStore keyed on the same natural identities as the Neo4j
/// implementation. Backs unit tests and `--dry-run` imports.
#[derive(Default)]
pub struct MemoryGraph {
    inner: Mutex<MemoryInner>,
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn ensure_constraints(&self) -> Result<(), RefGraphError> {
        self.inner.lock().unwrap().constraints_ready = true;
        Ok(())
    }

    async fn upsert_episodes(&self, episodes: &[Episode]) -> Result<(), RefGraphError> {
        let mut inner = self.inner.lock().unwrap();
        for e in episodes {
            inner.episodes.insert(
                e.episode_number,
                (e.episode_title.clone(), e.episode_url.clone()),
            );
        }
        Ok(())
    }

    async fn upsert_references(&self, references: &[ExternalReference]) -> Result<(), RefGraphError> {
        let mut inner = self.inner.lock().unwrap();
        for r in references {
            let url = r.reference_url.clone().ok_or_else(|| {
                RefGraphError::Validation(format!(
                    "reference '{}' has no URL key",
                    r.reference_title
                ))
            })?;
            inner
                .references
                .insert(url, (r.reference_title.clone(), r.reference_type_id));
        }
        Ok(())
    }

    async fn link_episode_references(&self, rows: &[EpisodeReference]) -> Result<(), RefGraphError> {
        let mut inner = self.inner.lock().unwrap();
        for row in rows {
            if inner.episodes.contains_key(&row.source_episode_number)
                && inner.episodes.contains_key(&row.referenced_episode_number)
            {
                inner
                    .episode_edges
                    .insert((row.source_episode_number, row.referenced_episode_number));
            }
        }
        Ok(())
    }

    async fn link_external_references(&self, rows: &[ExternalReference]) -> Result<(), RefGraphError> {
        let mut inner = self.inner.lock().unwrap();
        for row in rows {
            let Some(url) = row.reference_url.as_deref() else {
                continue;
            };
            if inner.episodes.contains_key(&row.episode_number)
                && inner.references.contains_key(url)
            {
                inner
                    .external_edges
                    .insert((row.episode_number, url.to_string()));
            }
        }
        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, RefGraphError> {
        let inner = self.inner.lock().unwrap();
        Ok(GraphStats {
            episode_nodes: inner.episodes.len() as u64,
            reference_nodes: inner.references.len() as u64,
            episode_edges: inner.episode_edges.len() as u64,
            external_edges: inner.external_edges.len() as u64,
        })
    }
}

impl MemoryGraph {
    /// Whether `ensure_constraints` has run. Lets tests assert the loader's
    /// write preconditions.
    pub fn constraints_ready(&self) -> bool {
        self.inner.lock().unwrap().constraints_ready
    }
}
