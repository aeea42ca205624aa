//! Neo4j-backed GraphStore. Every write is a MERGE on natural identity
//! (episode number, reference URL) so re-imports never duplicate nodes or
//! edges.

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph};
use tracing::{info, warn};

use refgraph_common::{Config, Episode, EpisodeReference, ExternalReference, RefGraphError};

use crate::store::{GraphStats, GraphStore};

const MAX_CONNECTIONS: usize = 10;

pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Connect with the configured credentials. The Bolt fetch size follows
    /// the import batch size so result streaming matches the write granularity.
    pub async fn connect(config: &Config) -> Result<Self, RefGraphError> {
        let graph = Graph::connect(bolt_config(config)?).await?;
        info!(uri = config.neo4j_uri.as_str(), "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// The underlying neo4rs Graph, for ad-hoc queries.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    async fn count(&self, cypher: &str) -> Result<u64, RefGraphError> {
        let mut stream = self.graph.execute(query(cypher)).await?;
        if let Some(row) = stream.next().await? {
            Ok(row.get::<i64>("c").unwrap_or(0) as u64)
        } else {
            Ok(0)
        }
    }
}

fn bolt_config(config: &Config) -> Result<neo4rs::Config, RefGraphError> {
    let bolt = ConfigBuilder::default()
        .uri(config.neo4j_uri.as_str())
        .user(config.neo4j_user.as_str())
        .password(config.neo4j_password.as_str())
        .fetch_size(config.batch_size)
        .max_connections(MAX_CONNECTIONS)
        .build()?;
    Ok(bolt)
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn ensure_constraints(&self) -> Result<(), RefGraphError> {
        let constraints = [
            "CREATE CONSTRAINT episode_number IF NOT EXISTS FOR (e:Episode) REQUIRE e.episode_number IS UNIQUE",
            "CREATE CONSTRAINT reference_url IF NOT EXISTS FOR (r:Reference) REQUIRE r.url IS UNIQUE",
        ];
        for c in &constraints {
            run_ignoring_exists(&self.graph, c).await?;
        }
        info!("Uniqueness constraints in place");
        Ok(())
    }

    async fn upsert_episodes(&self, episodes: &[Episode]) -> Result<(), RefGraphError> {
        for e in episodes {
            let q = query(
                "MERGE (e:Episode {episode_number: $episode_number})
                 SET e.title = $title,
                     e.url = $url",
            )
            .param("episode_number", e.episode_number)
            .param("title", e.episode_title.as_str())
            .param("url", e.episode_url.as_str());
            self.graph.run(q).await?;
        }
        Ok(())
    }

    async fn upsert_references(&self, references: &[ExternalReference]) -> Result<(), RefGraphError> {
        for r in references {
            let url = r.reference_url.as_deref().ok_or_else(|| {
                RefGraphError::Validation(format!(
                    "reference '{}' has no URL key",
                    r.reference_title
                ))
            })?;
            let q = query(
                "MERGE (r:Reference {url: $url})
                 SET r.title = $title,
                     r.type_id = $type_id",
            )
            .param("url", url)
            .param("title", r.reference_title.as_str())
            .param("type_id", r.reference_type_id);
            self.graph.run(q).await?;
        }
        Ok(())
    }

    async fn link_episode_references(&self, rows: &[EpisodeReference]) -> Result<(), RefGraphError> {
        for row in rows {
            let q = query(
                "MATCH (source:Episode {episode_number: $source})
                 MATCH (target:Episode {episode_number: $target})
                 MERGE (source)-[:REFERENCES]->(target)",
            )
            .param("source", row.source_episode_number)
            .param("target", row.referenced_episode_number);
            self.graph.run(q).await?;
        }
        Ok(())
    }

    async fn link_external_references(&self, rows: &[ExternalReference]) -> Result<(), RefGraphError> {
        for row in rows {
            let Some(url) = row.reference_url.as_deref() else {
                continue;
            };
            let q = query(
                "MATCH (e:Episode {episode_number: $episode_number})
                 MATCH (r:Reference {url: $url})
                 MERGE (e)-[:REFERENCES]->(r)",
            )
            .param("episode_number", row.episode_number)
            .param("url", url);
            self.graph.run(q).await?;
        }
        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, RefGraphError> {
        Ok(GraphStats {
            episode_nodes: self.count("MATCH (e:Episode) RETURN count(e) AS c").await?,
            reference_nodes: self.count("MATCH (r:Reference) RETURN count(r) AS c").await?,
            episode_edges: self
                .count("MATCH (:Episode)-[r:REFERENCES]->(:Episode) RETURN count(r) AS c")
                .await?,
            external_edges: self
                .count("MATCH (:Episode)-[r:REFERENCES]->(:Reference) RETURN count(r) AS c")
                .await?,
        })
    }
}

async fn run_ignoring_exists(g: &Graph, cypher: &str) -> Result<(), neo4rs::Error> {
    match g.run(query(cypher)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("already exists") || msg.contains("equivalent") {
                warn!("Already exists (skipped): {}", cypher.chars().take(80).collect::<String>());
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            neo4j_uri: "neo4j://localhost:7687".to_string(),
            neo4j_user: "neo4j".to_string(),
            neo4j_password: "secret".to_string(),
            data_dir: "data".to_string(),
            raw_references_file: "combined_references_long_format.csv".to_string(),
            batch_size: 250,
            store_timeout_secs: 30,
        }
    }

    #[test]
    fn bolt_config_builds_from_pipeline_config() {
        assert!(bolt_config(&sample_config()).is_ok());
    }
}
