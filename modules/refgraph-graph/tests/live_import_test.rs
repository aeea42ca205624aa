//! Smoke tests against a live Neo4j instance.
//! Run with: cargo test -p refgraph-graph --test live_import_test -- --ignored

use std::sync::Arc;
use std::time::Duration;

use refgraph_common::{Config, Episode, EpisodeReference, ExternalReference, ReferenceType};
use refgraph_graph::{query, GraphLoader, GraphStore, Neo4jStore};
use refgraph_pipeline::NormalizedTables;

async fn live_store() -> Neo4jStore {
    Neo4jStore::connect(&Config::from_env())
        .await
        .expect("Failed to connect")
}

#[tokio::test]
#[ignore] // requires live Neo4j credentials
async fn connect_and_ping() {
    let store = live_store().await;
    let mut result = store
        .graph()
        .execute(query("RETURN 1 AS ping"))
        .await
        .unwrap();
    let row = result.next().await.unwrap().expect("No result row");
    let ping: i64 = row.get("ping").unwrap();
    assert_eq!(ping, 1);
}

#[tokio::test]
#[ignore] // requires live Neo4j credentials; writes test-prefixed data
async fn import_twice_leaves_counts_unchanged() {
    let store: Arc<dyn GraphStore> = Arc::new(live_store().await);
    let loader = GraphLoader::new(store.clone(), 100, Duration::from_secs(30));

    let tables = NormalizedTables {
        episodes: vec![Episode {
            episode_number: 900_010,
            episode_title: "Live Import Smoke".to_string(),
            episode_url: "https://b9.com.br/shows/naruhodo/naruhodo-900010".to_string(),
        }],
        episode_references: vec![EpisodeReference {
            source_episode_number: 900_010,
            source_episode_title: "Live Import Smoke".to_string(),
            referenced_episode_number: 900_010,
            referenced_episode_title: "Live Import Smoke".to_string(),
        }],
        external_references: vec![ExternalReference {
            episode_number: 900_010,
            episode_title: "Live Import Smoke".to_string(),
            reference_title: "Smoke Paper".to_string(),
            reference_url: Some("https://doi.org/10.1000/live-smoke".to_string()),
            reference_type_id: ReferenceType::ScientificPaper.id(),
        }],
    };

    loader.load(&tables).await.expect("first load");
    let first = store.stats().await.expect("stats");
    loader.load(&tables).await.expect("second load");
    let second = store.stats().await.expect("stats");

    assert_eq!(first, second);
}
