//! Import binary: raw references CSV → normalized relations → Neo4j.
//! `--dry-run` loads into the in-memory store instead of connecting.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use refgraph_common::Config;
use refgraph_graph::{GraphLoader, GraphStats, GraphStore, LoadReport, MemoryGraph, Neo4jStore};
use refgraph_pipeline::{tables, RunReport};

#[derive(Serialize)]
struct ImportSummary {
    pipeline: RunReport,
    load: LoadReport,
    graph: GraphStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("refgraph=info".parse()?))
        .init();

    info!("refgraph import starting...");

    let dry_run = std::env::args().any(|a| a == "--dry-run");
    let config = if dry_run {
        Config::pipeline_from_env()
    } else {
        Config::from_env()
    };

    let raw_path = Path::new(&config.data_dir).join(&config.raw_references_file);
    info!(path = %raw_path.display(), "Reading raw reference table");
    let raw = tables::read_raw(&raw_path)?;

    let (normalized, report) = refgraph_pipeline::run(raw);
    report.log_summary();
    tables::write_all(&config.data_dir, &normalized)?;
    info!(data_dir = config.data_dir.as_str(), "Normalized tables written");

    let store: Arc<dyn GraphStore> = if dry_run {
        info!("Dry run: loading into in-memory store");
        Arc::new(MemoryGraph::default())
    } else {
        Arc::new(Neo4jStore::connect(&config).await?)
    };

    let loader = GraphLoader::new(
        store.clone(),
        config.batch_size,
        Duration::from_secs(config.store_timeout_secs),
    );
    let load = loader.load(&normalized).await?;
    let graph = store.stats().await?;

    let summary = ImportSummary {
        pipeline: report,
        load,
        graph,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
