use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Tabular I/O
    pub data_dir: String,
    pub raw_references_file: String,

    // Graph load
    pub batch_size: usize,
    pub store_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            neo4j_uri: required_env("NEO4J_URI"),
            neo4j_user: required_env("NEO4J_USER"),
            neo4j_password: required_env("NEO4J_PASSWORD"),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            raw_references_file: env::var("RAW_REFERENCES_FILE")
                .unwrap_or_else(|_| "combined_references_long_format.csv".to_string()),
            batch_size: env::var("IMPORT_BATCH_SIZE")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .expect("IMPORT_BATCH_SIZE must be a number"),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("STORE_TIMEOUT_SECS must be a number"),
        }
    }

    /// Load a minimal config for normalization-only runs (no Neo4j needed).
    pub fn pipeline_from_env() -> Self {
        Self {
            neo4j_uri: String::new(),
            neo4j_user: String::new(),
            neo4j_password: String::new(),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            raw_references_file: env::var("RAW_REFERENCES_FILE")
                .unwrap_or_else(|_| "combined_references_long_format.csv".to_string()),
            batch_size: env::var("IMPORT_BATCH_SIZE")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .expect("IMPORT_BATCH_SIZE must be a number"),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("STORE_TIMEOUT_SECS must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
