use thiserror::Error;

#[derive(Error, Debug)]
pub enum RefGraphError {
    #[error("Table error: {0}")]
    Table(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Graph store call timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<csv::Error> for RefGraphError {
    fn from(e: csv::Error) -> Self {
        RefGraphError::Table(e.to_string())
    }
}

impl From<neo4rs::Error> for RefGraphError {
    fn from(e: neo4rs::Error) -> Self {
        RefGraphError::Graph(e.to_string())
    }
}
