pub mod loader;
pub mod neo4j;
pub mod store;

pub use neo4rs::query;
pub use loader::{GraphLoader, LoadReport};
pub use neo4j::Neo4jStore;
pub use store::{GraphStats, GraphStore, MemoryGraph};
