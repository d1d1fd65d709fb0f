pub mod memory;
pub mod neo4j;
pub mod store;

use std::sync::Arc;

use crate::config::{Config, GraphBackend};

pub use memory::MemoryGraphStore;
pub use neo4j::{create_pool, Neo4jGraphStore};
pub use store::{Catalog, GraphStore};

/// Both faces of one open graph backend.
///
/// Constructed once at process start; dropping the last clone closes the
/// underlying connection pool.
#[derive(Clone)]
pub struct GraphHandle {
    pub store: Arc<dyn GraphStore>,
    pub catalog: Arc<dyn Catalog>,
}

impl GraphHandle {
    pub fn from_backend<T>(backend: T) -> Self
    where
        T: GraphStore + Catalog + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            store: backend.clone(),
            catalog: backend,
        }
    }
}

/// Opens the graph backend selected in configuration
pub async fn open(config: &Config) -> anyhow::Result<GraphHandle> {
    match config.graph_backend {
        GraphBackend::Neo4j => {
            let graph = create_pool(
                &config.neo4j_uri,
                &config.neo4j_user,
                &config.neo4j_password,
                config.neo4j_max_connections,
            )
            .await?;
            tracing::info!(uri = %config.neo4j_uri, "Connected to Neo4j");
            Ok(GraphHandle::from_backend(Neo4jGraphStore::new(graph)))
        }
        GraphBackend::Memory => {
            tracing::warn!("Using in-memory graph store; data will not survive a restart");
            Ok(GraphHandle::from_backend(MemoryGraphStore::new()))
        }
    }
}
