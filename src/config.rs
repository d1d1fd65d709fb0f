use std::time::Duration;

use serde::Deserialize;

use crate::services::communities::ProjectionCleanup;

/// Which graph store implementation to open at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphBackend {
    #[default]
    Neo4j,
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Bolt URI of the Neo4j server
    #[serde(default = "default_neo4j_uri")]
    pub neo4j_uri: String,

    #[serde(default = "default_neo4j_user")]
    pub neo4j_user: String,

    #[serde(default = "default_neo4j_password")]
    pub neo4j_password: String,

    /// Upper bound of the bolt connection pool
    #[serde(default = "default_neo4j_max_connections")]
    pub neo4j_max_connections: usize,

    #[serde(default)]
    pub graph_backend: GraphBackend,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-query deadline for graph store calls
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Projection name used when a request does not supply `graph_name`
    #[serde(default = "default_community_graph_name")]
    pub community_graph_name: String,

    #[serde(default)]
    pub projection_cleanup: ProjectionCleanup,
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "neo4jpass".to_string()
}

fn default_neo4j_max_connections() -> usize {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_query_timeout_ms() -> u64 {
    5_000
}

fn default_community_graph_name() -> String {
    "abdb_communities".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}
