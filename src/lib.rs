//! Listening-graph recommendation service.
//!
//! Users, transcriptions and topics live in a property graph; this crate
//! records listens into it and turns the graph into content, collaborative,
//! hybrid and similar-user rankings plus listener communities.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

/// Installs the global tracing subscriber, honouring `RUST_LOG`
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listen_reco_api=debug,tower_http=info".into()),
        )
        .init();
}
