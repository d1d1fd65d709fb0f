use listen_reco_api::{
    config::Config,
    db,
    routes::{create_router, AppState},
    services::Recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    listen_reco_api::init_tracing();

    // Open the graph backend once; every handler shares this handle
    let graph = db::open(&config).await?;
    graph.catalog.ensure_schema().await?;

    let recommender = Recommender::new(graph.store.clone(), config.query_timeout())
        .with_projection_cleanup(config.projection_cleanup);
    tracing::info!(
        backend = graph.store.backend(),
        timeout_ms = config.query_timeout_ms,
        cleanup = ?recommender.projection_cleanup(),
        "Recommender ready"
    );

    let app = create_router(AppState::new(recommender, config.community_graph_name.clone()));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
