//! Loads a small sample catalog and listening history into the configured graph.

use listen_reco_api::{
    config::Config,
    db,
    models::{CatalogItem, ListenEvent},
    services::Recommender,
};

const USERS: [(&str, &str); 5] = [
    ("u1", "Alice"),
    ("u2", "Bob"),
    ("u3", "Carol"),
    ("u4", "Dave"),
    ("u5", "Eve"),
];

/// (user, transcription, weight)
const LISTENS: [(&str, &str, f64); 12] = [
    ("u1", "t1", 5.0),
    ("u1", "t2", 2.0),
    ("u2", "t1", 3.0),
    ("u2", "t2", 4.0),
    ("u2", "t4", 1.0),
    ("u3", "t3", 5.0),
    ("u3", "t5", 2.0),
    ("u4", "t3", 4.0),
    ("u4", "t5", 3.0),
    ("u4", "t4", 1.0),
    ("u5", "t5", 5.0),
    ("u5", "t1", 1.0),
];

fn catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new("t1", "AI Trends 2024", ["ai", "technology"]),
        CatalogItem::new("t2", "Healthcare Innovations", ["health", "science"]),
        CatalogItem::new("t3", "Financial Markets", ["finance", "economy"]),
        CatalogItem::new("t4", "Sports Weekly", ["sports"]),
        CatalogItem::new("t5", "Music and Culture", ["music", "culture"]),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    listen_reco_api::init_tracing();

    let graph = db::open(&config).await?;
    graph.catalog.ensure_schema().await?;

    let items = catalog();
    for item in &items {
        graph.catalog.upsert_item(item).await?;
    }

    let recommender = Recommender::new(graph.store.clone(), config.query_timeout());
    for (user_id, item_id, weight) in LISTENS {
        let name = USERS
            .iter()
            .find(|(id, _)| *id == user_id)
            .map(|(_, name)| *name)
            .unwrap_or(user_id);
        recommender
            .record(
                ListenEvent::new(user_id, item_id)
                    .with_user_name(name)
                    .with_weight(weight),
            )
            .await?;
    }

    tracing::info!(
        backend = graph.store.backend(),
        items = items.len(),
        users = USERS.len(),
        listens = LISTENS.len(),
        "Seeded graph with sample data"
    );

    let sample = recommender.recommend_hybrid("u1").await?;
    tracing::info!(user_id = "u1", recommendations = ?sample, "Sample hybrid recommendations");

    Ok(())
}
