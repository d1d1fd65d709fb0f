use neo4rs::{query, ConfigBuilder, Graph, Query, Row};

use crate::{
    db::store::{
        Catalog, CommunityRow, GraphStore, ListenParams, ListenRow, ProjectionRow, ScoredItemRow,
        UserOverlapRow,
    },
    error::{AppError, AppResult},
    models::CatalogItem,
};

const RECORD_LISTEN: &str = "
MERGE (u:User {id: $user_id})
ON CREATE SET u.name = $user_name
WITH u
MATCH (t:Transcription {id: $item_id})
MERGE (u)-[rel:LISTENED_TO]->(t)
ON CREATE SET rel.weight = CASE WHEN $has_weight THEN $weight ELSE 1.0 END, rel.ts = timestamp()
ON MATCH SET rel.weight = CASE WHEN $has_weight THEN $weight ELSE rel.weight END, rel.ts = timestamp()
RETURN u.id AS user_id, t.id AS item_id
";

const TOPIC_OVERLAP: &str = "
MATCH (u:User {id: $user_id})-[:LISTENED_TO]->(:Transcription)-[:HAS_TOPIC]->(tp:Topic)<-[:HAS_TOPIC]-(cand:Transcription)
WHERE NOT (u)-[:LISTENED_TO]->(cand)
RETURN cand.id AS id, coalesce(cand.title, '') AS title, count(tp) AS score
";

const USER_OVERLAP: &str = "
MATCH (u:User {id: $user_id})-[:LISTENED_TO]->(t:Transcription)<-[:LISTENED_TO]-(other:User)
WHERE other <> u
RETURN other.id AS id, count(DISTINCT t) AS shared
";

const NEIGHBOR_ITEMS: &str = "
MATCH (u:User {id: $user_id})
MATCH (n:User)-[:LISTENED_TO]->(cand:Transcription)
WHERE n.id IN $neighbor_ids AND NOT (u)-[:LISTENED_TO]->(cand)
RETURN cand.id AS id, coalesce(cand.title, '') AS title, count(*) AS score
";

const PROJECTION_EXISTS: &str = "
CALL gds.graph.exists($graph_name) YIELD exists
RETURN exists
";

const DROP_PROJECTION: &str = "
CALL gds.graph.drop($graph_name) YIELD graphName
RETURN graphName
";

// Item nodes are projected alongside users so LISTENED_TO keeps both endpoints.
const PROJECT_LISTEN_GRAPH: &str = "
CALL gds.graph.project(
    $graph_name,
    ['User', 'Transcription'],
    {LISTENED_TO: {orientation: 'UNDIRECTED'}}
)
YIELD graphName, nodeCount, relationshipCount
RETURN graphName, nodeCount, relationshipCount
";

const STREAM_COMMUNITIES: &str = "
CALL gds.louvain.stream($graph_name)
YIELD nodeId, communityId
WITH gds.util.asNode(nodeId) AS node, communityId
WHERE node:User
RETURN node.id AS user_id, communityId AS community_id
";

const SCHEMA_CONSTRAINTS: [&str; 3] = [
    "CREATE CONSTRAINT user_id IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
    "CREATE CONSTRAINT transcription_id IF NOT EXISTS FOR (t:Transcription) REQUIRE t.id IS UNIQUE",
    "CREATE CONSTRAINT topic_name IF NOT EXISTS FOR (tp:Topic) REQUIRE tp.name IS UNIQUE",
];

const UPSERT_ITEM: &str = "
MERGE (t:Transcription {id: $id})
SET t.title = $title
WITH t
UNWIND $topics AS topic
MERGE (tp:Topic {name: topic})
MERGE (t)-[:HAS_TOPIC]->(tp)
";

/// Opens the bolt connection pool.
///
/// The returned `Graph` is cheap to clone and shares one pool; build it once
/// at startup and hand it to [`Neo4jGraphStore::new`].
pub async fn create_pool(
    uri: &str,
    user: &str,
    password: &str,
    max_connections: usize,
) -> anyhow::Result<Graph> {
    let config = ConfigBuilder::default()
        .uri(uri)
        .user(user)
        .password(password)
        .fetch_size(500)
        .max_connections(max_connections)
        .build()?;

    let graph = Graph::connect(config).await?;
    Ok(graph)
}

/// Graph store backed by Neo4j with the Graph Data Science plugin
#[derive(Clone)]
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    async fn fetch_rows(&self, q: Query) -> AppResult<Vec<Row>> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}

fn get_count(row: &Row, key: &str) -> AppResult<u64> {
    let value: i64 = row.get(key)?;
    u64::try_from(value)
        .map_err(|_| AppError::Dependency(format!("Negative count in column `{}`: {}", key, value)))
}

fn decode_scored_item(row: &Row) -> AppResult<ScoredItemRow> {
    Ok(ScoredItemRow {
        id: row.get("id")?,
        title: row.get("title")?,
        score: get_count(row, "score")?,
    })
}

fn decode_user_overlap(row: &Row) -> AppResult<UserOverlapRow> {
    Ok(UserOverlapRow {
        id: row.get("id")?,
        shared: get_count(row, "shared")?,
    })
}

fn decode_community(row: &Row) -> AppResult<CommunityRow> {
    Ok(CommunityRow {
        user_id: row.get("user_id")?,
        community_id: row.get("community_id")?,
    })
}

#[async_trait::async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn record_listen(&self, params: &ListenParams) -> AppResult<Option<ListenRow>> {
        let q = query(RECORD_LISTEN)
            .param("user_id", params.user_id.as_str())
            .param("user_name", params.user_name.as_str())
            .param("item_id", params.item_id.as_str())
            .param("has_weight", params.weight.is_some())
            .param("weight", params.weight.unwrap_or(1.0));

        let rows = self.fetch_rows(q).await?;
        match rows.first() {
            Some(row) => Ok(Some(ListenRow {
                user_id: row.get("user_id")?,
                item_id: row.get("item_id")?,
            })),
            None => Ok(None),
        }
    }

    async fn topic_overlap(&self, user_id: &str) -> AppResult<Vec<ScoredItemRow>> {
        let q = query(TOPIC_OVERLAP).param("user_id", user_id);
        self.fetch_rows(q).await?.iter().map(decode_scored_item).collect()
    }

    async fn user_overlap(&self, user_id: &str) -> AppResult<Vec<UserOverlapRow>> {
        let q = query(USER_OVERLAP).param("user_id", user_id);
        self.fetch_rows(q).await?.iter().map(decode_user_overlap).collect()
    }

    async fn neighbor_items(
        &self,
        user_id: &str,
        neighbor_ids: &[String],
    ) -> AppResult<Vec<ScoredItemRow>> {
        let q = query(NEIGHBOR_ITEMS)
            .param("user_id", user_id)
            .param("neighbor_ids", neighbor_ids.to_vec());
        self.fetch_rows(q).await?.iter().map(decode_scored_item).collect()
    }

    async fn projection_exists(&self, name: &str) -> AppResult<bool> {
        let q = query(PROJECTION_EXISTS).param("graph_name", name);
        let rows = self.fetch_rows(q).await?;
        match rows.first() {
            Some(row) => Ok(row.get("exists")?),
            None => Ok(false),
        }
    }

    async fn drop_projection(&self, name: &str) -> AppResult<()> {
        let q = query(DROP_PROJECTION).param("graph_name", name);
        self.fetch_rows(q).await?;
        Ok(())
    }

    async fn project_listen_graph(&self, name: &str) -> AppResult<ProjectionRow> {
        let q = query(PROJECT_LISTEN_GRAPH).param("graph_name", name);
        let rows = self.fetch_rows(q).await?;
        let row = rows.first().ok_or_else(|| {
            AppError::Dependency(format!("Projection of `{}` returned no summary", name))
        })?;
        Ok(ProjectionRow {
            name: row.get("graphName")?,
            node_count: get_count(row, "nodeCount")?,
            relationship_count: get_count(row, "relationshipCount")?,
        })
    }

    async fn stream_communities(&self, name: &str) -> AppResult<Vec<CommunityRow>> {
        let q = query(STREAM_COMMUNITIES).param("graph_name", name);
        self.fetch_rows(q).await?.iter().map(decode_community).collect()
    }

    fn backend(&self) -> &'static str {
        "neo4j"
    }
}

#[async_trait::async_trait]
impl Catalog for Neo4jGraphStore {
    async fn ensure_schema(&self) -> AppResult<()> {
        for statement in SCHEMA_CONSTRAINTS {
            self.graph.run(query(statement)).await?;
        }
        tracing::info!("Graph uniqueness constraints ensured");
        Ok(())
    }

    async fn upsert_item(&self, item: &CatalogItem) -> AppResult<()> {
        let q = query(UPSERT_ITEM)
            .param("id", item.id.as_str())
            .param("title", item.title.as_str())
            .param("topics", item.topics.clone());
        self.graph.run(q).await?;
        Ok(())
    }
}
