use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use graphrs::{algorithms::community::louvain::louvain_communities, Edge, Graph, GraphSpecs, Node};
use tokio::sync::RwLock;

use crate::{
    db::store::{
        Catalog, CommunityRow, GraphStore, ListenParams, ListenRow, ProjectionRow, ScoredItemRow,
        UserOverlapRow,
    },
    error::{AppError, AppResult},
    models::CatalogItem,
};

#[derive(Debug, Clone)]
struct ItemNode {
    title: String,
    topics: BTreeSet<String>,
}

/// LISTENED_TO edge properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenEdge {
    pub weight: f64,
    /// Milliseconds since the Unix epoch of the latest upsert
    pub ts: i64,
}

/// Frozen copy of the listen graph taken at projection time
#[derive(Debug, Clone)]
struct ListenProjection {
    users: Vec<String>,
    node_count: usize,
    edges: Vec<(usize, usize)>,
}

/// Fixed so that re-running on an unchanged projection gives the same partition
const LOUVAIN_SEED: u64 = 42;

/// Unweighted Louvain over `node_count` nodes. Returns one label per node,
/// numbered by the lowest node index in each community.
fn louvain_labels(node_count: usize, edges: &[(usize, usize)]) -> AppResult<Vec<usize>> {
    if edges.is_empty() {
        return Ok((0..node_count).collect());
    }

    let nodes = (0..node_count).map(Node::from_name).collect();
    let edges = edges
        .iter()
        .filter(|(a, b)| a != b)
        .map(|&(a, b)| Edge::new(a, b))
        .collect();
    let graph = Graph::<usize, ()>::new_from_nodes_and_edges(
        nodes,
        edges,
        GraphSpecs::undirected_create_missing(),
    )
    .map_err(|e| AppError::Dependency(format!("Failed to build projection graph: {}", e.message)))?;

    let mut communities: Vec<Vec<usize>> =
        louvain_communities(&graph, false, None, None, Some(LOUVAIN_SEED))
            .map_err(|e| AppError::Dependency(format!("Louvain failed: {}", e.message)))?
            .into_iter()
            .map(|members| {
                let mut members: Vec<usize> = members.into_iter().collect();
                members.sort_unstable();
                members
            })
            .filter(|members| !members.is_empty())
            .collect();
    communities.sort_by_key(|members| members[0]);

    let mut labels: Vec<Option<usize>> = vec![None; node_count];
    for (label, members) in communities.iter().enumerate() {
        for &node in members {
            if node < node_count {
                labels[node] = Some(label);
            }
        }
    }

    // Nodes the algorithm left out stand alone
    let mut next = communities.len();
    Ok(labels
        .into_iter()
        .map(|label| {
            label.unwrap_or_else(|| {
                next += 1;
                next - 1
            })
        })
        .collect())
}

#[derive(Debug, Default)]
struct GraphState {
    /// user id -> display name
    users: BTreeMap<String, String>,
    items: BTreeMap<String, ItemNode>,
    /// (user id, item id) -> edge; the key enforces one edge per pair
    listens: BTreeMap<(String, String), ListenEdge>,
    projections: BTreeMap<String, ListenProjection>,
}

impl GraphState {
    fn listened_by(&self, user_id: &str) -> BTreeSet<&str> {
        self.listens
            .keys()
            .filter(|(user, _)| user == user_id)
            .map(|(_, item)| item.as_str())
            .collect()
    }

    fn item_title(&self, item_id: &str) -> String {
        self.items
            .get(item_id)
            .map(|item| item.title.clone())
            .unwrap_or_default()
    }

    fn scored(&self, counts: BTreeMap<&str, u64>) -> Vec<ScoredItemRow> {
        counts
            .into_iter()
            .map(|(id, score)| ScoredItemRow {
                id: id.to_string(),
                title: self.item_title(id),
                score,
            })
            .collect()
    }
}

/// Process-local graph store.
///
/// Mirrors the Neo4j backend's semantics, including projection lifecycle
/// errors, with deterministic iteration order. Used for development and
/// tests; all data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    state: RwLock<GraphState>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current LISTENED_TO edge between a user and an item, if any
    pub async fn listen_edge(&self, user_id: &str, item_id: &str) -> Option<ListenEdge> {
        let state = self.state.read().await;
        state
            .listens
            .get(&(user_id.to_string(), item_id.to_string()))
            .copied()
    }

    pub async fn user_name(&self, user_id: &str) -> Option<String> {
        self.state.read().await.users.get(user_id).cloned()
    }

    pub async fn listen_count(&self) -> usize {
        self.state.read().await.listens.len()
    }

    pub async fn projection_names(&self) -> Vec<String> {
        self.state.read().await.projections.keys().cloned().collect()
    }
}

#[async_trait::async_trait]
impl GraphStore for MemoryGraphStore {
    async fn record_listen(&self, params: &ListenParams) -> AppResult<Option<ListenRow>> {
        let mut state = self.state.write().await;

        state
            .users
            .entry(params.user_id.clone())
            .or_insert_with(|| params.user_name.clone());

        if !state.items.contains_key(&params.item_id) {
            return Ok(None);
        }

        let ts = Utc::now().timestamp_millis();
        state
            .listens
            .entry((params.user_id.clone(), params.item_id.clone()))
            .and_modify(|edge| {
                if let Some(weight) = params.weight {
                    edge.weight = weight;
                }
                edge.ts = ts;
            })
            .or_insert(ListenEdge {
                weight: params.weight.unwrap_or(1.0),
                ts,
            });

        Ok(Some(ListenRow {
            user_id: params.user_id.clone(),
            item_id: params.item_id.clone(),
        }))
    }

    async fn topic_overlap(&self, user_id: &str) -> AppResult<Vec<ScoredItemRow>> {
        let state = self.state.read().await;
        let listened = state.listened_by(user_id);

        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for listened_id in &listened {
            let Some(listened_item) = state.items.get(*listened_id) else {
                continue;
            };
            for (candidate_id, candidate) in &state.items {
                if listened.contains(candidate_id.as_str()) {
                    continue;
                }
                let shared = listened_item.topics.intersection(&candidate.topics).count() as u64;
                if shared > 0 {
                    *counts.entry(candidate_id.as_str()).or_insert(0) += shared;
                }
            }
        }

        Ok(state.scored(counts))
    }

    async fn user_overlap(&self, user_id: &str) -> AppResult<Vec<UserOverlapRow>> {
        let state = self.state.read().await;
        let listened = state.listened_by(user_id);
        if listened.is_empty() {
            return Ok(Vec::new());
        }

        let mut shared: BTreeMap<&str, u64> = BTreeMap::new();
        for (other, item) in state.listens.keys() {
            if other != user_id && listened.contains(item.as_str()) {
                *shared.entry(other.as_str()).or_insert(0) += 1;
            }
        }

        Ok(shared
            .into_iter()
            .map(|(id, shared)| UserOverlapRow {
                id: id.to_string(),
                shared,
            })
            .collect())
    }

    async fn neighbor_items(
        &self,
        user_id: &str,
        neighbor_ids: &[String],
    ) -> AppResult<Vec<ScoredItemRow>> {
        let state = self.state.read().await;
        if !state.users.contains_key(user_id) {
            return Ok(Vec::new());
        }
        let listened = state.listened_by(user_id);

        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for (neighbor, item) in state.listens.keys() {
            if neighbor_ids.contains(neighbor) && !listened.contains(item.as_str()) {
                *counts.entry(item.as_str()).or_insert(0) += 1;
            }
        }

        Ok(state.scored(counts))
    }

    async fn projection_exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.state.read().await.projections.contains_key(name))
    }

    async fn drop_projection(&self, name: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        match state.projections.remove(name) {
            Some(_) => Ok(()),
            None => Err(AppError::Dependency(format!(
                "Graph with name `{}` does not exist",
                name
            ))),
        }
    }

    async fn project_listen_graph(&self, name: &str) -> AppResult<ProjectionRow> {
        let mut state = self.state.write().await;
        if state.projections.contains_key(name) {
            return Err(AppError::Dependency(format!(
                "A graph with name `{}` already exists",
                name
            )));
        }

        let users: Vec<String> = state.users.keys().cloned().collect();
        let user_index: BTreeMap<&str, usize> = users
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let item_index: BTreeMap<&str, usize> = state
            .items
            .keys()
            .enumerate()
            .map(|(i, id)| (id.as_str(), users.len() + i))
            .collect();

        // Unweighted, matching the Neo4j projection which carries no properties.
        let edges: Vec<(usize, usize)> = state
            .listens
            .keys()
            .filter_map(|(user, item)| {
                Some((*user_index.get(user.as_str())?, *item_index.get(item.as_str())?))
            })
            .collect();

        let projection = ListenProjection {
            node_count: users.len() + item_index.len(),
            users,
            edges,
        };
        let row = ProjectionRow {
            name: name.to_string(),
            node_count: projection.node_count as u64,
            relationship_count: projection.edges.len() as u64,
        };
        state.projections.insert(name.to_string(), projection);
        Ok(row)
    }

    async fn stream_communities(&self, name: &str) -> AppResult<Vec<CommunityRow>> {
        let state = self.state.read().await;
        let projection = state.projections.get(name).ok_or_else(|| {
            AppError::Dependency(format!("Graph with name `{}` does not exist", name))
        })?;

        let labels = louvain_labels(projection.node_count, &projection.edges)?;
        Ok(projection
            .users
            .iter()
            .zip(labels)
            .map(|(user_id, label)| CommunityRow {
                user_id: user_id.clone(),
                community_id: label as i64,
            })
            .collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[async_trait::async_trait]
impl Catalog for MemoryGraphStore {
    async fn ensure_schema(&self) -> AppResult<()> {
        Ok(())
    }

    async fn upsert_item(&self, item: &CatalogItem) -> AppResult<()> {
        let mut state = self.state.write().await;
        let node = state.items.entry(item.id.clone()).or_insert_with(|| ItemNode {
            title: item.title.clone(),
            topics: BTreeSet::new(),
        });
        node.title = item.title.clone();
        node.topics.extend(item.topics.iter().cloned());
        Ok(())
    }
}
