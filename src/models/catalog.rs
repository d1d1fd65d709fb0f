use serde::{Deserialize, Serialize};

/// Item reference as mirrored into the graph by catalog ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl CatalogItem {
    pub fn new<I, S>(id: impl Into<String>, title: impl Into<String>, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }
}
