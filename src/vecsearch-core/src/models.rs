use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// SearchResult is the decoded body of a `_search` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Milliseconds the engine spent on the query
    pub took: u64,
    pub timed_out: bool,
    pub hits: Hits,
}

impl SearchResult {
    /// Hit IDs in the order the engine returned them
    pub fn ids(&self) -> Vec<&str> {
        self.hits.hits.iter().map(|hit| hit.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    pub total: TotalHits,
    // null when nothing matched
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Total hit count, possibly a lower bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    pub relation: TotalHitsRelation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalHitsRelation {
    /// `value` is exact
    Eq,
    /// `value` is a lower bound
    Gte,
}

/// Hit is one matching document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: serde_json::Map<String, serde_json::Value>,
}

impl Hit {
    /// Decode the stored document body into a typed document
    pub fn source_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(serde_json::Value::Object(self.source.clone()))
    }
}

/// BulkResponse is the decoded body of a `_bulk` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    /// True if at least one item failed
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<BulkItem>,
}

/// BulkItem wraps the outcome of one `index` action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItem {
    pub index: BulkItemOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemOutcome {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl BulkItemOutcome {
    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }
}

/// ClusterHealth is the subset of `_cluster/health` used for pings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    /// "green", "yellow" or "red"
    pub status: String,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub number_of_nodes: u32,
    #[serde(default)]
    pub number_of_data_nodes: u32,
    #[serde(default)]
    pub active_shards: u32,
}
