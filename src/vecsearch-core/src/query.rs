//! Fixed-shape request bodies: index creation, KNN search, match-all and bulk actions.

use serde_json::{json, Value};

/// Field holding the document vector in every KNN index
pub const EMBEDDING_FIELD: &str = "embedding";

/// Upper bound on documents returned by a match-all listing
pub const MATCH_ALL_PAGE_SIZE: usize = 10_000;

/// Settings and mapping for a KNN-enabled index of vector documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSettings {
    pub number_of_replicas: u32,
    pub number_of_shards: u32,
    /// Length of every stored embedding
    pub dimension: usize,
}

impl IndexSettings {
    pub fn new(number_of_replicas: u32, number_of_shards: u32, dimension: usize) -> Self {
        Self {
            number_of_replicas,
            number_of_shards,
            dimension,
        }
    }

    /// Index creation body
    pub fn body(&self) -> Value {
        json!({
            "settings": {
                "number_of_replicas": self.number_of_replicas,
                "number_of_shards": self.number_of_shards,
                "index.knn": true
            },
            "mappings": {
                "properties": {
                    "id": {"type": "keyword"},
                    "created_time": {"type": "date"},
                    "updated_time": {"type": "date"},
                    EMBEDDING_FIELD: {
                        "type": "knn_vector",
                        "dimension": self.dimension
                    }
                }
            }
        })
    }
}

/// Top-`k` nearest neighbours of `embedding`, returning `k` hits
pub fn knn_query(embedding: &[f32], k: usize) -> Value {
    json!({
        "size": k,
        "query": {
            "knn": {
                EMBEDDING_FIELD: {
                    "vector": embedding,
                    "k": k
                }
            }
        }
    })
}

pub fn match_all_query(size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "match_all": {}
        }
    })
}

/// Check that `name` addresses exactly one concrete index.
///
/// Returns why the name is unusable. Wildcards, lists and `_`-prefixed names
/// would turn a request into a multi-index or cluster-level call.
pub fn check_index_name(name: &str) -> Result<(), &'static str> {
    const FORBIDDEN: &[char] = &[',', '*', '/', '\\', '?', '"', '<', '>', '|', ' ', '#', ':'];

    if name.is_empty() {
        return Err("name is empty");
    }
    if name == "." || name == ".." {
        return Err("name is a path component");
    }
    if name.starts_with(['_', '-', '+']) {
        return Err("name starts with '_', '-' or '+'");
    }
    if name.contains(FORBIDDEN) {
        return Err("name contains a wildcard, list separator or reserved character");
    }
    Ok(())
}

/// Action line preceding each document in a bulk body
pub fn bulk_action_line(index: &str, id: &str) -> Value {
    json!({"index": {"_index": index, "_id": id}})
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_settings_body() {
        let body = IndexSettings::new(1, 2, 3).body();

        assert_eq!(
            body,
            json!({
                "settings": {"number_of_replicas": 1, "number_of_shards": 2, "index.knn": true},
                "mappings": {"properties": {
                    "id": {"type": "keyword"},
                    "created_time": {"type": "date"},
                    "updated_time": {"type": "date"},
                    "embedding": {"type": "knn_vector", "dimension": 3}
                }}
            })
        );
    }

    #[test]
    fn test_knn_query_uses_k_for_size_and_neighbours() {
        let body = knn_query(&[100.0, 100.0, 100.0], 2);

        assert_eq!(body["size"], json!(2));
        assert_eq!(body["query"]["knn"]["embedding"]["k"], json!(2));
        assert_eq!(
            body["query"]["knn"]["embedding"]["vector"],
            json!([100.0, 100.0, 100.0])
        );
    }

    #[test]
    fn test_match_all_query() {
        assert_eq!(
            match_all_query(MATCH_ALL_PAGE_SIZE),
            json!({"size": 10000, "query": {"match_all": {}}})
        );
    }

    #[test]
    fn test_check_index_name() {
        for name in ["test_index", "docs-2024.10", ".hidden-ok", "a+b"] {
            assert!(check_index_name(name).is_ok(), "{name} should be accepted");
        }

        for name in ["", "a,b", "*", "logs-*", "a/b", "_all", "-x", "+x", ".", "..", "a b", "a:b"] {
            assert!(check_index_name(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_bulk_action_line_escapes_values() {
        let line = bulk_action_line("docs", "a\"b");
        let text = serde_json::to_string(&line).unwrap();

        assert!(!text.contains('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["index"]["_id"], json!("a\"b"));
        assert_eq!(parsed["index"]["_index"], json!("docs"));
    }
}
