use std::fmt;

use tracing::{debug, warn};
use vecsearch_core::query::bulk_action_line;
use vecsearch_core::{BulkResponse, CodecError, Document};

use crate::ClientError;

/// Result of a bulk call in which every document was indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkSummary {
    pub indexed: usize,
    /// Engine-reported milliseconds, 0 when nothing was sent
    pub took: u64,
}

/// A document the engine refused
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedItem {
    pub id: String,
    pub status: u16,
    pub error: Option<serde_json::Value>,
}

/// A document that never left the client because it could not be encoded
#[derive(Debug)]
pub struct LocalFailure {
    pub id: String,
    pub error: CodecError,
}

/// Every document of a bulk call that was not indexed.
///
/// `rejected` follows the engine's response order, `local` follows submission order.
/// `cause` is set when the request as a whole failed after some documents had
/// already been left out locally.
#[derive(Debug, Default)]
pub struct BulkFailure {
    pub rejected: Vec<RejectedItem>,
    pub local: Vec<LocalFailure>,
    pub cause: Option<Box<ClientError>>,
}

impl BulkFailure {
    /// Rejected IDs followed by locally failed IDs
    pub fn failed_ids(&self) -> Vec<&str> {
        self.rejected
            .iter()
            .map(|item| item.id.as_str())
            .chain(self.local.iter().map(|failure| failure.id.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rejected.is_empty() && self.local.is_empty()
    }

    /// Why the request itself failed, if it did
    pub fn cause(&self) -> Option<&ClientError> {
        self.cause.as_deref()
    }
}

impl fmt::Display for BulkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to index document ids: {}", self.failed_ids().join(","))?;
        if let Some(cause) = &self.cause {
            write!(f, " (request failed: {})", cause)?;
        }
        Ok(())
    }
}

/// Newline-delimited bulk request body
pub(crate) struct BulkBody {
    pub payload: Vec<u8>,
    pub submitted: usize,
    pub local: Vec<LocalFailure>,
}

/// Write an action line and a source line per document, in input order.
/// Documents that fail to encode are left out and recorded.
pub(crate) fn build_body<D: Document>(index: &str, docs: &[D]) -> BulkBody {
    let mut payload = Vec::new();
    let mut submitted = 0;
    let mut local = Vec::new();

    for doc in docs {
        let encoded = serde_json::to_vec(&bulk_action_line(index, doc.id()))
            .map_err(CodecError::from)
            .and_then(|action| doc.to_bytes().map(|source| (action, source)));

        let (action, source) = match encoded {
            Ok(lines) => lines,
            Err(error) => {
                warn!(id = doc.id(), %error, "failed to encode document, leaving it out of the bulk request");
                local.push(LocalFailure {
                    id: doc.id().to_string(),
                    error,
                });
                continue;
            }
        };

        payload.extend_from_slice(&action);
        payload.push(b'\n');
        payload.extend_from_slice(&source);
        payload.push(b'\n');
        submitted += 1;
    }

    BulkBody {
        payload,
        submitted,
        local,
    }
}

/// Fold the engine's per-item outcomes and the local failures into one result
pub(crate) fn summarize(
    response: BulkResponse,
    submitted: usize,
    local: Vec<LocalFailure>,
) -> Result<BulkSummary, BulkFailure> {
    if response.items.len() != submitted {
        warn!(
            expected = submitted,
            received = response.items.len(),
            "bulk response item count differs from submitted documents"
        );
    }

    let mut rejected = Vec::new();
    if response.errors {
        for item in response.items {
            let outcome = item.index;
            if outcome.is_failure() {
                warn!(id = %outcome.id, status = outcome.status, error = ?outcome.error, "engine rejected document");
                rejected.push(RejectedItem {
                    id: outcome.id,
                    status: outcome.status,
                    error: outcome.error,
                });
            }
        }

        if rejected.is_empty() {
            warn!("bulk response flagged errors but no item has a failure status");
        }
    }

    let failure = BulkFailure {
        rejected,
        local,
        cause: None,
    };
    if failure.is_empty() {
        debug!(indexed = submitted, took = response.took, "bulk insert succeeded");
        Ok(BulkSummary {
            indexed: submitted,
            took: response.took,
        })
    } else {
        Err(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use vecsearch_core::VectorDoc;

    fn response(errors: bool, items: &[(&str, u16)]) -> BulkResponse {
        serde_json::from_value(json!({
            "took": 12,
            "errors": errors,
            "items": items.iter().map(|(id, status)| json!({
                "index": {"_index": "docs", "_id": id, "status": status}
            })).collect::<Vec<_>>()
        }))
        .unwrap()
    }

    #[test]
    fn test_body_pairs_action_and_source_in_order() {
        let docs = vec![
            VectorDoc::new("1", vec![1.0, 2.0]),
            VectorDoc::new("2", vec![3.0, 4.0]),
        ];

        let body = build_body("docs", &docs);
        assert_eq!(body.submitted, 2);
        assert!(body.local.is_empty());

        let text = String::from_utf8(body.payload).unwrap();
        assert!(text.ends_with('\n'));
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], json!({"index": {"_index": "docs", "_id": "1"}}));
        assert_eq!(lines[1]["id"], json!("1"));
        assert_eq!(lines[2], json!({"index": {"_index": "docs", "_id": "2"}}));
        assert_eq!(lines[3]["embedding"], json!([3.0, 4.0]));
    }

    #[test]
    fn test_body_skips_documents_that_fail_to_encode() {
        let docs = vec![
            VectorDoc::new("ok-1", vec![1.0]),
            VectorDoc::new("bad", vec![f32::NAN]),
            VectorDoc::new("", vec![1.0]),
            VectorDoc::new("ok-2", vec![2.0]),
        ];

        let body = build_body("docs", &docs);
        assert_eq!(body.submitted, 2);
        assert_eq!(
            body.local.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(),
            vec!["bad", ""]
        );
        assert_eq!(String::from_utf8(body.payload).unwrap().lines().count(), 4);
    }

    #[test]
    fn test_summarize_all_success() {
        let summary = summarize(response(false, &[("1", 201), ("2", 200)]), 2, vec![]).unwrap();
        assert_eq!(
            summary,
            BulkSummary {
                indexed: 2,
                took: 12
            }
        );
    }

    #[test]
    fn test_summarize_collects_rejections_in_response_order() {
        let failure = summarize(
            response(true, &[("3", 400), ("1", 201), ("2", 429)]),
            3,
            vec![],
        )
        .unwrap_err();

        assert_eq!(failure.failed_ids(), vec!["3", "2"]);
        assert_eq!(failure.rejected[1].status, 429);
        assert_eq!(failure.to_string(), "failed to index document ids: 3,2");
    }

    #[test]
    fn test_summarize_reports_local_failures_without_engine_errors() {
        let local = vec![LocalFailure {
            id: "bad".to_string(),
            error: CodecError::EmptyId,
        }];

        let failure = summarize(response(false, &[("1", 201)]), 1, local).unwrap_err();
        assert!(failure.rejected.is_empty());
        assert_eq!(failure.failed_ids(), vec!["bad"]);
        assert!(failure.cause().is_none());
    }

    #[test]
    fn test_display_includes_request_cause() {
        let failure = BulkFailure {
            local: vec![LocalFailure {
                id: "bad".to_string(),
                error: CodecError::EmptyId,
            }],
            cause: Some(Box::new(ClientError::Server {
                status: 413,
                reason: "Payload Too Large".to_string(),
                body: "too large".to_string(),
            })),
            ..BulkFailure::default()
        };

        let text = failure.to_string();
        assert!(text.starts_with("failed to index document ids: bad"));
        assert!(text.contains("413"));
    }

    #[test]
    fn test_summarize_ignores_items_when_global_flag_is_false() {
        let summary = summarize(response(false, &[("1", 500)]), 1, vec![]);
        assert!(summary.is_ok());
    }

    #[test]
    fn test_summarize_errors_flag_without_failed_items_is_success() {
        let summary = summarize(response(true, &[("1", 201)]), 1, vec![]);
        assert!(summary.is_ok());
    }
}
