use std::sync::Arc;

use once_cell::sync::OnceCell;
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vecsearch_core::query::{check_index_name, knn_query, match_all_query};
use vecsearch_core::{
    BulkResponse, ClusterHealth, CodecError, Config, Document, SearchResult, MATCH_ALL_PAGE_SIZE,
};

use crate::bulk::{self, BulkSummary};
use crate::transport::{Body, Transport};
use crate::{ClientError, Result};

static GLOBAL: OnceCell<Client> = OnceCell::new();

/// Search engine REST API client
///
/// Cloning is cheap and every clone shares one connection pool.
#[derive(Clone)]
pub struct Client {
    transport: Arc<Transport>,
}

impl Client {
    /// Create a new client from the given connection settings
    pub fn new(config: &Config) -> Result<Self> {
        let transport = Transport::new(config)?;
        info!(addresses = ?config.addresses, "search client initialized");

        Ok(Self {
            transport: Arc::new(transport),
        })
    }

    /// Build the process-wide client on first call and return it.
    ///
    /// Later and concurrent calls get the same instance; their config is ignored.
    pub fn init_global(config: &Config) -> Result<&'static Client> {
        GLOBAL.get_or_try_init(|| Client::new(config))
    }

    /// The process-wide client, if `init_global` has succeeded
    pub fn global() -> Option<&'static Client> {
        GLOBAL.get()
    }

    /// Health check against `_cluster/health`
    #[tracing::instrument(skip(self, token))]
    pub async fn ping(&self, token: &CancellationToken) -> Result<ClusterHealth> {
        self.transport
            .send(token, "ping", Method::GET, &["_cluster", "health"], None)
            .await?
            .into_typed("cluster health")
    }

    /// Create an index with a caller-built settings and mappings body
    #[tracing::instrument(skip(self, token, settings))]
    pub async fn create_index(
        &self,
        token: &CancellationToken,
        name: &str,
        settings: &serde_json::Value,
    ) -> Result<()> {
        checked_index(name)?;
        let response = self
            .transport
            .send(
                token,
                "create index",
                Method::PUT,
                &[name],
                Some(Body::json(settings)?),
            )
            .await?;

        response.error_for_status()
    }

    /// Delete exactly one index
    #[tracing::instrument(skip(self, token))]
    pub async fn delete_index(&self, token: &CancellationToken, name: &str) -> Result<()> {
        checked_index(name)?;
        self.transport
            .send(token, "delete index", Method::DELETE, &[name], None)
            .await?
            .error_for_status()
    }

    /// Write one document under its own ID, replacing any previous version
    #[tracing::instrument(skip(self, token, doc), fields(id = doc.id()))]
    pub async fn insert_document<D: Document + ?Sized>(
        &self,
        token: &CancellationToken,
        index: &str,
        doc: &D,
    ) -> Result<()> {
        checked_index(index)?;
        let body = doc.to_bytes()?;

        self.transport
            .send(
                token,
                "index document",
                Method::PUT,
                &[index, "_doc", doc.id()],
                Some(Body::Json(body)),
            )
            .await?
            .error_for_status()
    }

    /// Index many documents in one request.
    ///
    /// Documents that cannot be encoded are left out and the rest are still sent.
    /// Any document not indexed, whether rejected by the engine or never sent,
    /// turns the result into [`ClientError::BulkFailures`].
    #[tracing::instrument(skip(self, token, docs), fields(count = docs.len()))]
    pub async fn bulk_insert_documents<D: Document>(
        &self,
        token: &CancellationToken,
        index: &str,
        docs: &[D],
    ) -> Result<BulkSummary> {
        checked_index(index)?;
        let body = bulk::build_body(index, docs);

        if body.submitted == 0 {
            if body.local.is_empty() {
                debug!("nothing to index");
                return Ok(BulkSummary {
                    indexed: 0,
                    took: 0,
                });
            }
            return Err(ClientError::BulkFailures(bulk::BulkFailure {
                local: body.local,
                ..bulk::BulkFailure::default()
            }));
        }

        let sent = self
            .transport
            .send(
                token,
                "bulk insert",
                Method::POST,
                &["_bulk"],
                Some(Body::NdJson(body.payload)),
            )
            .await
            .and_then(|raw| raw.into_typed::<BulkResponse>("bulk"));

        let response = match sent {
            Ok(response) => response,
            // Left-out documents stay reported alongside the request error
            Err(e) if !body.local.is_empty() => {
                return Err(ClientError::BulkFailures(bulk::BulkFailure {
                    local: body.local,
                    cause: Some(Box::new(e)),
                    ..bulk::BulkFailure::default()
                }));
            }
            Err(e) => return Err(e),
        };

        bulk::summarize(response, body.submitted, body.local).map_err(ClientError::BulkFailures)
    }

    /// Top-`k` nearest neighbours of `embedding`
    #[tracing::instrument(skip(self, token, embedding), fields(dimension = embedding.len()))]
    pub async fn search_by_knn(
        &self,
        token: &CancellationToken,
        index: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<SearchResult> {
        if let Some(position) = embedding.iter().position(|v| !v.is_finite()) {
            return Err(CodecError::NonFiniteEmbedding { position }.into());
        }
        self.search(token, "knn search", index, &knn_query(embedding, k))
            .await
    }

    /// Every document in the index, capped at 10,000.
    ///
    /// Meant for debugging, so it is not cancellable.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_documents(&self, index: &str) -> Result<SearchResult> {
        let token = CancellationToken::new();
        self.search(
            &token,
            "match all",
            index,
            &match_all_query(MATCH_ALL_PAGE_SIZE),
        )
        .await
    }

    async fn search(
        &self,
        token: &CancellationToken,
        operation: &'static str,
        index: &str,
        query: &serde_json::Value,
    ) -> Result<SearchResult> {
        checked_index(index)?;
        let result: SearchResult = self
            .transport
            .send(
                token,
                operation,
                Method::POST,
                &[index, "_search"],
                Some(Body::json(query)?),
            )
            .await?
            .into_typed("search")?;

        debug!(
            took = result.took,
            hits = result.hits.hits.len(),
            "search completed"
        );
        Ok(result)
    }
}

fn checked_index(name: &str) -> Result<()> {
    check_index_name(name).map_err(|reason| ClientError::InvalidIndexName {
        name: name.to_string(),
        reason,
    })
}
