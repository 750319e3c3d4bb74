//! vecsearch Client Library
//!
//! HTTP client for index management, document ingestion and KNN search
//! against an OpenSearch-compatible engine.

mod bulk;
mod client;
mod response;
mod transport;

pub use bulk::{BulkFailure, BulkSummary, LocalFailure, RejectedItem};
pub use client::Client;
pub use tokio_util::sync::CancellationToken;
pub use vecsearch_core::{
    query, ClusterHealth, CodecError, Config, ConfigError, Document, Hit, IndexSettings,
    SearchResult, TotalHitsRelation, VectorDoc,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP request cancelled: {operation}")]
    Cancelled { operation: &'static str },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Failed to read CA certificate {path}: {source}")]
    Certificate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid index name {name:?}: {reason}")]
    InvalidIndexName { name: String, reason: &'static str },

    #[error("Document encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Failed to decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Server error: {status} {reason} - {body}")]
    Server {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("{0}")]
    BulkFailures(BulkFailure),
}

impl ClientError {
    /// True if the network exchange itself failed or was cancelled
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Request(_) | Self::Cancelled { .. } => true,
            Self::BulkFailures(failure) => failure.cause().is_some_and(Self::is_transport),
            _ => false,
        }
    }

    /// HTTP status reported by the engine, if this is an engine error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::BulkFailures(failure) => failure.cause().and_then(Self::status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn bulk_failure(&self) -> Option<&BulkFailure> {
        match self {
            Self::BulkFailures(failure) => Some(failure),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
