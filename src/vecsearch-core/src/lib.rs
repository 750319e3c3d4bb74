//! vecsearch Core Library
//!
//! This crate provides the network-free building blocks of the vecsearch client:
//! - Connection configuration
//! - Document codec for vector documents
//! - Query builders for index creation, KNN and match-all searches
//! - Wire types for search and bulk responses

pub mod config;
pub mod document;
pub mod models;
pub mod query;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use document::{CodecError, Document, VectorDoc};
pub use models::*;
pub use query::{IndexSettings, EMBEDDING_FIELD, MATCH_ALL_PAGE_SIZE};
