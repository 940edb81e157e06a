//! Vector collection abstraction for HomeMatch.
//!
//! The [`Collection`] trait is the only way the pipeline touches stored
//! listings: add documents with metadata, query by text similarity, list
//! everything, and report a name and count. Backends can be swapped without
//! changing the loader, retriever, or orchestrator.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::StoredRecord;

/// Ranked results for a batch of query texts.
///
/// The three fields are parallel arrays with one inner vector per query
/// text; within an inner vector, position `i` of each array describes the
/// same hit, most similar first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResponse {
    pub ids: Vec<Vec<String>>,
    pub documents: Vec<Vec<String>>,
    pub metadatas: Vec<Vec<Map<String, Value>>>,
}

/// Abstract vector collection.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`name`](Collection::name) | Collection name |
/// | [`count`](Collection::count) | Number of stored records |
/// | [`add`](Collection::add) | Insert records; ids must be new |
/// | [`query`](Collection::query) | Similarity search per query text |
/// | [`get`](Collection::get) | All stored records in insertion order |
#[async_trait]
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    async fn count(&self) -> Result<usize>;

    /// Insert records as one operation.
    ///
    /// Fails without inserting anything if any id is already present or
    /// repeated within `records`.
    async fn add(&self, records: &[StoredRecord]) -> Result<()>;

    /// Return up to `n_results` nearest records for each query text.
    async fn query(&self, query_texts: &[String], n_results: usize) -> Result<QueryResponse>;

    async fn get(&self) -> Result<Vec<StoredRecord>>;
}
