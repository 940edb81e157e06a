//! In-memory [`Collection`] with an optional JSON snapshot file.
//!
//! Records and their embeddings live in a `Vec` behind `std::sync::RwLock`.
//! Queries are brute-force cosine similarity over every stored vector.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::embedding::{cosine_similarity, embed_one, EmbeddingProvider};
use crate::error::{HomeMatchError, Result};
use crate::models::StoredRecord;

use super::{Collection, QueryResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    id: String,
    document: String,
    metadata: Map<String, Value>,
    embedding: Vec<f32>,
}

impl Entry {
    fn record(&self) -> StoredRecord {
        StoredRecord {
            id: self.id.clone(),
            document: self.document.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    name: String,
    embedding_model: String,
    #[serde(default)]
    dims: usize,
    entries: Vec<Entry>,
}

/// In-memory collection, optionally backed by a snapshot file.
pub struct InMemoryCollection {
    name: String,
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<Entry>>,
    snapshot: Option<PathBuf>,
}

fn poisoned<T>(_: T) -> HomeMatchError {
    HomeMatchError::StoreOperation("collection lock poisoned".to_string())
}

impl InMemoryCollection {
    pub fn new(name: impl Into<String>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            name: name.into(),
            embedder,
            entries: RwLock::new(Vec::new()),
            snapshot: None,
        }
    }

    /// Open a collection persisted at `path`, or start empty if the file
    /// does not exist yet.
    ///
    /// Entries embedded by a different model, or at a different
    /// dimensionality, are re-embedded with `embedder`.
    pub async fn open(
        name: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
        path: &Path,
    ) -> Result<Self> {
        let mut collection = Self::new(name, embedder);
        collection.snapshot = Some(path.to_path_buf());

        if !path.exists() {
            return Ok(collection);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            HomeMatchError::StoreOperation(format!("reading {}: {}", path.display(), e))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            HomeMatchError::StoreOperation(format!("parsing {}: {}", path.display(), e))
        })?;

        if snapshot.name != collection.name {
            tracing::warn!(
                snapshot = %snapshot.name,
                configured = %collection.name,
                path = %path.display(),
                "snapshot was written under a different collection name"
            );
        }

        let mut entries = snapshot.entries;
        if snapshot.embedding_model != collection.embedder.model_name()
            || snapshot.dims != collection.embedder.dims()
        {
            tracing::info!(
                from = %snapshot.embedding_model,
                to = %collection.embedder.model_name(),
                from_dims = snapshot.dims,
                to_dims = collection.embedder.dims(),
                count = entries.len(),
                "re-embedding snapshot"
            );
            let documents: Vec<String> = entries.iter().map(|e| e.document.clone()).collect();
            let vectors = collection.embedder.embed(&documents).await?;
            for (entry, vector) in entries.iter_mut().zip(vectors) {
                entry.embedding = vector;
            }
        }

        collection.entries = RwLock::new(entries);
        Ok(collection)
    }

    /// Write the collection to its snapshot file. No-op without one.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let snapshot = Snapshot {
            name: self.name.clone(),
            embedding_model: self.embedder.model_name().to_string(),
            dims: self.embedder.dims(),
            entries: self.entries.read().map_err(poisoned)?.clone(),
        };
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| HomeMatchError::StoreOperation(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    HomeMatchError::StoreOperation(format!("creating {}: {}", parent.display(), e))
                })?;
            }
        }
        std::fs::write(path, json).map_err(|e| {
            HomeMatchError::StoreOperation(format!("writing {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "collection persisted");
        Ok(())
    }
}

#[async_trait]
impl Collection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    async fn add(&self, records: &[StoredRecord]) -> Result<()> {
        let mut seen = HashSet::new();
        for r in records {
            if !seen.insert(r.id.as_str()) {
                return Err(HomeMatchError::StoreOperation(format!(
                    "duplicate id in batch: {}",
                    r.id
                )));
            }
        }

        let documents: Vec<String> = records.iter().map(|r| r.document.clone()).collect();
        let vectors = self.embedder.embed(&documents).await?;
        if vectors.len() != records.len() {
            return Err(HomeMatchError::StoreOperation(format!(
                "embedder returned {} vectors for {} documents",
                vectors.len(),
                records.len()
            )));
        }

        let mut entries = self.entries.write().map_err(poisoned)?;
        if let Some(dup) = records
            .iter()
            .find(|r| entries.iter().any(|e| e.id == r.id))
        {
            return Err(HomeMatchError::StoreOperation(format!(
                "id already exists in collection '{}': {}",
                self.name, dup.id
            )));
        }

        for (r, embedding) in records.iter().zip(vectors) {
            entries.push(Entry {
                id: r.id.clone(),
                document: r.document.clone(),
                metadata: r.metadata.clone(),
                embedding,
            });
        }
        Ok(())
    }

    async fn query(&self, query_texts: &[String], n_results: usize) -> Result<QueryResponse> {
        let mut response = QueryResponse::default();

        for text in query_texts {
            let query_vec = embed_one(self.embedder.as_ref(), text).await?;
            let entries = self.entries.read().map_err(poisoned)?;

            let mut scored: Vec<(f32, &Entry)> = entries
                .iter()
                .map(|e| (cosine_similarity(&query_vec, &e.embedding), e))
                .collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(n_results);

            response
                .ids
                .push(scored.iter().map(|(_, e)| e.id.clone()).collect());
            response
                .documents
                .push(scored.iter().map(|(_, e)| e.document.clone()).collect());
            response
                .metadatas
                .push(scored.iter().map(|(_, e)| e.metadata.clone()).collect());
        }

        Ok(response)
    }

    async fn get(&self) -> Result<Vec<StoredRecord>> {
        Ok(self
            .entries
            .read()
            .map_err(poisoned)?
            .iter()
            .map(Entry::record)
            .collect())
    }
}
