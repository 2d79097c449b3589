//! Retrieval pool: historical records plus their embedding index.
//!
//! Row *i* of the index corresponds to record *i*; the pool is built in
//! one shot and replaced atomically on dataset change, so a query never
//! observes a partially built index.

use crate::core::errors::ApiError;
use crate::dataset::HazardRecord;
use crate::llm::EmbeddingClient;
use crate::retrieval::index::{FlatL2Index, SearchHit};

/// A record matched by a similarity search.
#[derive(Debug, Clone)]
pub struct Retrieved<'a> {
    pub record: &'a HazardRecord,
    pub hit: SearchHit,
}

#[derive(Debug)]
pub struct RetrievalPool {
    dataset_name: String,
    records: Vec<HazardRecord>,
    index: FlatL2Index,
}

impl RetrievalPool {
    /// Embed every record's content and build the index over it.
    ///
    /// Embedding failures degrade to zero-vectors inside the client, so
    /// the index row count always matches the record count.
    pub async fn build(
        dataset_name: impl Into<String>,
        records: Vec<HazardRecord>,
        embedder: &EmbeddingClient,
    ) -> Result<RetrievalPool, ApiError> {
        if records.is_empty() {
            return Err(ApiError::BadRequest(
                "cannot build a retrieval pool from an empty dataset".to_string(),
            ));
        }

        let contents: Vec<String> = records.iter().map(|r| r.content()).collect();
        let embeddings = embedder.embed(&contents).await;
        let index = FlatL2Index::build(&embeddings)?;

        debug_assert_eq!(index.len(), records.len());

        Ok(RetrievalPool {
            dataset_name: dataset_name.into(),
            records,
            index,
        })
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn embedding_dim(&self) -> usize {
        self.index.dim()
    }

    /// Top-k records for a query embedding, nearest first.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<Retrieved<'_>>, ApiError> {
        let hits = self.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .map(|hit| Retrieved {
                record: &self.records[hit.index],
                hit,
            })
            .collect())
    }
}
