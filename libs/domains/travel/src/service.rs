use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::embedding::EmbeddingProvider;
use crate::error::{IngestKind, VectorError, VectorResult};
use crate::generation::GenerationProvider;
use crate::index::{SearchOptions, VectorIndex};
use crate::models::{SearchResponse, TravelRecord};
use crate::store::{ContentStore, InMemoryContentStore};

/// Number of destinations retrieved per search.
pub const TOP_K: usize = 3;

/// Grounding prompt sent to the generation model.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "Based on the following travel destinations and the user's query: '{query}',\n\
         provide a helpful response suggesting the most relevant destination(s).\n\
         Include specific details from the context to support your recommendations.\n\
         \n\
         Context:\n\
         {context}\n"
    )
}

/// Retrieval orchestrator.
///
/// Ingest writes the content store first, then embeds and upserts into the
/// vector index. The two stores are not updated atomically: a failure after
/// the content-store write leaves the records cached but unsearchable until
/// they are ingested again.
pub struct TravelService<I: VectorIndex> {
    index: I,
    store: Arc<dyn ContentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    search_options: SearchOptions,
}

impl<I: VectorIndex> TravelService<I> {
    pub fn new(
        index: I,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        let search_options = SearchOptions {
            top_k: TOP_K,
            metric: index.schema().metric,
            ..SearchOptions::default()
        };

        Self {
            index,
            store: Arc::new(InMemoryContentStore::new()),
            embedder,
            generator,
            search_options,
        }
    }

    /// Overrides metric and `nprobe`; the result count stays at [`TOP_K`].
    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = SearchOptions {
            top_k: TOP_K,
            ..options
        };
        self
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn content_store(&self) -> Arc<dyn ContentStore> {
        self.store.clone()
    }

    /// Startup precondition for ingest and search.
    pub async fn ensure_collection(&self) -> VectorResult<()> {
        self.index.ensure_collection().await
    }

    pub async fn health(&self) -> VectorResult<()> {
        self.index.health().await
    }

    /// Ingest a batch of records.
    ///
    /// All ids are validated before anything is written. Within the batch a
    /// repeated id keeps its last occurrence.
    #[instrument(skip_all, fields(count = records.len()))]
    pub async fn ingest(&self, records: Vec<TravelRecord>) -> VectorResult<()> {
        records.iter().try_for_each(TravelRecord::validate)?;

        if records.is_empty() {
            debug!("Nothing to ingest");
            return Ok(());
        }

        let records = last_write_wins(records);
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let blobs: Vec<String> = records.iter().map(|r| r.content_for_embedding()).collect();

        for record in records {
            self.store.put(record).await;
        }

        let mut embeddings = Vec::with_capacity(blobs.len());
        for (id, blob) in ids.iter().zip(&blobs) {
            let embedding = self.embedder.embed(blob).await.map_err(|e| {
                error!(id = %id, error = %e, "Embedding failed during ingest");
                VectorError::ingestion(IngestKind::Embedding, e)
            })?;
            embeddings.push(embedding);
        }

        self.index.insert(&ids, &embeddings).await.map_err(|e| {
            error!(error = %e, "Vector index write failed during ingest");
            VectorError::ingestion(IngestKind::Index, e)
        })?;

        info!(count = ids.len(), "Ingested travel destinations");
        Ok(())
    }

    /// Ingest one record, reporting which half failed.
    #[instrument(skip_all, fields(id = %record.id))]
    pub async fn upsert(&self, record: TravelRecord) -> VectorResult<()> {
        record.validate()?;

        let blob = record.content_for_embedding();
        let ids = [record.id.clone()];
        self.store.put(record).await;

        let embedding = self
            .embedder
            .embed(&blob)
            .await
            .map_err(|e| VectorError::ingestion(IngestKind::Embedding, e))?;

        self.index
            .insert(&ids, &[embedding])
            .await
            .map_err(|e| VectorError::ingestion(IngestKind::Index, e))?;

        debug!("Upserted travel destination");
        Ok(())
    }

    /// Retrieve the closest destinations and ask the model to recommend among them.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> VectorResult<SearchResponse> {
        if query.is_empty() {
            return Err(VectorError::Validation(
                "query must not be empty".to_string(),
            ));
        }

        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| VectorError::QueryEmbedding(Box::new(e)))?;

        let hits = self
            .index
            .search(&[vector], &self.search_options)
            .await
            .map_err(|e| VectorError::Search(Box::new(e)))?
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut relevant_destinations = Vec::with_capacity(hits.len());
        for hit in &hits {
            match self.store.get(&hit.id).await {
                Some(record) => relevant_destinations.push(record),
                None => debug!(id = %hit.id, "Index hit has no stored content, skipping"),
            }
        }

        let context = relevant_destinations
            .iter()
            .map(TravelRecord::content_for_embedding)
            .collect::<Vec<_>>()
            .join("\n\n");

        let ai_response = self
            .generator
            .generate(&build_prompt(query, &context))
            .await
            .map_err(|e| VectorError::Search(Box::new(e)))?;

        info!(
            hits = hits.len(),
            resolved = relevant_destinations.len(),
            "Processed search query"
        );

        Ok(SearchResponse {
            query: query.to_string(),
            ai_response,
            relevant_destinations,
        })
    }
}

/// Collapses repeated ids, keeping the first position and the last content.
fn last_write_wins(records: Vec<TravelRecord>) -> Vec<TravelRecord> {
    let mut position: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<TravelRecord> = Vec::with_capacity(records.len());

    for record in records {
        match position.get(&record.id) {
            Some(&i) => unique[i] = record,
            None => {
                position.insert(record.id.clone(), unique.len());
                unique.push(record);
            }
        }
    }
    unique
}
