//! Exact (brute-force) in-process vector index.
//!
//! Same contract and ordering as the Milvus backend. Used for local
//! development (`VECTOR_BACKEND=memory`) and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{VectorError, VectorResult};
use crate::index::{
    CollectionSchema, MetricType, SearchHit, SearchOptions, VectorIndex, check_dimensions,
    check_insert, sort_hits,
};

pub struct InMemoryIndex {
    schema: CollectionSchema,
    rows: RwLock<HashMap<String, Vec<f32>>>,
    loaded: AtomicBool,
    creations: AtomicUsize,
}

impl InMemoryIndex {
    pub fn new(schema: CollectionSchema) -> Self {
        Self {
            schema,
            rows: RwLock::new(HashMap::new()),
            loaded: AtomicBool::new(false),
            creations: AtomicUsize::new(0),
        }
    }

    /// Number of times the collection was actually created.
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn require_loaded(&self) -> VectorResult<()> {
        if self.loaded.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(VectorError::Query(format!(
                "collection '{}' is not loaded",
                self.schema.name
            )))
        }
    }
}

fn score(metric: MetricType, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        MetricType::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
        MetricType::IP => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        MetricType::Cosine => {
            let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                0.0
            } else {
                dot / (norm_a * norm_b)
            }
        }
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn schema(&self) -> CollectionSchema {
        self.schema.clone()
    }

    async fn ensure_collection(&self) -> VectorResult<()> {
        if self
            .loaded
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.creations.fetch_add(1, Ordering::SeqCst);
            info!(
                collection = %self.schema.name,
                dimension = self.schema.dimension,
                "Created in-memory collection"
            );
        }
        Ok(())
    }

    async fn insert(&self, ids: &[String], embeddings: &[Vec<f32>]) -> VectorResult<()> {
        if !self.loaded.load(Ordering::SeqCst) {
            return Err(VectorError::Write(format!(
                "collection '{}' does not exist",
                self.schema.name
            )));
        }
        check_insert(&self.schema, ids, embeddings)?;

        let mut rows = self.rows.write().await;
        for (id, embedding) in ids.iter().zip(embeddings) {
            rows.insert(id.clone(), embedding.clone());
        }
        debug!(count = ids.len(), total = rows.len(), "Upserted vectors");
        Ok(())
    }

    async fn search(
        &self,
        queries: &[Vec<f32>],
        options: &SearchOptions,
    ) -> VectorResult<Vec<Vec<SearchHit>>> {
        self.require_loaded()?;
        check_dimensions(self.schema.dimension, queries)?;

        let rows = self.rows.read().await;
        Ok(queries
            .iter()
            .map(|query| {
                let mut hits: Vec<SearchHit> = rows
                    .iter()
                    .map(|(id, embedding)| SearchHit {
                        id: id.clone(),
                        distance: score(options.metric, query, embedding),
                    })
                    .collect();
                sort_hits(&mut hits, options.metric);
                hits.truncate(options.top_k);
                hits
            })
            .collect())
    }

    async fn health(&self) -> VectorResult<()> {
        Ok(())
    }
}
