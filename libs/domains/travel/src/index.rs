//! Vector index contract shared by the Milvus and in-memory backends.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{VectorError, VectorResult};
use crate::models::MAX_ID_LEN;

/// Primary-key field name in every travel collection.
pub const ID_FIELD: &str = "id";
/// Vector field name in every travel collection.
pub const VECTOR_FIELD: &str = "embedding";

/// Similarity metric used to build the index and rank hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricType {
    /// Squared Euclidean distance; smaller is closer
    #[default]
    L2,
    /// Inner product; larger is closer
    IP,
    /// Cosine similarity; larger is closer
    Cosine,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::L2 => "L2",
            MetricType::IP => "IP",
            MetricType::Cosine => "COSINE",
        }
    }

    pub fn higher_is_closer(&self) -> bool {
        !matches!(self, MetricType::L2)
    }

    /// Orders two scores so that the closer one sorts first.
    pub fn compare(&self, a: f32, b: f32) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        if self.higher_is_closer() {
            ord.reverse()
        } else {
            ord
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L2" => Ok(MetricType::L2),
            "IP" => Ok(MetricType::IP),
            "COSINE" => Ok(MetricType::Cosine),
            other => Err(format!("unknown metric '{}', expected L2, IP or COSINE", other)),
        }
    }
}

/// Index structure built on the vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    /// Inverted-file index; `nlist` clusters at build time, `nprobe` at search
    #[default]
    IvfFlat,
    /// Brute-force exact search
    Flat,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::IvfFlat => "IVF_FLAT",
            IndexKind::Flat => "FLAT",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IVF_FLAT" => Ok(IndexKind::IvfFlat),
            "FLAT" => Ok(IndexKind::Flat),
            other => Err(format!(
                "unsupported index type '{}', expected IVF_FLAT or FLAT",
                other
            )),
        }
    }
}

/// Collection layout: `id` VarChar primary key plus a fixed-dimension
/// `embedding` float vector. Declared once and never altered.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSchema {
    pub name: String,
    pub dimension: usize,
    pub shards: u32,
    pub index_kind: IndexKind,
    pub metric: MetricType,
    pub nlist: u32,
    pub replicas: u32,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            shards: 2,
            index_kind: IndexKind::IvfFlat,
            metric: MetricType::L2,
            nlist: 1024,
            replicas: 1,
        }
    }

    pub fn with_metric(mut self, metric: MetricType) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_index(mut self, kind: IndexKind, nlist: u32) -> Self {
        self.index_kind = kind;
        self.nlist = nlist;
        self
    }

    pub fn with_shards(mut self, shards: u32) -> Self {
        self.shards = shards;
        self
    }

    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.replicas = replicas;
        self
    }

    /// Max length of the VarChar primary key.
    pub fn id_max_length(&self) -> usize {
        MAX_ID_LEN
    }
}

/// One neighbour returned by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub distance: f32,
}

/// Per-query search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub top_k: usize,
    pub metric: MetricType,
    pub nprobe: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            metric: MetricType::L2,
            nprobe: 10,
        }
    }
}

/// Vector index client bound to one collection.
///
/// `ensure_collection` must succeed before `insert` or `search` are called.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Schema this client manages.
    fn schema(&self) -> CollectionSchema;

    /// Create, index and load the collection if missing; otherwise just make
    /// sure it is loaded. Idempotent.
    async fn ensure_collection(&self) -> VectorResult<()>;

    /// Upsert `ids[i]` with `embeddings[i]`, then reload so the rows are
    /// searchable when this returns.
    async fn insert(&self, ids: &[String], embeddings: &[Vec<f32>]) -> VectorResult<()>;

    /// For each query vector, up to `top_k` hits ordered closest first.
    async fn search(
        &self,
        queries: &[Vec<f32>],
        options: &SearchOptions,
    ) -> VectorResult<Vec<Vec<SearchHit>>>;

    /// Cheap reachability probe.
    async fn health(&self) -> VectorResult<()>;
}

/// Fails with `DimensionMismatch` on the first vector of the wrong length.
pub fn check_dimensions(expected: usize, vectors: &[Vec<f32>]) -> VectorResult<()> {
    match vectors.iter().find(|v| v.len() != expected) {
        Some(v) => Err(VectorError::DimensionMismatch {
            expected,
            actual: v.len(),
        }),
        None => Ok(()),
    }
}

/// Checks the parallel id/embedding sequences of an insert.
pub fn check_insert(
    schema: &CollectionSchema,
    ids: &[String],
    embeddings: &[Vec<f32>],
) -> VectorResult<()> {
    if ids.len() != embeddings.len() {
        return Err(VectorError::Write(format!(
            "{} ids but {} embeddings",
            ids.len(),
            embeddings.len()
        )));
    }
    check_dimensions(schema.dimension, embeddings)
}

/// Sorts hits closest first, ties broken by id.
pub fn sort_hits(hits: &mut [SearchHit], metric: MetricType) {
    hits.sort_by(|a, b| {
        metric
            .compare(a.distance, b.distance)
            .then_with(|| a.id.cmp(&b.id))
    });
}
