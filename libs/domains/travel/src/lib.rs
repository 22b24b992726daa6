//! Travel Domain Library
//!
//! Retrieval-augmented travel recommendations: destination records are
//! embedded into a vector index, and search answers are generated from the
//! closest matches.
//!
//! # Architecture
//!
//! ```text
//!                 ┌─────────────────┐
//!                 │  TravelService  │  ← ingest / upsert / search, prompt assembly
//!                 └────────┬────────┘
//!        ┌─────────────┬───┴─────────┬──────────────────┐
//! ┌──────▼──────┐ ┌────▼─────┐ ┌─────▼───────────┐ ┌────▼──────────────┐
//! │ VectorIndex │ │ Content  │ │EmbeddingProvider│ │GenerationProvider │
//! │   (trait)   │ │  Store   │ │    (trait)      │ │     (trait)       │
//! └──────┬──────┘ └──────────┘ └─────┬───────────┘ └────┬──────────────┘
//!  MilvusIndex                OpenAIEmbedding      OpenAIChat
//!  InMemoryIndex
//! ```
//!
//! The vector index stores only `(id, embedding)`; full records live in the
//! [`ContentStore`]. Search resolves hits through the store and silently
//! drops ids it does not know.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_travel::{
//!     MilvusConfig, MilvusIndex, OpenAIChatProvider, OpenAIConfig, OpenAIEmbeddingProvider,
//!     TravelService,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let milvus = MilvusConfig::from_env()?;
//! let openai = OpenAIConfig::from_env()?;
//!
//! let service = TravelService::new(
//!     MilvusIndex::new(&milvus)?,
//!     Arc::new(OpenAIEmbeddingProvider::new(openai.clone())?),
//!     Arc::new(OpenAIChatProvider::new(openai)?),
//! )
//! .with_search_options(milvus.search_options(domain_travel::TOP_K));
//!
//! service.ensure_collection().await?;
//! let answer = service.search("romantic getaway").await?;
//! println!("{}", answer.ai_response);
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod index;
pub mod memory;
pub mod milvus;
pub mod models;
pub mod openai;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use embedding::{EmbeddingProvider, OpenAIEmbeddingProvider};
pub use error::{IngestKind, VectorError, VectorResult};
pub use generation::{GenerationProvider, OpenAIChatProvider};
pub use handlers::{TravelApiDoc, router};
pub use index::{CollectionSchema, IndexKind, MetricType, SearchHit, SearchOptions, VectorIndex};
pub use memory::InMemoryIndex;
pub use milvus::{MilvusConfig, MilvusIndex};
pub use models::{SearchResponse, TravelRecord};
pub use openai::OpenAIConfig;
pub use service::{TOP_K, TravelService, build_prompt};
pub use store::{ContentStore, InMemoryContentStore};
