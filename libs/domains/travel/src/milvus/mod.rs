//! Milvus backend over the REST v2 API (`/v2/vectordb/...`).

mod client;
mod config;

pub use client::MilvusIndex;
pub use config::MilvusConfig;
