use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use core_config::ConfigError;
use thiserror::Error;

/// Which half of a record write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestKind {
    Embedding,
    Index,
}

impl std::fmt::Display for IngestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestKind::Embedding => f.write_str("embedding"),
            IngestKind::Index => f.write_str("vector index"),
        }
    }
}

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Vector index lifecycle operation failed: {0}")]
    IndexLifecycle(String),

    #[error("Vector index write failed: {0}")]
    Write(String),

    #[error("Vector search operation failed: {0}")]
    Query(String),

    #[error("Upstream provider error: {0}")]
    Upstream(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to ingest travel data ({kind} step): {source}")]
    Ingestion {
        kind: IngestKind,
        #[source]
        source: Box<VectorError>,
    },

    #[error("Failed to embed search query: {0}")]
    QueryEmbedding(#[source] Box<VectorError>),

    #[error("Travel search failed: {0}")]
    Search(#[source] Box<VectorError>),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    pub fn ingestion(kind: IngestKind, source: VectorError) -> Self {
        VectorError::Ingestion {
            kind,
            source: Box::new(source),
        }
    }

    /// Walks through orchestrator wrappers to the adapter error that started it.
    pub fn root(&self) -> &VectorError {
        match self {
            VectorError::Ingestion { source, .. } => source.root(),
            VectorError::QueryEmbedding(source) | VectorError::Search(source) => source.root(),
            other => other,
        }
    }
}

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        VectorError::Upstream(err.to_string())
    }
}

impl From<ConfigError> for VectorError {
    fn from(err: ConfigError) -> Self {
        VectorError::Config(err.to_string())
    }
}

/// Convert VectorError to AppError for standardized HTTP error responses
impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Validation(msg) => AppError::BadRequest(msg),
            other => {
                let code = match other.root() {
                    VectorError::Upstream(_) => ErrorCode::UpstreamError,
                    VectorError::IndexLifecycle(_)
                    | VectorError::Write(_)
                    | VectorError::Query(_)
                    | VectorError::DimensionMismatch { .. } => ErrorCode::VectorIndexError,
                    _ => ErrorCode::InternalError,
                };
                AppError::coded(StatusCode::INTERNAL_SERVER_ERROR, code, other.to_string())
            }
        }
    }
}

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
