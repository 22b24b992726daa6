//! Server initialization and lifecycle management
//!
//! - Tracing and error-report setup
//! - Vector backend selection and collection bootstrap
//! - Router assembly (API, docs, liveness, readiness)
//! - Graceful shutdown

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::server::{
    HealthCheckFuture, create_production_app, create_router, health_router, run_health_checks,
};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_travel::{
    EmbeddingProvider, GenerationProvider, InMemoryIndex, MilvusIndex, OpenAIChatProvider,
    OpenAIEmbeddingProvider, SearchOptions, TOP_K, TravelService, VectorIndex,
};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{Config, VectorBackend};
use crate::openapi::ApiDoc;

/// Run the HTTP server
///
/// 1. Installs color-eyre and env-aware tracing
/// 2. Loads configuration
/// 3. Connects the vector backend and makes sure the collection is loaded
/// 4. Serves until SIGINT/SIGTERM
///
/// # Errors
///
/// Returns an error if configuration is invalid, the collection cannot be
/// prepared, or the server fails to bind.
pub async fn run() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let app = app(&config).await?;

    info!(
        backend = %config.backend,
        collection = %config.milvus.collection,
        "Starting traveller API with graceful shutdown (30s timeout)"
    );

    create_production_app(app, &config.server, Duration::from_secs(30), async {
        info!("Shutting down: no external connections to close");
    })
    .await
    .wrap_err("Server error")?;

    info!("Traveller API shutdown complete");
    Ok(())
}

/// Builds the full application router for `config`.
///
/// The collection is created/loaded before the router is returned, so a
/// misconfigured index fails startup instead of the first request.
pub async fn app(config: &Config) -> Result<Router> {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(
        OpenAIEmbeddingProvider::new(config.openai.clone())
            .wrap_err("Failed to create embedding provider")?,
    );
    let generator: Arc<dyn GenerationProvider> = Arc::new(
        OpenAIChatProvider::new(config.openai.clone())
            .wrap_err("Failed to create generation provider")?,
    );
    let search_options = config.milvus.search_options(TOP_K);

    let (api_routes, ready_routes) = match config.backend {
        VectorBackend::Milvus => {
            info!("Connecting to Milvus at {}", config.milvus.url);
            let index =
                MilvusIndex::new(&config.milvus).wrap_err("Failed to create Milvus client")?;
            wire(index, embedder, generator, search_options).await?
        }
        VectorBackend::Memory => {
            info!("Using in-memory vector index");
            let index = InMemoryIndex::new(config.milvus.schema());
            wire(index, embedder, generator, search_options).await?
        }
    };

    let router = create_router::<ApiDoc>(api_routes).await?;

    Ok(router
        .merge(health_router(config.app))
        .merge(ready_routes))
}

/// Creates the service over `index`, prepares the collection and returns
/// the `/travel` routes plus the `/ready` route.
async fn wire<I: VectorIndex + 'static>(
    index: I,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    search_options: SearchOptions,
) -> Result<(Router, Router)> {
    let service = Arc::new(
        TravelService::new(index, embedder, generator).with_search_options(search_options),
    );

    service
        .ensure_collection()
        .await
        .wrap_err("Failed to prepare vector collection")?;

    let ready_routes = Router::new()
        .route("/ready", get(ready::<I>))
        .with_state(service.clone());

    Ok((domain_travel::router(service), ready_routes))
}

/// Readiness: the vector index must answer.
async fn ready<I: VectorIndex>(
    State(service): State<Arc<TravelService<I>>>,
) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "vector_index",
        Box::pin(async { service.health().await.map_err(|e| e.to_string()) }),
    )];

    run_health_checks(checks).await
}
