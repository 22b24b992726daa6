use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::MilvusConfig;
use crate::error::{VectorError, VectorResult};
use crate::index::{
    CollectionSchema, ID_FIELD, IndexKind, SearchHit, SearchOptions, VECTOR_FIELD, VectorIndex,
    check_dimensions, check_insert, sort_hits,
};

const LOADED: &str = "LoadStateLoaded";

/// Milvus REST API response envelope
#[derive(Debug, Deserialize)]
struct MilvusResponse<T> {
    code: i32,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HasCollection {
    has: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadState {
    load_state: String,
}

#[derive(Debug, Deserialize)]
struct MilvusHit {
    id: String,
    distance: f32,
}

/// Milvus-backed implementation of [`VectorIndex`].
pub struct MilvusIndex {
    client: Client,
    base_url: String,
    token: Option<String>,
    schema: CollectionSchema,
    load_timeout: Duration,
    poll_interval: Duration,
    ensured: OnceCell<()>,
}

impl MilvusIndex {
    pub fn new(config: &MilvusConfig) -> VectorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            schema: config.schema(),
            load_timeout: Duration::from_secs(config.load_timeout_secs),
            poll_interval: Duration::from_millis(500),
            ensured: OnceCell::new(),
        })
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// POSTs to `/v2/vectordb/{path}` and unwraps the `{code, data, message}` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<Option<T>, String> {
        let mut request = self
            .client
            .post(format!("{}/v2/vectordb/{}", self.base_url, path))
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("{} request failed: {}", path, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("{} returned HTTP {}: {}", path, status, error_text));
        }

        let envelope: MilvusResponse<T> = response
            .json()
            .await
            .map_err(|e| format!("{} returned a malformed body: {}", path, e))?;

        if envelope.code != 0 {
            return Err(format!(
                "{} failed with code {}: {}",
                path,
                envelope.code,
                envelope
                    .message
                    .unwrap_or_else(|| "Unknown error".to_string())
            ));
        }

        Ok(envelope.data)
    }

    async fn has_collection(&self) -> Result<bool, String> {
        let data: Option<HasCollection> = self
            .call(
                "collections/has",
                json!({ "collectionName": self.schema.name }),
            )
            .await?;
        Ok(data.is_some_and(|d| d.has))
    }

    async fn create_collection(&self) -> Result<(), String> {
        let schema = &self.schema;
        self.call::<Value>(
            "collections/create",
            json!({
                "collectionName": schema.name,
                "schema": {
                    "autoId": false,
                    "enableDynamicField": false,
                    "fields": [
                        {
                            "fieldName": ID_FIELD,
                            "dataType": "VarChar",
                            "isPrimary": true,
                            "elementTypeParams": { "max_length": schema.id_max_length() }
                        },
                        {
                            "fieldName": VECTOR_FIELD,
                            "dataType": "FloatVector",
                            "elementTypeParams": { "dim": schema.dimension }
                        }
                    ]
                },
                "params": { "shardsNum": schema.shards }
            }),
        )
        .await?;
        Ok(())
    }

    async fn create_index(&self) -> Result<(), String> {
        let schema = &self.schema;
        let params = match schema.index_kind {
            IndexKind::IvfFlat => json!({ "nlist": schema.nlist }),
            IndexKind::Flat => json!({}),
        };

        self.call::<Value>(
            "indexes/create",
            json!({
                "collectionName": schema.name,
                "indexParams": [{
                    "fieldName": VECTOR_FIELD,
                    "indexName": format!("{}_index", VECTOR_FIELD),
                    "metricType": schema.metric.as_str(),
                    "indexType": schema.index_kind.as_str(),
                    "params": params
                }]
            }),
        )
        .await?;
        Ok(())
    }

    /// Loads the collection and blocks until Milvus reports it servable.
    async fn load_and_wait(&self) -> Result<(), String> {
        self.call::<Value>(
            "collections/load",
            json!({
                "collectionName": self.schema.name,
                "replicaNumber": self.schema.replicas
            }),
        )
        .await?;

        let deadline = tokio::time::Instant::now() + self.load_timeout;
        loop {
            let state: Option<LoadState> = self
                .call(
                    "collections/get_load_state",
                    json!({ "collectionName": self.schema.name }),
                )
                .await?;

            match state {
                Some(s) if s.load_state == LOADED => return Ok(()),
                Some(s) => debug!(state = %s.load_state, "Waiting for collection load"),
                None => debug!("Load state not reported yet"),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(format!(
                    "collection '{}' not loaded after {:?}",
                    self.schema.name, self.load_timeout
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn ensure_uncached(&self) -> VectorResult<()> {
        let lifecycle = VectorError::IndexLifecycle;

        if self.has_collection().await.map_err(lifecycle)? {
            debug!(collection = %self.schema.name, "Collection exists");
        } else {
            self.create_collection().await.map_err(lifecycle)?;
            self.create_index().await.map_err(lifecycle)?;
            info!(
                collection = %self.schema.name,
                dimension = self.schema.dimension,
                index = %self.schema.index_kind,
                metric = %self.schema.metric,
                "Created collection"
            );
        }

        self.load_and_wait().await.map_err(lifecycle)?;
        info!(collection = %self.schema.name, "Collection loaded");
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MilvusIndex {
    fn schema(&self) -> CollectionSchema {
        self.schema.clone()
    }

    #[instrument(skip(self), fields(collection = %self.schema.name))]
    async fn ensure_collection(&self) -> VectorResult<()> {
        self.ensured
            .get_or_try_init(|| self.ensure_uncached())
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(collection = %self.schema.name, count = ids.len()))]
    async fn insert(&self, ids: &[String], embeddings: &[Vec<f32>]) -> VectorResult<()> {
        check_insert(&self.schema, ids, embeddings)?;
        if ids.is_empty() {
            return Ok(());
        }

        let rows: Vec<Value> = ids
            .iter()
            .zip(embeddings)
            .map(|(id, embedding)| json!({ ID_FIELD: id, VECTOR_FIELD: embedding }))
            .collect();

        self.call::<Value>(
            "entities/upsert",
            json!({ "collectionName": self.schema.name, "data": rows }),
        )
        .await
        .map_err(VectorError::Write)?;

        self.load_and_wait().await.map_err(VectorError::Write)?;
        debug!("Upserted and reloaded");
        Ok(())
    }

    #[instrument(skip_all, fields(collection = %self.schema.name, top_k = options.top_k))]
    async fn search(
        &self,
        queries: &[Vec<f32>],
        options: &SearchOptions,
    ) -> VectorResult<Vec<Vec<SearchHit>>> {
        check_dimensions(self.schema.dimension, queries)?;

        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            let data: Option<Vec<MilvusHit>> = self
                .call(
                    "entities/search",
                    json!({
                        "collectionName": self.schema.name,
                        "data": [query],
                        "annsField": VECTOR_FIELD,
                        "limit": options.top_k,
                        "outputFields": [ID_FIELD],
                        "searchParams": {
                            "metricType": options.metric.as_str(),
                            "params": { "nprobe": options.nprobe }
                        }
                    }),
                )
                .await
                .map_err(VectorError::Query)?;

            let mut hits: Vec<SearchHit> = data
                .unwrap_or_default()
                .into_iter()
                .map(|h| SearchHit {
                    id: h.id,
                    distance: h.distance,
                })
                .collect();
            sort_hits(&mut hits, options.metric);
            hits.truncate(options.top_k);
            results.push(hits);
        }

        Ok(results)
    }

    async fn health(&self) -> VectorResult<()> {
        self.call::<Value>("collections/list", json!({}))
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!(error = %e, "Milvus health probe failed");
                VectorError::Query(e)
            })
    }
}
