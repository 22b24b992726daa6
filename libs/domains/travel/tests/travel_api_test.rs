use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use domain_travel::{
    CollectionSchema, EmbeddingProvider, GenerationProvider, InMemoryIndex, TravelService,
    VectorError, VectorResult, router,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const KEYWORDS: [&str; 3] = ["romantic", "temple", "beach"];

/// One dimension per keyword: 1.0 when the text mentions it.
struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        let text = text.to_lowercase();
        Ok(KEYWORDS
            .iter()
            .map(|k| if text.contains(k) { 1.0 } else { 0.0 })
            .collect())
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> VectorResult<Vec<f32>> {
        Err(VectorError::Upstream(
            "Embeddings API error (429 Too Many Requests): quota".to_string(),
        ))
    }

    async fn embed_batch(&self, _texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        Err(VectorError::Upstream("unavailable".to_string()))
    }
}

/// Records every prompt and answers with a fixed sentence.
#[derive(Default)]
struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl GenerationProvider for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> VectorResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Paris is the best choice for a romantic getaway.".to_string())
    }
}

struct TestApp {
    router: Router,
    service: Arc<TravelService<InMemoryIndex>>,
    generator: Arc<RecordingGenerator>,
}

async fn setup(embedder: Arc<dyn EmbeddingProvider>) -> TestApp {
    let generator = Arc::new(RecordingGenerator::default());
    let index = InMemoryIndex::new(CollectionSchema::new("travel_data", KEYWORDS.len()));
    let service = Arc::new(TravelService::new(index, embedder, generator.clone()));
    service.ensure_collection().await.unwrap();

    TestApp {
        router: Router::new().nest("/api", router(service.clone())),
        service,
        generator,
    }
}

fn destinations() -> Value {
    json!([
        {
            "id": "paris",
            "destination": "Paris",
            "description": "Romantic city of lights",
            "type": "City",
            "bestTimeToVisit": "Spring",
            "avgCostPerDay": 200,
            "popularAttractions": ["Eiffel Tower", "Louvre"]
        },
        {
            "id": "tokyo",
            "destination": "Tokyo",
            "description": "Neon streets and ancient temples",
            "type": "City",
            "bestTimeToVisit": "Autumn",
            "avgCostPerDay": 150,
            "popularAttractions": ["Senso-ji", "Shibuya Crossing"]
        }
    ])
}

async fn ingest(router: &Router, body: &Value) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/travel/ingest")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_ingest_then_search_finds_paris() {
    let app = setup(Arc::new(KeywordEmbedder)).await;

    let (status, body) = ingest(&app.router, &destinations()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, body) = get_json(&app.router, "/api/travel/search?query=romantic%20getaway").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "romantic getaway");
    assert_eq!(
        body["aiResponse"],
        "Paris is the best choice for a romantic getaway."
    );

    let ids: Vec<&str> = body["relevantDestinations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["paris", "tokyo"]);
    assert_eq!(body["relevantDestinations"][0]["bestTimeToVisit"], "Spring");

    let prompts = app.generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("user's query: 'romantic getaway'"));
    assert!(prompts[0].contains(
        "Paris - Romantic city of lights. Type: City. Best time to visit: Spring. \
         Popular attractions: Eiffel Tower, Louvre\n\nTokyo - "
    ));
}

#[tokio::test]
async fn test_search_on_empty_collection_generates_without_context() {
    let app = setup(Arc::new(KeywordEmbedder)).await;

    let (status, body) = get_json(&app.router, "/api/travel/search?query=beach").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["relevantDestinations"], json!([]));
    assert!(app.generator.prompts.lock().unwrap()[0].ends_with("Context:\n\n"));
}

#[tokio::test]
async fn test_reingest_overwrites_record() {
    let app = setup(Arc::new(KeywordEmbedder)).await;
    ingest(&app.router, &destinations()).await;

    let updated = json!([{
        "id": "tokyo",
        "destination": "Tokyo",
        "description": "Romantic temple gardens",
        "type": "City",
        "bestTimeToVisit": "Spring",
        "avgCostPerDay": 180,
        "popularAttractions": []
    }]);
    let (status, _) = ingest(&app.router, &updated).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.service.index().len().await, 2);
    let stored = app.service.content_store().get("tokyo").await.unwrap();
    assert_eq!(stored.avg_cost_per_day, Some(180));
}

#[tokio::test]
async fn test_ensure_collection_twice_creates_once() {
    let app = setup(Arc::new(KeywordEmbedder)).await;
    app.service.ensure_collection().await.unwrap();
    assert_eq!(app.service.index().creations(), 1);
}

#[tokio::test]
async fn test_missing_query_is_bad_request() {
    let app = setup(Arc::new(KeywordEmbedder)).await;

    let (status, body) = get_json(&app.router, "/api/travel/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "JSON_EXTRACTION");
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let app = setup(Arc::new(KeywordEmbedder)).await;

    let (status, body) = get_json(&app.router, "/api/travel/search?query=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(app.generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_whitespace_query_is_searched() {
    let app = setup(Arc::new(KeywordEmbedder)).await;
    ingest(&app.router, &destinations()).await;

    let (status, body) = get_json(&app.router, "/api/travel/search?query=%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], " ");
}

#[tokio::test]
async fn test_record_without_cost_is_ingested() {
    let app = setup(Arc::new(KeywordEmbedder)).await;
    let record = json!([{
        "id": "bali",
        "destination": "Bali",
        "description": "Beach temples",
        "type": "Island",
        "bestTimeToVisit": "Summer",
        "popularAttractions": ["Uluwatu"]
    }]);

    let (status, _) = ingest(&app.router, &record).await;
    assert_eq!(status, StatusCode::OK);

    let stored = app.service.content_store().get("bali").await.unwrap();
    assert_eq!(stored.avg_cost_per_day, None);

    let (_, body) = get_json(&app.router, "/api/travel/search?query=beach").await;
    assert_eq!(body["relevantDestinations"][0]["id"], "bali");
    assert!(body["relevantDestinations"][0].get("avgCostPerDay").is_none());
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = setup(Arc::new(KeywordEmbedder)).await;
    let mut records = destinations();
    records[1]["id"] = json!("");

    let (status, body) = ingest(&app.router, &records).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(app.service.content_store().len().await, 0);
}

#[tokio::test]
async fn test_embedding_failure_is_internal_error() {
    let app = setup(Arc::new(FailingEmbedder)).await;

    let (status, body) = ingest(&app.router, &destinations()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "UPSTREAM_ERROR");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to ingest travel data")
    );
    // Content store writes happen before embedding and are not rolled back.
    assert_eq!(app.service.content_store().len().await, 2);
}
