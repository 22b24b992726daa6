use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Traveller API",
        version = "0.1.0",
        description = "Ingest travel destinations and get AI recommendations grounded on the closest matches"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/travel", api = domain_travel::TravelApiDoc)
    )
)]
pub struct ApiDoc;
