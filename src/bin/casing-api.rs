/// casing-api - HTTP front for the storefront naming bridge
///
/// Serves the request/response key transformation over HTTP so API clients
/// and the admin tools can check how a payload or field name will be seen on
/// the other side of the boundary.

use axum::{
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::Instrument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use ilytat_casing::{with_key_casing, Direction, NameMapper, ServerConfig};

#[derive(Clone)]
struct AppState {
    mapper: Arc<NameMapper>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "casing_api=info,ilytat_casing=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();

    if let Err(e) = run().await {
        tracing::error!("casing-api failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let mapper = config.name_mapper()?;

    tracing::info!(
        overrides = mapper.mappings().len(),
        source = %config
            .mappings_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "Field override table loaded"
    );
    for (snake, camel, algorithmic) in mapper.lossy_round_trips() {
        tracing::debug!(snake = %snake, camel = %camel, algorithmic = %algorithmic, "Override differs from the algorithmic conversion");
    }

    let state = AppState {
        mapper: Arc::new(mapper),
    };

    let app = build_router(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("casing-api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let transformed = with_key_casing(
        Router::new().route("/echo", post(echo)),
        config.transform_config(),
    );

    Router::new()
        .route("/convert/:direction", post(convert_names))
        .route("/health", get(health_check))
        .merge(transformed)
        .layer(middleware::from_fn(request_id))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn request_id(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %request.method(),
        route = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Echo a JSON payload back.
///
/// The handler sees the snake_case form of the body; the client receives the
/// camelCase form of the reply.
async fn echo(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    tracing::debug!(payload = %body, "Echoing snake_case payload");
    Json(body)
}

#[derive(Debug, serde::Deserialize)]
struct ConvertRequest {
    names: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
struct ConvertedName {
    input: String,
    output: String,
}

#[derive(Debug, serde::Serialize)]
struct ConvertResponse {
    direction: Direction,
    results: Vec<ConvertedName>,
}

/// Convert field names with the override table applied.
async fn convert_names(
    State(state): State<AppState>,
    Path(direction): Path<String>,
    Json(request): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, AppError> {
    let direction: Direction = direction
        .parse()
        .map_err(|e: ilytat_casing::MappingError| AppError::ValidationError(e.to_string()))?;

    let results = request
        .names
        .into_iter()
        .map(|input| {
            let output = state.mapper.convert(&input, direction);
            ConvertedName { input, output }
        })
        .collect();

    Ok(Json(ConvertResponse { direction, results }))
}

/// Health check endpoint (liveness)
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "casing-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
    }))
}

// Error handling

#[derive(Debug)]
enum AppError {
    ValidationError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(serde_json::json!({
            "error": message
        }))).into_response()
    }
}
