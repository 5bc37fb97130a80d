use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unique_variant_engine::{
    EngineConfig, ObservedItem, ReferenceDb, ReferenceStats, VariantEngine, VariantEngineError,
    VariantMatchList,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<VariantEngine>,
    db: Arc<ReferenceDb>,
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    item: ObservedItem,
    #[serde(default)]
    threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ResolveResponse {
    top: Vec<(String, usize)>,
    best_score: f64,
    needs_review: bool,
    matches: VariantMatchList,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    entries: usize,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    reference: ReferenceStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "variant_engine_server=debug,unique_variant_engine=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "pob_export.json".to_string());
    let config_path = std::env::var("CONFIG_PATH").ok();
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8090);

    tracing::info!("🚀 Starting Unique Variant Engine Server");
    tracing::info!("📦 Reference data: {}", db_path);
    tracing::info!("🔌 Port: {}", port);

    let config = EngineConfig::load_or_default(config_path.as_ref())?;
    let mut db = ReferenceDb::load(&db_path)?;
    let patched = db.apply_patches(&config.patches);
    if !patched.is_empty() {
        tracing::info!("🩹 Applied {} reference patches", patched.len());
    }

    let state = AppState {
        engine: Arc::new(VariantEngine::new(&config)),
        db: Arc::new(db),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/resolve", post(resolve_handler))
        .route("/v1/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("💎 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: unique_variant_engine::VERSION.to_string(),
        entries: state.db.len(),
    })
}

async fn resolve_handler(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, AppError> {
    tracing::debug!("Resolve request: {} ({})", req.item.name, req.item.base_type);

    let matches = state.engine.resolve(&req.item, &state.db)?;
    let threshold = req.threshold.unwrap_or(state.engine.threshold());
    let top = matches.top(threshold);

    tracing::info!(
        "✅ {} → {:?} (best {:.1})",
        req.item.name,
        top,
        matches.best_score()
    );

    Ok(Json(ResolveResponse {
        top,
        best_score: matches.best_score(),
        needs_review: matches.needs_review(),
        matches,
    }))
}

async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        reference: state.db.stats(),
    })
}

// Error handling
struct AppError(VariantEngineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            e @ VariantEngineError::RangeCountMismatch { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            VariantEngineError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        tracing::error!("❌ Error: {} - {}", status, message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<VariantEngineError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
