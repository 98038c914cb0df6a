use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing::info;

use movie_recommendation_engine::{
    DatasetStats, EngineConfig, MovieRecord, QueryMode, Recommendation, RecommendationEngine,
    Weighting,
};

#[derive(Parser)]
#[command(name = "movie-recommendation-engine")]
#[command(about = "A server for content-based movie recommendations")]
struct Args {
    /// Path to the movie dataset CSV
    #[arg(short, long, default_value = "movies.csv")]
    dataset: PathBuf,

    /// Port to bind the server to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Term weighting scheme
    #[arg(long, value_enum, default_value = "count")]
    weighting: Weighting,

    /// Use all metadata fields (director, cast, keywords) instead of
    /// genres + language only
    #[arg(long)]
    rich_features: bool,
}

#[derive(Clone)]
struct AppState {
    engine: Arc<RecommendationEngine>,
}

/// Errors rendered as JSON responses; engine misses map to 404, bad
/// requests to 400.
#[derive(thiserror::Error, Debug)]
enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[derive(Deserialize)]
struct RecommendationRequest {
    /// Reference movie title; takes precedence over `query`.
    title: Option<String>,
    /// Free text routed to title or filter mode.
    query: Option<String>,
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct RecommendationResponse {
    mode: &'static str,
    matched_title: Option<String>,
    recommendations: Vec<Recommendation>,
    movies: Vec<MovieRecord>,
    request_id: String,
}

#[derive(Deserialize)]
struct MoviesQuery {
    language: Option<String>,
    genre: Option<String>,
    min_rating: Option<f32>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct AutocompleteQuery {
    q: String,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    movies_count: usize,
    version: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    info!("Starting movie recommendation server");
    info!("Dataset: {:?}", args.dataset);

    let config = if args.rich_features {
        EngineConfig {
            weighting: args.weighting,
            ..EngineConfig::rich()
        }
    } else {
        EngineConfig {
            weighting: args.weighting,
            ..EngineConfig::default()
        }
    };

    let engine = RecommendationEngine::from_csv_path(&args.dataset, config)
        .context("Failed to build recommendation corpus")?;
    info!("Corpus ready: {} movies", engine.movies().len());

    let state = AppState {
        engine: Arc::new(engine),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/recommend", post(recommend_handler))
        .route("/movies", get(movies_handler))
        .route("/autocomplete", get(autocomplete_handler))
        .route("/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", args.host, args.port)
        .parse::<SocketAddr>()
        .context("Invalid address")?;

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        movies_count: state.engine.movies().len(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn recommend_handler(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let top_k = request.top_k.unwrap_or(10).clamp(1, 100);

    info!("Processing recommendation request: {}", request_id);

    if let Some(title) = request.title.as_deref() {
        let (matched, recommendations) = state
            .engine
            .recommend_by_title(title, top_k)
            .ok_or_else(|| ApiError::NotFound(format!("No movie matching {title:?}")))?;

        return Ok(Json(RecommendationResponse {
            mode: "title",
            matched_title: Some(matched.title.clone()),
            recommendations,
            movies: vec![],
            request_id,
        }));
    }

    let query = request
        .query
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("title or query required".to_string()))?;

    match state.engine.route_query(query) {
        QueryMode::Title(title) => {
            let (matched, recommendations) = state
                .engine
                .recommend_by_title(&title, top_k)
                .ok_or_else(|| ApiError::NotFound(format!("No movie matching {query:?}")))?;

            Ok(Json(RecommendationResponse {
                mode: "title",
                matched_title: Some(matched.title.clone()),
                recommendations,
                movies: vec![],
                request_id,
            }))
        }
        QueryMode::Filter { genre, language } => {
            let movies: Vec<MovieRecord> = state
                .engine
                .filter_by_attributes(language.as_deref(), genre.as_deref(), None)
                .into_iter()
                .take(top_k)
                .cloned()
                .collect();

            Ok(Json(RecommendationResponse {
                mode: "filter",
                matched_title: None,
                recommendations: vec![],
                movies,
                request_id,
            }))
        }
    }
}

async fn movies_handler(
    Query(params): Query<MoviesQuery>,
    State(state): State<AppState>,
) -> Json<Vec<MovieRecord>> {
    let limit = params.limit.unwrap_or(20).min(100);
    let movies: Vec<MovieRecord> = state
        .engine
        .filter_by_attributes(
            params.language.as_deref(),
            params.genre.as_deref(),
            params.min_rating,
        )
        .into_iter()
        .take(limit)
        .cloned()
        .collect();
    Json(movies)
}

async fn autocomplete_handler(
    Query(params): Query<AutocompleteQuery>,
    State(state): State<AppState>,
) -> Json<Vec<String>> {
    let limit = params.limit.unwrap_or(5).min(20);
    let suggestions: Vec<String> = state
        .engine
        .autocomplete(&params.q, limit)
        .into_iter()
        .map(|title| title.to_string())
        .collect();
    Json(suggestions)
}

async fn stats_handler(State(state): State<AppState>) -> Json<DatasetStats> {
    Json(state.engine.stats())
}
