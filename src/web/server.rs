use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::catalog::store::ReferenceCatalog;
use crate::cli::ServeArgs;
use crate::matching::engine::{BestMatchStyle, Candidate, MatchResult, MatchingConfig, MatchingEngine};
use crate::matching::scoring::Algorithm;
use crate::matching::segments::{match_segments, OcrLine, SegmentMatch};
use crate::normalize::{NormalizationProfile, NormalizedName};
use crate::utils::validation::{validate_batch, ValidationError, MAX_BATCH_NAMES};

/// Request body limit
pub const MAX_BODY_SIZE: usize = 1024 * 1024; // 1MB

/// Upper bound on ranked candidates per name
pub const MAX_CANDIDATES: usize = 20;

/// Shared application state
pub struct AppState {
    pub catalog: ReferenceCatalog,
}

/// Error body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn bad_request(err: &ValidationError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(create_safe_error_response(err.kind(), &err.to_string(), None)),
    )
}

fn invalid_body(rejection: &JsonRejection) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(create_safe_error_response(
            "invalid_request",
            &rejection.body_text(),
            None,
        )),
    )
}

fn internal_error(err: &tokio::task::JoinError) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(create_safe_error_response(
            "internal_error",
            "Matching failed",
            Some(&err.to_string()),
        )),
    )
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub results: Vec<NormalizedName>,
}

/// Per-request matcher overrides
#[derive(Debug, Default, Deserialize)]
pub struct MatchOptions {
    #[serde(default)]
    pub algorithm: Option<Algorithm>,
    #[serde(default)]
    pub display_name: Option<bool>,
}

impl MatchOptions {
    fn config(&self) -> MatchingConfig {
        MatchingConfig {
            algorithm: self.algorithm.unwrap_or_default(),
            best_match_style: if self.display_name.unwrap_or(false) {
                BestMatchStyle::Display
            } else {
                BestMatchStyle::Rewrap
            },
            ..MatchingConfig::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FuzzyMatchRequest {
    pub drugs: Vec<String>,
    #[serde(flatten)]
    pub options: MatchOptions,
    #[serde(default)]
    pub candidates: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FuzzyMatchResponse {
    pub results: Vec<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Vec<Candidate>>>,
}

#[derive(Debug, Deserialize)]
pub struct SegmentsRequest {
    pub lines: Vec<OcrLine>,
    #[serde(flatten)]
    pub options: MatchOptions,
}

#[derive(Debug, Serialize)]
pub struct SegmentsResponse {
    pub matches: Vec<SegmentMatch>,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub total: usize,
    pub profile: NormalizationProfile,
    pub categories: Vec<CategoryCount>,
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created, the catalog cannot
/// be loaded, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Routes and middleware, without per-IP rate limiting.
///
/// Rate limiting keys on the peer address, which only exists behind a real
/// listener; [`create_router`] adds it on top.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/normalize", post(normalize_handler))
        .route("/api/fuzzy-match", post(fuzzy_match_handler))
        .route("/api/segments", post(segments_handler))
        .route("/api/catalog", get(catalog_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                .layer(ConcurrencyLimitLayer::new(100))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

/// Create the full application router for a catalog.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(catalog: ReferenceCatalog) -> anyhow::Result<Router> {
    let state = Arc::new(AppState { catalog });

    // 10 requests per second per IP, bursts of 50
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?;

    Ok(build_router(state).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let catalog = args.source.load()?;
    let entries = catalog.len();
    let profile = catalog.profile();
    let app = create_router(catalog)?;

    let addr = format!("{}:{}", args.address, args.port);
    tracing::info!(%addr, entries, %profile, "starting server");
    println!("Starting medmatch server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}/health"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn normalize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NormalizeRequest>, JsonRejection>,
) -> ApiResult<NormalizeResponse> {
    let Json(request) = payload.map_err(|e| invalid_body(&e))?;
    validate_batch(&request.names, true).map_err(|e| bad_request(&e))?;

    let normalizer = state.catalog.normalizer();
    let results = request.names.iter().map(|n| normalizer.normalize(n)).collect();
    Ok(Json(NormalizeResponse { results }))
}

async fn fuzzy_match_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FuzzyMatchRequest>, JsonRejection>,
) -> ApiResult<FuzzyMatchResponse> {
    let Json(request) = payload.map_err(|e| invalid_body(&e))?;
    validate_batch(&request.drugs, true).map_err(|e| bad_request(&e))?;

    let config = request.options.config();
    let limit = request.candidates.unwrap_or(0).min(MAX_CANDIDATES);
    let drugs = request.drugs;

    let response = tokio::task::spawn_blocking(move || {
        let engine = MatchingEngine::with_config(&state.catalog, config);
        let results = engine.match_all(&drugs);
        let candidates = (limit > 0).then(|| {
            drugs
                .iter()
                .map(|d| engine.find_candidates(d, limit))
                .collect()
        });
        FuzzyMatchResponse { results, candidates }
    })
    .await
    .map_err(|e| internal_error(&e))?;

    Ok(Json(response))
}

async fn segments_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SegmentsRequest>, JsonRejection>,
) -> ApiResult<SegmentsResponse> {
    let Json(request) = payload.map_err(|e| invalid_body(&e))?;
    if request.lines.len() > MAX_BATCH_NAMES {
        return Err(bad_request(&ValidationError::TooManyNames(request.lines.len())));
    }
    let texts: Vec<&str> = request.lines.iter().map(|l| l.text.as_str()).collect();
    validate_batch(&texts, true).map_err(|e| bad_request(&e))?;

    let config = request.options.config();
    let lines = request.lines;

    let matches = tokio::task::spawn_blocking(move || {
        let engine = MatchingEngine::with_config(&state.catalog, config);
        match_segments(&engine, &lines)
    })
    .await
    .map_err(|e| internal_error(&e))?;

    Ok(Json(SegmentsResponse { matches }))
}

async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let categories = state
        .catalog
        .category_counts()
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();

    Json(CatalogResponse {
        total: state.catalog.len(),
        profile: state.catalog.profile(),
        categories,
    })
}
