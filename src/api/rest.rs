// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and speak JSON. Malformed bodies and
// inputs the analysis rejects come back as `{ "error": "..." }` with a 4xx
// status; inconclusive estimates are ordinary `null` fields.
//
// Estimation is CPU-bound, so the heavier endpoints run on the blocking pool.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::bands::{classify_signal, compute_bands, BandSet, BandSignal, Horizon};
use crate::cache::CacheKey;
use crate::error::AnalysisError;
use crate::hurst::{RollingPoint, RsDiagnostics};
use crate::regime::HurstRegime;
use crate::report::{analyze, AnalysisReport};
use crate::runtime_config::AnalysisConfig;
use crate::types::PriceSeries;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS and tracing middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/config", get(get_config).put(put_config))
        // ── Estimation ──────────────────────────────────────────────
        .route("/api/v1/hurst", post(hurst))
        .route("/api/v1/hurst/rolling", post(hurst_rolling))
        .route("/api/v1/hurst/rs", post(hurst_rs))
        // ── Bands ───────────────────────────────────────────────────
        .route("/api/v1/bands", post(bands))
        .route("/api/v1/signal", post(signal))
        // ── Composite ───────────────────────────────────────────────
        .route("/api/v1/analyze", post(analyze_series))
        // ── Middleware & State ──────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error plumbing
// =============================================================================

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

/// Unwrap a JSON body, turning extractor rejections into the API error shape.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(error_response(rejection.status(), rejection.body_text())),
    }
}

fn analysis_error(err: AnalysisError) -> ApiError {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, err)
}

async fn blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        warn!(error = %e, "analysis task failed");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "analysis task failed")
    })
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    requests: u64,
    config_version: u64,
    cached_reports: usize,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = state.snapshot();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: snap.uptime_secs,
        requests: snap.requests,
        config_version: snap.config_version,
        cached_reports: snap.cached_reports,
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Serialize)]
struct ConfigResponse {
    version: u64,
    config: AnalysisConfig,
}

async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ConfigResponse {
        version: state.snapshot().config_version,
        config: state.config(),
    })
}

async fn put_config(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalysisConfig>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let config = body(payload)?;
    let version = state
        .replace_config(config.clone())
        .map_err(analysis_error)?;

    // Persistence is best-effort; the live config is already in place.
    if let Err(e) = config.save(&state.config_path) {
        warn!(error = %e, "Failed to save analysis config to disk");
    }
    info!(version, "Analysis config updated via API");

    Ok(Json(ConfigResponse { version, config }))
}

// =============================================================================
// Hurst estimation
// =============================================================================

#[derive(Deserialize)]
struct HurstRequest {
    prices: Vec<f64>,
    #[serde(default)]
    min_chunk: Option<usize>,
}

#[derive(Serialize)]
struct HurstResponse {
    hurst: Option<f64>,
    regime: Option<HurstRegime>,
    points: usize,
}

async fn hurst(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HurstRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    state.record_request();
    let config = state.config();
    let mut estimator = config.estimator();
    if let Some(min_chunk) = req.min_chunk {
        estimator.min_chunk = min_chunk;
    }

    let points = req.prices.len();
    let hurst = blocking(move || estimator.estimate(&req.prices)).await?;
    Ok(Json(HurstResponse {
        hurst,
        regime: hurst.map(|h| config.regime_thresholds.classify(h)),
        points,
    }))
}

#[derive(Deserialize)]
struct RollingRequest {
    prices: Vec<f64>,
    #[serde(default)]
    window: Option<usize>,
    #[serde(default)]
    stride: Option<usize>,
}

async fn hurst_rolling(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RollingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    state.record_request();
    let config = state.config();
    let window = req.window.unwrap_or(config.rolling_window);
    let stride = req.stride.unwrap_or(config.stride);
    if stride == 0 {
        return Err(analysis_error(AnalysisError::InvalidParameter {
            name: "stride",
            reason: "must be positive".to_string(),
        }));
    }

    let estimator = config.estimator();
    let points: Vec<RollingPoint> = blocking(move || {
        estimator
            .rolling(&req.prices, window, stride)
            .collect::<Vec<_>>()
    })
    .await?;
    Ok(Json(points))
}

#[derive(Deserialize)]
struct RsRequest {
    prices: Vec<f64>,
}

#[derive(Serialize)]
struct RsResponse {
    diagnostics: Option<RsDiagnostics>,
}

async fn hurst_rs(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    state.record_request();
    let estimator = state.config().estimator();
    let diagnostics = blocking(move || estimator.diagnostics(&req.prices)).await?;
    Ok(Json(RsResponse { diagnostics }))
}

// =============================================================================
// Bands & signals
// =============================================================================

#[derive(Deserialize)]
struct BandsRequest {
    bars: PriceSeries,
    /// Explicit exponent; otherwise resolved from the configured mode.
    #[serde(default)]
    exponent: Option<f64>,
    #[serde(default)]
    horizons: Option<Vec<Horizon>>,
}

async fn bands(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BandsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    state.record_request();
    let config = state.config();
    let horizons = req.horizons.unwrap_or_else(|| config.horizons.clone());

    if let Some(e) = req.exponent.filter(|e| !e.is_finite()) {
        return Err(analysis_error(AnalysisError::InvalidParameter {
            name: "exponent",
            reason: format!("must be finite, got {e}"),
        }));
    }

    let set: Option<BandSet> = blocking(move || {
        let exponent = match req.exponent {
            Some(e) => Some(e),
            None => config
                .exponent_mode
                .resolve(config.estimator().estimate(&req.bars.closes())),
        };
        exponent.map(|e| compute_bands(req.bars.points(), e, &horizons))
    })
    .await?;

    set.map(Json).ok_or_else(|| {
        error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Hurst exponent unavailable for these bars; supply an exponent",
        )
    })
}

#[derive(Deserialize)]
struct SignalRequest {
    close: f64,
    #[serde(default)]
    upper: Option<f64>,
    #[serde(default)]
    lower: Option<f64>,
    #[serde(default)]
    ma: Option<f64>,
}

#[derive(Serialize)]
struct SignalResponse {
    signal: BandSignal,
    label: String,
}

async fn signal(
    payload: Result<Json<SignalRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    let signal = classify_signal(req.close, req.upper, req.lower, req.ma);
    Ok(Json(SignalResponse {
        signal,
        label: signal.to_string(),
    }))
}

// =============================================================================
// Full analysis
// =============================================================================

#[derive(Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    symbol: Option<String>,
    series: PriceSeries,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    symbol: Option<String>,
    cached: bool,
    report: AnalysisReport,
}

async fn analyze_series(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body(payload)?;
    state.record_request();
    let config = state.config();
    let symbol = req.symbol.clone();

    let worker = Arc::clone(&state);
    let (report, cached) = blocking(move || -> Result<(AnalysisReport, bool), AnalysisError> {
        match req.symbol {
            Some(symbol) => {
                // Keyed on the whole series, not just its tail.
                let key = CacheKey::for_params(symbol, &(&config, &req.series));
                let mut computed = false;
                let report = worker.cache.get_or_insert_with(key, || {
                    computed = true;
                    analyze(&req.series, &config)
                })?;
                Ok((report, !computed))
            }
            None => analyze(&req.series, &config).map(|r| (r, false)),
        }
    })
    .await?
    .map_err(analysis_error)?;

    Ok(Json(AnalyzeResponse {
        symbol,
        cached,
        report,
    }))
}
