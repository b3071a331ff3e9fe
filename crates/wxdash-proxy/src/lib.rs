use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry::KeyValue;
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use wxdash_core::{ForecastQuery, QueryError, WeatherQuery};

pub mod upstream;

pub use upstream::{UpstreamClient, UpstreamError};

/// Errors surfaced to HTTP clients. Upstream causes are logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Failed to fetch weather data")]
    WeatherUpstream,

    #[error("Failed to fetch forecast data")]
    ForecastUpstream,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Query(_) => StatusCode::BAD_REQUEST,
            ProxyError::WeatherUpstream | ProxyError::ForecastUpstream => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    upstream_failures_total: Counter<u64>,
    upstream: UpstreamClient,
}

pub fn build_app(upstream: UpstreamClient) -> Result<(Router, Arc<AppState>)> {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .context("failed to build prometheus exporter")?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("wxdash-proxy");

    let requests_total = meter
        .u64_counter("wxdash_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let upstream_failures_total = meter
        .u64_counter("wxdash_upstream_failures_total")
        .with_description("Provider requests that failed")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        upstream_failures_total,
        upstream,
    });

    // Any origin may call the proxy
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/weather", get(weather))
        .route("/forecast", get(forecast))
        .layer(cors)
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state
        .requests_total
        .add(1, &[KeyValue::new("endpoint", "healthz")]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> ([(header::HeaderName, HeaderValue); 1], String) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

#[derive(Debug, Deserialize)]
struct WeatherParams {
    city: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastParams {
    city: Option<String>,
    unit: Option<String>,
}

async fn weather(
    State(state): State<Arc<AppState>>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> Result<Response, ProxyError> {
    state
        .requests_total
        .add(1, &[KeyValue::new("endpoint", "weather")]);

    let Query(q) = params.map_err(|e| {
        tracing::debug!(error=%e, "unparseable weather query");
        QueryError::MissingLocation
    })?;

    let query = WeatherQuery::from_params(
        q.city.as_deref(),
        q.lat.as_deref(),
        q.lon.as_deref(),
        q.unit.as_deref(),
    )?;
    tracing::info!(?query, "weather request");

    let body = state.upstream.current_weather(&query).await.map_err(|e| {
        tracing::warn!(error=%e, "upstream weather request failed");
        state
            .upstream_failures_total
            .add(1, &[KeyValue::new("endpoint", "weather")]);
        ProxyError::WeatherUpstream
    })?;

    Ok(json_body(body))
}

async fn forecast(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ForecastParams>, QueryRejection>,
) -> Result<Response, ProxyError> {
    state
        .requests_total
        .add(1, &[KeyValue::new("endpoint", "forecast")]);

    let Query(q) = params.map_err(|e| {
        tracing::debug!(error=%e, "unparseable forecast query");
        QueryError::MissingCity
    })?;

    let query = ForecastQuery::from_params(q.city.as_deref(), q.unit.as_deref())?;
    tracing::info!(city = %query.city, unit = %query.unit, "forecast request");

    let body = state.upstream.forecast(&query).await.map_err(|e| {
        tracing::warn!(error=%e, "upstream forecast request failed");
        state
            .upstream_failures_total
            .add(1, &[KeyValue::new("endpoint", "forecast")]);
        ProxyError::ForecastUpstream
    })?;

    Ok(json_body(body))
}

fn json_body(body: Bytes) -> Response {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response()
}
