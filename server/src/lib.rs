use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use docdex_core::{DocError, DocService, IndexConfig, IndexStats, SearchResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, Json<Value>);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    /// Wrap query terms in the snippet with `<em>` tags.
    #[serde(default)]
    pub highlight: bool,
}
fn default_k() -> usize { 10 }

#[derive(Deserialize)]
pub struct DocParams {
    pub path: String,
}

#[derive(Deserialize)]
pub struct SummaryParams {
    pub path: String,
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}
fn default_max_lines() -> usize { 5 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DocService>,
    pub admin_token: Option<String>,
}

/// Build the index for `config` and return the router serving it.
pub fn build_app(config: IndexConfig) -> Result<Router> {
    let service = DocService::build(config)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState { service: Arc::new(service), admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Ok(router(app_state).layer(cors))
}

/// Routes without CORS; `build_app` wraps this.
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/docs", get(list_handler))
        .route("/docs/read", get(read_handler))
        .route("/docs/summary", get(summary_handler))
        .route("/search", get(search_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

fn error_response(err: DocError) -> ApiError {
    let status = match &err {
        DocError::NotFound(_) => StatusCode::NOT_FOUND,
        DocError::Forbidden(_) => StatusCode::FORBIDDEN,
        DocError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (status, Json(json!({ "error": err.to_string() })))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    match state.service.stats() {
        Ok(stats) => Json(json!({ "status": "ok", "stats": stats })),
        Err(_) => Json(json!({ "status": "building" })),
    }
}

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let docs = state.service.list().map_err(error_response)?;
    Ok(Json(json!({ "total": docs.len(), "documents": docs })))
}

pub async fn read_handler(State(state): State<AppState>, Query(params): Query<DocParams>) -> Result<Json<Value>, ApiError> {
    let text = state.service.read(&params.path).map_err(error_response)?;
    Ok(Json(json!({ "path": params.path, "text": text })))
}

pub async fn summary_handler(State(state): State<AppState>, Query(params): Query<SummaryParams>) -> Result<Json<Value>, ApiError> {
    let summary = state.service.summarize(&params.path, params.max_lines).map_err(error_response)?;
    Ok(Json(json!({ "path": params.path, "summary": summary })))
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 100);
    let out = state.service.search(&params.q, Some(k)).map_err(error_response)?;

    let mut results = out.results;
    if params.highlight {
        let raw_terms: Vec<&str> = params.q.split_whitespace().collect();
        for r in results.iter_mut() {
            r.snippet = highlight_terms(&r.snippet, &raw_terms);
        }
    }

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: out.total_hits, results }))
}

/// Wrap every query word in `<em>` tags. One pass over the snippet, so words
/// that also occur in the inserted tags are left alone.
fn highlight_terms(snippet: &str, terms: &[&str]) -> String {
    let alternation: Vec<String> = terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| regex::escape(t))
        .collect();
    if alternation.is_empty() { return snippet.to_string(); }
    let Ok(pat) = regex::RegexBuilder::new(&alternation.join("|"))
        .case_insensitive(true)
        .build() else { return snippet.to_string() };
    pat.replace_all(snippet, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).into_owned()
}

// --- Admin endpoints ---
async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexStats>, ApiError> {
    authorize(&state, &headers)?;
    let service = state.service.clone();
    let stats = tokio::task::spawn_blocking(move || service.rebuild())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))))?
        .map_err(error_response)?;
    tracing::info!(num_docs = stats.num_docs, "index rebuilt");
    Ok(Json(stats))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": "ADMIN_TOKEN not set" })))),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid admin token" }))))
    }
}
