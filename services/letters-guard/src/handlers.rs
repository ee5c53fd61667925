// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the letters guard service.
//!
//! Comment writes are checked against the client's rate window before any
//! other work; accepted submissions are validated and sanitized and handed
//! back for the caller to store.

use crate::client_ip::client_key;
use crate::comment::{prepare_comment, CommentSubmission};
use crate::config::Config;
use crate::error::{retry_after_secs, AppError, Result};
use crate::limiter::{RateDecision, RateLimiter};
use crate::metrics::GuardMetrics;
use crate::sanitizer::{extract_plain_text, sanitize_optional};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Which limiter a check applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitScope {
    #[default]
    Comments,
    Api,
}

impl LimitScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comments => "comments",
            Self::Api => "api",
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub comment_limiter: RateLimiter,
    pub api_limiter: RateLimiter,
    pub metrics: GuardMetrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> prometheus::Result<Self> {
        Ok(Self {
            comment_limiter: RateLimiter::new(config.comment_limit),
            api_limiter: RateLimiter::new(config.api_limit),
            metrics: GuardMetrics::new()?,
            config,
        })
    }

    pub fn limiter(&self, scope: LimitScope) -> &RateLimiter {
        match scope {
            LimitScope::Comments => &self.comment_limiter,
            LimitScope::Api => &self.api_limiter,
        }
    }

    /// Consume one slot for `key` and record the outcome.
    pub async fn consume(&self, scope: LimitScope, key: &str) -> RateDecision {
        let decision = self.limiter(scope).check_and_consume(key).await;
        self.metrics.record_decision(scope.as_str(), &decision);
        decision
    }

    /// Drop expired windows from both limiters.
    pub async fn sweep(&self) -> usize {
        let mut removed = 0;
        for scope in [LimitScope::Comments, LimitScope::Api] {
            let limiter = self.limiter(scope);
            removed += limiter.cleanup().await;
            self.metrics
                .set_tracked_keys(scope.as_str(), limiter.len().await);
        }
        removed
    }

    fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        client_key(headers, peer, self.config.trust_forwarded_headers)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Rate limit check request (for an upstream proxy).
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub key: String,
    #[serde(default)]
    pub scope: LimitScope,
}

/// Rate limit check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
    pub remaining: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SanitizeRequest {
    #[serde(default)]
    pub html: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SanitizeResponse {
    pub html: String,
    pub text: String,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let guarded = Router::new()
        .route("/sanitize", post(sanitize))
        .route("/comments", post(submit_comment))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/check", post(check))
        .merge(guarded);

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    app.layer(cors)
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "letters-guard",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus exposition endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response> {
    let body = state.metrics.encode()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Consume one slot for an arbitrary key.
///
/// Always answers 200 for well-formed requests so a proxy can read the body.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>> {
    let key = req.key.trim();
    if key.is_empty() {
        warn!("Rate check without a key");
        return Err(AppError::InvalidRequest("key must not be empty".to_string()));
    }

    let decision = state.consume(req.scope, key).await;
    debug!(
        key,
        scope = req.scope.as_str(),
        allowed = decision.allowed,
        remaining = decision.remaining,
        "Rate check"
    );

    Ok(Json(CheckResponse {
        allowed: decision.allowed,
        remaining: decision.remaining,
        retry_after_secs: (!decision.allowed).then(|| retry_after_secs(decision.retry_after)),
    }))
}

/// Sanitize a fragment without storing anything.
pub async fn sanitize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SanitizeRequest>,
) -> Json<SanitizeResponse> {
    let html = sanitize_optional(req.html.as_deref());
    state.metrics.record_sanitize();
    let text = extract_plain_text(&html);
    Json(SanitizeResponse { html, text })
}

/// Accept a letter comment.
///
/// The body is only parsed once the client's comment window has room.
pub async fn submit_comment(
    State(state): State<Arc<AppState>>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let key = state.client_key(&headers, connect.map(|ConnectInfo(addr)| addr));
    let decision = state.consume(LimitScope::Comments, &key).await;
    if !decision.allowed {
        info!(
            client = %key,
            retry_after_secs = retry_after_secs(decision.retry_after),
            "Comment rate limited"
        );
        state.metrics.record_comment("RATE_LIMITED");
        return Err(AppError::RateLimited {
            retry_after: decision.retry_after,
        });
    }

    let submission: CommentSubmission = serde_json::from_slice(&body).map_err(|err| {
        state.metrics.record_comment("INVALID_BODY");
        AppError::from(err)
    })?;

    state.metrics.record_sanitize();
    let prepared = prepare_comment(&submission, &state.config.comment).map_err(|err| {
        info!(client = %key, error = %err, "Comment rejected");
        state.metrics.record_comment(err.code());
        AppError::from(err)
    })?;

    state.metrics.record_comment("accepted");
    info!(
        client = %key,
        thread_id = %prepared.thread_id,
        remaining = decision.remaining,
        "Comment accepted"
    );

    Ok((
        [("X-RateLimit-Remaining", decision.remaining.to_string())],
        Json(prepared),
    )
        .into_response())
}

/// Middleware applying the API-wide limiter.
async fn api_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = state.client_key(request.headers(), peer);

    let decision = state.consume(LimitScope::Api, &key).await;
    if !decision.allowed {
        warn!(
            client = %key,
            path = %request.uri().path(),
            "API rate limit exceeded"
        );
        return Err(AppError::RateLimited {
            retry_after: decision.retry_after,
        });
    }

    Ok(next.run(request).await)
}

/// Middleware adding browser hardening headers to every response.
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );
    response
}
