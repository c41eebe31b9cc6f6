use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Backend client: bearer attachment and 401 handling.
pub mod api;
// Page-side session plumbing (request-bound client, session cookie writes).
pub mod auth;
pub mod config;
// Edge route guard and the locale routing it delegates to.
pub mod guard;
pub mod intl;
pub mod locale;
pub mod models;
pub mod session;

pub mod handlers;
pub mod pages;

// Module for routing segregation (Public, Admin, API).
pub mod routes;
use routes::{admin, api as api_routes, public};

// --- Public Re-exports ---

pub use auth::HttpClient;
pub use config::AppConfig;
pub use session::{MockSessionProvider, SessionProvider, SessionState};

/// AppState
///
/// Everything a page request needs, shared across requests. Nothing in it is
/// per-visitor: sessions are read from each request's cookies.
#[derive(Clone)]
pub struct AppState {
    /// Configuration: backend address, session lookup strategy, environment.
    pub config: AppConfig,
    /// Pooled outbound HTTP client used for backend and auth-server calls.
    pub http: HttpClient,
}

impl AppState {
    /// new
    ///
    /// # Panics
    /// Panics when the HTTP client cannot be built (TLS backend failed to
    /// initialise).
    pub fn new(config: AppConfig) -> Self {
        // Also bounds remote session lookups; a timed-out lookup is "no session".
        let http = reqwest::Client::builder()
            .connect_timeout(config.http_timeout)
            .timeout(config.http_timeout)
            .build()
            .expect("FATAL: failed to build the outbound HTTP client");

        Self {
            config,
            http: HttpClient(http),
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for HttpClient {
    fn from_ref(app_state: &AppState) -> HttpClient {
        app_state.http.clone()
    }
}

/// create_router
///
/// Assembles the portal. The route guard wraps the whole inner router instead
/// of individual routes because locale routing may rewrite the URI, and the
/// inner router must match on the rewritten one.
pub fn create_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.assets_dir);

    // 1. Inner Router: pages, the /api namespace and static assets.
    let inner = Router::new()
        .merge(public::public_routes())
        .merge(admin::admin_routes())
        .nest("/api", api_routes::api_routes())
        .nest_service("/assets", assets)
        .with_state(state);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Edge: guard (and locale routing) in front of every request.
    Router::new()
        .fallback_service(inner)
        .layer(middleware::from_fn(guard::route_guard))
        // 3. Observability and Correlation Layers (outermost)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
}

/// trace_span_logger
///
/// Span for one request, correlated by the `x-request-id` set above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
