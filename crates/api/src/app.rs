// Router assembly
// Decision: Every request gets a UUIDv7 x-request-id, echoed back on the response
// Decision: The request span carries an empty `user` field filled in by AuthUser

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    routing::get,
    Json, Router,
};
use btcchecker_core::CredentialStore;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::api::btc_rate::{self, RateState};
use crate::auth::{self, AuthState, CookieSessionStore};
use crate::config::AppConfig;
use crate::openapi::ApiDoc;
use crate::price::{HttpRateProvider, RateProvider};

/// Everything the routes need, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub rates: Arc<dyn RateProvider>,
}

impl AppState {
    pub fn new(auth: AuthState, rates: Arc<dyn RateProvider>) -> Self {
        Self { auth, rates }
    }

    /// Open the credential store and build the session and price clients
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = CredentialStore::open_with_cost(&config.database_path, config.hash_cost()?)
            .with_context(|| {
                format!(
                    "Failed to open credential store {}",
                    config.database_path.display()
                )
            })?;

        let sessions = CookieSessionStore::new(&config.session_config());
        let rates = HttpRateProvider::new(config.price_api_url.clone(), config.price_timeout())?;

        Ok(Self::new(
            AuthState::new(Arc::new(store), sessions),
            Arc::new(rates),
        ))
    }
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// GET /health - Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Request ids are time-ordered so log lines sort by arrival
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        Uuid::now_v7().to_string().parse().ok().map(RequestId::new)
    }
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-");
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
        remote_addr = %remote_addr,
        user = tracing::field::Empty,
    )
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let rate_state = RateState {
        auth: state.auth.clone(),
        rates: state.rates,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api-doc/openapi.json", get(openapi_json))
        .merge(auth::routes(state.auth))
        .merge(btc_rate::routes(rate_state))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(request_span)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
