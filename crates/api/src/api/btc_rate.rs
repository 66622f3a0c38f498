// BTC rate route (requires a session)

use axum::{
    extract::{FromRef, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use super::common::{ApiError, ErrorResponse};
use crate::auth::{AuthState, AuthUser};
use crate::price::{BtcRate, RateProvider};

/// App state for the rate route
#[derive(Clone)]
pub struct RateState {
    pub auth: AuthState,
    pub rates: Arc<dyn RateProvider>,
}

impl FromRef<RateState> for AuthState {
    fn from_ref(input: &RateState) -> Self {
        input.auth.clone()
    }
}

/// Create rate routes
pub fn routes(state: RateState) -> Router {
    Router::new()
        .route("/btcRate", get(get_btc_rate))
        .with_state(state)
}

/// GET /btcRate - Current BTC price
#[utoipa::path(
    get,
    path = "/btcRate",
    responses(
        (status = 200, description = "Current BTC spot price", body = BtcRate),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 502, description = "Price service unavailable", body = ErrorResponse)
    ),
    tag = "rates"
)]
pub async fn get_btc_rate(
    State(state): State<RateState>,
    user: AuthUser,
) -> Result<Json<BtcRate>, ApiError> {
    tracing::debug!(user = %user.email, "Fetching BTC rate");

    let rate = state.rates.btc_rate().await.map_err(|e| {
        tracing::error!("Failed to fetch BTC rate: {:#}", e);
        ApiError::bad_gateway("price service unavailable")
    })?;

    Ok(Json(rate))
}
