// OpenAPI specification generation
//
// Served at /api-doc/openapi.json and exported by the export-openapi binary.

use crate::api::{self, CredentialsRequest, ErrorResponse};
use crate::app::{self, HealthResponse};
use crate::auth;
use crate::price::BtcRate;
use utoipa::OpenApi;

/// OpenAPI documentation for the btcchecker API
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::create_user,
        auth::routes::login,
        auth::routes::logout,
        api::btc_rate::get_btc_rate,
        app::health,
    ),
    components(
        schemas(CredentialsRequest, ErrorResponse, BtcRate, HealthResponse)
    ),
    tags(
        (name = "users", description = "Registration and session endpoints"),
        (name = "rates", description = "BTC price endpoints (session required)"),
        (name = "health", description = "Liveness")
    ),
    info(
        title = "btcchecker API",
        version = "0.1.0",
        description = "User registration, cookie sessions and an authenticated BTC price lookup",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}
