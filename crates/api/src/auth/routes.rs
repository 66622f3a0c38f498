// Registration and login routes
// Decision: Keep the historical unversioned paths (/user/create, /user/login)
// Decision: bcrypt and file appends run on the blocking pool

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::CookieJar;

use super::middleware::AuthState;
use crate::api::common::{ApiError, CredentialsRequest, ErrorResponse};

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/user/create", post(create_user))
        .route("/user/login", post(login))
        .route("/user/logout", post(logout))
        .with_state(state)
}

/// POST /user/create - Register a new user
#[utoipa::path(
    post,
    path = "/user/create",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User registered", body = String),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 422, description = "Invalid credentials or email already registered", body = ErrorResponse),
        (status = 500, description = "Credential file could not be written", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AuthState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<&'static str>), ApiError> {
    let Json(req) = payload?;

    let store = state.store.clone();
    run_blocking(move || store.add_user(&req.email, &req.password)).await?;

    Ok((StatusCode::CREATED, Json("Success")))
}

/// POST /user/login - Login with email and password
///
/// On success the session cookie carries the user's email.
#[utoipa::path(
    post,
    path = "/user/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set"),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse),
        (status = 500, description = "Session could not be saved", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar), ApiError> {
    let Json(req) = payload?;
    let email = req.email.clone();

    let store = state.store.clone();
    run_blocking(move || store.authenticate(&req.email, &req.password))
        .await
        .inspect_err(|_| tracing::info!("Login rejected"))?;

    let mut session = state.sessions.load(&jar);
    state.gate.establish_session(&mut session, &email)?;

    Ok((StatusCode::OK, session.write_to(jar)))
}

/// POST /user/logout - Expire the session cookie
#[utoipa::path(
    post,
    path = "/user/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    ),
    tag = "users"
)]
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    (StatusCode::NO_CONTENT, state.sessions.clear(jar))
}

/// Run a credential operation on tokio's blocking pool
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> btcchecker_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("Credential task failed: {}", e);
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}
