// btcchecker HTTP server library
// Decision: Shared library for binaries (server, OpenAPI export) and integration tests

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Router assembly and shared state
pub mod app;
pub use app::{build_router, AppState};

// Cookie sessions and auth routes
pub mod auth;

// Configuration
pub mod config;
pub use config::AppConfig;

// OpenAPI spec generation
pub mod openapi;

// Upstream price provider
pub mod price;
pub use price::{BtcRate, HttpRateProvider, RateProvider};

pub mod telemetry;
