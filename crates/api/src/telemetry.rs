// Logging setup
//
// Console logging through tracing-subscriber. RUST_LOG takes precedence over the
// configured `log_level`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the log filter: RUST_LOG directives if set, otherwise `default_level` everywhere
pub fn build_filter(default_level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy()
}

/// Install the global subscriber. Call once at startup.
pub fn init_telemetry(default_level: tracing::Level) {
    tracing_subscriber::registry()
        .with(build_filter(default_level))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

