use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::op::OpContext;
use crate::state::AppState;

const DEFAULT_LOG_LEVEL: tracing::Level = tracing::Level::WARN;

/// Install a compact stderr logger. stdout is reserved for command output.
///
/// The default level comes from `--log-level`, then the config file, then `warn`.
/// The returned guard must be held until the program exits.
pub fn init_logging(explicit_level: Option<&str>, ctx: &OpContext) -> WorkerGuard {
    let configured = match explicit_level {
        Some(level) => Some(level.to_string()),
        None => AppState::load(ctx.config_path.clone())
            .ok()
            .map(|state| state.config.log_level),
    };
    let log_level = configured
        .and_then(|level| level.parse::<tracing::Level>().ok())
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let (stderr_writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stderr_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    guard
}
