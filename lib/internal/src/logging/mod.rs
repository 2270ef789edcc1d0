pub mod stdout;
pub mod utils;

use hive_stitching_config::log::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

use crate::logging::stdout::build_stdout_layer;

/// Installs the global subscriber. The returned guard flushes buffered lines when dropped,
/// keep it alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard, LoggingInitError> {
    let (layer, guard) = build_stdout_layer::<Registry>(config);

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|err| LoggingInitError(err.to_string()))?;

    Ok(guard)
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to install the global logger: {0}")]
pub struct LoggingInitError(pub String);
