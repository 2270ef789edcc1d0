use hive_stitching_config::log::LogLevel;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, Layer};

/// Crates that log on every subschema call when run in-process.
static INTERNAL_CRATES: &[&str] = &["async_graphql", "async_graphql_parser", "async_graphql_value"];

pub fn level_filter(log_level: &LogLevel) -> LevelFilter {
    match log_level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

pub fn create_targets_filter(log_level: &LogLevel, internals: bool) -> Targets {
    let level_filter = level_filter(log_level);

    Targets::new()
        .with_targets(
            INTERNAL_CRATES
                .iter()
                .map(|crate_name| {
                    (
                        *crate_name,
                        match internals {
                            true => level_filter,
                            false => LevelFilter::OFF,
                        },
                    )
                })
                .collect::<Vec<(&str, LevelFilter)>>(),
        )
        .with_default(level_filter)
}

pub type DynLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;
