use std::str::FromStr;
use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let default_level = LevelFilter::from_str(&logging.level).map_err(|err| {
        InfraError::configuration(format!(
            "invalid log level `{}`: {err}",
            logging.level
        ))
    })?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "rivista_cache_hit_total",
            Unit::Count,
            "Total number of response-cache hits."
        );
        describe_counter!(
            "rivista_cache_miss_total",
            Unit::Count,
            "Total number of response-cache misses, including degraded backend calls."
        );
        describe_counter!(
            "rivista_cache_put_failure_total",
            Unit::Count,
            "Total number of cache writes that failed and were swallowed."
        );
        describe_counter!(
            "rivista_cache_invalidation_total",
            Unit::Count,
            "Total number of write-invalidation runs, labeled by write kind."
        );
        describe_counter!(
            "rivista_cache_invalidated_keys_total",
            Unit::Count,
            "Total number of cache keys purged by write invalidation."
        );
        describe_histogram!(
            "rivista_trending_compute_ms",
            Unit::Milliseconds,
            "Trending ranking computation latency in milliseconds."
        );
    });
}
