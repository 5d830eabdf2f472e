use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
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

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
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

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "poshpoule_catalog_cache_hit_total",
            Unit::Count,
            "Product list requests served from a fresh snapshot."
        );
        describe_counter!(
            "poshpoule_catalog_cache_miss_total",
            Unit::Count,
            "Product list requests that reloaded the snapshot."
        );
        describe_counter!(
            "poshpoule_catalog_cache_invalidate_total",
            Unit::Count,
            "Explicit invalidations of the product snapshot."
        );
        describe_counter!(
            "poshpoule_store_write_total",
            Unit::Count,
            "Committed writes of the data document."
        );
        describe_counter!(
            "poshpoule_store_conflict_total",
            Unit::Count,
            "Writes rejected because the document version moved."
        );
        describe_histogram!(
            "poshpoule_store_write_ms",
            Unit::Milliseconds,
            "Document commit latency in milliseconds."
        );
        describe_counter!(
            "poshpoule_mail_sent_total",
            Unit::Count,
            "Notification emails accepted by the relay."
        );
        describe_counter!(
            "poshpoule_mail_failed_total",
            Unit::Count,
            "Notification emails that failed or timed out."
        );
    });
}
