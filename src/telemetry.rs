use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging.
///
/// `RUST_LOG` wins over the configured level when set. Safe to call more
/// than once; later calls are ignored.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);

    let initialized = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if initialized.is_ok() {
        tracing::debug!("privacy-confirm telemetry initialized");
    }
    Ok(())
}

/// Generate a correlation ID for linking the log lines of one operation
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one request operation. Never carries token material.
pub fn create_request_span(operation: &str, request_id: Option<i64>, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "privacy_request",
        operation = operation,
        request.id = request_id,
        correlation.id = correlation_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = generate_correlation_id();
        let b = generate_correlation_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = ObservabilityConfig::default();
        init_telemetry(&config).unwrap();
        init_telemetry(&config).unwrap();
    }
}
