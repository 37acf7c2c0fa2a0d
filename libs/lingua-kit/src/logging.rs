//! Process-wide `tracing` subscriber.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

/// `RUST_LOG` when set, otherwise `logging.level`. sqlx statement logging is
/// kept at `warn` unless the directive mentions sqlx itself.
///
/// # Errors
/// The directive does not parse.
pub fn build_filter(cfg: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let mut directive = cfg.level.trim().to_owned();
    if !directive.contains("sqlx") {
        directive.push_str(",sqlx=warn");
    }
    EnvFilter::try_new(&directive).with_context(|| format!("invalid log level '{}'", cfg.level))
}

/// Install the global subscriber: human-readable lines or JSON objects.
///
/// # Errors
/// Invalid filter, or a subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_filter(cfg)?;
    let registry = tracing_subscriber::registry().with(filter);
    match cfg.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
    }
    .context("failed to install tracing subscriber")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn level_directive_is_used_without_rust_log() {
        temp_env::with_var_unset("RUST_LOG", || {
            let cfg = LoggingConfig {
                level: "debug".to_owned(),
                format: LogFormat::Json,
            };
            let filter = build_filter(&cfg).unwrap();
            let rendered = filter.to_string();
            assert!(rendered.contains("debug"));
            assert!(rendered.contains("sqlx=warn"));
        });
    }

    #[test]
    fn rust_log_wins() {
        temp_env::with_var("RUST_LOG", Some("trace"), || {
            let filter = build_filter(&LoggingConfig::default()).unwrap();
            assert_eq!(filter.to_string(), "trace");
        });
    }

    #[test]
    fn bad_directive_is_an_error() {
        temp_env::with_var_unset("RUST_LOG", || {
            let cfg = LoggingConfig {
                level: "lingua=notalevel".to_owned(),
                format: LogFormat::Text,
            };
            assert!(build_filter(&cfg).is_err());
        });
    }
}
