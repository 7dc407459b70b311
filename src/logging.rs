//! Logging setup
//!
//! Installs the global `tracing` subscriber for the binaries. `RUST_LOG` wins
//! over the configured level when set.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives: the configured crate level plus any extra targets
pub fn directives(config: &LoggingConfig, extra: &[&str]) -> String {
    std::iter::once(config.filter_directive())
        .chain(extra.iter().map(|d| d.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the subscriber: pretty or JSON output depending on `config.format`
pub fn init(
    config: &LoggingConfig,
    extra: &[&str],
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(config, extra)));

    let (json, pretty) = if config.is_json() {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        };
        assert_eq!(directives(&config, &[]), "dosewise=debug");
        assert_eq!(
            directives(&config, &["tower_http=info"]),
            "dosewise=debug,tower_http=info"
        );
    }
}
