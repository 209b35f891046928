//! Tracing initialisation

use anyhow::{anyhow, Result};
use jupiterone_config::{ConfigLoader, LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Initialize logging from configuration
///
/// Output goes to stderr. Calling this after a subscriber is installed is a
/// no-op.
pub fn init_logging_from_config(config: &LoggingConfig) -> Result<()> {
    let expression = config.filter_expression();
    let env_filter = EnvFilter::try_new(&expression)
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", expression, e))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize logging from `JUPITERONE_LOG_LEVEL` and `JUPITERONE_LOG_FORMAT`
pub fn init_logging_from_env() -> Result<()> {
    let config = ConfigLoader::new().resolve_logging(&LoggingConfig::default())?;
    init_logging_from_config(&config)
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(log_level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Use try_init to avoid panic if global subscriber already set
    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jupiterone_config::LogLevel;

    #[test]
    fn test_repeated_init_is_harmless() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            directives: vec!["jupiterone_client=trace".to_string()],
        };
        assert!(init_logging_from_config(&config).is_ok());
        assert!(init_logging_from_config(&config).is_ok());
        assert!(init_simple_tracing("warn").is_ok());
    }

    #[test]
    fn test_invalid_directive_is_rejected() {
        let config = LoggingConfig {
            directives: vec!["jupiterone_client=loud".to_string()],
            ..Default::default()
        };
        assert!(init_logging_from_config(&config).is_err());
    }

    #[test]
    fn test_init_from_env() {
        temp_env::with_vars(
            [
                ("JUPITERONE_LOG_LEVEL", Some("trace")),
                ("JUPITERONE_LOG_FORMAT", Some("xml")),
            ],
            || {
                let err = init_logging_from_env().unwrap_err();
                assert!(err.to_string().contains("Invalid LOG_FORMAT: xml"));
            },
        );

        temp_env::with_vars(
            [
                ("JUPITERONE_LOG_LEVEL", Some("trace")),
                ("JUPITERONE_LOG_FORMAT", None),
            ],
            || assert!(init_logging_from_env().is_ok()),
        );
    }
}
