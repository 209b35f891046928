//! Integration tests for jupiterone-config

use jupiterone_config::*;
use std::time::Duration;
use temp_env::with_vars;

const ENV_VARS: [&str; 7] = [
    "JUPITERONE_API_KEY",
    "JUPITERONE_ACCOUNT_ID",
    "JUPITERONE_REGION",
    "JUPITERONE_HTTP_TIMEOUT",
    "JUPITERONE_HTTP_USER_AGENT",
    "JUPITERONE_LOG_LEVEL",
    "JUPITERONE_LOG_FORMAT",
];

/// Clear every provider variable, then set the given ones
fn env<'a>(set: &[(&'a str, &'a str)]) -> Vec<(&'a str, Option<&'a str>)> {
    ENV_VARS
        .iter()
        .map(|name| {
            let value = set.iter().find(|(k, _)| k == name).map(|(_, v)| *v);
            (*name, value)
        })
        .collect()
}

fn explicit() -> ProviderConfig {
    ProviderConfig {
        api_key: Some("config-key".to_string()),
        account_id: Some("config-account".to_string()),
        region: Some("eu".to_string()),
    }
}

#[test]
fn test_explicit_values_used_when_env_unset() {
    with_vars(env(&[]), || {
        let resolved = ConfigLoader::new().resolve_provider(&explicit()).unwrap();
        assert_eq!(resolved, explicit());
    });
}

#[test]
fn test_env_takes_precedence_over_explicit() {
    let vars = env(&[
        ("JUPITERONE_API_KEY", "env-key"),
        ("JUPITERONE_ACCOUNT_ID", "env-account"),
    ]);

    with_vars(vars, || {
        let resolved = ConfigLoader::new().resolve_provider(&explicit()).unwrap();
        assert_eq!(resolved.api_key.as_deref(), Some("env-key"));
        assert_eq!(resolved.account_id.as_deref(), Some("env-account"));
        assert_eq!(resolved.region.as_deref(), Some("eu"));
    });
}

#[test]
fn test_empty_env_var_counts_as_unset() {
    with_vars(env(&[("JUPITERONE_API_KEY", "")]), || {
        let resolved = ConfigLoader::new().resolve_provider(&explicit()).unwrap();
        assert_eq!(resolved.api_key.as_deref(), Some("config-key"));
    });
}

#[test]
fn test_missing_credentials_from_nowhere() {
    with_vars(env(&[]), || {
        let resolved = ConfigLoader::new()
            .resolve_provider(&ProviderConfig::default())
            .unwrap();
        let err = resolved.credentials().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                attribute: "api_key",
                ..
            }
        ));
    });
}

#[test]
fn test_invalid_region_from_env_is_rejected() {
    with_vars(env(&[("JUPITERONE_REGION", "not a region")]), || {
        assert!(ConfigLoader::new().resolve_provider(&explicit()).is_err());
    });
}

#[test]
fn test_region_from_env_is_case_insensitive() {
    with_vars(env(&[("JUPITERONE_REGION", "EU")]), || {
        let resolved = ConfigLoader::new().resolve_provider(&explicit()).unwrap();
        let credentials = resolved.credentials().unwrap();
        assert_eq!(credentials.endpoint(), "https://graphql.eu.jupiterone.io");
    });
}

#[test]
fn test_http_overrides_from_env() {
    let vars = env(&[
        ("JUPITERONE_HTTP_TIMEOUT", "5"),
        ("JUPITERONE_HTTP_USER_AGENT", "acceptance-tests/2.0"),
    ]);

    with_vars(vars, || {
        let http = ConfigLoader::new()
            .resolve_http(&HttpConfig::default())
            .unwrap();
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.connect_timeout, Duration::from_secs(5));
        assert_eq!(http.user_agent, "acceptance-tests/2.0");
    });
}

#[test]
fn test_http_defaults_kept_when_env_unset() {
    with_vars(env(&[("JUPITERONE_HTTP_USER_AGENT", "")]), || {
        let http = ConfigLoader::new()
            .resolve_http(&HttpConfig::default())
            .unwrap();
        assert_eq!(http, HttpConfig::default());
    });
}

#[test]
fn test_invalid_http_timeout_is_reported() {
    with_vars(env(&[("JUPITERONE_HTTP_TIMEOUT", "soon")]), || {
        let err = ConfigLoader::new()
            .resolve_http(&HttpConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("Invalid HTTP_TIMEOUT"));
    });

    with_vars(env(&[("JUPITERONE_HTTP_TIMEOUT", "0")]), || {
        let err = ConfigLoader::new()
            .resolve_http(&HttpConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("timeout must be greater than 0"));
    });
}

#[test]
fn test_logging_overrides_from_env() {
    let vars = env(&[
        ("JUPITERONE_LOG_LEVEL", "debug"),
        ("JUPITERONE_LOG_FORMAT", "JSON"),
    ]);

    with_vars(vars, || {
        let logging = ConfigLoader::new()
            .resolve_logging(&LoggingConfig::default())
            .unwrap();
        assert_eq!(logging.level, LogLevel::Debug);
        assert_eq!(logging.format, LogFormat::Json);
    });
}

#[test]
fn test_invalid_log_format_is_reported() {
    with_vars(env(&[("JUPITERONE_LOG_FORMAT", "xml")]), || {
        let err = ConfigLoader::new()
            .resolve_logging(&LoggingConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("Invalid LOG_FORMAT: xml"));
    });
}

#[test]
fn test_custom_prefix() {
    with_vars([("ACCEPTANCE_API_KEY", Some("prefixed-key"))], || {
        let resolved = ConfigLoader::with_prefix("ACCEPTANCE")
            .resolve_provider(&ProviderConfig::default())
            .unwrap();
        assert_eq!(resolved.api_key.as_deref(), Some("prefixed-key"));
    });
}
