use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("AGRODASH_API_BASE_URL", "http://localhost:5000/api");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "AGRODASH_ENV"));
}

#[test]
fn build_app_config_fails_without_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "AGRODASH_API_BASE_URL"),
        "expected MissingEnvVar(AGRODASH_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_base_url_without_scheme() {
    let mut map = HashMap::new();
    map.insert("AGRODASH_API_BASE_URL", "localhost:5000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AGRODASH_API_BASE_URL"),
        "expected InvalidEnvVar(AGRODASH_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.api_base_url, "http://localhost:5000/api");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.connect_timeout_secs, 10);
    assert_eq!(cfg.user_agent, "agrodash/0.1 (dashboard-client)");
    assert_eq!(cfg.recent_limit, 5);
    assert!(cfg.default_actor.is_none());
}

#[test]
fn build_app_config_request_timeout_override() {
    let mut map = full_env();
    map.insert("AGRODASH_REQUEST_TIMEOUT_SECS", "45");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 45);
}

#[test]
fn build_app_config_request_timeout_invalid() {
    let mut map = full_env();
    map.insert("AGRODASH_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AGRODASH_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(AGRODASH_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_request_timeout_zero_rejected() {
    let mut map = full_env();
    map.insert("AGRODASH_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn build_app_config_recent_limit_invalid() {
    let mut map = full_env();
    map.insert("AGRODASH_RECENT_LIMIT", "-3");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AGRODASH_RECENT_LIMIT"),
        "expected InvalidEnvVar(AGRODASH_RECENT_LIMIT), got: {result:?}"
    );
}

#[test]
fn build_app_config_parses_numeric_actor_as_id() {
    let mut map = full_env();
    map.insert("AGRODASH_ACTOR", "42");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.default_actor, Some(Actor::Id(42)));
}

#[test]
fn build_app_config_parses_email_actor() {
    let mut map = full_env();
    map.insert("AGRODASH_ACTOR", "asha@farm.example");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.default_actor,
        Some(Actor::Email("asha@farm.example".to_string()))
    );
}

#[test]
fn build_app_config_blank_actor_is_none() {
    let mut map = full_env();
    map.insert("AGRODASH_ACTOR", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.default_actor.is_none());
}

#[test]
fn debug_output_redacts_actor() {
    let mut map = full_env();
    map.insert("AGRODASH_ACTOR", "asha@farm.example");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("asha@farm.example"));
    assert!(rendered.contains("[redacted]"));
}
