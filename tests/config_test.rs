use realitydefender::{Config, Error, PollBudget, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL};
use std::time::Duration;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.api_key, "".to_string());
    assert_eq!(config.base_url, None);
    assert_eq!(config.timeout_seconds, None);
    assert_eq!(config.polling_interval_ms, None);
}

#[test]
fn test_validate_valid_config() {
    let config = Config {
        api_key: "test_api_key".to_string(),
        ..Default::default()
    };
    tokio_test::assert_ok!(config.validate());
}

#[test]
fn test_validate_empty_api_key() {
    match Config::default().validate() {
        Err(Error::InvalidConfig(msg)) => assert!(msg.contains("API key is required")),
        other => panic!("Expected InvalidConfig error, got {:?}", other),
    }
}

#[test]
fn test_validate_empty_base_url() {
    let config = Config {
        api_key: "test_api_key".to_string(),
        base_url: Some("".to_string()),
        ..Default::default()
    };

    match config.validate() {
        Err(Error::InvalidConfig(msg)) => assert!(msg.contains("Base URL cannot be empty")),
        other => panic!("Expected InvalidConfig error, got {:?}", other),
    }
}

#[test]
fn test_validate_zero_concurrency() {
    let config = Config {
        api_key: "test_api_key".to_string(),
        max_concurrent_polls: Some(0),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_custom_values() {
    let config = Config {
        api_key: "test_api_key".to_string(),
        base_url: Some("https://custom-api.example.com".to_string()),
        timeout_seconds: Some(120),
        polling_interval_ms: Some(500),
        max_wait_seconds: Some(10),
        max_concurrent_polls: Some(2),
        shutdown_grace_seconds: Some(1),
    };

    assert_eq!(config.get_base_url(), "https://custom-api.example.com");
    assert_eq!(config.get_timeout_seconds(), 120);
    assert_eq!(config.get_polling_interval(), Duration::from_millis(500));
    assert_eq!(config.get_max_concurrent_polls(), 2);
    assert_eq!(config.get_shutdown_grace(), Duration::from_secs(1));

    let poll_config = config.default_poll_config();
    assert_eq!(poll_config.budget, PollBudget::Duration(Duration::from_secs(10)));
    assert_eq!(poll_config.max_attempts(), 20);
}

#[test]
fn test_from_env() {
    // The only test touching these variables
    std::env::set_var(API_KEY_ENV, "env_api_key");
    std::env::set_var(BASE_URL_ENV, "https://env.example.com");

    let config = Config::from_env().unwrap();
    assert_eq!(config.api_key, "env_api_key");
    assert_eq!(config.get_base_url(), "https://env.example.com");

    std::env::remove_var(BASE_URL_ENV);
    let config = Config::from_env().unwrap();
    assert_eq!(config.get_base_url(), DEFAULT_BASE_URL);

    std::env::remove_var(API_KEY_ENV);
    assert!(matches!(Config::from_env(), Err(Error::InvalidConfig(_))));
}
