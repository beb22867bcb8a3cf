//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Config::from_env() also loads a .env
//! file via dotenvy, so each test sets every variable it asserts on.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use hrm_reasoning::config::{Config, LogFormat};
use hrm_reasoning::error::AppError;
use hrm_reasoning::strategies::StrategyKind;
use serial_test::serial;
use std::env;

const MANAGED_VARS: &[&str] = &[
    "REASONING_STRATEGY",
    "USE_SAPIENT",
    "LLM_BASE_URL",
    "VLLM_URL",
    "LLM_MODEL",
    "VLLM_MODEL",
    "LLM_TIMEOUT_MS",
    "MAX_DEPTH_CEILING",
    "CACHE_ENABLED",
    "CACHE_CAPACITY",
    "CACHE_TTL_SECS",
    "LOG_FORMAT",
];

fn clear_env() {
    for name in MANAGED_VARS {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.engine.strategy, StrategyKind::RuleBased);
    assert_eq!(config.engine.max_depth_ceiling, 10);
    assert_eq!(config.engine.default_max_depth, 3);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_secs, None);
}

#[test]
#[serial]
fn test_config_from_env_explicit_strategy() {
    clear_env();
    env::set_var("REASONING_STRATEGY", "llm_hybrid");

    let config = Config::from_env().unwrap();
    assert_eq!(config.engine.strategy, StrategyKind::LlmHybrid);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_use_sapient_flag() {
    clear_env();
    env::set_var("USE_SAPIENT", "TRUE");

    let config = Config::from_env().unwrap();
    assert_eq!(config.engine.strategy, StrategyKind::LlmHybrid);

    // explicit strategy wins over the legacy flag
    env::set_var("REASONING_STRATEGY", "rule_based");
    let config = Config::from_env().unwrap();
    assert_eq!(config.engine.strategy, StrategyKind::RuleBased);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_invalid_strategy() {
    clear_env();
    env::set_var("REASONING_STRATEGY", "oracle");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_llm_aliases() {
    clear_env();
    env::set_var("VLLM_URL", "http://gpu-node:8001");
    env::set_var("VLLM_MODEL", "mistral-7b");

    let config = Config::from_env().unwrap();
    assert_eq!(config.llm.base_url, "http://gpu-node:8001");
    assert_eq!(config.llm.model, "mistral-7b");

    env::set_var("LLM_BASE_URL", "http://primary:9000");
    env::set_var("LLM_TIMEOUT_MS", "30000");
    let config = Config::from_env().unwrap();
    assert_eq!(config.llm.base_url, "http://primary:9000");
    assert_eq!(config.llm.timeout_ms, 30_000);

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_cache_settings() {
    clear_env();
    env::set_var("CACHE_ENABLED", "false");
    env::set_var("CACHE_CAPACITY", "64");
    env::set_var("CACHE_TTL_SECS", "600");

    let config = Config::from_env().unwrap();
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.capacity, 64);
    assert_eq!(config.cache.ttl_secs, Some(600));

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_depth_ceiling() {
    clear_env();
    env::set_var("MAX_DEPTH_CEILING", "2");

    let config = Config::from_env().unwrap();
    assert_eq!(config.engine.max_depth_ceiling, 2);
    assert_eq!(config.engine.default_max_depth, 2);

    env::set_var("MAX_DEPTH_CEILING", "0");
    assert!(matches!(Config::from_env(), Err(AppError::Config { .. })));

    clear_env();
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    clear_env();
    env::set_var("LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    clear_env();
}
