use std::env;

use crate::error::AppError;
use crate::strategies::StrategyKind;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub llm: LlmConfig,
    pub engine: EngineConfig,
    pub cache: CacheConfig,
    pub heuristics: HeuristicsConfig,
    pub logging: LoggingConfig,
}

/// Completion service configuration (vLLM / Ollama style `/v1/completions`)
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_ms: u64,
    pub health_timeout_ms: u64,
}

/// Engine-level configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub strategy: StrategyKind,
    /// Hard ceiling on steps executed per reasoning call.
    pub max_depth_ceiling: usize,
    /// Depth used when a caller does not supply one.
    pub default_max_depth: usize,
}

/// Reasoning cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub capacity: usize,
    pub ttl_secs: Option<u64>,
}

/// Tunable constants of the rule-based heuristics.
///
/// Defaults are the values the heuristics were calibrated with.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicsConfig {
    /// Offset added to `support_ratio - contradict_ratio`.
    pub hypothesis_base_offset: f64,
    /// Confidence above which a hypothesis is supported (standard mode).
    pub support_threshold: f64,
    /// Confidence above which a hypothesis is supported (strict mode).
    pub strict_support_threshold: f64,
    /// Below this confidence, additional physical evidence is requested.
    pub missing_evidence_threshold: f64,
    /// Unsupported hypotheses above this confidence are "inconclusive" rather than rejected.
    pub inconclusive_threshold: f64,
    /// Mean step confidence below which a warning is attached.
    pub low_confidence_threshold: f64,
    pub cross_case_base_confidence: f64,
    pub cross_case_feature_increment: f64,
    pub cross_case_confidence_cap: f64,
    /// Common features needed for "high" significance (strictly greater).
    pub high_significance_features: usize,
    /// Common features needed to emit an investigative lead (strictly greater).
    pub lead_feature_threshold: usize,
    pub connection_strength_divisor: f64,
    /// Pattern counts (strictly greater) for high and medium risk.
    pub high_risk_patterns: usize,
    pub medium_risk_patterns: usize,
    /// Consistency score reported when the LLM contradiction analysis is unparseable.
    pub llm_fallback_consistency: f64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let llm = LlmConfig {
            base_url: env::var("LLM_BASE_URL")
                .or_else(|_| env::var("VLLM_URL"))
                .unwrap_or_else(|_| LlmConfig::default().base_url),
            model: env::var("LLM_MODEL")
                .or_else(|_| env::var("VLLM_MODEL"))
                .unwrap_or_else(|_| LlmConfig::default().model),
            max_tokens: parse_var("LLM_MAX_TOKENS").unwrap_or(8192),
            temperature: parse_var("LLM_TEMPERATURE").unwrap_or(0.7),
            timeout_ms: parse_var("LLM_TIMEOUT_MS").unwrap_or(180_000),
            health_timeout_ms: parse_var("LLM_HEALTH_TIMEOUT_MS").unwrap_or(5_000),
        };

        let strategy = match env::var("REASONING_STRATEGY") {
            Ok(raw) => raw
                .parse::<StrategyKind>()
                .map_err(|message| AppError::Config { message })?,
            Err(_) => match env::var("USE_SAPIENT") {
                Ok(flag) if flag.eq_ignore_ascii_case("true") => StrategyKind::LlmHybrid,
                _ => StrategyKind::RuleBased,
            },
        };

        let max_depth_ceiling: usize = parse_var("MAX_DEPTH_CEILING").unwrap_or(10);
        if max_depth_ceiling == 0 {
            return Err(AppError::Config {
                message: "MAX_DEPTH_CEILING must be at least 1".to_string(),
            });
        }

        let engine = EngineConfig {
            strategy,
            max_depth_ceiling,
            default_max_depth: 3.min(max_depth_ceiling),
        };

        let cache = CacheConfig {
            enabled: env::var("CACHE_ENABLED")
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(true),
            capacity: parse_var("CACHE_CAPACITY").unwrap_or(1024),
            ttl_secs: parse_var("CACHE_TTL_SECS"),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(Config {
            llm,
            engine,
            cache,
            heuristics: HeuristicsConfig::default(),
            logging,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            model: "Qwen/Qwen2.5-7B-Instruct".to_string(),
            max_tokens: 8192,
            temperature: 0.7,
            timeout_ms: 180_000,
            health_timeout_ms: 5_000,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::RuleBased,
            max_depth_ceiling: 10,
            default_max_depth: 3,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 1024,
            ttl_secs: None,
        }
    }
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            hypothesis_base_offset: 0.3,
            support_threshold: 0.5,
            strict_support_threshold: 0.7,
            missing_evidence_threshold: 0.7,
            inconclusive_threshold: 0.3,
            low_confidence_threshold: 0.5,
            cross_case_base_confidence: 0.3,
            cross_case_feature_increment: 0.1,
            cross_case_confidence_cap: 0.9,
            high_significance_features: 3,
            lead_feature_threshold: 2,
            connection_strength_divisor: 10.0,
            high_risk_patterns: 3,
            medium_risk_patterns: 1,
            llm_fallback_consistency: 0.7,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
