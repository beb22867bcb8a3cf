//! Reasoning strategies.
//!
//! The engine delegates the six reasoning contracts to an injected
//! [`ReasoningStrategy`]:
//! - [`RuleBasedStrategy`]: deterministic regex/keyword analysis, no I/O
//! - [`LlmHybridStrategy`]: structured-JSON prompts to a completion service
//!
//! Both strategies are infallible. Anything the LLM-hybrid strategy cannot
//! parse falls back to a default structure and is logged at `warn`.

mod coerce;
mod llm_hybrid;
mod rule_based;

pub use coerce::*;
pub use llm_hybrid::*;
pub use rule_based::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{
    AlternativeConclusion, ContradictionReport, ContradictionRequest, CrossCaseReport,
    CrossCaseRequest, HypothesisVerdict, ReasoningRequest, VerificationRequest,
};

// ============================================================================
// Strategy Kind
// ============================================================================

/// Which execution strategy drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Deterministic, offline, regex-driven.
    #[default]
    RuleBased,
    /// Delegates to an external completion service.
    LlmHybrid,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RuleBased => "rule_based",
            StrategyKind::LlmHybrid => "llm_hybrid",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "rule_based" | "rules" | "rule" => Ok(StrategyKind::RuleBased),
            "llm_hybrid" | "llm" | "hybrid" => Ok(StrategyKind::LlmHybrid),
            _ => Err(format!("Unknown reasoning strategy: {}", s)),
        }
    }
}

// ============================================================================
// Intermediate Structures
// ============================================================================

/// Ordered list of steps plus the planner's framing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReasoningPlan {
    pub strategy: String,
    pub key_elements: Vec<String>,
    pub steps: Vec<String>,
    pub focus_areas: Vec<String>,
    pub potential_hypotheses: Vec<String>,
}

/// Finding of a single executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: String,
    pub premise: String,
    pub findings: String,
    pub details: Vec<String>,
    pub confidence: f64,
    pub evidence_used: Vec<String>,
}

/// Final aggregation of all step outcomes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Synthesis {
    pub conclusion: String,
    pub confidence: f64,
    pub alternatives: Vec<AlternativeConclusion>,
    pub warnings: Vec<String>,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
}

// ============================================================================
// Strategy Trait
// ============================================================================

/// The six reasoning contracts shared by every execution strategy.
#[async_trait]
pub trait ReasoningStrategy: Send + Sync {
    /// Strategy identity, reported as `model_type` and mixed into cache keys.
    fn kind(&self) -> StrategyKind;

    /// Choose the ordered steps for a question.
    async fn plan(&self, request: &ReasoningRequest) -> ReasoningPlan;

    /// Execute one planned step. `step_number` is 1-based.
    async fn execute_step(
        &self,
        step: &str,
        step_number: usize,
        plan: &ReasoningPlan,
        request: &ReasoningRequest,
    ) -> StepOutcome;

    /// Aggregate step outcomes into a conclusion.
    async fn synthesize(
        &self,
        request: &ReasoningRequest,
        plan: &ReasoningPlan,
        outcomes: &[StepOutcome],
    ) -> Synthesis;

    /// Score a hypothesis against evidence.
    async fn verify(&self, request: &VerificationRequest) -> HypothesisVerdict;

    /// Flag conflicting statements and evidence.
    async fn find_contradictions(&self, request: &ContradictionRequest) -> ContradictionReport;

    /// Match features across case files.
    async fn cross_case(&self, request: &CrossCaseRequest) -> CrossCaseReport;

    /// Whether the strategy's backing service is reachable.
    async fn is_available(&self) -> bool {
        true
    }
}

// ============================================================================
// Shared Utilities
// ============================================================================

/// Mean of the step confidences, or `None` when there are no steps.
pub(crate) fn mean_confidence(outcomes: &[StepOutcome]) -> Option<f64> {
    if outcomes.is_empty() {
        return None;
    }
    Some(outcomes.iter().map(|o| o.confidence).sum::<f64>() / outcomes.len() as f64)
}

/// First `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Extract a JSON object from a completion string.
///
/// Attempts extraction in this order:
/// 1. Raw JSON (fast path)
/// 2. ```json ... ``` code blocks
/// 3. ``` ... ``` code blocks
/// 4. The span from the first `{` to the last `}`
pub(crate) fn extract_json(completion: &str) -> Result<Value, String> {
    let trimmed = completion.trim();
    if trimmed.is_empty() {
        return Err("Empty completion".to_string());
    }

    let mut candidates: Vec<&str> = Vec::new();
    if trimmed.starts_with('{') {
        candidates.push(trimmed);
    }
    if let Some(block) = completion
        .split("```json")
        .nth(1)
        .and_then(|s| s.split("```").next())
    {
        candidates.push(block.trim());
    } else if let Some(block) = completion.split("```").nth(1) {
        candidates.push(block.trim());
    }
    if let (Some(start), Some(end)) = (completion.find('{'), completion.rfind('}')) {
        if end > start {
            candidates.push(&completion[start..=end]);
        }
    }

    let mut last_error = None;
    for candidate in candidates.into_iter().filter(|c| !c.is_empty()) {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) if value.is_object() => return Ok(value),
            Ok(_) => last_error = Some("JSON is not an object".to_string()),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        format!(
            "No JSON found in response. First 100 chars: '{}'",
            truncate_chars(completion, 100)
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // StrategyKind
    // ========================================================================

    #[test]
    fn test_strategy_kind_as_str() {
        assert_eq!(StrategyKind::RuleBased.as_str(), "rule_based");
        assert_eq!(StrategyKind::LlmHybrid.as_str(), "llm_hybrid");
        assert_eq!(format!("{}", StrategyKind::LlmHybrid), "llm_hybrid");
    }

    #[test]
    fn test_strategy_kind_from_str() {
        assert_eq!("rule_based".parse::<StrategyKind>().unwrap(), StrategyKind::RuleBased);
        assert_eq!("RULES".parse::<StrategyKind>().unwrap(), StrategyKind::RuleBased);
        assert_eq!("llm-hybrid".parse::<StrategyKind>().unwrap(), StrategyKind::LlmHybrid);
        assert_eq!("llm".parse::<StrategyKind>().unwrap(), StrategyKind::LlmHybrid);
        assert!("sapient".parse::<StrategyKind>().is_err());
    }

    // ========================================================================
    // extract_json
    // ========================================================================

    #[test]
    fn test_extract_json_raw() {
        let value = extract_json(r#"{"strategy": "deductive"}"#).unwrap();
        assert_eq!(value["strategy"], "deductive");
    }

    #[test]
    fn test_extract_json_code_block() {
        let completion = "Voici le plan :\n```json\n{\"reasoning_steps\": [\"a\"]}\n```\nFin.";
        let value = extract_json(completion).unwrap();
        assert_eq!(value["reasoning_steps"][0], "a");
    }

    #[test]
    fn test_extract_json_plain_code_block() {
        let completion = "```\n{\"confidence\": 0.8}\n```";
        assert_eq!(extract_json(completion).unwrap()["confidence"], 0.8);
    }

    #[test]
    fn test_extract_json_embedded_braces() {
        let completion = "JSON: {\"conclusion\": \"Dupont\", \"warnings\": []} merci";
        assert_eq!(extract_json(completion).unwrap()["conclusion"], "Dupont");
    }

    #[test]
    fn test_extract_json_failures() {
        assert!(extract_json("").is_err());
        assert!(extract_json("Aucune structure ici").is_err());
        assert!(extract_json("{ inachevé").is_err());
        assert!(extract_json("[1, 2]").is_err());
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    #[test]
    fn test_mean_confidence() {
        assert_eq!(mean_confidence(&[]), None);
        let outcome = |confidence| StepOutcome {
            step: "s".to_string(),
            premise: String::new(),
            findings: String::new(),
            details: Vec::new(),
            confidence,
            evidence_used: Vec::new(),
        };
        let mean = mean_confidence(&[outcome(0.4), outcome(0.8)]).unwrap();
        assert!((mean - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_truncate_chars_respects_utf8() {
        assert_eq!(truncate_chars("Évènement", 3), "Évè");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
