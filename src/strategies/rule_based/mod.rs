//! Deterministic rule-based strategy.
//!
//! Keyword and regex analysis over evidence descriptions. No I/O, no
//! randomness: identical inputs always produce identical outputs.

mod contradictions;
mod cross_case;
mod executor;
mod planner;
mod synthesizer;
mod verifier;

pub use cross_case::{common_features, extract_case_features, CaseFeatures};
pub use executor::{evidence_excerpts, StepFinding};
pub use synthesizer::{INSUFFICIENT_EVIDENCE, LOW_CONFIDENCE_WARNING};

use async_trait::async_trait;
use tracing::debug;

use super::{ReasoningPlan, ReasoningStrategy, StepOutcome, StrategyKind, Synthesis};
use crate::config::HeuristicsConfig;
use crate::engine::{
    ContradictionReport, ContradictionRequest, CrossCaseReport, CrossCaseRequest,
    HypothesisVerdict, ReasoningRequest, VerificationRequest,
};
use crate::patterns::lexicon::step_display_name;

/// Offline strategy driven by the shared keyword lexicon.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedStrategy {
    heuristics: HeuristicsConfig,
}

impl RuleBasedStrategy {
    pub fn new(heuristics: HeuristicsConfig) -> Self {
        Self { heuristics }
    }

    pub fn heuristics(&self) -> &HeuristicsConfig {
        &self.heuristics
    }
}

#[async_trait]
impl ReasoningStrategy for RuleBasedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    async fn plan(&self, request: &ReasoningRequest) -> ReasoningPlan {
        planner::plan(request)
    }

    async fn execute_step(
        &self,
        step: &str,
        step_number: usize,
        _plan: &ReasoningPlan,
        request: &ReasoningRequest,
    ) -> StepOutcome {
        let finding = executor::execute(step, &request.evidence);
        debug!(
            step = %step,
            step_number,
            confidence = finding.confidence,
            "Rule-based step executed"
        );

        StepOutcome {
            step: step.to_string(),
            premise: step_display_name(step),
            findings: finding.findings,
            details: finding.details,
            confidence: finding.confidence,
            evidence_used: evidence_excerpts(&request.evidence),
        }
    }

    async fn synthesize(
        &self,
        request: &ReasoningRequest,
        _plan: &ReasoningPlan,
        outcomes: &[StepOutcome],
    ) -> Synthesis {
        synthesizer::synthesize(
            &request.question,
            request.reasoning_type,
            outcomes,
            &self.heuristics,
        )
    }

    async fn verify(&self, request: &VerificationRequest) -> HypothesisVerdict {
        verifier::verify(request, &self.heuristics)
    }

    async fn find_contradictions(&self, request: &ContradictionRequest) -> ContradictionReport {
        contradictions::find_contradictions(request)
    }

    async fn cross_case(&self, request: &CrossCaseRequest) -> CrossCaseReport {
        cross_case::cross_case(request, &self.heuristics)
    }
}
