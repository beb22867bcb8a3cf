//! LLM-hybrid strategy.
//!
//! Every contract is one structured-JSON prompt to the completion service.
//! An unreachable service yields an empty completion, which takes the same
//! fallback path as malformed output.

mod responses;

pub use responses::{
    default_plan, verdict_from_text, ALTERNATIVE_REASON, STRUCTURED_ANALYSIS_REQUIRED,
    UNSTRUCTURED_INFERENCE, UNSTRUCTURED_RESPONSE_WARNING,
};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{mean_confidence, ReasoningPlan, ReasoningStrategy, StepOutcome, StrategyKind, Synthesis};
use crate::config::HeuristicsConfig;
use crate::engine::{
    ContradictionReport, ContradictionRequest, CrossCaseReport, CrossCaseRequest,
    HypothesisVerdict, ReasoningRequest, VerificationRequest,
};
use crate::llm::TextCompletion;
use crate::prompts;

/// Strategy backed by a [`TextCompletion`] provider.
#[derive(Clone)]
pub struct LlmHybridStrategy {
    llm: Arc<dyn TextCompletion>,
    heuristics: HeuristicsConfig,
}

impl LlmHybridStrategy {
    pub fn new(llm: Arc<dyn TextCompletion>, heuristics: HeuristicsConfig) -> Self {
        Self { llm, heuristics }
    }

    async fn complete(&self, phase: &str, prompt: String) -> String {
        debug!(phase, prompt_chars = prompt.chars().count(), "Sending prompt");
        let response = self.llm.generate(&prompt).await;
        debug!(phase, response_chars = response.chars().count(), "Received completion");
        response
    }
}

impl std::fmt::Debug for LlmHybridStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmHybridStrategy")
            .field("heuristics", &self.heuristics)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReasoningStrategy for LlmHybridStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LlmHybrid
    }

    async fn plan(&self, request: &ReasoningRequest) -> ReasoningPlan {
        info!("High-level planning");
        let prompt = prompts::planning_prompt(&request.context, &request.question, &request.evidence);
        let mut plan = responses::parse_plan(&self.complete("planning", prompt).await);
        plan.strategy = request.reasoning_type.as_str().to_string();
        plan
    }

    async fn execute_step(
        &self,
        step: &str,
        step_number: usize,
        plan: &ReasoningPlan,
        request: &ReasoningRequest,
    ) -> StepOutcome {
        let prompt = prompts::step_prompt(
            step,
            step_number,
            &plan.strategy,
            &request.context,
            &request.evidence,
        );
        responses::parse_step(step, &self.complete("step", prompt).await)
    }

    async fn synthesize(
        &self,
        request: &ReasoningRequest,
        plan: &ReasoningPlan,
        outcomes: &[StepOutcome],
    ) -> Synthesis {
        info!(steps = outcomes.len(), "Synthesis");
        let mean = mean_confidence(outcomes).unwrap_or(0.5);
        let inferences: Vec<String> = outcomes.iter().map(|o| o.findings.clone()).collect();
        let prompt = prompts::synthesis_prompt(&request.question, &plan.strategy, &inferences, mean);
        responses::parse_synthesis(&self.complete("synthesis", prompt).await, mean)
    }

    async fn verify(&self, request: &VerificationRequest) -> HypothesisVerdict {
        let prompt = prompts::verification_prompt(
            &request.hypothesis,
            &request.evidence,
            &request.case_context,
            request.strict_mode,
        );
        responses::parse_verdict(
            &request.hypothesis.id,
            &self.complete("verification", prompt).await,
        )
    }

    async fn find_contradictions(&self, request: &ContradictionRequest) -> ContradictionReport {
        let prompt = prompts::contradiction_prompt(
            &request.statements,
            &request.evidence,
            &request.case_context,
        );
        responses::parse_contradictions(
            &self.complete("contradictions", prompt).await,
            &self.heuristics,
        )
    }

    async fn cross_case(&self, request: &CrossCaseRequest) -> CrossCaseReport {
        let prompt = prompts::cross_case_prompt(
            &request.primary_case,
            &request.comparison_cases,
            &request.focus_areas,
        );
        responses::parse_cross_case(&self.complete("cross_case", prompt).await)
    }

    async fn is_available(&self) -> bool {
        self.llm.is_available().await
    }
}
