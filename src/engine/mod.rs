//! Hierarchical reasoning engine.
//!
//! [`HierarchicalEngine`] runs the plan → execute → synthesize pipeline over
//! an injected [`ReasoningStrategy`] and memoizes `reason` results in a
//! bounded [`ReasoningCache`]. Every operation is infallible: degraded inputs
//! and unreachable services produce low-confidence results, never errors.

mod cache;
mod types;

pub use cache::*;
pub use types::*;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppResult;
use crate::llm::CompletionClient;
use crate::strategies::{
    LlmHybridStrategy, ReasoningPlan, ReasoningStrategy, RuleBasedStrategy, StepOutcome,
    StrategyKind, Synthesis, INSUFFICIENT_EVIDENCE, LOW_CONFIDENCE_WARNING,
};

/// Entry point of the four reasoning operations.
pub struct HierarchicalEngine {
    strategy: Arc<dyn ReasoningStrategy>,
    cache: Arc<ReasoningCache>,
    max_depth_ceiling: usize,
}

impl HierarchicalEngine {
    /// Create an engine over `strategy`. `max_depth_ceiling` is raised to 1 if zero.
    pub fn new(
        strategy: Arc<dyn ReasoningStrategy>,
        cache: Arc<ReasoningCache>,
        max_depth_ceiling: usize,
    ) -> Self {
        Self {
            strategy,
            cache,
            max_depth_ceiling: max_depth_ceiling.max(1),
        }
    }

    /// Build the strategy, completion client and cache described by `config`.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let strategy: Arc<dyn ReasoningStrategy> = match config.engine.strategy {
            StrategyKind::RuleBased => {
                Arc::new(RuleBasedStrategy::new(config.heuristics.clone()))
            }
            StrategyKind::LlmHybrid => {
                let client = CompletionClient::new(&config.llm)?;
                Arc::new(LlmHybridStrategy::new(
                    Arc::new(client),
                    config.heuristics.clone(),
                ))
            }
        };

        info!(
            strategy = %config.engine.strategy,
            cache_enabled = config.cache.enabled,
            max_depth_ceiling = config.engine.max_depth_ceiling,
            "Reasoning engine initialized"
        );

        Ok(Self::new(
            strategy,
            Arc::new(ReasoningCache::from_config(&config.cache)),
            config.engine.max_depth_ceiling,
        ))
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn max_depth_ceiling(&self) -> usize {
        self.max_depth_ceiling
    }

    pub fn cache(&self) -> &ReasoningCache {
        &self.cache
    }

    /// Whether the strategy's backing service answers its health probe.
    pub async fn is_available(&self) -> bool {
        self.strategy.is_available().await
    }

    // ========================================================================
    // reason
    // ========================================================================

    /// Plan, execute at most `max_depth` steps, then synthesize.
    ///
    /// Identical requests are answered from the cache without touching the
    /// strategy.
    pub async fn reason(&self, request: ReasoningRequest) -> ReasoningResult {
        let mut request = request;
        request.max_depth = request.max_depth.clamp(1, self.max_depth_ceiling);

        let key = ReasoningCache::key_for(&request, self.strategy.kind());
        let request_id = Uuid::new_v4();
        let start = Instant::now();

        let (result, cached) = self
            .cache
            .get_or_compute(&key, self.run_pipeline(request_id, &request))
            .await;

        info!(
            request_id = %request_id,
            cached,
            steps = result.reasoning_chain.len(),
            confidence = result.confidence,
            latency_ms = start.elapsed().as_millis() as u64,
            "Reasoning completed"
        );
        result
    }

    async fn run_pipeline(&self, request_id: Uuid, request: &ReasoningRequest) -> ReasoningResult {
        debug!(request_id = %request_id, "Phase 1: high-level planning");
        let mut plan = self.strategy.plan(request).await;
        plan.steps.truncate(request.max_depth);

        if plan.steps.is_empty() {
            return self.empty_plan_result(&plan);
        }

        debug!(request_id = %request_id, steps = plan.steps.len(), "Phase 2: step execution");
        let mut outcomes = Vec::with_capacity(plan.steps.len());
        for (index, step) in plan.steps.iter().enumerate() {
            let outcome = self
                .strategy
                .execute_step(step, index + 1, &plan, request)
                .await;
            outcomes.push(outcome);
        }

        debug!(request_id = %request_id, "Phase 3: synthesis");
        let synthesis = self.strategy.synthesize(request, &plan, &outcomes).await;

        self.assemble(plan, outcomes, synthesis)
    }

    fn metadata(&self, plan: &ReasoningPlan) -> ReasoningMetadata {
        ReasoningMetadata {
            planning_strategy: plan.strategy.clone(),
            focus_areas: plan.focus_areas.clone(),
            model_type: self.strategy.kind().as_str().to_string(),
        }
    }

    fn empty_plan_result(&self, plan: &ReasoningPlan) -> ReasoningResult {
        ReasoningResult {
            conclusion: INSUFFICIENT_EVIDENCE.to_string(),
            confidence: 0.0,
            reasoning_chain: Vec::new(),
            alternative_conclusions: Vec::new(),
            warnings: vec![LOW_CONFIDENCE_WARNING.to_string()],
            metadata: self.metadata(plan),
        }
    }

    fn assemble(
        &self,
        plan: ReasoningPlan,
        outcomes: Vec<StepOutcome>,
        synthesis: Synthesis,
    ) -> ReasoningResult {
        let reasoning_chain = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| ReasoningStep {
                step_number: index + 1,
                premise: outcome.premise,
                inference: outcome.findings,
                confidence: clamp_confidence(outcome.confidence),
                evidence_used: outcome.evidence_used,
            })
            .collect();

        let alternative_conclusions = synthesis
            .alternatives
            .into_iter()
            .map(|alternative| AlternativeConclusion {
                confidence: clamp_confidence(alternative.confidence),
                ..alternative
            })
            .collect();

        ReasoningResult {
            conclusion: synthesis.conclusion,
            confidence: clamp_confidence(synthesis.confidence),
            reasoning_chain,
            alternative_conclusions,
            warnings: synthesis.warnings,
            metadata: self.metadata(&plan),
        }
    }

    // ========================================================================
    // Single-shot operations
    // ========================================================================

    pub async fn verify_hypothesis(&self, request: VerificationRequest) -> HypothesisVerdict {
        let mut verdict = self.strategy.verify(&request).await;
        verdict.confidence = clamp_confidence(verdict.confidence);

        info!(
            hypothesis_id = %verdict.hypothesis_id,
            is_supported = verdict.is_supported,
            confidence = verdict.confidence,
            "Hypothesis verified"
        );
        verdict
    }

    pub async fn find_contradictions(&self, request: ContradictionRequest) -> ContradictionReport {
        let mut report = self.strategy.find_contradictions(&request).await;
        report.consistency_score = clamp_confidence(report.consistency_score);

        info!(
            statements = request.statements.len(),
            contradictions = report.contradictions.len(),
            consistency_score = report.consistency_score,
            "Contradiction analysis completed"
        );
        report
    }

    pub async fn cross_case_reasoning(&self, request: CrossCaseRequest) -> CrossCaseReport {
        let mut report = self.strategy.cross_case(&request).await;
        for pattern in &mut report.patterns {
            pattern.confidence = clamp_confidence(pattern.confidence);
        }
        for connection in &mut report.connections {
            connection.strength = clamp_confidence(connection.strength);
        }

        info!(
            comparison_cases = request.comparison_cases.len(),
            patterns = report.patterns.len(),
            risk = report.risk_assessment.level.as_str(),
            "Cross-case analysis completed"
        );
        report
    }
}

impl std::fmt::Debug for HierarchicalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalEngine")
            .field("strategy", &self.strategy.kind())
            .field("cache", &self.cache)
            .field("max_depth_ceiling", &self.max_depth_ceiling)
            .finish()
    }
}
