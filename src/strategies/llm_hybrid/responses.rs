//! Conversion of completion responses into typed results.
//!
//! Each `parse_*` function takes the raw completion text. When no JSON
//! object can be extracted, the corresponding fallback structure is built
//! from the raw text instead.

use serde_json::Value;
use tracing::warn;

use crate::config::HeuristicsConfig;
use crate::engine::{
    AlternativeConclusion, CaseConnection, CasePattern, Contradiction, ContradictionReport,
    CrossCaseReport, HypothesisVerdict, RiskAssessment, RiskLevel, Severity, Significance,
};
use crate::patterns::lexicon::{contains_any, DEFAULT_LLM_PLAN, SUPPORT_VERDICT_MARKERS};
use crate::strategies::{
    coerce_to_text, extract_json, field_bool, field_confidence, field_list, field_text,
    truncate_chars, ReasoningPlan, StepOutcome, Synthesis,
};

pub const UNSTRUCTURED_INFERENCE: &str = "Inférence non structurée";
pub const UNSTRUCTURED_RESPONSE_WARNING: &str = "Réponse non structurée";
pub const STRUCTURED_ANALYSIS_REQUIRED: &str = "Analyse structurée requise";
pub const ALTERNATIVE_REASON: &str = "Alternative identifiée";

const ALTERNATIVE_CONFIDENCE: f64 = 0.4;
const MAX_ALTERNATIVES: usize = 3;
const DEFAULT_STEP_CONFIDENCE: f64 = 0.5;

/// First `max_chars` of `response`, or `fallback` when it is empty.
fn excerpt_or(response: &str, max_chars: usize, fallback: &str) -> String {
    if response.is_empty() {
        fallback.to_string()
    } else {
        truncate_chars(response, max_chars)
    }
}

fn extract_or_warn(response: &str, phase: &str) -> Option<Value> {
    match extract_json(response) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(phase, error = %e, "Could not parse LLM response, using fallback");
            None
        }
    }
}

// ============================================================================
// Planning
// ============================================================================

/// Plan used when the planning response cannot be parsed.
pub fn default_plan() -> ReasoningPlan {
    ReasoningPlan {
        strategy: "deductive".to_string(),
        key_elements: vec![
            "preuves".to_string(),
            "témoignages".to_string(),
            "chronologie".to_string(),
        ],
        steps: DEFAULT_LLM_PLAN.iter().map(|s| s.as_str().to_string()).collect(),
        focus_areas: vec![
            "identification".to_string(),
            "chronologie".to_string(),
            "mobiles".to_string(),
        ],
        potential_hypotheses: Vec::new(),
    }
}

pub fn parse_plan(response: &str) -> ReasoningPlan {
    let Some(value) = extract_or_warn(response, "planning") else {
        return default_plan();
    };

    let mut steps = field_list(&value, "reasoning_steps");
    if steps.is_empty() {
        steps.push("analyze_evidence".to_string());
    }

    ReasoningPlan {
        strategy: field_text(&value, "strategy").unwrap_or_else(|| "deductive".to_string()),
        key_elements: field_list(&value, "key_elements"),
        steps,
        focus_areas: field_list(&value, "focus_areas"),
        potential_hypotheses: field_list(&value, "potential_hypotheses"),
    }
}

// ============================================================================
// Step Execution
// ============================================================================

pub fn parse_step(step: &str, response: &str) -> StepOutcome {
    let Some(value) = extract_or_warn(response, "step") else {
        return StepOutcome {
            step: step.to_string(),
            premise: step.to_string(),
            findings: UNSTRUCTURED_INFERENCE.to_string(),
            details: vec![excerpt_or(response, 500, "Analyse non disponible")],
            confidence: DEFAULT_STEP_CONFIDENCE,
            evidence_used: Vec::new(),
        };
    };

    StepOutcome {
        step: step.to_string(),
        premise: field_text(&value, "premise").unwrap_or_else(|| step.to_string()),
        findings: field_text(&value, "inference").unwrap_or_default(),
        details: field_list(&value, "analysis"),
        confidence: field_confidence(&value, "confidence", DEFAULT_STEP_CONFIDENCE),
        evidence_used: field_list(&value, "evidence_used"),
    }
}

// ============================================================================
// Synthesis
// ============================================================================

fn alternative_text(item: &Value) -> String {
    match item.get("conclusion") {
        Some(conclusion) => coerce_to_text(conclusion),
        None => coerce_to_text(item),
    }
}

fn parse_alternatives(value: &Value) -> Vec<AlternativeConclusion> {
    let items = match value.get("alternative_conclusions") {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single.clone()],
    };

    items
        .iter()
        .map(alternative_text)
        .filter(|text| !text.trim().is_empty())
        .take(MAX_ALTERNATIVES)
        .map(|conclusion| AlternativeConclusion {
            conclusion,
            confidence: ALTERNATIVE_CONFIDENCE,
            reason: ALTERNATIVE_REASON.to_string(),
        })
        .collect()
}

/// `mean_confidence` is the mean of the step confidences, used both as the
/// fallback confidence and when the response omits one.
pub fn parse_synthesis(response: &str, mean_confidence: f64) -> Synthesis {
    let Some(value) = extract_or_warn(response, "synthesis") else {
        return Synthesis {
            conclusion: excerpt_or(response, 1000, "Conclusion non disponible"),
            confidence: mean_confidence,
            warnings: vec![UNSTRUCTURED_RESPONSE_WARNING.to_string()],
            ..Synthesis::default()
        };
    };

    Synthesis {
        conclusion: field_text(&value, "conclusion").unwrap_or_default(),
        confidence: field_confidence(&value, "confidence", mean_confidence),
        alternatives: parse_alternatives(&value),
        warnings: field_list(&value, "warnings"),
        key_findings: field_list(&value, "key_findings"),
        recommendations: field_list(&value, "recommendations"),
    }
}

// ============================================================================
// Hypothesis Verification
// ============================================================================

/// Keyword reading of an unstructured verification answer.
pub fn verdict_from_text(hypothesis_id: &str, response: &str) -> HypothesisVerdict {
    let is_supported = contains_any(&response.to_lowercase(), SUPPORT_VERDICT_MARKERS);
    let reason = vec![truncate_chars(response, 200)];
    let (supporting_reasons, contradicting_reasons) = if is_supported {
        (reason, Vec::new())
    } else {
        (Vec::new(), reason)
    };

    HypothesisVerdict {
        hypothesis_id: hypothesis_id.to_string(),
        is_supported,
        confidence: DEFAULT_STEP_CONFIDENCE,
        supporting_reasons,
        contradicting_reasons,
        missing_evidence: vec![STRUCTURED_ANALYSIS_REQUIRED.to_string()],
        recommendation: excerpt_or(response, 500, "Recommandation non disponible"),
    }
}

pub fn parse_verdict(hypothesis_id: &str, response: &str) -> HypothesisVerdict {
    let Some(value) = extract_or_warn(response, "verification") else {
        return verdict_from_text(hypothesis_id, response);
    };

    HypothesisVerdict {
        hypothesis_id: hypothesis_id.to_string(),
        is_supported: field_bool(&value, "is_supported").unwrap_or(false),
        confidence: field_confidence(&value, "confidence", DEFAULT_STEP_CONFIDENCE),
        supporting_reasons: field_list(&value, "supporting_reasons"),
        contradicting_reasons: field_list(&value, "contradicting_reasons"),
        missing_evidence: field_list(&value, "missing_evidence"),
        recommendation: field_text(&value, "recommendation").unwrap_or_default(),
    }
}

// ============================================================================
// Contradictions
// ============================================================================

fn objects<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|item| item.is_object())
}

fn parse_contradiction(item: &Value) -> Contradiction {
    Contradiction {
        statement_ids: field_list(item, "statement_ids"),
        description: field_text(item, "description").unwrap_or_default(),
        severity: Severity::normalize(&field_text(item, "severity").unwrap_or_default()),
        resolution_suggestions: field_list(item, "resolution_suggestions"),
    }
}

pub fn parse_contradictions(response: &str, heuristics: &HeuristicsConfig) -> ContradictionReport {
    let Some(value) = extract_or_warn(response, "contradictions") else {
        return ContradictionReport {
            contradictions: Vec::new(),
            consistency_score: heuristics.llm_fallback_consistency,
            analysis_summary: excerpt_or(response, 500, "Analyse non structurée"),
        };
    };

    ContradictionReport {
        contradictions: objects(&value, "contradictions").map(parse_contradiction).collect(),
        consistency_score: field_confidence(
            &value,
            "consistency_score",
            heuristics.llm_fallback_consistency,
        ),
        analysis_summary: field_text(&value, "analysis_summary").unwrap_or_default(),
    }
}

// ============================================================================
// Cross-Case
// ============================================================================

fn parse_case_pattern(item: &Value) -> CasePattern {
    CasePattern {
        pattern_type: field_text(item, "pattern_type").unwrap_or_default(),
        description: field_text(item, "description").unwrap_or_default(),
        cases_involved: field_list(item, "cases_involved"),
        confidence: field_confidence(item, "confidence", DEFAULT_STEP_CONFIDENCE),
        significance: Significance::normalize(&field_text(item, "significance").unwrap_or_default()),
    }
}

fn parse_connection(item: &Value) -> CaseConnection {
    if !item.is_object() {
        return CaseConnection {
            source_case: String::new(),
            target_case: String::new(),
            connection_type: "direct".to_string(),
            strength: DEFAULT_STEP_CONFIDENCE,
            details: vec![coerce_to_text(item)],
        };
    }

    CaseConnection {
        source_case: field_text(item, "source_case").unwrap_or_default(),
        target_case: field_text(item, "target_case").unwrap_or_default(),
        connection_type: field_text(item, "connection_type")
            .unwrap_or_else(|| "direct".to_string()),
        strength: field_confidence(item, "strength", DEFAULT_STEP_CONFIDENCE),
        details: field_list(item, "details"),
    }
}

fn parse_risk(value: Option<&Value>, pattern_count: usize, connection_count: usize) -> RiskAssessment {
    let count_or = |key: &str, default: usize| {
        value
            .and_then(|v| v.get(key))
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(default)
    };

    let level = match value {
        Some(Value::Object(_)) => value
            .and_then(|v| field_text(v, "level"))
            .map(|label| RiskLevel::normalize(&label))
            .unwrap_or(RiskLevel::Unknown),
        Some(Value::String(label)) => RiskLevel::normalize(label),
        _ => RiskLevel::Unknown,
    };

    RiskAssessment::new(
        level,
        count_or("pattern_count", pattern_count),
        count_or("connection_count", connection_count),
    )
}

pub fn parse_cross_case(response: &str) -> CrossCaseReport {
    let Some(value) = extract_or_warn(response, "cross_case") else {
        return CrossCaseReport {
            patterns: Vec::new(),
            connections: Vec::new(),
            investigative_leads: Vec::new(),
            risk_assessment: RiskAssessment::new(RiskLevel::Unknown, 0, 0),
            summary: excerpt_or(response, 500, "Analyse non structurée"),
        };
    };

    let patterns: Vec<CasePattern> = objects(&value, "patterns").map(parse_case_pattern).collect();
    let connections: Vec<CaseConnection> = value
        .get("connections")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(parse_connection)
        .collect();

    CrossCaseReport {
        risk_assessment: parse_risk(value.get("risk_assessment"), patterns.len(), connections.len()),
        patterns,
        connections,
        investigative_leads: field_list(&value, "investigative_leads"),
        summary: field_text(&value, "summary").unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ========================================================================
    // Plan
    // ========================================================================

    #[test]
    fn test_parse_plan_structured() {
        let plan = parse_plan(
            r#"{"strategy": "abductif", "key_elements": ["alibi"],
                "reasoning_steps": ["analyze_alibi", {"name": "x"}],
                "focus_areas": "mobiles", "potential_hypotheses": []}"#,
        );
        assert_eq!(plan.strategy, "abductif");
        assert_eq!(plan.steps, vec!["analyze_alibi".to_string(), r#"{"name":"x"}"#.to_string()]);
        assert_eq!(plan.focus_areas, vec!["mobiles"]);
    }

    #[test]
    fn test_parse_plan_fallback() {
        let plan = parse_plan("je ne sais pas");
        assert_eq!(plan, default_plan());
        assert_eq!(
            plan.steps,
            vec!["analyze_evidence", "identify_actors", "build_timeline", "evaluate_hypotheses"]
        );
    }

    #[test]
    fn test_parse_plan_without_steps() {
        let plan = parse_plan(r#"{"strategy": "inductive"}"#);
        assert_eq!(plan.steps, vec!["analyze_evidence"]);
    }

    // ========================================================================
    // Step
    // ========================================================================

    #[test]
    fn test_parse_step_coerces_fields() {
        let outcome = parse_step(
            "build_timeline",
            r#"{"premise": ["a", "b"], "analysis": "texte", "inference": {"k": "v"},
                "evidence_used": "e1", "confidence": 0.9}"#,
        );
        assert_eq!(outcome.premise, "a; b");
        assert_eq!(outcome.findings, r#"{"k":"v"}"#);
        assert_eq!(outcome.evidence_used, vec!["e1"]);
        assert_eq!(outcome.details, vec!["texte"]);
        assert_eq!(outcome.confidence, 0.9);
    }

    #[test]
    fn test_parse_step_missing_premise_uses_step_name() {
        let outcome = parse_step("identify_actors", r#"{"inference": "Martin", "confidence": 0.7}"#);
        assert_eq!(outcome.premise, "identify_actors");
        assert_eq!(outcome.findings, "Martin");

        let blank = parse_step("identify_actors", r#"{"premise": "  ", "inference": "Martin"}"#);
        assert_eq!(blank.premise, "identify_actors");
    }

    #[test]
    fn test_parse_step_fallback() {
        let outcome = parse_step("build_timeline", "");
        assert_eq!(outcome.premise, "build_timeline");
        assert_eq!(outcome.findings, UNSTRUCTURED_INFERENCE);
        assert_eq!(outcome.details, vec!["Analyse non disponible"]);
        assert_eq!(outcome.confidence, 0.5);

        let long = "x".repeat(800);
        assert_eq!(parse_step("s", &long).details[0].len(), 500);
    }

    // ========================================================================
    // Synthesis
    // ========================================================================

    #[test]
    fn test_parse_synthesis_alternatives_capped() {
        let synthesis = parse_synthesis(
            r#"{"conclusion": "Martin", "confidence": 0.8,
                "alternative_conclusions": ["a", {"conclusion": "b"}, "c", "d"],
                "warnings": []}"#,
            0.5,
        );
        assert_eq!(synthesis.conclusion, "Martin");
        assert_eq!(synthesis.alternatives.len(), 3);
        assert_eq!(synthesis.alternatives[1].conclusion, "b");
        assert_eq!(synthesis.alternatives[0].confidence, 0.4);
        assert_eq!(synthesis.alternatives[0].reason, ALTERNATIVE_REASON);
    }

    #[test]
    fn test_parse_synthesis_fallback() {
        let synthesis = parse_synthesis("Martin est probablement coupable", 0.65);
        assert_eq!(synthesis.conclusion, "Martin est probablement coupable");
        assert_eq!(synthesis.confidence, 0.65);
        assert_eq!(synthesis.warnings, vec![UNSTRUCTURED_RESPONSE_WARNING]);

        assert_eq!(parse_synthesis("", 0.5).conclusion, "Conclusion non disponible");
    }

    // ========================================================================
    // Verdict
    // ========================================================================

    #[test]
    fn test_parse_verdict_structured() {
        let verdict = parse_verdict(
            "h1",
            r#"{"hypothesis_id": "autre", "is_supported": "oui", "confidence": 0.75,
                "supporting_reasons": ["vidéo"], "recommendation": "Continuer"}"#,
        );
        assert_eq!(verdict.hypothesis_id, "h1");
        assert!(verdict.is_supported);
        assert_eq!(verdict.confidence, 0.75);
        assert_eq!(verdict.recommendation, "Continuer");
    }

    #[test]
    fn test_verdict_text_fallback() {
        let supported = parse_verdict("h1", "L'hypothèse est soutenue par la vidéo.");
        assert!(supported.is_supported);
        assert_eq!(supported.confidence, 0.5);
        assert_eq!(supported.supporting_reasons.len(), 1);
        assert_eq!(supported.missing_evidence, vec![STRUCTURED_ANALYSIS_REQUIRED]);

        let rejected = parse_verdict("h1", "Rien ne permet de conclure.");
        assert!(!rejected.is_supported);
        assert_eq!(rejected.contradicting_reasons, vec!["Rien ne permet de conclure."]);

        assert_eq!(parse_verdict("h1", "").recommendation, "Recommandation non disponible");
    }

    // ========================================================================
    // Contradictions
    // ========================================================================

    #[test]
    fn test_parse_contradictions_normalizes_severity() {
        let report = parse_contradictions(
            r#"{"contradictions": [
                    {"statement_ids": ["s1", "s2"], "description": "heure", "severity": "critique"},
                    {"statement_ids": "s3", "severity": "mineure"},
                    "ignoré"
                ],
                "consistency_score": 0.4, "analysis_summary": "Deux conflits"}"#,
            &HeuristicsConfig::default(),
        );
        assert_eq!(report.contradictions.len(), 2);
        assert_eq!(report.contradictions[0].severity, Severity::Critical);
        assert_eq!(report.contradictions[1].severity, Severity::Low);
        assert_eq!(report.contradictions[1].statement_ids, vec!["s3"]);
        assert_eq!(report.consistency_score, 0.4);
    }

    #[test]
    fn test_parse_contradictions_fallback() {
        let report = parse_contradictions("", &HeuristicsConfig::default());
        assert!(report.contradictions.is_empty());
        assert_eq!(report.consistency_score, 0.7);
        assert_eq!(report.analysis_summary, "Analyse non structurée");
    }

    // ========================================================================
    // Cross-case
    // ========================================================================

    #[test]
    fn test_parse_cross_case_structured() {
        let report = parse_cross_case(
            r#"{"patterns": [{"pattern_type": "modus_operandi", "description": "effraction",
                              "cases_involved": ["A", "B"], "confidence": 0.8, "significance": "haute"}],
                "connections": [{"source_case": "A", "target_case": "B", "strength": 0.6},
                                "Même véhicule"],
                "investigative_leads": ["Vérifier le véhicule"],
                "risk_assessment": {"level": "élevé"},
                "summary": "Série probable"}"#,
        );
        assert_eq!(report.patterns[0].significance, Significance::High);
        assert_eq!(report.connections.len(), 2);
        assert_eq!(report.connections[1].details, vec!["Même véhicule"]);
        assert_eq!(report.risk_assessment.level, RiskLevel::High);
        assert_eq!(report.risk_assessment.pattern_count, 1);
        assert_eq!(report.risk_assessment.connection_count, 2);
        assert_eq!(report.risk_assessment.recommended_priority, "urgent");
    }

    #[test]
    fn test_parse_cross_case_fallback() {
        let report = parse_cross_case("Analyse libre sans structure");
        assert!(report.patterns.is_empty());
        assert_eq!(report.risk_assessment.level, RiskLevel::Unknown);
        assert_eq!(report.summary, "Analyse libre sans structure");
    }

    #[test]
    fn test_parse_risk_string_level() {
        let report = parse_cross_case(r#"{"risk_assessment": "moyen"}"#);
        assert_eq!(report.risk_assessment.level, RiskLevel::Medium);
        assert_eq!(report.risk_assessment.recommended_priority, "normal");
    }
}
