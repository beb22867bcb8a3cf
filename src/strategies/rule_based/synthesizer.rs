use crate::config::HeuristicsConfig;
use crate::engine::ReasoningType;
use crate::patterns::lexicon::{contains_any, ConclusionSection, QuestionCategory, StepKind};
use crate::strategies::{mean_confidence, StepOutcome, Synthesis};

pub const INSUFFICIENT_EVIDENCE: &str = "Preuves insuffisantes pour établir une conclusion.";
pub const LOW_CONFIDENCE_WARNING: &str = "Confiance faible - preuves supplémentaires recommandées";

/// Aggregate step findings into a conclusion tailored to the question.
pub fn synthesize(
    question: &str,
    reasoning_type: ReasoningType,
    outcomes: &[StepOutcome],
    heuristics: &HeuristicsConfig,
) -> Synthesis {
    let Some(confidence) = mean_confidence(outcomes) else {
        return Synthesis {
            conclusion: INSUFFICIENT_EVIDENCE.to_string(),
            confidence: 0.0,
            warnings: vec![LOW_CONFIDENCE_WARNING.to_string()],
            ..Synthesis::default()
        };
    };

    let mut warnings = Vec::new();
    if confidence < heuristics.low_confidence_threshold {
        warnings.push(LOW_CONFIDENCE_WARNING.to_string());
    }

    Synthesis {
        conclusion: conclusion_text(question, reasoning_type, outcomes),
        confidence,
        warnings,
        key_findings: outcomes
            .iter()
            .filter(|o| !o.findings.is_empty())
            .map(|o| o.findings.clone())
            .collect(),
        ..Synthesis::default()
    }
}

fn conclusion_text(question: &str, reasoning_type: ReasoningType, outcomes: &[StepOutcome]) -> String {
    let findings: Vec<&str> = outcomes
        .iter()
        .map(|o| o.findings.as_str())
        .filter(|f| !f.is_empty())
        .collect();
    if findings.is_empty() {
        return "Analyse terminée mais aucun pattern significatif détecté.".to_string();
    }

    let mut parts = Vec::new();
    if let Some(category) = QuestionCategory::classify(question).first() {
        for section in category.sections() {
            if let Some(finding) = section_finding(section, outcomes) {
                parts.push(format!("**{}** : {}", section.label, finding));
            }
        }

        if parts.is_empty() && *category == QuestionCategory::Who {
            parts.push(
                "L'analyse n'a pas permis d'identifier clairement un suspect principal."
                    .to_string(),
            );
            parts.push(
                "Recommandation : approfondir l'analyse des relations et des mobiles.".to_string(),
            );
        }
    }

    if parts.is_empty() {
        parts = findings.iter().map(|f| format!("• {}", f)).collect();
    }

    format!("{}\n\n{}", reasoning_type.conclusion_heading(), parts.join("\n\n"))
}

/// The last finding matching the section's markers, taken from the
/// section's own steps when one of them matched.
fn section_finding<'a>(section: &ConclusionSection, outcomes: &'a [StepOutcome]) -> Option<&'a str> {
    let matching = |o: &&StepOutcome| {
        !o.findings.is_empty() && contains_any(&o.findings.to_lowercase(), section.markers)
    };
    let owned = |o: &&StepOutcome| {
        o.step
            .parse::<StepKind>()
            .is_ok_and(|kind| section.steps.contains(&kind))
    };

    outcomes
        .iter()
        .rev()
        .filter(matching)
        .find(owned)
        .or_else(|| outcomes.iter().rev().find(matching))
        .map(|o| o.findings.as_str())
}
