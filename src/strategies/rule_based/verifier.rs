use std::collections::BTreeSet;

use crate::config::HeuristicsConfig;
use crate::engine::{clamp_confidence, HypothesisVerdict, VerificationRequest};
use crate::patterns::lexicon::{contains_any, NEGATION_MARKERS, TESTIMONY_MARKERS};
use crate::strategies::truncate_chars;

pub const MISSING_PHYSICAL_EVIDENCE: &str = "Des preuves physiques supplémentaires sont nécessaires";
pub const MISSING_TESTIMONY: &str = "Aucun témoignage trouvé dans le contexte";

/// Words shorter than this carry no overlap signal.
const MIN_SIGNIFICANT_CHARS: usize = 4;

fn word_set(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Score a hypothesis by keyword overlap with each evidence description.
pub fn verify(request: &VerificationRequest, heuristics: &HeuristicsConfig) -> HypothesisVerdict {
    let hypothesis_words = word_set(&request.hypothesis.statement);

    let mut supporting_reasons = Vec::new();
    let mut contradicting_reasons = Vec::new();

    for ev in &request.evidence {
        let description = ev.description.to_lowercase();
        let evidence_words = word_set(&description);
        let overlap: Vec<&str> = hypothesis_words
            .intersection(&evidence_words)
            .map(String::as_str)
            .filter(|w| w.chars().count() >= MIN_SIGNIFICANT_CHARS)
            .collect();
        if overlap.is_empty() {
            continue;
        }

        let name = match ev.label() {
            "" => "Preuve inconnue".to_string(),
            label => truncate_chars(label, 80),
        };
        if contains_any(&description, NEGATION_MARKERS) {
            contradicting_reasons.push(format!("« {} » contient des éléments contradictoires", name));
        } else {
            let keywords = overlap.iter().take(3).copied().collect::<Vec<_>>().join(", ");
            supporting_reasons.push(format!("« {} » - mots-clés communs: {}", name, keywords));
        }
    }

    let confidence = if request.evidence.is_empty() {
        0.0
    } else {
        let total = request.evidence.len() as f64;
        let support_ratio = supporting_reasons.len() as f64 / total;
        let contradict_ratio = contradicting_reasons.len() as f64 / total;
        clamp_confidence(support_ratio - contradict_ratio + heuristics.hypothesis_base_offset)
    };

    let is_supported = if request.strict_mode {
        confidence > heuristics.strict_support_threshold && contradicting_reasons.is_empty()
    } else {
        confidence > heuristics.support_threshold
            && supporting_reasons.len() > contradicting_reasons.len()
    };

    let mut missing_evidence = Vec::new();
    if confidence < heuristics.missing_evidence_threshold {
        missing_evidence.push(MISSING_PHYSICAL_EVIDENCE.to_string());
    }
    if !contains_any(&request.case_context.to_lowercase(), TESTIMONY_MARKERS) {
        missing_evidence.push(MISSING_TESTIMONY.to_string());
    }

    let recommendation = if is_supported && confidence > heuristics.strict_support_threshold {
        "L'hypothèse est bien soutenue. Poursuivez l'enquête dans cette direction."
    } else if is_supported {
        "L'hypothèse est prometteuse mais nécessite des preuves supplémentaires pour confirmation."
    } else if confidence > heuristics.inconclusive_threshold {
        "L'hypothèse est non concluante. Envisagez des explications alternatives."
    } else {
        "L'hypothèse n'est pas soutenue par les preuves actuelles. Réévaluez les hypothèses de départ."
    };

    HypothesisVerdict {
        hypothesis_id: request.hypothesis.id.clone(),
        is_supported,
        confidence,
        supporting_reasons,
        contradicting_reasons,
        missing_evidence,
        recommendation: recommendation.to_string(),
    }
}
