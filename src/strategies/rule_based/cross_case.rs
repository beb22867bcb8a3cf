use std::collections::BTreeSet;

use crate::config::HeuristicsConfig;
use crate::engine::{
    clamp_confidence, CaseConnection, CaseFile, CasePattern, CrossCaseReport, CrossCaseRequest,
    RiskAssessment, RiskLevel, Significance,
};
use crate::patterns::{pattern_categories, PatternCategory};

const MAX_KEYWORDS: usize = 20;
const MAX_SHARED_KEYWORDS: usize = 5;

pub const ORGANIZED_ACTIVITY_LEAD: &str =
    "Plusieurs connexions entre affaires suggèrent une activité organisée - recommandation: groupe d'enquête";

/// Comparable feature bag of one case.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaseFeatures {
    pub case_type: String,
    pub keywords: BTreeSet<String>,
    pub entities: BTreeSet<String>,
    pub patterns: BTreeSet<PatternCategory>,
}

/// Extract the feature bag of a case.
///
/// Keywords are the first words longer than four characters of the
/// description, entities the evidence types, patterns the categories found
/// in timeline event descriptions.
pub fn extract_case_features(case: &CaseFile) -> CaseFeatures {
    CaseFeatures {
        case_type: case.type_or("unknown").to_string(),
        keywords: case
            .description
            .split_whitespace()
            .filter(|w| w.chars().count() > 4)
            .take(MAX_KEYWORDS)
            .map(str::to_lowercase)
            .collect(),
        entities: case
            .evidence
            .iter()
            .map(|e| e.type_or("unknown").to_string())
            .collect(),
        patterns: case
            .timeline
            .iter()
            .flat_map(|event| pattern_categories(&event.description))
            .collect(),
    }
}

/// Tagged features shared by two cases.
pub fn common_features(a: &CaseFeatures, b: &CaseFeatures) -> Vec<String> {
    let mut common = Vec::new();
    if a.case_type == b.case_type {
        common.push(format!("same_type:{}", a.case_type));
    }
    common.extend(
        a.keywords
            .intersection(&b.keywords)
            .take(MAX_SHARED_KEYWORDS)
            .map(|k| format!("keyword:{}", k)),
    );
    common.extend(a.entities.intersection(&b.entities).map(|e| format!("entity:{}", e)));
    common.extend(a.patterns.intersection(&b.patterns).map(|p| format!("pattern:{}", p)));
    common
}

/// Compare the primary case with each comparison case.
pub fn cross_case(request: &CrossCaseRequest, heuristics: &HeuristicsConfig) -> CrossCaseReport {
    let primary_id = request.primary_case.id_or("primary");
    let primary_features = extract_case_features(&request.primary_case);

    let mut patterns = Vec::new();
    let mut connections = Vec::new();
    let mut investigative_leads = Vec::new();

    for case in &request.comparison_cases {
        let case_id = case.id_or("comparison");
        let common = common_features(&primary_features, &extract_case_features(case));
        if common.is_empty() {
            continue;
        }

        let count = common.len();
        patterns.push(CasePattern {
            pattern_type: "common_features".to_string(),
            description: format!(
                "Shared characteristics between cases: {}",
                common.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
            ),
            cases_involved: vec![primary_id.to_string(), case_id.to_string()],
            confidence: clamp_confidence(heuristics.cross_case_confidence_cap.min(
                heuristics.cross_case_base_confidence
                    + heuristics.cross_case_feature_increment * count as f64,
            )),
            significance: if count > heuristics.high_significance_features {
                Significance::High
            } else {
                Significance::Medium
            },
        });

        if count > heuristics.lead_feature_threshold {
            investigative_leads.push(format!(
                "Enquêter sur la connexion entre {} et {} - {} caractéristiques communes",
                primary_id, case_id, count
            ));
        }

        connections.push(CaseConnection {
            source_case: primary_id.to_string(),
            target_case: case_id.to_string(),
            connection_type: "pattern_match".to_string(),
            strength: count as f64 / heuristics.connection_strength_divisor,
            details: common,
        });
    }

    let level = if patterns.len() > heuristics.high_risk_patterns {
        investigative_leads.push(ORGANIZED_ACTIVITY_LEAD.to_string());
        RiskLevel::High
    } else if patterns.len() > heuristics.medium_risk_patterns {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let summary = if patterns.is_empty() {
        "Aucun pattern significatif trouvé dans les affaires analysées.".to_string()
    } else {
        format!(
            "L'analyse a identifié {} patterns et {} connexions sur {} affaires.",
            patterns.len(),
            connections.len(),
            request.comparison_cases.len() + 1
        )
    };

    CrossCaseReport {
        risk_assessment: RiskAssessment::new(level, patterns.len(), connections.len()),
        patterns,
        connections,
        investigative_leads,
        summary,
    }
}
