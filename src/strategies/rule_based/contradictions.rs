use crate::engine::{
    Contradiction, ContradictionReport, ContradictionRequest, Evidence, Severity, Statement,
};
use crate::patterns::lexicon::{contains_any, ABSENCE_MARKERS, ANTONYM_PAIRS};

const STATEMENT_SUGGESTIONS: &[&str] = &[
    "Vérifier la fiabilité de la source",
    "Vérifier le contexte temporel",
    "Interroger les témoins séparément",
];

const EVIDENCE_SUGGESTIONS: &[&str] = &[
    "Réexaminer les preuves physiques",
    "Vérifier la source de la déclaration",
    "Considérer le timing de la déclaration par rapport à la collecte des preuves",
];

fn suggestions(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Pairwise antonym and absence checks over statements and evidence.
pub fn find_contradictions(request: &ContradictionRequest) -> ContradictionReport {
    let statements = &request.statements;
    let mut contradictions = Vec::new();

    for (i, first) in statements.iter().enumerate() {
        for second in &statements[i + 1..] {
            if let Some(c) = check_statements(first, second) {
                contradictions.push(c);
            }
        }
    }

    for statement in statements {
        for ev in &request.evidence {
            if let Some(c) = check_statement_evidence(statement, ev) {
                contradictions.push(c);
            }
        }
    }

    let n = statements.len();
    let total_comparisons = n * n.saturating_sub(1) / 2 + n * request.evidence.len();
    let consistency_score = if total_comparisons > 0 {
        (1.0 - contradictions.len() as f64 / total_comparisons as f64).max(0.0)
    } else {
        1.0
    };

    let analysis_summary = match contradictions.len() {
        0 => "Aucune contradiction détectée. Toutes les déclarations semblent cohérentes avec les preuves."
            .to_string(),
        count if count <= 2 => format!(
            "Incohérences mineures trouvées ({} contradiction(s)). Révision recommandée.",
            count
        ),
        count => format!(
            "Contradictions significatives détectées ({}). Investigation détaillée requise.",
            count
        ),
    };

    ContradictionReport {
        contradictions,
        consistency_score,
        analysis_summary,
    }
}

fn check_statements(first: &Statement, second: &Statement) -> Option<Contradiction> {
    let a = first.content.to_lowercase();
    let b = second.content.to_lowercase();

    ANTONYM_PAIRS
        .iter()
        .find(|&&(pos, neg)| (a.contains(pos) && b.contains(neg)) || (a.contains(neg) && b.contains(pos)))
        .map(|&(pos, neg)| Contradiction {
            statement_ids: vec![first.id_or("s1").to_string(), second.id_or("s2").to_string()],
            description: format!("Assertions contradictoires : « {} » vs « {} »", pos, neg),
            severity: Severity::Medium,
            resolution_suggestions: suggestions(STATEMENT_SUGGESTIONS),
        })
}

fn check_statement_evidence(statement: &Statement, ev: &Evidence) -> Option<Contradiction> {
    let text = statement.content.to_lowercase();
    if !contains_any(&text, ABSENCE_MARKERS) {
        return None;
    }

    let evidence_type = ev.evidence_type.to_lowercase();
    if evidence_type.is_empty() || !text.contains(&evidence_type) {
        return None;
    }

    let evidence_id = if ev.id.is_empty() { "ev" } else { ev.id.as_str() };
    Some(Contradiction {
        statement_ids: vec![statement.id_or("stmt").to_string(), evidence_id.to_string()],
        description: format!(
            "La déclaration affirme l'absence de {} mais une preuve existe",
            evidence_type
        ),
        severity: Severity::High,
        resolution_suggestions: suggestions(EVIDENCE_SUGGESTIONS),
    })
}
