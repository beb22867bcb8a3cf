//! Centralized prompt definitions for the LLM-hybrid strategy
//!
//! Every prompt asks the completion service for a single JSON object and
//! ends with `JSON:` so that the completion starts with the object itself.
//! Prompts are in French, matching the investigators' working language.

use serde::Serialize;

use crate::engine::{CaseFile, Evidence, Hypothesis, Statement};
use crate::strategies::truncate_chars;

const EVIDENCE_SUMMARY_LIMIT: usize = 10;
const PRIMARY_CASE_CHARS: usize = 2000;
const COMPARISON_CASES_CHARS: usize = 3000;

/// Focus areas used when the caller supplies none.
pub const DEFAULT_CROSS_CASE_FOCUS: &[&str] =
    &["modus_operandi", "entités_communes", "patterns_temporels"];

/// Output contract of the planning prompt.
pub const PLANNING_TASK: &str = r#"## TÂCHE
Génère un plan de raisonnement structuré en JSON avec:
1. "strategy": La stratégie globale de raisonnement (déductif, inductif, abductif)
2. "key_elements": Liste des éléments clés à analyser
3. "reasoning_steps": Liste ordonnée des étapes de raisonnement (max 5)
4. "focus_areas": Domaines prioritaires d'investigation
5. "potential_hypotheses": Hypothèses préliminaires à vérifier

Réponds UNIQUEMENT avec le JSON valide, sans texte avant ou après.

JSON:"#;

/// Output contract of the per-step prompt.
pub const STEP_TASK: &str = r#"Réponds en JSON avec:
1. "premise": La prémisse ou point de départ de cette étape
2. "analysis": L'analyse détaillée effectuée
3. "inference": La conclusion/inférence de cette étape
4. "evidence_used": IDs des preuves utilisées
5. "confidence": Score de confiance (0.0 à 1.0)
6. "next_questions": Questions soulevées pour les étapes suivantes

JSON:"#;

/// Output contract of the synthesis prompt.
pub const SYNTHESIS_TASK: &str = r#"## TÂCHE
Génère la conclusion finale en JSON avec:
1. "conclusion": Conclusion principale répondant à la question
2. "confidence": Score de confiance global (0.0 à 1.0)
3. "key_findings": Liste des découvertes clés
4. "alternative_conclusions": Conclusions alternatives possibles (liste)
5. "warnings": Avertissements ou limitations
6. "recommendations": Recommandations pour l'enquête

JSON:"#;

/// Output contract of the hypothesis verification prompt.
pub const VERIFICATION_TASK: &str = r#"## TÂCHE
Évalue cette hypothèse de façon rigoureuse. Réponds en JSON avec:
1. "is_supported": true/false - L'hypothèse est-elle soutenue?
2. "confidence": Score de confiance (0.0 à 1.0)
3. "supporting_reasons": Liste des raisons qui soutiennent l'hypothèse
4. "contradicting_reasons": Liste des raisons qui contredisent l'hypothèse
5. "missing_evidence": Liste des preuves manquantes pour confirmer/infirmer
6. "recommendation": Recommandation détaillée pour l'enquêteur

JSON:"#;

/// Output contract of the contradiction detection prompt.
pub const CONTRADICTION_TASK: &str = r#"## TÂCHE
Analyse toutes les déclarations et preuves pour détecter les contradictions.
Types de contradictions à chercher:
- Contradictions directes (A dit X, B dit non-X)
- Incohérences temporelles (problèmes de chronologie)
- Contradictions implicites (incompatibilités logiques)
- Conflits avec les preuves physiques

Réponds en JSON avec:
1. "contradictions": Liste des contradictions trouvées, chacune avec:
   - "statement_ids": IDs des déclarations concernées
   - "description": Description de la contradiction
   - "severity": "critique" / "majeure" / "mineure"
   - "resolution_suggestions": Suggestions pour résoudre
2. "consistency_score": Score de cohérence global (0.0 à 1.0)
3. "analysis_summary": Résumé de l'analyse

JSON:"#;

/// Output contract of the cross-case prompt.
pub const CROSS_CASE_TASK: &str = r#"## TÂCHE
Analyse les connexions et patterns entre ces affaires. Réponds en JSON avec:
1. "patterns": Liste des patterns détectés, chacun avec:
   - "pattern_type": Type de pattern (modus_operandi, entité_commune, temporel, géographique)
   - "description": Description détaillée
   - "cases_involved": IDs des affaires concernées
   - "confidence": Score de confiance
   - "significance": "haute" / "moyenne" / "basse"
2. "connections": Connexions directes entre affaires
3. "investigative_leads": Pistes d'investigation suggérées
4. "risk_assessment": Évaluation des risques
5. "summary": Résumé de l'analyse

JSON:"#;

// ============================================================================
// Evidence Formatting
// ============================================================================

/// Numbered one-line-per-item summary, capped at ten items.
pub fn format_evidence_summary(evidence: &[Evidence]) -> String {
    if evidence.is_empty() {
        return "Aucune preuve disponible".to_string();
    }

    let mut lines: Vec<String> = evidence
        .iter()
        .take(EVIDENCE_SUMMARY_LIMIT)
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{}. [{}] {}",
                i + 1,
                e.type_or("inconnu"),
                truncate_chars(&e.description, 100)
            )
        })
        .collect();

    if evidence.len() > EVIDENCE_SUMMARY_LIMIT {
        lines.push(format!(
            "... et {} autres preuves",
            evidence.len() - EVIDENCE_SUMMARY_LIMIT
        ));
    }

    lines.join("\n")
}

/// Full multi-line block per evidence item.
pub fn format_evidence_detail(evidence: &[Evidence]) -> String {
    if evidence.is_empty() {
        return "Aucune preuve disponible".to_string();
    }

    evidence
        .iter()
        .map(|e| {
            format!(
                "- ID: {}\n  Type: {}\n  Description: {}\n  Confiance: {:.0}%",
                if e.id.is_empty() { "unknown" } else { &e.id },
                e.type_or("inconnu"),
                e.description,
                e.confidence * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

// ============================================================================
// Prompt Builders
// ============================================================================

/// High-level planning prompt.
pub fn planning_prompt(context: &str, question: &str, evidence: &[Evidence]) -> String {
    format!(
        "Tu es un système de raisonnement hiérarchique pour l'investigation forensique.\n\n\
         NIVEAU SUPÉRIEUR - PLANIFICATION STRATÉGIQUE\n\n\
         ## Contexte de l'affaire\n{}\n\n\
         ## Question à analyser\n{}\n\n\
         ## Preuves disponibles ({} éléments)\n{}\n\n\
         {}",
        context,
        question,
        evidence.len(),
        format_evidence_summary(evidence),
        PLANNING_TASK
    )
}

/// Detailed execution prompt for one step.
pub fn step_prompt(
    step: &str,
    step_number: usize,
    strategy: &str,
    context: &str,
    evidence: &[Evidence],
) -> String {
    format!(
        "Tu es un système de raisonnement hiérarchique - NIVEAU INFÉRIEUR (exécution détaillée).\n\n\
         ## Étape {}: {}\n\n\
         ## Stratégie globale: {}\n\n\
         ## Contexte\n{}\n\n\
         ## Preuves à analyser\n{}\n\n\
         ## TÂCHE\n\
         Exécute l'étape \"{}\" de façon détaillée. {}",
        step_number,
        step,
        strategy,
        context,
        format_evidence_detail(evidence),
        step,
        STEP_TASK
    )
}

/// Final synthesis prompt over all step inferences.
pub fn synthesis_prompt(
    question: &str,
    strategy: &str,
    inferences: &[String],
    mean_confidence: f64,
) -> String {
    format!(
        "Tu es un système de raisonnement hiérarchique - SYNTHÈSE FINALE.\n\n\
         ## Question originale\n{}\n\n\
         ## Stratégie utilisée\n{}\n\n\
         ## Résultats des étapes de raisonnement\n{}\n\n\
         ## Confiance moyenne: {:.2}\n\n\
         {}",
        question,
        strategy,
        pretty_json(inferences),
        mean_confidence,
        SYNTHESIS_TASK
    )
}

/// Hypothesis verification prompt.
pub fn verification_prompt(
    hypothesis: &Hypothesis,
    evidence: &[Evidence],
    case_context: &str,
    strict_mode: bool,
) -> String {
    format!(
        "Tu es un système de vérification d'hypothèses forensiques utilisant le raisonnement hiérarchique.\n\n\
         ## Hypothèse à vérifier\n\
         ID: {}\n\
         Énoncé: {}\n\
         Confiance initiale: {:.0}%\n\n\
         ## Contexte de l'affaire\n{}\n\n\
         ## Preuves disponibles\n{}\n\n\
         ## Mode d'évaluation: {}\n\n\
         {}",
        hypothesis.id,
        hypothesis.statement,
        hypothesis.confidence * 100.0,
        case_context,
        format_evidence_detail(evidence),
        if strict_mode {
            "STRICT (preuves directes requises)"
        } else {
            "STANDARD"
        },
        VERIFICATION_TASK
    )
}

/// Contradiction detection prompt.
pub fn contradiction_prompt(
    statements: &[Statement],
    evidence: &[Evidence],
    case_context: &str,
) -> String {
    format!(
        "Tu es un système de détection de contradictions forensiques utilisant le raisonnement hiérarchique.\n\n\
         ## Contexte de l'affaire\n{}\n\n\
         ## Déclarations à analyser\n{}\n\n\
         ## Preuves disponibles\n{}\n\n\
         {}",
        case_context,
        pretty_json(statements),
        format_evidence_detail(evidence),
        CONTRADICTION_TASK
    )
}

/// Cross-case analysis prompt. Case JSON is truncated to keep the prompt bounded.
pub fn cross_case_prompt(
    primary_case: &CaseFile,
    comparison_cases: &[CaseFile],
    focus_areas: &[String],
) -> String {
    let focus = if focus_areas.is_empty() {
        DEFAULT_CROSS_CASE_FOCUS.join(", ")
    } else {
        focus_areas.join(", ")
    };

    format!(
        "Tu es un système d'analyse inter-affaires utilisant le raisonnement hiérarchique.\n\n\
         ## Affaire principale\n{}\n\n\
         ## Affaires de comparaison ({} affaires)\n{}\n\n\
         ## Domaines d'analyse prioritaires\n{}\n\n\
         {}",
        truncate_chars(&pretty_json(primary_case), PRIMARY_CASE_CHARS),
        comparison_cases.len(),
        truncate_chars(&pretty_json(comparison_cases), COMPARISON_CASES_CHARS),
        focus,
        CROSS_CASE_TASK
    )
}
