use std::collections::{BTreeMap, BTreeSet};

use crate::engine::Evidence;
use crate::patterns::lexicon::{
    contains_any, step_display_name, KeywordTable, StepKind, ARTICLES, METHOD_KEYWORDS,
    MOTIVE_KEYWORDS, RELATION_KEYWORDS, SUSPECT_MARKERS, VICTIM_MARKERS, WITNESS_MARKERS,
};
use crate::patterns::{extract_patterns, PatternCategory};
use crate::strategies::truncate_chars;

/// Punctuation stripped around candidate names.
const NAME_PUNCTUATION: &[char] = &['.', ',', ';', ':', '(', ')', '"', '\''];

/// Raw output of one rule-based step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFinding {
    pub findings: String,
    pub details: Vec<String>,
    pub confidence: f64,
}

impl StepFinding {
    fn found(findings: String, details: Vec<String>, confidence: f64) -> Self {
        Self {
            findings,
            details,
            confidence,
        }
    }

    fn empty(findings: &str, confidence: f64) -> Self {
        Self {
            findings: findings.to_string(),
            details: Vec::new(),
            confidence,
        }
    }
}

/// Execute a named step over the evidence descriptions.
pub fn execute(step: &str, evidence: &[Evidence]) -> StepFinding {
    match step.parse::<StepKind>() {
        Ok(StepKind::IdentifyActors) => identify_actors(evidence),
        Ok(StepKind::AnalyzeRelationships) => analyze_relationships(evidence),
        Ok(StepKind::EvaluateMotives) | Ok(StepKind::IdentifyMotives) => evaluate_motives(evidence),
        Ok(StepKind::BuildTimeline) => build_timeline(evidence),
        Ok(StepKind::AnalyzeEvidence) => analyze_evidence(evidence),
        Ok(StepKind::AnalyzeMethod) => analyze_method(evidence),
        Ok(StepKind::IdentifyPatterns) => identify_patterns(evidence),
        Ok(StepKind::SynthesizeConclusions) => {
            StepFinding::empty("Synthèse des analyses effectuée.", 0.7)
        }
        _ => StepFinding::empty(
            &format!(
                "Étape « {} » exécutée - analyse complémentaire recommandée.",
                step_display_name(step)
            ),
            0.5,
        ),
    }
}

/// Short excerpts of the first three evidence items.
pub fn evidence_excerpts(evidence: &[Evidence]) -> Vec<String> {
    evidence
        .iter()
        .take(3)
        .map(|e| truncate_chars(e.label(), 40))
        .collect()
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Labels of `table` found in any evidence description, first-seen order.
fn collect_labels(table: &KeywordTable, evidence: &[Evidence]) -> Vec<String> {
    let mut labels = Vec::new();
    for ev in evidence {
        for label in table.labels_in(&ev.description) {
            push_unique(&mut labels, label);
        }
    }
    labels
}

fn is_candidate_name(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase) && word.chars().count() > 2
}

fn identify_actors(evidence: &[Evidence]) -> StepFinding {
    let mut suspects = Vec::new();
    let mut witnesses = Vec::new();
    let mut victims = Vec::new();
    let mut others = Vec::new();

    for ev in evidence {
        let words: Vec<&str> = ev.description.split_whitespace().collect();
        for (i, word) in words.iter().enumerate() {
            let name = word.trim_matches(NAME_PUNCTUATION);
            if !is_candidate_name(name) || ARTICLES.contains(&name) {
                continue;
            }

            let window = words[i.saturating_sub(3)..(i + 4).min(words.len())]
                .join(" ")
                .to_lowercase();
            let role = if contains_any(&window, SUSPECT_MARKERS) {
                &mut suspects
            } else if contains_any(&window, WITNESS_MARKERS) {
                &mut witnesses
            } else if contains_any(&window, VICTIM_MARKERS) {
                &mut victims
            } else {
                &mut others
            };
            push_unique(role, name);
        }
    }

    let listed = |names: &[String], max: usize| names.iter().take(max).cloned().collect::<Vec<_>>().join(", ");

    let mut parts = Vec::new();
    if !suspects.is_empty() {
        parts.push(format!("Suspects identifiés : {}", listed(&suspects, 5)));
    }
    if !witnesses.is_empty() {
        parts.push(format!("Témoins mentionnés : {}", listed(&witnesses, 5)));
    }
    if !victims.is_empty() {
        parts.push(format!("Victimes : {}", listed(&victims, 3)));
    }
    if !others.is_empty() && suspects.is_empty() {
        parts.push(format!("Personnes d'intérêt : {}", listed(&others, 5)));
    }

    if parts.is_empty() {
        return StepFinding::empty("Aucun acteur clairement identifié dans les preuves.", 0.3);
    }

    let details = suspects.into_iter().chain(witnesses).chain(victims).collect();
    StepFinding::found(parts.join(" | "), details, 0.7)
}

fn analyze_relationships(evidence: &[Evidence]) -> StepFinding {
    let relations = collect_labels(&RELATION_KEYWORDS, evidence);
    if relations.is_empty() {
        return StepFinding::empty(
            "Pas de relations explicites détectées entre les acteurs.",
            0.4,
        );
    }
    let shown = relations.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
    StepFinding::found(format!("Relations détectées : {}", shown), relations, 0.65)
}

fn evaluate_motives(evidence: &[Evidence]) -> StepFinding {
    let motives = collect_labels(&MOTIVE_KEYWORDS, evidence);
    if motives.is_empty() {
        return StepFinding::empty(
            "Aucun mobile évident détecté dans les preuves disponibles.",
            0.4,
        );
    }
    StepFinding::found(
        format!("Mobiles potentiels identifiés : {}", motives.join(", ")),
        motives,
        0.7,
    )
}

fn build_timeline(evidence: &[Evidence]) -> StepFinding {
    let mut events = Vec::new();
    for ev in evidence {
        let patterns = extract_patterns(&ev.description);
        if let Some(temporal) = patterns.get(&PatternCategory::Temporal) {
            let name = if ev.description.chars().count() > 50 {
                format!("{}...", truncate_chars(&ev.description, 50))
            } else {
                ev.description.clone()
            };
            let markers = temporal.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
            events.push(format!("« {} » ({})", name, markers));
        }
    }

    if events.is_empty() {
        return StepFinding::empty("Pas de marqueurs temporels clairs dans les preuves.", 0.4);
    }

    let findings = format!("{} événements temporels identifiés", events.len());
    events.truncate(5);
    StepFinding::found(findings, events, 0.75)
}

fn analyze_evidence(evidence: &[Evidence]) -> StepFinding {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for ev in evidence {
        let evidence_type = ev.type_or("autre");
        match counts.iter_mut().find(|(t, _)| t == evidence_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((evidence_type.to_string(), 1)),
        }
    }

    if counts.is_empty() {
        return StepFinding::empty("Preuves analysées : aucune preuve fournie", 0.6);
    }

    let summary = counts
        .iter()
        .map(|(t, n)| format!("{} preuve(s) {}", n, t))
        .collect::<Vec<_>>()
        .join(", ");
    let details = counts.into_iter().map(|(t, _)| t).collect();
    StepFinding::found(format!("Preuves analysées : {}", summary), details, 0.6)
}

fn analyze_method(evidence: &[Evidence]) -> StepFinding {
    let methods = collect_labels(&METHOD_KEYWORDS, evidence);
    if methods.is_empty() {
        return StepFinding::empty("Mode opératoire non clairement identifié.", 0.4);
    }
    StepFinding::found(
        format!("Méthodes/modes opératoires détectés : {}", methods.join(", ")),
        methods,
        0.7,
    )
}

fn identify_patterns(evidence: &[Evidence]) -> StepFinding {
    let mut merged: BTreeMap<PatternCategory, BTreeSet<String>> = BTreeMap::new();
    for ev in evidence {
        for (category, matches) in extract_patterns(&ev.description) {
            merged.entry(category).or_default().extend(matches);
        }
    }

    if merged.is_empty() {
        return StepFinding::empty("Aucun pattern récurrent détecté.", 0.4);
    }

    let summary = merged
        .iter()
        .map(|(category, matches)| format!("{} éléments {}", matches.len(), category.french_plural()))
        .collect::<Vec<_>>()
        .join(", ");
    let details = merged.keys().map(|c| c.as_str().to_string()).collect();
    StepFinding::found(format!("Patterns détectés : {}", summary), details, 0.65)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(id: &str, kind: &str, description: &str) -> Evidence {
        Evidence::new(id, kind, description)
    }

    // ========================================================================
    // identify_actors
    // ========================================================================

    #[test]
    fn test_identify_actors_suspect_within_window() {
        let evidence = vec![ev("e1", "rapport", "Le suspect a rencontré Martin hier soir")];
        let finding = execute("identify_actors", &evidence);

        assert_eq!(finding.confidence, 0.7);
        assert!(finding.details.contains(&"Martin".to_string()));
        assert!(finding.findings.starts_with("Suspects identifiés : Martin"));
    }

    #[test]
    fn test_identify_actors_roles() {
        let evidence = vec![
            ev("e1", "témoignage", "Durand déclare avoir vu une voiture"),
            ev("e2", "autopsie", "La victime, Bernard, présentait des blessures"),
        ];
        let finding = execute("identify_actors", &evidence);

        assert!(finding.findings.contains("Témoins mentionnés : Durand"));
        assert!(finding.findings.contains("Victimes : Bernard"));
        assert_eq!(finding.details, vec!["Durand", "Bernard"]);
    }

    #[test]
    fn test_identify_actors_persons_of_interest_without_suspects() {
        let evidence = vec![ev("e1", "note", "Rendez-vous avec Lambert au port")];
        let finding = execute("identify_actors", &evidence);

        assert!(finding.findings.contains("Personnes d'intérêt : Rendez-vous, Lambert"));
        assert!(finding.details.is_empty());
        assert_eq!(finding.confidence, 0.7);
    }

    #[test]
    fn test_identify_actors_nothing_found() {
        let finding = execute("identify_actors", &[ev("e1", "note", "rien de notable ici")]);
        assert_eq!(finding.findings, "Aucun acteur clairement identifié dans les preuves.");
        assert_eq!(finding.confidence, 0.3);
    }

    #[test]
    fn test_identify_actors_skips_articles() {
        let finding = execute("identify_actors", &[ev("e1", "note", "Les suspects sont partis")]);
        assert_eq!(finding.confidence, 0.3);
    }

    // ========================================================================
    // Keyword steps
    // ========================================================================

    #[test]
    fn test_analyze_relationships() {
        let evidence = vec![ev("e1", "bancaire", "Transaction entre le complice et son associé")];
        let finding = execute("analyze_relationships", &evidence);
        assert_eq!(
            finding.findings,
            "Relations détectées : complicité, association, transaction financière"
        );
        assert_eq!(finding.confidence, 0.65);

        let none = execute("analyze_relationships", &[]);
        assert_eq!(none.confidence, 0.4);
    }

    #[test]
    fn test_motives_shared_by_both_step_names() {
        let evidence = vec![ev("e1", "document", "Une dette de jeu et un héritage contesté")];
        let evaluate = execute("evaluate_motives", &evidence);
        let identify = execute("identify_motives", &evidence);

        assert_eq!(evaluate, identify);
        assert_eq!(
            evaluate.findings,
            "Mobiles potentiels identifiés : difficultés financières, intérêt successoral"
        );
        assert_eq!(evaluate.confidence, 0.7);
    }

    #[test]
    fn test_analyze_method() {
        let evidence = vec![ev("e1", "constat", "Traces d'effraction sur la porte")];
        let finding = execute("analyze_method", &evidence);
        assert_eq!(finding.details, vec!["effraction"]);
        assert_eq!(finding.confidence, 0.7);

        let none = execute("analyze_method", &[ev("e2", "note", "RAS")]);
        assert_eq!(none.findings, "Mode opératoire non clairement identifié.");
        assert_eq!(none.confidence, 0.4);
    }

    // ========================================================================
    // Pattern steps
    // ========================================================================

    #[test]
    fn test_build_timeline() {
        let evidence = vec![
            ev("e1", "vidéo", "Caméra : individu entré à 22:15"),
            ev("e2", "note", "aucune indication"),
        ];
        let finding = execute("build_timeline", &evidence);
        assert_eq!(finding.findings, "1 événements temporels identifiés");
        assert_eq!(finding.details, vec!["« Caméra : individu entré à 22:15 » (22:15)"]);
        assert_eq!(finding.confidence, 0.75);
    }

    #[test]
    fn test_build_timeline_truncates_long_descriptions() {
        let long = format!("{} à 10:00", "x".repeat(60));
        let finding = execute("build_timeline", &[ev("e1", "note", &long)]);
        assert!(finding.details[0].starts_with(&format!("« {}... »", "x".repeat(50))));
    }

    #[test]
    fn test_analyze_evidence_counts_types() {
        let evidence = vec![
            ev("e1", "ADN", "a"),
            ev("e2", "témoignage", "b"),
            ev("e3", "ADN", "c"),
            ev("e4", "", "d"),
        ];
        let finding = execute("analyze_evidence", &evidence);
        assert_eq!(
            finding.findings,
            "Preuves analysées : 2 preuve(s) ADN, 1 preuve(s) témoignage, 1 preuve(s) autre"
        );
        assert_eq!(finding.confidence, 0.6);
    }

    #[test]
    fn test_identify_patterns() {
        let evidence = vec![
            ev("e1", "note", "Vu avant minuit par un témoin"),
            ev("e2", "note", "Parti après le témoin"),
        ];
        let finding = execute("identify_patterns", &evidence);
        assert_eq!(
            finding.findings,
            "Patterns détectés : 2 éléments temporels, 1 éléments probatoires"
        );
        assert_eq!(finding.details, vec!["temporal", "evidential"]);
    }

    // ========================================================================
    // Fixed and generic steps
    // ========================================================================

    #[test]
    fn test_synthesize_and_generic_steps() {
        let synth = execute("synthesize_conclusions", &[]);
        assert_eq!(synth.findings, "Synthèse des analyses effectuée.");
        assert_eq!(synth.confidence, 0.7);

        let generic = execute("map_locations", &[]);
        assert_eq!(
            generic.findings,
            "Étape « Cartographie des lieux » exécutée - analyse complémentaire recommandée."
        );
        assert_eq!(generic.confidence, 0.5);

        let unknown = execute("check_alibis", &[]);
        assert!(unknown.findings.contains("« Check alibis »"));
    }

    #[test]
    fn test_evidence_excerpts() {
        let evidence = vec![
            ev("e1", "note", &"a".repeat(60)),
            ev("e2", "note", ""),
            ev("e3", "note", "court"),
            ev("e4", "note", "ignoré"),
        ];
        assert_eq!(
            evidence_excerpts(&evidence),
            vec!["a".repeat(40), "e2".to_string(), "court".to_string()]
        );
    }
}
