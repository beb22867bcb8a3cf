use tracing::debug;

use crate::engine::ReasoningRequest;
use crate::patterns::lexicon::{QuestionCategory, StepKind, DEFAULT_RULE_PLAN};
use crate::strategies::ReasoningPlan;

/// Build a plan from the question's keyword categories.
///
/// Steps accumulate in category order; with no category the default triple
/// is used. `synthesize_conclusions` always closes the plan. Truncation to
/// `max_depth` is left to the engine.
pub fn plan(request: &ReasoningRequest) -> ReasoningPlan {
    let categories = QuestionCategory::classify(&request.question);

    let mut steps: Vec<StepKind> = categories
        .iter()
        .flat_map(|c| c.plan_steps().iter().copied())
        .collect();
    if steps.is_empty() {
        steps.extend_from_slice(DEFAULT_RULE_PLAN);
    }
    steps.push(StepKind::SynthesizeConclusions);

    debug!(
        categories = ?categories,
        steps = steps.len(),
        "Rule-based plan built"
    );

    ReasoningPlan {
        strategy: request.reasoning_type.as_str().to_string(),
        key_elements: Vec::new(),
        steps: steps.iter().map(|s| s.as_str().to_string()).collect(),
        focus_areas: categories.iter().map(|c| c.as_str().to_string()).collect(),
        potential_hypotheses: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReasoningType;

    fn steps_for(question: &str) -> Vec<String> {
        plan(&ReasoningRequest::new("Affaire", question)).steps
    }

    #[test]
    fn test_who_question() {
        assert_eq!(
            steps_for("Qui est responsable ?"),
            vec![
                "identify_actors",
                "analyze_relationships",
                "evaluate_motives",
                "synthesize_conclusions"
            ]
        );
    }

    #[test]
    fn test_combined_who_and_when() {
        let steps = steps_for("Qui était là et à quelle heure ?");
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[0], "identify_actors");
        assert_eq!(steps[3], "build_timeline");
        assert_eq!(steps[4], "identify_temporal_gaps");
        assert_eq!(steps[5], "synthesize_conclusions");
    }

    #[test]
    fn test_where_question() {
        assert_eq!(
            steps_for("Où se trouvait l'arme ?"),
            vec!["map_locations", "analyze_movement", "synthesize_conclusions"]
        );
    }

    #[test]
    fn test_default_plan() {
        assert_eq!(
            steps_for("Analysez ce dossier"),
            vec![
                "analyze_evidence",
                "identify_patterns",
                "generate_hypotheses",
                "synthesize_conclusions"
            ]
        );
    }

    #[test]
    fn test_plan_metadata() {
        let request = ReasoningRequest::new("Affaire", "Pourquoi ce vol ?")
            .with_reasoning_type(ReasoningType::Abductive);
        let plan = plan(&request);
        assert_eq!(plan.strategy, "abductive");
        assert_eq!(plan.focus_areas, vec!["why"]);
    }
}
