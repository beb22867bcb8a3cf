//! Shared keyword tables.
//!
//! Planner, step executor, synthesizer, verifier and contradiction detector
//! all read their bilingual markers from here so the question categories
//! used for planning and for synthesis cannot drift apart.

use serde::{Deserialize, Serialize};

/// Ordered keyword → label dictionary.
///
/// Matching is lowercase substring matching against the scanned text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    entries: &'static [(&'static str, &'static str)],
}

impl KeywordTable {
    /// Wrap a static table.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Labels whose keyword occurs in `text`, in table order, without duplicates.
    pub fn labels_in(&self, text: &str) -> Vec<&'static str> {
        let lowered = text.to_lowercase();
        let mut labels = Vec::new();
        for (keyword, label) in self.entries {
            if lowered.contains(keyword) && !labels.contains(label) {
                labels.push(*label);
            }
        }
        labels
    }

    /// Every entry of the table.
    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }
}

pub const RELATION_KEYWORDS: KeywordTable = KeywordTable::new(&[
    ("complice", "complicité"),
    ("associé", "association"),
    ("employé", "emploi"),
    ("famille", "lien familial"),
    ("ami", "amitié"),
    ("contact", "contact"),
    ("transaction", "transaction financière"),
    ("transfert", "transfert"),
    ("rencontre", "rencontre"),
]);

pub const MOTIVE_KEYWORDS: KeywordTable = KeywordTable::new(&[
    ("argent", "motivation financière"),
    ("dette", "difficultés financières"),
    ("héritage", "intérêt successoral"),
    ("vengeance", "vengeance"),
    ("jalousie", "jalousie"),
    ("conflit", "conflit personnel"),
    ("fraude", "fraude"),
    ("assurance", "fraude à l'assurance"),
    ("million", "enjeu financier important"),
]);

pub const METHOD_KEYWORDS: KeywordTable = KeywordTable::new(&[
    ("poison", "empoisonnement"),
    ("arme", "arme"),
    ("incendie", "incendie criminel"),
    ("effraction", "effraction"),
    ("vol", "vol"),
    ("faux", "falsification"),
    ("piratage", "cybercriminalité"),
    ("transfert", "transfert frauduleux"),
]);

/// Whether `haystack` contains any of `needles` (both compared as given).
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Role markers looked up in the ±3 word window around a capitalized name.
pub const SUSPECT_MARKERS: &[&str] = &["suspect", "accusé", "inculpé", "coupable"];
pub const WITNESS_MARKERS: &[&str] = &["témoin", "witness", "déclare", "affirme"];
pub const VICTIM_MARKERS: &[&str] = &["victime", "victim", "décédé"];

/// Capitalized articles that are never actor names.
pub const ARTICLES: &[&str] = &["Le", "La", "Les", "Un", "Une", "Des"];

/// Evidence phrasing that turns keyword overlap into contradiction.
pub const NEGATION_MARKERS: &[&str] = &["non", "pas", "jamais", "aucun", "impossible"];

/// Statement phrasing that claims something is absent.
pub const ABSENCE_MARKERS: &[&str] = &["aucun", "no "];

/// Case-context markers proving testimony was collected.
pub const TESTIMONY_MARKERS: &[&str] = &["témoin", "witness"];

/// Words that signal a supported verdict in unstructured LLM output.
pub const SUPPORT_VERDICT_MARKERS: &[&str] = &["soutenue", "supported", "confirmée", "valide"];

/// Mutually exclusive assertions checked between statement pairs.
pub const ANTONYM_PAIRS: &[(&str, &str)] = &[
    ("oui", "non"),
    ("yes", "no"),
    ("présent", "absent"),
    ("present", "absent"),
    ("avant", "après"),
    ("before", "after"),
    ("gauche", "droite"),
    ("left", "right"),
];

/// Semantic category of an investigative question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Who,
    When,
    How,
    Why,
    Where,
}

/// A labelled conclusion section, the finding substrings that feed it and
/// the steps whose findings it prefers.
#[derive(Debug, Clone, Copy)]
pub struct ConclusionSection {
    pub label: &'static str,
    pub markers: &'static [&'static str],
    pub steps: &'static [StepKind],
}

impl QuestionCategory {
    /// Evaluation order for planning and synthesis.
    pub const ALL: [QuestionCategory; 5] = [
        QuestionCategory::Who,
        QuestionCategory::When,
        QuestionCategory::How,
        QuestionCategory::Why,
        QuestionCategory::Where,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Who => "who",
            QuestionCategory::When => "when",
            QuestionCategory::How => "how",
            QuestionCategory::Why => "why",
            QuestionCategory::Where => "where",
        }
    }

    /// Bilingual question keywords.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            QuestionCategory::Who => &["qui", "who", "suspect", "responsable", "coupable"],
            QuestionCategory::When => &["quand", "when", "heure", "time", "moment", "chronologie"],
            QuestionCategory::How => &["comment", "how", "méthode", "method", "moyen"],
            QuestionCategory::Why => &["pourquoi", "why", "motif", "motive", "raison"],
            QuestionCategory::Where => &["où", "where", "lieu", "location"],
        }
    }

    /// Steps contributed to a rule-based plan.
    pub fn plan_steps(&self) -> &'static [StepKind] {
        match self {
            QuestionCategory::Who => &[
                StepKind::IdentifyActors,
                StepKind::AnalyzeRelationships,
                StepKind::EvaluateMotives,
            ],
            QuestionCategory::When => &[StepKind::BuildTimeline, StepKind::IdentifyTemporalGaps],
            QuestionCategory::How => &[
                StepKind::AnalyzeMethod,
                StepKind::IdentifyTools,
                StepKind::TraceSequence,
            ],
            QuestionCategory::Why => &[
                StepKind::IdentifyMotives,
                StepKind::AnalyzeBenefits,
                StepKind::EvaluatePsychology,
            ],
            QuestionCategory::Where => &[StepKind::MapLocations, StepKind::AnalyzeMovement],
        }
    }

    /// Conclusion sections assembled by the synthesizer.
    pub fn sections(&self) -> &'static [ConclusionSection] {
        const ACTORS: ConclusionSection = ConclusionSection {
            label: "Acteurs identifiés",
            markers: &["acteur", "suspect"],
            steps: &[StepKind::IdentifyActors],
        };
        const MOTIVES: ConclusionSection = ConclusionSection {
            label: "Mobiles détectés",
            markers: &["mobile", "motif"],
            steps: &[StepKind::EvaluateMotives, StepKind::IdentifyMotives],
        };
        match self {
            QuestionCategory::Who => &[ACTORS, MOTIVES],
            QuestionCategory::When => &[ConclusionSection {
                label: "Chronologie",
                markers: &["temporel", "chronologie"],
                steps: &[StepKind::BuildTimeline, StepKind::IdentifyTemporalGaps],
            }],
            QuestionCategory::How => &[ConclusionSection {
                label: "Mode opératoire",
                markers: &["méthode", "opératoire"],
                steps: &[StepKind::AnalyzeMethod, StepKind::IdentifyTools, StepKind::TraceSequence],
            }],
            QuestionCategory::Why => &[MOTIVES],
            QuestionCategory::Where => &[ConclusionSection {
                label: "Lieux et déplacements",
                markers: &["lieux", "déplacement"],
                steps: &[StepKind::MapLocations, StepKind::AnalyzeMovement],
            }],
        }
    }

    /// Whether the lowercased question mentions this category.
    pub fn matches(&self, question_lower: &str) -> bool {
        contains_any(question_lower, self.keywords())
    }

    /// All categories the question mentions, in evaluation order.
    pub fn classify(question: &str) -> Vec<QuestionCategory> {
        let lowered = question.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|c| c.matches(&lowered))
            .collect()
    }
}

/// Reasoning steps known to the rule-based executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    IdentifyActors,
    AnalyzeRelationships,
    EvaluateMotives,
    BuildTimeline,
    IdentifyTemporalGaps,
    AnalyzeMethod,
    IdentifyTools,
    TraceSequence,
    IdentifyMotives,
    AnalyzeBenefits,
    EvaluatePsychology,
    MapLocations,
    AnalyzeMovement,
    AnalyzeEvidence,
    IdentifyPatterns,
    GenerateHypotheses,
    EvaluateHypotheses,
    SynthesizeConclusions,
}

/// Plan used when the question matches no category.
pub const DEFAULT_RULE_PLAN: &[StepKind] = &[
    StepKind::AnalyzeEvidence,
    StepKind::IdentifyPatterns,
    StepKind::GenerateHypotheses,
];

/// Plan used when the LLM planning response cannot be parsed.
pub const DEFAULT_LLM_PLAN: &[StepKind] = &[
    StepKind::AnalyzeEvidence,
    StepKind::IdentifyActors,
    StepKind::BuildTimeline,
    StepKind::EvaluateHypotheses,
];

impl StepKind {
    const ALL: [StepKind; 18] = [
        StepKind::IdentifyActors,
        StepKind::AnalyzeRelationships,
        StepKind::EvaluateMotives,
        StepKind::BuildTimeline,
        StepKind::IdentifyTemporalGaps,
        StepKind::AnalyzeMethod,
        StepKind::IdentifyTools,
        StepKind::TraceSequence,
        StepKind::IdentifyMotives,
        StepKind::AnalyzeBenefits,
        StepKind::EvaluatePsychology,
        StepKind::MapLocations,
        StepKind::AnalyzeMovement,
        StepKind::AnalyzeEvidence,
        StepKind::IdentifyPatterns,
        StepKind::GenerateHypotheses,
        StepKind::EvaluateHypotheses,
        StepKind::SynthesizeConclusions,
    ];

    /// Wire name of the step.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::IdentifyActors => "identify_actors",
            StepKind::AnalyzeRelationships => "analyze_relationships",
            StepKind::EvaluateMotives => "evaluate_motives",
            StepKind::BuildTimeline => "build_timeline",
            StepKind::IdentifyTemporalGaps => "identify_temporal_gaps",
            StepKind::AnalyzeMethod => "analyze_method",
            StepKind::IdentifyTools => "identify_tools",
            StepKind::TraceSequence => "trace_sequence",
            StepKind::IdentifyMotives => "identify_motives",
            StepKind::AnalyzeBenefits => "analyze_benefits",
            StepKind::EvaluatePsychology => "evaluate_psychology",
            StepKind::MapLocations => "map_locations",
            StepKind::AnalyzeMovement => "analyze_movement",
            StepKind::AnalyzeEvidence => "analyze_evidence",
            StepKind::IdentifyPatterns => "identify_patterns",
            StepKind::GenerateHypotheses => "generate_hypotheses",
            StepKind::EvaluateHypotheses => "evaluate_hypotheses",
            StepKind::SynthesizeConclusions => "synthesize_conclusions",
        }
    }

    /// French display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            StepKind::IdentifyActors => "Identification des acteurs",
            StepKind::AnalyzeRelationships => "Analyse des relations",
            StepKind::EvaluateMotives => "Évaluation des mobiles",
            StepKind::BuildTimeline => "Construction de la chronologie",
            StepKind::IdentifyTemporalGaps => "Identification des lacunes temporelles",
            StepKind::AnalyzeMethod => "Analyse du mode opératoire",
            StepKind::IdentifyTools => "Identification des outils",
            StepKind::TraceSequence => "Reconstitution de la séquence",
            StepKind::IdentifyMotives => "Identification des mobiles",
            StepKind::AnalyzeBenefits => "Analyse des bénéficiaires",
            StepKind::EvaluatePsychology => "Profil psychologique",
            StepKind::MapLocations => "Cartographie des lieux",
            StepKind::AnalyzeMovement => "Analyse des déplacements",
            StepKind::AnalyzeEvidence => "Analyse des preuves",
            StepKind::IdentifyPatterns => "Identification des patterns",
            StepKind::GenerateHypotheses => "Génération d'hypothèses",
            StepKind::EvaluateHypotheses => "Évaluation des hypothèses",
            StepKind::SynthesizeConclusions => "Synthèse des conclusions",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| format!("Unknown reasoning step: {}", s))
    }
}

/// Display name for any step name, known or not.
///
/// Unknown names are shown with underscores replaced and the first letter
/// capitalized.
pub fn step_display_name(step: &str) -> String {
    match step.parse::<StepKind>() {
        Ok(kind) => kind.display_name().to_string(),
        Err(_) => {
            let spaced = step.replace('_', " ");
            let mut chars = spaced.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
