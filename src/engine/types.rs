use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Clamp a confidence value into `[0.0, 1.0]`. NaN becomes 0.0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Null falls back to the default confidence; anything else is clamped.
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map_or_else(default_confidence, clamp_confidence))
}

fn default_confidence() -> f64 {
    0.5
}

fn default_max_depth() -> usize {
    3
}

// ============================================================================
// Reasoning Type
// ============================================================================

/// Kind of reasoning requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningType {
    #[default]
    Deductive,
    Inductive,
    Abductive,
    Analogical,
}

impl ReasoningType {
    pub const ALL: [ReasoningType; 4] = [
        ReasoningType::Deductive,
        ReasoningType::Inductive,
        ReasoningType::Abductive,
        ReasoningType::Analogical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningType::Deductive => "deductive",
            ReasoningType::Inductive => "inductive",
            ReasoningType::Abductive => "abductive",
            ReasoningType::Analogical => "analogical",
        }
    }

    /// Heading placed before a rule-based conclusion.
    pub fn conclusion_heading(&self) -> &'static str {
        match self {
            ReasoningType::Deductive => "**Conclusion (raisonnement déductif)** :",
            ReasoningType::Inductive => "**Conclusion (raisonnement inductif)** :",
            ReasoningType::Abductive => "**Conclusion (meilleure explication)** :",
            ReasoningType::Analogical => "**Conclusion (raisonnement analogique)** :",
        }
    }
}

impl std::fmt::Display for ReasoningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReasoningType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deductive" | "déductif" => Ok(ReasoningType::Deductive),
            "inductive" | "inductif" => Ok(ReasoningType::Inductive),
            "abductive" | "abductif" => Ok(ReasoningType::Abductive),
            "analogical" | "analogique" => Ok(ReasoningType::Analogical),
            _ => Err(format!("Unknown reasoning type: {}", s)),
        }
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// A typed, confidence-scored fact fragment supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub evidence_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default = "default_confidence",
        deserialize_with = "deserialize_confidence"
    )]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl Evidence {
    pub fn new(
        id: impl Into<String>,
        evidence_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            evidence_type: evidence_type.into(),
            description: description.into(),
            confidence: default_confidence(),
            metadata: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_confidence(confidence);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }

    /// Evidence type, or `fallback` when none was given.
    pub fn type_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.evidence_type.is_empty() {
            fallback
        } else {
            &self.evidence_type
        }
    }

    /// Description, or the id when the description is empty.
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.id
        } else {
            &self.description
        }
    }
}

/// A candidate explanation to verify against evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: String,
    pub statement: String,
    #[serde(default)]
    pub supporting_evidence: Vec<String>,
    #[serde(default)]
    pub contradicting_evidence: Vec<String>,
    #[serde(
        default = "default_confidence",
        deserialize_with = "deserialize_confidence"
    )]
    pub confidence: f64,
}

impl Hypothesis {
    pub fn new(id: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            statement: statement.into(),
            supporting_evidence: Vec::new(),
            contradicting_evidence: Vec::new(),
            confidence: default_confidence(),
        }
    }
}

/// A witness or suspect statement. `text` is accepted for `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "text")]
    pub content: String,
}

impl Statement {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            content: content.into(),
        }
    }

    pub fn id_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.id.as_deref().unwrap_or(fallback)
    }
}

/// One dated event of a case timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A case file as compared by cross-case reasoning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CaseFile {
    pub fn new(id: impl Into<String>, case_type: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            case_type: Some(case_type.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_event(mut self, description: impl Into<String>) -> Self {
        self.timeline.push(TimelineEvent {
            description: description.into(),
            extra: BTreeMap::new(),
        });
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    pub fn id_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.id.as_deref().unwrap_or(fallback)
    }

    pub fn type_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.case_type.as_deref().unwrap_or(fallback)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Input of `reason`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningRequest {
    pub context: String,
    pub question: String,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub reasoning_type: ReasoningType,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl ReasoningRequest {
    pub fn new(context: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            question: question.into(),
            evidence: Vec::new(),
            reasoning_type: ReasoningType::default(),
            max_depth: default_max_depth(),
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_reasoning_type(mut self, reasoning_type: ReasoningType) -> Self {
        self.reasoning_type = reasoning_type;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Input of `verify_hypothesis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub hypothesis: Hypothesis,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub case_context: String,
    #[serde(default)]
    pub strict_mode: bool,
}

impl VerificationRequest {
    pub fn new(hypothesis: Hypothesis, evidence: Vec<Evidence>) -> Self {
        Self {
            hypothesis,
            evidence,
            case_context: String::new(),
            strict_mode: false,
        }
    }

    pub fn with_case_context(mut self, case_context: impl Into<String>) -> Self {
        self.case_context = case_context.into();
        self
    }

    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }
}

/// Input of `find_contradictions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionRequest {
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub case_context: String,
}

impl ContradictionRequest {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            evidence: Vec::new(),
            case_context: String::new(),
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_case_context(mut self, case_context: impl Into<String>) -> Self {
        self.case_context = case_context.into();
        self
    }
}

/// Input of `cross_case_reasoning`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCaseRequest {
    pub primary_case: CaseFile,
    pub comparison_cases: Vec<CaseFile>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
}

impl CrossCaseRequest {
    pub fn new(primary_case: CaseFile, comparison_cases: Vec<CaseFile>) -> Self {
        Self {
            primary_case,
            comparison_cases,
            focus_areas: Vec::new(),
        }
    }

    pub fn with_focus_areas(mut self, focus_areas: Vec<String>) -> Self {
        self.focus_areas = focus_areas;
        self
    }
}

// ============================================================================
// Reasoning Output
// ============================================================================

/// One unit of the reasoning chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// 1-based, contiguous within a chain.
    pub step_number: usize,
    pub premise: String,
    pub inference: String,
    pub confidence: f64,
    pub evidence_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeConclusion {
    pub conclusion: String,
    pub confidence: f64,
    pub reason: String,
}

/// How the result was planned and which strategy produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReasoningMetadata {
    pub planning_strategy: String,
    pub focus_areas: Vec<String>,
    pub model_type: String,
}

/// Output of `reason`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningResult {
    pub conclusion: String,
    pub confidence: f64,
    pub reasoning_chain: Vec<ReasoningStep>,
    pub alternative_conclusions: Vec<AlternativeConclusion>,
    pub warnings: Vec<String>,
    pub metadata: ReasoningMetadata,
}

// ============================================================================
// Verification Output
// ============================================================================

/// Output of `verify_hypothesis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisVerdict {
    pub hypothesis_id: String,
    pub is_supported: bool,
    pub confidence: f64,
    pub supporting_reasons: Vec<String>,
    pub contradicting_reasons: Vec<String>,
    pub missing_evidence: Vec<String>,
    pub recommendation: String,
}

// ============================================================================
// Contradiction Output
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Map a French or English severity label; unknown labels are medium.
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "critical" | "critique" => Severity::Critical,
            "high" | "majeure" | "majeur" | "haute" | "élevée" => Severity::High,
            "low" | "mineure" | "mineur" | "basse" | "faible" => Severity::Low,
            _ => Severity::Medium,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    pub statement_ids: Vec<String>,
    pub description: String,
    pub severity: Severity,
    pub resolution_suggestions: Vec<String>,
}

/// Output of `find_contradictions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionReport {
    pub contradictions: Vec<Contradiction>,
    pub consistency_score: f64,
    pub analysis_summary: String,
}

// ============================================================================
// Cross-Case Output
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Low,
    Medium,
    High,
}

impl Significance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Significance::Low => "low",
            Significance::Medium => "medium",
            Significance::High => "high",
        }
    }

    /// Map a French or English significance label; unknown labels are medium.
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" | "haute" | "élevée" | "forte" => Significance::High,
            "low" | "basse" | "faible" => Significance::Low,
            _ => Significance::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasePattern {
    pub pattern_type: String,
    pub description: String,
    pub cases_involved: Vec<String>,
    pub confidence: f64,
    pub significance: Significance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseConnection {
    pub source_case: String,
    pub target_case: String,
    pub connection_type: String,
    pub strength: f64,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }

    /// Map a French or English risk label; unknown labels stay unknown.
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" | "haut" | "haute" | "élevé" | "élevée" | "critique" | "critical" => {
                RiskLevel::High
            }
            "medium" | "moyen" | "moyenne" | "modéré" | "modérée" => RiskLevel::Medium,
            "low" | "bas" | "basse" | "faible" => RiskLevel::Low,
            _ => RiskLevel::Unknown,
        }
    }

    /// Priority recommended for this risk level.
    pub fn priority(&self) -> &'static str {
        match self {
            RiskLevel::High => "urgent",
            _ => "normal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub pattern_count: usize,
    pub connection_count: usize,
    pub recommended_priority: String,
}

impl RiskAssessment {
    pub fn new(level: RiskLevel, pattern_count: usize, connection_count: usize) -> Self {
        Self {
            level,
            pattern_count,
            connection_count,
            recommended_priority: level.priority().to_string(),
        }
    }
}

/// Output of `cross_case_reasoning`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCaseReport {
    pub patterns: Vec<CasePattern>,
    pub connections: Vec<CaseConnection>,
    pub investigative_leads: Vec<String>,
    pub risk_assessment: RiskAssessment,
    pub summary: String,
}
