//! Forensic pattern extraction.
//!
//! Classifies free text into temporal, causal, evidential and suspect-related
//! categories with a fixed set of bilingual (French/English) regular
//! expressions. Pure and deterministic.

pub mod lexicon;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Category of a forensic text pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternCategory {
    Temporal,
    Causal,
    Evidential,
    Suspect,
}

impl PatternCategory {
    /// Category label as used in feature bags.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternCategory::Temporal => "temporal",
            PatternCategory::Causal => "causal",
            PatternCategory::Evidential => "evidential",
            PatternCategory::Suspect => "suspect",
        }
    }

    /// French plural adjective used in findings ("3 éléments temporels").
    pub fn french_plural(&self) -> &'static str {
        match self {
            PatternCategory::Temporal => "temporels",
            PatternCategory::Causal => "causaux",
            PatternCategory::Evidential => "probatoires",
            PatternCategory::Suspect => "suspects",
        }
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Matches found in a text, grouped by category. Empty categories are absent.
pub type PatternMatches = BTreeMap<PatternCategory, BTreeSet<String>>;

static DOMAIN_PATTERNS: LazyLock<Vec<(PatternCategory, Vec<Regex>)>> = LazyLock::new(|| {
    let compile = |sources: &[&str]| -> Vec<Regex> {
        sources
            .iter()
            .map(|s| Regex::new(&format!(r"(?i)\b(?:{})\b", s)).expect("static pattern compiles"))
            .collect()
    };

    vec![
        (
            PatternCategory::Temporal,
            compile(&[
                r"\d{1,2}[/:]\d{2}",
                r"\d{1,2}/\d{1,2}/\d{2,4}",
                r"avant|après|pendant|lors de",
                r"before|after|during|when",
            ]),
        ),
        (
            PatternCategory::Causal,
            compile(&[
                r"parce que|car|donc|ainsi",
                r"because|therefore|thus|hence",
                r"causé par|résulte de|provoque",
                r"caused by|results in|leads to",
            ]),
        ),
        (
            PatternCategory::Evidential,
            compile(&[
                r"ADN|empreinte|trace|résidu",
                r"DNA|fingerprint|trace|residue",
                r"témoin|témoignage|déclaration",
                r"witness|testimony|statement",
            ]),
        ),
        (
            PatternCategory::Suspect,
            compile(&[
                r"suspect|accusé|inculpé",
                r"suspect|accused|defendant",
                r"alibi|mobile|opportunité",
                r"motive|opportunity|means",
            ]),
        ),
    ]
});

/// Extract forensic patterns from `text`.
pub fn extract_patterns(text: &str) -> PatternMatches {
    let mut found = PatternMatches::new();
    for (category, patterns) in DOMAIN_PATTERNS.iter() {
        let matches: BTreeSet<String> = patterns
            .iter()
            .flat_map(|re| re.find_iter(text).map(|m| m.as_str().to_string()))
            .collect();
        if !matches.is_empty() {
            found.insert(*category, matches);
        }
    }
    found
}

/// Categories present in `text`, without the matched strings.
pub fn pattern_categories(text: &str) -> BTreeSet<PatternCategory> {
    extract_patterns(text).into_keys().collect()
}
