use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

mod catalog;
mod engine;
mod explain;

pub use engine::{
    diagnose, rule_confidence, Candidate, DiagnoseOptions, DiagnosisResult, EvaluationMode,
    ThresholdPolicy, TraceEvent, DEFAULT_THRESHOLD, DEFAULT_TOP_N, MAX_STRICT_PASSES,
    SINGLE_SYMPTOM_THRESHOLD_CAP, TWO_SYMPTOM_THRESHOLD_CAP,
};
pub use explain::{explain, ExplainedDiagnosis, Explanation, ReasoningStep, Summary};

/// Description returned for codes outside the symptom universe.
pub const UNKNOWN_SYMPTOM: &str = "Unknown symptom";

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum DiagnosisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("catalog error: {0}")]
    Catalog(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hardware,
    Software,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Software => "software",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hardware" => Some(Self::Hardware),
            "software" => Some(Self::Software),
            _ => None,
        }
    }
}

/// Fault severity. Serialized with the catalog's labels
/// (`ringan`, `sedang`, `berat`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    #[serde(rename = "ringan")]
    Low,
    #[serde(rename = "sedang")]
    Medium,
    #[serde(rename = "berat")]
    High,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "ringan",
            Self::Medium => "sedang",
            Self::High => "berat",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ringan" | "low" => Some(Self::Low),
            "sedang" | "medium" => Some(Self::Medium),
            "berat" | "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Symptom {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Diagnosis {
    pub name: String,
    pub category: Category,
    pub severity: Severity,
    pub description: String,
    pub solutions: Vec<String>,
}

/// A rule as authored, before the knowledge base assigns its ordinal.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct RuleDefinition {
    pub id: String,
    pub conditions: Vec<String>,
    pub conclusion: Diagnosis,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Rule {
    pub id: String,
    /// Zero-based declaration position; the ranking tie-breaker.
    pub ordinal: usize,
    pub conditions: Vec<String>,
    pub conclusion: Diagnosis,
}

impl Rule {
    #[must_use]
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }
}

/// Immutable symptom and rule catalogs.
///
/// Construction validates every catalog invariant; afterwards the knowledge
/// base only answers lookups and can be shared freely between callers.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    symptoms: Vec<Symptom>,
    symptom_index: BTreeMap<String, usize>,
    rules: Vec<Rule>,
    rule_index: BTreeMap<String, usize>,
}

impl KnowledgeBase {
    /// Build a knowledge base from authored symptoms and rules.
    ///
    /// # Errors
    /// Returns [`DiagnosisError::Catalog`] when symptom codes or rule ids are blank or
    /// duplicated, when a rule has no conditions or repeats one, or when a rule
    /// references a code outside the symptom universe.
    pub fn new(
        symptoms: Vec<Symptom>,
        definitions: Vec<RuleDefinition>,
    ) -> Result<Self, DiagnosisError> {
        let mut symptom_index = BTreeMap::new();
        for (position, symptom) in symptoms.iter().enumerate() {
            if symptom.code.trim().is_empty() {
                return Err(DiagnosisError::Catalog("symptom code MUST be non-empty".to_string()));
            }
            if symptom_index.insert(symptom.code.clone(), position).is_some() {
                return Err(DiagnosisError::Catalog(format!(
                    "duplicate symptom code: {}",
                    symptom.code
                )));
            }
        }

        let mut rules = Vec::with_capacity(definitions.len());
        let mut rule_index = BTreeMap::new();
        for (ordinal, definition) in definitions.into_iter().enumerate() {
            validate_definition(&definition, &symptom_index)?;
            if rule_index.insert(definition.id.clone(), ordinal).is_some() {
                return Err(DiagnosisError::Catalog(format!(
                    "duplicate rule id: {}",
                    definition.id
                )));
            }
            rules.push(Rule {
                id: definition.id,
                ordinal,
                conditions: definition.conditions,
                conclusion: definition.conclusion,
            });
        }

        Ok(Self { symptoms, symptom_index, rules, rule_index })
    }

    /// The built-in laptop catalog (53 symptoms, 24 rules).
    ///
    /// # Errors
    /// Returns [`DiagnosisError::Catalog`] if the embedded catalog violates an invariant.
    pub fn builtin() -> Result<Self, DiagnosisError> {
        Self::new(catalog::builtin_symptoms(), catalog::builtin_rules())
    }

    #[must_use]
    pub fn all_symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    #[must_use]
    pub fn symptom(&self, code: &str) -> Option<&Symptom> {
        self.symptom_index.get(code).map(|position| &self.symptoms[*position])
    }

    #[must_use]
    pub fn contains_symptom(&self, code: &str) -> bool {
        self.symptom_index.contains_key(code)
    }

    /// Human-readable description, or [`UNKNOWN_SYMPTOM`] for unrecognized codes.
    #[must_use]
    pub fn symptom_description(&self, code: &str) -> &str {
        self.symptom(code).map_or(UNKNOWN_SYMPTOM, |symptom| symptom.description.as_str())
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn all_rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rule_index.get(id).map(|ordinal| &self.rules[*ordinal])
    }
}

fn validate_definition(
    definition: &RuleDefinition,
    symptom_index: &BTreeMap<String, usize>,
) -> Result<(), DiagnosisError> {
    if definition.id.trim().is_empty() {
        return Err(DiagnosisError::Catalog("rule id MUST be non-empty".to_string()));
    }

    if definition.conditions.is_empty() {
        return Err(DiagnosisError::Catalog(format!(
            "rule {} MUST declare at least one condition",
            definition.id
        )));
    }

    if definition.conclusion.name.trim().is_empty() {
        return Err(DiagnosisError::Catalog(format!(
            "rule {} MUST name its diagnosis",
            definition.id
        )));
    }

    for (position, condition) in definition.conditions.iter().enumerate() {
        if !symptom_index.contains_key(condition) {
            return Err(DiagnosisError::Catalog(format!(
                "rule {} references unknown symptom code {condition}",
                definition.id
            )));
        }
        if definition.conditions[..position].contains(condition) {
            return Err(DiagnosisError::Catalog(format!(
                "rule {} repeats condition {condition}",
                definition.id
            )));
        }
    }

    Ok(())
}
