use serde::{Deserialize, Serialize};

use crate::{Candidate, Category, DiagnosisResult, KnowledgeBase, Severity, Symptom};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainedDiagnosis {
    pub rule_id: String,
    pub diagnosis: String,
    pub category: Category,
    pub severity: Severity,
    pub description: String,
    pub solutions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_symptoms: Option<Vec<Symptom>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_symptoms: Option<Vec<Symptom>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_ratio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasoningStep {
    pub step: usize,
    pub rule_id: String,
    pub conclusion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_ratio: Option<String>,
    pub conditions_met: Vec<String>,
    pub conditions_missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_symptoms: usize,
    pub total_diagnoses: usize,
    pub total_candidates: usize,
    pub threshold_requested: f64,
    pub threshold_used: f64,
    pub adaptive_mode: bool,
    pub strict_mode: bool,
    pub rules_fired: usize,
    pub iterations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    pub symptoms_provided: Vec<Symptom>,
    pub diagnoses_found: Vec<ExplainedDiagnosis>,
    pub reasoning_steps: Vec<ReasoningStep>,
    pub summary: Summary,
}

fn resolve(kb: &KnowledgeBase, code: &str) -> Symptom {
    Symptom { code: code.to_string(), description: kb.symptom_description(code).to_string() }
}

fn resolve_all(kb: &KnowledgeBase, codes: &[String]) -> Vec<Symptom> {
    codes.iter().map(|code| resolve(kb, code)).collect()
}

fn describe_all(kb: &KnowledgeBase, codes: &[String]) -> Vec<String> {
    codes.iter().map(|code| kb.symptom_description(code).to_string()).collect()
}

fn explained_diagnosis(
    kb: &KnowledgeBase,
    candidate: &Candidate,
    partial: bool,
) -> ExplainedDiagnosis {
    let diagnosis = &candidate.diagnosis;
    ExplainedDiagnosis {
        rule_id: candidate.rule_id.clone(),
        diagnosis: diagnosis.name.clone(),
        category: diagnosis.category,
        severity: diagnosis.severity,
        description: diagnosis.description.clone(),
        solutions: diagnosis.solutions.clone(),
        confidence: partial.then_some(candidate.confidence),
        matched_symptoms: partial.then(|| resolve_all(kb, &candidate.matched)),
        missing_symptoms: partial.then(|| resolve_all(kb, &candidate.missing)),
        match_ratio: partial.then(|| candidate.match_ratio()),
    }
}

fn reasoning_step(
    kb: &KnowledgeBase,
    index: usize,
    candidate: &Candidate,
    partial: bool,
) -> ReasoningStep {
    ReasoningStep {
        step: index + 1,
        rule_id: candidate.rule_id.clone(),
        conclusion: candidate.diagnosis.name.clone(),
        confidence: partial.then_some(candidate.confidence),
        match_ratio: partial.then(|| candidate.match_ratio()),
        conditions_met: describe_all(kb, &candidate.matched),
        conditions_missing: describe_all(kb, &candidate.missing),
    }
}

/// Render a raw result for people: resolve every code to its description and
/// list one reasoning step per returned diagnosis, in ranked order for partial
/// results and in firing order for strict ones.
#[must_use]
pub fn explain(kb: &KnowledgeBase, result: &DiagnosisResult) -> Explanation {
    let partial = !result.is_strict();

    Explanation {
        symptoms_provided: resolve_all(kb, &result.symptoms),
        diagnoses_found: result
            .candidates
            .iter()
            .map(|candidate| explained_diagnosis(kb, candidate, partial))
            .collect(),
        reasoning_steps: result
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| reasoning_step(kb, index, candidate, partial))
            .collect(),
        summary: Summary {
            total_symptoms: result.symptoms.len(),
            total_diagnoses: result.candidates.len(),
            total_candidates: result.total_candidates,
            threshold_requested: result.threshold.requested,
            threshold_used: result.threshold.effective,
            adaptive_mode: result.threshold.adaptive,
            strict_mode: result.is_strict(),
            rules_fired: result.rules_fired(),
            iterations: result.passes,
        },
    }
}
