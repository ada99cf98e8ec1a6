use std::sync::Arc;

use anyhow::{Context, Result};
use laptop_diagnosis_core::{
    diagnose, explain, Candidate, Category, DiagnoseOptions, Diagnosis, Explanation,
    KnowledgeBase, Severity, Symptom, DEFAULT_THRESHOLD, DEFAULT_TOP_N,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const API_CONTRACT_VERSION: &str = "api.v1";

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
#[error("symptom not found: {0}")]
pub struct SymptomNotFound(pub String);

/// Values used for any option a caller leaves out of a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RequestDefaults {
    pub threshold: f64,
    pub top_n: usize,
    pub strict: bool,
    pub detailed: bool,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD, top_n: DEFAULT_TOP_N, strict: false, detailed: true }
    }
}

impl RequestDefaults {
    /// # Errors
    /// Returns an error when the default threshold is outside `[0, 100]`.
    pub fn validate(&self) -> Result<()> {
        DiagnoseOptions { threshold: self.threshold, top_n: self.top_n, strict: self.strict }
            .validate()
            .context("invalid request defaults")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnoseRequest {
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub detailed: Option<bool>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub strict_mode: Option<bool>,
}

impl DiagnoseRequest {
    #[must_use]
    pub fn new<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            detailed: None,
            threshold: None,
            top_n: None,
            strict_mode: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleDiagnosis {
    pub diagnoses_found: Vec<Candidate>,
    pub total_candidates: usize,
    pub threshold_used: f64,
    pub adaptive_mode: bool,
    pub strict_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DiagnosisView {
    Detailed(Box<Explanation>),
    Simple(SimpleDiagnosis),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisReport {
    pub request_id: String,
    pub detailed: bool,
    pub options: DiagnoseOptions,
    pub result: DiagnosisView,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleSummary {
    pub rule_id: String,
    pub conditions: Vec<String>,
    pub conclusion: Diagnosis,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeBaseStats {
    pub total_symptoms: usize,
    pub total_rules: usize,
    pub hardware_rules: usize,
    pub software_rules: usize,
}

#[derive(Debug, Clone)]
pub struct DiagnosisApi {
    knowledge_base: Arc<KnowledgeBase>,
    defaults: RequestDefaults,
}

impl DiagnosisApi {
    /// API over the built-in catalog with default request options.
    ///
    /// # Errors
    /// Returns an error when the built-in catalog fails validation.
    pub fn new() -> Result<Self> {
        Self::with_defaults(RequestDefaults::default())
    }

    /// # Errors
    /// Returns an error when the built-in catalog fails validation or `defaults`
    /// carries an out-of-range threshold.
    pub fn with_defaults(defaults: RequestDefaults) -> Result<Self> {
        let knowledge_base =
            KnowledgeBase::builtin().context("failed to load built-in knowledge base")?;
        Self::from_knowledge_base(Arc::new(knowledge_base), defaults)
    }

    /// # Errors
    /// Returns an error when `defaults` carries an out-of-range threshold.
    pub fn from_knowledge_base(
        knowledge_base: Arc<KnowledgeBase>,
        defaults: RequestDefaults,
    ) -> Result<Self> {
        defaults.validate()?;
        Ok(Self { knowledge_base, defaults })
    }

    #[must_use]
    pub fn defaults(&self) -> RequestDefaults {
        self.defaults
    }

    #[must_use]
    pub fn symptoms(&self) -> &[Symptom] {
        self.knowledge_base.all_symptoms()
    }

    /// Look up one symptom by code.
    ///
    /// # Errors
    /// Returns [`SymptomNotFound`] when the code is not in the catalog.
    pub fn symptom(&self, code: &str) -> Result<Symptom> {
        let symptom = self
            .knowledge_base
            .symptom(code)
            .cloned()
            .ok_or_else(|| SymptomNotFound(code.to_string()))?;
        Ok(symptom)
    }

    #[must_use]
    pub fn rules(&self) -> Vec<RuleSummary> {
        self.rules_where(None, None)
    }

    /// Rules in declaration order, narrowed to a category and/or severity.
    #[must_use]
    pub fn rules_where(
        &self,
        category: Option<Category>,
        severity: Option<Severity>,
    ) -> Vec<RuleSummary> {
        self.knowledge_base
            .all_rules()
            .iter()
            .filter(|rule| {
                category.into_iter().all(|category| rule.conclusion.category == category)
            })
            .filter(|rule| {
                severity.into_iter().all(|severity| rule.conclusion.severity == severity)
            })
            .map(|rule| RuleSummary {
                rule_id: rule.id.clone(),
                conditions: rule.conditions.clone(),
                conclusion: rule.conclusion.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn knowledge_base_stats(&self) -> KnowledgeBaseStats {
        let rules = self.knowledge_base.all_rules();
        let hardware_rules =
            rules.iter().filter(|rule| rule.conclusion.category == Category::Hardware).count();
        KnowledgeBaseStats {
            total_symptoms: self.knowledge_base.all_symptoms().len(),
            total_rules: rules.len(),
            hardware_rules,
            software_rules: rules.len() - hardware_rules,
        }
    }

    /// Resolve request options against the configured defaults.
    #[must_use]
    pub fn options_for(&self, request: &DiagnoseRequest) -> DiagnoseOptions {
        DiagnoseOptions {
            threshold: request.threshold.unwrap_or(self.defaults.threshold),
            top_n: request.top_n.unwrap_or(self.defaults.top_n),
            strict: request.strict_mode.unwrap_or(self.defaults.strict),
        }
    }

    /// Run one diagnosis and shape it as the detailed or simple view.
    ///
    /// # Errors
    /// Returns an error when the symptom list is empty, names unknown codes, or the
    /// threshold is outside `[0, 100]`.
    pub fn diagnose(&self, request: DiagnoseRequest) -> Result<DiagnosisReport> {
        let options = self.options_for(&request);
        let detailed = request.detailed.unwrap_or(self.defaults.detailed);
        let result = diagnose(&self.knowledge_base, &request.symptoms, &options)?;
        let request_id = compute_request_id(&result.symptoms, &options);

        tracing::debug!(
            request_id = %request_id,
            mode = result.mode.as_str(),
            symptoms = result.symptoms.len(),
            total_candidates = result.total_candidates,
            returned = result.candidates.len(),
            effective_threshold = result.threshold.effective,
            "diagnosis completed"
        );

        let view = if detailed {
            DiagnosisView::Detailed(Box::new(explain(&self.knowledge_base, &result)))
        } else {
            DiagnosisView::Simple(SimpleDiagnosis {
                total_candidates: result.total_candidates,
                threshold_used: result.threshold.effective,
                adaptive_mode: result.threshold.adaptive,
                strict_mode: result.is_strict(),
                diagnoses_found: result.candidates,
            })
        };

        Ok(DiagnosisReport { request_id, detailed, options, result: view })
    }
}

fn compute_request_id(symptoms: &[String], options: &DiagnoseOptions) -> String {
    let mut sorted = symptoms.to_vec();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    for code in &sorted {
        hasher.update(code.as_bytes());
        hasher.update(b",");
    }
    hasher.update(format!("threshold={}", options.threshold).as_bytes());
    hasher.update(format!("top_n={}", options.top_n).as_bytes());
    hasher.update(format!("strict={}", options.strict).as_bytes());

    let digest = hasher.finalize();
    let digest_hex = format!("{digest:x}");
    format!("diag_{}", &digest_hex[..16])
}
