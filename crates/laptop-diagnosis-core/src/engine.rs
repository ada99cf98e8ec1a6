use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Diagnosis, DiagnosisError, KnowledgeBase, Rule};

pub const DEFAULT_THRESHOLD: f64 = 60.0;
pub const DEFAULT_TOP_N: usize = 5;
/// Upper bound on strict-mode fixpoint passes.
pub const MAX_STRICT_PASSES: usize = 100;
pub const SINGLE_SYMPTOM_THRESHOLD_CAP: f64 = 30.0;
pub const TWO_SYMPTOM_THRESHOLD_CAP: f64 = 45.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiagnoseOptions {
    pub threshold: f64,
    pub top_n: usize,
    pub strict: bool,
}

impl Default for DiagnoseOptions {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD, top_n: DEFAULT_TOP_N, strict: false }
    }
}

impl DiagnoseOptions {
    /// # Errors
    /// Returns [`DiagnosisError::InvalidInput`] when the threshold is not a finite
    /// percentage in `[0, 100]`.
    pub fn validate(&self) -> Result<(), DiagnosisError> {
        if !self.threshold.is_finite() || !(0.0..=100.0).contains(&self.threshold) {
            return Err(DiagnosisError::InvalidInput(
                "threshold MUST be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    Partial,
    Strict,
}

impl EvaluationMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Strict => "strict",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThresholdPolicy {
    pub requested: f64,
    pub effective: f64,
    pub adaptive: bool,
}

impl ThresholdPolicy {
    /// Relax the requested cutoff when only one or two symptoms are supplied.
    #[must_use]
    pub fn for_symptom_count(requested: f64, symptom_count: usize) -> Self {
        let effective = match symptom_count {
            0 | 1 => requested.min(SINGLE_SYMPTOM_THRESHOLD_CAP),
            2 => requested.min(TWO_SYMPTOM_THRESHOLD_CAP),
            _ => requested,
        };
        Self { requested, effective, adaptive: effective < requested }
    }

    fn strict(requested: f64) -> Self {
        Self { requested, effective: 100.0, adaptive: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub rule_id: String,
    pub ordinal: usize,
    pub confidence: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub total_conditions: usize,
    pub matched_count: usize,
    pub diagnosis: Diagnosis,
}

impl Candidate {
    /// `"matched/total"`, e.g. `"3/4"`.
    #[must_use]
    pub fn match_ratio(&self) -> String {
        format!("{}/{}", self.matched_count, self.total_conditions)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TraceEvent {
    AddFacts { facts: Vec<String> },
    Candidate { rule_id: String, confidence: f64, matched_count: usize, total_conditions: usize },
    Rank { total_candidates: usize, returned: usize },
    FireRule { pass: usize, rule_id: String, conditions_met: Vec<String>, conclusion: String },
    Termination { passes: usize, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisResult {
    pub mode: EvaluationMode,
    /// Distinct supplied codes in first-seen order.
    pub symptoms: Vec<String>,
    pub candidates: Vec<Candidate>,
    pub total_candidates: usize,
    pub threshold: ThresholdPolicy,
    pub passes: usize,
    pub trace: Vec<TraceEvent>,
}

impl DiagnosisResult {
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.mode == EvaluationMode::Strict
    }

    /// Returned candidates whose every condition is present.
    #[must_use]
    pub fn rules_fired(&self) -> usize {
        self.candidates.iter().filter(|candidate| candidate.is_complete()).count()
    }
}

/// Per-call working memory. Nothing here outlives one [`diagnose`] call.
struct WorkingSet {
    ordered: Vec<String>,
    members: BTreeSet<String>,
}

impl WorkingSet {
    fn len(&self) -> usize {
        self.ordered.len()
    }

    fn satisfies(&self, rule: &Rule) -> bool {
        rule.conditions.iter().all(|condition| self.members.contains(condition))
    }
}

fn working_set<S: AsRef<str>>(
    kb: &KnowledgeBase,
    symptoms: &[S],
) -> Result<WorkingSet, DiagnosisError> {
    if symptoms.is_empty() {
        return Err(DiagnosisError::InvalidInput(
            "symptoms MUST include at least one code".to_string(),
        ));
    }

    let mut ordered = Vec::with_capacity(symptoms.len());
    let mut members = BTreeSet::new();
    let mut unknown: Vec<String> = Vec::new();
    for code in symptoms {
        let code = code.as_ref();
        if !kb.contains_symptom(code) {
            if !unknown.iter().any(|seen| seen == code) {
                unknown.push(code.to_string());
            }
            continue;
        }
        if members.insert(code.to_string()) {
            ordered.push(code.to_string());
        }
    }

    if !unknown.is_empty() {
        return Err(DiagnosisError::InvalidInput(format!(
            "unknown symptom codes: {}",
            unknown.join(", ")
        )));
    }

    Ok(WorkingSet { ordered, members })
}

#[derive(Debug, Clone)]
struct ScoredRule<'a> {
    rule: &'a Rule,
    matched: Vec<String>,
    missing: Vec<String>,
    confidence: f64,
}

impl ScoredRule<'_> {
    fn cmp(lhs: &Self, rhs: &Self) -> Ordering {
        rhs.confidence
            .partial_cmp(&lhs.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| lhs.rule.ordinal.cmp(&rhs.rule.ordinal))
    }

    fn into_candidate(self) -> Candidate {
        Candidate {
            rule_id: self.rule.id.clone(),
            ordinal: self.rule.ordinal,
            confidence: round_confidence(self.confidence),
            matched_count: self.matched.len(),
            total_conditions: self.rule.condition_count(),
            matched: self.matched,
            missing: self.missing,
            diagnosis: self.rule.conclusion.clone(),
        }
    }
}

fn score_rule<'a>(rule: &'a Rule, members: &BTreeSet<String>) -> ScoredRule<'a> {
    let (matched, missing): (Vec<String>, Vec<String>) =
        rule.conditions.iter().cloned().partition(|condition| members.contains(condition));
    let confidence = percentage(matched.len(), rule.condition_count());
    ScoredRule { rule, matched, missing, confidence }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let part = f64::from(u32::try_from(part).unwrap_or(u32::MAX));
    let whole = f64::from(u32::try_from(whole).unwrap_or(u32::MAX));
    100.0 * part / whole
}

fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score every rule against `symptoms` and return the ranked result.
///
/// Partial mode keeps rules whose confidence reaches the (possibly relaxed)
/// threshold, ranks them by confidence with declaration order breaking ties,
/// and truncates to `top_n`. Strict mode fires only fully satisfied rules.
///
/// # Errors
/// Returns [`DiagnosisError::InvalidInput`] when `symptoms` is empty, contains codes
/// outside the knowledge base, or the threshold is outside `[0, 100]`.
pub fn diagnose<S: AsRef<str>>(
    kb: &KnowledgeBase,
    symptoms: &[S],
    options: &DiagnoseOptions,
) -> Result<DiagnosisResult, DiagnosisError> {
    options.validate()?;
    let working = working_set(kb, symptoms)?;

    if options.strict {
        Ok(evaluate_strict(kb, working, options))
    } else {
        Ok(evaluate_partial(kb, working, options))
    }
}

fn evaluate_partial(
    kb: &KnowledgeBase,
    working: WorkingSet,
    options: &DiagnoseOptions,
) -> DiagnosisResult {
    let threshold = ThresholdPolicy::for_symptom_count(options.threshold, working.len());
    let mut trace = vec![TraceEvent::AddFacts { facts: working.ordered.clone() }];

    let mut scored: Vec<ScoredRule<'_>> = Vec::new();
    for rule in kb.all_rules() {
        let score = score_rule(rule, &working.members);
        if score.confidence < threshold.effective {
            continue;
        }
        trace.push(TraceEvent::Candidate {
            rule_id: rule.id.clone(),
            confidence: round_confidence(score.confidence),
            matched_count: score.matched.len(),
            total_conditions: rule.condition_count(),
        });
        scored.push(score);
    }

    scored.sort_by(ScoredRule::cmp);
    let total_candidates = scored.len();
    scored.truncate(options.top_n);
    let candidates: Vec<Candidate> = scored.into_iter().map(ScoredRule::into_candidate).collect();

    trace.push(TraceEvent::Rank { total_candidates, returned: candidates.len() });
    trace.push(TraceEvent::Termination {
        passes: 1,
        message: "Partial matching complete.".to_string(),
    });

    DiagnosisResult {
        mode: EvaluationMode::Partial,
        symptoms: working.ordered,
        candidates,
        total_candidates,
        threshold,
        passes: 1,
        trace,
    }
}

// Conclusions are never added back to the working set, so only the first pass
// can fire; the loop is kept bounded for rule bases that might chain.
fn evaluate_strict(
    kb: &KnowledgeBase,
    working: WorkingSet,
    options: &DiagnoseOptions,
) -> DiagnosisResult {
    let mut trace = vec![TraceEvent::AddFacts { facts: working.ordered.clone() }];
    let mut fired: Vec<&Rule> = Vec::new();
    let mut fired_ids: BTreeSet<&str> = BTreeSet::new();
    let mut passes = 0;
    let mut converged = false;

    while passes < MAX_STRICT_PASSES {
        passes += 1;
        let mut fired_this_pass = false;

        for rule in kb.all_rules() {
            if fired_ids.contains(rule.id.as_str()) || !working.satisfies(rule) {
                continue;
            }
            fired_ids.insert(rule.id.as_str());
            fired.push(rule);
            fired_this_pass = true;
            trace.push(TraceEvent::FireRule {
                pass: passes,
                rule_id: rule.id.clone(),
                conditions_met: rule.conditions.clone(),
                conclusion: rule.conclusion.name.clone(),
            });
        }

        if !fired_this_pass {
            converged = true;
            break;
        }
    }

    trace.push(TraceEvent::Termination {
        passes,
        message: if converged {
            "No more rules to fire. Forward chaining complete.".to_string()
        } else {
            format!("Stopped after {MAX_STRICT_PASSES} passes without reaching a fixpoint.")
        },
    });

    let candidates: Vec<Candidate> =
        fired.into_iter().map(|rule| score_rule(rule, &working.members).into_candidate()).collect();

    DiagnosisResult {
        mode: EvaluationMode::Strict,
        symptoms: working.ordered,
        total_candidates: candidates.len(),
        candidates,
        threshold: ThresholdPolicy::strict(options.threshold),
        passes,
        trace,
    }
}

/// Confidence of a single rule against `symptoms`, rounded to two decimals.
/// Codes outside the knowledge base simply never match.
#[must_use]
pub fn rule_confidence<S: AsRef<str>>(
    kb: &KnowledgeBase,
    rule_id: &str,
    symptoms: &[S],
) -> Option<f64> {
    let rule = kb.rule(rule_id)?;
    let members: BTreeSet<String> =
        symptoms.iter().map(|code| code.as_ref().to_string()).collect();
    Some(round_confidence(score_rule(rule, &members).confidence))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use proptest::sample::subsequence;

    use super::*;
    use crate::{Category, RuleDefinition, Severity, Symptom};

    fn builtin() -> KnowledgeBase {
        KnowledgeBase::builtin()
            .unwrap_or_else(|err| panic!("builtin catalog should load: {err}"))
    }

    fn builtin_codes() -> Vec<String> {
        builtin().all_symptoms().iter().map(|symptom| symptom.code.clone()).collect()
    }

    fn run(symptoms: &[&str], options: &DiagnoseOptions) -> DiagnosisResult {
        diagnose(&builtin(), symptoms, options)
            .unwrap_or_else(|err| panic!("diagnosis should succeed: {err}"))
    }

    fn options(threshold: f64, top_n: usize, strict: bool) -> DiagnoseOptions {
        DiagnoseOptions { threshold, top_n, strict }
    }

    fn find<'a>(result: &'a DiagnosisResult, rule_id: &str) -> Option<&'a Candidate> {
        result.candidates.iter().find(|candidate| candidate.rule_id == rule_id)
    }

    fn tie_fixture() -> KnowledgeBase {
        let symptoms = ["A", "B", "C", "D"]
            .iter()
            .map(|code| Symptom { code: (*code).to_string(), description: (*code).to_string() })
            .collect();
        let rule = |id: &str, conditions: &[&str]| RuleDefinition {
            id: id.to_string(),
            conditions: conditions.iter().map(|code| (*code).to_string()).collect(),
            conclusion: Diagnosis {
                name: format!("diagnosis {id}"),
                category: Category::Software,
                severity: Severity::Low,
                description: "fixture".to_string(),
                solutions: Vec::new(),
            },
        };
        // Z9 sorts before A1 lexically but is declared after it.
        let definitions =
            vec![rule("Z9", &["A", "B"]), rule("A1", &["A", "C"]), rule("M5", &["A", "B", "C"])];
        KnowledgeBase::new(symptoms, definitions)
            .unwrap_or_else(|err| panic!("fixture catalog should load: {err}"))
    }

    // Test IDs: TENG-001
    #[test]
    fn partial_match_reports_missing_condition() {
        let result = run(&["P02", "P03", "P04"], &options(60.0, 5, false));

        let candidate = find(&result, "R01").unwrap_or_else(|| panic!("R01 should be a candidate"));
        assert!((candidate.confidence - 75.0).abs() < f64::EPSILON);
        assert_eq!(candidate.matched, vec!["P02", "P03", "P04"]);
        assert_eq!(candidate.missing, vec!["P05"]);
        assert_eq!(candidate.match_ratio(), "3/4");
        assert!(!result.threshold.adaptive);
    }

    // Test IDs: TENG-002
    #[test]
    fn complete_match_scores_one_hundred() {
        let result = run(&["P02", "P03", "P04", "P05"], &options(60.0, 5, false));

        let candidate = find(&result, "R01").unwrap_or_else(|| panic!("R01 should be a candidate"));
        assert!((candidate.confidence - 100.0).abs() < f64::EPSILON);
        assert!(candidate.missing.is_empty());
        assert_eq!(result.candidates[0].rule_id, "R01");
        assert_eq!(result.rules_fired(), 1);
    }

    // Test IDs: TENG-003
    #[test]
    fn strict_mode_rejects_partial_match() {
        let result = run(&["P02", "P03", "P04"], &options(100.0, 5, true));

        assert!(result.is_strict());
        assert!(result.candidates.is_empty());
        assert_eq!(result.total_candidates, 0);
        assert_eq!(result.passes, 1);
    }

    // Test IDs: TENG-004
    #[test]
    fn strict_mode_fires_fully_satisfied_rules_in_declaration_order() {
        let result = run(&["P32", "P46", "P47", "P48", "P53"], &options(60.0, 1, true));

        let fired: Vec<&str> =
            result.candidates.iter().map(|candidate| candidate.rule_id.as_str()).collect();
        assert_eq!(fired, vec!["R17", "R18", "R24"]);
        assert!(result.candidates.iter().all(|candidate| candidate.is_complete()));
        assert_eq!(result.passes, 2);
        assert!(matches!(
            result.trace.last(),
            Some(TraceEvent::Termination { passes: 2, .. })
        ));
    }

    // Test IDs: TENG-005
    #[test]
    fn single_symptom_caps_threshold_at_thirty() {
        let result = run(&["P13"], &options(60.0, 5, false));

        assert!((result.threshold.effective - 30.0).abs() < f64::EPSILON);
        assert!((result.threshold.requested - 60.0).abs() < f64::EPSILON);
        assert!(result.threshold.adaptive);

        let usb = find(&result, "R04").unwrap_or_else(|| panic!("R04 should be a candidate"));
        assert!((usb.confidence - 50.0).abs() < f64::EPSILON);
        let mouse = find(&result, "R05").unwrap_or_else(|| panic!("R05 should be a candidate"));
        assert!((mouse.confidence - 33.33).abs() < f64::EPSILON);
        assert_eq!(result.candidates[0].rule_id, "R04");
    }

    // Test IDs: TENG-006
    #[test]
    fn single_symptom_excludes_quarter_confidence_rules() {
        // P03 is one of four conditions in R07 and one of three in R08.
        let result = run(&["P03"], &options(60.0, 10, false));

        assert!(find(&result, "R01").is_none());
        assert!(find(&result, "R07").is_none());
        assert!(find(&result, "R08").is_some());
    }

    // Test IDs: TENG-007
    #[test]
    fn two_symptoms_cap_threshold_at_forty_five() {
        let result = run(&["P44", "P45"], &options(90.0, 5, false));

        assert!((result.threshold.effective - 45.0).abs() < f64::EPSILON);
        assert!(result.threshold.adaptive);
        let gpu = find(&result, "R13").unwrap_or_else(|| panic!("R13 should be a candidate"));
        assert!((gpu.confidence - 66.67).abs() < f64::EPSILON);
    }

    // Test IDs: TENG-008
    #[test]
    fn low_requested_threshold_is_not_marked_adaptive() {
        let result = run(&["P13"], &options(20.0, 5, false));

        assert!((result.threshold.effective - 20.0).abs() < f64::EPSILON);
        assert!(!result.threshold.adaptive);
    }

    // Test IDs: TENG-009
    #[test]
    fn duplicate_codes_count_once() {
        let result = run(&["P13", "P13"], &options(60.0, 5, false));

        assert_eq!(result.symptoms, vec!["P13"]);
        assert!((result.threshold.effective - 30.0).abs() < f64::EPSILON);
    }

    // Test IDs: TENG-010
    #[test]
    fn invalid_input_is_rejected() {
        let kb = builtin();
        let empty: [&str; 0] = [];

        let err = diagnose(&kb, &empty, &DiagnoseOptions::default())
            .err()
            .unwrap_or_else(|| panic!("empty symptoms should fail"));
        assert!(err.to_string().contains("at least one code"));

        let err = diagnose(&kb, &["P01", "X1", "P02", "X2", "X1"], &DiagnoseOptions::default())
            .err()
            .unwrap_or_else(|| panic!("unknown symptoms should fail"));
        assert_eq!(err, DiagnosisError::InvalidInput("unknown symptom codes: X1, X2".to_string()));

        for threshold in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
            let result = diagnose(&kb, &["P01"], &options(threshold, 5, false));
            assert!(
                matches!(result, Err(DiagnosisError::InvalidInput(_))),
                "threshold {threshold} should be rejected"
            );
        }
    }

    // Test IDs: TENG-011
    #[test]
    fn equal_confidence_ties_follow_declaration_order() {
        let kb = tie_fixture();
        let result = diagnose(&kb, &["A", "D", "B", "C"], &options(0.0, 10, false))
            .unwrap_or_else(|err| panic!("fixture diagnosis should succeed: {err}"));

        let order: Vec<&str> =
            result.candidates.iter().map(|candidate| candidate.rule_id.as_str()).collect();
        assert_eq!(order, vec!["Z9", "A1", "M5"]);

        let result = diagnose(&kb, &["A", "D", "B"], &options(0.0, 10, false))
            .unwrap_or_else(|err| panic!("fixture diagnosis should succeed: {err}"));
        let order: Vec<&str> =
            result.candidates.iter().map(|candidate| candidate.rule_id.as_str()).collect();
        assert_eq!(order, vec!["Z9", "M5", "A1"]);
    }

    // Test IDs: TENG-012
    #[test]
    fn total_candidates_counts_before_truncation() {
        let result = run(&["P17", "P18", "P20", "P21"], &options(0.0, 2, false));

        assert_eq!(result.total_candidates, 24);
        assert_eq!(result.candidates.len(), 2);
        assert_eq!(result.candidates[0].rule_id, "R16");

        let none = run(&["P17", "P18", "P20", "P21"], &options(60.0, 0, false));
        assert!(none.candidates.is_empty());
        assert!(none.total_candidates > 0);
    }

    // Test IDs: TENG-013
    #[test]
    fn repeated_calls_do_not_share_state() {
        let kb = builtin();
        let first = diagnose(&kb, &["P02", "P03", "P04", "P05"], &options(60.0, 5, true))
            .unwrap_or_else(|err| panic!("first diagnosis should succeed: {err}"));
        let second = diagnose(&kb, &["P53"], &options(60.0, 5, true))
            .unwrap_or_else(|err| panic!("second diagnosis should succeed: {err}"));
        let again = diagnose(&kb, &["P02", "P03", "P04", "P05"], &options(60.0, 5, true))
            .unwrap_or_else(|err| panic!("repeat diagnosis should succeed: {err}"));

        assert_eq!(second.symptoms, vec!["P53"]);
        assert_eq!(second.candidates.len(), 1);
        assert_eq!(second.candidates[0].rule_id, "R24");
        assert_eq!(first, again);
    }

    // Test IDs: TENG-014
    #[test]
    fn concurrent_callers_share_one_knowledge_base() {
        let kb = std::sync::Arc::new(builtin());
        let queries: Vec<Vec<&'static str>> =
            vec![vec!["P02", "P03", "P04"], vec!["P13"], vec!["P44", "P45", "P29"], vec!["P53"]];

        let handles: Vec<_> = queries
            .iter()
            .cloned()
            .map(|query| {
                let kb = std::sync::Arc::clone(&kb);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| diagnose(&kb, &query, &DiagnoseOptions::default()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for (query, handle) in queries.iter().zip(handles) {
            let expected = diagnose(&kb, query, &DiagnoseOptions::default());
            let results = handle.join().unwrap_or_else(|_| panic!("worker thread panicked"));
            assert!(results.iter().all(|result| *result == expected));
        }
    }

    // Test IDs: TENG-015
    #[test]
    fn rule_confidence_scores_one_rule() {
        let kb = builtin();

        assert_eq!(rule_confidence(&kb, "R01", &["P02", "P03"]), Some(50.0));
        assert_eq!(rule_confidence(&kb, "R05", &["P13"]), Some(33.33));
        assert_eq!(rule_confidence(&kb, "R05", &["P99"]), Some(0.0));
        assert_eq!(rule_confidence(&kb, "R99", &["P13"]), None);
    }

    proptest! {
        #[test]
        fn property_matched_and_missing_partition_conditions(
            codes in subsequence(builtin_codes(), 1..12)
        ) {
            let kb = builtin();
            let result = diagnose(&kb, &codes, &options(0.0, usize::MAX, false));
            prop_assert!(result.is_ok());
            let result = result.unwrap_or_else(|_| unreachable!());

            for candidate in &result.candidates {
                let rule = kb.rule(&candidate.rule_id);
                prop_assert!(rule.is_some());
                let rule = rule.unwrap_or_else(|| unreachable!());

                let mut union: Vec<String> =
                    candidate.matched.iter().chain(&candidate.missing).cloned().collect();
                union.sort_unstable();
                let mut conditions = rule.conditions.clone();
                conditions.sort_unstable();
                prop_assert_eq!(union, conditions);
                prop_assert!(candidate.matched.iter().all(|code| !candidate.missing.contains(code)));
                prop_assert!((0.0..=100.0).contains(&candidate.confidence));
                prop_assert_eq!(candidate.missing.is_empty(), candidate.confidence >= 100.0);
                prop_assert_eq!(candidate.matched_count, candidate.matched.len());
                prop_assert_eq!(candidate.total_conditions, rule.condition_count());
            }
        }

        #[test]
        fn property_adding_a_symptom_never_lowers_confidence(
            codes in subsequence(builtin_codes(), 1..10),
            extra in 0_usize..53
        ) {
            let kb = builtin();
            let extra_code = kb.all_symptoms()[extra].code.clone();
            let mut extended = codes.clone();
            extended.push(extra_code);

            for rule in kb.all_rules() {
                let before = rule_confidence(&kb, &rule.id, &codes).unwrap_or(0.0);
                let after = rule_confidence(&kb, &rule.id, &extended).unwrap_or(0.0);
                prop_assert!(after >= before, "{} dropped from {} to {}", rule.id, before, after);
            }
        }

        #[test]
        fn property_ranking_and_truncation_hold(
            codes in subsequence(builtin_codes(), 1..12),
            threshold in 0.0_f64..=100.0,
            top_n in 0_usize..30
        ) {
            let kb = builtin();
            let result = diagnose(&kb, &codes, &options(threshold, top_n, false));
            prop_assert!(result.is_ok());
            let result = result.unwrap_or_else(|_| unreachable!());

            prop_assert_eq!(result.candidates.len(), top_n.min(result.total_candidates));
            for pair in result.candidates.windows(2) {
                prop_assert!(pair[0].confidence >= pair[1].confidence);
                if (pair[0].confidence - pair[1].confidence).abs() < f64::EPSILON {
                    prop_assert!(pair[0].ordinal < pair[1].ordinal);
                }
            }
            for candidate in &result.candidates {
                prop_assert!(candidate.confidence + 0.01 >= result.threshold.effective);
            }
        }

        #[test]
        fn property_adaptive_threshold_caps_small_inputs(
            codes in subsequence(builtin_codes(), 1..=2),
            threshold in 0.0_f64..=100.0
        ) {
            let kb = builtin();
            let result = diagnose(&kb, &codes, &options(threshold, 5, false));
            prop_assert!(result.is_ok());
            let result = result.unwrap_or_else(|_| unreachable!());

            let cap = if codes.len() == 1 { SINGLE_SYMPTOM_THRESHOLD_CAP } else { TWO_SYMPTOM_THRESHOLD_CAP };
            prop_assert!(result.threshold.effective <= cap);
            prop_assert!(result.threshold.effective <= threshold);
        }

        #[test]
        fn property_strict_mode_returns_only_complete_matches(
            codes in subsequence(builtin_codes(), 1..20)
        ) {
            let kb = builtin();
            let result = diagnose(&kb, &codes, &options(60.0, 1, true));
            prop_assert!(result.is_ok());
            let result = result.unwrap_or_else(|_| unreachable!());

            prop_assert!(result.passes <= 2);
            for candidate in &result.candidates {
                prop_assert!((candidate.confidence - 100.0).abs() < f64::EPSILON);
                prop_assert!(candidate.missing.is_empty());
            }
            let expected = kb
                .all_rules()
                .iter()
                .filter(|rule| rule.conditions.iter().all(|code| codes.contains(code)))
                .count();
            prop_assert_eq!(result.candidates.len(), expected);
        }
    }
}
