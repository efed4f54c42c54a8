//! Analysis persistence, Markdown rendering and drift detection.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::results::AnalysisResult;

impl AnalysisResult {
    /// Save the analysis as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize analysis")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write analysis to {}", path.display()))?;
        Ok(())
    }

    /// Load an analysis from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analysis from {}", path.display()))?;
        let result: AnalysisResult =
            serde_json::from_str(&content).context("failed to parse analysis JSON")?;
        Ok(result)
    }

    /// Format the analysis as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let dist = &self.summary.score_distribution;

        md.push_str(&format!("## {}\n\n", self.exam_title));
        md.push_str(&format!(
            "**Students:** {} | **Variants:** {} | **Excluded:** {}\n\n",
            self.metadata.total_students, self.metadata.total_variants, self.metadata.excluded_students
        ));
        if !self.metadata.sufficient_sample {
            md.push_str(&format!(
                "> Sample of {} is below the minimum of {}; item statistics are unreliable.\n\n",
                self.metadata.sample_size, self.analysis_config.min_sample_size
            ));
        }

        md.push_str("### Score distribution\n\n");
        md.push_str("| Mean | Median | SD | Skewness | Kurtosis | Min | Max |\n");
        md.push_str("|------|--------|----|----------|----------|-----|-----|\n");
        md.push_str(&format!(
            "| {:.1}% | {:.1}% | {:.3} | {} | {} | {:.1}% | {:.1}% |\n\n",
            dist.mean * 100.0,
            dist.median * 100.0,
            dist.standard_deviation,
            fmt_opt(dist.skewness),
            fmt_opt(dist.kurtosis),
            dist.min * 100.0,
            dist.max * 100.0,
        ));

        match &self.summary.reliability_metrics {
            Some(r) => md.push_str(&format!(
                "**Cronbach's alpha:** {:.3} | **Split-half:** {:.3} | **SEM:** {:.3}\n\n",
                r.cronbachs_alpha, r.split_half, r.standard_error_of_measurement
            )),
            None => md.push_str("**Reliability:** not computed (needs 3 students and 2 questions)\n\n"),
        }

        md.push_str("### Items\n\n");
        md.push_str("| Question | Type | N | Difficulty | Discrimination | Point-biserial | Flags |\n");
        md.push_str("|----------|------|---|------------|----------------|----------------|-------|\n");
        for q in &self.question_results {
            let flags: Vec<String> = q.flags.iter().map(ToString::to_string).collect();
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                q.question_id,
                q.question_type,
                q.respondents,
                fmt_opt(q.difficulty_index),
                fmt_opt(q.discrimination_index),
                fmt_opt(q.point_biserial_correlation),
                flags.join(", ")
            ));
        }

        md
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

/// Change of item statistics between two analyses of the same exam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    /// Questions whose difficulty or discrimination moved beyond the threshold.
    pub drifted: Vec<ItemDrift>,
    /// Questions with no significant change.
    pub unchanged: usize,
    /// Questions in current but not baseline.
    pub new_questions: usize,
    /// Questions in baseline but not current.
    pub removed_questions: usize,
    /// Change in mean score ratio.
    pub mean_score_delta: f64,
}

/// A single question's movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDrift {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discrimination_delta: Option<f64>,
}

/// Compare `current` against `baseline`, question by question.
///
/// A question drifts when its difficulty or discrimination index changed by
/// more than `threshold`. Metrics missing from either side are not compared.
pub fn compare_analyses(
    baseline: &AnalysisResult,
    current: &AnalysisResult,
    threshold: f64,
) -> DriftReport {
    let baseline_items: HashMap<&str, _> = baseline
        .question_results
        .iter()
        .map(|q| (q.question_id.as_str(), q))
        .collect();

    let delta = |a: Option<f64>, b: Option<f64>| match (a, b) {
        (Some(a), Some(b)) => Some(b - a),
        _ => None,
    };

    let mut drifted = Vec::new();
    let mut unchanged = 0usize;
    let mut new_questions = 0usize;

    for q in &current.question_results {
        let Some(base) = baseline_items.get(q.question_id.as_str()) else {
            new_questions += 1;
            continue;
        };
        let difficulty_delta = delta(base.difficulty_index, q.difficulty_index);
        let discrimination_delta = delta(base.discrimination_index, q.discrimination_index);
        let moved = [difficulty_delta, discrimination_delta]
            .iter()
            .flatten()
            .any(|d| d.abs() > threshold);
        if moved {
            drifted.push(ItemDrift {
                question_id: q.question_id.clone(),
                difficulty_delta,
                discrimination_delta,
            });
        } else {
            unchanged += 1;
        }
    }

    let removed_questions = baseline
        .question_results
        .iter()
        .filter(|b| current.question(&b.question_id).is_none())
        .count();

    DriftReport {
        drifted,
        unchanged,
        new_questions,
        removed_questions,
        mean_score_delta: current.average_score() - baseline.average_score(),
    }
}

impl DriftReport {
    /// Format the drift report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} drifted, {} unchanged, {} new, {} removed, mean score {:+.1}%\n\n",
            self.drifted.len(),
            self.unchanged,
            self.new_questions,
            self.removed_questions,
            self.mean_score_delta * 100.0
        ));

        if !self.drifted.is_empty() {
            md.push_str("### Drifted questions\n\n");
            md.push_str("| Question | Difficulty Δ | Discrimination Δ |\n");
            md.push_str("|----------|--------------|------------------|\n");
            for d in &self.drifted {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    d.question_id,
                    d.difficulty_delta
                        .map_or_else(|| "n/a".to_string(), |v| format!("{v:+.3}")),
                    d.discrimination_delta
                        .map_or_else(|| "n/a".to_string(), |v| format!("{v:+.3}")),
                ));
            }
        }

        md
    }

    /// Returns true if any question drifted.
    pub fn has_drift(&self) -> bool {
        !self.drifted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::exam::analyze_exam;
    use crate::model::*;

    fn tf_variant(ids: &[&str]) -> ExamVariant {
        ExamVariant {
            id: "v".into(),
            exam_id: "exam".into(),
            variant_code: "A".into(),
            exam_title: "Physics".into(),
            questions: ids
                .iter()
                .map(|id| QuestionDefinition {
                    id: (*id).into(),
                    text: String::new(),
                    question_type: QuestionType::TrueFalse,
                    options: vec![],
                    correct_answer: "true".into(),
                    points: 1.0,
                })
                .collect(),
            metadata: VariantMetadata::default(),
        }
    }

    fn attempt(student: &str, answers: &[(&str, bool)]) -> StudentResponse {
        let question_responses: Vec<QuestionResponse> = answers
            .iter()
            .map(|(id, ok)| QuestionResponse {
                question_id: (*id).into(),
                student_answer: ok.to_string(),
                is_correct: *ok,
                points: if *ok { 1.0 } else { 0.0 },
                max_points: 1.0,
                response_time: None,
            })
            .collect();
        StudentResponse {
            student_id: student.into(),
            variant_code: "A".into(),
            total_score: question_responses.iter().map(|r| r.points).sum(),
            max_possible_score: answers.len() as f64,
            question_responses,
            completion_time: None,
            started_at: None,
            completed_at: None,
        }
    }

    fn analysis(ids: &[&str], responses: &[StudentResponse]) -> AnalysisResult {
        analyze_exam(&[tf_variant(ids)], responses, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let result = analysis(
            &["q1", "q2"],
            &[
                attempt("s1", &[("q1", true), ("q2", false)]),
                attempt("s2", &[("q1", true), ("q2", true)]),
            ],
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analysis.json");

        result.save_json(&path).unwrap();
        let loaded = AnalysisResult::load_json(&path).unwrap();

        assert_eq!(loaded.exam_title, "Physics");
        assert_eq!(loaded.question_results.len(), 2);
        assert!(loaded.summary.score_distribution.skewness.is_none());
        assert_eq!(loaded.metadata.student_responses.len(), 2);
    }

    #[test]
    fn markdown_lists_items_and_missing_reliability() {
        let result = analysis(&["q1"], &[attempt("s1", &[("q1", true)])]);
        let md = result.to_markdown();
        assert!(md.contains("Physics"));
        assert!(md.contains("| q1 | true-false |"));
        assert!(md.contains("not computed"));
        assert!(md.contains("below the minimum"));
    }

    #[test]
    fn compare_detects_drift_and_membership_changes() {
        let baseline = analysis(
            &["q1", "q2"],
            &[
                attempt("s1", &[("q1", true), ("q2", true)]),
                attempt("s2", &[("q1", true), ("q2", false)]),
            ],
        );
        let current = analysis(
            &["q1", "q3"],
            &[
                attempt("s1", &[("q1", false), ("q3", true)]),
                attempt("s2", &[("q1", false), ("q3", false)]),
            ],
        );

        let report = compare_analyses(&baseline, &current, 0.1);
        assert!(report.has_drift());
        assert_eq!(report.drifted[0].question_id, "q1");
        assert_eq!(report.drifted[0].difficulty_delta, Some(-1.0));
        assert_eq!(report.new_questions, 1);
        assert_eq!(report.removed_questions, 1);
        assert!(report.to_markdown().contains("Drifted questions"));
    }

    #[test]
    fn compare_identical_analyses() {
        let responses = [
            attempt("s1", &[("q1", true)]),
            attempt("s2", &[("q1", false)]),
        ];
        let a = analysis(&["q1"], &responses);
        let b = analysis(&["q1"], &responses);
        let report = compare_analyses(&a, &b, 0.05);
        assert!(!report.has_drift());
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.mean_score_delta, 0.0);
    }
}
