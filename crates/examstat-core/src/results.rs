//! Analysis output types.
//!
//! Anything that may legitimately be "not computed" is an `Option`, so a
//! disabled metric or a sample too small for a moment statistic can never be
//! mistaken for a computed zero.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::model::{QuestionType, StudentResponse};

/// Full result of analysing one exam (or one variant of it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub exam_id: String,
    pub exam_title: String,
    /// The configuration the analysis ran with.
    pub analysis_config: AnalysisConfig,
    /// One entry per question, in first-appearance order across variants.
    pub question_results: Vec<QuestionResult>,
    pub summary: ExamSummary,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Find the result for a question by its stable id.
    pub fn question(&self, id: &str) -> Option<&QuestionResult> {
        self.question_results.iter().find(|q| q.question_id == id)
    }

    /// Mean score ratio of the analysed attempts.
    pub fn average_score(&self) -> f64 {
        self.summary.score_distribution.mean
    }
}

/// Item-level statistics for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    #[serde(default)]
    pub question_text: String,
    pub question_type: QuestionType,
    /// Students with a response to this question.
    pub respondents: usize,
    pub correct_count: usize,
    /// Mean points awarded.
    pub average_points: f64,
    /// Proportion answering correctly (higher is easier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_index: Option<f64>,
    /// Wilson interval around the difficulty index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_interval: Option<ConfidenceInterval>,
    /// Upper-group minus lower-group proportion correct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discrimination_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_biserial_correlation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distractor_analysis: Option<DistractorAnalysis>,
    /// Mean seconds spent, when any response recorded a time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<ItemFlag>,
}

/// A two-sided confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

/// How often each option of a multiple-choice question was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistractorAnalysis {
    /// One entry per option, in the question's option order.
    pub options: Vec<OptionFrequency>,
    /// Answers that matched no option (blank or free text).
    pub unmatched: usize,
}

impl DistractorAnalysis {
    /// Distractors nobody chose.
    pub fn ineffective(&self) -> impl Iterator<Item = &OptionFrequency> {
        self.options.iter().filter(|o| !o.is_correct && o.count == 0)
    }
}

/// Selection count for one option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionFrequency {
    pub option: String,
    pub is_correct: bool,
    pub count: usize,
    /// Share of the question's respondents.
    pub proportion: f64,
}

/// Item quality warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemFlag {
    TooEasy,
    TooHard,
    PoorDiscrimination,
    NegativeDiscrimination,
    /// A distractor no respondent chose.
    IneffectiveDistractor { option: String },
    /// A distractor chosen more often than the keyed answer.
    PossibleKeyError { option: String },
}

impl fmt::Display for ItemFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemFlag::TooEasy => write!(f, "too easy"),
            ItemFlag::TooHard => write!(f, "too hard"),
            ItemFlag::PoorDiscrimination => write!(f, "poor discrimination"),
            ItemFlag::NegativeDiscrimination => write!(f, "negative discrimination"),
            ItemFlag::IneffectiveDistractor { option } => {
                write!(f, "ineffective distractor \"{option}\"")
            }
            ItemFlag::PossibleKeyError { option } => {
                write!(f, "possible key error (\"{option}\" beats the key)")
            }
        }
    }
}

/// Exam-level summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_difficulty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_discrimination: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_point_biserial: Option<f64>,
    /// Present only with at least 3 respondents and 2 scored questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_metrics: Option<ReliabilityMetrics>,
    pub score_distribution: ScoreDistribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_question_type: Option<BTreeMap<QuestionType, QuestionTypeSummary>>,
}

/// Internal-consistency estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityMetrics {
    pub cronbachs_alpha: f64,
    /// Odd/even split-half correlation, Spearman–Brown corrected.
    pub split_half: f64,
    /// Standard error of measurement on the score-ratio scale.
    pub standard_error_of_measurement: f64,
    /// `mean ± z·SEM` at the configured confidence level.
    pub measurement_band: ConfidenceInterval,
    pub item_count: usize,
    pub respondent_count: usize,
}

/// Distribution of score ratios (`total_score / max_possible_score`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub mean: f64,
    pub median: f64,
    pub standard_deviation: f64,
    /// `None` with fewer than 3 scores.
    pub skewness: Option<f64>,
    /// `None` with fewer than 4 scores.
    pub kurtosis: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub quartiles: Quartiles,
    /// Ten equal-width buckets over `[0, 1]`.
    #[serde(default)]
    pub histogram: Vec<ScoreBucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Averages for one question type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTypeSummary {
    pub question_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_difficulty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_discrimination: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_point_biserial: Option<f64>,
}

/// Bookkeeping about the analysed sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Distinct student ids.
    pub total_students: usize,
    pub total_variants: usize,
    pub analysis_date: DateTime<Utc>,
    /// Attempts used for the statistics.
    pub sample_size: usize,
    /// Attempts removed as incomplete.
    pub excluded_students: usize,
    /// Whether `sample_size` reached the configured minimum.
    pub sufficient_sample: bool,
    /// Exactly the attempts the statistics were computed from.
    pub student_responses: Vec<StudentResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_flag_serializes_with_kind_tag() {
        let flag = ItemFlag::IneffectiveDistractor {
            option: "C".into(),
        };
        let json = serde_json::to_string(&flag).unwrap();
        assert_eq!(json, r#"{"kind":"ineffective_distractor","option":"C"}"#);
        assert_eq!(
            serde_json::to_string(&ItemFlag::TooEasy).unwrap(),
            r#"{"kind":"too_easy"}"#
        );
    }

    #[test]
    fn ineffective_distractors_skip_the_key() {
        let analysis = DistractorAnalysis {
            options: vec![
                OptionFrequency {
                    option: "A".into(),
                    is_correct: true,
                    count: 0,
                    proportion: 0.0,
                },
                OptionFrequency {
                    option: "B".into(),
                    is_correct: false,
                    count: 0,
                    proportion: 0.0,
                },
                OptionFrequency {
                    option: "C".into(),
                    is_correct: false,
                    count: 2,
                    proportion: 1.0,
                },
            ],
            unmatched: 0,
        };
        let names: Vec<&str> = analysis.ineffective().map(|o| o.option.as_str()).collect();
        assert_eq!(names, vec!["B"]);
    }
}
