//! Input data model for the analysis engine.
//!
//! These are the plain records the hosting application hands to the engine:
//! exam variant definitions and graded student attempts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single question as defined on one exam variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    /// Stable identifier shared by every variant presenting this question.
    pub id: String,
    /// Question text.
    #[serde(default)]
    pub text: String,
    /// Kind of question.
    #[serde(rename = "type", alias = "question_type")]
    pub question_type: QuestionType,
    /// Answer options in presentation order (empty for true/false).
    #[serde(default)]
    pub options: Vec<String>,
    /// The keyed answer.
    pub correct_answer: String,
    /// Points available for this question.
    #[serde(default = "default_points")]
    pub points: f64,
}

fn default_points() -> f64 {
    1.0
}

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::TrueFalse => write!(f, "true-false"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "multiple-choice" | "mc" => Ok(QuestionType::MultipleChoice),
            "true-false" | "tf" => Ok(QuestionType::TrueFalse),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// One randomized rendition of an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamVariant {
    pub id: String,
    pub exam_id: String,
    /// Short label such as `"A"`.
    pub variant_code: String,
    #[serde(default)]
    pub exam_title: String,
    /// Questions in the order they were presented.
    #[serde(default)]
    pub questions: Vec<QuestionDefinition>,
    #[serde(default)]
    pub metadata: VariantMetadata,
}

impl ExamVariant {
    /// Look up a question by its stable id.
    pub fn question(&self, id: &str) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// How a variant was derived from the canonical exam.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantMetadata {
    /// `question_order[p]` is the original index of the question presented
    /// at position `p`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_order: Option<Vec<usize>>,
    /// Per question id: index is the presented option position, value is the
    /// original option position. Questions absent here were not shuffled.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub option_permutations: BTreeMap<String, Vec<usize>>,
}

/// One student's graded answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question_id: String,
    #[serde(default)]
    pub student_answer: String,
    /// Grading outcome, trusted as given.
    pub is_correct: bool,
    /// Points awarded.
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub max_points: f64,
    /// Seconds spent on the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

impl QuestionResponse {
    /// Whether the student gave any answer at all.
    pub fn is_answered(&self) -> bool {
        !self.student_answer.trim().is_empty()
    }
}

/// One student's full attempt at one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub student_id: String,
    #[serde(default)]
    pub variant_code: String,
    #[serde(default)]
    pub question_responses: Vec<QuestionResponse>,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub max_possible_score: f64,
    /// Seconds taken for the whole attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StudentResponse {
    /// Total score as a fraction of the maximum. Non-positive maxima give 0.
    pub fn score_ratio(&self) -> f64 {
        if self.max_possible_score > 0.0 {
            self.total_score / self.max_possible_score
        } else {
            0.0
        }
    }

    /// Find the response to a given question.
    pub fn response_to(&self, question_id: &str) -> Option<&QuestionResponse> {
        self.question_responses
            .iter()
            .find(|r| r.question_id == question_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::MultipleChoice.to_string(), "multiple-choice");
        assert_eq!(QuestionType::TrueFalse.to_string(), "true-false");
        assert_eq!(
            "multiple_choice".parse::<QuestionType>().unwrap(),
            QuestionType::MultipleChoice
        );
        assert_eq!("TF".parse::<QuestionType>().unwrap(), QuestionType::TrueFalse);
        assert!("essay".parse::<QuestionType>().is_err());
    }

    #[test]
    fn score_ratio_handles_zero_maximum() {
        let response = StudentResponse {
            student_id: "s1".into(),
            variant_code: "A".into(),
            question_responses: vec![],
            total_score: 4.0,
            max_possible_score: 0.0,
            completion_time: None,
            started_at: None,
            completed_at: None,
        };
        assert_eq!(response.score_ratio(), 0.0);
    }

    #[test]
    fn question_definition_json_uses_type_key() {
        let json = r#"{
            "id": "q1",
            "text": "2 + 2?",
            "type": "multiple-choice",
            "options": ["3", "4", "5"],
            "correct_answer": "4"
        }"#;
        let q: QuestionDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(q.question_type, QuestionType::MultipleChoice);
        assert_eq!(q.points, 1.0);
        assert_eq!(q.options.len(), 3);
    }

    #[test]
    fn variant_metadata_defaults_to_unshuffled() {
        let json = r#"{"id": "v1", "exam_id": "e1", "variant_code": "A"}"#;
        let v: ExamVariant = serde_json::from_str(json).unwrap();
        assert!(v.metadata.question_order.is_none());
        assert!(v.metadata.option_permutations.is_empty());
        assert!(v.questions.is_empty());
    }
}
