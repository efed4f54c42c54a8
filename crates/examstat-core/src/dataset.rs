//! JSON dataset loader.
//!
//! Loads exam variants and graded responses from files, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{ExamVariant, QuestionType, StudentResponse};

/// Everything needed for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamDataset {
    #[serde(default)]
    pub variants: Vec<ExamVariant>,
    #[serde(default)]
    pub responses: Vec<StudentResponse>,
}

/// Parse a single JSON dataset file.
pub fn load_dataset(path: &Path) -> Result<ExamDataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset file: {}", path.display()))?;

    parse_dataset_str(&content, path)
}

/// Parse a JSON string into an `ExamDataset` (useful for testing).
pub fn parse_dataset_str(content: &str, source_path: &Path) -> Result<ExamDataset> {
    let dataset: ExamDataset = serde_json::from_str(content)
        .with_context(|| format!("failed to parse dataset JSON: {}", source_path.display()))?;
    Ok(dataset)
}

/// Load every `.json` dataset in a directory (non-recursive).
///
/// Files that fail to parse are skipped with a warning.
pub fn load_dataset_directory(dir: &Path) -> Result<Vec<(String, ExamDataset)>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut datasets = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match load_dataset(&path) {
                Ok(dataset) => {
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    datasets.push((name, dataset));
                }
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }
    datasets.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(datasets)
}

/// A warning from dataset validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The variant code or student id the warning is about, if any.
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn about(subject: &str, message: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a dataset for issues that would silently skew an analysis.
pub fn validate_dataset(dataset: &ExamDataset) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if dataset.responses.is_empty() {
        warnings.push(ValidationWarning {
            subject: None,
            message: "dataset has no student responses".into(),
        });
    }

    let mut codes = HashSet::new();
    for variant in &dataset.variants {
        if variant.variant_code.trim().is_empty() {
            warnings.push(ValidationWarning::about(&variant.id, "variant has an empty code"));
        } else if !codes.insert(variant.variant_code.as_str()) {
            warnings.push(ValidationWarning::about(
                &variant.variant_code,
                format!("duplicate variant code: {}", variant.variant_code),
            ));
        }

        for question in &variant.questions {
            if question.points <= 0.0 {
                warnings.push(ValidationWarning::about(
                    &variant.variant_code,
                    format!("question {} has non-positive points", question.id),
                ));
            }
            if question.question_type == QuestionType::MultipleChoice
                && !question
                    .options
                    .iter()
                    .any(|o| o.trim() == question.correct_answer.trim())
            {
                warnings.push(ValidationWarning::about(
                    &variant.variant_code,
                    format!("question {} correct answer is not among its options", question.id),
                ));
            }
        }
    }

    let mut students = HashSet::new();
    for response in &dataset.responses {
        if !students.insert(response.student_id.as_str()) {
            warnings.push(ValidationWarning::about(
                &response.student_id,
                format!("duplicate student id: {}", response.student_id),
            ));
        }

        if response.variant_code.trim().is_empty() {
            warnings.push(ValidationWarning::about(
                &response.student_id,
                "response has an empty variant code and will be ignored by per-variant analysis",
            ));
            continue;
        }

        match dataset
            .variants
            .iter()
            .find(|v| v.variant_code == response.variant_code)
        {
            None => warnings.push(ValidationWarning::about(
                &response.student_id,
                format!("unknown variant code: {}", response.variant_code),
            )),
            Some(variant) => {
                for qr in &response.question_responses {
                    if variant.question(&qr.question_id).is_none() {
                        warnings.push(ValidationWarning::about(
                            &response.student_id,
                            format!(
                                "response to question {} which variant {} does not contain",
                                qr.question_id, variant.variant_code
                            ),
                        ));
                    }
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_JSON: &str = r#"{
  "variants": [
    {
      "id": "v-a",
      "exam_id": "exam-1",
      "variant_code": "A",
      "exam_title": "Chemistry Midterm",
      "questions": [
        {
          "id": "q1",
          "text": "Symbol for sodium?",
          "type": "multiple-choice",
          "options": ["Na", "So", "S", "N"],
          "correct_answer": "Na",
          "points": 1
        },
        {
          "id": "q2",
          "text": "Water is H2O",
          "type": "true-false",
          "correct_answer": "true",
          "points": 1
        }
      ],
      "metadata": { "question_order": [0, 1] }
    }
  ],
  "responses": [
    {
      "student_id": "s1",
      "variant_code": "A",
      "question_responses": [
        { "question_id": "q1", "student_answer": "Na", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q2", "student_answer": "true", "is_correct": true, "points": 1, "max_points": 1 }
      ],
      "total_score": 2,
      "max_possible_score": 2,
      "completed_at": "2026-03-01T10:30:00Z"
    }
  ]
}"#;

    #[test]
    fn parse_valid_dataset() {
        let dataset = parse_dataset_str(VALID_JSON, &PathBuf::from("test.json")).unwrap();
        assert_eq!(dataset.variants.len(), 1);
        assert_eq!(dataset.variants[0].questions.len(), 2);
        assert_eq!(
            dataset.variants[0].metadata.question_order,
            Some(vec![0, 1])
        );
        assert_eq!(dataset.responses[0].total_score, 2.0);
        assert!(dataset.responses[0].completed_at.is_some());
        assert!(validate_dataset(&dataset).is_empty());
    }

    #[test]
    fn parse_malformed_json() {
        let result = parse_dataset_str("{ not json", &PathBuf::from("bad.json"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_flags_unknown_and_empty_codes() {
        let mut dataset = parse_dataset_str(VALID_JSON, &PathBuf::from("test.json")).unwrap();
        let mut unknown = dataset.responses[0].clone();
        unknown.student_id = "s2".into();
        unknown.variant_code = "Z".into();
        let mut blank = dataset.responses[0].clone();
        blank.student_id = "s3".into();
        blank.variant_code = String::new();
        dataset.responses.push(unknown);
        dataset.responses.push(blank);

        let warnings = validate_dataset(&dataset);
        assert!(warnings.iter().any(|w| w.message.contains("unknown variant code: Z")));
        assert!(warnings.iter().any(|w| w.message.contains("empty variant code")));
    }

    #[test]
    fn validate_flags_duplicates_and_bad_keys() {
        let mut dataset = parse_dataset_str(VALID_JSON, &PathBuf::from("test.json")).unwrap();
        dataset.responses.push(dataset.responses[0].clone());
        dataset.variants[0].questions[0].correct_answer = "Xx".into();
        dataset.variants.push(dataset.variants[0].clone());

        let warnings = validate_dataset(&dataset);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate student id")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate variant code")));
        assert!(warnings.iter().any(|w| w.message.contains("not among its options")));
    }

    #[test]
    fn validate_flags_foreign_question() {
        let mut dataset = parse_dataset_str(VALID_JSON, &PathBuf::from("test.json")).unwrap();
        dataset.responses[0].question_responses[0].question_id = "q99".into();
        let warnings = validate_dataset(&dataset);
        assert!(warnings.iter().any(|w| w.message.contains("q99")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("midterm.json"), VALID_JSON).unwrap();
        std::fs::write(dir.path().join("broken.json"), "nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let datasets = load_dataset_directory(dir.path()).unwrap();
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].0, "midterm");
    }
}
