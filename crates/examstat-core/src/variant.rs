//! Per-variant analysis for section-over-section comparison.

use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::exam::analyze_exam;
use crate::model::{ExamVariant, StudentResponse};
use crate::results::AnalysisResult;

/// Analyse each variant's respondents separately.
///
/// Responses are grouped by `variant_code`. A response with an empty code,
/// or with a code none of `variants` carries, is dropped before grouping.
/// One [`AnalysisResult`] is produced per variant that has at least one
/// response, in the order the variants were supplied, titled
/// `"<title> - Variant <code>"`.
///
/// Never fails: with no usable responses the result is empty, and a group
/// whose analysis errors is logged and skipped.
pub fn analyze_by_variant(
    variants: &[ExamVariant],
    responses: &[StudentResponse],
    config: &AnalysisConfig,
) -> Vec<AnalysisResult> {
    let mut order: Vec<&ExamVariant> = Vec::new();
    for variant in variants {
        if variant.variant_code.trim().is_empty() {
            continue;
        }
        if !order.iter().any(|v| v.variant_code == variant.variant_code) {
            order.push(variant);
        }
    }

    let mut groups: HashMap<&str, Vec<StudentResponse>> = HashMap::new();
    let mut dropped = 0usize;
    for response in responses {
        let code = response.variant_code.trim();
        match order.iter().find(|v| v.variant_code.trim() == code) {
            Some(variant) if !code.is_empty() => groups
                .entry(variant.variant_code.as_str())
                .or_default()
                .push(response.clone()),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, "responses without a known variant code were dropped");
    }

    order
        .into_iter()
        .filter_map(|variant| {
            let group = groups.remove(variant.variant_code.as_str())?;
            let base_title = config
                .exam_title
                .clone()
                .unwrap_or_else(|| variant.exam_title.clone());
            let variant_config = config
                .clone()
                .with_exam_title(format!("{base_title} - Variant {}", variant.variant_code));

            match analyze_exam(std::slice::from_ref(variant), &group, &variant_config) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(
                        variant = %variant.variant_code,
                        error = %e,
                        "skipping variant analysis"
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionDefinition, QuestionResponse, QuestionType, VariantMetadata};

    fn variant(code: &str) -> ExamVariant {
        ExamVariant {
            id: format!("v-{code}"),
            exam_id: "exam-1".into(),
            variant_code: code.into(),
            exam_title: "Biology Quiz".into(),
            questions: ["q1", "q2"]
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

    fn response(student: &str, code: &str, correct: [bool; 2]) -> StudentResponse {
        let question_responses: Vec<QuestionResponse> = ["q1", "q2"]
            .iter()
            .zip(correct)
            .map(|(id, ok)| QuestionResponse {
                question_id: (*id).into(),
                student_answer: if ok { "true".into() } else { "false".into() },
                is_correct: ok,
                points: if ok { 1.0 } else { 0.0 },
                max_points: 1.0,
                response_time: None,
            })
            .collect();
        StudentResponse {
            student_id: student.into(),
            variant_code: code.into(),
            total_score: question_responses.iter().map(|r| r.points).sum(),
            max_possible_score: 2.0,
            question_responses,
            completion_time: None,
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let config = AnalysisConfig::default();
        assert!(analyze_by_variant(&[variant("A")], &[], &config).is_empty());
        assert!(analyze_by_variant(&[], &[], &config).is_empty());
    }

    #[test]
    fn empty_variant_code_is_dropped() {
        let responses = vec![
            response("s1", "A", [true, false]),
            response("s2", "", [true, true]),
        ];
        let results = analyze_by_variant(&[variant("A")], &responses, &AnalysisConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.total_students, 1);
        assert!(results[0]
            .metadata
            .student_responses
            .iter()
            .all(|r| r.student_id != "s2"));
    }

    #[test]
    fn unknown_variant_code_is_dropped() {
        let responses = vec![
            response("s1", "A", [true, false]),
            response("s2", "Z", [true, true]),
        ];
        let results = analyze_by_variant(&[variant("A")], &responses, &AnalysisConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.sample_size, 1);
    }

    #[test]
    fn only_unknown_codes_gives_empty_output() {
        let responses = vec![response("s1", "Q", [true, false])];
        assert!(
            analyze_by_variant(&[variant("A")], &responses, &AnalysisConfig::default()).is_empty()
        );
    }

    #[test]
    fn titles_carry_variant_code() {
        let responses = vec![
            response("s1", "A", [true, false]),
            response("s2", "B", [true, true]),
        ];
        let results = analyze_by_variant(
            &[variant("A"), variant("B")],
            &responses,
            &AnalysisConfig::default(),
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].exam_title, "Biology Quiz - Variant A");
        assert!(results[1].exam_title.ends_with("- Variant B"));
    }

    #[test]
    fn title_override_is_used_as_base() {
        let config = AnalysisConfig::default().with_exam_title("Spring Final");
        let results = analyze_by_variant(
            &[variant("A")],
            &[response("s1", "A", [true, true])],
            &config,
        );
        assert_eq!(results[0].exam_title, "Spring Final - Variant A");
    }

    #[test]
    fn variants_without_responses_produce_no_result() {
        let results = analyze_by_variant(
            &[variant("A"), variant("B")],
            &[response("s1", "B", [false, true])],
            &AnalysisConfig::default(),
        );
        assert_eq!(results.len(), 1);
        assert!(results[0].exam_title.ends_with("Variant B"));
    }

    #[test]
    fn invalid_config_yields_empty_instead_of_error() {
        let config = AnalysisConfig {
            confidence_level: 2.0,
            ..Default::default()
        };
        let results = analyze_by_variant(&[variant("A")], &[response("s1", "A", [true, true])], &config);
        assert!(results.is_empty());
    }
}
