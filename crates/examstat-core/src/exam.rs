//! Exam-level analysis orchestrator.
//!
//! Runs the item analyzer over every question shared by a set of variants
//! and aggregates the results into summary, distribution and reliability
//! statistics.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::Utc;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::item::{analyze_item, ItemObservation};
use crate::model::{ExamVariant, QuestionDefinition, QuestionType, StudentResponse};
use crate::results::{
    AnalysisMetadata, AnalysisResult, ConfidenceInterval, ExamSummary, QuestionResult,
    QuestionTypeSummary, Quartiles, ReliabilityMetrics, ScoreBucket, ScoreDistribution,
};
use crate::statistics::{
    kurtosis, mean, pearson_correlation, quantile, skewness, sorted_copy, standard_deviation,
    variance, z_for_confidence,
};

const HISTOGRAM_BUCKETS: usize = 10;
const MIN_RELIABILITY_RESPONDENTS: usize = 3;
const MIN_RELIABILITY_ITEMS: usize = 2;

/// Analyse every response to one exam.
///
/// `variants` are the renditions of the exam the responses were taken
/// against; questions are matched to responses by their stable id, never by
/// position, so reordered and reshuffled variants aggregate correctly.
///
/// Fails when `responses` is empty (whatever `variants` holds), when the
/// config is invalid, or when `exclude_incomplete_data` leaves nothing to
/// analyse.
pub fn analyze_exam(
    variants: &[ExamVariant],
    responses: &[StudentResponse],
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    if responses.is_empty() {
        return Err(AnalysisError::NoResponses);
    }
    config.validate()?;

    let (included, excluded_students) = if config.exclude_incomplete_data {
        let included: Vec<StudentResponse> = responses
            .iter()
            .filter(|r| !is_incomplete(r, variants))
            .cloned()
            .collect();
        let excluded = responses.len() - included.len();
        (included, excluded)
    } else {
        (responses.to_vec(), 0)
    };

    if included.is_empty() {
        return Err(AnalysisError::NoUsableResponses {
            excluded: excluded_students,
        });
    }

    let questions = collect_questions(variants);
    tracing::debug!(
        variants = variants.len(),
        responses = included.len(),
        excluded = excluded_students,
        questions = questions.len(),
        "analyzing exam"
    );

    let ratios: Vec<f64> = included.iter().map(StudentResponse::score_ratio).collect();

    let question_results: Vec<QuestionResult> = questions
        .iter()
        .map(|question| {
            let observations: Vec<ItemObservation<'_>> = included
                .iter()
                .filter_map(|response| {
                    response
                        .response_to(&question.id)
                        .map(|qr| ItemObservation {
                            is_correct: qr.is_correct,
                            points: qr.points,
                            total_score: response.total_score,
                            answer: &qr.student_answer,
                            response_time: qr.response_time,
                        })
                })
                .collect();
            analyze_item(question, &observations, config)
        })
        .collect();

    let score_distribution = score_distribution(&ratios);
    let reliability_metrics = reliability_metrics(
        &included,
        &question_results,
        &score_distribution,
        config.confidence_level,
    );

    let summary = ExamSummary {
        average_difficulty: average_of(&question_results, |q| q.difficulty_index),
        average_discrimination: average_of(&question_results, |q| q.discrimination_index),
        average_point_biserial: average_of(&question_results, |q| q.point_biserial_correlation),
        reliability_metrics,
        score_distribution,
        by_question_type: config
            .group_by_question_type
            .then(|| summarize_by_type(&question_results)),
    };

    let total_students = included
        .iter()
        .map(|r| r.student_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let total_variants = variants
        .iter()
        .map(|v| v.variant_code.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let sample_size = included.len();
    let sufficient_sample = sample_size >= config.min_sample_size;
    if !sufficient_sample {
        tracing::warn!(
            sample_size,
            min_sample_size = config.min_sample_size,
            "sample below minimum size, item statistics are unreliable"
        );
    }

    let exam_id = variants
        .first()
        .map(|v| v.exam_id.clone())
        .unwrap_or_default();
    let exam_title = config
        .exam_title
        .clone()
        .or_else(|| variants.first().map(|v| v.exam_title.clone()))
        .unwrap_or_default();

    Ok(AnalysisResult {
        exam_id,
        exam_title,
        analysis_config: config.clone(),
        question_results,
        summary,
        metadata: AnalysisMetadata {
            total_students,
            total_variants,
            analysis_date: Utc::now(),
            sample_size,
            excluded_students,
            sufficient_sample,
            student_responses: included,
        },
    })
}

/// Union of all variants' questions keyed by id, in first-appearance order.
fn collect_questions(variants: &[ExamVariant]) -> Vec<&QuestionDefinition> {
    let mut seen = HashSet::new();
    variants
        .iter()
        .flat_map(|v| v.questions.iter())
        .filter(|q| seen.insert(q.id.as_str()))
        .collect()
}

/// An attempt is incomplete when it has no answers, no positive maximum, or
/// leaves a question of its own variant unanswered.
fn is_incomplete(response: &StudentResponse, variants: &[ExamVariant]) -> bool {
    if response.question_responses.is_empty() || response.max_possible_score <= 0.0 {
        return true;
    }
    variants
        .iter()
        .find(|v| v.variant_code == response.variant_code)
        .is_some_and(|variant| {
            variant.questions.iter().any(|q| {
                !response
                    .response_to(&q.id)
                    .is_some_and(|qr| qr.is_answered())
            })
        })
}

fn average_of(
    results: &[QuestionResult],
    metric: impl Fn(&QuestionResult) -> Option<f64>,
) -> Option<f64> {
    let values: Vec<f64> = results.iter().filter_map(metric).collect();
    (!values.is_empty()).then(|| mean(&values))
}

/// Distribution statistics over score ratios.
pub fn score_distribution(ratios: &[f64]) -> ScoreDistribution {
    let sorted = sorted_copy(ratios);

    let mut counts = [0usize; HISTOGRAM_BUCKETS];
    for &ratio in ratios {
        let idx = (ratio.clamp(0.0, 1.0) * HISTOGRAM_BUCKETS as f64) as usize;
        counts[idx.min(HISTOGRAM_BUCKETS - 1)] += 1;
    }
    let histogram = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| ScoreBucket {
            lower: i as f64 / HISTOGRAM_BUCKETS as f64,
            upper: (i + 1) as f64 / HISTOGRAM_BUCKETS as f64,
            count,
        })
        .collect();

    ScoreDistribution {
        mean: mean(ratios),
        median: quantile(&sorted, 0.5),
        standard_deviation: standard_deviation(ratios),
        skewness: skewness(ratios),
        kurtosis: kurtosis(ratios),
        min: sorted.first().copied().unwrap_or(0.0),
        max: sorted.last().copied().unwrap_or(0.0),
        quartiles: Quartiles {
            q1: quantile(&sorted, 0.25),
            q2: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
        },
        histogram,
    }
}

/// Cronbach's alpha, split-half and SEM over awarded points.
///
/// `None` unless there are at least 3 respondents and 2 scored questions
/// (questions somebody answered). Missing responses count as zero points.
pub fn reliability_metrics(
    responses: &[StudentResponse],
    question_results: &[QuestionResult],
    distribution: &ScoreDistribution,
    confidence_level: f64,
) -> Option<ReliabilityMetrics> {
    let scored: Vec<&str> = question_results
        .iter()
        .filter(|q| q.respondents > 0)
        .map(|q| q.question_id.as_str())
        .collect();
    if responses.len() < MIN_RELIABILITY_RESPONDENTS || scored.len() < MIN_RELIABILITY_ITEMS {
        return None;
    }

    let matrix: Vec<Vec<f64>> = responses
        .iter()
        .map(|r| {
            scored
                .iter()
                .map(|id| r.response_to(id).map_or(0.0, |qr| qr.points))
                .collect()
        })
        .collect();

    let k = scored.len() as f64;
    let totals: Vec<f64> = matrix.iter().map(|row| row.iter().sum()).collect();
    let total_variance = variance(&totals);
    let item_variance_sum: f64 = (0..scored.len())
        .map(|j| variance(&matrix.iter().map(|row| row[j]).collect::<Vec<_>>()))
        .sum();

    let cronbachs_alpha = if total_variance == 0.0 {
        0.0
    } else {
        k / (k - 1.0) * (1.0 - item_variance_sum / total_variance)
    };

    let odd: Vec<f64> = matrix
        .iter()
        .map(|row| row.iter().step_by(2).sum())
        .collect();
    let even: Vec<f64> = matrix
        .iter()
        .map(|row| row.iter().skip(1).step_by(2).sum())
        .collect();
    let r = pearson_correlation(&odd, &even);
    let split_half = if 1.0 + r <= 0.0 {
        0.0
    } else {
        2.0 * r / (1.0 + r)
    };

    let sem = distribution.standard_deviation * (1.0 - cronbachs_alpha.clamp(0.0, 1.0)).sqrt();
    let z = z_for_confidence(confidence_level);

    Some(ReliabilityMetrics {
        cronbachs_alpha,
        split_half,
        standard_error_of_measurement: sem,
        measurement_band: ConfidenceInterval {
            lower: (distribution.mean - z * sem).max(0.0),
            upper: (distribution.mean + z * sem).min(1.0),
            level: confidence_level,
        },
        item_count: scored.len(),
        respondent_count: responses.len(),
    })
}

fn summarize_by_type(results: &[QuestionResult]) -> BTreeMap<QuestionType, QuestionTypeSummary> {
    let mut grouped: BTreeMap<_, Vec<QuestionResult>> = BTreeMap::new();
    for result in results {
        grouped
            .entry(result.question_type)
            .or_default()
            .push(result.clone());
    }
    grouped
        .into_iter()
        .map(|(question_type, group)| {
            let summary = QuestionTypeSummary {
                question_count: group.len(),
                average_difficulty: average_of(&group, |q| q.difficulty_index),
                average_discrimination: average_of(&group, |q| q.discrimination_index),
                average_point_biserial: average_of(&group, |q| q.point_biserial_correlation),
            };
            (question_type, summary)
        })
        .collect()
}
