//! Per-question (item) analysis.
//!
//! Classical test theory item statistics: difficulty, upper/lower group
//! discrimination, point-biserial correlation and distractor frequencies.

use crate::config::AnalysisConfig;
use crate::model::{QuestionDefinition, QuestionType};
use crate::results::{
    ConfidenceInterval, DistractorAnalysis, ItemFlag, OptionFrequency, QuestionResult,
};
use crate::statistics::{has_no_spread, mean, point_biserial_correlation, z_for_confidence};

/// Share of respondents in each of the upper and lower groups.
const GROUP_FRACTION: f64 = 0.27;

const TOO_EASY_ABOVE: f64 = 0.9;
const TOO_HARD_BELOW: f64 = 0.2;
const POOR_DISCRIMINATION_BELOW: f64 = 0.2;

/// One respondent's data point for a single question.
#[derive(Debug, Clone, Copy)]
pub struct ItemObservation<'a> {
    pub is_correct: bool,
    pub points: f64,
    /// The respondent's total score for the whole attempt.
    pub total_score: f64,
    pub answer: &'a str,
    pub response_time: Option<f64>,
}

/// Compute every enabled statistic for one question.
///
/// A question nobody answered gets no metrics at all.
pub fn analyze_item(
    question: &QuestionDefinition,
    observations: &[ItemObservation<'_>],
    config: &AnalysisConfig,
) -> QuestionResult {
    let respondents = observations.len();
    let correct: Vec<bool> = observations.iter().map(|o| o.is_correct).collect();
    let totals: Vec<f64> = observations.iter().map(|o| o.total_score).collect();
    let correct_count = correct.iter().filter(|&&c| c).count();
    let points: Vec<f64> = observations.iter().map(|o| o.points).collect();

    let times: Vec<f64> = observations.iter().filter_map(|o| o.response_time).collect();
    let average_response_time = (!times.is_empty()).then(|| mean(&times));

    let mut result = QuestionResult {
        question_id: question.id.clone(),
        question_text: question.text.clone(),
        question_type: question.question_type,
        respondents,
        correct_count,
        average_points: mean(&points),
        difficulty_index: None,
        difficulty_interval: None,
        discrimination_index: None,
        point_biserial_correlation: None,
        distractor_analysis: None,
        average_response_time,
        flags: Vec::new(),
    };

    if respondents == 0 {
        return result;
    }

    if config.include_difficulty_index {
        let p = difficulty_index(&correct);
        result.difficulty_index = Some(p);
        result.difficulty_interval = wilson_interval(
            correct_count,
            respondents,
            z_for_confidence(config.confidence_level),
            config.confidence_level,
        );
        if p > TOO_EASY_ABOVE {
            result.flags.push(ItemFlag::TooEasy);
        } else if p < TOO_HARD_BELOW {
            result.flags.push(ItemFlag::TooHard);
        }
    }

    if config.include_discrimination_index {
        let d = discrimination_index(&correct, &totals);
        result.discrimination_index = Some(d);
        if d < 0.0 {
            result.flags.push(ItemFlag::NegativeDiscrimination);
        } else if d < POOR_DISCRIMINATION_BELOW {
            result.flags.push(ItemFlag::PoorDiscrimination);
        }
    }

    if config.include_point_biserial {
        result.point_biserial_correlation = Some(point_biserial_correlation(&correct, &totals));
    }

    if config.include_distractor_analysis {
        if let Some(analysis) =
            analyze_distractors(question, observations.iter().map(|o| o.answer))
        {
            result.flags.extend(distractor_flags(question, &analysis));
            result.distractor_analysis = Some(analysis);
        }
    }

    result
}

/// Proportion answering correctly. `0.0` with no respondents.
pub fn difficulty_index(correct: &[bool]) -> f64 {
    if correct.is_empty() {
        return 0.0;
    }
    correct.iter().filter(|&&c| c).count() as f64 / correct.len() as f64
}

/// Upper/lower group discrimination index.
///
/// Respondents are ranked by total score; the top and bottom 27% (at least
/// one respondent each) form the groups and `D = p_upper - p_lower`. With
/// fewer than two respondents, or when every total is identical, there is
/// nothing to discriminate on and the index is `0.0`.
pub fn discrimination_index(correct: &[bool], totals: &[f64]) -> f64 {
    let n = correct.len();
    if n < 2 || totals.len() != n {
        return 0.0;
    }
    if has_no_spread(totals) {
        return 0.0;
    }

    let mut ranked: Vec<usize> = (0..n).collect();
    ranked.sort_by(|&a, &b| totals[b].total_cmp(&totals[a]));

    let group = ((n as f64 * GROUP_FRACTION).round() as usize).clamp(1, n / 2);
    let proportion = |indices: &[usize]| {
        indices.iter().filter(|&&i| correct[i]).count() as f64 / indices.len() as f64
    };

    proportion(&ranked[..group]) - proportion(&ranked[n - group..])
}

/// Wilson score interval for a binomial proportion.
pub fn wilson_interval(
    successes: usize,
    trials: usize,
    z: f64,
    level: f64,
) -> Option<ConfidenceInterval> {
    if trials == 0 || !z.is_finite() {
        return None;
    }
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    Some(ConfidenceInterval {
        lower: (center - half).max(0.0),
        upper: (center + half).min(1.0),
        level,
    })
}

/// Count how often each option was chosen.
///
/// Only multiple-choice questions with options are analysed; other question
/// types return `None`. Answers are compared to options after trimming.
pub fn analyze_distractors<'a>(
    question: &QuestionDefinition,
    answers: impl Iterator<Item = &'a str>,
) -> Option<DistractorAnalysis> {
    if question.question_type != QuestionType::MultipleChoice || question.options.is_empty() {
        return None;
    }

    let key = question.correct_answer.trim();
    let mut counts = vec![0usize; question.options.len()];
    let mut unmatched = 0usize;
    let mut total = 0usize;

    for answer in answers {
        total += 1;
        let answer = answer.trim();
        match question.options.iter().position(|o| o.trim() == answer) {
            Some(idx) => counts[idx] += 1,
            None => unmatched += 1,
        }
    }

    let options = question
        .options
        .iter()
        .zip(counts)
        .map(|(option, count)| OptionFrequency {
            option: option.clone(),
            is_correct: option.trim() == key,
            count,
            proportion: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();

    Some(DistractorAnalysis { options, unmatched })
}

fn distractor_flags(question: &QuestionDefinition, analysis: &DistractorAnalysis) -> Vec<ItemFlag> {
    let key_count = analysis
        .options
        .iter()
        .find(|o| o.is_correct)
        .map(|o| o.count);

    let mut flags = Vec::new();
    for option in analysis.options.iter().filter(|o| !o.is_correct) {
        if option.count == 0 {
            flags.push(ItemFlag::IneffectiveDistractor {
                option: option.option.clone(),
            });
        } else if key_count.is_some_and(|k| option.count > k) {
            flags.push(ItemFlag::PossibleKeyError {
                option: option.option.clone(),
            });
        }
    }
    if key_count.is_none() {
        tracing::debug!(question = %question.id, "correct answer is not among the options");
    }
    flags
}
