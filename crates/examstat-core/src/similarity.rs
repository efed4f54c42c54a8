//! Academic-integrity similarity matrices.
//!
//! Two independent computations: how alike students' answers are (a
//! collusion signal), and how alike exam variants are built (a check that
//! randomization actually produced distinct variants). Both matrices are
//! symmetric with a diagonal of exactly `1.0`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{ExamVariant, StudentResponse};

/// `matrix[a][b]` is the similarity of `a` and `b`, in `[0, 1]`.
pub type SimilarityMatrix = BTreeMap<String, BTreeMap<String, f64>>;

/// Pairwise answer similarity between students.
///
/// For two students, the common set is every question id both have a
/// response to, wherever it appeared in their attempts. Similarity is the
/// number of common questions where both gave the same non-blank answer,
/// divided by the size of the common set, or `0.0` when nothing is shared.
/// When a student id appears more than once, the last attempt is used.
pub fn calculate_student_similarity_matrix(responses: &[StudentResponse]) -> SimilarityMatrix {
    let mut answers: BTreeMap<&str, HashMap<&str, &str>> = BTreeMap::new();
    for response in responses {
        let by_question = response
            .question_responses
            .iter()
            .map(|qr| (qr.question_id.as_str(), qr.student_answer.as_str()))
            .collect();
        answers.insert(response.student_id.as_str(), by_question);
    }

    let students: Vec<&str> = answers.keys().copied().collect();
    let mut matrix = identity_matrix(&students);

    for (i, a) in students.iter().enumerate() {
        for b in &students[i + 1..] {
            let score = answer_similarity(&answers[a], &answers[b]);
            insert_symmetric(&mut matrix, a, b, score);
        }
    }

    tracing::debug!(students = students.len(), "computed student similarity matrix");
    matrix
}

fn answer_similarity(a: &HashMap<&str, &str>, b: &HashMap<&str, &str>) -> f64 {
    let mut common = 0usize;
    let mut identical = 0usize;
    for (question, answer_a) in a {
        if let Some(answer_b) = b.get(question) {
            common += 1;
            if !answer_a.trim().is_empty() && answer_a == answer_b {
                identical += 1;
            }
        }
    }
    if common == 0 {
        return 0.0;
    }
    identical as f64 / common as f64
}

/// Pairwise construction similarity between exam variants.
///
/// Two comparison vectors are built over the pair's questions: whether each
/// presentation position holds the same question in both variants, and
/// whether each question's option permutation is identical. The score is
/// the number of matches across both vectors divided by twice the question
/// count, so ordering and shuffling carry equal weight. When a variant code
/// repeats, the first variant with that code is used.
pub fn calculate_variant_similarity_matrix(variants: &[ExamVariant]) -> SimilarityMatrix {
    let mut by_code: BTreeMap<&str, &ExamVariant> = BTreeMap::new();
    for variant in variants {
        by_code.entry(variant.variant_code.as_str()).or_insert(variant);
    }

    let codes: Vec<&str> = by_code.keys().copied().collect();
    let mut matrix = identity_matrix(&codes);

    for (i, a) in codes.iter().enumerate() {
        for b in &codes[i + 1..] {
            let score = construction_similarity(by_code[a], by_code[b]);
            insert_symmetric(&mut matrix, a, b, score);
        }
    }

    tracing::debug!(variants = codes.len(), "computed variant similarity matrix");
    matrix
}

fn construction_similarity(a: &ExamVariant, b: &ExamVariant) -> f64 {
    let question_ids = question_ids(a, b);
    let order_len = |v: &ExamVariant| {
        v.metadata
            .question_order
            .as_ref()
            .map_or(v.questions.len(), Vec::len)
    };
    let question_count = question_ids.len().max(order_len(a)).max(order_len(b));
    if question_count == 0 {
        return 1.0;
    }

    let same_position = (0..question_count)
        .filter(|&p| same_question_at(a, b, p))
        .count();
    let same_permutation = question_ids
        .iter()
        .filter(|id| {
            matches!(
                (option_permutation(a, id), option_permutation(b, id)),
                (Some(pa), Some(pb)) if pa == pb
            )
        })
        .count();

    (same_position + same_permutation) as f64 / (2 * question_count) as f64
}

/// Every question id either variant defines or shuffles, in first-seen order.
fn question_ids<'a>(a: &'a ExamVariant, b: &'a ExamVariant) -> Vec<&'a str> {
    let mut ids: Vec<&str> = Vec::new();
    for variant in [a, b] {
        let defined = variant.questions.iter().map(|q| q.id.as_str());
        let shuffled = variant.metadata.option_permutations.keys().map(String::as_str);
        for id in defined.chain(shuffled) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Compares `question_order` when both variants record one, otherwise the
/// question ids at that position.
fn same_question_at(a: &ExamVariant, b: &ExamVariant, position: usize) -> bool {
    match (&a.metadata.question_order, &b.metadata.question_order) {
        (Some(order_a), Some(order_b)) => {
            matches!((order_a.get(position), order_b.get(position)), (Some(x), Some(y)) if x == y)
        }
        _ => matches!(
            (a.questions.get(position), b.questions.get(position)),
            (Some(x), Some(y)) if x.id == y.id
        ),
    }
}

/// The option permutation a variant applied to a question. Questions the
/// variant presents without a recorded permutation were not shuffled.
fn option_permutation(variant: &ExamVariant, question_id: &str) -> Option<Vec<usize>> {
    if let Some(permutation) = variant.metadata.option_permutations.get(question_id) {
        return Some(permutation.clone());
    }
    variant
        .question(question_id)
        .map(|q| (0..q.options.len()).collect())
}

fn identity_matrix(keys: &[&str]) -> SimilarityMatrix {
    keys.iter()
        .map(|k| {
            let mut row = BTreeMap::new();
            row.insert((*k).to_string(), 1.0);
            ((*k).to_string(), row)
        })
        .collect()
}

fn insert_symmetric(matrix: &mut SimilarityMatrix, a: &str, b: &str, score: f64) {
    matrix
        .entry(a.to_string())
        .or_default()
        .insert(b.to_string(), score);
    matrix
        .entry(b.to_string())
        .or_default()
        .insert(a.to_string(), score);
}

/// A pair of students or variants whose similarity met a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPair {
    pub first: String,
    pub second: String,
    pub similarity: f64,
}

/// List each off-diagonal pair scoring at least `threshold`, most similar
/// first.
pub fn flag_similar_pairs(matrix: &SimilarityMatrix, threshold: f64) -> Vec<SimilarPair> {
    let mut pairs: Vec<SimilarPair> = matrix
        .iter()
        .flat_map(|(a, row)| {
            row.iter()
                .filter(move |(b, _)| a < *b)
                .filter(move |&(_, &score)| score >= threshold)
                .map(move |(b, &score)| SimilarPair {
                    first: a.clone(),
                    second: b.clone(),
                    similarity: score,
                })
        })
        .collect();
    pairs.sort_by(|x, y| {
        y.similarity
            .total_cmp(&x.similarity)
            .then_with(|| x.first.cmp(&y.first))
            .then_with(|| x.second.cmp(&y.second))
    });
    pairs
}
