//! The `examstat similarity` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use examstat_core::config::load_config_from;
use examstat_core::dataset::load_dataset;
use examstat_core::similarity::{flag_similar_pairs, SimilarPair};
use examstat_core::{
    calculate_student_similarity_matrix, calculate_variant_similarity_matrix, SimilarityMatrix,
};

/// Largest matrix printed in full by the text format.
const MAX_PRINTED_MATRIX: usize = 12;

#[derive(Serialize)]
struct SimilarityOutput<'a> {
    kind: &'a str,
    threshold: f64,
    matrix: &'a SimilarityMatrix,
    flagged: &'a [SimilarPair],
}

pub fn execute(
    dataset_path: PathBuf,
    kind: String,
    threshold: Option<f64>,
    config_path: Option<PathBuf>,
    format: String,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dataset = load_dataset(&dataset_path)?;

    let (matrix, default_threshold) = match kind.as_str() {
        "students" | "student" => (
            calculate_student_similarity_matrix(&dataset.responses),
            config.integrity.student_similarity_threshold,
        ),
        "variants" | "variant" => (
            calculate_variant_similarity_matrix(&dataset.variants),
            config.integrity.variant_similarity_threshold,
        ),
        other => anyhow::bail!("unknown similarity kind '{other}' (expected students or variants)"),
    };
    let threshold = threshold.unwrap_or(default_threshold);
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "threshold must be between 0.0 and 1.0"
    );

    let flagged = flag_similar_pairs(&matrix, threshold);

    match format.as_str() {
        "json" => {
            let out = SimilarityOutput {
                kind: &kind,
                threshold,
                matrix: &matrix,
                flagged: &flagged,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => {
            println!("{} {} compared", matrix.len(), kind);
            if matrix.len() <= MAX_PRINTED_MATRIX && !matrix.is_empty() {
                print_matrix(&matrix);
            }

            if flagged.is_empty() {
                println!("No pairs at or above {threshold:.2}.");
            } else {
                println!("\nPairs at or above {threshold:.2}:");
                for pair in &flagged {
                    println!(
                        "  {} <-> {}  {:.1}%",
                        pair.first,
                        pair.second,
                        pair.similarity * 100.0
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_matrix(matrix: &SimilarityMatrix) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    let mut header = vec![Cell::new("")];
    header.extend(matrix.keys().map(Cell::new));
    table.set_header(header);

    for (id, row) in matrix {
        let mut cells = vec![Cell::new(id)];
        cells.extend(matrix.keys().map(|other| {
            Cell::new(
                row.get(other)
                    .map_or_else(|| "-".to_string(), |s| format!("{s:.2}")),
            )
        }));
        table.add_row(cells);
    }

    println!("{table}");
}
