//! The `examstat compare` command.

use std::path::PathBuf;

use anyhow::Result;

use examstat_core::report::compare_analyses;
use examstat_core::AnalysisResult;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_drift: bool,
    format: String,
) -> Result<()> {
    let baseline = AnalysisResult::load_json(&baseline_path)?;
    let current = AnalysisResult::load_json(&current_path)?;

    let report = compare_analyses(&baseline, &current, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} drifted, {} unchanged, mean score {:+.1}%",
                report.drifted.len(),
                report.unchanged,
                report.mean_score_delta * 100.0
            );

            if !report.drifted.is_empty() {
                println!("\nDrifted questions:");
                for d in &report.drifted {
                    let fmt = |v: Option<f64>| {
                        v.map_or_else(|| "n/a".to_string(), |v| format!("{v:+.3}"))
                    };
                    println!(
                        "  {} difficulty {} discrimination {}",
                        d.question_id,
                        fmt(d.difficulty_delta),
                        fmt(d.discrimination_delta)
                    );
                }
            }

            if report.new_questions > 0 {
                println!("\n{} new question(s)", report.new_questions);
            }
            if report.removed_questions > 0 {
                println!("{} removed question(s)", report.removed_questions);
            }
        }
    }

    if fail_on_drift && report.has_drift() {
        std::process::exit(1);
    }

    Ok(())
}
