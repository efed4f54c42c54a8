//! The `examstat analyze` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use examstat_core::config::load_config_from;
use examstat_core::dataset::load_dataset;
use examstat_core::{analyze_by_variant, analyze_exam, AnalysisResult};
use examstat_report::html::{generate_html, write_html_report};

pub fn execute(
    dataset_path: PathBuf,
    config_path: Option<PathBuf>,
    by_variant: bool,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dataset = load_dataset(&dataset_path)?;

    tracing::info!(
        variants = dataset.variants.len(),
        responses = dataset.responses.len(),
        "loaded {}",
        dataset_path.display()
    );

    let results = if by_variant {
        let results = analyze_by_variant(&dataset.variants, &dataset.responses, &config.analysis);
        anyhow::ensure!(
            !results.is_empty(),
            "no variant in {} has responses to analyse",
            dataset_path.display()
        );
        results
    } else {
        vec![analyze_exam(
            &dataset.variants,
            &dataset.responses,
            &config.analysis,
        )?]
    };

    let formats: Vec<&str> = if format == "all" {
        anyhow::ensure!(output.is_some(), "--format all requires --output");
        vec!["text", "json", "markdown", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "text" => {
                for result in &results {
                    print_summary(result);
                }
            }
            "json" | "markdown" | "md" | "html" => match &output {
                Some(dir) => write_outputs(&results, fmt, dir, by_variant)?,
                None => print_outputs(&results, fmt)?,
            },
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_outputs(results: &[AnalysisResult], fmt: &str) -> Result<()> {
    match fmt {
        "json" => {
            let json = if let [single] = results {
                serde_json::to_string_pretty(single)?
            } else {
                serde_json::to_string_pretty(results)?
            };
            println!("{json}");
        }
        "html" => {
            for result in results {
                println!("{}", generate_html(result));
            }
        }
        _ => {
            for result in results {
                println!("{}", result.to_markdown());
            }
        }
    }
    Ok(())
}

fn write_outputs(results: &[AnalysisResult], fmt: &str, dir: &Path, by_variant: bool) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for result in results {
        let stem = match result.metadata.student_responses.first() {
            Some(r) if by_variant => format!("analysis-{}-{timestamp}", r.variant_code),
            _ => format!("analysis-{timestamp}"),
        };
        match fmt {
            "json" => {
                let path = dir.join(format!("{stem}.json"));
                result.save_json(&path)?;
                eprintln!("Analysis saved to: {}", path.display());
            }
            "html" => {
                let path = dir.join(format!("{stem}.html"));
                write_html_report(result, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                let path = dir.join(format!("{stem}.md"));
                std::fs::write(&path, result.to_markdown())?;
                eprintln!("Markdown report: {}", path.display());
            }
        }
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    use comfy_table::{Cell, Table};

    let dist = &result.summary.score_distribution;
    println!("{}", result.exam_title);
    println!(
        "  {} students, {} variants, {} excluded",
        result.metadata.total_students, result.metadata.total_variants, result.metadata.excluded_students
    );
    println!(
        "  mean {:.1}%, median {:.1}%, sd {:.3}",
        dist.mean * 100.0,
        dist.median * 100.0,
        dist.standard_deviation
    );
    match &result.summary.reliability_metrics {
        Some(r) => println!(
            "  alpha {:.3}, split-half {:.3}, SEM {:.3}",
            r.cronbachs_alpha, r.split_half, r.standard_error_of_measurement
        ),
        None => println!("  reliability not computed"),
    }
    if !result.metadata.sufficient_sample {
        println!(
            "  Warning: sample of {} is below the minimum of {}",
            result.metadata.sample_size, result.analysis_config.min_sample_size
        );
    }

    let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));

    let mut table = Table::new();
    table.set_header(vec![
        "Question",
        "Type",
        "N",
        "Difficulty",
        "Discrimination",
        "Point-biserial",
        "Flags",
    ]);

    for q in &result.question_results {
        let flags: Vec<String> = q.flags.iter().map(ToString::to_string).collect();
        table.add_row(vec![
            Cell::new(&q.question_id),
            Cell::new(q.question_type.to_string()),
            Cell::new(q.respondents),
            Cell::new(opt(q.difficulty_index)),
            Cell::new(opt(q.discrimination_index)),
            Cell::new(opt(q.point_biserial_correlation)),
            Cell::new(flags.join(", ")),
        ]);
    }

    println!("{table}\n");
}
