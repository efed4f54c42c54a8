//! The `examstat validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examstat_core::dataset::{load_dataset, load_dataset_directory, validate_dataset};

pub fn execute(dataset_path: PathBuf) -> Result<()> {
    let datasets = if dataset_path.is_dir() {
        load_dataset_directory(&dataset_path)?
    } else {
        let name = dataset_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        vec![(name, load_dataset(&dataset_path)?)]
    };

    let mut total_warnings = 0;

    for (name, dataset) in &datasets {
        println!(
            "Dataset: {} ({} variants, {} responses)",
            name,
            dataset.variants.len(),
            dataset.responses.len()
        );

        let warnings = validate_dataset(dataset);
        for w in &warnings {
            let prefix = w
                .subject
                .as_ref()
                .map(|s| format!("  [{s}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All datasets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
