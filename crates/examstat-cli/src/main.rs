//! examstat CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "examstat",
    version,
    about = "Psychometric exam analysis and integrity checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse graded responses
    Analyze {
        /// Path to the dataset JSON file
        #[arg(long)]
        dataset: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Produce one analysis per variant instead of one for the whole exam
        #[arg(long)]
        by_variant: bool,

        /// Output format: text, json, markdown, html, all
        #[arg(long, default_value = "text")]
        format: String,

        /// Output directory (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compute pairwise similarity between students or variants
    Similarity {
        /// Path to the dataset JSON file
        #[arg(long)]
        dataset: PathBuf,

        /// What to compare: students, variants
        #[arg(long, default_value = "students")]
        kind: String,

        /// Flag pairs at or above this similarity (default from config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compare two saved analyses
    Compare {
        /// Baseline analysis JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current analysis JSON
        #[arg(long)]
        current: PathBuf,

        /// Drift threshold for difficulty and discrimination
        #[arg(long, default_value = "0.1")]
        threshold: f64,

        /// Exit code 1 if any question drifted
        #[arg(long)]
        fail_on_drift: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate dataset JSON files
    Validate {
        /// Path to dataset file or directory
        #[arg(long)]
        dataset: PathBuf,
    },

    /// Create starter config and example dataset
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examstat=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            dataset,
            config,
            by_variant,
            format,
            output,
        } => commands::analyze::execute(dataset, config, by_variant, format, output),
        Commands::Similarity {
            dataset,
            kind,
            threshold,
            config,
            format,
        } => commands::similarity::execute(dataset, kind, threshold, config, format),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_drift,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_drift, format),
        Commands::Validate { dataset } => commands::validate::execute(dataset),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
