//! Analysis configuration and config file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Options controlling which statistics an analysis computes.
///
/// Every field has a default, so partial TOML/JSON documents deserialize
/// cleanly. Call [`AnalysisConfig::validate`] before trusting a config that
/// came from outside the process; [`analyze_exam`](crate::exam::analyze_exam)
/// does so itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Respondents needed before item statistics are considered reliable.
    pub min_sample_size: usize,
    pub include_discrimination_index: bool,
    pub include_difficulty_index: bool,
    pub include_point_biserial: bool,
    pub include_distractor_analysis: bool,
    /// Confidence level for intervals, strictly between 0 and 1.
    pub confidence_level: f64,
    /// Drop incomplete attempts before analysis.
    pub exclude_incomplete_data: bool,
    /// Add a per-question-type breakdown to the summary.
    pub group_by_question_type: bool,
    /// Overrides the title taken from the variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_title: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 5,
            include_discrimination_index: true,
            include_difficulty_index: true,
            include_point_biserial: true,
            include_distractor_analysis: true,
            confidence_level: 0.95,
            exclude_incomplete_data: false,
            group_by_question_type: false,
            exam_title: None,
        }
    }
}

impl AnalysisConfig {
    /// Check field ranges.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.min_sample_size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "min_sample_size must be at least 1".into(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "confidence_level must be between 0 and 1 (exclusive), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }

    /// Return a copy with the exam title overridden.
    pub fn with_exam_title(mut self, title: impl Into<String>) -> Self {
        self.exam_title = Some(title.into());
        self
    }
}

/// Thresholds used when flagging similar pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Student pairs at or above this similarity are flagged.
    pub student_similarity_threshold: f64,
    /// Variant pairs at or above this similarity are flagged.
    pub variant_similarity_threshold: f64,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            student_similarity_threshold: 0.9,
            variant_similarity_threshold: 0.8,
        }
    }
}

/// Top-level `examstat.toml` contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamstatConfig {
    pub analysis: AnalysisConfig,
    pub integrity: IntegrityConfig,
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examstat.toml` in the current directory
/// 2. `~/.config/examstat/config.toml`
///
/// Environment variable overrides: `EXAMSTAT_MIN_SAMPLE_SIZE`,
/// `EXAMSTAT_CONFIDENCE_LEVEL`.
pub fn load_config() -> Result<ExamstatConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamstatConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examstat.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamstatConfig::default(),
    };

    if let Ok(raw) = std::env::var("EXAMSTAT_MIN_SAMPLE_SIZE") {
        config.analysis.min_sample_size = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid EXAMSTAT_MIN_SAMPLE_SIZE: {raw}"))?;
    }
    if let Ok(raw) = std::env::var("EXAMSTAT_CONFIDENCE_LEVEL") {
        config.analysis.confidence_level = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid EXAMSTAT_CONFIDENCE_LEVEL: {raw}"))?;
    }

    config.analysis.validate()?;
    Ok(config)
}

/// Parse a TOML config document.
pub fn parse_config_str(content: &str) -> Result<ExamstatConfig> {
    let config: ExamstatConfig = toml::from_str(content)?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examstat"))
}
