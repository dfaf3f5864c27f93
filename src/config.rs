//! Tunables for the mapping pipeline.
//!
//! The defaults are the empirically tuned constants of the deployed highlighter
//! and are kept as-is for behaviour parity. Any subset can be overridden from a
//! JSON file; missing keys keep their defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Chunks shorter than this (in normalized characters) are not searched.
    pub min_chunk_chars: usize,
    /// Words shorter than this never enter a similarity word set.
    pub min_word_chars: usize,
    pub high_fidelity_threshold: f64,
    pub loose_threshold: f64,
    /// A fuzzy scan stops at the first candidate scoring at least this much.
    pub early_exit_score: f64,
    /// Window sizes tried by the fuzzy strategies, as multiples of the chunk length.
    pub window_scales: Vec<f64>,
    /// Number of significant words used for the leading/trailing anchor phrases.
    pub anchor_words: usize,
    pub word_ratio_min: f64,
    pub word_ratio_max: f64,
    /// Minimum similarity between the chunk and the text of the matched fragments.
    pub quality_threshold: f64,
    /// Same-line tolerance for highlight line grouping, as a fraction of the
    /// average fragment height.
    pub line_tolerance: f32,
    /// Fold compatibility characters (ligatures, full-width forms) before matching.
    /// Applied when a document is built; chunks follow the document's mode.
    pub compat_fold: bool,
    pub reading_order: ReadingOrderConfig,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig {
            min_chunk_chars: 10,
            min_word_chars: 3,
            high_fidelity_threshold: 0.90,
            loose_threshold: 0.80,
            early_exit_score: 0.95,
            window_scales: vec![1.0, 1.1, 0.9, 1.2, 0.8],
            anchor_words: 3,
            word_ratio_min: 0.7,
            word_ratio_max: 1.5,
            quality_threshold: 0.65,
            line_tolerance: 0.3,
            compat_fold: false,
            reading_order: ReadingOrderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingOrderConfig {
    /// Each half of the page needs strictly more fragments than this for the
    /// page to be read as two columns.
    pub column_min_fragments: usize,
    /// Same-line tolerance as a fraction of the average fragment height.
    pub line_tolerance: f32,
}

impl Default for ReadingOrderConfig {
    fn default() -> Self {
        ReadingOrderConfig {
            column_min_fragments: 5,
            line_tolerance: 0.5,
        }
    }
}

impl MappingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MappingConfig =
            serde_json::from_str(json).context("Failed to parse mapping config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("high_fidelity_threshold", self.high_fidelity_threshold),
            ("loose_threshold", self.loose_threshold),
            ("early_exit_score", self.early_exit_score),
            ("quality_threshold", self.quality_threshold),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must lie in [0, 1], got {value}");
            }
        }

        if !(self.word_ratio_min > 0.0 && self.word_ratio_min <= self.word_ratio_max) {
            bail!(
                "word ratio range [{}, {}] is empty or non-positive",
                self.word_ratio_min,
                self.word_ratio_max
            );
        }
        if self.window_scales.is_empty() || self.window_scales.iter().any(|s| !(*s > 0.0)) {
            bail!("window_scales must be a non-empty list of positive factors");
        }
        if self.anchor_words == 0 {
            bail!("anchor_words must be at least 1");
        }
        if !(self.line_tolerance > 0.0) || !(self.reading_order.line_tolerance > 0.0) {
            bail!("line tolerances must be positive");
        }
        Ok(())
    }
}
