//! Pipeline configuration.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "policy": "strict",
//!   "key_tokens": 3,
//!   "columns": { "student_school": "NamaSekolah" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// How the pipeline reacts to incomplete survey data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPolicy {
    /// Missing dimensions and empty tiers degrade to undefined or guarded values.
    #[default]
    Lenient,
    /// Missing dimensions and empty tiers fail the run.
    Strict,
}

/// Names of the identity columns in both survey files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub teacher_name: String,
    pub teacher_institution: String,
    pub student_name: String,
    pub student_school: String,
    pub student_tier: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            teacher_name: "NAMA".to_string(),
            teacher_institution: "Asal Instansi".to_string(),
            student_name: "Nama".to_string(),
            student_school: "SekolahNama".to_string(),
            student_tier: "Kategori".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub policy: ScoringPolicy,
    /// Number of leading name tokens kept in a `sekolah_key`.
    pub key_tokens: usize,
    pub delimiter: char,
    /// Header prefix identifying student item columns.
    pub item_prefix: String,
    pub columns: ColumnNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            policy: ScoringPolicy::Lenient,
            key_tokens: 6,
            delimiter: ';',
            item_prefix: "S ".to_string(),
            columns: ColumnNames::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ScoringError> {
        if self.key_tokens == 0 {
            return Err(ScoringError::InvalidConfig(
                "key_tokens must be at least 1".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() {
            return Err(ScoringError::InvalidConfig(format!(
                "delimiter '{}' is not a single-byte character",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// The delimiter as the byte the CSV reader expects.
    ///
    /// Only meaningful on a config that passed [`PipelineConfig::validate`].
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}
