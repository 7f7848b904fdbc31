//! Errors raised by the scoring pipeline.
//!
//! Under [`ScoringPolicy::Lenient`](crate::config::ScoringPolicy) the pipeline
//! degrades instead of failing, so these only surface for strict runs and
//! invalid configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("expected {expected} Likert columns in the teacher table, found {found}")]
    InsufficientLikertColumns { expected: usize, found: usize },

    #[error("tier '{tier}' has no scorable item columns")]
    EmptyTierDenominator { tier: String },

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
