use crate::analyzers::types::{CtLevel, LdLevel, Significance, Strength};
use crate::analyzers::utility::quantile;

/// Converts a mean Likert score (1.0–5.0) into a digital literacy level.
///
/// | Range            | Level           |
/// |------------------|-----------------|
/// | >= 3.67          | Tinggi          |
/// | >= 2.34          | Sedang          |
/// | < 2.34           | Rendah          |
/// | undefined        | Tidak Diketahui |
pub fn level_ld(score: Option<f64>) -> LdLevel {
    match score {
        Some(s) if s.is_nan() => LdLevel::TidakDiketahui,
        Some(s) if s < 2.34 => LdLevel::Rendah,
        Some(s) if s < 3.67 => LdLevel::Sedang,
        Some(_) => LdLevel::Tinggi,
        None => LdLevel::TidakDiketahui,
    }
}

/// Bands scores by their own 33rd and 66th percentiles.
///
/// Scores at or below p33 are Rendah, at or below p66 Sedang, the rest Tinggi.
/// The output is aligned with the input.
pub fn tercile_levels(scores: &[f64]) -> Vec<CtLevel> {
    let (Some(q1), Some(q2)) = (quantile(scores, 0.33), quantile(scores, 0.66)) else {
        return Vec::new();
    };

    scores
        .iter()
        .map(|&x| {
            if x <= q1 {
                CtLevel::Rendah
            } else if x <= q2 {
                CtLevel::Sedang
            } else {
                CtLevel::Tinggi
            }
        })
        .collect()
}

/// Strength of a correlation coefficient by its magnitude.
pub fn strength(r: f64) -> Strength {
    match r.abs() {
        a if a < 0.2 => Strength::VeryWeak,
        a if a < 0.4 => Strength::Weak,
        a if a < 0.6 => Strength::Moderate,
        a if a < 0.8 => Strength::Strong,
        _ => Strength::VeryStrong,
    }
}

pub fn significance(p_value: f64) -> Significance {
    if p_value < 0.05 {
        Significance::Significant
    } else {
        Significance::NotSignificant
    }
}
