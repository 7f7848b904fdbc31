//! Per-school rollups and the teacher/student comparison.

use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::analyzers::grade::{significance, strength};
use crate::analyzers::types::{
    ComparisonRow, CorrelationOutcome, SchoolAggregate, StudentRecord, TeacherRecord,
};
use crate::analyzers::utility::{mean, mean_defined, mode_first};

/// Minimum number of joined schools before a correlation is attempted.
pub const MIN_CORRELATION_ROWS: usize = 3;

/// A scored individual that can be rolled up by school.
pub trait SchoolMember {
    fn sekolah_key(&self) -> &str;
    fn school_name(&self) -> &str;
    fn score(&self) -> Option<f64>;
    fn level_label(&self) -> &str;
}

impl SchoolMember for TeacherRecord {
    fn sekolah_key(&self) -> &str {
        &self.sekolah_key
    }

    fn school_name(&self) -> &str {
        &self.institution
    }

    fn score(&self) -> Option<f64> {
        self.mean_ld
    }

    fn level_label(&self) -> &str {
        self.level_ld.as_str()
    }
}

impl SchoolMember for StudentRecord {
    fn sekolah_key(&self) -> &str {
        &self.sekolah_key
    }

    fn school_name(&self) -> &str {
        &self.school
    }

    fn score(&self) -> Option<f64> {
        self.mean_ct
    }

    fn level_label(&self) -> &str {
        self.level_ct.map(|l| l.as_str()).unwrap_or("")
    }
}

/// Groups records by `sekolah_key` in first-seen order.
///
/// Records with an empty key are left out.
pub fn rollup<M: SchoolMember>(records: &[M]) -> Vec<SchoolAggregate> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&M>> = HashMap::new();

    for r in records {
        let key = r.sekolah_key();
        if key.is_empty() {
            continue;
        }
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(r);
    }

    order
        .into_iter()
        .map(|key| {
            let members = &groups[key];
            SchoolAggregate {
                sekolah_key: key.to_string(),
                name: members[0].school_name().to_string(),
                mean_score: mean_defined(members.iter().map(|m| m.score())),
                level: mode_first(members.iter().map(|m| m.level_label()))
                    .unwrap_or_default()
                    .to_string(),
                members: members.len(),
            }
        })
        .collect()
}

/// Inner join of the two rollups on `sekolah_key`, in teacher order.
pub fn join_schools(teachers: &[SchoolAggregate], students: &[SchoolAggregate]) -> Vec<ComparisonRow> {
    let by_key: HashMap<&str, &SchoolAggregate> = students
        .iter()
        .map(|s| (s.sekolah_key.as_str(), s))
        .collect();

    teachers
        .iter()
        .filter_map(|t| {
            by_key.get(t.sekolah_key.as_str()).map(|s| ComparisonRow {
                sekolah_key: t.sekolah_key.clone(),
                teacher_school: t.name.clone(),
                student_school: s.name.clone(),
                level_ld: t.level.clone(),
                level_ct: s.level.clone(),
                mean_ld: t.mean_score,
                mean_ct: s.mean_score,
            })
        })
        .collect()
}

/// Pearson correlation coefficient and two-sided p-value.
///
/// Fails on mismatched or short input, undefined values and zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<(f64, f64), String> {
    if x.len() != y.len() {
        return Err(format!("length mismatch: {} vs {}", x.len(), y.len()));
    }
    let n = x.len();
    if n < 2 {
        return Err(format!("need at least 2 points, got {n}"));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err("input contains undefined values".to_string());
    }

    let mx = mean(x);
    let my = mean(y);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return Err("input is constant, correlation is undefined".to_string());
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    if n == 2 {
        return Ok((r, 1.0));
    }

    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= f64::EPSILON {
        return Ok((r, 0.0));
    }

    let t = r * (df / denom).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| e.to_string())?;
    let p = (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0);
    Ok((r, p))
}

/// Correlates per-school LD and CT means over the joined rows.
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn correlate(rows: &[ComparisonRow]) -> CorrelationOutcome {
    if rows.len() < MIN_CORRELATION_ROWS {
        info!(
            rows = rows.len(),
            required = MIN_CORRELATION_ROWS,
            "Too few joined schools, correlation not computed"
        );
        return CorrelationOutcome::InsufficientData { rows: rows.len() };
    }

    let ld: Vec<f64> = rows.iter().map(|r| r.mean_ld.unwrap_or(f64::NAN)).collect();
    let ct: Vec<f64> = rows.iter().map(|r| r.mean_ct.unwrap_or(f64::NAN)).collect();

    match pearson(&ld, &ct) {
        Ok((r, p_value)) => {
            debug!(r, p_value, "Correlation computed");
            CorrelationOutcome::Computed {
                r,
                p_value,
                n: rows.len(),
                strength: strength(r),
                significance: significance(p_value),
            }
        }
        Err(reason) => {
            warn!(%reason, "Correlation could not be computed");
            CorrelationOutcome::Failed { reason }
        }
    }
}
