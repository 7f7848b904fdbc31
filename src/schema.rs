//! Column manifests built once per run from the unfiltered survey tables.
//!
//! The teacher manifest holds the Likert columns split into the four digital
//! literacy dimensions; the student manifest holds the item columns and how
//! many of them each tier actually answered.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::analyzers::types::Tier;
use crate::config::{PipelineConfig, ScoringPolicy};
use crate::error::{Result, ScoringError};
use crate::parser::RawTable;

/// Dimension names paired with their group sizes, in column order.
pub const DIMENSIONS: [(&str, usize); 4] = [
    ("Skill_Digital", 18),
    ("Etika_Digital", 7),
    ("Keamanan_Digital", 8),
    ("Budaya_Digital", 7),
];

/// Number of Likert columns a complete teacher survey carries.
pub const EXPECTED_LIKERT_COLUMNS: usize = 40;

/// Positions (into the Likert column list) of each dimension's columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DimensionGroups {
    pub skill: Vec<usize>,
    pub etika: Vec<usize>,
    pub keamanan: Vec<usize>,
    pub budaya: Vec<usize>,
}

impl DimensionGroups {
    pub fn as_array(&self) -> [&[usize]; 4] {
        [&self.skill, &self.etika, &self.keamanan, &self.budaya]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherManifest {
    pub name_col: usize,
    pub institution_col: usize,
    /// Table indices of the Likert columns, left to right.
    pub likert_cols: Vec<usize>,
    pub likert_names: Vec<String>,
    pub groups: DimensionGroups,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentManifest {
    pub name_col: usize,
    pub school_col: usize,
    pub tier_col: usize,
    pub item_cols: Vec<usize>,
    pub item_names: Vec<String>,
    /// Item columns with at least one answer among a tier's rows.
    #[serde(skip)]
    pub answered_items: HashMap<Tier, usize>,
}

impl StudentManifest {
    pub fn answered_items(&self, tier: &Tier) -> usize {
        self.answered_items.get(tier).copied().unwrap_or(0)
    }
}

fn require_column(table: &RawTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| ScoringError::MissingColumn(name.to_string()))
}

/// True when every present cell is a plain number and all lie within 1–5.
fn is_likert_column(table: &RawTable, col: usize) -> bool {
    let mut seen = false;
    for row in 0..table.len() {
        let Some(raw) = table.cell(row, col) else {
            continue;
        };
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => {
                if !(1.0..=5.0).contains(&v) {
                    return false;
                }
                seen = true;
            }
            _ => return false,
        }
    }
    seen
}

/// Splits the Likert columns into the four dimensions by position.
///
/// Lenient runs fill as many groups as the columns allow; strict runs
/// require the full set.
pub fn partition_dimensions(likert_count: usize, policy: ScoringPolicy) -> Result<DimensionGroups> {
    if likert_count < EXPECTED_LIKERT_COLUMNS {
        if policy == ScoringPolicy::Strict {
            return Err(ScoringError::InsufficientLikertColumns {
                expected: EXPECTED_LIKERT_COLUMNS,
                found: likert_count,
            });
        }
        warn!(
            found = likert_count,
            expected = EXPECTED_LIKERT_COLUMNS,
            "Fewer Likert columns than expected, later dimensions will be empty"
        );
    }

    let mut slices = Vec::with_capacity(DIMENSIONS.len());
    let mut start = 0;
    for (_, size) in DIMENSIONS {
        let end = (start + size).min(likert_count);
        slices.push((start.min(end)..end).collect::<Vec<_>>());
        start += size;
    }

    let mut slices = slices.into_iter();
    Ok(DimensionGroups {
        skill: slices.next().unwrap_or_default(),
        etika: slices.next().unwrap_or_default(),
        keamanan: slices.next().unwrap_or_default(),
        budaya: slices.next().unwrap_or_default(),
    })
}

/// Classifies the teacher table's columns.
#[tracing::instrument(skip_all, fields(columns = table.headers.len()))]
pub fn classify_teacher_columns(table: &RawTable, config: &PipelineConfig) -> Result<TeacherManifest> {
    let name_col = require_column(table, &config.columns.teacher_name)?;
    let institution_col = require_column(table, &config.columns.teacher_institution)?;

    let likert_cols: Vec<usize> = (0..table.headers.len())
        .filter(|&col| is_likert_column(table, col))
        .collect();
    let likert_names = likert_cols
        .iter()
        .map(|&c| table.headers[c].clone())
        .collect();

    let groups = partition_dimensions(likert_cols.len(), config.policy)?;
    debug!(likert = likert_cols.len(), "Teacher columns classified");

    Ok(TeacherManifest {
        name_col,
        institution_col,
        likert_cols,
        likert_names,
        groups,
    })
}

/// Finds the student item columns and counts the answered items per tier.
#[tracing::instrument(skip_all, fields(columns = table.headers.len()))]
pub fn describe_student_columns(table: &RawTable, config: &PipelineConfig) -> Result<StudentManifest> {
    let name_col = require_column(table, &config.columns.student_name)?;
    let school_col = require_column(table, &config.columns.student_school)?;
    let tier_col = require_column(table, &config.columns.student_tier)?;

    let item_cols: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with(&config.item_prefix))
        .map(|(i, _)| i)
        .collect();
    let item_names = item_cols
        .iter()
        .map(|&c| table.headers[c].clone())
        .collect();

    let mut answered_items = HashMap::new();
    for tier in Tier::KNOWN {
        let rows: Vec<usize> = (0..table.len())
            .filter(|&r| table.cell(r, tier_col).map(Tier::parse).as_ref() == Some(&tier))
            .collect();
        let answered = item_cols
            .iter()
            .filter(|&&col| rows.iter().any(|&r| table.cell(r, col).is_some()))
            .count();
        debug!(tier = %tier, rows = rows.len(), answered, "Tier items counted");
        answered_items.insert(tier, answered);
    }

    Ok(StudentManifest {
        name_col,
        school_col,
        tier_col,
        item_cols,
        item_names,
        answered_items,
    })
}
