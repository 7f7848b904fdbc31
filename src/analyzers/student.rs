//! Student computational thinking scoring.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::analyzers::grade::tercile_levels;
use crate::analyzers::school_key::school_key;
use crate::analyzers::types::{StudentRecord, Tier};
use crate::analyzers::utility::{mean, parse_decimal};
use crate::config::{PipelineConfig, ScoringPolicy};
use crate::error::{Result, ScoringError};
use crate::parser::RawTable;
use crate::schema::StudentManifest;

/// Maximum achievable total for a tier.
///
/// Lenient runs floor the answered-item count at one so unknown or empty
/// tiers still divide; strict runs reject them.
pub fn tier_max(tier: &Tier, manifest: &StudentManifest, policy: ScoringPolicy) -> Result<f64> {
    let answered = manifest.answered_items(tier);
    if answered == 0 {
        if policy == ScoringPolicy::Strict {
            return Err(ScoringError::EmptyTierDenominator {
                tier: tier.to_string(),
            });
        }
        debug!(tier = %tier, "Tier has no answered items, using a single-item maximum");
    }
    Ok(answered.max(1) as f64 * tier.points_per_item())
}

/// Assigns `Level_CT` within each tier independently.
pub fn assign_levels(records: &mut [StudentRecord]) {
    let mut by_tier: HashMap<Tier, Vec<usize>> = HashMap::new();
    for (i, r) in records.iter().enumerate() {
        if let Some(tier) = &r.tier {
            by_tier.entry(tier.clone()).or_default().push(i);
        }
    }

    for (tier, rows) in by_tier {
        let scores: Vec<f64> = rows.iter().map(|&i| records[i].persentase_ct).collect();
        let levels = tercile_levels(&scores);
        debug!(tier = %tier, rows = rows.len(), "Tier levels assigned");
        for (i, level) in rows.into_iter().zip(levels) {
            records[i].level_ct = Some(level);
        }
    }
}

/// Scores every student row against the manifest.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn score_students(
    table: &RawTable,
    manifest: &StudentManifest,
    config: &PipelineConfig,
) -> Result<Vec<StudentRecord>> {
    if manifest.item_cols.is_empty() {
        warn!(prefix = %config.item_prefix, "No student item columns found");
    }

    let mut malformed = 0usize;
    let mut records = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        let items: Vec<f64> = manifest
            .item_cols
            .iter()
            .map(|&col| match table.cell(row, col) {
                Some(raw) => parse_decimal(raw).unwrap_or_else(|| {
                    malformed += 1;
                    0.0
                }),
                None => 0.0,
            })
            .collect();

        let total_ct: f64 = items.iter().sum();
        let mean_ct = (!items.is_empty()).then(|| mean(&items));

        let tier = table.cell(row, manifest.tier_col).map(Tier::parse);
        let max = match &tier {
            Some(t) => tier_max(t, manifest, config.policy)?,
            None => tier_max(&Tier::Other(String::new()), manifest, config.policy)?,
        };

        let school = table
            .cell(row, manifest.school_col)
            .unwrap_or_default()
            .to_string();

        records.push(StudentRecord {
            name: table
                .cell(row, manifest.name_col)
                .unwrap_or_default()
                .to_string(),
            sekolah_key: school_key(&school, config.key_tokens),
            school,
            tier,
            items,
            total_ct,
            mean_ct,
            persentase_ct: total_ct / max,
            level_ct: None,
        });
    }

    if malformed > 0 {
        warn!(malformed, "Malformed item values coerced to zero");
    }

    assign_levels(&mut records);
    debug!(scored = records.len(), "Student rows scored");
    Ok(records)
}
