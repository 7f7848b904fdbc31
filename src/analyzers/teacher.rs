//! Teacher digital literacy scoring.

use tracing::{debug, warn};

use crate::analyzers::grade::level_ld;
use crate::analyzers::school_key::school_key;
use crate::analyzers::types::TeacherRecord;
use crate::analyzers::utility::{mean, mean_defined};
use crate::config::{PipelineConfig, ScoringPolicy};
use crate::parser::RawTable;
use crate::schema::{DIMENSIONS, TeacherManifest};

/// Row mean of one dimension group, skipping unanswered items.
fn dimension_mean(items: &[Option<f64>], group: &[usize]) -> Option<f64> {
    mean_defined(group.iter().map(|&i| items.get(i).copied().flatten()))
}

/// Sum and mean of the four dimension means.
///
/// Lenient runs leave undefined dimensions out, so a row with nothing
/// answered totals 0 with no mean; strict runs propagate them.
fn composite(dimensions: &[Option<f64>; 4], policy: ScoringPolicy) -> (Option<f64>, Option<f64>) {
    let defined: Vec<f64> = dimensions.iter().flatten().copied().collect();

    if policy == ScoringPolicy::Strict && defined.len() < dimensions.len() {
        return (None, None);
    }

    let mean_ld = (!defined.is_empty()).then(|| mean(&defined));
    (Some(defined.iter().sum()), mean_ld)
}

/// Scores every teacher row against the manifest.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn score_teachers(
    table: &RawTable,
    manifest: &TeacherManifest,
    config: &PipelineConfig,
) -> Vec<TeacherRecord> {
    for ((name, _), group) in DIMENSIONS.iter().zip(manifest.groups.as_array()) {
        if group.is_empty() {
            warn!(dimension = %name, "Dimension has no columns, scores will be undefined");
        }
    }

    let records: Vec<TeacherRecord> = (0..table.len())
        .map(|row| {
            let items: Vec<Option<f64>> = manifest
                .likert_cols
                .iter()
                .map(|&col| table.cell(row, col).and_then(|v| v.parse::<f64>().ok()))
                .collect();

            let dimensions = manifest
                .groups
                .as_array()
                .map(|group| dimension_mean(&items, group));
            let [skill, etika, keamanan, budaya] = dimensions;
            let (total_ld, mean_ld) = composite(&dimensions, config.policy);

            let institution = table
                .cell(row, manifest.institution_col)
                .unwrap_or_default()
                .to_string();

            TeacherRecord {
                name: table
                    .cell(row, manifest.name_col)
                    .unwrap_or_default()
                    .to_string(),
                sekolah_key: school_key(&institution, config.key_tokens),
                institution,
                items,
                skill_digital: skill,
                etika_digital: etika,
                keamanan_digital: keamanan,
                budaya_digital: budaya,
                total_ld,
                mean_ld,
                level_ld: level_ld(mean_ld),
            }
        })
        .collect();

    let unknown = records.iter().filter(|r| r.mean_ld.is_none()).count();
    debug!(scored = records.len(), unknown, "Teacher rows scored");
    records
}
