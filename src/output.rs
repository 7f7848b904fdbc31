//! Output formatting and persistence for pipeline reports.
//!
//! Supports logging a readable summary, JSON serialization, and CSV export
//! of every derived table.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzers::types::{
    CorrelationOutcome, LevelSummary, Report, StudentRecord, TeacherRecord,
};

/// A scored record exported with one column per raw survey item.
///
/// Identity columns come first, then the items under their survey
/// headers, then the derived scores.
pub trait ItemRow {
    const IDENTITY: &'static [&'static str];
    const DERIVED: &'static [&'static str];

    fn identity_cells(&self) -> Vec<String>;
    fn item_cells(&self) -> Vec<String>;
    fn derived_cells(&self) -> Vec<String>;
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ItemRow for TeacherRecord {
    const IDENTITY: &'static [&'static str] = &["NAMA", "Asal Instansi"];
    const DERIVED: &'static [&'static str] = &[
        "Skill_Digital",
        "Etika_Digital",
        "Keamanan_Digital",
        "Budaya_Digital",
        "Total_LD",
        "Mean_LD",
        "Level_LD",
        "sekolah_key",
    ];

    fn identity_cells(&self) -> Vec<String> {
        vec![self.name.clone(), self.institution.clone()]
    }

    fn item_cells(&self) -> Vec<String> {
        self.items.iter().map(|&v| cell(v)).collect()
    }

    fn derived_cells(&self) -> Vec<String> {
        let mut cells: Vec<String> = self.dimensions().into_iter().map(cell).collect();
        cells.push(cell(self.total_ld));
        cells.push(cell(self.mean_ld));
        cells.push(self.level_ld.to_string());
        cells.push(self.sekolah_key.clone());
        cells
    }
}

impl ItemRow for StudentRecord {
    const IDENTITY: &'static [&'static str] = &["Nama", "SekolahNama", "Kategori"];
    const DERIVED: &'static [&'static str] = &[
        "Total_CT",
        "Mean_CT",
        "Persentase_CT",
        "Level_CT",
        "sekolah_key",
    ];

    fn identity_cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.school.clone(),
            self.tier.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        ]
    }

    fn item_cells(&self) -> Vec<String> {
        self.items.iter().map(|&v| cell(Some(v))).collect()
    }

    fn derived_cells(&self) -> Vec<String> {
        vec![
            self.total_ct.to_string(),
            cell(self.mean_ct),
            self.persentase_ct.to_string(),
            self.level_ct.map(|l| l.to_string()).unwrap_or_default(),
            self.sekolah_key.clone(),
        ]
    }
}

/// Writes `rows` to a CSV file at `path`, replacing any existing file.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes scored records to a CSV file at `path`, one column per item in
/// `item_names` between the identity and derived columns.
pub fn write_item_table<T: ItemRow>(path: &Path, item_names: &[String], rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), items = item_names.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    let header = T::IDENTITY
        .iter()
        .map(|h| h.to_string())
        .chain(item_names.iter().cloned())
        .chain(T::DERIVED.iter().map(|h| h.to_string()));
    writer.write_record(header)?;

    for row in rows {
        let items = row.item_cells();
        if items.len() != item_names.len() {
            anyhow::bail!(
                "row has {} item values but {} item columns are named",
                items.len(),
                item_names.len()
            );
        }
        writer.write_record(
            row.identity_cells()
                .into_iter()
                .chain(items)
                .chain(row.derived_cells()),
        )?;
    }
    writer.flush()?;

    Ok(())
}

/// Serializes the report as pretty-printed JSON.
pub fn report_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes all derived tables and `report.json` into `dir`.
pub fn write_report(dir: &str, report: &Report) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create '{dir}'"))?;
    let dir = Path::new(dir);

    write_item_table(&dir.join("teachers.csv"), &report.teacher_items, &report.teachers)?;
    write_item_table(&dir.join("students.csv"), &report.student_items, &report.students)?;
    write_table(&dir.join("teacher_schools.csv"), &report.teacher_schools)?;
    write_table(&dir.join("student_schools.csv"), &report.student_schools)?;
    write_table(&dir.join("comparison.csv"), &report.comparison)?;
    fs::write(dir.join("report.json"), report_json(report)?)?;

    info!(dir = %dir.display(), "Report written");
    Ok(())
}

fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.3}"))
}

fn log_levels(population: &str, levels: &[LevelSummary]) {
    for l in levels {
        info!(
            population,
            level = %l.level,
            count = l.count,
            mean = %fmt_score(l.mean_score),
            "Level summary"
        );
    }
}

/// Human-readable interpretation of a correlation outcome.
pub fn describe_correlation(outcome: &CorrelationOutcome) -> String {
    match outcome {
        CorrelationOutcome::Computed {
            r,
            p_value,
            strength,
            significance,
            ..
        } => format!(
            "Pearson r = {r:.2}, p-value = {p_value:.2}: the relationship between mean teacher \
             digital literacy and mean student computational thinking is {} and {}",
            strength.as_str(),
            significance.as_str()
        ),
        CorrelationOutcome::InsufficientData { rows } => format!(
            "Only {rows} school(s) appear in both surveys, correlation not computed"
        ),
        CorrelationOutcome::Failed { reason } => {
            format!("Correlation could not be computed: {reason}")
        }
    }
}

/// Logs the comparison table and correlation interpretation.
pub fn print_comparison(report: &Report) {
    for row in &report.comparison {
        info!(
            teacher_school = %row.teacher_school,
            student_school = %row.student_school,
            level_ld = %row.level_ld,
            level_ct = %row.level_ct,
            mean_ld = %fmt_score(row.mean_ld),
            mean_ct = %fmt_score(row.mean_ct),
            "School"
        );
    }

    let message = describe_correlation(&report.correlation);
    if matches!(report.correlation, CorrelationOutcome::Failed { .. }) {
        warn!("{message}");
    } else {
        info!("{message}");
    }
}

/// Logs the level distributions followed by the comparison.
pub fn print_summary(report: &Report) {
    info!(
        teachers = report.teacher_rows,
        students = report.student_rows,
        filter = report.filter.as_deref().unwrap_or(""),
        "Report summary"
    );
    log_levels("teacher", &report.teacher_levels);
    log_levels("student", &report.student_levels);
    print_comparison(report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{CtLevel, Significance, Strength, Tier};
    use chrono::Utc;
    use std::env;

    fn temp_dir(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn empty_report() -> Report {
        Report {
            generated_at: Utc::now(),
            filter: None,
            teacher_rows: 0,
            student_rows: 0,
            teacher_items: Vec::new(),
            student_items: Vec::new(),
            teachers: Vec::new(),
            students: Vec::new(),
            teacher_schools: Vec::new(),
            student_schools: Vec::new(),
            comparison: Vec::new(),
            correlation: CorrelationOutcome::InsufficientData { rows: 0 },
            teacher_levels: Vec::new(),
            student_levels: Vec::new(),
        }
    }

    #[test]
    fn test_print_summary_does_not_panic() {
        print_summary(&empty_report());
    }

    #[test]
    fn test_report_json_tags_correlation() {
        let json = report_json(&empty_report()).unwrap();
        assert!(json.contains("\"status\": \"insufficient_data\""));
    }

    #[test]
    fn test_describe_correlation() {
        let computed = CorrelationOutcome::Computed {
            r: 0.456,
            p_value: 0.0312,
            n: 12,
            strength: Strength::Moderate,
            significance: Significance::Significant,
        };
        let text = describe_correlation(&computed);
        assert!(text.contains("r = 0.46"));
        assert!(text.contains("moderate and significant"));

        let failed = CorrelationOutcome::Failed {
            reason: "input is constant".to_string(),
        };
        assert!(describe_correlation(&failed).starts_with("Correlation could not be computed"));
    }

    #[test]
    fn test_write_report_creates_all_files() {
        let dir = temp_dir("ld_ct_rater_test_report");
        let _ = fs::remove_dir_all(&dir);

        write_report(&dir, &empty_report()).unwrap();

        for file in [
            "teachers.csv",
            "students.csv",
            "teacher_schools.csv",
            "student_schools.csv",
            "comparison.csv",
            "report.json",
        ] {
            assert!(Path::new(&dir).join(file).exists(), "{file} missing");
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    fn student(items: Vec<f64>) -> StudentRecord {
        StudentRecord {
            name: "Ani".to_string(),
            school: "SD 1".to_string(),
            tier: Some(Tier::Siaga),
            total_ct: items.iter().sum(),
            items,
            mean_ct: Some(2.5),
            persentase_ct: 0.3,
            level_ct: Some(CtLevel::Sedang),
            sekolah_key: "sd 1".to_string(),
        }
    }

    #[test]
    fn test_item_table_places_items_between_identity_and_scores() {
        let path = temp_dir("ld_ct_rater_test_items.csv");
        let names = vec!["S 1".to_string(), "S 2".to_string()];

        write_item_table(Path::new(&path), &names, &[student(vec![2.0, 3.0])]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("Nama,SekolahNama,Kategori,S 1,S 2,Total_CT,Mean_CT,Persentase_CT,Level_CT,sekolah_key")
        );
        assert_eq!(lines.next(), Some("Ani,SD 1,Siaga,2,3,5,2.5,0.3,Sedang,sd 1"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_item_table_rejects_unnamed_items() {
        let path = temp_dir("ld_ct_rater_test_items_mismatch.csv");
        let names = vec!["S 1".to_string()];

        assert!(write_item_table(Path::new(&path), &names, &[student(vec![2.0, 3.0])]).is_err());

        let _ = fs::remove_file(&path);
    }
}
