//! Data types produced by the scoring pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Fixed-threshold digital literacy band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LdLevel {
    Rendah,
    Sedang,
    Tinggi,
    #[serde(rename = "Tidak Diketahui")]
    TidakDiketahui,
}

impl LdLevel {
    pub const ALL: [LdLevel; 4] = [
        LdLevel::Rendah,
        LdLevel::Sedang,
        LdLevel::Tinggi,
        LdLevel::TidakDiketahui,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LdLevel::Rendah => "Rendah",
            LdLevel::Sedang => "Sedang",
            LdLevel::Tinggi => "Tinggi",
            LdLevel::TidakDiketahui => "Tidak Diketahui",
        }
    }
}

/// Tier-relative computational thinking band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CtLevel {
    Rendah,
    Sedang,
    Tinggi,
}

impl CtLevel {
    pub const ALL: [CtLevel; 3] = [CtLevel::Rendah, CtLevel::Sedang, CtLevel::Tinggi];

    pub fn as_str(self) -> &'static str {
        match self {
            CtLevel::Rendah => "Rendah",
            CtLevel::Sedang => "Sedang",
            CtLevel::Tinggi => "Tinggi",
        }
    }
}

impl fmt::Display for LdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CtLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Student grade tier (jenjang).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tier {
    Siaga,
    Penggalang,
    Penegak,
    Other(String),
}

impl Tier {
    pub const KNOWN: [Tier; 3] = [Tier::Siaga, Tier::Penggalang, Tier::Penegak];

    pub fn parse(raw: &str) -> Tier {
        match raw.trim() {
            "Siaga" => Tier::Siaga,
            "Penggalang" => Tier::Penggalang,
            "Penegak" => Tier::Penegak,
            other => Tier::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tier::Siaga => "Siaga",
            Tier::Penggalang => "Penggalang",
            Tier::Penegak => "Penegak",
            Tier::Other(s) => s,
        }
    }

    /// Points awarded per graded item, scaling a full sheet to 100.
    ///
    /// Assumes 12 items for Siaga and 15 for the other tiers; the resulting
    /// percentage is not bounded to 1.0 when the real item count differs.
    pub fn points_per_item(&self) -> f64 {
        match self {
            Tier::Siaga => 8.33,
            _ => 6.67,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One scored teacher.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherRecord {
    #[serde(rename = "NAMA")]
    pub name: String,
    #[serde(rename = "Asal Instansi")]
    pub institution: String,
    /// Raw Likert answers in manifest order; `None` for missing cells.
    pub items: Vec<Option<f64>>,
    #[serde(rename = "Skill_Digital")]
    pub skill_digital: Option<f64>,
    #[serde(rename = "Etika_Digital")]
    pub etika_digital: Option<f64>,
    #[serde(rename = "Keamanan_Digital")]
    pub keamanan_digital: Option<f64>,
    #[serde(rename = "Budaya_Digital")]
    pub budaya_digital: Option<f64>,
    #[serde(rename = "Total_LD")]
    pub total_ld: Option<f64>,
    #[serde(rename = "Mean_LD")]
    pub mean_ld: Option<f64>,
    #[serde(rename = "Level_LD")]
    pub level_ld: LdLevel,
    pub sekolah_key: String,
}

impl TeacherRecord {
    pub fn dimensions(&self) -> [Option<f64>; 4] {
        [
            self.skill_digital,
            self.etika_digital,
            self.keamanan_digital,
            self.budaya_digital,
        ]
    }
}

/// One scored student.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRecord {
    #[serde(rename = "Nama")]
    pub name: String,
    #[serde(rename = "SekolahNama")]
    pub school: String,
    /// `None` when the tier cell is missing.
    #[serde(rename = "Kategori")]
    pub tier: Option<Tier>,
    /// Item scores in manifest order, malformed cells coerced to zero.
    pub items: Vec<f64>,
    #[serde(rename = "Total_CT")]
    pub total_ct: f64,
    #[serde(rename = "Mean_CT")]
    pub mean_ct: Option<f64>,
    #[serde(rename = "Persentase_CT")]
    pub persentase_ct: f64,
    /// `None` for students without a tier.
    #[serde(rename = "Level_CT")]
    pub level_ct: Option<CtLevel>,
    pub sekolah_key: String,
}

/// Per-school rollup of one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolAggregate {
    pub sekolah_key: String,
    /// Display name of the first record seen for this key.
    pub name: String,
    pub mean_score: Option<f64>,
    /// Most frequent level label, first-seen on ties.
    pub level: String,
    pub members: usize,
}

/// A school present in both populations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub sekolah_key: String,
    #[serde(rename = "Asal Instansi")]
    pub teacher_school: String,
    #[serde(rename = "SekolahNama")]
    pub student_school: String,
    #[serde(rename = "Level_LD")]
    pub level_ld: String,
    #[serde(rename = "Level_CT")]
    pub level_ct: String,
    #[serde(rename = "Mean_LD")]
    pub mean_ld: Option<f64>,
    #[serde(rename = "Mean_CT")]
    pub mean_ct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn as_str(self) -> &'static str {
        match self {
            Strength::VeryWeak => "very weak",
            Strength::Weak => "weak",
            Strength::Moderate => "moderate",
            Strength::Strong => "strong",
            Strength::VeryStrong => "very strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Significant,
    NotSignificant,
}

impl Significance {
    pub fn as_str(self) -> &'static str {
        match self {
            Significance::Significant => "significant",
            Significance::NotSignificant => "not significant",
        }
    }
}

/// Result of correlating per-school LD and CT means.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    Computed {
        r: f64,
        p_value: f64,
        n: usize,
        strength: Strength,
        significance: Significance,
    },
    /// Fewer than three joined schools.
    InsufficientData { rows: usize },
    /// The correlation could not be computed for the joined rows.
    Failed { reason: String },
}

/// Count and mean score of the records sharing one level label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: String,
    pub count: usize,
    pub mean_score: Option<f64>,
}

/// Everything the presentation layer consumes from one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub filter: Option<String>,
    pub teacher_rows: usize,
    pub student_rows: usize,
    /// Header names of the teacher Likert items, matching `TeacherRecord::items`.
    pub teacher_items: Vec<String>,
    /// Header names of the student items, matching `StudentRecord::items`.
    pub student_items: Vec<String>,
    pub teachers: Vec<TeacherRecord>,
    pub students: Vec<StudentRecord>,
    pub teacher_schools: Vec<SchoolAggregate>,
    pub student_schools: Vec<SchoolAggregate>,
    pub comparison: Vec<ComparisonRow>,
    pub correlation: CorrelationOutcome,
    pub teacher_levels: Vec<LevelSummary>,
    pub student_levels: Vec<LevelSummary>,
}
