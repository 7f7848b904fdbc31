use chrono::Utc;
use tracing::{info, warn};

use crate::analyzers::compare::{correlate, join_schools, rollup};
use crate::analyzers::filter::{filter_by_school, normalize_filter};
use crate::analyzers::student::score_students;
use crate::analyzers::summary::{student_levels, teacher_levels};
use crate::analyzers::teacher::score_teachers;
use crate::analyzers::types::Report;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::parser::RawTable;
use crate::schema::{StudentManifest, TeacherManifest, classify_teacher_columns, describe_student_columns};

/// Column manifests for both surveys, built once per load.
#[derive(Debug, Clone)]
pub struct Manifests {
    pub teacher: TeacherManifest,
    pub student: StudentManifest,
}

impl Manifests {
    pub fn describe(teachers: &RawTable, students: &RawTable, config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            teacher: classify_teacher_columns(teachers, config)?,
            student: describe_student_columns(students, config)?,
        })
    }
}

/// Runs the whole pipeline: filter, score, roll up, join and correlate.
///
/// The input tables are never modified; a filter yields filtered copies
/// so tier bands are recomputed over the rows in scope.
#[tracing::instrument(skip(teachers, students, config), fields(policy = ?config.policy, key_tokens = config.key_tokens))]
pub fn run(
    teachers: &RawTable,
    students: &RawTable,
    config: &PipelineConfig,
    filter: Option<&str>,
) -> Result<Report> {
    config.validate()?;
    let manifests = Manifests::describe(teachers, students, config)?;
    run_with_manifests(teachers, students, &manifests, config, filter)
}

/// Same as [`run`], reusing manifests described earlier.
pub fn run_with_manifests(
    teachers: &RawTable,
    students: &RawTable,
    manifests: &Manifests,
    config: &PipelineConfig,
    filter: Option<&str>,
) -> Result<Report> {
    info!(
        teachers = teachers.len(),
        students = students.len(),
        "Survey data loaded"
    );

    let filter = normalize_filter(filter);
    let (teachers, students) = match &filter {
        Some(needle) => {
            let t = filter_by_school(
                teachers,
                manifests.teacher.institution_col,
                needle,
                config.key_tokens,
            );
            let s = filter_by_school(
                students,
                manifests.student.school_col,
                needle,
                config.key_tokens,
            );
            info!(filter = %needle, teachers = t.len(), students = s.len(), "School filter applied");
            (t, s)
        }
        None => (teachers.clone(), students.clone()),
    };

    let teacher_records = score_teachers(&teachers, &manifests.teacher, config);
    let student_records = score_students(&students, &manifests.student, config)?;

    let teacher_schools = rollup(&teacher_records);
    let student_schools = rollup(&student_records);
    let comparison = join_schools(&teacher_schools, &student_schools);
    if comparison.is_empty() {
        warn!(
            teacher_schools = teacher_schools.len(),
            student_schools = student_schools.len(),
            "No school appears in both surveys"
        );
    }
    let correlation = correlate(&comparison);

    info!(
        teacher_schools = teacher_schools.len(),
        student_schools = student_schools.len(),
        joined = comparison.len(),
        "Schools compared"
    );

    Ok(Report {
        generated_at: Utc::now(),
        filter,
        teacher_rows: teacher_records.len(),
        student_rows: student_records.len(),
        teacher_items: manifests.teacher.likert_names.clone(),
        student_items: manifests.student.item_names.clone(),
        teacher_levels: teacher_levels(&teacher_records),
        student_levels: student_levels(&student_records),
        teachers: teacher_records,
        students: student_records,
        teacher_schools,
        student_schools,
        comparison,
        correlation,
    })
}
