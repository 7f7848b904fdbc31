use crate::analyzers::types::{CtLevel, LdLevel, LevelSummary, StudentRecord, TeacherRecord};
use crate::analyzers::utility::mean_defined;

/// Teacher count and mean `Mean_LD` per level, every level listed.
pub fn teacher_levels(records: &[TeacherRecord]) -> Vec<LevelSummary> {
    LdLevel::ALL
        .iter()
        .map(|&level| {
            let members: Vec<&TeacherRecord> =
                records.iter().filter(|r| r.level_ld == level).collect();
            LevelSummary {
                level: level.to_string(),
                count: members.len(),
                mean_score: mean_defined(members.iter().map(|r| r.mean_ld)),
            }
        })
        .collect()
}

/// Student count and mean `Mean_CT` per level, every level listed.
pub fn student_levels(records: &[StudentRecord]) -> Vec<LevelSummary> {
    CtLevel::ALL
        .iter()
        .map(|&level| {
            let members: Vec<&StudentRecord> = records
                .iter()
                .filter(|r| r.level_ct == Some(level))
                .collect();
            LevelSummary {
                level: level.to_string(),
                count: members.len(),
                mean_score: mean_defined(members.iter().map(|r| r.mean_ct)),
            }
        })
        .collect()
}
