use ld_ct_rater::analyzers::analyzer::run;
use ld_ct_rater::analyzers::types::{
    CorrelationOutcome, CtLevel, LdLevel, Report, Significance, Strength, Tier,
};
use ld_ct_rater::config::{PipelineConfig, ScoringPolicy};
use ld_ct_rater::error::ScoringError;
use ld_ct_rater::output::write_report;
use ld_ct_rater::parser::{RawTable, load_table, parse_table};
use std::fs;

fn fixture(name: &str) -> RawTable {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    load_table(&path, b';').expect("Failed to load fixture")
}

fn fixtures() -> (RawTable, RawTable) {
    (fixture("data_LD_guru.csv"), fixture("data_CT_siswa.csv"))
}

fn full_run(filter: Option<&str>) -> Report {
    let (teachers, students) = fixtures();
    run(&teachers, &students, &PipelineConfig::default(), filter).expect("pipeline failed")
}

#[test]
fn test_full_pipeline() {
    let report = full_run(None);

    assert_eq!(report.teacher_rows, 5);
    assert_eq!(report.student_rows, 7);
    assert_eq!(report.filter, None);

    let bandung: Vec<_> = report
        .teachers
        .iter()
        .filter(|t| t.sekolah_key == "sd negeri 1 bandung")
        .collect();
    assert_eq!(bandung.len(), 2);
    for t in bandung {
        assert_eq!(t.mean_ld, Some(5.0));
        assert_eq!(t.level_ld, LdLevel::Tinggi);
    }

    let siaga: Vec<_> = report
        .students
        .iter()
        .filter(|s| s.tier == Some(Tier::Siaga))
        .collect();
    assert_eq!(siaga.len(), 2);
    for s in &siaga {
        assert!((s.persentase_ct - 1.0).abs() < 1e-9);
    }
    assert_eq!(siaga[0].level_ct, siaga[1].level_ct);
    assert_eq!(siaga[0].level_ct, Some(CtLevel::Rendah));
}

#[test]
fn test_malformed_student_cell_does_not_fail_run() {
    let report = full_run(None);
    let yusuf = report
        .students
        .iter()
        .find(|s| s.name == "Yusuf")
        .expect("Yusuf missing");

    assert_eq!(yusuf.items[0], 0.0);
    assert_eq!(yusuf.total_ct, 28.0);
}

#[test]
fn test_every_tier_row_is_leveled() {
    let report = full_run(None);
    for tier in Tier::KNOWN {
        let rows: Vec<_> = report
            .students
            .iter()
            .filter(|s| s.tier.as_ref() == Some(&tier))
            .collect();
        assert!(rows.iter().all(|s| s.level_ct.is_some()), "{tier}");
    }

    let penegak: Vec<_> = report
        .students
        .iter()
        .filter(|s| s.tier == Some(Tier::Penegak))
        .map(|s| (s.name.as_str(), s.level_ct))
        .collect();
    assert_eq!(
        penegak,
        vec![
            ("Wati", Some(CtLevel::Sedang)),
            ("Yusuf", Some(CtLevel::Rendah)),
            ("Zaki", Some(CtLevel::Tinggi)),
        ]
    );
}

#[test]
fn test_school_comparison_and_correlation() {
    let report = full_run(None);

    let keys: Vec<_> = report
        .teacher_schools
        .iter()
        .map(|s| s.sekolah_key.as_str())
        .collect();
    assert_eq!(
        keys,
        vec![
            "sd negeri 1 bandung",
            "smp negeri 2 cimahi",
            "sma negeri 3 garut",
            "mi al falah",
        ]
    );
    assert_eq!(report.teacher_schools[0].name, "SD Negeri 1 Bandung");
    assert_eq!(report.teacher_schools[0].members, 2);
    assert_eq!(report.student_schools.len(), 4);

    let joined: Vec<_> = report
        .comparison
        .iter()
        .map(|r| (r.sekolah_key.as_str(), r.level_ld.as_str(), r.level_ct.as_str()))
        .collect();
    assert_eq!(
        joined,
        vec![
            ("sd negeri 1 bandung", "Tinggi", "Rendah"),
            ("smp negeri 2 cimahi", "Sedang", "Rendah"),
            ("sma negeri 3 garut", "Rendah", "Sedang"),
        ]
    );
    assert!(report.comparison.len() <= report.teacher_schools.len().min(report.student_schools.len()));

    let CorrelationOutcome::Computed {
        r,
        n,
        strength,
        significance,
        ..
    } = &report.correlation
    else {
        panic!("expected a computed correlation, got {:?}", report.correlation);
    };
    assert_eq!(*n, 3);
    assert_eq!(format!("{r:.2}"), "0.97");
    assert_eq!(*strength, Strength::VeryStrong);
    assert_eq!(*significance, Significance::NotSignificant);
}

#[test]
fn test_level_summaries() {
    let report = full_run(None);

    let tinggi = &report.teacher_levels[2];
    assert_eq!(tinggi.level, "Tinggi");
    assert_eq!(tinggi.count, 3);
    let expected = (5.0 + 5.0 + 4.0) / 3.0;
    assert!((tinggi.mean_score.unwrap() - expected).abs() < 1e-12);
    assert_eq!(report.teacher_levels[3].count, 0);

    let total: usize = report.student_levels.iter().map(|l| l.count).sum();
    assert_eq!(total, 7);
}

#[test]
fn test_filter_narrows_and_recomputes_bands() {
    let report = full_run(Some("  CIMAHI "));
    assert_eq!(report.filter.as_deref(), Some("cimahi"));
    assert_eq!(report.teacher_rows, 1);
    assert_eq!(report.student_rows, 2);
    assert_eq!(report.comparison.len(), 1);
    assert_eq!(
        report.correlation,
        CorrelationOutcome::InsufficientData { rows: 1 }
    );

    // Wati is mid-band among all Penegak rows but top-band within Garut alone
    let garut = full_run(Some("garut"));
    let wati = garut.students.iter().find(|s| s.name == "Wati").unwrap();
    assert_eq!(wati.level_ct, Some(CtLevel::Tinggi));
}

#[test]
fn test_blank_filter_keeps_everything() {
    let report = full_run(Some("   "));
    assert_eq!(report.filter, None);
    assert_eq!(report.teacher_rows, 5);
}

#[test]
fn test_source_tables_are_not_mutated() {
    let (teachers, students) = fixtures();
    let before = (teachers.clone(), students.clone());
    run(&teachers, &students, &PipelineConfig::default(), Some("garut")).unwrap();
    assert_eq!(before, (teachers, students));
}

#[test]
fn test_shorter_key_merges_more_schools() {
    let (teachers, students) = fixtures();
    let config = PipelineConfig {
        key_tokens: 1,
        ..Default::default()
    };
    let report = run(&teachers, &students, &config, None).unwrap();

    let keys: Vec<_> = report
        .teacher_schools
        .iter()
        .map(|s| s.sekolah_key.as_str())
        .collect();
    assert_eq!(keys, vec!["sd", "smp", "sma", "mi"]);
}

#[test]
fn test_strict_policy_rejects_short_teacher_survey() {
    let teachers = parse_table("NAMA;Asal Instansi;P1;P2\nAni;SD 1;4;5\n".as_bytes(), b';').unwrap();
    let (_, students) = fixtures();

    let lenient = run(&teachers, &students, &PipelineConfig::default(), None).unwrap();
    assert_eq!(lenient.teachers[0].mean_ld, Some(4.5));
    assert_eq!(lenient.teachers[0].etika_digital, None);

    let strict = PipelineConfig {
        policy: ScoringPolicy::Strict,
        ..Default::default()
    };
    let err = run(&teachers, &students, &strict, None).unwrap_err();
    assert!(matches!(
        err,
        ScoringError::InsufficientLikertColumns {
            expected: 40,
            found: 2
        }
    ));
}

#[test]
fn test_written_report_round_trips_headers() {
    let report = full_run(None);
    let dir = format!("{}/ld_ct_rater_integration_report", std::env::temp_dir().display());
    let _ = fs::remove_dir_all(&dir);

    write_report(&dir, &report).unwrap();

    let teachers = fs::read_to_string(format!("{dir}/teachers.csv")).unwrap();
    let header = teachers.lines().next().unwrap();
    assert!(header.starts_with("NAMA,Asal Instansi,P1,P2,"));
    assert!(header.contains(",P40,Skill_Digital,"));
    assert!(!header.contains("Jabatan"));
    assert!(header.contains("Level_LD"));
    assert_eq!(teachers.lines().count(), 6);
    let ani = teachers.lines().nth(1).unwrap();
    assert!(ani.starts_with("Ani,SD Negeri 1 Bandung,5,5,"));

    let students = fs::read_to_string(format!("{dir}/students.csv")).unwrap();
    let header = students.lines().next().unwrap();
    assert!(header.starts_with("Nama,SekolahNama,Kategori,S 1,S 2,"));
    assert!(header.contains(",S 15,Total_CT,"));
    let yusuf = students.lines().find(|l| l.starts_with("Yusuf,")).unwrap();
    assert!(yusuf.contains(",Penegak,0,2,"));

    let comparison = fs::read_to_string(format!("{dir}/comparison.csv")).unwrap();
    assert_eq!(comparison.lines().count(), 4);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(format!("{dir}/report.json")).unwrap()).unwrap();
    assert_eq!(json["correlation"]["status"], "computed");
    assert_eq!(json["teacher_items"][0], "P1");
    assert_eq!(json["student_items"][14], "S 15");
    assert_eq!(json["teachers"][0]["items"].as_array().unwrap().len(), 40);

    fs::remove_dir_all(&dir).unwrap();
}
