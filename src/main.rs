//! CLI entry point for the LD/CT rater.
//!
//! Provides subcommands for scoring both surveys and writing the derived
//! tables, printing the per-school comparison, and inspecting the column
//! manifest the scorer will use.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ld_ct_rater::analyzers::analyzer::{Manifests, run};
use ld_ct_rater::analyzers::types::Tier;
use ld_ct_rater::config::{PipelineConfig, ScoringPolicy};
use ld_ct_rater::output::{print_comparison, print_summary, write_report};
use ld_ct_rater::parser::{RawTable, load_table};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ld_ct_rater")]
#[command(about = "Scores teacher digital literacy and student computational thinking surveys", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Lenient,
    Strict,
}

impl From<PolicyArg> for ScoringPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Lenient => ScoringPolicy::Lenient,
            PolicyArg::Strict => ScoringPolicy::Strict,
        }
    }
}

#[derive(Args)]
struct Inputs {
    /// Teacher survey CSV (semicolon separated)
    #[arg(short, long, env = "LDCT_TEACHER_CSV", default_value = "files/data_LD_guru.csv")]
    teachers: String,

    /// Student survey CSV (semicolon separated)
    #[arg(short, long, env = "LDCT_STUDENT_CSV", default_value = "files/data_CT_siswa.csv")]
    students: String,

    /// Optional JSON pipeline config
    #[arg(short, long)]
    config: Option<String>,

    /// Override the scoring policy from the config
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Override the number of name tokens kept in the school key
    #[arg(long)]
    key_tokens: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score both surveys and write every derived table
    Score {
        #[command(flatten)]
        inputs: Inputs,

        /// School name filter (empty = all schools)
        #[arg(short, long, default_value = "")]
        filter: String,

        /// Directory to write CSV tables and report.json to
        #[arg(short, long, default_value = "out")]
        output_dir: String,
    },
    /// Print the per-school comparison and correlation
    Compare {
        #[command(flatten)]
        inputs: Inputs,

        /// School name filter (empty = all schools)
        #[arg(short, long, default_value = "")]
        filter: String,
    },
    /// Show how the survey columns are classified
    Schema {
        #[command(flatten)]
        inputs: Inputs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ld_ct_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ld_ct_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            inputs,
            filter,
            output_dir,
        } => {
            let (config, teachers, students) = load_inputs(&inputs)?;
            let report = run(&teachers, &students, &config, Some(&filter))?;
            print_summary(&report);
            write_report(&output_dir, &report)?;
        }
        Commands::Compare { inputs, filter } => {
            let (config, teachers, students) = load_inputs(&inputs)?;
            let report = run(&teachers, &students, &config, Some(&filter))?;
            print_comparison(&report);
        }
        Commands::Schema { inputs } => {
            let (config, teachers, students) = load_inputs(&inputs)?;
            let manifests = Manifests::describe(&teachers, &students, &config)?;

            info!(
                likert = manifests.teacher.likert_cols.len(),
                skill = manifests.teacher.groups.skill.len(),
                etika = manifests.teacher.groups.etika.len(),
                keamanan = manifests.teacher.groups.keamanan.len(),
                budaya = manifests.teacher.groups.budaya.len(),
                "Teacher columns"
            );
            info!(
                items = manifests.student.item_cols.len(),
                prefix = %config.item_prefix,
                "Student columns"
            );
            for tier in Tier::KNOWN {
                info!(
                    tier = %tier,
                    answered = manifests.student.answered_items(&tier),
                    "Tier items"
                );
            }
            info!("{}", serde_json::to_string_pretty(&manifests.teacher)?);
            info!("{}", serde_json::to_string_pretty(&manifests.student)?);
        }
    }

    Ok(())
}

/// Resolves the pipeline config and reads both survey tables.
#[tracing::instrument(skip_all, fields(teachers = %inputs.teachers, students = %inputs.students))]
fn load_inputs(inputs: &Inputs) -> Result<(PipelineConfig, RawTable, RawTable)> {
    let mut config = match &inputs.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(policy) = inputs.policy {
        config.policy = policy.into();
    }
    if let Some(tokens) = inputs.key_tokens {
        config.key_tokens = tokens;
    }
    config.validate().context("invalid pipeline configuration")?;

    let teachers = load_table(&inputs.teachers, config.delimiter_byte())?;
    let students = load_table(&inputs.students, config.delimiter_byte())?;

    info!(
        teachers = teachers.len(),
        students = students.len(),
        policy = ?config.policy,
        "Survey files read"
    );
    Ok((config, teachers, students))
}
