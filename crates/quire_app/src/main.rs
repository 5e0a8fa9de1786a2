//! quire - print job accounting
//!
//! Detects the page description language of each given job file and
//! reports pages, copies and total sheets.

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use quire_core::JobError;
use quire_io::{analyze, JobInput, JobReport, SpoolConfig};

#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Job data files; use '-' to read one job from standard input.
    #[arg(required = true)]
    files: Vec<String>,

    /// Directory for spool files created for non-seekable input.
    #[arg(long, env = "QUIRE_TEMPDIR")]
    temp_dir: Option<PathBuf>,

    /// Emit one JSON record per job instead of the text block.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct JsonRecord<'a> {
    filename: &'a str,
    format: &'a str,
    pages: u32,
    copies: u32,
    total_sheets: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = SpoolConfig {
        temp_dir: args.temp_dir.clone(),
    };

    let mut failures = 0usize;
    for file in &args.files {
        match run_job(file, &config, args.json) {
            Ok(()) => {}
            Err(err) => {
                failures += 1;
                eprintln!("quire: {err:#}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} job(s) failed", failures, args.files.len());
    }
    Ok(())
}

fn run_job(file: &str, config: &SpoolConfig, json: bool) -> Result<()> {
    let report =
        analyze(JobInput::from_arg(file), config).map_err(|err| describe_failure(file, err))?;
    if json {
        println!("{}", render_json(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}

/// Counting failures keep the traditional wording; everything else
/// (missing file, empty input, unknown format) reports its own cause.
fn describe_failure(file: &str, err: JobError) -> anyhow::Error {
    match err {
        JobError::Counting { .. } => {
            anyhow::Error::new(err).context(format!("unsupported or unparsable format for {file}"))
        }
        _ => anyhow::Error::new(err).context(format!("cannot analyze {file}")),
    }
}

fn render_text(report: &JobReport) -> String {
    format!(
        "file\t{}\nformat\t{}\npages\t{}\ncopies\t{}\ntotal\t{}\n\n",
        report.filename, report.format, report.pages, report.copies, report.total_sheets
    )
}

fn render_json(report: &JobReport) -> Result<String> {
    let record = JsonRecord {
        filename: &report.filename,
        format: report.format.name(),
        pages: report.pages,
        copies: report.copies,
        total_sheets: report.total_sheets,
    };
    Ok(serde_json::to_string(&record)?)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let default_filter = if verbose {
        "quire=debug,quire_core=debug,quire_io=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
