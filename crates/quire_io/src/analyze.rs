//! One-call job analysis: acquire the data, count it, report.

use quire_core::{analyzer, JobError, PdlKind, Result};

use crate::spool::{JobInput, SeekableJob, SpoolConfig};

/// The accounting record produced for one analyzed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Name of the input as given (`-` for standard input).
    pub filename: String,
    /// Detected page description language.
    pub format: PdlKind,
    pub pages: u32,
    pub copies: u32,
    /// Pages times copies.
    pub total_sheets: u64,
}

/// Analyzes one print job end to end: acquires a seekable handle
/// (spooling if necessary), detects the format, counts pages and
/// copies. The backing resource, spool file included, is released on
/// every exit path.
pub fn analyze(input: JobInput, config: &SpoolConfig) -> Result<JobReport> {
    let filename = input.display_name();
    let mut job = SeekableJob::open(input, config)?;
    if job.is_empty() {
        return Err(JobError::EmptyInput);
    }

    let format = analyzer::detect_source(&mut job)?;
    let size = format.count(&mut job)?;
    tracing::debug!(
        "{}: {} pages={} copies={}",
        filename,
        format,
        size.pages,
        size.copies
    );

    Ok(JobReport {
        filename,
        format,
        pages: size.pages,
        copies: size.copies,
        total_sheets: size.total_sheets(),
    })
}
