//! Whole-job analysis over a seekable source.

use std::io::{Read, Seek, SeekFrom};

use crate::detect;
use crate::error::{JobError, Result};
use crate::sample::SampleBlock;
use crate::types::{JobSize, PdlKind};

/// Detects the format of a job without counting it.
pub fn detect_source<R: Read + Seek>(source: &mut R) -> Result<PdlKind> {
    if stream_len(source)? == 0 {
        return Err(JobError::EmptyInput);
    }
    source.seek(SeekFrom::Start(0))?;
    let sample = SampleBlock::read_from(source)?;
    detect::detect(&sample)
}

/// Samples the source, picks a recognizer and counts the job.
///
/// The source only has to be readable and seekable; position on entry
/// does not matter and is unspecified on return. Running this twice on
/// the same source returns the same result.
pub fn count_source<R: Read + Seek>(source: &mut R) -> Result<JobSize> {
    let kind = detect_source(source)?;
    let size = kind.count(source)?;
    tracing::debug!(
        "counted {} job: pages={} copies={}",
        kind,
        size.pages,
        size.copies
    );
    Ok(size)
}

fn stream_len<R: Seek>(source: &mut R) -> Result<u64> {
    Ok(source.seek(SeekFrom::End(0))?)
}
