//! Recognizer for DSC-conformant PostScript jobs.
//!
//! Pages are counted from `%%Page:` structuring comments, so documents
//! that bypass the DSC conventions entirely fall out as counting
//! failures rather than silent zero-page jobs.

use std::io::{Read, Seek, SeekFrom};
use std::sync::LazyLock;

use memchr::memmem;
use regex::Regex;

use crate::detect::uel_near_start;
use crate::error::{JobError, Result};
use crate::sample::SampleBlock;
use crate::types::{JobSize, PdlKind};

/// `%%Requirements: numcopies(5)` in the document prologue.
static NUMCOPIES_REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%%Requirements:\s*numcopies\((\d+)\)").expect("numcopies pattern is valid")
});

/// `/#copies 5 def` or `/NumCopies 5` in the document setup code.
static COPIES_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:#copies|NumCopies)\s+(\d+)").expect("copies pattern is valid"));

pub(crate) fn is_valid(sample: &SampleBlock) -> bool {
    let leading = sample.leading();
    if leading.starts_with(b"%!")
        || leading.starts_with(b"\x04%!")
        || leading.starts_with(b"\x1b%-12345X%!PS")
    {
        return true;
    }
    if uel_near_start(leading) {
        let upper = leading.to_ascii_uppercase();
        if memmem::find(&upper, b"LANGUAGE=POSTSCRIPT").is_some()
            || memmem::find(&upper, b"LANGUAGE = POSTSCRIPT").is_some()
        {
            return true;
        }
    }
    memmem::find(leading, b"%!PS-Adobe").is_some()
}

pub(crate) fn count<R: Read + Seek>(source: &mut R) -> Result<JobSize> {
    source.seek(SeekFrom::Start(0))?;
    let mut raw = Vec::new();
    source.read_to_end(&mut raw)?;
    let text = String::from_utf8_lossy(&raw);

    let mut pages: u32 = 0;
    for line in text.lines() {
        if line.starts_with("%%Page: ") {
            pages = pages.saturating_add(1);
        }
    }
    if pages == 0 {
        return Err(JobError::counting(
            PdlKind::Postscript,
            "no %%Page: structuring comments found",
        ));
    }

    Ok(JobSize::new(pages, requested_copies(&text)))
}

/// Highest copy count requested anywhere in the document, defaulting
/// to one. Jobs may carry several directives (per-page setup code is
/// common); the largest wins.
fn requested_copies(text: &str) -> u32 {
    let mut copies = 1;
    for pattern in [&NUMCOPIES_REQUIREMENT, &COPIES_DEFINE] {
        for caps in pattern.captures_iter(text) {
            if let Ok(value) = caps[1].parse::<u32>() {
                if value > copies {
                    copies = value;
                }
            }
        }
    }
    copies
}
