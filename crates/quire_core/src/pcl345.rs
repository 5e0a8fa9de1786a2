//! Recognizer for PCL 3, 4 and 5 data streams.
//!
//! Counting walks the escape-sequence grammar instead of grepping for
//! form feeds: raster rows, downloaded fonts and macros, and transparent
//! print data all carry binary payloads that may contain 0x0C bytes, and
//! those must not be mistaken for page ejects.

use std::io::{Read, Seek, SeekFrom};

use memchr::memmem;

use crate::detect::UEL;
use crate::error::{JobError, Result};
use crate::sample::SampleBlock;
use crate::types::{JobSize, PdlKind};

const ESC: u8 = 0x1b;
const FORM_FEED: u8 = 0x0c;

pub(crate) fn is_valid(sample: &SampleBlock) -> bool {
    let leading = sample.leading();
    let trailing = sample.trailing();
    if leading.starts_with(b"\x1bE\x1b") || leading.starts_with(b"\x1b%8\x1b") {
        return true;
    }
    // A job that opens with raster data is PCL unless the trailing
    // window says it ends like a PCL-XL wrapped stream.
    if leading.starts_with(b"\x1b*rbC") && !trailing.ends_with(b"\x0c\x1b@") {
        return true;
    }
    if leading.starts_with(b"\xcd\xca") && memmem::find(leading, b"\x1bE\x1b").is_some() {
        return true;
    }
    if memmem::find(leading, b"@PJL ENTER LANGUAGE=PCL\n\r\x1b").is_some() {
        return true;
    }
    // Catch-all for PJL-wrapped jobs, which is why this recognizer must
    // be tried after the other three.
    memmem::find(leading, UEL).is_some()
}

pub(crate) fn count<R: Read + Seek>(source: &mut R) -> Result<JobSize> {
    source.seek(SeekFrom::Start(0))?;
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;

    let mut pages: u32 = 0;
    let mut copies: u32 = 1;
    let mut pos = 0usize;
    while pos < data.len() {
        match data[pos] {
            FORM_FEED => {
                pages = pages.saturating_add(1);
                pos += 1;
            }
            ESC => pos = handle_escape(&data, pos, &mut copies),
            _ => pos += 1,
        }
    }

    if pages == 0 {
        return Err(JobError::counting(
            PdlKind::Pcl345,
            "no form feeds outside binary payloads",
        ));
    }
    Ok(JobSize::new(pages, copies))
}

/// Consumes one escape sequence starting at `esc` and returns the
/// position of the byte after it, payload included.
///
/// Grammar: `ESC` + parameterized character (0x21-0x2F) + optional group
/// character (0x60-0x7E) + repeated value/parameter pairs, closed by an
/// uppercase terminator (0x40-0x5E). A lowercase parameter character is
/// the same command as its uppercase form with the sequence continuing.
/// Anything else after `ESC` is a two-character sequence.
fn handle_escape(data: &[u8], esc: usize, copies: &mut u32) -> usize {
    let mut pos = esc + 1;
    let Some(&introducer) = data.get(pos) else {
        return pos;
    };
    if !(0x21..=0x2f).contains(&introducer) {
        return pos + 1;
    }
    pos += 1;

    let group = match data.get(pos) {
        Some(&g) if (0x60..=0x7e).contains(&g) => {
            pos += 1;
            Some(g)
        }
        _ => None,
    };

    loop {
        let mut negative = false;
        match data.get(pos) {
            Some(&b'+') => pos += 1,
            Some(&b'-') => {
                negative = true;
                pos += 1;
            }
            _ => {}
        }
        let mut value: u64 = 0;
        while let Some(&digit) = data.get(pos) {
            if digit.is_ascii_digit() {
                value = value
                    .saturating_mul(10)
                    .saturating_add(u64::from(digit - b'0'));
                pos += 1;
            } else {
                break;
            }
        }
        if let Some(&b'.') = data.get(pos) {
            pos += 1;
            while let Some(&digit) = data.get(pos) {
                if digit.is_ascii_digit() {
                    pos += 1;
                } else {
                    break;
                }
            }
        }
        // Negative values move cursors; they never size a payload or a
        // copy count.
        if negative {
            value = 0;
        }

        match data.get(pos) {
            Some(&term) if (0x40..=0x5e).contains(&term) => {
                pos += 1;
                return apply_command(data, pos, introducer, group, term, value, copies);
            }
            Some(&param) if (0x60..=0x7e).contains(&param) => {
                pos += 1;
                pos = apply_command(
                    data,
                    pos,
                    introducer,
                    group,
                    param.to_ascii_uppercase(),
                    value,
                    copies,
                );
            }
            _ => return pos,
        }
    }
}

fn apply_command(
    data: &[u8],
    pos: usize,
    introducer: u8,
    group: Option<u8>,
    terminator: u8,
    value: u64,
    copies: &mut u32,
) -> usize {
    match (introducer, group, terminator) {
        // ESC &l#X requests copies of the current and following pages.
        (b'&', Some(b'l'), b'X') => {
            let requested = value.min(u64::from(u32::MAX)) as u32;
            if requested > *copies {
                *copies = requested;
            }
            pos
        }
        // ESC &p#X: the next `value` bytes print literally.
        (b'&', Some(b'p'), b'X') => skip_payload(data, pos, value),
        // W-terminated sequences (raster rows, font/macro/pattern
        // downloads, configuration blocks) carry `value` payload bytes.
        (_, _, b'W') => skip_payload(data, pos, value),
        _ => pos,
    }
}

fn skip_payload(data: &[u8], pos: usize, len: u64) -> usize {
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    pos.saturating_add(len).min(data.len())
}
