//! Recognizer for PCL-XL (PCL 6) binary streams.
//!
//! The stream is a sequence of single-byte tags. Scalars, arrays,
//! coordinate pairs, boxes and embedded data blocks all announce their
//! size, so the walker can hop over payloads and only ever interpret
//! real tag bytes. BeginPage operators are the page count; the
//! PageCopies attribute carries the copy count.

use std::io::{Read, Seek, SeekFrom};

use memchr::{memchr, memmem};

use crate::detect::uel_near_start;
use crate::error::{JobError, Result};
use crate::sample::SampleBlock;
use crate::types::{JobSize, PdlKind};

const STREAM_HEADER: &[u8] = b" HP-PCL XL;";

const BEGIN_PAGE: u8 = 0x43;
const ATTR_UBYTE: u8 = 0xf8;
const ATTR_UINT16: u8 = 0xf9;
const EMBEDDED_DATA: u8 = 0xfa;
const EMBEDDED_DATA_BYTE: u8 = 0xfb;

/// Attribute identifier for PageCopies.
const PAGE_COPIES: u16 = 49;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Big,
    Little,
}

pub(crate) fn is_valid(sample: &SampleBlock) -> bool {
    let leading = sample.leading();
    if leading.starts_with(b") HP-PCL XL;") {
        return true;
    }
    if uel_near_start(leading) && memmem::find(leading, STREAM_HEADER).is_some() {
        let upper = leading.to_ascii_uppercase();
        return memmem::find(&upper, b"LANGUAGE=PCLXL").is_some()
            || memmem::find(&upper, b"LANGUAGE = PCLXL").is_some();
    }
    false
}

pub(crate) fn count<R: Read + Seek>(source: &mut R) -> Result<JobSize> {
    source.seek(SeekFrom::Start(0))?;
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;

    let header = memmem::find(&data, STREAM_HEADER)
        .ok_or_else(|| counting_error("missing stream header"))?;
    let endian = match header.checked_sub(1).map(|index| data[index]) {
        Some(b'(') => Endian::Big,
        Some(b')') => Endian::Little,
        _ => return Err(counting_error("missing byte-order marker")),
    };
    let body = memchr(b'\n', &data[header..])
        .map(|offset| header + offset + 1)
        .ok_or_else(|| counting_error("unterminated stream header"))?;

    let mut pages: u32 = 0;
    let mut copies: u32 = 1;
    // Most recent unsigned scalar, pending attribute binding.
    let mut last_scalar: Option<u32> = None;
    let mut pos = body;

    while pos < data.len() {
        let tag = data[pos];
        pos += 1;
        match tag {
            // Whitespace between tags.
            0x00 | 0x09..=0x0d | 0x20 => {}
            // A PJL escape after the session ends the binary stream.
            0x1b => break,
            BEGIN_PAGE => {
                pages = pages.saturating_add(1);
                last_scalar = None;
            }
            // Remaining operator tags carry no inline payload.
            0x21..=0xbf => last_scalar = None,
            0xc0 => {
                last_scalar = data.get(pos).map(|&v| u32::from(v));
                pos += 1;
            }
            0xc1 => {
                last_scalar = read_u16(&data, pos, endian).map(u32::from);
                pos += 2;
            }
            0xc2 => {
                last_scalar = read_u32(&data, pos, endian);
                pos += 4;
            }
            // Signed and real scalars never bind to PageCopies.
            0xc3 => {
                last_scalar = None;
                pos += 2;
            }
            0xc4 | 0xc5 => {
                last_scalar = None;
                pos += 4;
            }
            // Arrays: element width from the tag, length from a
            // following ubyte/uint16/uint32 scalar.
            0xc8..=0xcd => {
                last_scalar = None;
                match skip_array(&data, pos, scalar_width(tag), endian) {
                    Some(next) => pos = next,
                    None => break,
                }
            }
            // Coordinate pairs and boxes: two or four scalars wide.
            0xd0..=0xd5 => {
                last_scalar = None;
                pos += 2 * scalar_width(tag);
            }
            0xe0..=0xe5 => {
                last_scalar = None;
                pos += 4 * scalar_width(tag);
            }
            ATTR_UBYTE => {
                let id = data.get(pos).map(|&v| u16::from(v));
                pos += 1;
                bind_attribute(id, last_scalar.take(), &mut copies);
            }
            ATTR_UINT16 => {
                let id = read_u16(&data, pos, endian);
                pos += 2;
                bind_attribute(id, last_scalar.take(), &mut copies);
            }
            EMBEDDED_DATA => match read_u32(&data, pos, endian) {
                Some(len) => {
                    last_scalar = None;
                    pos = skip_bytes(data.len(), pos + 4, u64::from(len));
                }
                None => break,
            },
            EMBEDDED_DATA_BYTE => match data.get(pos) {
                Some(&len) => {
                    last_scalar = None;
                    pos = skip_bytes(data.len(), pos + 1, u64::from(len));
                }
                None => break,
            },
            _ => last_scalar = None,
        }
    }

    if pages == 0 {
        return Err(counting_error("no BeginPage operators found"));
    }
    Ok(JobSize::new(pages, copies))
}

fn counting_error(reason: &str) -> JobError {
    JobError::counting(PdlKind::PclXl, reason)
}

/// Width in bytes of the scalar family a tag belongs to. The low three
/// bits encode the data type for scalar, array, pair and box tags alike.
const fn scalar_width(tag: u8) -> usize {
    match tag & 0x07 {
        0x00 => 1,
        0x01 | 0x03 => 2,
        _ => 4,
    }
}

fn bind_attribute(id: Option<u16>, value: Option<u32>, copies: &mut u32) {
    if id == Some(PAGE_COPIES) {
        if let Some(requested) = value {
            if requested > *copies {
                *copies = requested;
            }
        }
    }
}

fn skip_array(data: &[u8], pos: usize, width: usize, endian: Endian) -> Option<usize> {
    let length_tag = *data.get(pos)?;
    let mut pos = pos + 1;
    let elements = match length_tag {
        0xc0 => {
            let len = u64::from(*data.get(pos)?);
            pos += 1;
            len
        }
        0xc1 => {
            let len = u64::from(read_u16(data, pos, endian)?);
            pos += 2;
            len
        }
        0xc2 => {
            let len = u64::from(read_u32(data, pos, endian)?);
            pos += 4;
            len
        }
        _ => return None,
    };
    Some(skip_bytes(
        data.len(),
        pos,
        elements.saturating_mul(width as u64),
    ))
}

/// Advances past `len` payload bytes, clamped to the end of the stream
/// so a truncated job terminates the walk instead of wrapping.
fn skip_bytes(data_len: usize, pos: usize, len: u64) -> usize {
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    pos.saturating_add(len).min(data_len)
}

fn read_u16(data: &[u8], pos: usize, endian: Endian) -> Option<u16> {
    let bytes: [u8; 2] = data.get(pos..pos + 2)?.try_into().ok()?;
    Some(match endian {
        Endian::Big => u16::from_be_bytes(bytes),
        Endian::Little => u16::from_le_bytes(bytes),
    })
}

fn read_u32(data: &[u8], pos: usize, endian: Endian) -> Option<u32> {
    let bytes: [u8; 4] = data.get(pos..pos + 4)?.try_into().ok()?;
    Some(match endian {
        Endian::Big => u32::from_be_bytes(bytes),
        Endian::Little => u32::from_le_bytes(bytes),
    })
}
