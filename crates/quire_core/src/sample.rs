//! Bounded sampling of job data for signature detection.
//!
//! Detection never reads a whole document. It looks at a leading window
//! large enough to get past PJL preambles, plus a small trailing window
//! for formats whose distinguishing marks sit at the end of the stream.

use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;

/// Bytes sampled from the start of the stream.
pub const FIRST_BLOCK_SIZE: usize = 16 * 1024;
/// Bytes sampled from the end of the stream.
pub const LAST_BLOCK_SIZE: usize = 256;

/// The leading and trailing windows of one job, as handed to the
/// format recognizers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBlock {
    leading: Vec<u8>,
    trailing: Vec<u8>,
}

impl SampleBlock {
    /// Samples the source from its current position (expected to be
    /// offset 0). Streams shorter than [`LAST_BLOCK_SIZE`] get an empty
    /// trailing window rather than an error.
    pub fn read_from<R: Read + Seek>(source: &mut R) -> Result<Self> {
        let mut leading = vec![0u8; FIRST_BLOCK_SIZE];
        let filled = read_up_to(source, &mut leading)?;
        leading.truncate(filled);

        let trailing = match source.seek(SeekFrom::End(-(LAST_BLOCK_SIZE as i64))) {
            Ok(_) => {
                let mut tail = vec![0u8; LAST_BLOCK_SIZE];
                let filled = read_up_to(source, &mut tail)?;
                tail.truncate(filled);
                tail
            }
            Err(_) => Vec::new(),
        };

        Ok(Self { leading, trailing })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(leading: Vec<u8>, trailing: Vec<u8>) -> Self {
        Self { leading, trailing }
    }

    #[must_use]
    pub fn leading(&self) -> &[u8] {
        &self.leading
    }

    #[must_use]
    pub fn trailing(&self) -> &[u8] {
        &self.trailing
    }
}

/// Reads until `buf` is full or the source hits end of stream, and
/// returns how many bytes landed. `Read::read` may return short counts,
/// so a single call is not enough here.
fn read_up_to<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let count = source.read(&mut buf[filled..])?;
        if count == 0 {
            break;
        }
        filled += count;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_short_stream_has_empty_trailing() {
        let mut source = Cursor::new(vec![0x41; 100]);
        let sample = SampleBlock::read_from(&mut source).unwrap();
        assert_eq!(sample.leading().len(), 100);
        assert!(sample.trailing().is_empty());
    }

    #[test]
    fn test_stream_between_block_sizes() {
        let mut source = Cursor::new(vec![0x42; 1000]);
        let sample = SampleBlock::read_from(&mut source).unwrap();
        assert_eq!(sample.leading().len(), 1000);
        assert_eq!(sample.trailing().len(), LAST_BLOCK_SIZE);
    }

    #[test]
    fn test_large_stream_is_clamped_to_windows() {
        let mut data = vec![0x43; FIRST_BLOCK_SIZE + 4096];
        let len = data.len();
        data[len - 1] = 0x99;
        let mut source = Cursor::new(data);
        let sample = SampleBlock::read_from(&mut source).unwrap();
        assert_eq!(sample.leading().len(), FIRST_BLOCK_SIZE);
        assert_eq!(sample.trailing().len(), LAST_BLOCK_SIZE);
        assert_eq!(sample.trailing()[LAST_BLOCK_SIZE - 1], 0x99);
    }

    #[test]
    fn test_empty_stream_samples_empty() {
        let mut source = Cursor::new(Vec::new());
        let sample = SampleBlock::read_from(&mut source).unwrap();
        assert!(sample.leading().is_empty());
        assert!(sample.trailing().is_empty());
    }

    #[test]
    fn test_exactly_last_block_size() {
        let mut source = Cursor::new(vec![0x44; LAST_BLOCK_SIZE]);
        let sample = SampleBlock::read_from(&mut source).unwrap();
        assert_eq!(sample.leading().len(), LAST_BLOCK_SIZE);
        assert_eq!(sample.trailing().len(), LAST_BLOCK_SIZE);
    }
}
