//! Recognizer for PDF jobs.

use std::io::{Read, Seek, SeekFrom};
use std::sync::LazyLock;

use memchr::memmem;
use regex::Regex;

use crate::detect::uel_near_start;
use crate::error::{JobError, Result};
use crate::sample::SampleBlock;
use crate::types::{JobSize, PdlKind};

/// A page object dictionary: `/Type /Page` followed by a delimiter, so
/// the page-tree node `/Type /Pages` never matches.
static PAGE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/Page[/>\s]").expect("page object pattern is valid"));

pub(crate) fn is_valid(sample: &SampleBlock) -> bool {
    let leading = sample.leading();
    if leading.starts_with(b"%PDF-") || leading.starts_with(b"\x1b%-12345X%PDF-") {
        return true;
    }
    if uel_near_start(leading) {
        let upper = leading.to_ascii_uppercase();
        if memmem::find(&upper, b"LANGUAGE=PDF").is_some()
            || memmem::find(&upper, b"LANGUAGE = PDF").is_some()
        {
            return true;
        }
    }
    memmem::find(leading, b"%PDF-").is_some()
}

/// Counts `/Type /Page` object dictionaries over the decoded document.
///
/// Incrementally updated documents that replace a page object under the
/// same object number are taken at face value, so heavily edited files
/// can come out high; files whose page dictionaries live inside
/// compressed object streams come out as a counting failure instead of
/// a bogus zero.
pub(crate) fn count<R: Read + Seek>(source: &mut R) -> Result<JobSize> {
    source.seek(SeekFrom::Start(0))?;
    let mut raw = Vec::new();
    source.read_to_end(&mut raw)?;
    let text = String::from_utf8_lossy(&raw);

    let pages = PAGE_OBJECT.find_iter(&text).count();
    if pages == 0 {
        return Err(JobError::counting(
            PdlKind::Pdf,
            "no /Type /Page object dictionaries found",
        ));
    }

    Ok(JobSize::new(pages.min(u32::MAX as usize) as u32, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_of(leading: &[u8]) -> SampleBlock {
        SampleBlock::from_parts(leading.to_vec(), Vec::new())
    }

    fn pdf_with_pages(pages: usize) -> Vec<u8> {
        let mut doc = Vec::new();
        doc.extend_from_slice(b"%PDF-1.4\n");
        doc.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
        doc.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Count 0 /Kids [] >>\nendobj\n");
        for index in 0..pages {
            doc.extend_from_slice(
                format!(
                    "{} 0 obj\n<< /Type /Page /Parent 2 0 R >>\nendobj\n",
                    index + 3
                )
                .as_bytes(),
            );
        }
        doc.extend_from_slice(b"trailer\n<< /Root 1 0 R >>\n%%EOF\n");
        doc
    }

    #[test]
    fn test_valid_header_variants() {
        assert!(is_valid(&sample_of(b"%PDF-1.7\n")));
        assert!(is_valid(&sample_of(b"\x1b%-12345X%PDF-1.4\n")));
        assert!(is_valid(&sample_of(
            b"\x1b%-12345X@PJL ENTER LANGUAGE=PDF\r\n%PDF-1.5\n"
        )));
    }

    #[test]
    fn test_valid_embedded_header() {
        let mut leading = b"junk bytes before the marker ".to_vec();
        leading.extend_from_slice(b"%PDF-1.3\n");
        assert!(is_valid(&SampleBlock::from_parts(leading, Vec::new())));
    }

    #[test]
    fn test_invalid_noise() {
        assert!(!is_valid(&sample_of(b"PDF without the percent marker")));
        assert!(!is_valid(&sample_of(b"%!PS-Adobe-3.0\n")));
    }

    #[test]
    fn test_count_page_objects() {
        let size = count(&mut Cursor::new(pdf_with_pages(3))).unwrap();
        assert_eq!(size, JobSize::new(3, 1));
    }

    #[test]
    fn test_count_skips_page_tree_nodes() {
        // The catalog and /Type /Pages node alone hold no countable page.
        let err = count(&mut Cursor::new(pdf_with_pages(0))).unwrap_err();
        assert!(matches!(
            err,
            JobError::Counting {
                format: PdlKind::Pdf,
                ..
            }
        ));
    }

    #[test]
    fn test_count_accepts_compact_dictionaries() {
        let doc = b"%PDF-1.2\n3 0 obj<</Type/Page/Parent 2 0 R>>endobj\n";
        let size = count(&mut Cursor::new(doc.to_vec())).unwrap();
        assert_eq!(size.pages, 1);
    }

    #[test]
    fn test_count_survives_binary_sections() {
        let mut doc = pdf_with_pages(2);
        doc.extend_from_slice(b"5 0 obj\nstream\n");
        doc.extend_from_slice(&[0xff, 0xfe, 0x00, 0x81, 0x92]);
        doc.extend_from_slice(b"\nendstream\nendobj\n");
        let size = count(&mut Cursor::new(doc)).unwrap();
        assert_eq!(size.pages, 2);
    }
}
