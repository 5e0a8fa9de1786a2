//! Format detection over sampled data blocks.

use std::io::{Read, Seek};

use memchr::memmem;

use crate::error::{JobError, Result};
use crate::sample::SampleBlock;
use crate::types::{JobSize, PdlKind};
use crate::{pcl345, pclxl, pdf, postscript};

/// Universal Exit Language escape; PJL job wrappers start with it.
pub(crate) const UEL: &[u8] = b"\x1b%-12345X";

/// Recognizers are probed in this order and the first match wins. The
/// signature sets overlap (a PJL wrapper can satisfy several probes, and
/// the PCL 3/4/5 set ends in a bare-UEL catch-all), so the order is part
/// of the observable contract: PCL 3/4/5 must stay last or it swallows
/// every wrapped job.
pub const DETECTION_ORDER: [PdlKind; 4] = [
    PdlKind::Postscript,
    PdlKind::PclXl,
    PdlKind::Pdf,
    PdlKind::Pcl345,
];

impl PdlKind {
    /// Whether the sampled blocks carry this format's signature.
    #[must_use]
    pub fn matches(&self, sample: &SampleBlock) -> bool {
        match self {
            Self::Postscript => postscript::is_valid(sample),
            Self::PclXl => pclxl::is_valid(sample),
            Self::Pdf => pdf::is_valid(sample),
            Self::Pcl345 => pcl345::is_valid(sample),
        }
    }

    /// Counts pages and copies over the whole source. Rewinds to offset
    /// 0 before reading, so the position after sampling does not matter.
    pub fn count<R: Read + Seek>(&self, source: &mut R) -> Result<JobSize> {
        match self {
            Self::Postscript => postscript::count(source),
            Self::PclXl => pclxl::count(source),
            Self::Pdf => pdf::count(source),
            Self::Pcl345 => pcl345::count(source),
        }
    }
}

/// Picks the first recognizer whose signature matches the sample.
pub fn detect(sample: &SampleBlock) -> Result<PdlKind> {
    for kind in DETECTION_ORDER {
        if kind.matches(sample) {
            tracing::debug!("{} signature matched", kind);
            return Ok(kind);
        }
        tracing::trace!("{} signature not matched", kind);
    }
    Err(JobError::UndetectedFormat)
}

/// True when a UEL escape sits inside the first 128 bytes, which is
/// where job wrappers put it.
pub(crate) fn uel_near_start(leading: &[u8]) -> bool {
    let window = &leading[..leading.len().min(128)];
    memmem::find(window, UEL).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_of(leading: &[u8]) -> SampleBlock {
        SampleBlock::from_parts(leading.to_vec(), Vec::new())
    }

    #[test]
    fn test_order_is_fixed() {
        assert_eq!(
            DETECTION_ORDER,
            [
                PdlKind::Postscript,
                PdlKind::PclXl,
                PdlKind::Pdf,
                PdlKind::Pcl345,
            ]
        );
    }

    #[test]
    fn test_plain_documents_detect_their_own_format() {
        assert_eq!(
            detect(&sample_of(b"%!PS-Adobe-3.0\n")).unwrap(),
            PdlKind::Postscript
        );
        assert_eq!(
            detect(&sample_of(b") HP-PCL XL;2;0\n")).unwrap(),
            PdlKind::PclXl
        );
        assert_eq!(detect(&sample_of(b"%PDF-1.4\n")).unwrap(), PdlKind::Pdf);
        assert_eq!(
            detect(&sample_of(b"\x1bE\x1b&l1X")).unwrap(),
            PdlKind::Pcl345
        );
    }

    #[test]
    fn test_wrapped_jobs_do_not_fall_into_the_catch_all() {
        // Every one of these satisfies the PCL 3/4/5 bare-UEL probe as
        // well; the earlier recognizers must claim them first.
        assert_eq!(
            detect(&sample_of(
                b"\x1b%-12345X@PJL ENTER LANGUAGE=POSTSCRIPT\r\n%!PS\n"
            ))
            .unwrap(),
            PdlKind::Postscript
        );
        assert_eq!(
            detect(&sample_of(
                b"\x1b%-12345X@PJL ENTER LANGUAGE=PCLXL\r\n) HP-PCL XL;2;0\n"
            ))
            .unwrap(),
            PdlKind::PclXl
        );
        assert_eq!(
            detect(&sample_of(b"\x1b%-12345X@PJL ENTER LANGUAGE=PDF\r\n%PDF-1.6\n")).unwrap(),
            PdlKind::Pdf
        );
    }

    #[test]
    fn test_wrapped_pcl_job_reaches_the_catch_all() {
        assert_eq!(
            detect(&sample_of(b"\x1b%-12345X@PJL ENTER LANGUAGE=PCL\r\n\x1bE"))
                .unwrap(),
            PdlKind::Pcl345
        );
    }

    #[test]
    fn test_noise_is_undetected() {
        let err = detect(&sample_of(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x07])).unwrap_err();
        assert!(matches!(err, JobError::UndetectedFormat));
        let err = detect(&sample_of(b"")).unwrap_err();
        assert!(matches!(err, JobError::UndetectedFormat));
    }

    #[test]
    fn test_uel_near_start_window() {
        let mut leading = vec![b'@'; 100];
        leading.extend_from_slice(UEL);
        assert!(uel_near_start(&leading));

        let mut leading = vec![b'@'; 128];
        leading.extend_from_slice(UEL);
        assert!(!uel_near_start(&leading));
    }
}
