//! Seekable acquisition of print job data.
//!
//! Counting needs random access (the sampler reads the stream tail and
//! recognizers rewind), but jobs routinely arrive on standard input.
//! Non-seekable sources are drained into a private spool file that is
//! removed when the job handle drops.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use quire_core::Result;

const SPOOL_CHUNK_SIZE: usize = 1024 * 1024;
const SPOOL_PREFIX: &str = "quire_";
const SPOOL_SUFFIX: &str = ".prn";

/// Where one job's bytes come from.
pub enum JobInput {
    /// A file on disk, opened read-only and used in place.
    Path(PathBuf),
    /// The process's standard input; always spooled.
    Stdin,
    /// Any readable handle; always spooled.
    Reader(Box<dyn Read + Send>),
}

impl JobInput {
    /// Maps a command-line operand: `-` names standard input, anything
    /// else is a path.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// Name to report for this input.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Stdin => "-".to_string(),
            Self::Reader(_) => "<stream>".to_string(),
        }
    }
}

impl std::fmt::Debug for JobInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Stdin => f.write_str("Stdin"),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Placement of spool files for non-seekable sources.
#[derive(Debug, Clone, Default)]
pub struct SpoolConfig {
    /// Directory to spool into; the platform temp directory when unset.
    pub temp_dir: Option<PathBuf>,
}

/// An exclusively owned, random-access handle on one job's data.
#[derive(Debug)]
pub struct SeekableJob {
    backing: Backing,
    len: u64,
}

#[derive(Debug)]
enum Backing {
    Disk(File),
    Spooled(NamedTempFile),
}

impl SeekableJob {
    /// Opens the input, spooling it first when it cannot seek.
    pub fn open(input: JobInput, config: &SpoolConfig) -> Result<Self> {
        match input {
            JobInput::Path(path) => Self::from_path(&path),
            JobInput::Stdin => Self::spool(io::stdin().lock(), config),
            JobInput::Reader(reader) => Self::spool(reader, config),
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            backing: Backing::Disk(file),
            len,
        })
    }

    fn spool<R: Read>(mut reader: R, config: &SpoolConfig) -> Result<Self> {
        let dir = config
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let mut spool = tempfile::Builder::new()
            .prefix(SPOOL_PREFIX)
            .suffix(SPOOL_SUFFIX)
            .tempfile_in(&dir)?;

        let mut chunk = vec![0u8; SPOOL_CHUNK_SIZE];
        let mut len: u64 = 0;
        loop {
            let count = reader.read(&mut chunk)?;
            if count == 0 {
                break;
            }
            spool.write_all(&chunk[..count])?;
            len += count as u64;
        }
        spool.flush()?;
        spool.seek(SeekFrom::Start(0))?;
        tracing::debug!("spooled {} byte(s) to {}", len, spool.path().display());

        Ok(Self {
            backing: Backing::Spooled(spool),
            len,
        })
    }

    /// Total size of the job data in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path of the spool file backing this job, if it was spooled.
    #[must_use]
    pub fn spool_path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Disk(_) => None,
            Backing::Spooled(spool) => Some(spool.path()),
        }
    }
}

impl Read for SeekableJob {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.backing {
            Backing::Disk(file) => file.read(buf),
            Backing::Spooled(spool) => spool.read(buf),
        }
    }
}

impl Seek for SeekableJob {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.backing {
            Backing::Disk(file) => file.seek(pos),
            Backing::Spooled(spool) => spool.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_from_arg_maps_dash_to_stdin() {
        assert!(matches!(JobInput::from_arg("-"), JobInput::Stdin));
        assert!(matches!(JobInput::from_arg("job.prn"), JobInput::Path(_)));
        assert_eq!(JobInput::from_arg("-").display_name(), "-");
        assert_eq!(JobInput::from_arg("a/b.ps").display_name(), "a/b.ps");
    }

    #[test]
    fn test_spooled_reader_round_trips() {
        let payload = b"%PDF-1.4 pretend job data".to_vec();
        let input = JobInput::Reader(Box::new(Cursor::new(payload.clone())));
        let mut job = SeekableJob::open(input, &SpoolConfig::default()).unwrap();
        assert_eq!(job.len(), payload.len() as u64);

        let mut copy = Vec::new();
        job.read_to_end(&mut copy).unwrap();
        assert_eq!(copy, payload);

        job.seek(SeekFrom::Start(0)).unwrap();
        let mut again = Vec::new();
        job.read_to_end(&mut again).unwrap();
        assert_eq!(again, payload);
    }

    #[test]
    fn test_spool_honors_temp_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = SpoolConfig {
            temp_dir: Some(dir.path().to_path_buf()),
        };
        let input = JobInput::Reader(Box::new(Cursor::new(b"data".to_vec())));
        let job = SeekableJob::open(input, &config).unwrap();
        let path = job.spool_path().unwrap().to_path_buf();
        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(SPOOL_PREFIX));
        assert!(name.ends_with(SPOOL_SUFFIX));
    }

    #[test]
    fn test_spool_file_is_removed_on_drop() {
        let input = JobInput::Reader(Box::new(Cursor::new(b"ephemeral".to_vec())));
        let job = SeekableJob::open(input, &SpoolConfig::default()).unwrap();
        let path = job.spool_path().unwrap().to_path_buf();
        assert!(path.exists());
        drop(job);
        assert!(!path.exists());
    }

    #[test]
    fn test_disk_input_is_not_spooled() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"on disk").unwrap();
        let input = JobInput::Path(file.path().to_path_buf());
        let mut job = SeekableJob::open(input, &SpoolConfig::default()).unwrap();
        assert!(job.spool_path().is_none());
        assert_eq!(job.len(), 7);
        let mut copy = Vec::new();
        job.read_to_end(&mut copy).unwrap();
        assert_eq!(copy, b"on disk");
    }

    #[test]
    fn test_missing_path_is_an_io_error() {
        let input = JobInput::Path(PathBuf::from("/nonexistent/quire/job.prn"));
        let err = SeekableJob::open(input, &SpoolConfig::default()).unwrap_err();
        assert!(matches!(err, quire_core::JobError::Io(_)));
    }

    #[test]
    fn test_empty_reader_spools_to_empty_job() {
        let input = JobInput::Reader(Box::new(Cursor::new(Vec::new())));
        let job = SeekableJob::open(input, &SpoolConfig::default()).unwrap();
        assert!(job.is_empty());
    }
}
