mod analyze;
mod spool;

pub use analyze::{analyze, JobReport};
pub use spool::{JobInput, SeekableJob, SpoolConfig};
