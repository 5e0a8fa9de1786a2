use crate::types::PdlKind;
use thiserror::Error;

/// Errors reported by the job analysis engine.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is empty")]
    EmptyInput,

    #[error("analysis of the sampled data blocks failed: no known signature")]
    UndetectedFormat,

    #[error("{format} counting failed: {reason}")]
    Counting { format: PdlKind, reason: String },
}

impl JobError {
    pub(crate) fn counting(format: PdlKind, reason: impl Into<String>) -> Self {
        Self::Counting {
            format,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JobError>;
