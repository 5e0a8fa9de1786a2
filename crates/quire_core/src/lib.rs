pub mod analyzer;
pub mod detect;
mod error;
mod pcl345;
mod pclxl;
mod pdf;
mod postscript;
pub mod sample;
mod types;

pub use detect::DETECTION_ORDER;
pub use error::{JobError, Result};
pub use sample::SampleBlock;
pub use types::{JobSize, PdlKind};
