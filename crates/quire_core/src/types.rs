/// The page description languages the engine recognizes.
///
/// This is a closed set: adding a recognizer means adding a variant here
/// and wiring it into every `match` below, which the compiler enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdlKind {
    Postscript,
    PclXl,
    Pdf,
    Pcl345,
}

impl PdlKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postscript => "PostScript",
            Self::PclXl => "PCLXL",
            Self::Pdf => "PDF",
            Self::Pcl345 => "PCL3/4/5",
        }
    }

    /// Shell template for rasterizing one job to TIFF, with `{dpi}`,
    /// `{input}` and `{output}` substitution slots for the caller.
    #[must_use]
    pub const fn raster_command(&self) -> &'static str {
        match self {
            Self::Postscript | Self::Pdf => {
                "gs -sDEVICE=tiff24nc -dPARANOIDSAFER -dNOPAUSE -dBATCH -dQUIET \
                 -r\"{dpi}\" -sOutputFile=\"{output}\" \"{input}\""
            }
            Self::PclXl | Self::Pcl345 => {
                "pcl6 -sDEVICE=tiff24nc -dPARANOIDSAFER -dNOPAUSE -dBATCH -dQUIET \
                 -r\"{dpi}\" -sOutputFile=\"{output}\" \"{input}\""
            }
        }
    }

    /// External interpreter the raster template relies on.
    #[must_use]
    pub const fn raster_requires(&self) -> &'static str {
        match self {
            Self::Postscript | Self::Pdf => "gs",
            Self::PclXl | Self::Pcl345 => "pcl6",
        }
    }
}

impl std::fmt::Display for PdlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Page and copy totals counted out of one print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSize {
    /// Number of page ejects found in the document body.
    pub pages: u32,
    /// Highest number of copies requested by the document, at least 1.
    pub copies: u32,
}

impl JobSize {
    #[must_use]
    pub const fn new(pages: u32, copies: u32) -> Self {
        Self { pages, copies }
    }

    /// Sheets that leave the printer: pages times copies.
    #[must_use]
    pub const fn total_sheets(&self) -> u64 {
        self.pages as u64 * self.copies as u64
    }
}
