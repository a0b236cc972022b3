use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookletError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Source document unreadable: {0}")]
    SourceUnreadable(String),
    #[error("No pages to impose")]
    NoPages,
    #[error("Render failure: {0}")]
    RenderFailure(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Linearization failed: {0}")]
    Linearize(String),
}

pub type Result<T> = std::result::Result<T, BookletError>;

/// Output page sizes for a single booklet page (half a spread)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait dimensions (width, height) in millimetres
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }

    /// Look up a size by name, case-insensitively. Unknown names fall back to A4.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "LETTER" => PageSize::Letter,
            "LEGAL" => PageSize::Legal,
            _ => PageSize::A4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }
}

/// Coarse verdict on how much the booklet grew relative to its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeStatus {
    Good,
    Large,
}

impl SizeStatus {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < crate::constants::LARGE_OUTPUT_RATIO {
            SizeStatus::Good
        } else {
            SizeStatus::Large
        }
    }
}

/// Statistics about a booklet plan, computed without rendering
#[derive(Debug, Clone, PartialEq)]
pub struct BookletStatistics {
    /// Pages in the source document
    pub source_pages: usize,
    /// Source pages padded up to a multiple of 4
    pub padded_pages: usize,
    /// Number of blank pages added for padding
    pub blank_pages_added: usize,
    /// Number of signatures
    pub signatures: usize,
    /// Page count of each signature, in binding order
    pub pages_per_signature: Vec<usize>,
    /// Output pages (one per spread)
    pub output_spreads: usize,
    /// Physical sheets when printed duplex (two spreads per sheet)
    pub sheets: usize,
}
