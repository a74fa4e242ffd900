use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Suffix marking a page-content descriptor URL
pub const DESCRIPTOR_SUFFIX: &str = ".jsonp";

/// Output form requested for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Page images assembled into a PDF
    Images,
    /// Plain-text transcript
    Text,
}

/// How a descriptor is resolved and where its payload is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    /// Already a fetchable image URL
    DirectImage,
    /// `.jsonp` descriptor rewritten to its page image
    PageImage { found: bool },
    /// `.jsonp` descriptor fetched as-is for its text payload
    PageText,
}

impl AssetKind {
    /// Classify a raw descriptor for the given mode
    pub fn classify(raw: &str, mode: Mode) -> Self {
        match mode {
            Mode::Text => AssetKind::PageText,
            Mode::Images if raw.ends_with(DESCRIPTOR_SUFFIX) => AssetKind::PageImage { found: false },
            Mode::Images => AssetKind::DirectImage,
        }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, AssetKind::PageText)
    }
}

/// One discovered unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Page index assigned in dispatch order, starting at 1
    pub index: usize,

    /// Raw URL as found in the viewer page
    pub raw: String,

    pub kind: AssetKind,
}

impl PageDescriptor {
    pub fn new(index: usize, raw: String, kind: AssetKind) -> Self {
        Self { index, raw, kind }
    }
}

/// Outcome of one document run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Sanitized title used for output file names
    pub title: String,

    pub mode: Mode,

    /// Total page count shown on the viewer page (if available)
    pub total_pages: Option<usize>,

    /// Pages persisted (images) or appended (text)
    pub pages_written: usize,

    /// Pages skipped because their payload was malformed
    pub pages_skipped: usize,

    /// PDF or transcript produced by the run
    pub output: Option<PathBuf>,
}
