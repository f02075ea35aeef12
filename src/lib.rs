//! # extractImagesPDF
//!
//! A Rust library for pulling the embedded raster images out of a PDF document
//! and handing them back as a single ZIP archive.
//!
//! ## What this crate does
//!
//! 1. **Read the PDF**: parses the bytes into a page-ordered document model.
//! 2. **Discover images**: walks every page's `/Resources` (including
//!    inherited resources and nested Form XObjects) for Image XObjects.
//! 3. **Classify images**: keeps the ones whose stored bytes already form a
//!    standalone image file (JPEG, JPEG 2000, PNG); nothing is transcoded.
//! 4. **Package**: writes every kept image into a deterministic ZIP archive,
//!    named `image_page_<p>_<i>.<ext>`.
//!
//! ## Quick example
//!
//! ```no_run
//! use extractimagespdf::{Extraction, PdfImageExtractor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("brochure.pdf")?;
//!
//! match PdfImageExtractor::new().extract_archive(&bytes)? {
//!     Extraction::Archive(archive) => {
//!         std::fs::write(archive.file_name, &archive.data)?;
//!     }
//!     Extraction::NoImagesFound => println!("no images"),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use thiserror::Error;

mod archive;
mod classifier;
mod document;
mod extracted;
mod extraction_engine;
mod extractor;
mod image_discovery;
mod pdf_utils;
pub mod server;

pub use archive::{ArchiveEntry, ArchivePackager, ImageArchive};
pub use classifier::{classify, classify_with_limit};
pub use document::{Page, PdfDocument};
pub use extracted::{ClassifiedImage, ExtractedImage, ImageFormat, ImageResource};
pub use extraction_engine::{ExtractionEngine, PipelineState};
pub use extractor::{Extraction, PdfImageExtractor};

/// Environment variable overriding [`ExtractorConfig::compression_level`].
pub const COMPRESSION_LEVEL_ENV: &str = "EXTRACT_IMAGES_COMPRESSION_LEVEL";

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for [`PdfImageExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Deflate level used for every archive entry, `0..=9`; `0` stores
    /// entries uncompressed.
    ///
    /// The default of `9` gives the smallest, byte-reproducible output at the
    /// cost of CPU time compared to lower levels.
    pub compression_level: u8,

    /// When `true`, images drawn through Form XObjects are collected as well
    /// as the ones referenced directly from the page.
    pub descend_into_forms: bool,

    /// Maximum Form XObject nesting followed when `descend_into_forms` is set.
    pub max_form_depth: usize,

    /// Upper bound on the bytes one image stream may inflate to while its
    /// `FlateDecode` layers are undone. Streams that would grow past it are
    /// skipped.
    pub max_decoded_bytes: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            compression_level: 9,
            descend_into_forms: true,
            max_form_depth: 8,
            max_decoded_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ExtractorConfig {
    /// Highest deflate level accepted by [`ExtractorConfig::validate`].
    pub const MAX_COMPRESSION_LEVEL: u8 = 9;

    /// Default configuration with the compression level taken from
    /// `EXTRACT_IMAGES_COMPRESSION_LEVEL` when it is set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(COMPRESSION_LEVEL_ENV) {
            config.compression_level = parse_compression_level(&raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the packager cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > Self::MAX_COMPRESSION_LEVEL {
            return Err(ExtractError::InvalidConfig(format!(
                "compression level {} is outside 0..={}",
                self.compression_level,
                Self::MAX_COMPRESSION_LEVEL
            )));
        }
        if self.max_decoded_bytes == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_decoded_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn parse_compression_level(raw: &str) -> Result<u8> {
    raw.trim().parse::<u8>().map_err(|_| {
        ExtractError::InvalidConfig(format!(
            "{COMPRESSION_LEVEL_ENV} must be an integer in 0..=9, got '{raw}'"
        ))
    })
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
///
/// "No images found" is not an error; it is reported as
/// [`Extraction::NoImagesFound`].
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The input bytes do not form a usable PDF document.
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// The underlying lopdf parser returned an error.
    #[error("PDF parse error: {0}")]
    ParseError(#[from] lopdf::Error),

    /// The document is encrypted; password-protected PDFs are not supported.
    #[error("Encrypted PDFs are not supported")]
    EncryptedPdf,

    /// Two archive entries were given the same name.
    #[error("Duplicate archive entry name '{0}'")]
    DuplicateEntryName(String),

    /// The ZIP writer failed.
    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    /// An I/O error occurred while writing the archive or an output file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration cannot be honoured.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of an [`ExtractError`], used by callers to pick a
/// response (client error vs. server error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The uploaded bytes are not a PDF this crate can read.
    BadInput,
    /// Archive construction (or its configuration) failed.
    PackagingFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::BadInput => f.write_str("bad input"),
            FailureKind::PackagingFailed => f.write_str("packaging failed"),
        }
    }
}

impl ExtractError {
    /// Which side of the boundary this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::InvalidPdf(_)
            | ExtractError::ParseError(_)
            | ExtractError::EncryptedPdf => FailureKind::BadInput,
            ExtractError::DuplicateEntryName(_)
            | ExtractError::ArchiveError(_)
            | ExtractError::IoError(_)
            | ExtractError::InvalidConfig(_) => FailureKind::PackagingFailed,
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compression_level_accepts_whitespace() {
        assert_eq!(parse_compression_level(" 6 ").unwrap(), 6);
    }

    #[test]
    fn parse_compression_level_rejects_garbage() {
        let err = parse_compression_level("max").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn validate_rejects_level_above_nine() {
        let cfg = ExtractorConfig {
            compression_level: 10,
            ..Default::default()
        };
        assert_eq!(cfg.validate().unwrap_err().kind(), FailureKind::PackagingFailed);
    }

    #[test]
    fn validate_rejects_zero_decode_limit() {
        let cfg = ExtractorConfig {
            max_decoded_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ExtractError::InvalidConfig(_))));
    }
}
