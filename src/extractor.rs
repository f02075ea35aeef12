use crate::extraction_engine::ExtractionEngine;
use crate::{ExtractedImage, ExtractorConfig, ImageArchive, Result};

/// Result of a successful pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// At least one image was extracted and packaged.
    Archive(ImageArchive),
    /// The document parsed, but none of its image resources could be
    /// extracted (this includes documents with no pages).
    NoImagesFound,
}

impl Extraction {
    /// The archive, if one was produced.
    pub fn into_archive(self) -> Option<ImageArchive> {
        match self {
            Extraction::Archive(archive) => Some(archive),
            Extraction::NoImagesFound => None,
        }
    }
}

// ── PdfImageExtractor ────────────────────────────────────────────────────────

/// Entry point for image extraction.
///
/// The extractor holds only configuration; each call parses its own input and
/// keeps nothing afterwards, so one extractor can serve concurrent requests.
///
/// ```no_run
/// use extractimagespdf::{ExtractorConfig, PdfImageExtractor};
///
/// let bytes = std::fs::read("brochure.pdf").unwrap();
///
/// // Default configuration
/// let images = PdfImageExtractor::new().extract_images(&bytes).unwrap();
///
/// // Faster, larger archives
/// let cfg = ExtractorConfig { compression_level: 1, ..Default::default() };
/// let outcome = PdfImageExtractor::with_config(cfg).extract_archive(&bytes).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfImageExtractor {
    config: ExtractorConfig,
}

impl PdfImageExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the active [`ExtractorConfig`].
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract every recognisable image, in page order then in-page order.
    ///
    /// An empty vector means no images were found.
    pub fn extract_images(&self, pdf: &[u8]) -> Result<Vec<ExtractedImage>> {
        ExtractionEngine::new(&self.config).extract(pdf)
    }

    /// Extract every recognisable image and package them into a ZIP archive.
    pub fn extract_archive(&self, pdf: &[u8]) -> Result<Extraction> {
        ExtractionEngine::new(&self.config).run(pdf)
    }
}
