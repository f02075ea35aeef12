use crate::{
    classify_with_limit, ArchiveEntry, ArchivePackager, ExtractError, ExtractedImage, Extraction,
    ExtractorConfig, FailureKind, PdfDocument, Result,
};
use std::fmt;

/// Where one pipeline pass currently is.
///
/// A pass moves strictly forward,
/// `Idle → Loaded → Extracting → Packaging → Done`, and can leave any state for
/// `Failed`. `NoImagesFound` ends a pass that found nothing to package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Loaded,
    Extracting,
    Packaging,
    Done,
    NoImagesFound,
    Failed(FailureKind),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::Loaded => f.write_str("loaded"),
            PipelineState::Extracting => f.write_str("extracting"),
            PipelineState::Packaging => f.write_str("packaging"),
            PipelineState::Done => f.write_str("done"),
            PipelineState::NoImagesFound => f.write_str("no images found"),
            PipelineState::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

/// Central extraction engine that drives one request through
/// read → discover → classify → package.
///
/// Holds no state beyond the current pass; every call to
/// [`ExtractionEngine::run`] starts again from `Idle`.
pub struct ExtractionEngine<'a> {
    config: &'a ExtractorConfig,
    state: PipelineState,
}

impl<'a> ExtractionEngine<'a> {
    pub fn new(config: &'a ExtractorConfig) -> Self {
        Self {
            config,
            state: PipelineState::Idle,
        }
    }

    /// State reached by the most recent pass.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the full pipeline over `bytes`.
    pub fn run(&mut self, bytes: &[u8]) -> Result<Extraction> {
        let images = self.extract(bytes)?;

        if images.is_empty() {
            self.transition(PipelineState::NoImagesFound);
            log::info!("no extractable images found");
            return Ok(Extraction::NoImagesFound);
        }

        self.transition(PipelineState::Packaging);
        let archive = ArchivePackager::new(self.config.compression_level)
            .pack(images.into_iter().map(ArchiveEntry::from))
            .map_err(|e| self.fail(e))?;

        self.transition(PipelineState::Done);
        log::info!(
            "packaged {} image(s) into {} bytes",
            archive.len(),
            archive.data.len()
        );
        Ok(Extraction::Archive(archive))
    }

    /// Run the pipeline up to (not including) packaging.
    ///
    /// Leaves the engine in `Extracting`, or `Failed` when the document
    /// cannot be read.
    pub fn extract(&mut self, bytes: &[u8]) -> Result<Vec<ExtractedImage>> {
        self.state = PipelineState::Idle;

        if let Err(e) = self.config.validate() {
            return Err(self.fail(e));
        }

        let document = PdfDocument::load_with_config(bytes, self.config.clone())
            .map_err(|e| self.fail(e))?;
        self.transition(PipelineState::Loaded);

        self.transition(PipelineState::Extracting);
        Ok(self.collect_images(&document))
    }

    /// Classify every image resource of every page, in page order then
    /// in-page order. Resources that do not classify are skipped.
    fn collect_images(&self, document: &PdfDocument) -> Vec<ExtractedImage> {
        let mut images = Vec::new();
        let mut skipped = 0usize;

        for page in document.pages() {
            for resource in page.image_resources() {
                match classify_with_limit(&resource, self.config.max_decoded_bytes) {
                    Some(classified) => images.push(ExtractedImage::new(&resource, classified)),
                    None => skipped += 1,
                }
            }
        }

        log::debug!(
            "{} page(s): {} image(s) extracted, {} skipped",
            document.page_count(),
            images.len(),
            skipped
        );
        images
    }

    fn transition(&mut self, next: PipelineState) {
        log::debug!("pipeline: {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: ExtractError) -> ExtractError {
        let kind = error.kind();
        log::warn!("pipeline failed while {}: {}", self.state, error);
        self.state = PipelineState::Failed(kind);
        error
    }
}
