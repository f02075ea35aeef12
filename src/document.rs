use crate::image_discovery::ImageDiscovery;
use crate::{ExtractError, ExtractorConfig, ImageResource, Result};
use lopdf::{Document, ObjectId};

// ── PdfDocument ──────────────────────────────────────────────────────────────

/// A parsed PDF, read-only for its whole lifetime.
///
/// ```no_run
/// use extractimagespdf::PdfDocument;
///
/// let bytes = std::fs::read("brochure.pdf").unwrap();
/// let doc = PdfDocument::load(&bytes).unwrap();
/// for page in doc.pages() {
///     println!("page {}: {} image(s)", page.number(), page.image_resources().len());
/// }
/// ```
pub struct PdfDocument {
    document: Document,
    config: ExtractorConfig,
}

impl PdfDocument {
    /// Parse `bytes` with the default [`ExtractorConfig`].
    pub fn load(bytes: &[u8]) -> Result<Self> {
        Self::load_with_config(bytes, ExtractorConfig::default())
    }

    /// Parse `bytes`; `config` controls how image resources are discovered.
    ///
    /// Fails with [`ExtractError::InvalidPdf`] for empty or headerless input,
    /// [`ExtractError::ParseError`] for anything lopdf cannot read, and
    /// [`ExtractError::EncryptedPdf`] for encrypted documents. The input
    /// buffer is never modified.
    pub fn load_with_config(bytes: &[u8], config: ExtractorConfig) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ExtractError::InvalidPdf("input is empty".into()));
        }
        if !has_pdf_header(bytes) {
            return Err(ExtractError::InvalidPdf("missing %PDF- header".into()));
        }

        let document = Document::load_mem(bytes)?;

        reject_encrypted(&document)?;
        document
            .catalog()
            .map_err(|e| ExtractError::InvalidPdf(format!("missing or invalid catalog: {e}")))?;

        log::debug!(
            "loaded PDF {} with {} object(s)",
            document.version,
            document.objects.len()
        );

        Ok(Self { document, config })
    }

    /// Pages in page-tree order. Empty for a document without pages.
    pub fn pages(&self) -> Vec<Page<'_>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, id)| Page {
                number,
                id,
                document: &self.document,
                config: &self.config,
            })
            .collect()
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Returns a reference to the underlying [`lopdf::Document`].
    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// Some producers emit leading garbage before the header; tolerate up to 1 KiB
/// of it the way common readers do.
/// lopdf decrypts files with an empty user password on load and drops
/// `/Encrypt` from the trailer, so both the trailer and the load state are
/// checked.
fn reject_encrypted(document: &Document) -> Result<()> {
    if document.was_encrypted() || document.trailer.get(b"Encrypt").is_ok() {
        return Err(ExtractError::EncryptedPdf);
    }
    Ok(())
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(1024)];
    window.windows(5).any(|w| w == b"%PDF-")
}

// ── Page ─────────────────────────────────────────────────────────────────────

/// A read-only view of one page of a [`PdfDocument`].
#[derive(Clone, Copy)]
pub struct Page<'a> {
    number: u32,
    id: ObjectId,
    document: &'a Document,
    config: &'a ExtractorConfig,
}

impl<'a> Page<'a> {
    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The page dictionary's object id.
    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    /// The page's drawable Image XObjects, in resource-dictionary order.
    pub fn image_resources(&self) -> Vec<ImageResource<'a>> {
        ImageDiscovery::new(self.document, self.config).collect_page_images(self.number, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_rejects_empty_slice() {
        assert!(matches!(
            PdfDocument::load(&[]),
            Err(ExtractError::InvalidPdf(_))
        ));
    }

    #[test]
    fn load_rejects_non_pdf() {
        let err = PdfDocument::load(b"not a pdf").err().unwrap();
        assert_eq!(err.kind(), crate::FailureKind::BadInput);
    }

    #[test]
    fn header_search_tolerates_leading_bytes() {
        assert!(has_pdf_header(b"\r\n%PDF-1.7\n"));
        assert!(!has_pdf_header(b"%PD"));
    }

    #[test]
    fn documents_decrypted_on_load_are_rejected() {
        let mut document = Document::with_version("1.5");
        assert!(reject_encrypted(&document).is_ok());

        // What lopdf leaves behind after opening an empty-password file.
        document.encryption_state = Some(lopdf::EncryptionState::default());
        assert!(document.trailer.get(b"Encrypt").is_err());
        assert!(matches!(
            reject_encrypted(&document),
            Err(ExtractError::EncryptedPdf)
        ));
    }
}
