use lopdf::{Document, ObjectId, Stream};
use std::fmt;
use std::path::Path;

// ── ImageResource ────────────────────────────────────────────────────────────

/// One Image XObject drawn on a page, borrowed from the parsed document.
///
/// Produced by [`crate::Page::image_resources`]; consumed by
/// [`crate::classify`].
#[derive(Clone, Copy)]
pub struct ImageResource<'a> {
    /// 1-based page number in page-tree order.
    pub page_number: u32,

    /// 1-based position among the page's image resources.
    pub index: usize,

    /// The XObject's indirect object id, `None` for a direct stream.
    pub object_id: Option<ObjectId>,

    /// Resource name under which the page (or a form) refers to the image,
    /// e.g. `Im0`.
    pub name: &'a [u8],

    /// The image stream: dictionary plus stored (still encoded) bytes.
    pub stream: &'a Stream,

    pub(crate) document: &'a Document,
}

impl<'a> ImageResource<'a> {
    /// The document this resource belongs to.
    pub fn document(&self) -> &'a Document {
        self.document
    }
}

impl fmt::Debug for ImageResource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResource")
            .field("page_number", &self.page_number)
            .field("index", &self.index)
            .field("object_id", &self.object_id)
            .field("name", &String::from_utf8_lossy(self.name))
            .field("stored_len", &self.stream.content.len())
            .finish()
    }
}

// ── ImageFormat ──────────────────────────────────────────────────────────────

/// The standalone file formats a PDF image stream can carry verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// JPEG (`/DCTDecode`).
    Jpeg,
    /// JPEG 2000 with a JP2 container (`/JPXDecode`).
    Jpeg2000,
    /// Bare JPEG 2000 codestream (`/JPXDecode` without a container).
    Jpeg2000Codestream,
    /// PNG file stored unfiltered.
    Png,
}

impl ImageFormat {
    /// MIME-like content type, e.g. `image/jpeg`.
    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Jpeg2000 => "image/jp2",
            ImageFormat::Jpeg2000Codestream => "image/j2c",
            ImageFormat::Png => "image/png",
        }
    }

    /// File extension: the subtype portion of [`ImageFormat::content_type`].
    pub fn extension(self) -> &'static str {
        let content_type = self.content_type();
        content_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .unwrap_or(content_type)
    }
}

// ── ClassifiedImage ──────────────────────────────────────────────────────────

/// Output of [`crate::classify`]: a payload known to be a complete image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedImage {
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

// ── ExtractedImage ───────────────────────────────────────────────────────────

/// An image ready for packaging.
///
/// Returned by [`crate::PdfImageExtractor::extract_images`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    /// `image_page_<page>_<index>.<ext>`, unique within one document.
    pub filename: String,

    /// The image file bytes, exactly as stored in the PDF (after undoing
    /// transport filters only).
    pub data: Vec<u8>,

    /// MIME-like content type, e.g. `image/png`.
    pub content_type: &'static str,

    /// 1-based page number the image was found on.
    pub page_number: u32,

    /// 1-based position among that page's image resources.
    pub index: usize,
}

impl ExtractedImage {
    /// Build the extracted image for a classified resource.
    pub fn new(resource: &ImageResource<'_>, classified: ClassifiedImage) -> Self {
        Self {
            filename: Self::file_name(resource.page_number, resource.index, classified.format),
            data: classified.data,
            content_type: classified.format.content_type(),
            page_number: resource.page_number,
            index: resource.index,
        }
    }

    /// The archive name for image `index` on page `page_number`.
    ///
    /// ```
    /// # use extractimagespdf::{ExtractedImage, ImageFormat};
    /// assert_eq!(ExtractedImage::file_name(2, 1, ImageFormat::Png), "image_page_2_1.png");
    /// ```
    pub fn file_name(page_number: u32, index: usize, format: ImageFormat) -> String {
        format!("image_page_{page_number}_{index}.{}", format.extension())
    }

    /// Returns the file extension, or `None` if the filename has none.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
    }

    /// Write this image into `output_dir`, creating the directory if necessary.
    pub fn save_to_disk<P: AsRef<Path>>(&self, output_dir: P) -> std::io::Result<()> {
        let dir = output_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(&self.filename), &self.data)
    }
}
