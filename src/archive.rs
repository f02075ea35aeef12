use crate::{ExtractError, ExtractedImage, Result};
use std::collections::HashSet;
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

// ── ArchiveEntry ─────────────────────────────────────────────────────────────

/// One named payload to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl From<ExtractedImage> for ArchiveEntry {
    fn from(image: ExtractedImage) -> Self {
        Self {
            name: image.filename,
            data: image.data,
        }
    }
}

// ── ImageArchive ─────────────────────────────────────────────────────────────

/// A finished ZIP archive plus the metadata a caller needs to serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArchive {
    /// The complete ZIP file.
    pub data: Vec<u8>,

    /// Entry names in archive order.
    pub entry_names: Vec<String>,

    /// Suggested download name, always `extracted_images.zip`.
    pub file_name: &'static str,

    /// Always `application/zip`.
    pub content_type: &'static str,
}

impl ImageArchive {
    pub const FILE_NAME: &'static str = "extracted_images.zip";
    pub const CONTENT_TYPE: &'static str = "application/zip";

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.entry_names.len()
    }

    /// `true` when the archive holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entry_names.is_empty()
    }
}

// ── ArchivePackager ──────────────────────────────────────────────────────────

/// Writes named payloads into a ZIP archive.
///
/// Output is reproducible: entries keep insertion order, every entry is
/// deflated at the same level (level 0 stores entries uncompressed), and all
/// timestamps are fixed to 1980-01-01 00:00 (the ZIP epoch).
#[derive(Debug, Clone, Copy)]
pub struct ArchivePackager {
    compression_level: u8,
}

impl Default for ArchivePackager {
    fn default() -> Self {
        Self::new(9)
    }
}

impl ArchivePackager {
    pub fn new(compression_level: u8) -> Self {
        Self { compression_level }
    }

    /// Package `entries` into an in-memory archive.
    ///
    /// ```
    /// use extractimagespdf::{ArchiveEntry, ArchivePackager};
    ///
    /// let archive = ArchivePackager::default()
    ///     .pack(vec![ArchiveEntry { name: "a.png".into(), data: vec![1, 2, 3] }])
    ///     .unwrap();
    /// assert_eq!(archive.entry_names, vec!["a.png"]);
    /// ```
    pub fn pack<I>(&self, entries: I) -> Result<ImageArchive>
    where
        I: IntoIterator<Item = ArchiveEntry>,
    {
        let (cursor, entry_names) = self.pack_into(Cursor::new(Vec::new()), entries)?;
        Ok(ImageArchive {
            data: cursor.into_inner(),
            entry_names,
            file_name: ImageArchive::FILE_NAME,
            content_type: ImageArchive::CONTENT_TYPE,
        })
    }

    /// Stream `entries` into `writer`, returning the writer and the entry
    /// names written.
    ///
    /// Each payload is dropped as soon as it has been compressed, so only
    /// one entry needs to be resident at a time when `entries` is lazy.
    /// Fails with [`ExtractError::DuplicateEntryName`] when two entries share
    /// a name; compression and I/O failures are surfaced unchanged.
    pub fn pack_into<W, I>(&self, writer: W, entries: I) -> Result<(W, Vec<String>)>
    where
        W: Write + Seek,
        I: IntoIterator<Item = ArchiveEntry>,
    {
        let options = self.file_options();
        let mut zip = ZipWriter::new(writer);
        let mut seen: HashSet<String> = HashSet::new();
        let mut names = Vec::new();

        for entry in entries {
            if !seen.insert(entry.name.clone()) {
                return Err(ExtractError::DuplicateEntryName(entry.name));
            }
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
            log::debug!("archived {} ({} bytes)", entry.name, entry.data.len());
            names.push(entry.name);
        }

        let writer = zip.finish()?;
        Ok((writer, names))
    }

    // Level 0 means "store"; deflate itself only accepts 1..=9.
    fn file_options(&self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
        if self.compression_level == 0 {
            options.compression_method(CompressionMethod::Stored)
        } else {
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.compression_level.into()))
        }
    }
}
