//! Readback helpers for archives produced under test.

use std::io::{Cursor, Read};

use anyhow::{Context, Result, bail};

/// One decoded archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// In-archive path.
    pub name: String,
    /// Decompressed contents.
    pub contents: Vec<u8>,
}

impl ArchiveEntry {
    /// Contents interpreted as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }
}

/// Decode every entry of a ZIP archive, in central-directory order.
///
/// Fails when the archive is unreadable or any entry is not deflate-compressed.
///
/// # Errors
///
/// Returns an error if the bytes are not a complete ZIP archive.
pub fn read_entries(bytes: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("response body is not a zip archive")?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .with_context(|| format!("failed to open entry {index}"))?;
        if file.compression() != zip::CompressionMethod::Deflated {
            bail!("entry {} is not deflate-compressed", file.name());
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .with_context(|| format!("failed to inflate entry {}", file.name()))?;
        entries.push(ArchiveEntry {
            name: file.name().to_string(),
            contents,
        });
    }
    Ok(entries)
}

/// Entry names of a ZIP archive, in order.
///
/// # Errors
///
/// Returns an error if the bytes are not a complete ZIP archive.
pub fn entry_names(bytes: &[u8]) -> Result<Vec<String>> {
    Ok(read_entries(bytes)?
        .into_iter()
        .map(|entry| entry.name)
        .collect())
}
