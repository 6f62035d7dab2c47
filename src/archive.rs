//! Packaging of converted images into a single zip archive

use crate::error::ArchiveError;
use crate::types::ItemId;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::CompressionMethod;
use zip::write::FileOptions;

/// Builds in-memory zip archives from named byte entries
///
/// Entries are Deflate-compressed, which is lossless for the already-compressed images
/// stored inside.
#[derive(Clone, Copy, Debug)]
pub struct ArchiveBuilder {
    compression: CompressionMethod,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }
}

impl ArchiveBuilder {
    /// Builder that stores entries without compression
    pub fn stored() -> Self {
        Self {
            compression: CompressionMethod::Stored,
        }
    }

    /// Entry name for a converted item, e.g. `902000101.png`
    pub fn entry_name(id: &ItemId, extension: &str) -> String {
        format!("{id}.{extension}")
    }

    /// Package `(name, bytes)` entries into a zip archive
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Empty`] when there is nothing to package, or a zip/I/O
    /// error if an entry cannot be written.
    pub fn build<N, B>(&self, entries: &[(N, B)]) -> Result<Vec<u8>, ArchiveError>
    where
        N: AsRef<str>,
        B: AsRef<[u8]>,
    {
        if entries.is_empty() {
            return Err(ArchiveError::Empty);
        }

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(self.compression);

        for (name, bytes) in entries {
            writer.start_file(name.as_ref(), options)?;
            writer.write_all(bytes.as_ref())?;
        }

        let archive = writer.finish()?.into_inner();
        debug!(
            entries = entries.len(),
            size = archive.len(),
            "built archive"
        );
        Ok(archive)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_entries(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        (0..zip.len())
            .map(|i| {
                let mut file = zip.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[test]
    fn test_empty_entries_are_rejected() {
        let entries: Vec<(String, Vec<u8>)> = Vec::new();
        assert!(matches!(
            ArchiveBuilder::default().build(&entries),
            Err(ArchiveError::Empty)
        ));
    }

    #[test]
    fn test_entries_are_stored_losslessly_in_order() {
        let png_a = b"\x89PNG\r\n\x1a\nfirst".to_vec();
        let png_b = vec![0u8; 4096];
        let entries = vec![
            ("902000101.png".to_string(), png_a.clone()),
            ("902000102.png".to_string(), png_b.clone()),
        ];

        let archive = ArchiveBuilder::default().build(&entries).unwrap();
        let read = read_entries(&archive);

        assert_eq!(read, entries);
        assert_eq!(read[0].1, png_a);
        assert_eq!(read[1].1, png_b);
    }

    #[test]
    fn test_stored_builder_produces_readable_archive() {
        let archive = ArchiveBuilder::stored()
            .build(&[("a.png", b"abc".as_slice())])
            .unwrap();
        assert_eq!(read_entries(&archive), vec![("a.png".into(), b"abc".to_vec())]);
    }

    #[test]
    fn test_entry_name_uses_id_and_extension() {
        let id = ItemId::parse("902000101").unwrap();
        assert_eq!(ArchiveBuilder::entry_name(&id, "png"), "902000101.png");
    }
}
