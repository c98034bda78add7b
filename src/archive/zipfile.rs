// ABOUTME: Zip container support for the archive extractor.
// ABOUTME: Random access by entry name via the zip central directory.

use super::{ArchiveError, ArchiveReader, entry_destination, write_entry};
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Reader over a zip file on disk.
pub struct ZipReader {
    archive: ZipArchive<File>,
}

impl ZipReader {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
        let archive = ZipArchive::new(file)?;
        Ok(Self { archive })
    }
}

impl ArchiveReader for ZipReader {
    fn entries(&mut self) -> Result<Vec<String>, ArchiveError> {
        let mut names = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let entry = self.archive.by_index(index)?;
            if entry.is_file() {
                names.push(entry.name().to_string());
            }
        }
        Ok(names)
    }

    fn extract_entry(&mut self, name: &str, dest_dir: &Path) -> Result<PathBuf, ArchiveError> {
        let destination = entry_destination(name, dest_dir)?;
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(ArchiveError::EntryNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        write_entry(&mut entry, &destination)?;
        Ok(destination)
    }
}
