// ABOUTME: Gzip-compressed tar support for the archive extractor.
// ABOUTME: Decompresses to a scratch file and indexes file entries so they can be extracted by name.

use super::{ArchiveError, ArchiveReader, entry_destination, write_entry};
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Reader over a `.tgz` / `.tar.gz` file.
///
/// Tar has no central directory, so the stream is decompressed once into an
/// unnamed file next to the archive and the offset and size of every regular
/// file are recorded. Memory use does not grow with the archive size.
pub struct GzipTarReader {
    tar: File,
    names: Vec<String>,
    index: HashMap<String, (u64, u64)>,
}

impl GzipTarReader {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
        let scratch = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tar = tempfile::tempfile_in(scratch).map_err(|e| ArchiveError::io(scratch, e))?;

        std::io::copy(&mut GzDecoder::new(file), &mut tar).map_err(|e| ArchiveError::io(path, e))?;
        tar.seek(SeekFrom::Start(0))
            .map_err(|e| ArchiveError::io(path, e))?;

        let mut names = Vec::new();
        let mut index = HashMap::new();
        {
            let mut archive = tar::Archive::new(&mut tar);
            let entries = archive
                .entries_with_seek()
                .map_err(|e| ArchiveError::io(path, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| ArchiveError::io(path, e))?;
                if !entry.header().entry_type().is_file() {
                    continue;
                }
                let name = entry
                    .path()
                    .map_err(|e| ArchiveError::io(path, e))?
                    .to_string_lossy()
                    .into_owned();
                let span = (entry.raw_file_position(), entry.size());
                if index.insert(name.clone(), span).is_none() {
                    names.push(name);
                }
            }
        }

        Ok(Self { tar, names, index })
    }
}

impl ArchiveReader for GzipTarReader {
    fn entries(&mut self) -> Result<Vec<String>, ArchiveError> {
        Ok(self.names.clone())
    }

    fn extract_entry(&mut self, name: &str, dest_dir: &Path) -> Result<PathBuf, ArchiveError> {
        let destination = entry_destination(name, dest_dir)?;
        let &(offset, size) = self
            .index
            .get(name)
            .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))?;
        self.tar
            .seek(SeekFrom::Start(offset))
            .map_err(|e| ArchiveError::io(&destination, e))?;
        write_entry(&mut (&mut self.tar).take(size), &destination)?;
        Ok(destination)
    }
}
