// ABOUTME: Archive extraction for deploy artifacts (zip and gzip-compressed tar).
// ABOUTME: Applies the exclude pattern and rejects entries escaping the destination.

mod tarball;
mod zipfile;

pub use tarball::GzipTarReader;
pub use zipfile::ZipReader;

use crate::types::ExcludePattern;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors from archive extraction.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("unsupported archive format: {0} (expected .zip, .tgz or .tar.gz)")]
    UnsupportedArchiveFormat(String),

    #[error("archive entry escapes the destination directory: {0}")]
    UnsafeEntryPath(String),

    #[error("archive entry not found: {0}")]
    EntryNotFound(String),

    #[error("corrupt zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error while extracting {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Supported artifact container formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    GzipTar,
}

impl ArchiveKind {
    /// Pick the archive kind from the artifact's name or locator.
    pub fn from_name(name: &str) -> Result<Self, ArchiveError> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Ok(ArchiveKind::Zip)
        } else if lower.ends_with(".tgz") || lower.ends_with(".tar.gz") {
            Ok(ArchiveKind::GzipTar)
        } else {
            Err(ArchiveError::UnsupportedArchiveFormat(name.to_string()))
        }
    }

    /// Open the archive at `path` as this kind.
    pub fn open(self, path: &Path) -> Result<Archive, ArchiveError> {
        match self {
            ArchiveKind::Zip => ZipReader::open(path).map(Archive::Zip),
            ArchiveKind::GzipTar => GzipTarReader::open(path).map(Archive::GzipTar),
        }
    }
}

/// Capabilities every archive format provides.
pub trait ArchiveReader {
    /// Stored names of the regular-file entries, in archive order.
    fn entries(&mut self) -> Result<Vec<String>, ArchiveError>;

    /// Write the entry stored as `name` underneath `dest_dir`.
    fn extract_entry(&mut self, name: &str, dest_dir: &Path) -> Result<PathBuf, ArchiveError>;
}

/// An opened archive of one of the supported kinds.
pub enum Archive {
    Zip(ZipReader),
    GzipTar(GzipTarReader),
}

impl ArchiveReader for Archive {
    fn entries(&mut self) -> Result<Vec<String>, ArchiveError> {
        match self {
            Archive::Zip(reader) => reader.entries(),
            Archive::GzipTar(reader) => reader.entries(),
        }
    }

    fn extract_entry(&mut self, name: &str, dest_dir: &Path) -> Result<PathBuf, ArchiveError> {
        match self {
            Archive::Zip(reader) => reader.extract_entry(name, dest_dir),
            Archive::GzipTar(reader) => reader.extract_entry(name, dest_dir),
        }
    }
}

/// Names of the entries written and skipped by [`extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub extracted: Vec<String>,
    pub skipped: Vec<String>,
}

/// Extract every regular file of the archive at `source` into `dest_dir`.
///
/// Entry names are normalized by stripping a leading `./`. Entries matching
/// `exclude` are skipped.
pub fn extract(
    source: &Path,
    kind: ArchiveKind,
    dest_dir: &Path,
    exclude: Option<&ExcludePattern>,
) -> Result<ExtractReport, ArchiveError> {
    tracing::info!("Extracting {:?} archive", kind);

    let mut archive = kind.open(source)?;
    let mut report = ExtractReport::default();

    for name in archive.entries()? {
        let normalized = normalize_entry_name(&name);
        if normalized.is_empty() {
            continue;
        }

        if exclude.is_some_and(|pattern| pattern.is_match(normalized)) {
            tracing::info!("Skipping {}", normalized);
            report.skipped.push(normalized.to_string());
            continue;
        }

        archive.extract_entry(&name, dest_dir)?;
        tracing::info!("Extracted {}", normalized);
        report.extracted.push(normalized.to_string());
    }

    Ok(report)
}

/// Strip a leading `./` (repeated) from a stored entry name.
pub fn normalize_entry_name(name: &str) -> &str {
    let mut name = name;
    while let Some(rest) = name.strip_prefix("./") {
        name = rest;
    }
    name
}

/// Destination path of an entry, refusing anything that would land outside `dest_dir`.
pub(crate) fn entry_destination(name: &str, dest_dir: &Path) -> Result<PathBuf, ArchiveError> {
    let normalized = Path::new(normalize_entry_name(name));

    let mut destination = dest_dir.to_path_buf();
    for component in normalized.components() {
        match component {
            Component::Normal(part) => destination.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::UnsafeEntryPath(name.to_string()));
            }
        }
    }

    if destination == dest_dir {
        return Err(ArchiveError::UnsafeEntryPath(name.to_string()));
    }

    Ok(destination)
}

/// Create the parent directories of `destination` and copy `reader` into it.
pub(crate) fn write_entry<R: std::io::Read>(
    reader: &mut R,
    destination: &Path,
) -> Result<(), ArchiveError> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
    }
    let mut file =
        std::fs::File::create(destination).map_err(|e| ArchiveError::io(destination, e))?;
    std::io::copy(reader, &mut file).map_err(|e| ArchiveError::io(destination, e))?;
    Ok(())
}
