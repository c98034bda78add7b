// ABOUTME: Scratch space for one deployment run.
// ABOUTME: Holds the downloaded archive and its extracted files; removed when the run ends.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ARCHIVE_FILENAME: &str = "artifact";
const EXTRACT_DIRNAME: &str = "site";

/// Name prefix of every scratch directory.
pub const SCRATCH_PREFIX: &str = "webapp-deploy-";

/// Temporary directory tree for a single run.
///
/// Dropping the workspace removes it; [`Workspace::release`] does the same
/// but reports failures.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    extract_dir: PathBuf,
}

impl Workspace {
    /// Create the workspace under `root`, or the system temp dir when `None`.
    pub fn acquire_in(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let extract_dir = dir.path().join(EXTRACT_DIRNAME);
        std::fs::create_dir(&extract_dir)?;
        Ok(Self { dir, extract_dir })
    }

    /// Where the downloaded archive is stored.
    pub fn archive_path(&self) -> PathBuf {
        self.dir.path().join(ARCHIVE_FILENAME)
    }

    /// Directory the archive is extracted into.
    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace and everything in it.
    pub fn release(self) -> io::Result<()> {
        self.dir.close()
    }
}
