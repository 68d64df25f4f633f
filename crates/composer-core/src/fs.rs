//! File-system capability.
//!
//! Everything the composer reads or writes goes through [`FileSystem`], so
//! the resolve/merge/apply pipeline runs unchanged against the real disk
//! ([`LocalFs`]) or an in-memory double in tests.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::BoxFuture;

/// Narrow file-system interface consumed by the composer.
///
/// Uses `BoxFuture` for object safety (allows `Arc<dyn FileSystem>`).
pub trait FileSystem: Send + Sync {
    /// Read a UTF-8 file.
    fn read_to_string(&self, path: &Path) -> BoxFuture<'_, io::Result<String>>;

    /// Create or truncate a file with the given contents.
    fn write(&self, path: &Path, contents: &str) -> BoxFuture<'_, io::Result<()>>;

    /// Whether something exists at `path`.
    fn exists(&self, path: &Path) -> BoxFuture<'_, bool>;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> BoxFuture<'_, io::Result<()>>;
}

/// The host's real file system, via `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn read_to_string(&self, path: &Path) -> BoxFuture<'_, io::Result<String>> {
        let path = path.to_path_buf();
        Box::pin(async move { tokio::fs::read_to_string(path).await })
    }

    fn write(&self, path: &Path, contents: &str) -> BoxFuture<'_, io::Result<()>> {
        let path = path.to_path_buf();
        let contents = contents.to_string();
        Box::pin(async move { tokio::fs::write(path, contents).await })
    }

    fn exists(&self, path: &Path) -> BoxFuture<'_, bool> {
        let path = path.to_path_buf();
        Box::pin(async move { tokio::fs::metadata(path).await.is_ok() })
    }

    fn create_dir_all(&self, path: &Path) -> BoxFuture<'_, io::Result<()>> {
        let path = path.to_path_buf();
        Box::pin(async move { tokio::fs::create_dir_all(path).await })
    }
}

/// Sibling backup location: the same path with `.bak` appended.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy `path` verbatim to its `.bak` sibling, overwriting any older backup.
///
/// Returns `Ok(false)` when there is nothing to back up. A file that exists
/// but cannot be read is skipped with a warning; a failed backup write is an
/// error so the caller never overwrites the original without a copy.
pub async fn backup_if_exists(fs: &dyn FileSystem, path: &Path) -> io::Result<bool> {
    if !fs.exists(path).await {
        return Ok(false);
    }
    let previous = match fs.read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Existing output unreadable, skipping backup");
            return Ok(false);
        }
    };
    let bak = backup_path(path);
    fs.write(&bak, &previous).await?;
    debug!(backup = %bak.display(), bytes = previous.len(), "Backed up previous output");
    Ok(true)
}
