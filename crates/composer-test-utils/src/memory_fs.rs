//! In-memory [`FileSystem`] double.
//!
//! Writes require the parent directory to exist, like a real disk, so tests
//! catch a pipeline that forgets to create it. Individual paths can be made
//! to fail reads or writes.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use composer_core::BoxFuture;
use composer_core::fs::FileSystem;

#[derive(Default)]
struct State {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
    unwritable: HashSet<PathBuf>,
    writes: usize,
}

impl State {
    fn add_dir_all(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

/// File system held entirely in memory.
#[derive(Default)]
pub struct MemoryFs {
    state: Mutex<State>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryFs::insert`].
    pub fn with_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.insert(path, contents);
        self
    }

    /// Put a file in place, creating its parent directories. Does not count
    /// as a write.
    pub fn insert(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            state.add_dir_all(parent);
        }
        state.files.insert(path.to_path_buf(), contents.to_string());
    }

    /// Create a directory and its ancestors.
    pub fn mkdir(&self, path: impl AsRef<Path>) {
        self.lock().add_dir_all(path.as_ref());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
        self.lock().dirs.contains(path.as_ref())
    }

    /// Every file path, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    /// Number of successful [`FileSystem::write`] calls.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Make reads of `path` fail with `PermissionDenied`.
    pub fn fail_reads_of(&self, path: impl AsRef<Path>) {
        self.lock().unreadable.insert(path.as_ref().to_path_buf());
    }

    /// Make writes to `path` fail with `PermissionDenied`.
    pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
        self.lock().unwritable.insert(path.as_ref().to_path_buf());
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read_now(&self, path: &Path) -> io::Result<String> {
        let state = self.lock();
        if state.unreadable.contains(path) {
            return Err(denied(path));
        }
        state.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }

    fn write_now(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut state = self.lock();
        if state.unwritable.contains(path) {
            return Err(denied(path));
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !state.dirs.contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", parent.display()),
            ));
        }
        state.files.insert(path.to_path_buf(), contents.to_string());
        state.writes += 1;
        Ok(())
    }
}

fn denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("{} is not accessible", path.display()),
    )
}

impl FileSystem for MemoryFs {
    fn read_to_string(&self, path: &Path) -> BoxFuture<'_, io::Result<String>> {
        let result = self.read_now(path);
        Box::pin(async move { result })
    }

    fn write(&self, path: &Path, contents: &str) -> BoxFuture<'_, io::Result<()>> {
        let result = self.write_now(path, contents);
        Box::pin(async move { result })
    }

    fn exists(&self, path: &Path) -> BoxFuture<'_, bool> {
        let state = self.lock();
        let found = state.files.contains_key(path) || state.dirs.contains(path);
        Box::pin(async move { found })
    }

    fn create_dir_all(&self, path: &Path) -> BoxFuture<'_, io::Result<()>> {
        let mut state = self.lock();
        let result = if state.files.contains_key(path) {
            Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            ))
        } else {
            state.add_dir_all(path);
            Ok(())
        };
        Box::pin(async move { result })
    }
}
