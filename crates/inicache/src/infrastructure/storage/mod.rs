//! Storage infrastructure: the backing file behind a configuration store.
//!
//! The store never touches `std::fs` directly.  It goes through the
//! [`BackingStore`] trait so that tests can substitute
//! [`mock::MockBackingStore`] to count reads and inject failures without
//! changing file permissions on the host.
//!
//! # Staleness stamps
//!
//! A [`FileStamp`] is the file's modification time plus its length.  The
//! store compares stamps to decide whether its cached table is stale.  The
//! length catches truncations and rewrites that land within the same
//! timestamp tick on filesystems with coarse modification times.  Nothing
//! here detects a same-length rewrite within one tick.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::SystemTime;

use tracing::warn;

pub mod mock;

/// Observable identity of one version of the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub len: u64,
}

/// Filesystem operations needed by the configuration store.
///
/// Implementations must be shareable across threads; the store calls them
/// while holding its own lock, so they need no locking of their own beyond
/// what their internal state requires.
pub trait BackingStore: Send + Sync {
    /// Returns the current stamp of `path`, or `None` if it does not exist.
    fn stamp(&self, path: &Path) -> io::Result<Option<FileStamp>>;

    /// Returns `true` if `path` exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file as text.  Invalid UTF-8 sequences are replaced
    /// with U+FFFD rather than failing the read.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Replaces the whole file with `contents`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Creates `path` and any missing parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Creates an empty file at `path`.
    fn create_empty(&self, path: &Path) -> io::Result<()>;
}

/// [`BackingStore`] on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBackingStore;

impl BackingStore for FsBackingStore {
    fn stamp(&self, path: &Path) -> io::Result<Option<FileStamp>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(FileStamp {
                modified: meta.modified()?,
                len: meta.len(),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(
                    "{} is not valid UTF-8 (first bad byte at {}), replacing invalid sequences",
                    path.display(),
                    e.utf8_error().valid_up_to()
                );
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map(drop)
    }
}
