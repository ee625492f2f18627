//! In-memory backing store for unit testing.
//!
//! Files live in a map guarded by a mutex.  Every modification advances a
//! logical clock, so stamps change deterministically regardless of the host
//! filesystem's timestamp granularity.  Tests can also:
//!
//! - simulate another process editing or deleting the file,
//! - make reads, writes, or creation fail with `PermissionDenied`,
//! - count how many times the file was read.

use std::collections::{HashMap, HashSet};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use super::{BackingStore, FileStamp};

#[derive(Default)]
struct MockState {
    files: HashMap<PathBuf, (String, SystemTime)>,
    dirs: HashSet<PathBuf>,
    clock: u64,
    reads: usize,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
    fail_create: bool,
}

impl MockState {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.clock)
    }
}

/// A mock implementation of [`BackingStore`] that keeps files in memory.
#[derive(Default)]
pub struct MockBackingStore {
    state: Mutex<MockState>,
}

fn denied() -> io::Error {
    io::Error::new(ErrorKind::PermissionDenied, "permission denied (mock)")
}

impl MockBackingStore {
    /// Creates an empty mock with no files and no directories.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("lock poisoned")
    }

    /// Writes `contents` as if another process had edited the file.
    pub fn external_write(&self, path: &Path, contents: &str) {
        let mut state = self.lock();
        let now = state.tick();
        state
            .files
            .insert(path.to_path_buf(), (contents.to_string(), now));
    }

    /// Deletes the file as if another process had removed it.
    pub fn remove(&self, path: &Path) {
        self.lock().files.remove(path);
    }

    /// Returns the current contents of the file, if it exists.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.lock().files.get(path).map(|(text, _)| text.clone())
    }

    /// Returns the number of successful reads so far.
    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    /// Returns the number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Returns `true` if `create_dir_all` was called for `path`.
    pub fn has_dir(&self, path: &Path) -> bool {
        self.lock().dirs.contains(path)
    }

    /// Makes every subsequent read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Makes directory and file creation fail (or succeed again).
    pub fn set_fail_create(&self, fail: bool) {
        self.lock().fail_create = fail;
    }
}

impl BackingStore for MockBackingStore {
    fn stamp(&self, path: &Path) -> io::Result<Option<FileStamp>> {
        Ok(self.lock().files.get(path).map(|(text, modified)| FileStamp {
            modified: *modified,
            len: text.len() as u64,
        }))
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        let mut state = self.lock();
        if state.fail_reads {
            return Err(denied());
        }
        let text = state
            .files
            .get(path)
            .map(|(text, _)| text.clone())
            .ok_or_else(|| io::Error::from(ErrorKind::NotFound))?;
        state.reads += 1;
        Ok(text)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(denied());
        }
        let now = state.tick();
        state
            .files
            .insert(path.to_path_buf(), (contents.to_string(), now));
        state.writes += 1;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if state.fail_create {
            return Err(denied());
        }
        state.dirs.extend(path.ancestors().map(Path::to_path_buf));
        Ok(())
    }

    fn create_empty(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if state.fail_create {
            return Err(denied());
        }
        if !state.files.contains_key(path) {
            let now = state.tick();
            state.files.insert(path.to_path_buf(), (String::new(), now));
        }
        Ok(())
    }
}
