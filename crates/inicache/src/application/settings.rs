//! The configuration store: a cached, lock-protected view of one INI file.
//!
//! # Lifecycle of the cache
//!
//! ```text
//! get_value / set_value
//!  └─ lock
//!  └─ stamp the backing file
//!       ├─ missing  → get: return default   set: create dirs + empty file
//!       ├─ changed  → read + parse, replace the table
//!       └─ same     → use the cached table
//!  └─ look up / insert + serialize + write the whole file
//!  └─ unlock
//! ```
//!
//! Every public operation holds the instance lock for its whole duration,
//! file I/O included, so read-modify-write is atomic with respect to other
//! threads.  The lock does nothing for other processes: an external edit
//! that lands between a reload and the following write is overwritten.
//!
//! The in-memory table is only replaced after a complete successful parse or
//! write; a failing operation leaves the previous table in place.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use inicache_core::{
    decode_value, format_key, is_combined_key, parse_ini, serialize_ini, FromIni, IniTable,
    KeyArg, Value,
};
use tracing::{debug, error, info, warn};

use crate::error::{IoOp, SettingsError};
use crate::infrastructure::storage::{BackingStore, FileStamp, FsBackingStore};

#[derive(Default)]
struct CacheState {
    table: IniTable,
    last_stamp: Option<FileStamp>,
    /// Set when the registry discarded this instance; operations then go to
    /// the registered successor.
    retired: bool,
}

/// Thread-safe typed key/value access to one INI file.
///
/// Use [`Settings::instance`] to get the process-wide instance for a path.
/// [`Settings::with_store`] builds a detached instance over any
/// [`BackingStore`], which is how the unit tests run without a filesystem.
pub struct Settings {
    path: PathBuf,
    store: Box<dyn BackingStore>,
    state: Mutex<CacheState>,
}

impl Settings {
    /// Creates a detached instance bound to `path` on the local filesystem.
    ///
    /// Prefer [`Settings::instance`]; two detached instances for the same
    /// path do not coordinate with each other.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_store(path, FsBackingStore)
    }

    /// Creates a detached instance bound to `path` on the given store.
    pub fn with_store(path: impl Into<PathBuf>, store: impl BackingStore + 'static) -> Self {
        Self {
            path: path.into(),
            store: Box::new(store),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Returns the backing file path this instance is bound to.
    pub fn full_path(&self) -> &Path {
        &self.path
    }

    /// Returns the value for `key`, or `default` if the file or key is absent
    /// or the stored value is empty.
    ///
    /// Absent keys are not added to the table.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Io`] if the file exists but cannot be inspected or
    ///   read.
    /// - [`SettingsError::Conversion`] if the stored text is not valid for `T`.
    pub fn get_value<T: FromIni>(&self, key: &str, default: T) -> Result<T, SettingsError> {
        let mut state = match self.lock_live() {
            Ok(state) => state,
            Err(successor) => return successor.get_value(key, default),
        };
        let Some(stamp) = self.current_stamp()? else {
            return Ok(default);
        };
        self.refresh(&mut state, stamp)?;

        if !is_combined_key(key) {
            return Ok(default);
        }
        match state.table.get(key) {
            Some(raw) => Ok(decode_value(raw, default)?),
            None => Ok(default),
        }
    }

    /// [`Settings::get_value`] with the type's zero value as the default:
    /// `""`, `0`, `0.0` or `false`.
    pub fn get<T: FromIni + Default>(&self, key: &str) -> Result<T, SettingsError> {
        self.get_value(key, T::default())
    }

    /// [`Settings::get_value`] with the key built from a printf-style
    /// template.
    ///
    /// ```no_run
    /// use inicache::{KeyArg, Settings};
    ///
    /// # fn main() -> Result<(), inicache::SettingsError> {
    /// let settings = Settings::instance("/tmp/app.ini");
    /// let name: String =
    ///     settings.get_value_fmt(String::new(), "clients.item%d.name", &[KeyArg::from(3)])?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Settings::get_value`], plus [`SettingsError::KeyFormat`] when
    /// the template and arguments do not match.
    pub fn get_value_fmt<T: FromIni>(
        &self,
        default: T,
        template: &str,
        args: &[KeyArg],
    ) -> Result<T, SettingsError> {
        let key = format_key(template, args)?;
        self.get_value(&key, default)
    }

    /// Stores `value` under `key` and rewrites the whole backing file.
    ///
    /// The file and its parent directories are created if missing.  If the
    /// file changed since it was last seen, it is reloaded first so external
    /// edits are kept.  A key without a section is accepted but never
    /// written to the file.
    ///
    /// Values are written verbatim: newlines are not escaped, and leading or
    /// trailing whitespace survives only until the file is next reloaded,
    /// because the parser trims values.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::CreateDir`] / [`SettingsError::CreateFile`] if the
    ///   missing file cannot be created.
    /// - [`SettingsError::Io`] if the file cannot be read, written, or
    ///   inspected.  The in-memory table is left unchanged.
    pub fn set_value(&self, key: &str, value: impl Into<Value>) -> Result<(), SettingsError> {
        let value = value.into();
        let mut state = match self.lock_live() {
            Ok(state) => state,
            Err(successor) => return successor.set_value(key, value),
        };
        debug!("setting {key} ({})", value.kind());
        let encoded = value.encode();

        let stamp = match self.current_stamp()? {
            Some(stamp) => stamp,
            None => {
                self.create_backing_file()?;
                // The new file is empty; anything cached belongs to a deleted file.
                state.last_stamp = None;
                self.current_stamp()?.ok_or_else(|| SettingsError::Io {
                    path: self.path.clone(),
                    op: IoOp::Stat,
                    source: io::Error::new(
                        io::ErrorKind::NotFound,
                        "file disappeared right after creation",
                    ),
                })?
            }
        };
        self.refresh(&mut state, stamp)?;

        if !is_combined_key(key) {
            warn!(
                "key {key:?} has no section and will not be written to {}",
                self.path.display()
            );
        }

        let mut table = state.table.clone();
        table.insert(key.to_string(), encoded);
        let text = serialize_ini(&table);
        self.store
            .write(&self.path, &text)
            .map_err(|source| self.io_error(IoOp::Write, source))?;
        state.table = table;

        // Forget the stamp first so a failing stat forces a reload next time.
        state.last_stamp = None;
        state.last_stamp = self.current_stamp()?;
        debug!("wrote {} bytes to {}", text.len(), self.path.display());
        Ok(())
    }

    /// Returns a copy of the current table, reloading it first if the file
    /// changed.  Returns an empty table if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be inspected or read.
    pub fn snapshot(&self) -> Result<IniTable, SettingsError> {
        let mut state = match self.lock_live() {
            Ok(state) => state,
            Err(successor) => return successor.snapshot(),
        };
        let Some(stamp) = self.current_stamp()? else {
            return Ok(IniTable::new());
        };
        self.refresh(&mut state, stamp)?;
        Ok(state.table.clone())
    }

    /// Returns the stamp of the file version the cache was last synchronised
    /// with, or `None` if nothing has been loaded or written yet.
    pub fn last_stamp(&self) -> Option<FileStamp> {
        match self.lock_live() {
            Ok(state) => state.last_stamp,
            Err(successor) => successor.last_stamp(),
        }
    }

    /// Prints the raw lines of the backing file to stdout.
    ///
    /// This is a diagnostic aid: failures are logged, not returned.
    pub fn dump_file(&self) {
        let stdout = io::stdout();
        if let Err(e) = self.dump_file_to(&mut stdout.lock()) {
            error!("failed to dump {}: {e}", self.path.display());
        }
    }

    /// Writes the raw lines of the backing file to `out`.
    ///
    /// Does not touch the cached table.
    ///
    /// # Errors
    ///
    /// Returns any error from reading the file or writing to `out`.
    pub fn dump_file_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let text = self.store.read(&self.path)?;
        for line in text.lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // The table is only swapped after complete operations, so a panic in
        // another thread cannot leave it half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the cache of a live instance.  A retired instance releases its
    /// lock and hands back the instance now registered for its path.
    fn lock_live(&self) -> Result<MutexGuard<'_, CacheState>, Arc<Settings>> {
        let state = self.lock();
        if !state.retired {
            return Ok(state);
        }
        drop(state);
        Err(Settings::instance(&self.path))
    }

    /// Marks this instance as discarded.  Waits for any operation in
    /// progress to finish.
    pub(crate) fn retire(&self) {
        self.lock().retired = true;
    }

    fn current_stamp(&self) -> Result<Option<FileStamp>, SettingsError> {
        self.store
            .stamp(&self.path)
            .map_err(|source| self.io_error(IoOp::Stat, source))
    }

    /// Reloads the table if `stamp` differs from the last observed one.
    fn refresh(&self, state: &mut CacheState, stamp: FileStamp) -> Result<(), SettingsError> {
        if state.last_stamp == Some(stamp) {
            return Ok(());
        }
        let text = self
            .store
            .read(&self.path)
            .map_err(|source| self.io_error(IoOp::Read, source))?;
        state.table = parse_ini(&text);
        state.last_stamp = Some(stamp);
        debug!(
            "reloaded {} ({} entries)",
            self.path.display(),
            state.table.len()
        );
        Ok(())
    }

    fn create_backing_file(&self) -> Result<(), SettingsError> {
        info!("{} doesn't exist, creating it", self.path.display());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !self.store.exists(parent) {
                info!("creating directory {}", parent.display());
                self.store
                    .create_dir_all(parent)
                    .map_err(|source| SettingsError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }
        self.store
            .create_empty(&self.path)
            .map_err(|source| SettingsError::CreateFile {
                path: self.path.clone(),
                source,
            })
    }

    fn io_error(&self, op: IoOp, source: io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            op,
            source,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Lists the cached entries, one `*<key> = <value>` line each.
impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.lock_live() {
            Ok(state) => state,
            Err(successor) => return fmt::Display::fmt(&*successor, f),
        };
        for (key, value) in &state.table {
            writeln!(f, "*{key} = {value}")?;
        }
        Ok(())
    }
}
