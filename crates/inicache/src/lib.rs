//! # inicache
//!
//! A small in-process key/value configuration store backed by an INI file.
//!
//! One [`Settings`] instance exists per backing file path.  It caches the
//! parsed file in memory, reloads it only when the file's modification stamp
//! changes, and rewrites the whole file after every successful
//! [`Settings::set_value`].  All access to one instance is serialised by a
//! single lock, so any number of threads may share it.
//!
//! ```no_run
//! use inicache::Settings;
//!
//! # fn main() -> Result<(), inicache::SettingsError> {
//! let settings = Settings::instance("/etc/myapp/settings.ini");
//! settings.set_value("network.port", 8080)?;
//! let port: i32 = settings.get_value("network.port", 80)?;
//! assert_eq!(port, 8080);
//! # Ok(())
//! # }
//! ```
//!
//! # Layers
//!
//! - **`application`** – the store itself and the per-path instance registry.
//! - **`infrastructure`** – the [`BackingStore`] seam over the filesystem,
//!   plus an in-memory mock for tests.
//!
//! The INI text format and typed value conversion live in `inicache-core`.

pub mod application;
pub mod error;
pub mod infrastructure;

pub use application::registry::normalize_path;
pub use application::settings::Settings;
pub use error::{IoOp, SettingsError};
pub use infrastructure::storage::{BackingStore, FileStamp, FsBackingStore};
pub use inicache_core::{FromIni, KeyArg, Value, ValueKind};
