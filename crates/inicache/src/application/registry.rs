//! Process-wide registry of [`Settings`] instances, one per backing path.
//!
//! The registry is a map from normalised path to a shared instance, created
//! lazily behind a one-time initialised global.  The map's own lock is held
//! only for the lookup/insert, never while an instance does file I/O, so
//! instances bound to different paths never block each other.
//!
//! Lock order is registry first, then instance.  An instance never takes
//! the registry lock while holding its own.
//!
//! Paths are normalised lexically (made absolute against the current
//! directory, `.` and `..` resolved) but symlinks are not followed, because
//! the file may not exist yet.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::debug;

use super::settings::Settings;

type Registry = HashMap<PathBuf, Arc<Settings>>;

static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();

fn registry() -> MutexGuard<'static, Registry> {
    REGISTRY
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Returns the absolute, lexically normalised form of `path`.
///
/// If the current directory cannot be determined, relative paths are
/// normalised as they are.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

impl Settings {
    /// Returns the process-wide instance bound to `path`, creating it on
    /// first use.
    ///
    /// Concurrent first calls for the same path all receive the same
    /// instance.  Constructing an instance does no I/O; the file is loaded
    /// lazily by the first read or write.
    pub fn instance(path: impl AsRef<Path>) -> Arc<Settings> {
        let key = normalize_path(path.as_ref());
        let mut map = registry();
        let entry = map.entry(key).or_insert_with_key(|key| {
            debug!("creating settings instance for {}", key.display());
            Arc::new(Settings::new(key.clone()))
        });
        Arc::clone(entry)
    }

    /// Discards the registered instance for `path`.
    ///
    /// The next [`Settings::instance`] call builds a fresh instance with an
    /// empty cache.  Callers still holding the old `Arc` are redirected to
    /// that fresh instance, so one path never has two live caches.  Returns
    /// `true` if an instance was registered.
    pub fn destroy_instance(path: impl AsRef<Path>) -> bool {
        let key = normalize_path(path.as_ref());
        let mut map = registry();
        let Some(old) = map.remove(&key) else {
            return false;
        };
        // Retire under the registry lock so no successor can be created
        // while an operation on the old instance is still running.
        old.retire();
        drop(map);
        debug!("destroyed settings instance for {}", key.display());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use uuid::Uuid;

    fn unique_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "inicache_registry_{tag}_{}.ini",
            std::process::id()
        ))
    }

    #[test]
    fn test_same_path_yields_same_instance() {
        // Arrange
        let path = unique_path("same");

        // Act
        let a = Settings::instance(&path);
        let b = Settings::instance(&path);

        // Assert
        assert!(Arc::ptr_eq(&a, &b));
        Settings::destroy_instance(&path);
    }

    #[test]
    fn test_equivalent_spellings_share_instance() {
        let path = unique_path("spelling");
        let parent = path.parent().unwrap();
        let name = path.file_name().unwrap();
        let roundabout = parent.join(".").join("sub").join("..").join(name);

        let a = Settings::instance(&path);
        let b = Settings::instance(&roundabout);

        assert!(Arc::ptr_eq(&a, &b));
        Settings::destroy_instance(&path);
    }

    #[test]
    fn test_different_paths_yield_different_instances() {
        let p1 = unique_path("diff1");
        let p2 = unique_path("diff2");

        let a = Settings::instance(&p1);
        let b = Settings::instance(&p2);

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.full_path(), p1.as_path());
        assert_eq!(b.full_path(), p2.as_path());
        Settings::destroy_instance(&p1);
        Settings::destroy_instance(&p2);
    }

    #[test]
    fn test_destroy_instance_forces_fresh_instance() {
        // Arrange
        let path = unique_path("destroy");
        let before = Settings::instance(&path);

        // Act
        let removed = Settings::destroy_instance(&path);
        let after = Settings::instance(&path);

        // Assert
        assert!(removed);
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(Settings::destroy_instance(&path));
        assert!(!Settings::destroy_instance(&path), "second destroy is a no-op");
    }

    #[test]
    fn test_destroyed_handle_forwards_to_fresh_instance() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("inicache_registry_{}", Uuid::new_v4()));
        let path = dir.join("retired.ini");
        let old = Settings::instance(&path);
        old.set_value("a.k", 1).unwrap();

        // Act
        Settings::destroy_instance(&path);
        old.set_value("a.k", 2).unwrap();
        let fresh = Settings::instance(&path);

        // Assert – the write through the old handle went to the fresh cache
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert!(fresh.last_stamp().is_some());
        assert_eq!(old.last_stamp(), fresh.last_stamp());
        assert_eq!(fresh.get_value("a.k", 0).unwrap(), 2);
        assert_eq!(old.get_value("a.k", 0).unwrap(), 2);

        Settings::destroy_instance(&path);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_concurrent_first_access_creates_one_instance() {
        // Arrange
        let path = unique_path("race");
        let thread_count = 16;

        // Act
        let handles: Vec<_> = (0..thread_count)
            .map(|_| {
                let p = path.clone();
                thread::spawn(move || Settings::instance(&p))
            })
            .collect();
        let instances: Vec<Arc<Settings>> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();

        // Assert
        for instance in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], instance));
        }
        Settings::destroy_instance(&path);
    }

    #[test]
    fn test_normalize_path_resolves_dots() {
        assert_eq!(
            normalize_path(Path::new("/etc/./cfg/../app.ini")),
            PathBuf::from("/etc/app.ini")
        );
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_normalize_path_makes_relative_absolute() {
        let normalized = normalize_path(Path::new("conf/app.ini"));
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("conf/app.ini"));
    }
}
