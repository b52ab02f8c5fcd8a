//! Session store operations: exists / create / load / save / with_lock

use crate::config::Config;
use crate::store::error::StoreError;
use crate::store::lock;
use crate::store::record::SessionRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const RECORD_EXT: &str = "json";

/// File-backed mapping from session id to [`SessionRecord`].
///
/// The directory and lock retry budget come from an explicit [`Config`];
/// the store holds no other state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
    lock_retries: u32,
}

impl SessionStore {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.session_dir.clone(),
            lock_retries: config.lock_retries,
        }
    }

    /// Directory holding one record file per session id.
    pub fn session_dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a record for `id` exists.
    ///
    /// Ids that could not name a record file simply do not exist.
    pub fn exists(&self, id: &str) -> bool {
        validate_id(id).is_ok() && self.record_path(id).exists()
    }

    /// Create the record for a brand-new session.
    ///
    /// The existence check and the first write happen inside the per-id
    /// lock, so two invocations minting the same id cannot both succeed.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] if a record for `id` is present; the
    /// caller treats this as an issuer collision and retries with a fresh
    /// id. Lock and I/O failures propagate as themselves.
    pub fn create(&self, id: &str) -> Result<SessionRecord, StoreError> {
        validate_id(id)?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        self.with_lock(id, |store| {
            if store.record_path(id).exists() {
                return Err(StoreError::AlreadyExists { id: id.to_string() });
            }
            let record = SessionRecord::fresh();
            store.save(id, &record)?;
            Ok(record)
        })
    }

    /// Load the record for `id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no record file exists;
    /// [`StoreError::Json`] if the file does not decode.
    pub fn load(&self, id: &str) -> Result<SessionRecord, StoreError> {
        validate_id(id)?;
        let path = self.record_path(id);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.to_string() });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&content).map_err(|source| StoreError::Json { path, source })
    }

    /// Persist `record` for `id` atomically.
    ///
    /// The document is staged to a sibling `.tmp` path, fsynced, and
    /// renamed over the record file, so a crash mid-write leaves either the
    /// old record or the new one, never a truncated hybrid.
    pub fn save(&self, id: &str, record: &SessionRecord) -> Result<(), StoreError> {
        validate_id(id)?;
        let path = self.record_path(id);
        let tmp_path = path.with_extension("tmp");

        let content = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Json {
            path: tmp_path.clone(),
            source,
        })?;

        {
            let mut tmp_file = fs::File::create(&tmp_path).map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
            tmp_file.write_all(&content).map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
            tmp_file.sync_all().map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        }

        fs::rename(&tmp_path, &path).map_err(|source| StoreError::Io { path, source })
    }

    /// Run `f` under the exclusive per-id lock.
    ///
    /// The lock lives on a sibling `<id>.lock` file and is held from before
    /// any `load` in `f` until after its `save` returns; it releases on
    /// every exit path, including when `f` fails. Acquisition waits a
    /// bounded amount and then fails with [`StoreError::LockTimeout`].
    pub fn with_lock<T>(
        &self,
        id: &str,
        f: impl FnOnce(&Self) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        validate_id(id)?;
        let lock_path = self.record_path(id).with_extension("lock");
        let _guard = lock::acquire(&lock_path, self.lock_retries)?;
        f(self)
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXT}"))
    }
}

/// Reject ids that cannot safely name a file in the session directory.
///
/// Minted ids are hyphenated hex, so anything outside ASCII alphanumerics
/// and `-` came from a tampered cookie and must never touch the
/// filesystem.
fn validate_id(id: &str) -> Result<(), StoreError> {
    let well_formed = !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(StoreError::InvalidId { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> SessionStore {
        let config = Config {
            session_dir: temp_dir.path().join("sessions"),
            lock_retries: 5,
        };
        SessionStore::new(&config)
    }

    #[test]
    fn test_exists_false_then_true_around_create() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(!store.exists("id-1"));
        let record = store.create("id-1").unwrap();
        assert_eq!(record.visits, 1);
        assert!(store.exists("id-1"));
    }

    #[test]
    fn test_create_twice_is_already_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.create("id-1").unwrap();
        let result = store.create("id-1");
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let mut record = store.create("id-1").unwrap();
        record.touch();
        record
            .unknown_fields
            .insert("theme".to_string(), serde_json::json!("dark"));
        store.save("id-1", &record).unwrap();

        let loaded = store.load("id-1").unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let result = store.load("nope");
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_load_garbage_is_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.create("id-1").unwrap();
        fs::write(store.session_dir().join("id-1.json"), b"{trunc").unwrap();

        let result = store.load("id-1");
        assert!(matches!(result, Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_save_leaves_no_tmp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.create("id-1").unwrap();
        assert!(!store.session_dir().join("id-1.tmp").exists());
    }

    #[test]
    fn test_traversal_id_never_touches_filesystem() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(!store.exists("../escape"));
        assert!(matches!(
            store.load("../escape"),
            Err(StoreError::InvalidId { .. })
        ));
        assert!(matches!(
            store.create("a/b"),
            Err(StoreError::InvalidId { .. })
        ));
        assert!(matches!(
            store.load(""),
            Err(StoreError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_with_lock_releases_on_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        store.create("id-1").unwrap();

        let failed: Result<(), StoreError> = store.with_lock("id-1", |_| {
            Err(StoreError::NotFound {
                id: "id-1".to_string(),
            })
        });
        assert!(failed.is_err());

        // Lock must have been released despite the error
        store
            .with_lock("id-1", |store| {
                let record = store.load("id-1")?;
                assert_eq!(record.visits, 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_concurrent_increments_lose_no_updates() {
        const WRITERS: usize = 8;

        let temp_dir = TempDir::new().unwrap();
        // All writers release the barrier together, so their backoff
        // schedules coincide; a deeper retry budget than the default keeps
        // the last writer inside its bounded wait.
        let store = Arc::new(SessionStore::new(&Config {
            session_dir: temp_dir.path().join("sessions"),
            lock_retries: 10,
        }));
        store.create("shared").unwrap();

        let barrier = Arc::new(Barrier::new(WRITERS));
        let mut handles = Vec::new();
        for _ in 0..WRITERS {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                store
                    .with_lock("shared", |store| {
                        let mut record = store.load("shared")?;
                        record.touch();
                        store.save("shared", &record)?;
                        Ok(())
                    })
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let final_record = store.load("shared").unwrap();
        assert_eq!(final_record.visits, 1 + WRITERS as u64);
    }
}
