//! File-per-user JSON endings store.
//!
//! Layout: `<dir>/<user>.json`, each file a JSON array of ending keys:
//!
//! ```json
//! ["end1", "left"]
//! ```
//!
//! Writes go to a temp file that is then renamed over the target, so a crash
//! mid-write never leaves a truncated record. Read-modify-write for one user is
//! serialized by a per-user async mutex.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use questline_domain::{NodeKey, UserId};
use tokio::fs;
use tokio::sync::Mutex;

use crate::infrastructure::ports::{EndingsRepo, PersistenceError};

/// Outcome of reading one user's file.
enum StoredSet {
    Missing,
    Present(BTreeSet<NodeKey>),
    Corrupt(String),
}

pub struct JsonFileEndingsRepo {
    dir: PathBuf,
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl JsonFileEndingsRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: DashMap::new(),
        }
    }

    /// Path of a user's record.
    pub fn path_for(&self, user: &UserId) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(user)))
    }

    fn lock_for(&self, user: &UserId) -> Arc<Mutex<()>> {
        self.locks.entry(user.clone()).or_default().value().clone()
    }

    async fn read(&self, user: &UserId) -> Result<StoredSet, PersistenceError> {
        let path = self.path_for(user);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoredSet::Missing),
            Err(e) => return Err(PersistenceError::io("read_endings", e)),
        };

        let raw: Vec<String> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => return Ok(StoredSet::Corrupt(e.to_string())),
        };

        let mut set = BTreeSet::new();
        for entry in raw {
            match NodeKey::new(entry.as_str()) {
                Ok(key) => {
                    set.insert(key);
                }
                Err(_) => {
                    tracing::warn!(user_id = %user, path = %path.display(), "Skipping empty ending key");
                }
            }
        }
        Ok(StoredSet::Present(set))
    }

    async fn write(&self, user: &UserId, set: &BTreeSet<NodeKey>) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::io("create_endings_dir", e))?;

        let keys: Vec<&str> = set.iter().map(NodeKey::as_str).collect();
        let content = serde_json::to_string_pretty(&keys)
            .map_err(PersistenceError::serialization)?;

        let path = self.path_for(user);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| PersistenceError::io("write_endings", e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| PersistenceError::io("rename_endings", e))?;
        Ok(())
    }

    async fn add_locked(&self, user: &UserId, key: &NodeKey) -> Result<bool, PersistenceError> {
        let mut set = match self.read(user).await? {
            StoredSet::Missing => BTreeSet::new(),
            StoredSet::Present(set) => set,
            // Never overwrite what we cannot read
            StoredSet::Corrupt(message) => return Err(PersistenceError::corrupt(user, message)),
        };

        if !set.insert(key.clone()) {
            return Ok(false);
        }

        self.write(user, &set).await?;
        tracing::debug!(user_id = %user, ending = %key, total = set.len(), "Ending persisted");
        Ok(true)
    }
}

#[async_trait]
impl EndingsRepo for JsonFileEndingsRepo {
    async fn get_set(&self, user: &UserId) -> Result<BTreeSet<NodeKey>, PersistenceError> {
        match self.read(user).await? {
            StoredSet::Missing => Ok(BTreeSet::new()),
            StoredSet::Present(set) => Ok(set),
            StoredSet::Corrupt(message) => {
                tracing::warn!(
                    user_id = %user,
                    path = %self.path_for(user).display(),
                    error = %message,
                    "Unreadable endings file, treating as empty"
                );
                Ok(BTreeSet::new())
            }
        }
    }

    async fn add_to_set(&self, user: &UserId, key: &NodeKey) -> Result<bool, PersistenceError> {
        let lock = self.lock_for(user);
        let result = {
            let _guard = lock.lock().await;
            self.add_locked(user, key).await
        };
        drop(lock);

        // Forget the lock once no other writer holds or waits on it
        self.locks.remove_if(user, |_, lock| Arc::strong_count(lock) == 1);
        result
    }
}

/// File-name-safe, injective encoding of a user id.
///
/// ASCII alphanumerics and `-` pass through, so numeric chat ids keep their
/// plain `123456.json` names; every other byte becomes `_xx` (hex).
fn file_stem(user: &UserId) -> String {
    let mut stem = String::with_capacity(user.as_str().len());
    for byte in user.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("_{byte:02x}"));
        }
    }
    stem
}
