use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Durable key-value store for the credential. Reads are best effort, writes report failure.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> std::io::Result<()>;
    fn remove(&self, key: &str) -> std::io::Result<()>;
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs_err::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path(key);

        if !path.exists() {
            return None;
        }

        match fs_err::read_to_string(path) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        fs_err::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        let path = self.path(key);
        if path.exists() {
            fs_err::remove_file(path)?;
        }
        Ok(())
    }
}

/// Keeps everything in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.values().insert(key.into(), value.into());
        Ok(())
    }

    fn remove(&self, key: &str) -> std::io::Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session")).unwrap();

        assert_eq!(storage.get("token"), None);
        storage.set("token", "abc").unwrap();
        assert_eq!(storage.get("token").as_deref(), Some("abc"));
        assert!(storage.path("token").exists());

        storage.remove("token").unwrap();
        assert_eq!(storage.get("token"), None);
        // removing twice is fine
        storage.remove("token").unwrap();
    }

    #[test]
    fn memory_storage_overwrites() {
        let storage = MemoryStorage::new();
        storage.set("user", "a").unwrap();
        storage.set("user", "b").unwrap();
        assert_eq!(storage.get("user").as_deref(), Some("b"));
        storage.remove("user").unwrap();
        assert_eq!(storage.get("user"), None);
    }
}
