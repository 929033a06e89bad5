use crate::domain::ports::KeyValueStore;
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Key under which the last chosen state code is persisted.
pub const SELECTION_KEY: &str = "usState";

/// Key-value store backed by a single JSON object file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, data).await?;
        tracing::debug!("Stored '{}' in {}", key, self.path.display());
        Ok(())
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_roundtrip_and_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested/selection.json"));

        assert_eq!(store.get(SELECTION_KEY).await.unwrap(), None);

        store.set(SELECTION_KEY, "CA").await.unwrap();
        store.set("other", "x").await.unwrap();
        store.set(SELECTION_KEY, "NY").await.unwrap();

        assert_eq!(store.get(SELECTION_KEY).await.unwrap().as_deref(), Some("NY"));
        assert_eq!(store.get("other").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("selection.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(FileStore::new(path).get(SELECTION_KEY).await.is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            store.set(SELECTION_KEY, "TX").await.unwrap();
            assert_eq!(store.get(SELECTION_KEY).await.unwrap().as_deref(), Some("TX"));
        });
    }
}
