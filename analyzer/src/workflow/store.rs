use creatorcore::analytics::{KeyValueStore, MemoryStore, StoreError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value pairs persisted as one JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|err| {
            StoreError::Unavailable(format!("reading {}: {}", self.path.display(), err))
        })?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                StoreError::Unavailable(format!("creating {}: {}", parent.display(), err))
            })?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents).map_err(|err| {
            StoreError::Unavailable(format!("writing {}: {}", self.path.display(), err))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Backing chosen from the workflow config.
pub enum HistoryStore {
    File(FileStore),
    Memory(MemoryStore),
}

impl HistoryStore {
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => HistoryStore::File(FileStore::new(path)),
            None => HistoryStore::Memory(MemoryStore::new()),
        }
    }
}

impl KeyValueStore for HistoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            HistoryStore::File(store) => store.get(key),
            HistoryStore::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        match self {
            HistoryStore::File(store) => store.set(key, value),
            HistoryStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match self {
            HistoryStore::File(store) => store.remove(key),
            HistoryStore::Memory(store) => store.remove(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let mut store = FileStore::new(&path);
        store.set("answers", "[1,2]".into()).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("answers").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(reopened.get("missing").unwrap(), None);
    }

    #[test]
    fn removing_a_key_rewrites_the_file() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("store.json"));
        store.set("a", "1".into()).unwrap();
        store.set("b", "2".into()).unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn history_store_defaults_to_memory() {
        let mut store = HistoryStore::from_path(None);
        assert!(matches!(store, HistoryStore::Memory(_)));
        store.set("k", "v".into()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
