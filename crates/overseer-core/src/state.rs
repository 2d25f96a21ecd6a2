//! Path-addressable persistent state.
//!
//! Values live in one JSON document and are addressed by `.`-delimited
//! paths such as `research.reliability`. A missing path reads as `None`;
//! reading never fails. The document is written to a [`Storage`] backend
//! on [`PersistentState::save`].

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Errors from reading or writing durable storage.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable backing for a state document.
pub trait Storage {
    /// The stored document, or `None` if nothing has been saved yet.
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&mut self, data: &str) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
}

/// In-memory storage. Clones share the same slot, so a test can hand one
/// clone to an engine and inspect or reuse the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `data`.
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(data.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "storage lock poisoned"))
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        *self.lock()? = Some(data.to_string());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Storage in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Storage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        fs::write(&self.path, data)
    }

    fn clear(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

pub struct PersistentState {
    root: Value,
    storage: Box<dyn Storage>,
}

impl PersistentState {
    /// Empty state over `storage`. Call [`load`](Self::load) to read it.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            root: Value::Object(Map::new()),
            storage,
        }
    }

    /// State with nothing behind it; `save` goes nowhere observable.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Reads the stored document.
    ///
    /// Missing and corrupt data both load as an empty document; only an
    /// I/O failure is an error.
    pub fn load(&mut self) -> Result<(), StateError> {
        let text = self.storage.read()?;
        self.root = match text {
            None => Value::Object(Map::new()),
            Some(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value @ Value::Object(_)) => value,
                Ok(_) => {
                    log::warn!("saved state is not an object, starting fresh");
                    Value::Object(Map::new())
                }
                Err(e) => {
                    log::warn!("saved state is corrupt ({e}), starting fresh");
                    Value::Object(Map::new())
                }
            },
        };
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), StateError> {
        let text = serde_json::to_string(&self.root)?;
        self.storage.write(&text)?;
        Ok(())
    }

    /// Clears both the in-memory document and durable storage.
    pub fn reset(&mut self) -> Result<(), StateError> {
        self.root = Value::Object(Map::new());
        self.storage.clear()?;
        Ok(())
    }

    pub fn get_value(&self, path: &str) -> Option<&Value> {
        let mut node = &self.root;
        for key in path.split('.') {
            node = node.as_object()?.get(key)?;
        }
        if node.is_null() {
            None
        } else {
            Some(node)
        }
    }

    /// Typed read. A value of the wrong shape reads as `None`.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let value = self.get_value(path)?;
        match T::deserialize(value) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("ignoring malformed value at '{path}': {e}");
                None
            }
        }
    }

    /// Writes `value` at `path`, creating intermediate objects as needed.
    /// A non-object intermediate is replaced.
    pub fn set_value(&mut self, path: &str, value: Value) {
        let mut keys = path.split('.').peekable();
        let mut node = &mut self.root;
        while let Some(key) = keys.next() {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                return;
            };
            if keys.peek().is_none() {
                map.insert(key.to_string(), value);
                return;
            }
            node = map
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    /// Serializes `value` and writes it at `path`.
    pub fn set<T: Serialize + ?Sized>(&mut self, path: &str, value: &T) -> Result<(), StateError> {
        let value = serde_json::to_value(value)?;
        self.set_value(path, value);
        Ok(())
    }

    /// Removes the value at `path`, returning it.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let (parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (Some(parent), key),
            None => (None, path),
        };
        let node = match parent {
            Some(parent) => {
                let mut node = &mut self.root;
                for k in parent.split('.') {
                    node = node.as_object_mut()?.get_mut(k)?;
                }
                node
            }
            None => &mut self.root,
        };
        node.as_object_mut()?.remove(key)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl std::fmt::Debug for PersistentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentState")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_paths_read_none() {
        let state = PersistentState::in_memory();
        assert!(state.get_value("research.reliability").is_none());
        assert!(state.get::<f64>("a.b.c").is_none());
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut state = PersistentState::in_memory();
        state.set_value("stats.tasks.completed", json!(4));
        assert_eq!(state.get::<u32>("stats.tasks.completed"), Some(4));
        assert!(state.get_value("stats.tasks").unwrap().is_object());
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut state = PersistentState::in_memory();
        state.set_value("cores", json!(3));
        state.set_value("cores.count", json!([1, 2]));
        assert_eq!(state.get::<Vec<u32>>("cores.count"), Some(vec![1, 2]));
    }

    #[test]
    fn test_wrong_type_reads_none() {
        let mut state = PersistentState::in_memory();
        state.set_value("version", json!({"nested": true}));
        assert!(state.get::<String>("version").is_none());
    }

    #[test]
    fn test_remove() {
        let mut state = PersistentState::in_memory();
        state.set_value("settings.main-color", json!("#ffffff"));
        assert_eq!(state.remove("settings.main-color"), Some(json!("#ffffff")));
        assert!(state.get_value("settings.main-color").is_none());
        assert!(state.remove("settings.nope").is_none());
        assert!(state.remove("missing.path").is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let storage = MemoryStorage::new();
        let mut state = PersistentState::new(Box::new(storage.clone()));
        state.set_value("paused", json!(true));
        state.save().unwrap();

        let mut reloaded = PersistentState::new(Box::new(storage));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get::<bool>("paused"), Some(true));
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let mut state = PersistentState::new(Box::new(MemoryStorage::with_data("{not json")));
        state.load().unwrap();
        assert_eq!(state.root(), &json!({}));
    }

    #[test]
    fn test_reset_clears_storage() {
        let storage = MemoryStorage::new();
        let mut state = PersistentState::new(Box::new(storage.clone()));
        state.set_value("version", json!("1.0.0"));
        state.save().unwrap();
        state.reset().unwrap();
        assert!(storage.contents().is_none());
        assert!(state.get_value("version").is_none());
    }

    #[test]
    fn test_file_storage_missing_file_is_none() {
        let path = std::env::temp_dir().join(format!("overseer-state-{}.json", std::process::id()));
        let mut storage = FileStorage::new(&path);
        assert!(storage.read().unwrap().is_none());
        storage.write("{}").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("{}"));
        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(storage.read().unwrap().is_none());
    }
}
