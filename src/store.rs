use std::{
    fs::File,
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

/// Store key for the todo collection.
pub const TODOS_KEY: &str = "todos";
/// Store key for the contact message history.
pub const MESSAGES_KEY: &str = "contactMessages";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("read key {key:?}: {source}")]
    Read {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("write key {key:?}: {source}")]
    Write {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Key-value store over a local directory, one file per key. Each key holds
/// one whole bincode-serialized collection; every mutation goes through a
/// full load, mutate in memory, save cycle. Last writer wins across
/// processes.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory used when none is given: `.lazydesk` under the user's
    /// home directory, or under the current working directory when no home
    /// is set.
    pub fn open_default() -> Self {
        let root = match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".lazydesk"),
            None => PathBuf::from(".lazydesk"),
        };
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads the collection stored under `key`. A missing key is an empty
    /// collection; an unreadable or undecodable value is logged and also
    /// treated as empty. Never fails from the caller's point of view.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.try_load(key) {
            Ok(items) => items,
            Err(err) => {
                warn!(%err, "falling back to empty collection");
                Vec::new()
            }
        }
    }

    /// Replaces the collection stored under `key` in a single write. A
    /// failed write is logged and dropped; callers keep their in-memory
    /// state either way.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) {
        if let Err(err) = self.try_save(key, items) {
            warn!(%err, "dropping failed write");
        }
    }

    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let mut file = match File::open(self.root.join(key)) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::read(key, err)),
        };
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|err| StoreError::read(key, err))?;
        bincode::deserialize(&buffer).map_err(|err| StoreError::read(key, err))
    }

    fn try_save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let encoded = bincode::serialize(items).map_err(|err| StoreError::write(key, err))?;
        std::fs::create_dir_all(&self.root).map_err(|err| StoreError::write(key, err))?;
        let mut file =
            File::create(self.root.join(key)).map_err(|err| StoreError::write(key, err))?;
        file.write_all(&encoded)
            .map_err(|err| StoreError::write(key, err))
    }
}

impl StoreError {
    fn read(key: &str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Read {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    fn write(key: &str, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Write {
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Todo;

    fn temp_store(name: &str) -> LocalStore {
        let dir = std::env::temp_dir().join(format!(
            "lazydesk-store-{name}-{}-{}",
            std::process::id(),
            chrono::Local::now().timestamp_nanos_opt().unwrap_or_default(),
        ));
        LocalStore::new(dir)
    }

    #[test]
    fn default_root_lives_under_the_home_directory() {
        let store = LocalStore::open_default();
        assert!(store.root().ends_with(".lazydesk"));
        if let Some(home) = std::env::var_os("HOME") {
            assert!(store.root().starts_with(home));
        }
    }

    #[test]
    fn load_of_missing_key_is_empty() {
        let store = temp_store("missing");
        assert!(store.load::<Todo>(TODOS_KEY).is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = temp_store("round-trip");
        let todos = vec![Todo::new("water the plants"), Todo::new("buy milk")];
        store.save(TODOS_KEY, &todos);
        assert_eq!(store.load::<Todo>(TODOS_KEY), todos);
    }

    #[test]
    fn keys_are_independent() {
        let store = temp_store("independent");
        store.save(TODOS_KEY, &[Todo::new("only todos")]);
        assert!(store.load::<crate::entities::Message>(MESSAGES_KEY).is_empty());
    }

    #[test]
    fn malformed_value_loads_as_empty() {
        let store = temp_store("malformed");
        std::fs::create_dir_all(store.root()).unwrap();
        std::fs::write(store.root().join(TODOS_KEY), b"\xff\xff\xff").unwrap();
        assert!(store.load::<Todo>(TODOS_KEY).is_empty());
    }

    #[test]
    fn failed_write_is_dropped_silently() {
        let store = temp_store("unwritable");
        // Occupy the root path with a plain file so the directory cannot be
        // created and the write is rejected.
        std::fs::write(store.root(), b"in the way").unwrap();
        store.save(TODOS_KEY, &[Todo::new("never lands")]);
        assert!(store.load::<Todo>(TODOS_KEY).is_empty());
    }
}
