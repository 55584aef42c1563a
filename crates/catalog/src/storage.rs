//! Key/value storage backends. Each profile keeps its records under keys
//! prefixed by its storage prefix.
use std::{collections::HashMap, fs, io};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("error accessing {}: {}", .0, .1)]
    IOError(Utf8PathBuf, #[source] io::Error),

    #[error("invalid storage key: {:?}", .0)]
    InvalidKey(String),

    #[error("storage is read-only")]
    ReadOnly,
}

/// A simple string key/value store.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&mut self, key: &str) -> Result<(), Error>;
}

/// Stores each key in its own file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: Utf8PathBuf,
}

impl FileStorage {
    /// Use the given directory, creating it if needed.
    pub fn open(root: impl Into<Utf8PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::IOError(root.clone(), e))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<Utf8PathBuf, Error> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(Error::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::IOError(path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        // write next to the target then rename, so a failed write doesn't clobber the old value
        let tmp = self.root.join(format!(".{}.tmp", key));
        fs::write(&tmp, value).map_err(|e| Error::IOError(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| Error::IOError(path.clone(), e))?;
        debug!("wrote {} bytes to {}", value.len(), path);

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::IOError(path, e)),
        }
    }
}

/// In-memory storage, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds the given entries
    pub fn with_entries<K: Into<String>, V: Into<String>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            read_only: false,
        }
    }

    /// Make every following write fail, like a browser over its quota.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        if self.read_only {
            return Err(Error::ReadOnly);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        if self.read_only {
            return Err(Error::ReadOnly);
        }
        self.entries.remove(key);
        Ok(())
    }
}
