use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::chat::ChatHistory;
use crate::error::StorageError;
use crate::models::{Category, Task};
use crate::theme::Theme;

const TASKS_FILE: &str = "tasks.json";
const CATEGORIES_FILE: &str = "categories.json";
const CHAT_FILE: &str = "chat.json";
const SETTINGS_FILE: &str = "settings.json";

/// User preferences persisted between runs.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
}

/// JSON file store rooted at the data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Storage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Reads and decodes a data file.
    ///
    /// A missing file yields `T::default()`.
    fn load<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T, StorageError> {
        let path = self.path(file);
        let mut f = match OpenOptions::new().read(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        let mut s = String::new();
        if let Err(source) = f.read_to_string(&mut s) {
            return Err(StorageError::Io { path, source });
        }
        serde_json::from_str(&s).map_err(|source| StorageError::Json { path, source })
    }

    /// Encodes and writes a data file, overwriting it.
    fn save<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path(file);
        let s = serde_json::to_string_pretty(value).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| StorageError::Io { path: path.clone(), source })?;
        f.write_all(s.as_bytes()).map_err(|source| StorageError::Io { path, source })
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>, StorageError> {
        self.load(TASKS_FILE)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.save(TASKS_FILE, tasks)
    }

    pub fn load_categories(&self) -> Result<Vec<Category>, StorageError> {
        self.load(CATEGORIES_FILE)
    }

    pub fn save_categories(&self, categories: &[Category]) -> Result<(), StorageError> {
        self.save(CATEGORIES_FILE, categories)
    }

    pub fn load_chat(&self) -> Result<ChatHistory, StorageError> {
        self.load(CHAT_FILE)
    }

    pub fn save_chat(&self, history: &ChatHistory) -> Result<(), StorageError> {
        self.save(CHAT_FILE, history)
    }

    pub fn load_settings(&self) -> Result<Settings, StorageError> {
        self.load(SETTINGS_FILE)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.save(SETTINGS_FILE, settings)
    }

    /// Deletes every data file. Missing files are ignored.
    pub fn delete_all(&self) -> Result<(), StorageError> {
        for file in [TASKS_FILE, CATEGORIES_FILE, CHAT_FILE, SETTINGS_FILE] {
            let path = self.path(file);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(StorageError::Io { path, source }),
            }
        }
        Ok(())
    }
}
