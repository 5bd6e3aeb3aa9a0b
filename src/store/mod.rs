//! Person record store backed by a single JSON file.
//!
//! The whole map is loaded once at startup and rewritten after every
//! successful mutation. A mutation whose save fails is rolled back, so the
//! in-memory map always equals the last state that reached disk.
//!
//! File layout (pretty-printed, non-ASCII kept as-is):
//! ```json
//! {
//!   "张伟": { "name": "张伟", "birth_time": { ... }, "location": { ... }, ... },
//!   "李娜": { ... }
//! }
//! ```

pub mod error;
pub mod record;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{info, warn};

pub use error::{Result, StoreError, ValidationError};
pub use record::{BirthTime, Location, NewPerson, Person, PersonUpdate};

use crate::matcher::{self, Romanizer, SearchHit};

/// Name-keyed person records plus the file they persist to.
#[derive(Debug)]
pub struct PersonStore {
    path: PathBuf,
    persons: IndexMap<String, Person>,
}

impl PersonStore {
    /// Open the store at `path`, loading whatever is there.
    ///
    /// Never fails: a missing or unreadable file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let persons = load(&path);
        info!(
            path = %path.display(),
            count = persons.len(),
            "Person store loaded"
        );
        Self { path, persons }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Write the full map to the backing file.
    pub fn save(&self) -> Result<()> {
        write_atomic(&self.path, &self.persons).map_err(|source| {
            warn!("[Store] Failed to save {}: {}", self.path.display(), source);
            StoreError::Persistence {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Validate and insert a new record.
    pub fn add(&mut self, new: NewPerson) -> Result<Person> {
        if new.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.persons.contains_key(&new.name) {
            return Err(ValidationError::AlreadyExists(new.name).into());
        }

        let person = new.into_person()?;
        let name = person.name.clone();
        self.persons.insert(name.clone(), person.clone());

        if let Err(e) = self.save() {
            self.persons.shift_remove(&name);
            warn!("[Store] Rolled back add of '{}'", name);
            return Err(e);
        }

        info!("[Store] Added '{}'", name);
        Ok(person)
    }

    pub fn get(&self, name: &str) -> Result<Person> {
        self.persons
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<Person> {
        self.persons.values().cloned().collect()
    }

    /// Apply a partial update to an existing record.
    pub fn update(&mut self, name: &str, update: &PersonUpdate) -> Result<Person> {
        let current = self
            .persons
            .get(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let updated = current.with_update(update)?;
        let previous = self
            .persons
            .insert(name.to_string(), updated.clone())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        if let Err(e) = self.save() {
            self.persons.insert(name.to_string(), previous);
            warn!("[Store] Rolled back update of '{}'", name);
            return Err(e);
        }

        info!("[Store] Updated '{}'", name);
        Ok(updated)
    }

    /// Remove a record, returning its last value.
    pub fn delete(&mut self, name: &str) -> Result<Person> {
        let index = self
            .persons
            .get_index_of(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let (key, removed) = self
            .persons
            .shift_remove_index(index)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        if let Err(e) = self.save() {
            // Put it back where it was so list order is unchanged too.
            self.persons.shift_insert(index, key, removed);
            warn!("[Store] Rolled back delete of '{}'", name);
            return Err(e);
        }

        info!("[Store] Deleted '{}'", name);
        Ok(removed)
    }

    /// Fuzzy name search over the current records.
    pub fn search(&self, query: &str, romanizer: &dyn Romanizer) -> Result<Vec<SearchHit>> {
        matcher::search(query, self.persons.values(), romanizer)
    }
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Read the backing file. Any failure is logged and treated as empty.
fn load(path: &Path) -> IndexMap<String, Person> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("[Store] Failed to read {}: {}", path.display(), e);
            }
            return IndexMap::new();
        }
    };

    let raw: IndexMap<String, Person> = match serde_json::from_str(&data) {
        Ok(map) => map,
        Err(e) => {
            warn!("[Store] Failed to parse {}: {}", path.display(), e);
            return IndexMap::new();
        }
    };

    raw.into_iter()
        .filter(|(key, person)| {
            if *key != person.name {
                warn!(
                    "[Store] Dropping record stored under '{}' but named '{}'",
                    key, person.name
                );
                return false;
            }
            match person.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("[Store] Dropping invalid record '{}': {}", key, e);
                    false
                }
            }
        })
        .collect()
}

/// Write via a temp file and rename so readers never see a partial file.
fn write_atomic(path: &Path, persons: &IndexMap<String, Person>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(persons)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path).inspect_err(|_| {
        if let Err(e) = std::fs::remove_file(&tmp) {
            warn!("[Store] Failed to remove {}: {}", tmp.display(), e);
        }
    })
}
