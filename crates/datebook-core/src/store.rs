//! Persistence boundary: whole-collection load and save.
//!
//! [`ItemStore`] is all the engine needs. [`JsonFileStore`] keeps one calendar
//! as a pair of JSON files, and [`CalendarDirectory`] manages several named
//! calendars side by side in one directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DatebookError, Result};
use crate::model::{default_groups, Group, Occurrence};

/// Calendar used when nothing else has been created.
pub const DEFAULT_CALENDAR: &str = "Default";

const CALENDARS_META_FILE: &str = "calendars_meta.json";

/// Reads and writes a calendar's occurrences and groups, each as one unit.
pub trait ItemStore {
    fn load_items(&self) -> Result<Vec<Occurrence>>;
    fn save_items(&mut self, items: &[Occurrence]) -> Result<()>;

    /// Groups of the calendar. A calendar that never saved groups starts
    /// with [`default_groups`].
    fn load_groups(&self) -> Result<Vec<Group>>;
    fn save_groups(&mut self, groups: &[Group]) -> Result<()>;
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Vec<Occurrence>,
    groups: Option<Vec<Group>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(items: Vec<Occurrence>, groups: Vec<Group>) -> Self {
        Self {
            items,
            groups: Some(groups),
        }
    }

    pub fn items(&self) -> &[Occurrence] {
        &self.items
    }
}

impl ItemStore for MemoryStore {
    fn load_items(&self) -> Result<Vec<Occurrence>> {
        Ok(self.items.clone())
    }

    fn save_items(&mut self, items: &[Occurrence]) -> Result<()> {
        self.items = items.to_vec();
        Ok(())
    }

    fn load_groups(&self) -> Result<Vec<Group>> {
        Ok(self.groups.clone().unwrap_or_else(default_groups))
    }

    fn save_groups(&mut self, groups: &[Group]) -> Result<()> {
        self.groups = Some(groups.to_vec());
        Ok(())
    }
}

/// One calendar stored as `<name>_data.json` and `<name>_groups.json`, with
/// spaces in the name replaced by underscores.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_path: PathBuf,
    groups_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>, calendar: &str) -> Self {
        let (data_path, groups_path) = calendar_paths(dir.as_ref(), calendar);
        Self {
            data_path,
            groups_path,
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn groups_path(&self) -> &Path {
        &self.groups_path
    }
}

impl ItemStore for JsonFileStore {
    fn load_items(&self) -> Result<Vec<Occurrence>> {
        Ok(read_records(&self.data_path)?.unwrap_or_default())
    }

    fn save_items(&mut self, items: &[Occurrence]) -> Result<()> {
        write_json(&self.data_path, items)
    }

    fn load_groups(&self) -> Result<Vec<Group>> {
        Ok(read_records(&self.groups_path)?.unwrap_or_else(default_groups))
    }

    fn save_groups(&mut self, groups: &[Group]) -> Result<()> {
        write_json(&self.groups_path, groups)
    }
}

/// The set of named calendars kept in one directory.
#[derive(Debug, Clone)]
pub struct CalendarDirectory {
    dir: PathBuf,
}

impl CalendarDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Calendar names in creation order. Never empty.
    pub fn list(&self) -> Result<Vec<String>> {
        let path = self.dir.join(CALENDARS_META_FILE);
        let names: Vec<String> = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(DatebookError::io(path, e)),
        };
        if names.is_empty() {
            return Ok(vec![DEFAULT_CALENDAR.to_string()]);
        }
        Ok(names)
    }

    /// Register a new, empty calendar.
    ///
    /// # Errors
    /// Returns `DatebookError::Validation` for an empty or already used name.
    pub fn create(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatebookError::validation("calendar name required"));
        }
        let mut names = self.list()?;
        if names.iter().any(|n| n == name) {
            return Err(DatebookError::validation(format!(
                "calendar '{name}' already exists"
            )));
        }
        names.push(name.to_string());
        self.save_names(&names)?;
        tracing::info!(calendar = name, "created calendar");
        Ok(())
    }

    /// Remove a calendar and its data files.
    ///
    /// # Errors
    /// Returns `DatebookError::UnknownCalendar` for a name not in the list and
    /// `DatebookError::Validation` when it is the only calendar left.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut names = self.list()?;
        if !names.iter().any(|n| n == name) {
            return Err(DatebookError::UnknownCalendar(name.to_string()));
        }
        if names.len() <= 1 {
            return Err(DatebookError::validation("cannot delete the last calendar"));
        }
        names.retain(|n| n != name);
        self.save_names(&names)?;

        let (data_path, groups_path) = calendar_paths(&self.dir, name);
        for path in [data_path, groups_path] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(DatebookError::io(path, e)),
            }
        }
        tracing::info!(calendar = name, "deleted calendar");
        Ok(())
    }

    /// The store for `name`.
    ///
    /// # Errors
    /// Returns `DatebookError::UnknownCalendar` when `name` is not listed.
    pub fn open(&self, name: &str) -> Result<JsonFileStore> {
        if !self.list()?.iter().any(|n| n == name) {
            return Err(DatebookError::UnknownCalendar(name.to_string()));
        }
        Ok(JsonFileStore::new(&self.dir, name))
    }

    fn save_names(&self, names: &[String]) -> Result<()> {
        write_json(&self.dir.join(CALENDARS_META_FILE), names)
    }
}

/// Point occurrences that only carry a legacy group name at the group of that
/// name. Returns how many were resolved. A name with no matching group is kept
/// so it survives the next save.
pub fn resolve_legacy_groups(items: &mut [Occurrence], groups: &[Group]) -> usize {
    let mut resolved = 0;
    for item in items.iter_mut() {
        let Some(name) = item.legacy_group_name.as_deref() else {
            continue;
        };
        if !item.group_id.is_empty() {
            item.legacy_group_name = None;
            continue;
        }
        if let Some(group) = groups.iter().find(|g| g.name == name) {
            item.group_id = group.id.clone();
            item.legacy_group_name = None;
            resolved += 1;
        }
    }
    resolved
}

fn calendar_paths(dir: &Path, calendar: &str) -> (PathBuf, PathBuf) {
    let prefix = calendar.replace(' ', "_");
    (
        dir.join(format!("{prefix}_data.json")),
        dir.join(format!("{prefix}_groups.json")),
    )
}

/// Read a JSON array file record by record. `Ok(None)` when the file does not
/// exist. Records that fail to deserialize are skipped with a warning so one
/// bad entry cannot hide the rest.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(DatebookError::io(path, e)),
    };
    if text.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }

    let raw: Vec<serde_json::Value> = serde_json::from_str(&text)?;
    let mut records = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), index, error = %e, "skipping corrupt record");
            }
        }
    }
    Ok(Some(records))
}

/// Write `value` as pretty JSON via a temporary file and a rename.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DatebookError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| DatebookError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| DatebookError::io(path, e))?;
    Ok(())
}
