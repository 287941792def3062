//! Deep-merging JSON statistics document (C8).
//!
//! # Design
//!
//! Grounded in `stats.py`'s `Stats` class: an in-process staging object
//! (`self.Data`, here [`StatsDocument::data`]) accumulates updates via a
//! recursive dict-merge (`__update_deep`), and every [`StatsDocument::save`]
//! re-reads whatever is currently on disk and shallow-merges the staged
//! top-level keys on top of it before rewriting the file. This lets
//! multiple independent writers (or repeated invocations) contribute
//! different top-level sections to the same file without clobbering each
//! other, while a single writer's own nested updates (e.g. appending to
//! `roots`, refreshing `scanning.heartbeat`) merge deeply within its own
//! staged keys.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StatsError;

/// A JSON document backed by a file, with deep-merge update semantics.
#[derive(Debug, Clone)]
pub struct StatsDocument {
    path: PathBuf,
    data: Map<String, Value>,
}

impl StatsDocument {
    /// Opens a document bound to `path`. Nothing is read or written until
    /// the first update; the in-memory staging map starts empty.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: Map::new(),
        }
    }

    /// Returns the currently staged value for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Sets `key` to `value` outright (no merge) and persists.
    ///
    /// # Errors
    ///
    /// See [`StatsDocument::save`].
    pub fn overwrite(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<(), StatsError> {
        self.data.insert(key.into(), serde_json::to_value(value)?);
        self.save()
    }

    /// Deep-merges `update` into the document root and persists.
    ///
    /// # Errors
    ///
    /// See [`StatsDocument::save`].
    pub fn update(&mut self, update: impl Serialize) -> Result<(), StatsError> {
        let update = to_object(update)?;
        deep_merge(&mut self.data, &update);
        self.save()
    }

    /// Deep-merges `update` into the (created-if-absent) `section` object
    /// and persists.
    ///
    /// # Errors
    ///
    /// See [`StatsDocument::save`].
    pub fn update_section(&mut self, section: &str, update: impl Serialize) -> Result<(), StatsError> {
        let update = to_object(update)?;
        let entry = self.data.entry(section.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(section_map) = entry else {
            unreachable!("just normalized to an object")
        };
        deep_merge(section_map, &update);
        self.save()
    }

    /// Re-reads the on-disk document (treating a missing file as `{}`),
    /// shallow-merges the staged top-level keys on top, and rewrites it.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::Io`] if the file cannot be written, or
    /// [`StatsError::Json`] if an *existing* file's contents are not valid
    /// JSON.
    pub fn save(&self) -> Result<(), StatsError> {
        let mut on_disk = read_existing(&self.path)?;
        for (key, value) in &self.data {
            on_disk.insert(key.clone(), value.clone());
        }
        let rendered = serde_json::to_string_pretty(&Value::Object(on_disk))?;
        fs::write(&self.path, rendered)?;
        Ok(())
    }
}

fn read_existing(path: &Path) -> Result<Map<String, Value>, StatsError> {
    match fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(Map::new()),
        Ok(contents) => match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        },
        Err(_) => Ok(Map::new()),
    }
}

fn to_object(value: impl Serialize) -> Result<Map<String, Value>, StatsError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Ok(map)
        }
    }
}

fn deep_merge(data: &mut Map<String, Value>, update: &Map<String, Value>) {
    for (key, value) in update {
        match value {
            Value::Object(update_obj) => match data.get_mut(key) {
                Some(Value::Object(data_obj)) => deep_merge(data_obj, update_obj),
                _ => {
                    data.insert(key.clone(), Value::Object(update_obj.clone()));
                }
            },
            other => {
                data.insert(key.clone(), other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn update_deep_merges_nested_objects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let mut doc = StatsDocument::new(&path);
        doc.update(json!({"scanner": {"type": "xrootd"}})).unwrap();
        doc.update(json!({"scanner": {"version": "1.0"}})).unwrap();
        assert_eq!(doc.get("scanner").unwrap(), &json!({"type": "xrootd", "version": "1.0"}));
    }

    #[test]
    fn update_replaces_arrays_wholesale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let mut doc = StatsDocument::new(&path);
        doc.update(json!({"roots": ["/a"]})).unwrap();
        doc.update(json!({"roots": ["/a", "/b"]})).unwrap();
        assert_eq!(doc.get("roots").unwrap(), &json!(["/a", "/b"]));
    }

    #[test]
    fn update_section_creates_and_merges_subobject() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let mut doc = StatsDocument::new(&path);
        doc.update_section("scanning", json!({"heartbeat": 1})).unwrap();
        doc.update_section("scanning", json!({"heartbeat_utc": "t"})).unwrap();
        assert_eq!(doc.get("scanning").unwrap(), &json!({"heartbeat": 1, "heartbeat_utc": "t"}));
    }

    #[test]
    fn save_preserves_top_level_keys_written_by_another_process() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, r#"{"other_rse": {"status": "done"}}"#).unwrap();

        let mut doc = StatsDocument::new(&path);
        doc.overwrite("rse", "my_rse").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.get("other_rse"), Some(&json!({"status": "done"})));
        assert_eq!(parsed.get("rse"), Some(&json!("my_rse")));
    }

    #[test]
    fn save_on_missing_file_starts_from_empty_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let mut doc = StatsDocument::new(&path);
        doc.overwrite("status", "started").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"started\""));
    }

    #[test]
    fn existing_invalid_json_is_reported_as_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, "not json").unwrap();
        let mut doc = StatsDocument::new(&path);
        assert!(doc.overwrite("status", "started").is_err());
    }
}
