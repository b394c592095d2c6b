//! Name to annotation-GUID lookup loaded from entity metadata JSON
//!
//! Annotation tools export their entities as nested JSON. Any object that
//! carries a `name` and an identifier (`guid`, `entityId` or `id`, first
//! match wins) becomes one entry, wherever it sits in the document.
//! Names repeat across entities, so the second and later occurrences are
//! stored as `name_1`, `name_2`, ... in traversal order, skipping any
//! suffixed name another entity already holds.

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const ID_KEYS: [&str; 3] = ["guid", "entityId", "id"];

/// Name to annotation GUID table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitiesMap {
    by_name: HashMap<String, String>,
    by_guid: HashMap<String, String>,
    seen: HashMap<String, usize>,
}

impl EntitiesMap {
    /// Parse entity metadata from a JSON string
    pub fn from_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    /// Parse entity metadata from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader)?;
        Ok(Self::from_value(&value))
    }

    /// Load entity metadata from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingFile(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        let map = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::info!(file = %path.display(), entities = map.len(), "loaded entity map");
        Ok(map)
    }

    fn from_value(value: &Value) -> Self {
        let mut map = Self::default();
        map.collect(value);
        map
    }

    fn collect(&mut self, value: &Value) {
        match value {
            Value::Object(object) => {
                let name = object.get("name").and_then(Value::as_str);
                let id = ID_KEYS
                    .iter()
                    .find_map(|key| object.get(*key).and_then(Value::as_str));
                if let (Some(name), Some(id)) = (name, id) {
                    self.insert(name, id);
                }
                for child in object.values() {
                    self.collect(child);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect(item);
                }
            }
            _ => {}
        }
    }

    fn insert(&mut self, name: &str, guid: &str) {
        let occurrence = self.seen.entry(name.to_string()).or_insert(0);
        // a suffixed name may already be taken by a literal entity name
        let key = loop {
            let key = match *occurrence {
                0 => name.to_string(),
                n => format!("{}_{}", name, n),
            };
            *occurrence += 1;
            if !self.by_name.contains_key(&key) {
                break key;
            }
        };
        self.by_guid.insert(guid.to_string(), key.clone());
        self.by_name.insert(key, guid.to_string());
    }

    /// Annotation GUID of the entity with this (possibly suffixed) name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Name an annotation GUID was stored under
    pub fn name_for(&self, guid: &str) -> Option<&str> {
        self.by_guid.get(guid).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when no entity was found
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
