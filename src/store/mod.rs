//! In-memory data store behind the resource handlers.
//!
//! The store is owned by whoever builds the route table and is injected into
//! handler construction; there is no process-wide instance. Cloning a
//! `MemoryStore` clones the handle, not the data.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::error::{MockError, MockResult};

/// Collections of JSON records keyed by collection name.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a collection.
    pub fn seed(&self, name: &str, records: Vec<Value>) {
        tracing::debug!(collection = name, records = records.len(), "Collection seeded");
        self.inner.insert(name.to_string(), records);
    }

    /// Seed only if the collection does not exist yet. Returns whether it seeded.
    ///
    /// Used on reload so edits made through the mock API survive.
    pub fn seed_if_absent(&self, name: &str, records: Vec<Value>) -> bool {
        let mut seeded = false;
        self.inner.entry(name.to_string()).or_insert_with(|| {
            seeded = true;
            records
        });
        seeded
    }

    /// Read seed records from a JSON file.
    ///
    /// Accepts a top-level array, an object with a `list` array, or an object
    /// with exactly one array field (e.g. `{ "users": [...] }`).
    pub fn load_seed_file(path: &Path) -> MockResult<Vec<Value>> {
        let seed_error = |reason: String| MockError::Seed {
            path: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| seed_error(e.to_string()))?;
        let value: Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| seed_error(e.to_string()))?;

        match value {
            Value::Array(records) => Ok(records),
            Value::Object(mut object) => {
                if let Some(Value::Array(records)) = object.remove("list") {
                    return Ok(records);
                }
                let mut arrays = object.into_iter().filter_map(|(_, v)| match v {
                    Value::Array(records) => Some(records),
                    _ => None,
                });
                match (arrays.next(), arrays.next()) {
                    (Some(records), None) => Ok(records),
                    _ => Err(seed_error("expected an array or an object with one array field".into())),
                }
            }
            _ => Err(seed_error("expected an array or an object with one array field".into())),
        }
    }

    /// All records of a collection, in insertion order.
    pub fn list(&self, name: &str) -> Vec<Value> {
        self.inner.get(name).map(|r| r.value().clone()).unwrap_or_default()
    }

    /// Record whose `id` has the string form `id`.
    pub fn find(&self, name: &str, id: &str) -> Option<Value> {
        self.inner
            .get(name)
            .and_then(|r| r.value().iter().find(|record| id_matches(record, id)).cloned())
    }

    /// Append a record, assigning the next numeric `id` when it has none.
    ///
    /// Fails when the largest numeric id is already `i64::MAX`.
    pub fn insert(&self, name: &str, mut record: Map<String, Value>) -> MockResult<Value> {
        let mut records = self.inner.entry(name.to_string()).or_default();
        if !record.contains_key("id") {
            let id = next_id(&records).ok_or_else(|| {
                MockError::handler(format!("collection `{}` has no numeric id left to assign", name))
            })?;
            record.insert("id".to_string(), id);
        }
        let record = Value::Object(record);
        records.push(record.clone());
        Ok(record)
    }

    /// Shallow-merge `patch` into a record. The `id` field is never changed.
    pub fn update(&self, name: &str, id: &str, patch: &Map<String, Value>) -> Option<Value> {
        let mut records = self.inner.get_mut(name)?;
        let record = records.iter_mut().find(|record| id_matches(record, id))?;
        if let Value::Object(fields) = &mut *record {
            for (key, value) in patch {
                if key != "id" {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }
        Some(record.clone())
    }

    /// Remove and return a record.
    pub fn remove(&self, name: &str, id: &str) -> Option<Value> {
        let mut records = self.inner.get_mut(name)?;
        let index = records.iter().position(|record| id_matches(record, id))?;
        Some(records.remove(index))
    }

    /// Collection names, sorted.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of records in a collection.
    pub fn len(&self, name: &str) -> usize {
        self.inner.get(name).map(|r| r.value().len()).unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }
}

fn id_matches(record: &Value, id: &str) -> bool {
    match record.get("id") {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

fn next_id(records: &[Value]) -> Option<Value> {
    let max = records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_i64))
        .max()
        .unwrap_or(0);
    max.checked_add(1).map(Value::from)
}
