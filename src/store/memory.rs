//! In-process store holding one JSON tree.

use log::info;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{split_path, Store};
use crate::errors::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    root: Mutex<Value>,
    fail_writes: AtomicBool,
    writes: AtomicU64,
    announce: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that logs every write at info level (`--dry-run`).
    pub fn announcing() -> Self {
        Self {
            announce: true,
            ..Self::default()
        }
    }

    pub fn with_root(root: Value) -> Self {
        Self {
            root: Mutex::new(root),
            ..Self::default()
        }
    }

    /// Reject every subsequent `set`/`update` with [`StoreError::Rejected`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of accepted writes.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> Value {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        self.root.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self, path: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Rejected(path.to_string()));
        }
        Ok(())
    }

    /// Walk to `segments`, turning missing or scalar nodes into objects on the way.
    fn node_mut<'a>(root: &'a mut Value, segments: &[&str]) -> &'a mut Value {
        let mut node = root;
        for key in segments {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = &mut node[*key];
        }
        node
    }
}

impl Store for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segments = split_path(path)?;
        let root = self.lock();
        let mut node = &*root;
        for key in segments {
            match node.get(key) {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        if node.is_null() {
            Ok(None)
        } else {
            Ok(Some(node.clone()))
        }
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let segments = split_path(path)?;
        self.check_writable(path)?;
        if self.announce {
            info!("dry-run: set {} = {}", path, value);
        }
        let mut root = self.lock();
        *Self::node_mut(&mut root, &segments) = value;
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let segments = split_path(path)?;
        self.check_writable(path)?;
        if self.announce {
            info!("dry-run: update {} with {}", path, Value::Object(fields.clone()));
        }
        let mut root = self.lock();
        let node = Self::node_mut(&mut root, &segments);
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Value::Object(map) = node {
            for (key, value) in fields {
                map.insert(key, value);
            }
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
