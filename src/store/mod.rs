//! # Remote store
//!
//! A hierarchical, path-addressed JSON store: the shape of a Firebase Realtime Database.
//! Paths are slash-separated keys such as `hams/W1AW/status`.
//!
//! - [`FirebaseStore`] talks to the Realtime Database REST API.
//! - [`MemoryStore`] keeps the tree in process, for `--dry-run` and tests.

pub mod auth;
pub mod firebase;
pub mod memory;

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::StoreError;

#[allow(async_fn_in_trait)]
pub trait Store {
    /// Value at `path`, `None` when nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value at `path`.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Merge `fields` into the object at `path`, leaving other children untouched.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError>;
}

/// Fetch and deserialize the value at `path`.
pub async fn get_as<S, T>(store: &S, path: &str) -> Result<Option<T>, StoreError>
where
    S: Store + ?Sized,
    T: DeserializeOwned,
{
    match store.get(path).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Split a store path into its keys, rejecting empty segments.
pub fn split_path(path: &str) -> Result<Vec<&str>, StoreError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_paths() {
        assert_eq!(
            split_path("hams/W1AW/status").unwrap(),
            vec!["hams", "W1AW", "status"]
        );
        assert_eq!(split_path("/hams/").unwrap(), vec!["hams"]);
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(split_path("").is_err());
        assert!(split_path("/").is_err());
        assert!(split_path("hams//status").is_err());
    }
}
