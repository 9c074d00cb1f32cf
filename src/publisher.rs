//! Writes a status snapshot to the remote store.
//!
//! Delivery is at most once: a failed or timed-out write is logged and reported to the
//! caller, never retried here. The next status that passes the gate is the retry.

use log::{debug, error};
use std::time::Duration;

use crate::status::Status;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    Published,
    Failed(String),
    TimedOut(Duration),
}

impl PublishResult {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishResult::Published)
    }
}

pub struct Publisher<S> {
    store: S,
    status_path: String,
    timeout: Duration,
}

impl<S: Store> Publisher<S> {
    pub fn new(store: S, status_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            store,
            status_path: status_path.into(),
            timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn status_path(&self) -> &str {
        &self.status_path
    }

    pub async fn publish(&self, status: &Status) -> PublishResult {
        let value = match serde_json::to_value(status) {
            Ok(v) => v,
            Err(e) => {
                error!("error encoding status: {}", e);
                return PublishResult::Failed(e.to_string());
            }
        };
        match tokio::time::timeout(self.timeout, self.store.set(&self.status_path, value)).await {
            Ok(Ok(())) => {
                debug!("published status to {}", self.status_path);
                PublishResult::Published
            }
            Ok(Err(e)) => {
                error!("error updating status at {}: {}", self.status_path, e);
                PublishResult::Failed(e.to_string())
            }
            Err(_) => {
                error!(
                    "status update to {} timed out after {:?}",
                    self.status_path, self.timeout
                );
                PublishResult::TimedOut(self.timeout)
            }
        }
    }
}
