//! # Status monitor
//!
//! [`StatusMonitor`] is the single owner of the mutable radio state. Poll responses are
//! handed to it one at a time through `&mut self`, so handler invocations never overlap
//! and no lock is needed around the current status or the previous snapshot.
//!
//! Each query updates one field and stamps `updated_at`. Only the PTT
//! ([`Query::TransmitState`]) handler consults the publish gate; frequency and mode
//! changes ride along with the next PTT poll.

pub mod poller;

use log::{debug, error, info, warn};
use serde_json::{json, Map};

use crate::errors::{HandlerError, StoreError};
use crate::gate::{should_publish, Decision};
use crate::logutil::describe_response;
use crate::publisher::{PublishResult, Publisher};
use crate::rigctl::{Query, Response};
use crate::status::Status;
use crate::store::{get_as, Store};

/// What happened to one poll response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Not applied; status untouched.
    Rejected(HandlerError),
    /// Frequency or mode applied locally.
    Updated,
    /// PTT applied and the gate consulted. `publish` is set when the gate approved.
    Evaluated {
        decision: Decision,
        publish: Option<PublishResult>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub responses: u64,
    pub rejected: u64,
    pub published: u64,
    pub skipped: u64,
    pub failed_writes: u64,
}

pub struct StatusMonitor<S> {
    current: Status,
    previous: Option<Status>,
    publisher: Publisher<S>,
    stats: MonitorStats,
}

impl<S: Store> StatusMonitor<S> {
    pub fn new(publisher: Publisher<S>) -> Self {
        Self {
            current: Status::default(),
            previous: None,
            publisher,
            stats: MonitorStats::default(),
        }
    }

    /// Install `status` as both the current state and the last published snapshot.
    pub fn seed(&mut self, status: Status) {
        self.previous = Some(status.clone());
        self.current = status;
    }

    /// Seed from the status already stored remotely so a restart remembers the last
    /// publish. On failure a zeroed status is seeded and the error returned.
    pub async fn restore(&mut self) -> Result<(), StoreError> {
        let path = self.publisher.status_path().to_string();
        match get_as::<_, Status>(self.publisher.store(), &path).await {
            Ok(found) => {
                let status = found.unwrap_or_default();
                debug!("initial status from {}: {:?}", path, status);
                self.seed(status);
                Ok(())
            }
            Err(e) => {
                self.seed(Status::default());
                Err(e)
            }
        }
    }

    pub fn current(&self) -> &Status {
        &self.current
    }

    pub fn previous(&self) -> Option<&Status> {
        self.previous.as_ref()
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn publisher(&self) -> &Publisher<S> {
        &self.publisher
    }

    /// Apply one response to the current status at time `now_ms`, without publishing.
    pub fn apply_at(
        &mut self,
        query: Query,
        response: &Response,
        now_ms: i64,
    ) -> Result<(), HandlerError> {
        if !response.is_ok() {
            return Err(HandlerError::Failed(response.result.clone()));
        }
        let datum = response.first().ok_or(HandlerError::MissingData)?;
        match query {
            Query::Frequency => {
                let freq = datum
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| HandlerError::InvalidFrequency(datum.to_string()))?;
                self.current.frequency = freq;
                self.current.stamp(now_ms);
            }
            Query::Mode => {
                self.current.mode = datum.to_string();
                self.current.stamp(now_ms);
            }
            Query::TransmitState => {
                self.current.transmitting = datum != "0";
                let stamped = self.current.stamp(now_ms);
                if self.current.transmitting {
                    self.current.last_transmit_at = stamped;
                }
            }
        }
        Ok(())
    }

    /// Handle a response stamped with the wall clock.
    pub async fn handle(&mut self, query: Query, response: &Response) -> HandleOutcome {
        let now_ms = chrono::Utc::now().timestamp_millis();
        self.handle_at(query, response, now_ms).await
    }

    pub async fn handle_at(
        &mut self,
        query: Query,
        response: &Response,
        now_ms: i64,
    ) -> HandleOutcome {
        self.stats.responses += 1;
        if let Err(e) = self.apply_at(query, response, now_ms) {
            self.stats.rejected += 1;
            error!("{}: {} ({})", query.name(), e, describe_response(response));
            return HandleOutcome::Rejected(e);
        }
        debug!("{}: {}", query.name(), describe_response(response));
        if query != Query::TransmitState {
            return HandleOutcome::Updated;
        }
        self.evaluate().await
    }

    async fn evaluate(&mut self) -> HandleOutcome {
        debug!("new status {:?}", self.current);
        let decision = should_publish(self.previous.as_ref(), &self.current);
        if let Decision::Skip(reason) = decision {
            self.stats.skipped += 1;
            debug!("skipping status update: {:?}", reason);
            return HandleOutcome::Evaluated {
                decision,
                publish: None,
            };
        }
        debug!("publishing status: {:?}", decision);
        // The snapshot is taken before the write and kept even if the write fails.
        self.previous = Some(self.current.clone());
        let result = self.publisher.publish(&self.current).await;
        if result.is_published() {
            self.stats.published += 1;
        } else {
            self.stats.failed_writes += 1;
        }
        HandleOutcome::Evaluated {
            decision,
            publish: Some(result),
        }
    }

    pub fn log_summary(&self) {
        let s = self.stats;
        info!(
            "monitor summary: responses={} rejected={} published={} skipped={} failed_writes={}",
            s.responses, s.rejected, s.published, s.skipped, s.failed_writes
        );
    }
}

/// Merge the radio model and the `automatic` source marker into the operator profile.
pub async fn register_profile<S: Store>(
    store: &S,
    profile_path: &str,
    radio: &str,
) -> Result<(), StoreError> {
    let mut fields = Map::new();
    fields.insert("radio".to_string(), json!(radio));
    fields.insert("source".to_string(), json!("automatic"));
    store.update(profile_path, fields).await
}

/// Run profile registration and status restore, logging failures as warnings.
pub async fn prepare<S: Store>(monitor: &mut StatusMonitor<S>, profile_path: &str, radio: &str) {
    if let Err(e) = register_profile(monitor.publisher().store(), profile_path, radio).await {
        warn!("error initializing ham profile at {}: {}", profile_path, e);
    }
    if let Err(e) = monitor.restore().await {
        warn!("error getting initial status: {}", e);
    }
}
