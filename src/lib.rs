//! # rigwatch - on-air status publisher for hamlib radios
//!
//! rigwatch polls a transceiver through hamlib's `rigctld` daemon and publishes a
//! debounced summary (frequency, mode, PTT) to a Firebase Realtime Database, where a
//! shared dashboard shows who is on the air.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rigwatch::config::Config;
//! use rigwatch::monitor::{poller, StatusMonitor};
//! use rigwatch::publisher::Publisher;
//! use rigwatch::rigctl::RigConnection;
//! use rigwatch::store::FirebaseStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("rigwatch.toml").await?;
//!     let store = FirebaseStore::from_config(&config).await?;
//!     let publisher = Publisher::new(store, config.status_path(), config.publish_timeout());
//!     let mut monitor = StatusMonitor::new(publisher);
//!     monitor.restore().await?;
//!
//!     let mut rig = RigConnection::open(&config.hamlib.server, config.query_timeout()).await?;
//!     let schedule = poller::PollSchedule::from_config(&config);
//!     poller::run_polling(&mut rig, &mut monitor, schedule, std::future::pending()).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - TOML configuration with CLI/environment overrides
//! - [`status`] - the observed radio state record
//! - [`gate`] - publish suppression ("too soon" / heartbeat) policy
//! - [`rigctl`] - rigctld extended-protocol client
//! - [`store`] - path-addressed remote store (Firebase REST, in-memory)
//! - [`publisher`] - fire-and-forget status writes
//! - [`monitor`] - poll handlers, state ownership and the poll loop
//!
//! ## Data flow
//!
//! ```text
//! ┌─────────────────┐
//! │    rigctld      │ ← f / m / t queries every tick
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ StatusMonitor   │ ← handlers mutate Status, PTT consults the gate
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Firebase RTDB   │ ← hams/<callsign>/status
//! └─────────────────┘
//! ```

pub mod config;
pub mod errors;
pub mod gate;
pub mod logutil;
pub mod monitor;
pub mod publisher;
pub mod rigctl;
pub mod status;
pub mod store;
