//! Poll loop: ticks on a fixed interval plus random jitter, issues the three queries in
//! order and feeds each reply to the monitor before sending the next query.
//!
//! A slow round delays the following tick instead of queueing it, and the loop ends
//! when rigctld goes away or the shutdown future completes.

use log::{debug, info};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::MissedTickBehavior;

use super::StatusMonitor;
use crate::config::Config;
use crate::errors::RigError;
use crate::rigctl::{Query, RigConnection};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub jitter: Duration,
}

impl PollSchedule {
    pub fn new(interval: Duration, jitter: Duration) -> Self {
        Self { interval, jitter }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.poll_interval(), config.poll_jitter())
    }

    /// Random extra delay in `[0, jitter)`.
    pub fn sample_jitter(&self) -> Duration {
        let max = self.jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max))
    }
}

#[derive(Debug)]
pub enum PollExit {
    /// The connection closed or faulted.
    Closed(RigError),
    Shutdown,
}

pub async fn run_polling<R, S, F>(
    rig: &mut RigConnection<R>,
    monitor: &mut StatusMonitor<S>,
    schedule: PollSchedule,
    shutdown: F,
) -> PollExit
where
    R: AsyncRead + AsyncWrite + Unpin,
    S: Store,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(
        "polling {} every {:?} (+ up to {:?} jitter)",
        rig.peer(),
        schedule.interval,
        schedule.jitter
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => return PollExit::Shutdown,
            _ = ticker.tick() => {}
        }
        let jitter = schedule.sample_jitter();
        if !jitter.is_zero() {
            tokio::select! {
                _ = &mut shutdown => return PollExit::Shutdown,
                _ = tokio::time::sleep(jitter) => {}
            }
        }
        if let Err(e) = poll_round(rig, monitor).await {
            return PollExit::Closed(e);
        }
    }
}

/// One round: frequency, mode, then PTT (which may publish).
pub async fn poll_round<R, S>(
    rig: &mut RigConnection<R>,
    monitor: &mut StatusMonitor<S>,
) -> Result<(), RigError>
where
    R: AsyncRead + AsyncWrite + Unpin,
    S: Store,
{
    for query in Query::ALL {
        let response = rig.query(query).await?;
        let outcome = monitor.handle(query, &response).await;
        debug!("{} -> {:?}", query.name(), outcome);
    }
    Ok(())
}
