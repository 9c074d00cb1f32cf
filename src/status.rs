//! Observed radio state.
//!
//! A [`Status`] is one snapshot of what the transceiver is doing. The process keeps a
//! single mutable instance that the poll handlers update in place, plus a copy of the
//! last published snapshot held by the monitor for the publish gate.
//!
//! The serialized field names are the ones the dashboard reads from
//! `hams/<callsign>/status`, so they are renamed rather than following Rust casing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Operating mode as reported by the radio (e.g. `USB`, `CW`, `PKTUSB`).
    #[serde(rename = "Mode", default)]
    pub mode: String,
    /// Dial frequency in Hz.
    #[serde(rename = "Frequency", default)]
    pub frequency: i64,
    #[serde(rename = "PTT", default)]
    pub transmitting: bool,
    /// Milliseconds since the Unix epoch (UTC) of the last handler mutation.
    #[serde(rename = "Updated", default)]
    pub updated_at: i64,
    /// Milliseconds since the Unix epoch (UTC) of the last poll that saw PTT keyed.
    #[serde(rename = "LastPTT", default)]
    pub last_transmit_at: i64,
}

impl Status {
    /// True when mode, frequency and PTT all match `other`. Timestamps are ignored.
    pub fn same_state(&self, other: &Status) -> bool {
        self.mode == other.mode
            && self.frequency == other.frequency
            && self.transmitting == other.transmitting
    }

    /// Advance `updated_at` to `now_ms`, never moving it backwards.
    pub fn stamp(&mut self, now_ms: i64) -> i64 {
        if now_ms > self.updated_at {
            self.updated_at = now_ms;
        }
        self.updated_at
    }
}
