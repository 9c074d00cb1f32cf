//! rigctld extended response protocol.
//!
//! Commands prefixed with `+` make rigctld answer in "extended" form: an optional
//! `cmd_name:` header, one `Key: value` line per returned value, and a final
//! `RPRT <code>` line. For example `+f` yields:
//!
//! ```text
//! get_freq:
//! Frequency: 14074000
//! RPRT 0
//! ```
//!
//! A failing command usually returns only the `RPRT` line with a negative code.

use serde::Serialize;

use crate::errors::RigError;

/// Result code rigctld uses for success.
pub const RESULT_OK: &str = "0";

/// The three state queries the poll loop issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    Frequency,
    Mode,
    TransmitState,
}

impl Query {
    /// Polled in this order every round.
    pub const ALL: [Query; 3] = [Query::Frequency, Query::Mode, Query::TransmitState];

    /// Single-letter rigctld command.
    pub fn code(&self) -> char {
        match self {
            Query::Frequency => 'f',
            Query::Mode => 'm',
            Query::TransmitState => 't',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Query::Frequency => "freq",
            Query::Mode => "mode",
            Query::TransmitState => "ptt",
        }
    }

    /// Line written to the socket, extended response mode, newline-terminated.
    pub fn command_line(&self) -> String {
        format!("+{}\n", self.code())
    }

    pub fn from_code(code: char) -> Option<Query> {
        Query::ALL.into_iter().find(|q| q.code() == code)
    }
}

/// One decoded reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    /// The `RPRT` code as text; `"0"` is success.
    pub result: String,
    /// Returned values in order.
    pub data: Vec<String>,
}

impl Response {
    pub fn ok<I, S>(data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Response {
            result: RESULT_OK.to_string(),
            data: data.into_iter().map(Into::into).collect(),
        }
    }

    pub fn failed(code: &str) -> Self {
        Response {
            result: code.to_string(),
            data: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == RESULT_OK
    }

    pub fn first(&self) -> Option<&str> {
        self.data.first().map(String::as_str)
    }
}

/// Accumulates reply lines until the terminating `RPRT` line.
#[derive(Debug, Default)]
pub struct ReplyParser {
    data: Vec<String>,
    lines: usize,
}

impl ReplyParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its newline). Returns the finished response on `RPRT`.
    pub fn push_line(&mut self, line: &str) -> Result<Option<Response>, RigError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(code) = line.strip_prefix("RPRT") {
            let code = code.trim();
            if code.is_empty() || code.parse::<i32>().is_err() {
                return Err(RigError::Malformed(line.to_string()));
            }
            self.lines = 0;
            return Ok(Some(Response {
                result: code.to_string(),
                data: std::mem::take(&mut self.data),
            }));
        }
        if line.is_empty() {
            return Ok(None);
        }
        self.lines += 1;
        // Only the opening line can be the `cmd_name:` header; a later `Key:` is an empty value.
        if self.lines == 1 && line.ends_with(':') && !line.contains(' ') {
            return Ok(None);
        }
        match line.split_once(':') {
            Some((_key, value)) => self.data.push(value.trim().to_string()),
            None => self.data.push(line.trim().to_string()),
        }
        Ok(None)
    }
}
