//! # rigctld client
//!
//! A minimal client for hamlib's network daemon. The connection is generic over the
//! byte stream so the same code drives a real [`TcpStream`] and in-memory streams.
//!
//! ```rust,no_run
//! use rigwatch::rigctl::{Query, RigConnection};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), rigwatch::errors::RigError> {
//! let mut rig = RigConnection::open("localhost:4532", Duration::from_secs(2)).await?;
//! let resp = rig.query(Query::Frequency).await?;
//! println!("{:?}", resp.data);
//! rig.close().await;
//! # Ok(())
//! # }
//! ```

pub mod protocol;

pub use protocol::{Query, ReplyParser, Response, RESULT_OK};

use log::{debug, trace};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::errors::RigError;
use crate::logutil::escape_line;

pub struct RigConnection<S> {
    stream: BufReader<S>,
    peer: String,
    query_timeout: Duration,
    closed: bool,
}

impl RigConnection<TcpStream> {
    /// Connect to rigctld at `addr` (`host:port`).
    pub async fn open(addr: &str, query_timeout: Duration) -> Result<Self, RigError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| RigError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        let _ = stream.set_nodelay(true);
        debug!("Connected to rigctld at {}", addr);
        Ok(Self::from_stream(stream, addr, query_timeout))
    }
}

impl<S> RigConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn from_stream(stream: S, peer: &str, query_timeout: Duration) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer: peer.to_string(),
            query_timeout,
            closed: false,
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Send one query and wait for its `RPRT`-terminated reply.
    ///
    /// Any error marks the connection closed: after a timeout or a broken line the
    /// stream position can no longer be trusted.
    pub async fn query(&mut self, query: Query) -> Result<Response, RigError> {
        if self.closed {
            return Err(RigError::Closed);
        }
        let timeout = self.query_timeout;
        let result = match tokio::time::timeout(timeout, self.exchange(query)).await {
            Ok(result) => result,
            Err(_) => Err(RigError::Timeout {
                query: query.code(),
                timeout,
            }),
        };
        if result.is_err() {
            self.closed = true;
        }
        result
    }

    async fn exchange(&mut self, query: Query) -> Result<Response, RigError> {
        let command = query.command_line();
        self.stream.get_mut().write_all(command.as_bytes()).await?;
        self.stream.get_mut().flush().await?;

        let mut parser = ReplyParser::new();
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.stream.read_line(&mut line).await?;
            if n == 0 {
                return Err(RigError::Closed);
            }
            trace!("rigctld {} <- {}", query.code(), escape_line(&line));
            if let Some(response) = parser.push_line(&line)? {
                return Ok(response);
            }
        }
    }

    /// Shut down the write half; rigctld drops the session on EOF.
    pub async fn close(mut self) {
        self.closed = true;
        let _ = self.stream.get_mut().shutdown().await;
        debug!("Closed rigctld connection to {}", self.peer);
    }
}
