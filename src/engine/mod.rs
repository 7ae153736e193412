//! Transfer engine abstraction
//!
//! A [`TransferEngine`] performs one blocking HTTP GET at a time. Each worker
//! owns one engine handle for its whole lifetime, so connection setup cost is
//! amortized across requests. During a transfer the engine streams received
//! chunks into the task's [`TransferContext`] and polls it for cancellation
//! between chunks; an affirmative poll aborts the transfer.
//!
//! Engines that need process-wide initialization or teardown must be set up
//! by the hosting process before the first client is constructed. The default
//! [`http::HttpEngine`] needs none.

pub mod http;

use bytes::BytesMut;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many redirects")]
    TooManyRedirects,
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Per-task transfer state, handed to the engine for the duration of one
/// `perform` call. Holds the response buffer and the task's cancellation
/// flag.
pub struct TransferContext<'a> {
    data: &'a mut BytesMut,
    canceled: &'a AtomicBool,
}

impl<'a> TransferContext<'a> {
    pub fn new(data: &'a mut BytesMut, canceled: &'a AtomicBool) -> Self {
        Self { data, canceled }
    }

    /// Append one received chunk to the response buffer.
    pub fn push(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    /// Cancellation poll. Engines check this between chunks and abort the
    /// transfer when it returns true.
    pub fn is_canceled(&self) -> bool {
        // Best-effort flag; no data is synchronized through it.
        self.canceled.load(Ordering::Relaxed)
    }

    pub fn bytes_received(&self) -> usize {
        self.data.len()
    }
}

/// How one transfer attempt ended.
#[derive(Debug)]
pub enum TransferOutcome {
    /// The transfer ran to completion. The HTTP status may still be non-2xx.
    Completed,
    /// The transfer was aborted by the cancellation poll.
    Aborted,
    /// The engine failed before or while reading the response.
    Failed(EngineError),
}

/// Result of one `perform` call.
#[derive(Debug)]
pub struct TransferResult {
    /// HTTP status code, if a response line was received.
    pub status: Option<u16>,
    pub outcome: TransferOutcome,
}

impl TransferResult {
    pub fn completed(status: u16) -> Self {
        Self {
            status: Some(status),
            outcome: TransferOutcome::Completed,
        }
    }

    pub fn aborted(status: Option<u16>) -> Self {
        Self {
            status,
            outcome: TransferOutcome::Aborted,
        }
    }

    pub fn failed(status: Option<u16>, error: EngineError) -> Self {
        Self {
            status,
            outcome: TransferOutcome::Failed(error),
        }
    }

    /// True when the transfer completed with a 2xx status.
    pub fn is_http_success(&self) -> bool {
        matches!(self.outcome, TransferOutcome::Completed)
            && self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

/// One blocking HTTP GET at a time.
///
/// `perform` must invoke `ctx.push` for every received chunk and consult
/// `ctx.is_canceled()` periodically, returning an aborted result as soon as
/// the poll is affirmative.
pub trait TransferEngine: Send {
    fn perform(&mut self, url: &str, ctx: &mut TransferContext<'_>) -> TransferResult;
}
