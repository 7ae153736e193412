//! Bounded-concurrency fetch client
//!
//! Callers submit URL fetch requests identified by a key; a fixed pool of
//! worker threads performs the transfers and each request's result is
//! delivered through its callback exactly once. Pending and in-flight
//! requests can be canceled by key, and shutdown cancels everything that is
//! still outstanding before returning.

mod state;
mod worker;

use crate::config::Config;
use crate::engine::http::HttpEngine;
use crate::engine::{EngineError, TransferEngine};
use crate::observability::MetricsSnapshot;
use bytes::Bytes;
use state::{Request, Shared};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to set up transfer engine: {0}")]
    Engine(#[from] EngineError),
}

/// Result of one fetch, delivered to the submitter's callback exactly once.
#[derive(Debug)]
pub struct FetchResult {
    /// Raw response bytes; possibly empty for canceled or failed transfers.
    pub data: Bytes,
    /// True when the transfer completed with a 2xx status.
    pub successful: bool,
    /// True when the request was canceled, explicitly or by shutdown.
    pub canceled: bool,
}

impl FetchResult {
    fn canceled() -> Self {
        Self {
            data: Bytes::new(),
            successful: false,
            canceled: true,
        }
    }
}

pub type FetchCallback = Box<dyn FnOnce(FetchResult) + Send + 'static>;

/// Asynchronous fetch client backed by a fixed pool of worker threads.
///
/// Pending requests are served first-in-first-out, but a worker already
/// mid-transfer is not preempted, so completion order across requests is not
/// guaranteed. Dropping the client performs the same teardown as
/// [`Client::shutdown`].
pub struct Client {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl Client {
    /// Start a client with `config.worker_count` workers, each owning a
    /// reusable [`HttpEngine`] handle.
    ///
    /// # Panics
    ///
    /// Panics if `config.worker_count` is zero.
    pub fn new(config: Config) -> Result<Self, ClientError> {
        assert!(config.worker_count > 0, "worker_count must be at least 1");

        let engines = (0..config.worker_count)
            .map(|_| HttpEngine::new(&config))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::with_engines(engines))
    }

    /// Start a client with one worker per engine handle.
    ///
    /// Each engine is exclusively owned by its worker for the worker's whole
    /// lifetime. This is the seam for custom or mock engines.
    ///
    /// # Panics
    ///
    /// Panics if `engines` is empty.
    pub fn with_engines<E>(engines: Vec<E>) -> Self
    where
        E: TransferEngine + 'static,
    {
        assert!(!engines.is_empty(), "worker_count must be at least 1");

        let shared = Arc::new(Shared::new(engines.len()));
        let workers: Vec<JoinHandle<()>> = engines
            .into_iter()
            .enumerate()
            .map(|(index, engine)| worker::spawn(index, Arc::clone(&shared), engine))
            .collect();

        info!(worker_count = workers.len(), "client started");
        Self { shared, workers }
    }

    /// Enqueue a fetch for `key` (a URL).
    ///
    /// The callback fires exactly once with the outcome: the downloaded
    /// bytes on success, or empty/partial bytes with the corresponding flag
    /// on failure or cancellation. Returns true while the client is alive.
    pub fn submit<K, F>(&self, key: K, on_complete: F) -> bool
    where
        K: Into<String>,
        F: FnOnce(FetchResult) + Send + 'static,
    {
        let request = Request {
            key: key.into(),
            on_complete: Box::new(on_complete),
        };

        {
            let mut state = self.shared.lock();
            state.queue.push_back(request);
        }
        self.shared.metrics.request_submitted();

        // Wake one waiting worker to start the transfer.
        self.shared.work_available.notify_one();
        true
    }

    /// Best-effort cancellation by key. Idempotent no-op for unknown keys.
    ///
    /// A request still in the pending queue is removed and its callback
    /// fires with `canceled = true` before this returns; it will never be
    /// dispatched to a worker. A request already being transferred is only
    /// flagged: the owning worker observes the flag at the engine's next
    /// cancellation poll (or after the transfer finishes) and delivers the
    /// callback itself, so a transfer that completes inside that window may
    /// still be reported successful.
    pub fn cancel(&self, key: &str) {
        let pending = {
            let mut state = self.shared.lock();
            if let Some(position) = state.queue.iter().position(|r| r.key == key) {
                state.queue.remove(position)
            } else {
                for (index, active) in state.active.iter().enumerate() {
                    if active.as_deref() == Some(key) {
                        debug!(worker = index, url = key, "flagging in-flight request");
                        self.shared.canceled[index].store(true, Ordering::Relaxed);
                    }
                }
                None
            }
        };

        if let Some(request) = pending {
            debug!(url = key, "canceled pending request");
            self.shared.metrics.request_canceled();
            (request.on_complete)(FetchResult::canceled());
        }
    }

    /// Shut the client down.
    ///
    /// Every still-pending request's callback fires with `canceled = true`,
    /// every in-flight transfer is flagged for abort, and all worker threads
    /// are joined. When this returns, no worker is running and every request
    /// ever submitted has had its callback invoked exactly once.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    /// Snapshot of the client's request counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    fn shutdown_inner(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        let drained: Vec<Request> = {
            let mut state = self.shared.lock();
            let drained = state.queue.drain(..).collect();
            // Flag every slot, busy or not; no new claim can happen once
            // keep_running goes false under this lock.
            for flag in &self.shared.canceled {
                flag.store(true, Ordering::Relaxed);
            }
            state.keep_running = false;
            drained
        };

        debug!(pending = drained.len(), "shutting down, canceling pending requests");
        for request in drained {
            self.shared.metrics.request_canceled();
            (request.on_complete)(FetchResult::canceled());
        }

        self.shared.work_available.notify_all();
        for (index, handle) in self.workers.drain(..).enumerate() {
            if handle.join().is_err() {
                warn!(worker = index, "worker thread panicked");
            }
        }
        info!("client stopped");
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{TransferContext, TransferResult};
    use std::sync::mpsc;
    use std::time::Duration;

    /// Engine that completes every transfer immediately with a fixed body.
    struct StaticEngine {
        body: &'static [u8],
        status: u16,
    }

    impl TransferEngine for StaticEngine {
        fn perform(&mut self, _url: &str, ctx: &mut TransferContext<'_>) -> TransferResult {
            ctx.push(self.body);
            TransferResult::completed(self.status)
        }
    }

    fn static_client(workers: usize, body: &'static [u8], status: u16) -> Client {
        let engines = (0..workers).map(|_| StaticEngine { body, status }).collect();
        Client::with_engines(engines)
    }

    #[test]
    fn test_submit_delivers_result() {
        let client = static_client(1, b"payload", 200);
        let (tx, rx) = mpsc::channel();

        assert!(client.submit("http://example.com/a", move |result| {
            tx.send(result).unwrap();
        }));

        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.successful);
        assert!(!result.canceled);
        assert_eq!(&result.data[..], b"payload");
        client.shutdown();
    }

    #[test]
    fn test_non_2xx_is_unsuccessful() {
        let client = static_client(1, b"not found", 404);
        let (tx, rx) = mpsc::channel();

        client.submit("http://example.com/missing", move |result| {
            tx.send(result).unwrap();
        });

        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(!result.successful);
        assert!(!result.canceled);
        // The accumulated bytes are handed over even on failure.
        assert_eq!(&result.data[..], b"not found");
        client.shutdown();
    }

    #[test]
    fn test_cancel_unknown_key_is_noop() {
        let client = static_client(1, b"", 200);
        client.cancel("http://example.com/never-submitted");
        client.shutdown();
    }

    #[test]
    fn test_drop_without_shutdown_joins_workers() {
        let client = static_client(2, b"x", 200);
        let (tx, rx) = mpsc::channel();

        client.submit("http://example.com/a", move |result| {
            tx.send(result).unwrap();
        });

        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.successful);
        drop(client);
    }

    #[test]
    #[should_panic(expected = "worker_count must be at least 1")]
    fn test_zero_workers_panics() {
        let _ = Client::with_engines(Vec::<StaticEngine>::new());
    }
}
