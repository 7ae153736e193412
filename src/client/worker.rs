//! Worker loop: claim a request, run the transfer, deliver the callback

use super::FetchResult;
use super::state::{Request, Shared};
use crate::engine::{TransferContext, TransferEngine, TransferOutcome};
use bytes::BytesMut;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// Accumulating result of one transfer. Created once per worker and reused
/// (reset) after every task; never shared across workers.
struct Response {
    data: BytesMut,
    successful: bool,
}

impl Response {
    fn new() -> Self {
        Self {
            data: BytesMut::new(),
            successful: false,
        }
    }

    fn reset(&mut self) {
        self.data.clear();
        self.successful = false;
    }
}

pub(crate) fn spawn<E>(index: usize, shared: Arc<Shared>, engine: E) -> JoinHandle<()>
where
    E: TransferEngine + 'static,
{
    thread::Builder::new()
        .name(format!("fetchpool-worker-{index}"))
        .spawn(move || run(index, &shared, engine))
        .expect("failed to spawn worker thread")
}

fn run<E: TransferEngine>(index: usize, shared: &Shared, mut engine: E) {
    debug!(worker = index, "worker starting");
    let mut response = Response::new();

    // Loop until the client is shut down. The engine handle lives for the
    // whole loop and is dropped on exit.
    loop {
        let request = {
            let mut state = shared.lock();
            while state.keep_running && state.queue.is_empty() {
                debug!(worker = index, "worker waiting");
                state = shared.wait(state);
            }
            if !state.keep_running {
                break;
            }
            // Spurious wake with nothing to claim: back to waiting.
            let Some(request) = state.queue.pop_front() else {
                continue;
            };
            // Record the key so cancel can find the in-flight task.
            state.active[index] = Some(request.key.clone());
            request
        };

        let Request { key, on_complete } = request;
        debug!(worker = index, url = %key, "starting request");

        let result = {
            let mut ctx = TransferContext::new(&mut response.data, &shared.canceled[index]);
            engine.perform(&key, &mut ctx)
        };

        match &result.outcome {
            TransferOutcome::Completed if result.is_http_success() => {
                response.successful = true;
                debug!(worker = index, url = %key, status = result.status, "request succeeded");
            }
            TransferOutcome::Completed => {
                warn!(worker = index, url = %key, status = result.status, "request failed with http status");
            }
            TransferOutcome::Aborted => {
                debug!(worker = index, url = %key, "request aborted");
            }
            TransferOutcome::Failed(e) => {
                error!(worker = index, url = %key, error = %e, status = result.status, "request failed");
            }
        }

        // A cancel that raced the end of the transfer still counts; a
        // transfer that completed successfully beats it.
        let canceled = !response.successful
            && (matches!(result.outcome, TransferOutcome::Aborted)
                || shared.canceled[index].load(Ordering::Relaxed));

        if response.successful {
            shared.metrics.request_succeeded();
        } else if canceled {
            shared.metrics.request_canceled();
        } else {
            shared.metrics.request_failed();
        }

        // Deliver exactly once, passing ownership of whatever accumulated.
        on_complete(FetchResult {
            data: response.data.split().freeze(),
            successful: response.successful,
            canceled,
        });

        // Clear the slot and its flag together, so a late cancel for this
        // key can never mark a task the next claim hands to this slot.
        {
            let mut state = shared.lock();
            state.active[index] = None;
            shared.canceled[index].store(false, Ordering::Relaxed);
        }
        response.reset();
    }

    debug!(worker = index, "worker exiting");
}
