// Keyed single-flight coordination for one-shot fetchers
//
// A gate admits one request at a time:
// - a request whose key equals the unresolved in-flight key is rejected
//   with InvalidRequest (duplicate guard)
// - any other request aborts the in-flight one and takes its place
// - every admitted request gets a generation number; only the request
//   holding the current generation may apply its result
//
// Superseded and reset requests resolve with the cancelled error. Dropping
// the future returned by `run` aborts the request and frees its key.

use crate::error::{ImageFeedError, NetworkError, Result};
use std::fmt::Debug;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::task::AbortHandle;

struct GateState<K> {
    generation: u64,
    key: Option<K>,
    abort: Option<AbortHandle>,
}

/// Admission ticket for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

/// Duplicate guard + cancel-prior + generation counter, keyed on `K`
pub struct RequestGate<K> {
    name: &'static str,
    state: Mutex<GateState<K>>,
}

/// Frees the ticket if the caller of `run` goes away before it resolves
struct InFlight<'a, K> {
    gate: &'a RequestGate<K>,
    ticket: Ticket,
    abort: Option<AbortHandle>,
}

impl<K> InFlight<'_, K> {
    fn disarm(&mut self) {
        self.abort = None;
    }
}

impl<K> Drop for InFlight<'_, K> {
    fn drop(&mut self) {
        if let Some(abort) = self.abort.take() {
            abort.abort();
            if self.gate.finish(self.ticket, || {}) {
                tracing::debug!("[{}] caller dropped, request abandoned", self.gate.name);
            }
        }
    }
}

impl<K> RequestGate<K> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(GateState {
                generation: 0,
                key: None,
                abort: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState<K>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the task serving `ticket` so a later request can cancel it
    ///
    /// If the ticket was superseded in the meantime the task is aborted
    /// right away.
    pub fn attach(&self, ticket: Ticket, abort: AbortHandle) {
        let mut state = self.lock();
        if state.generation == ticket.generation {
            state.abort = Some(abort);
        } else {
            abort.abort();
        }
    }

    /// Release the gate for `ticket`, running `apply` if it is still current
    ///
    /// `apply` runs under the gate lock so no newer request can finish in
    /// between. Returns whether the ticket was current.
    pub fn finish<F: FnOnce()>(&self, ticket: Ticket, apply: F) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.generation {
            return false;
        }

        state.key = None;
        state.abort = None;
        apply();
        true
    }

    /// False once a newer request or a `reset` has replaced `ticket`
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.lock().generation == ticket.generation
    }

    /// Cancel any in-flight request and forget the guard key
    pub fn reset(&self) {
        let mut state = self.lock();
        if let Some(abort) = state.abort.take() {
            abort.abort();
        }
        state.key = None;
        state.generation += 1;
    }

    /// True while a request is admitted and unresolved
    pub fn is_in_flight(&self) -> bool {
        self.lock().key.is_some()
    }
}

impl<K> RequestGate<K>
where
    K: PartialEq + Clone + Debug + Send + 'static,
{
    /// Admit a request for `key`, cancelling whatever is in flight
    pub fn begin(&self, key: &K) -> std::result::Result<Ticket, NetworkError> {
        let mut state = self.lock();

        if state.key.as_ref() == Some(key) {
            tracing::debug!("[{}] duplicate request rejected", self.name);
            return Err(NetworkError::InvalidRequest);
        }

        if let Some(abort) = state.abort.take() {
            tracing::debug!("[{}] cancelling in-flight request", self.name);
            abort.abort();
        }

        state.generation += 1;
        state.key = Some(key.clone());

        Ok(Ticket {
            generation: state.generation,
        })
    }

    /// Admit, spawn and await `request`, applying its value only if current
    ///
    /// The request runs on its own task so it can be aborted by a later
    /// request or by `reset`. A panicking task is reported as
    /// `UrlSessionError`.
    pub async fn run<T, Fut, A>(&self, key: &K, request: Fut, apply: A) -> Result<T>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        A: FnOnce(&T),
    {
        self.run_with_ticket(key, move |_| request, apply).await
    }

    /// Like `run`, but hands the admission ticket to the request
    ///
    /// Lets the request check `is_current` before a side effect that must
    /// not outlive a `reset`.
    pub async fn run_with_ticket<T, F, Fut, A>(&self, key: &K, request: F, apply: A) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Ticket) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        A: FnOnce(&T),
    {
        let ticket = self.begin(key)?;

        let handle = tokio::spawn(request(ticket));
        self.attach(ticket, handle.abort_handle());
        let mut in_flight = InFlight {
            gate: self,
            ticket,
            abort: Some(handle.abort_handle()),
        };

        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(NetworkError::cancelled().into()),
            Err(e) => {
                tracing::error!("[{}] request task failed: {}", self.name, e);
                Err(NetworkError::UrlSessionError.into())
            }
        };
        in_flight.disarm();

        match outcome {
            Ok(value) => {
                if self.finish(ticket, || apply(&value)) {
                    Ok(value)
                } else {
                    tracing::debug!("[{}] discarding superseded result", self.name);
                    Err(NetworkError::cancelled().into())
                }
            }
            Err(e) => {
                self.finish(ticket, || {});
                Err(e)
            }
        }
    }
}

/// True when `err` is the cancellation error produced by a gate
pub fn is_cancelled(err: &ImageFeedError) -> bool {
    err.as_network().map_or(false, NetworkError::is_cancelled)
}
