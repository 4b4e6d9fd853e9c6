//! Single-flight coordination of token refreshes.
//!
//! The first request that hits a 401 claims the flight and performs the
//! refresh call; every request that 401s while it is in progress queues
//! behind it and receives the shared outcome in arrival order. The flight
//! holder settles exactly once, and dropping it unsettled releases the
//! queue with an error so no waiter hangs on a refresh that will never
//! finish.

use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::oneshot;

/// Failure of one refresh call, delivered to every caller that joined the
/// flight.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub(crate) struct RefreshError {
    pub message: String,
}

impl RefreshError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

type Outcome = Result<String, RefreshError>;

/// What a caller that hit a 401 must do next.
pub(crate) enum Ticket<'a> {
    /// No refresh was running: the caller owns the flight and must settle
    /// it with the refresh outcome.
    Leader(Flight<'a>),
    /// A refresh is already running: await its outcome.
    Waiter(oneshot::Receiver<Outcome>),
}

#[derive(Default)]
struct GateState {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<Outcome>>,
}

/// The refresh flag and pending-request queue shared by all clones of one
/// client.
///
/// The lock is only ever held for queue bookkeeping, never across an await.
#[derive(Default)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    /// Claim the flight, or queue behind the one in progress.
    pub fn join(&self) -> Ticket<'_> {
        let mut state = self
            .state
            .lock()
            .expect("Failed to acquire refresh gate lock");

        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            Ticket::Waiter(rx)
        } else {
            state.refreshing = true;
            Ticket::Leader(Flight {
                gate: self,
                settled: false,
            })
        }
    }

    /// Clear the flag and hand the outcome to every queued waiter, oldest
    /// first. Sends happen outside the lock.
    fn settle(&self, outcome: &Outcome) {
        let waiters = {
            let mut state = self
                .state
                .lock()
                .expect("Failed to acquire refresh gate lock");
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        for waiter in waiters {
            // A waiter whose request future was dropped is simply skipped
            let _ = waiter.send(outcome.clone());
        }
    }

    #[cfg(test)]
    fn is_refreshing(&self) -> bool {
        self.state
            .lock()
            .expect("Failed to acquire refresh gate lock")
            .refreshing
    }
}

/// Exclusive handle on the in-flight refresh.
pub(crate) struct Flight<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl Flight<'_> {
    /// Release the queue with the fresh access token.
    pub fn succeed(mut self, access: &str) {
        self.settled = true;
        self.gate.settle(&Ok(access.to_string()));
    }

    /// Release the queue with the refresh failure.
    pub fn fail(mut self, error: RefreshError) {
        self.settled = true;
        self.gate.settle(&Err(error));
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        // Owner was cancelled mid-refresh: fail the flight so waiters are
        // released instead of waiting forever
        if !self.settled {
            self.gate
                .settle(&Err(RefreshError::new("token refresh was interrupted")));
        }
    }
}
