//! Single-flight gate with an ordered waiter queue
//!
//! At most one operation runs at a time. The first caller to [`join`] becomes
//! the leader and performs the operation; callers that arrive while it is
//! outstanding are queued and receive a clone of the leader's outcome.
//!
//! The in-progress flag and the queue share one lock. Settling clears the
//! flag and takes the queue in the same critical section, so a caller either
//! lands in the drained queue or starts the next flight, never neither.
//! The lock is never held across an `.await`.
//!
//! [`join`]: SingleFlight::join

use std::fmt;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Error returned to waiters whose leader was dropped before settling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("in-flight operation was abandoned before it settled")]
pub struct FlightAbandoned;

type Outcome<T, E> = Result<T, E>;

struct FlightState<T, E> {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<Outcome<T, E>>>,
}

/// Gate allowing one outstanding operation at a time
pub struct SingleFlight<T, E> {
    state: Mutex<FlightState<T, E>>,
}

/// Role assigned by [`SingleFlight::join`]
pub enum Flight<'a, T, E> {
    /// No operation was outstanding; the caller must run it and settle
    Leader(FlightGuard<'a, T, E>),
    /// An operation is outstanding; wait for its outcome
    Follower(FlightWaiter<T, E>),
}

/// Leader's handle on the outstanding flight
///
/// Dropping it without calling [`settle`](Self::settle) ends the flight and
/// resolves every waiter with [`FlightAbandoned`].
#[must_use = "an unsettled guard abandons every queued waiter"]
pub struct FlightGuard<'a, T, E> {
    flight: &'a SingleFlight<T, E>,
    settled: bool,
}

/// Follower's handle on the outstanding flight
#[must_use = "a waiter does nothing unless awaited"]
pub struct FlightWaiter<T, E> {
    receiver: oneshot::Receiver<Outcome<T, E>>,
}

impl<T, E> SingleFlight<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self { state: Mutex::new(FlightState { in_progress: false, waiters: Vec::new() }) }
    }

    /// Become the leader, or queue behind the current one
    pub fn join(&self) -> Flight<'_, T, E> {
        let mut state = self.state.lock();

        if state.in_progress {
            let (sender, receiver) = oneshot::channel();
            state.waiters.push(sender);
            debug!(position = state.waiters.len(), "Queued behind in-flight operation");
            Flight::Follower(FlightWaiter { receiver })
        } else {
            state.in_progress = true;
            Flight::Leader(FlightGuard { flight: self, settled: false })
        }
    }

    /// Whether a leader currently holds the flight
    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.state.lock().in_progress
    }

    /// Number of queued followers
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.lock().waiters.len()
    }

    fn finish(&self) -> Vec<oneshot::Sender<Outcome<T, E>>> {
        let mut state = self.state.lock();
        state.in_progress = false;
        std::mem::take(&mut state.waiters)
    }
}

impl<T, E> Default for SingleFlight<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for SingleFlight<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SingleFlight")
            .field("in_progress", &state.in_progress)
            .field("pending", &state.waiters.len())
            .finish()
    }
}

impl<T: Clone, E: Clone> FlightGuard<'_, T, E> {
    /// End the flight and hand `outcome` to every queued waiter
    ///
    /// Waiters are resolved in arrival order. Returns how many were queued.
    pub fn settle(mut self, outcome: Outcome<T, E>) -> usize {
        self.settled = true;
        let waiters = self.flight.finish();
        let count = waiters.len();

        for waiter in waiters {
            // A waiter whose caller went away is skipped.
            let _ = waiter.send(outcome.clone());
        }

        count
    }
}

impl<T, E> Drop for FlightGuard<'_, T, E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let waiters = self.flight.finish();
        if !waiters.is_empty() {
            warn!(waiters = waiters.len(), "In-flight operation abandoned; releasing waiters");
        }
    }
}

impl<T, E> FlightWaiter<T, E> {
    /// Wait for the leader's outcome
    ///
    /// # Errors
    /// Returns [`FlightAbandoned`] if the leader was dropped without settling
    pub async fn wait(self) -> Result<Outcome<T, E>, FlightAbandoned> {
        self.receiver.await.map_err(|_| FlightAbandoned)
    }
}
