//! Render-completion handshake.
//!
//! One single-fire signal per render: the calling thread waits on it, and either the content
//! engine (completion) or the consumer-stop listener (cancellation) fires it. The first fire
//! wins; every later fire for the same render is a no-op. Each arm bumps a generation counter
//! so a completion that arrives after its wait was abandoned cannot release a later render.

use parking_lot::{Condvar, Mutex};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// How a render wait ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The content engine reported a finished frame.
    Completed,
    /// The content engine reported (or implied, by dropping its completion) a failure.
    Failed(String),
    /// The wait was abandoned because the consumer began stopping.
    Cancelled,
    /// The wait exceeded the configured render timeout.
    TimedOut,
}

impl RenderOutcome {
    /// Return `true` only for [`RenderOutcome::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Pending,
    Fired(RenderOutcome),
}

#[derive(Debug)]
struct SignalState {
    generation: u64,
    phase: Phase,
}

impl SignalState {
    fn settle(&mut self) -> Option<RenderOutcome> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Pending => {
                self.phase = Phase::Pending;
                None
            }
            // Nothing armed: there is no render to wait for.
            Phase::Idle => Some(RenderOutcome::Cancelled),
            Phase::Fired(outcome) => Some(outcome),
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SignalState>,
    fired: Condvar,
}

impl Shared {
    fn fire(&self, generation: Option<u64>, outcome: RenderOutcome) -> bool {
        let mut st = self.state.lock();
        if generation.is_some_and(|g| g != st.generation) || !matches!(st.phase, Phase::Pending) {
            return false;
        }
        st.phase = Phase::Fired(outcome);
        drop(st);
        self.fired.notify_all();
        true
    }
}

/// Waiting side of the handshake, owned by a `ServiceManager`.
#[derive(Clone, Debug)]
pub struct RenderSignal {
    shared: Arc<Shared>,
}

impl Default for RenderSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSignal {
    /// Create an idle signal.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SignalState {
                    generation: 0,
                    phase: Phase::Idle,
                }),
                fired: Condvar::new(),
            }),
        }
    }

    /// Arm the signal for a new render and hand out its completion handle.
    pub fn arm(&self) -> RenderCompletion {
        let mut st = self.shared.state.lock();
        st.generation = st.generation.wrapping_add(1);
        st.phase = Phase::Pending;
        RenderCompletion {
            shared: Arc::clone(&self.shared),
            generation: st.generation,
            fired: false,
        }
    }

    /// Cancel the pending render, if any. Returns `true` when this call released the wait.
    pub fn cancel(&self) -> bool {
        self.shared.fire(None, RenderOutcome::Cancelled)
    }

    /// A weak cancel handle that does not keep the signal alive.
    pub fn canceller(&self) -> RenderCanceller {
        RenderCanceller {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Return `true` while a render is armed and not yet fired.
    pub fn is_pending(&self) -> bool {
        matches!(self.shared.state.lock().phase, Phase::Pending)
    }

    /// Block until the armed render is fired or `timeout` elapses.
    ///
    /// The signal is idle again when this returns. Waiting on an idle signal returns
    /// [`RenderOutcome::Cancelled`] immediately.
    pub fn wait(&self, timeout: Option<Duration>) -> RenderOutcome {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut st = self.shared.state.lock();
        loop {
            if let Some(outcome) = st.settle() {
                return outcome;
            }
            match deadline {
                Some(deadline) => {
                    if self.shared.fired.wait_until(&mut st, deadline).timed_out() {
                        return match st.settle() {
                            Some(outcome) => outcome,
                            None => {
                                st.phase = Phase::Idle;
                                RenderOutcome::TimedOut
                            }
                        };
                    }
                }
                None => self.shared.fired.wait(&mut st),
            }
        }
    }
}

/// One-shot completion handle given to the content engine with each render request.
///
/// Dropping it without calling [`RenderCompletion::complete`] or [`RenderCompletion::fail`]
/// releases the waiting thread with a failure outcome.
#[derive(Debug)]
pub struct RenderCompletion {
    shared: Arc<Shared>,
    generation: u64,
    fired: bool,
}

impl RenderCompletion {
    /// Report a finished frame. Returns `true` if this released the wait.
    pub fn complete(mut self) -> bool {
        self.fired = true;
        self.shared
            .fire(Some(self.generation), RenderOutcome::Completed)
    }

    /// Report an engine failure. Returns `true` if this released the wait.
    pub fn fail(mut self, reason: impl Into<String>) -> bool {
        self.fired = true;
        self.shared
            .fire(Some(self.generation), RenderOutcome::Failed(reason.into()))
    }

    /// Render generation this handle belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for RenderCompletion {
    fn drop(&mut self) {
        if !self.fired {
            self.shared.fire(
                Some(self.generation),
                RenderOutcome::Failed("content dropped the render completion".to_string()),
            );
        }
    }
}

/// Cancel handle held by consumer-stop listeners.
#[derive(Clone, Debug)]
pub struct RenderCanceller {
    shared: Weak<Shared>,
}

impl RenderCanceller {
    /// Cancel the pending render, if the signal still exists and a render is armed.
    pub fn cancel(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.fire(None, RenderOutcome::Cancelled))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/handshake.rs"]
mod tests;
