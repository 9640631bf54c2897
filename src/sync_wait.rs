//! Blocking driver: run a sender to completion on the calling thread.
//!
//! [`sync_wait`] binds the sender to a [`SyncWaitReceiver`], starts the
//! operation and parks the caller until the receiver completes. The
//! completion comes back as an [`Outcome`]:
//!
//! | Channel | Outcome |
//! |---------|---------|
//! | `set_value(v)` | `Outcome::Ok(v)` |
//! | `set_error(e)` | `Outcome::Err(e)` |
//! | `set_done()` | `Outcome::Cancelled` |
//!
//! Driver failures are reported separately, as [`Error`]:
//!
//! - [`ErrorKind::Abandoned`] when the receiver is dropped without any
//!   channel firing (an operation broke the exactly-once contract)
//! - [`ErrorKind::WaitTimeout`] when [`sync_wait_with`] gives up
//!
//! The completion may arrive on any thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::config::WaitConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::receiver::{
    ErrorChannels, ErrorReceiver, ExecutionContext, Receiver, ValueChannels, ValueReceiver,
};
use crate::sender::{connect, Connect, OperationState};
use crate::stop::StopToken;
use crate::trace::Continuation;
use crate::tracing_compat::{debug, warn};
use crate::types::Outcome;

enum State<V, E> {
    Waiting,
    Finished(Outcome<V, E>),
    Abandoned,
}

struct Shared<V, E> {
    state: Mutex<State<V, E>>,
    ready: Condvar,
}

impl<V, E> Shared<V, E> {
    fn new() -> Self {
        Self {
            state: Mutex::new(State::Waiting),
            ready: Condvar::new(),
        }
    }

    fn finish(&self, next: State<V, E>) {
        {
            let mut state = self.state.lock();
            if matches!(*state, State::Waiting) {
                *state = next;
            }
        }
        self.ready.notify_all();
    }

    fn wait(&self, timeout: Option<Duration>) -> Result<Outcome<V, E>> {
        // A timeout too large to represent as an instant waits forever.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.state.lock();
        loop {
            match std::mem::replace(&mut *state, State::Waiting) {
                State::Finished(outcome) => return Ok(outcome),
                State::Abandoned => {
                    return Err(Error::new(ErrorKind::Abandoned)
                        .with_message("receiver dropped without completing"));
                }
                State::Waiting => {}
            }
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        debug!(timeout_ms = ?timeout.map(|t| t.as_millis()), "sync_wait timed out");
                        return Err(Error::new(ErrorKind::WaitTimeout)
                            .with_message("no completion before the deadline"));
                    }
                    let _ = self.ready.wait_until(&mut state, deadline);
                }
                None => self.ready.wait(&mut state),
            }
        }
    }
}

/// Receiver used by [`sync_wait`].
///
/// Accepts any value convertible into `V` and any error convertible into
/// `E`. Dropping it without completing wakes the waiter with
/// [`ErrorKind::Abandoned`].
pub struct SyncWaitReceiver<V, E> {
    shared: Option<Arc<Shared<V, E>>>,
    stop_token: StopToken,
}

impl<V, E> SyncWaitReceiver<V, E> {
    fn complete(mut self, outcome: Outcome<V, E>) {
        if let Some(shared) = self.shared.take() {
            shared.finish(State::Finished(outcome));
        }
    }
}

impl<V, E> Drop for SyncWaitReceiver<V, E> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            warn!("sync_wait receiver dropped without completion");
            shared.finish(State::Abandoned);
        }
    }
}

impl<V, E> core::fmt::Debug for SyncWaitReceiver<V, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncWaitReceiver")
            .field("pending", &self.shared.is_some())
            .field("stop_token", &self.stop_token)
            .finish()
    }
}

impl<V, E> Receiver for SyncWaitReceiver<V, E> {
    fn set_done(self) {
        self.complete(Outcome::Cancelled);
    }

    fn stop_token(&self) -> StopToken {
        self.stop_token.clone()
    }

    fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::CurrentThread
    }
}

impl<V, E, X: Into<V>> ValueReceiver<X> for SyncWaitReceiver<V, E> {
    fn set_value(self, value: X) {
        self.complete(Outcome::Ok(value.into()));
    }
}

impl<V, E, X: Into<E>> ErrorReceiver<X> for SyncWaitReceiver<V, E> {
    fn set_error(self, error: X) {
        self.complete(Outcome::Err(error.into()));
    }
}

impl<V, E> Continuation for SyncWaitReceiver<V, E> {}

/// Runs `sender` to completion and returns its outcome.
///
/// Blocks the calling thread until the receiver completes; never times
/// out.
///
/// ```
/// use asend::{just_error, sync_wait, Outcome};
///
/// let outcome: Outcome<(), &str> = sync_wait(just_error("nope")).unwrap();
/// assert_eq!(outcome, Outcome::Err("nope"));
/// ```
pub fn sync_wait<S, V, E>(sender: S) -> Result<Outcome<V, E>>
where
    S: Connect<SyncWaitReceiver<V, E>>,
    S::Values: ValueChannels<SyncWaitReceiver<V, E>>,
    S::Errors: ErrorChannels<SyncWaitReceiver<V, E>>,
{
    sync_wait_with(sender, &WaitConfig::default())
}

/// Like [`sync_wait`], with a timeout and stop token from `config`.
pub fn sync_wait_with<S, V, E>(sender: S, config: &WaitConfig) -> Result<Outcome<V, E>>
where
    S: Connect<SyncWaitReceiver<V, E>>,
    S::Values: ValueChannels<SyncWaitReceiver<V, E>>,
    S::Errors: ErrorChannels<SyncWaitReceiver<V, E>>,
{
    let shared = Arc::new(Shared::new());
    let receiver = SyncWaitReceiver {
        shared: Some(Arc::clone(&shared)),
        stop_token: config.stop_token.clone(),
    };
    let mut op = connect(sender, receiver);
    op.start();
    let outcome = shared.wait(config.timeout);
    drop(op);
    outcome
}
