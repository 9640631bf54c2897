//! A context that runs work on a freshly spawned OS thread.
//!
//! [`on_new_thread`] is a sender whose operation spawns one thread per
//! start. The receiver completes from that thread:
//!
//! - `set_value(f())` when `f` returns
//! - `set_error(CapturedError)` when `f` panics or the thread cannot be
//!   spawned
//! - `set_done()` when the receiver's stop token was triggered before `f`
//!   ran
//!
//! `start` returns without waiting, so [`Sender::blocking`] is
//! [`Blocking::Never`].
//!
//! # Spawn failures
//!
//! `std::thread::Builder::spawn` consumes its closure even when it fails.
//! The function and receiver therefore live in a shared slot that the
//! worker takes on entry; if spawning fails the starting thread takes them
//! back and delivers the error itself. Either way exactly one side finds the
//! slot full.

use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::config::ThreadConfig;
use crate::error::CapturedError;
use crate::receiver::{ErrorReceiver, ExecutionContext, ValueReceiver};
use crate::sender::{Connect, OperationState, Sender};
use crate::tracing_compat::{debug, debug_span, trace, warn};
use crate::types::{Blocking, Cons, Nil, WithCaptured};

static NEXT_WORKER: AtomicU64 = AtomicU64::new(0);

/// Sender returned by [`on_new_thread`].
#[derive(Debug, Clone)]
pub struct ThreadSender<F> {
    func: F,
    config: ThreadConfig,
}

/// Runs `func` on a new thread with the default [`ThreadConfig`].
///
/// ```
/// use asend::{on_new_thread, sync_wait, CapturedError, Outcome};
///
/// let outcome: Outcome<i32, CapturedError> = sync_wait(on_new_thread(|| 6 * 7)).unwrap();
/// assert!(matches!(outcome, Outcome::Ok(42)));
/// ```
pub fn on_new_thread<F, T>(func: F) -> ThreadSender<F>
where
    F: FnOnce() -> T,
{
    on_new_thread_with(func, ThreadConfig::default())
}

/// Runs `func` on a new thread configured by `config`.
pub fn on_new_thread_with<F, T>(func: F, config: ThreadConfig) -> ThreadSender<F>
where
    F: FnOnce() -> T,
{
    ThreadSender { func, config }
}

impl<F> ThreadSender<F> {
    /// Where completions of this sender run.
    pub fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::NewThread
    }

    /// The thread configuration used on start.
    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }
}

impl<F, T> Sender for ThreadSender<F>
where
    F: FnOnce() -> T,
{
    type Values = Cons<T, Nil>;
    type Errors = WithCaptured<Nil>;

    fn blocking(&self) -> Blocking {
        Blocking::Never
    }
}

impl<F, T, R> Connect<R> for ThreadSender<F>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
    R: ValueReceiver<T> + ErrorReceiver<CapturedError> + Send + 'static,
{
    type Operation = ThreadOperation<F, R>;

    fn connect(self, receiver: R) -> Self::Operation {
        ThreadOperation {
            pending: Some((self.func, receiver)),
            config: self.config,
            handle: None,
        }
    }
}

type Slot<F, R> = Arc<Mutex<Option<(F, R)>>>;

/// Operation of [`on_new_thread`].
#[derive(Debug)]
pub struct ThreadOperation<F, R> {
    pending: Option<(F, R)>,
    config: ThreadConfig,
    handle: Option<JoinHandle<()>>,
}

impl<F, R> ThreadOperation<F, R> {
    /// Waits for the worker thread, if one was spawned.
    ///
    /// Returns true if a thread was joined. The receiver has completed by
    /// the time this returns true.
    pub fn join(&mut self) -> bool {
        match self.handle.take() {
            // the worker catches panics from `f`, so a join error can only
            // come from the receiver itself
            Some(handle) => {
                if handle.join().is_err() {
                    warn!("worker thread panicked while completing its receiver");
                }
                true
            }
            None => false,
        }
    }
}

impl<F, T, R> OperationState for ThreadOperation<F, R>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
    R: ValueReceiver<T> + ErrorReceiver<CapturedError> + Send + 'static,
{
    fn start(&mut self) {
        let Some((func, receiver)) = self.pending.take() else {
            warn!("thread operation started twice; ignoring");
            return;
        };

        let name = format!(
            "{}-{}",
            self.config.name_prefix,
            NEXT_WORKER.fetch_add(1, Ordering::Relaxed)
        );
        trace!(
            thread = %name,
            receiver_context = %receiver.execution_context(),
            "spawning worker thread"
        );

        let slot: Slot<F, R> = Arc::new(Mutex::new(Some((func, receiver))));
        let worker_slot = Arc::clone(&slot);
        let mut builder = thread::Builder::new().name(name);
        if let Some(size) = self.config.stack_size {
            builder = builder.stack_size(size);
        }

        match builder.spawn(move || run_worker(&worker_slot)) {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => deliver_spawn_failure(&slot, err),
        }
    }
}

fn run_worker<F, T, R>(slot: &Mutex<Option<(F, R)>>)
where
    F: FnOnce() -> T,
    R: ValueReceiver<T> + ErrorReceiver<CapturedError>,
{
    let taken = slot.lock().take();
    let Some((func, receiver)) = taken else {
        return;
    };
    let _span = debug_span!("asend.worker").entered();

    if receiver.stop_token().stop_requested() {
        trace!("stop requested before worker ran; completing with done");
        receiver.set_done();
        return;
    }

    match catch_unwind(AssertUnwindSafe(func)) {
        Ok(value) => receiver.set_value(value),
        Err(payload) => {
            let captured = CapturedError::from_panic(payload);
            debug!(error = %captured, "worker function panicked");
            receiver.set_error(captured);
        }
    }
}

fn deliver_spawn_failure<F, R>(slot: &Mutex<Option<(F, R)>>, err: io::Error)
where
    R: ErrorReceiver<CapturedError>,
{
    let taken = slot.lock().take();
    if let Some((_func, receiver)) = taken {
        warn!(error = %err, "failed to spawn worker thread");
        receiver.set_error(CapturedError::from_error(err));
    }
}
