//! Test utilities for unit tests.
//!
//! - Consistent tracing-based logging initialization
//! - A recording receiver that logs every completion it sees
//! - Panic-hook silencing for tests that panic on purpose

use std::marker::PhantomData;
use std::panic;
use std::sync::{Arc, Once};

use parking_lot::{Mutex, MutexGuard};

use crate::receiver::{ErrorReceiver, ExecutionContext, Receiver, ValueReceiver};
use crate::stop::StopToken;
use crate::trace::Continuation;

static INIT_LOGGING: Once = Once::new();
static PANIC_HOOK_LOCK: Mutex<()> = parking_lot::const_mutex(());
static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Serializes tests that mutate process environment variables.
pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock()
}

/// Log the start of a test phase.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
    };
}

/// Log test completion.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}

/// Log before asserting, for context in failing runs.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// Runs `f` with the panic hook silenced.
pub fn quiet_panics<R>(f: impl FnOnce() -> R) -> R {
    let _guard = PANIC_HOOK_LOCK.lock();
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = panic::catch_unwind(panic::AssertUnwindSafe(f));
    panic::set_hook(hook);
    match result {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// A completion observed by a [`RecordingReceiver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<V, E> {
    /// `set_value` fired.
    Value(V),
    /// `set_error` fired.
    Error(E),
    /// `set_done` fired.
    Done,
}

/// Shared log of completions.
pub struct CompletionLog<V, E> {
    entries: Arc<Mutex<Vec<Completion<V, E>>>>,
}

impl<V, E> Clone for CompletionLog<V, E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V: Clone, E: Clone> CompletionLog<V, E> {
    /// All completions, in order.
    pub fn completions(&self) -> Vec<Completion<V, E>> {
        self.entries.lock().clone()
    }

    /// The single completion.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one completion was recorded.
    #[track_caller]
    pub fn single(&self) -> Completion<V, E> {
        let entries = self.entries.lock();
        assert_eq!(entries.len(), 1, "expected exactly one completion");
        entries[0].clone()
    }
}

impl<V, E> CompletionLog<V, E> {
    /// Number of completions.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing completed.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// A receiver that records its completion into a [`CompletionLog`].
pub struct RecordingReceiver<V, E> {
    log: CompletionLog<V, E>,
    stop_token: StopToken,
    context: ExecutionContext,
    _types: PhantomData<fn(V, E)>,
}

impl<V, E> RecordingReceiver<V, E> {
    /// Creates a receiver and the log it writes to.
    pub fn new() -> (Self, CompletionLog<V, E>) {
        let log = CompletionLog {
            entries: Arc::new(Mutex::new(Vec::new())),
        };
        let receiver = Self {
            log: log.clone(),
            stop_token: StopToken::never(),
            context: ExecutionContext::Unspecified,
            _types: PhantomData,
        };
        (receiver, log)
    }

    /// Sets the stop token reported by the receiver.
    #[must_use]
    pub fn with_stop_token(mut self, token: StopToken) -> Self {
        self.stop_token = token;
        self
    }

    /// Sets the execution context reported by the receiver.
    #[must_use]
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    fn record(self, completion: Completion<V, E>) {
        self.log.entries.lock().push(completion);
    }
}

impl<V, E> Receiver for RecordingReceiver<V, E> {
    fn set_done(self) {
        self.record(Completion::Done);
    }

    fn stop_token(&self) -> StopToken {
        self.stop_token.clone()
    }

    fn execution_context(&self) -> ExecutionContext {
        self.context
    }
}

impl<V, E, X: Into<V>> ValueReceiver<X> for RecordingReceiver<V, E> {
    fn set_value(self, value: X) {
        self.record(Completion::Value(value.into()));
    }
}

impl<V, E, X: Into<E>> ErrorReceiver<X> for RecordingReceiver<V, E> {
    fn set_error(self, error: X) {
        self.record(Completion::Error(error.into()));
    }
}

impl<V, E> Continuation for RecordingReceiver<V, E> {}
