#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! mod common;
//! use common::*;
//! ```

use asend::{
    Continuation, ErrorReceiver, ExecutionContext, Receiver, StopToken, ValueReceiver,
};
use parking_lot::Mutex;
use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use std::marker::PhantomData;
use std::panic;
use std::sync::{Arc, Once};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();
static PANIC_HOOK_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Default seed for property tests when running under CI.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED_5EED;

const PROPTEST_SEED_ENV: &str = "ASEND_PROPTEST_SEED";
const PROPTEST_MAX_SHRINK_ITERS_ENV: &str = "ASEND_PROPTEST_MAX_SHRINK_ITERS";

/// Configuration for property tests with optional deterministic seed support.
#[derive(Debug, Clone)]
pub struct PropertyTestConfig {
    /// Fixed seed for reproducibility (overrides CI default when set).
    pub seed: Option<u64>,
    /// Number of successful cases required.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl PropertyTestConfig {
    /// Build a config with defaults for property tests.
    #[must_use]
    pub fn new(cases: u32) -> Self {
        Self {
            seed: read_proptest_seed(),
            cases,
            max_shrink_iters: read_max_shrink_iters()
                .unwrap_or(ProptestConfig::default().max_shrink_iters),
        }
    }

    /// Convert into a ProptestConfig, applying deterministic seed rules.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        let mut config = ProptestConfig::with_cases(self.cases);

        // Honor an explicit PROPTEST_RNG_SEED, otherwise apply our own.
        if matches!(config.rng_seed, RngSeed::Random) {
            if let Some(seed) = self.seed {
                config.rng_seed = RngSeed::Fixed(seed);
            }
        }

        config.max_shrink_iters = self.max_shrink_iters;
        config
    }
}

/// Build a ProptestConfig with deterministic seed support for CI.
#[must_use]
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    PropertyTestConfig::new(cases).to_proptest_config()
}

fn read_proptest_seed() -> Option<u64> {
    if let Ok(value) = std::env::var(PROPTEST_SEED_ENV) {
        return value.parse::<u64>().ok();
    }

    // CI without an explicit seed runs with a fixed one.
    if std::env::var("CI").is_ok() {
        return Some(DEFAULT_PROPTEST_SEED);
    }

    None
}

fn read_max_shrink_iters() -> Option<u32> {
    std::env::var(PROPTEST_MAX_SHRINK_ITERS_ENV)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
}

/// Initialize test logging with trace-level output.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Runs `f` with the panic hook silenced, for tests that panic on purpose.
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

/// Compiles only when `A` and `B` are the same type.
pub fn assert_same_type<A>(_: PhantomData<A>, _: PhantomData<A>) {}

/// A channel observed by a [`Probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired<V, E> {
    /// `set_value`.
    Value(V),
    /// `set_error`.
    Error(E),
    /// `set_done`.
    Done,
}

/// Shared view of what a [`Probe`] saw.
pub struct ProbeLog<V, E> {
    fired: Arc<Mutex<Vec<Fired<V, E>>>>,
}

impl<V, E> Clone for ProbeLog<V, E> {
    fn clone(&self) -> Self {
        Self {
            fired: Arc::clone(&self.fired),
        }
    }
}

impl<V: Clone, E: Clone> ProbeLog<V, E> {
    /// Everything that fired, in order.
    pub fn fired(&self) -> Vec<Fired<V, E>> {
        self.fired.lock().clone()
    }

    /// The single completion; panics on zero or several.
    #[track_caller]
    pub fn single(&self) -> Fired<V, E> {
        let fired = self.fired.lock();
        assert_eq!(fired.len(), 1, "expected exactly one completion");
        fired[0].clone()
    }
}

impl<V, E> ProbeLog<V, E> {
    /// Number of completions.
    pub fn count(&self) -> usize {
        self.fired.lock().len()
    }
}

/// Receiver that records every completion it is given.
pub struct Probe<V, E> {
    log: ProbeLog<V, E>,
    stop_token: StopToken,
    _types: PhantomData<fn(V, E)>,
}

impl<V, E> Probe<V, E> {
    /// Creates a probe and the log it writes to.
    pub fn new() -> (Self, ProbeLog<V, E>) {
        let log = ProbeLog {
            fired: Arc::new(Mutex::new(Vec::new())),
        };
        let probe = Self {
            log: log.clone(),
            stop_token: StopToken::never(),
            _types: PhantomData,
        };
        (probe, log)
    }

    /// Reports `token` as the stop token.
    #[must_use]
    pub fn with_stop_token(mut self, token: StopToken) -> Self {
        self.stop_token = token;
        self
    }

    fn push(self, fired: Fired<V, E>) {
        self.log.fired.lock().push(fired);
    }
}

impl<V, E> Receiver for Probe<V, E> {
    fn set_done(self) {
        self.push(Fired::Done);
    }

    fn stop_token(&self) -> StopToken {
        self.stop_token.clone()
    }

    fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::CurrentThread
    }
}

impl<V, E, X: Into<V>> ValueReceiver<X> for Probe<V, E> {
    fn set_value(self, value: X) {
        self.push(Fired::Value(value.into()));
    }
}

impl<V, E, X: Into<E>> ErrorReceiver<X> for Probe<V, E> {
    fn set_error(self, error: X) {
        self.push(Fired::Error(error.into()));
    }
}

impl<V, E> Continuation for Probe<V, E> {}

/// Log a test phase transition.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log test completion.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}
