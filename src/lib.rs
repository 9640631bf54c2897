//! Asend: allocation-free sender/receiver composition with exactly-once completion.
//!
//! # Overview
//!
//! Asend is the composition core of a structured async stack. It defines the
//! protocol every asynchronous operation obeys and the combinator rules that
//! build chains of work on top of it, without heap allocation, virtual
//! dispatch, or a mandatory scheduler.
//!
//! # Core Guarantees
//!
//! - **Exactly-once completion**: a receiver sees one of value, error or done,
//!   once. Channels consume the receiver, so "at most once" is checked by the
//!   compiler; "at least once" is each operation's obligation.
//! - **Static outcome sets**: every sender declares its success shapes and
//!   error kinds as types; combinators compute theirs from their inputs.
//! - **Captured failures**: a panic or explicit failure inside user code in
//!   the completion path becomes a [`CapturedError`] on the error channel and
//!   never unwinds past the protocol boundary.
//! - **Zero-cost composition**: composing is a type transformation plus a
//!   thin forwarding receiver.
//!
//! # Module Structure
//!
//! - [`types`]: Type-level outcome lists, blocking classification, outcomes
//! - [`receiver`]: Receiver channels and query forwarding
//! - [`sender`]: Sender, connect, and operation state
//! - [`invoke`]: Invocation of user functions with failure capture
//! - [`combinator`]: The transform combinator and inline senders
//! - [`context`]: Execution contexts (a new-thread context)
//! - [`stop`]: Stop tokens observed by cancellable senders
//! - [`sync_wait`]: Blocking driver that waits for a completion
//! - [`trace`]: Continuation-chain introspection
//! - [`config`]: Configuration with environment and file overrides
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```
//! use asend::{just, sync_wait, Outcome, SenderExt};
//!
//! let doubled = just(5).transform(|x: i32| x * 2);
//! let outcome: Outcome<i32, asend::CapturedError> = sync_wait(doubled).unwrap();
//! assert!(matches!(outcome, Outcome::Ok(10)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod combinator;
pub mod config;
pub mod context;
pub mod error;
pub mod invoke;
pub mod receiver;
pub mod sender;
pub mod stop;
pub mod sync_wait;
pub mod trace;
pub mod tracing_compat;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use combinator::{just, just_done, just_error, transform, SenderExt, Transform, TransformReceiver};
pub use config::{ConfigError, CoreConfig, ThreadConfig, TraceConfig, WaitConfig};
pub use context::{on_new_thread, on_new_thread_with};
pub use error::{CapturedError, Error, ErrorKind, PanicPayload, Result};
pub use invoke::{fallible, Fallible, Invoke};
pub use receiver::{ErrorReceiver, ExecutionContext, Query, Queryable, Receiver, ValueReceiver};
pub use sender::{connect, Connect, OperationState, Sender};
pub use stop::{StopSource, StopToken};
pub use sync_wait::{sync_wait, sync_wait_with, SyncWaitReceiver};
pub use trace::{async_trace, async_trace_with, Continuation, ContinuationInfo, TraceEntry};
pub use types::{
    Blocking, Cons, DomainErrors, ErrorKinds, Nil, Outcome, OutcomeError, TypeList, WithCaptured,
};
