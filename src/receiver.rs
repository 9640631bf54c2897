//! Receivers: one-shot consumers of a single completion.
//!
//! A receiver exposes three channels:
//!
//! - [`ValueReceiver::set_value`]: success, carrying one success shape
//! - [`ErrorReceiver::set_error`]: failure, carrying one error kind
//! - [`Receiver::set_done`]: cancellation
//!
//! Every channel consumes the receiver. Once one has fired the receiver no
//! longer exists, so a second completion does not type-check. A receiver
//! implements `ValueReceiver<V>` once per shape it accepts and
//! `ErrorReceiver<E>` once per error kind it accepts.
//!
//! # Queries
//!
//! Besides its channels a receiver answers queries about its environment.
//! [`Receiver::stop_token`] and [`Receiver::execution_context`] are built in;
//! any component may add more by defining a [`Query`] type and implementing
//! [`Queryable`]. Adapters that wrap a receiver forward every query to the
//! receiver they wrap.

use core::fmt;

use crate::error::CapturedError;
use crate::stop::StopToken;
use crate::types::{Cons, DomainErrors, Nil, WithCaptured};

/// Where a receiver expects its completion to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionContext {
    /// No affinity.
    #[default]
    Unspecified,
    /// The thread that started the operation.
    CurrentThread,
    /// A thread created for the operation.
    NewThread,
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, "unspecified"),
            Self::CurrentThread => write!(f, "current-thread"),
            Self::NewThread => write!(f, "new-thread"),
        }
    }
}

/// The cancellation channel and built-in queries shared by every receiver.
pub trait Receiver: Sized {
    /// Completes with cancellation.
    fn set_done(self);

    /// Returns the stop token the operation should observe.
    fn stop_token(&self) -> StopToken {
        StopToken::never()
    }

    /// Returns the execution context the receiver expects to complete on.
    fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::Unspecified
    }
}

/// The value channel for one success shape.
pub trait ValueReceiver<V>: Receiver {
    /// Completes with a value.
    fn set_value(self, value: V);
}

/// The error channel for one error kind.
pub trait ErrorReceiver<E>: Receiver {
    /// Completes with an error.
    fn set_error(self, error: E);
}

/// A query a receiver may answer.
pub trait Query {
    /// The answer type.
    type Output;
}

/// Answers query `Q`.
pub trait Queryable<Q: Query> {
    /// Returns the answer to `query`.
    fn query(&self, query: &Q) -> Q::Output;
}

/// Implemented by a shape list when `R` has a value channel for every shape.
pub trait ValueChannels<R> {}

impl<R> ValueChannels<R> for Nil {}

impl<R, H, T> ValueChannels<R> for Cons<H, T>
where
    R: ValueReceiver<H>,
    T: ValueChannels<R>,
{
}

/// Implemented by an error list or descriptor when `R` has an error channel
/// for every kind.
pub trait ErrorChannels<R> {}

impl<R> ErrorChannels<R> for Nil {}

impl<R, H, T> ErrorChannels<R> for Cons<H, T>
where
    R: ErrorReceiver<H>,
    T: ErrorChannels<R>,
{
}

impl<R, L: ErrorChannels<R>> ErrorChannels<R> for DomainErrors<L> {}

impl<R, L> ErrorChannels<R> for WithCaptured<L>
where
    R: ErrorReceiver<CapturedError>,
    L: ErrorChannels<R>,
{
}
