//! Senders, binding, and operation state.
//!
//! A [`Sender`] describes work that has not started. It declares what it can
//! produce ([`Sender::Values`], [`Sender::Errors`]) and how waiting on it
//! behaves ([`Sender::blocking`]). Binding it to a receiver with
//! [`Connect::connect`] yields an [`OperationState`]; calling
//! [`OperationState::start`] runs the work, which completes the receiver
//! exactly once.
//!
//! # Ownership variants
//!
//! `Connect` may be implemented three ways for one sender type:
//!
//! | Implemented for | Operation holds                     | Caller obligation          |
//! |-----------------|-------------------------------------|----------------------------|
//! | `S`             | state moved out of the sender       | none                       |
//! | `&'a mut S`     | state mutably borrowed for `'a`     | sender outlives operation  |
//! | `&'a S`         | state shared-borrowed for `'a`      | sender outlives operation  |
//!
//! The borrow checker enforces the obligation for the borrowing variants.

use crate::receiver::{ErrorChannels, Receiver, ValueChannels};
use crate::tracing_compat::trace;
use crate::types::{Blocking, ErrorKinds, TypeList};

/// A description of not-yet-started asynchronous work.
pub trait Sender {
    /// Every success shape the sender may complete with.
    type Values: TypeList;

    /// Every error kind the sender may complete with.
    type Errors: ErrorKinds;

    /// Whether waiting on this sender's operation blocks the caller.
    fn blocking(&self) -> Blocking {
        Blocking::Maybe
    }
}

impl<S: Sender + ?Sized> Sender for &S {
    type Values = S::Values;
    type Errors = S::Errors;

    fn blocking(&self) -> Blocking {
        (**self).blocking()
    }
}

impl<S: Sender + ?Sized> Sender for &mut S {
    type Values = S::Values;
    type Errors = S::Errors;

    fn blocking(&self) -> Blocking {
        (**self).blocking()
    }
}

/// Binds a sender to receiver type `R`.
pub trait Connect<R>: Sender {
    /// The operation produced by binding.
    type Operation: OperationState;

    /// Binds the sender to `receiver`. Nothing runs until the operation is
    /// started.
    fn connect(self, receiver: R) -> Self::Operation;
}

/// The state of a bound sender.
pub trait OperationState {
    /// Starts the work. Completion may happen before this returns, on
    /// another thread, or later from a callback.
    ///
    /// Starting an operation a second time must not complete its receiver
    /// again.
    fn start(&mut self);
}

/// Binds `sender` to `receiver`, checking that the receiver accepts every
/// declared outcome.
///
/// Fails to compile if `receiver` lacks a value channel for one of the
/// sender's shapes or an error channel for one of its error kinds.
pub fn connect<S, R>(sender: S, receiver: R) -> S::Operation
where
    S: Connect<R>,
    R: Receiver,
    S::Values: ValueChannels<R>,
    S::Errors: ErrorChannels<R>,
{
    trace!(
        sender = core::any::type_name::<S>(),
        blocking = %sender.blocking(),
        "connecting sender"
    );
    sender.connect(receiver)
}

/// Binds and starts in one step, returning the started operation.
///
/// The returned operation must be kept alive until completion when the
/// sender completes asynchronously from it.
pub fn start<S, R>(sender: S, receiver: R) -> S::Operation
where
    S: Connect<R>,
    R: Receiver,
    S::Values: ValueChannels<R>,
    S::Errors: ErrorChannels<R>,
{
    let mut op = connect(sender, receiver);
    op.start();
    op
}
