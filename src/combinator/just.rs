//! Inline senders.
//!
//! [`just`], [`just_error`] and [`just_done`] complete their receiver on the
//! thread that calls `start`, before `start` returns. They are the simplest
//! predecessors a chain can have.
//!
//! All three honour the receiver's stop token: if stop was requested by the
//! time the operation starts, the receiver completes with `set_done`
//! instead.
//!
//! The owned bind moves the payload into the operation. The borrowed binds
//! clone it, so the sender stays usable afterwards.

use crate::receiver::{ErrorReceiver, Receiver, ValueReceiver};
use crate::sender::{Connect, OperationState, Sender};
use crate::tracing_compat::{trace, warn};
use crate::types::{Blocking, Cons, DomainErrors, Nil};

/// A sender completing with a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Just<V> {
    value: V,
}

/// A sender completing with a single domain error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JustError<E> {
    error: E,
}

/// A sender completing with cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JustDone;

/// Creates a sender that completes with `value`.
pub fn just<V>(value: V) -> Just<V> {
    Just { value }
}

/// Creates a sender that completes with `error`.
pub fn just_error<E>(error: E) -> JustError<E> {
    JustError { error }
}

/// Creates a sender that completes with `set_done`.
#[must_use]
pub fn just_done() -> JustDone {
    JustDone
}

impl<V> Sender for Just<V> {
    type Values = Cons<V, Nil>;
    type Errors = DomainErrors<Nil>;

    fn blocking(&self) -> Blocking {
        Blocking::AlwaysInline
    }
}

impl<E> Sender for JustError<E> {
    type Values = Nil;
    type Errors = DomainErrors<Cons<E, Nil>>;

    fn blocking(&self) -> Blocking {
        Blocking::AlwaysInline
    }
}

impl Sender for JustDone {
    type Values = Nil;
    type Errors = DomainErrors<Nil>;

    fn blocking(&self) -> Blocking {
        Blocking::AlwaysInline
    }
}

/// Operation of [`just`].
#[derive(Debug)]
pub struct JustOperation<V, R> {
    pending: Option<(V, R)>,
}

/// Operation of [`just_error`].
#[derive(Debug)]
pub struct JustErrorOperation<E, R> {
    pending: Option<(E, R)>,
}

/// Operation of [`just_done`].
#[derive(Debug)]
pub struct JustDoneOperation<R> {
    pending: Option<R>,
}

/// Takes the pending state for a first start.
///
/// Returns `None` after completing the receiver with `set_done` when stop
/// was requested, or when the operation was already started.
fn begin<T, R: Receiver>(pending: &mut Option<(T, R)>) -> Option<(T, R)> {
    let Some((payload, receiver)) = pending.take() else {
        warn!(
            receiver = core::any::type_name::<R>(),
            "inline operation started twice; ignoring"
        );
        return None;
    };
    if receiver.stop_token().stop_requested() {
        trace!(
            receiver = core::any::type_name::<R>(),
            "stop requested before start; completing with done"
        );
        receiver.set_done();
        return None;
    }
    Some((payload, receiver))
}

impl<V, R> JustOperation<V, R> {
    fn new(value: V, receiver: R) -> Self {
        trace!(value = core::any::type_name::<V>(), "binding just");
        Self {
            pending: Some((value, receiver)),
        }
    }

    /// Returns true once the operation has been started.
    pub fn is_started(&self) -> bool {
        self.pending.is_none()
    }
}

impl<V, R: ValueReceiver<V>> OperationState for JustOperation<V, R> {
    fn start(&mut self) {
        if let Some((value, receiver)) = begin(&mut self.pending) {
            receiver.set_value(value);
        }
    }
}

impl<E, R> JustErrorOperation<E, R> {
    fn new(error: E, receiver: R) -> Self {
        trace!(error = core::any::type_name::<E>(), "binding just_error");
        Self {
            pending: Some((error, receiver)),
        }
    }

    /// Returns true once the operation has been started.
    pub fn is_started(&self) -> bool {
        self.pending.is_none()
    }
}

impl<E, R: ErrorReceiver<E>> OperationState for JustErrorOperation<E, R> {
    fn start(&mut self) {
        if let Some((error, receiver)) = begin(&mut self.pending) {
            receiver.set_error(error);
        }
    }
}

impl<R> JustDoneOperation<R> {
    fn new(receiver: R) -> Self {
        trace!("binding just_done");
        Self {
            pending: Some(receiver),
        }
    }

    /// Returns true once the operation has been started.
    pub fn is_started(&self) -> bool {
        self.pending.is_none()
    }
}

impl<R: Receiver> OperationState for JustDoneOperation<R> {
    fn start(&mut self) {
        match self.pending.take() {
            Some(receiver) => receiver.set_done(),
            None => {
                warn!(
                    receiver = core::any::type_name::<R>(),
                    "inline operation started twice; ignoring"
                );
            }
        }
    }
}

impl<V, R: ValueReceiver<V>> Connect<R> for Just<V> {
    type Operation = JustOperation<V, R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustOperation::new(self.value, receiver)
    }
}

impl<V: Clone, R: ValueReceiver<V>> Connect<R> for &mut Just<V> {
    type Operation = JustOperation<V, R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustOperation::new(self.value.clone(), receiver)
    }
}

impl<V: Clone, R: ValueReceiver<V>> Connect<R> for &Just<V> {
    type Operation = JustOperation<V, R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustOperation::new(self.value.clone(), receiver)
    }
}

impl<E, R: ErrorReceiver<E>> Connect<R> for JustError<E> {
    type Operation = JustErrorOperation<E, R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustErrorOperation::new(self.error, receiver)
    }
}

impl<E: Clone, R: ErrorReceiver<E>> Connect<R> for &mut JustError<E> {
    type Operation = JustErrorOperation<E, R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustErrorOperation::new(self.error.clone(), receiver)
    }
}

impl<E: Clone, R: ErrorReceiver<E>> Connect<R> for &JustError<E> {
    type Operation = JustErrorOperation<E, R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustErrorOperation::new(self.error.clone(), receiver)
    }
}

impl<R: Receiver> Connect<R> for JustDone {
    type Operation = JustDoneOperation<R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustDoneOperation::new(receiver)
    }
}

impl<R: Receiver> Connect<R> for &mut JustDone {
    type Operation = JustDoneOperation<R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustDoneOperation::new(receiver)
    }
}

impl<R: Receiver> Connect<R> for &JustDone {
    type Operation = JustDoneOperation<R>;

    fn connect(self, receiver: R) -> Self::Operation {
        JustDoneOperation::new(receiver)
    }
}
