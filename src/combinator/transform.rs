//! The transform combinator.
//!
//! `transform(pred, f)` is a sender that completes with `f(v)` whenever
//! `pred` completes with `v`. Errors and cancellation from `pred` pass
//! through untouched and `f` is not called for them.
//!
//! # Outcome sets
//!
//! | | Declared |
//! |---|---|
//! | Values | each shape `V` of `pred` mapped to `<F as Invoke<V>>::Output` |
//! | Errors | domain errors of `pred`, plus [`CapturedError`] |
//!
//! The captured kind is declared whether or not `f` can fail. If `f` panics,
//! or returns `Err` through [`fallible`](crate::fallible), the failure is
//! delivered once through the downstream error channel.
//!
//! # Operation
//!
//! Binding a transform binds `pred` to a [`TransformReceiver`] wrapping `f`
//! and the downstream receiver. The predecessor's operation is the
//! transform's operation: composing adds no state beyond `f` itself.

use crate::error::CapturedError;
use crate::invoke::{Invoke, MapInvoke};
use crate::receiver::{
    ErrorReceiver, ExecutionContext, Query, Queryable, Receiver, ValueReceiver,
};
use crate::sender::{Connect, Sender};
use crate::stop::StopToken;
use crate::trace::Continuation;
use crate::tracing_compat::debug;
use crate::types::{Blocking, ErrorKinds, WithCaptured};

/// Sender returned by [`transform`].
///
/// # Binds
///
/// | Bound as | Predecessor bound as | Function must implement |
/// |---|---|---|
/// | `Transform<P, F>` | `P` | `F: Invoke<V>` |
/// | `&mut Transform<P, F>` | `&mut P` | `&mut F: Invoke<V>` |
/// | `&Transform<P, F>` | `&P` | `&F: Invoke<V>` |
///
/// Closures get the borrowed impls for free: `&F` is callable when `F: Fn`
/// and `&mut F` when `F: FnMut`. A user type implementing [`Invoke`] by
/// value, as multi-shape functions do, supports only the consuming bind
/// unless it also implements `Invoke` for `&Self` or `&mut Self`.
#[derive(Debug, Clone)]
pub struct Transform<P, F> {
    pred: P,
    func: F,
}

/// Composes `pred` with `func`.
///
/// Nothing runs until the returned sender is bound and started.
///
/// ```
/// use asend::{just, sync_wait, transform, CapturedError, Outcome};
///
/// let greeting = transform(just("world"), |name: &str| format!("hello {name}"));
/// let outcome: Outcome<String, CapturedError> = sync_wait(greeting).unwrap();
/// assert!(matches!(outcome, Outcome::Ok(ref s) if s == "hello world"));
/// ```
pub fn transform<P, F>(pred: P, func: F) -> Transform<P, F> {
    Transform { pred, func }
}

impl<P, F> Transform<P, F> {
    /// Returns the predecessor.
    pub fn predecessor(&self) -> &P {
        &self.pred
    }

    /// Splits the sender into predecessor and function.
    pub fn into_parts(self) -> (P, F) {
        (self.pred, self.func)
    }
}

impl<P, F> Sender for Transform<P, F>
where
    P: Sender,
    P::Values: MapInvoke<F>,
{
    type Values = <P::Values as MapInvoke<F>>::Output;
    type Errors = WithCaptured<<P::Errors as ErrorKinds>::Domain>;

    fn blocking(&self) -> Blocking {
        self.pred.blocking()
    }
}

impl<P, F, R> Connect<R> for Transform<P, F>
where
    P: Connect<TransformReceiver<R, F>>,
    P::Values: MapInvoke<F>,
{
    type Operation = P::Operation;

    fn connect(self, receiver: R) -> Self::Operation {
        self.pred.connect(TransformReceiver::new(self.func, receiver))
    }
}

impl<'a, P, F, R> Connect<R> for &'a mut Transform<P, F>
where
    P: Sender,
    P::Values: MapInvoke<F>,
    &'a mut P: Connect<TransformReceiver<R, &'a mut F>>,
{
    type Operation = <&'a mut P as Connect<TransformReceiver<R, &'a mut F>>>::Operation;

    fn connect(self, receiver: R) -> Self::Operation {
        let Transform { pred, func } = self;
        pred.connect(TransformReceiver::new(func, receiver))
    }
}

impl<'a, P, F, R> Connect<R> for &'a Transform<P, F>
where
    P: Sender,
    P::Values: MapInvoke<F>,
    &'a P: Connect<TransformReceiver<R, &'a F>>,
{
    type Operation = <&'a P as Connect<TransformReceiver<R, &'a F>>>::Operation;

    fn connect(self, receiver: R) -> Self::Operation {
        self.pred
            .connect(TransformReceiver::new(&self.func, receiver))
    }
}

/// Receiver bound to the predecessor of a [`Transform`].
///
/// Applies the function to a value and relays every completion to the
/// downstream receiver. Queries are answered by the downstream receiver.
#[derive(Debug)]
pub struct TransformReceiver<R, F> {
    func: F,
    receiver: R,
}

impl<R, F> TransformReceiver<R, F> {
    /// Wraps `func` in front of `receiver`.
    pub fn new(func: F, receiver: R) -> Self {
        Self { func, receiver }
    }

    /// Returns the downstream receiver.
    pub fn downstream(&self) -> &R {
        &self.receiver
    }
}

impl<R: Receiver, F> Receiver for TransformReceiver<R, F> {
    fn set_done(self) {
        self.receiver.set_done();
    }

    fn stop_token(&self) -> StopToken {
        self.receiver.stop_token()
    }

    fn execution_context(&self) -> ExecutionContext {
        self.receiver.execution_context()
    }
}

impl<R, F, V> ValueReceiver<V> for TransformReceiver<R, F>
where
    F: Invoke<V>,
    R: ValueReceiver<F::Output> + ErrorReceiver<CapturedError>,
{
    fn set_value(self, value: V) {
        let Self { func, receiver } = self;
        match func.invoke(value) {
            Ok(output) => receiver.set_value(output),
            Err(captured) => {
                debug!(
                    function = core::any::type_name::<F>(),
                    error = %captured,
                    "transform function failed; completing with captured error"
                );
                receiver.set_error(captured);
            }
        }
    }
}

impl<R, F, E> ErrorReceiver<E> for TransformReceiver<R, F>
where
    R: ErrorReceiver<E>,
{
    fn set_error(self, error: E) {
        self.receiver.set_error(error);
    }
}

impl<R, F, Q> Queryable<Q> for TransformReceiver<R, F>
where
    Q: Query,
    R: Queryable<Q>,
{
    fn query(&self, query: &Q) -> Q::Output {
        self.receiver.query(query)
    }
}

impl<R: Continuation, F> Continuation for TransformReceiver<R, F> {
    fn is_transparent(&self) -> bool {
        true
    }

    fn visit_continuations(&self, visit: &mut dyn FnMut(&dyn Continuation)) {
        visit(&self.receiver);
    }
}
