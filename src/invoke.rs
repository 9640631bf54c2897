//! Invocation of user functions inside a completion path.
//!
//! [`Invoke`] is the single place where user code runs on behalf of a
//! combinator. Its result type makes failure explicit: an invocation either
//! produces its output or a [`CapturedError`], and the combinator branches on
//! that instead of catching anything itself.
//!
//! - Every `FnOnce(Args) -> R` implements `Invoke<Args>`. A panic inside
//!   the closure is caught and captured.
//! - [`fallible`] wraps a function returning `Result<T, E>`; an `Err` is
//!   captured without unwinding.
//! - A type with several success shapes to handle implements `Invoke` once
//!   per shape.
//!
//! Because `&F` is `FnOnce` when `F: Fn` and `&mut F` is `FnOnce` when
//! `F: FnMut`, borrowed closures implement `Invoke` too, which is what the
//! borrowing connect variants rely on.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::CapturedError;
use crate::types::{Cons, Nil, TypeList};

/// A function that can be invoked with `Args`, capturing any failure.
pub trait Invoke<Args> {
    /// The value produced on success. `()` means no value.
    type Output;

    /// Invokes the function.
    fn invoke(self, args: Args) -> Result<Self::Output, CapturedError>;
}

impl<F, Args, R> Invoke<Args> for F
where
    F: FnOnce(Args) -> R,
{
    type Output = R;

    fn invoke(self, args: Args) -> Result<R, CapturedError> {
        catch_unwind(AssertUnwindSafe(move || self(args))).map_err(CapturedError::from_panic)
    }
}

/// A function that reports failure through its return type.
///
/// Created by [`fallible`].
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F> {
    f: F,
}

/// Wraps `f`, whose `Err` results become [`CapturedError`] completions.
///
/// ```
/// use asend::{fallible, just, sync_wait, CapturedError, Outcome, SenderExt};
///
/// let parsed = just("12x").transform(fallible(|s: &str| s.parse::<i32>()));
/// let outcome: Outcome<i32, CapturedError> = sync_wait(parsed).unwrap();
/// let err = outcome.unwrap_err();
/// assert!(err.downcast_ref::<std::num::ParseIntError>().is_some());
/// ```
pub fn fallible<F>(f: F) -> Fallible<F> {
    Fallible { f }
}

fn call_once<G: FnOnce(A) -> O, A, O>(g: G, args: A) -> O {
    g(args)
}

fn settle<T, E>(result: std::thread::Result<Result<T, E>>) -> Result<T, CapturedError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(CapturedError::from_error(err)),
        Err(payload) => Err(CapturedError::from_panic(payload)),
    }
}

impl<F, Args, T, E> Invoke<Args> for Fallible<F>
where
    F: FnOnce(Args) -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Output = T;

    fn invoke(self, args: Args) -> Result<T, CapturedError> {
        let f = self.f;
        settle(catch_unwind(AssertUnwindSafe(move || f(args))))
    }
}

impl<'a, F, Args, T, E> Invoke<Args> for &'a Fallible<F>
where
    &'a F: FnOnce(Args) -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Output = T;

    fn invoke(self, args: Args) -> Result<T, CapturedError> {
        let f = &self.f;
        settle(catch_unwind(AssertUnwindSafe(move || call_once(f, args))))
    }
}

impl<'a, F, Args, T, E> Invoke<Args> for &'a mut Fallible<F>
where
    &'a mut F: FnOnce(Args) -> Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Output = T;

    fn invoke(self, args: Args) -> Result<T, CapturedError> {
        let f = &mut self.f;
        settle(catch_unwind(AssertUnwindSafe(move || call_once(f, args))))
    }
}

/// Maps a list of success shapes through `F`.
///
/// Each shape `V` becomes `<F as Invoke<V>>::Output`, in order.
pub trait MapInvoke<F>: TypeList {
    /// The mapped list.
    type Output: TypeList;
}

impl<F> MapInvoke<F> for Nil {
    type Output = Nil;
}

impl<F, H, T> MapInvoke<F> for Cons<H, T>
where
    F: Invoke<H>,
    T: MapInvoke<F>,
{
    type Output = Cons<<F as Invoke<H>>::Output, <T as MapInvoke<F>>::Output>;
}
