//! Combinators over senders.
//!
//! - [`transform`]: map every success shape through a function, capturing
//!   failures of the function as [`CapturedError`](crate::CapturedError)
//! - [`just`], [`just_error`], [`just_done`]: inline senders that complete
//!   on start
//!
//! [`SenderExt`] puts the combinators in method position:
//!
//! ```
//! use asend::{just, sync_wait, CapturedError, Outcome, SenderExt};
//!
//! let chain = just(20).transform(|x: i32| x + 1).transform(|x: i32| x * 2);
//! let outcome: Outcome<i32, CapturedError> = sync_wait(chain).unwrap();
//! assert!(matches!(outcome, Outcome::Ok(42)));
//! ```

pub mod just;
pub mod transform;

pub use just::{
    just, just_done, just_error, Just, JustDone, JustDoneOperation, JustError, JustErrorOperation,
    JustOperation,
};
pub use transform::{transform, Transform, TransformReceiver};

use crate::invoke::{fallible, Fallible};
use crate::sender::Sender;

/// Method-position combinators for every sender.
pub trait SenderExt: Sender + Sized {
    /// Maps each success shape through `func`. See [`transform`].
    fn transform<F>(self, func: F) -> Transform<Self, F> {
        transform(self, func)
    }

    /// Maps each success shape through `func`, which returns a `Result`.
    /// An `Err` is delivered as a captured failure.
    fn try_transform<F>(self, func: F) -> Transform<Self, Fallible<F>> {
        transform(self, fallible(func))
    }
}

impl<S: Sender> SenderExt for S {}
