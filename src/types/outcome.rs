//! Three-valued outcome of a completed operation.
//!
//! The outcome mirrors the three receiver channels:
//!
//! - `Ok(T)`: the value channel fired
//! - `Err(E)`: the error channel fired
//! - `Cancelled`: the done channel fired

use core::fmt;

/// The outcome of an operation, as observed by its final receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// Success with a value.
    Ok(T),
    /// Error completion.
    Err(E),
    /// The operation was cancelled.
    Cancelled,
}

impl<T, E> Outcome<T, E> {
    /// Returns true if this outcome is `Ok`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true if this outcome is `Err`.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Returns true if this outcome is `Cancelled`.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Converts to a standard `Result`, with cancellation as an error.
    pub fn into_result(self) -> Result<T, OutcomeError<E>> {
        match self {
            Self::Ok(v) => Ok(v),
            Self::Err(e) => Err(OutcomeError::Err(e)),
            Self::Cancelled => Err(OutcomeError::Cancelled),
        }
    }

    /// Maps the success value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Ok(v) => Outcome::Ok(f(v)),
            Self::Err(e) => Outcome::Err(e),
            Self::Cancelled => Outcome::Cancelled,
        }
    }

    /// Maps the error value.
    pub fn map_err<E2, G: FnOnce(E) -> E2>(self, g: G) -> Outcome<T, E2> {
        match self {
            Self::Ok(v) => Outcome::Ok(v),
            Self::Err(e) => Outcome::Err(g(e)),
            Self::Cancelled => Outcome::Cancelled,
        }
    }

    /// Returns the success value or panics.
    ///
    /// # Panics
    ///
    /// Panics if the outcome is not `Ok`.
    #[track_caller]
    pub fn unwrap(self) -> T
    where
        E: fmt::Debug,
    {
        match self {
            Self::Ok(v) => v,
            Self::Err(e) => panic!("called `Outcome::unwrap()` on an `Err` value: {e:?}"),
            Self::Cancelled => panic!("called `Outcome::unwrap()` on a `Cancelled` value"),
        }
    }

    /// Returns the error value or panics.
    ///
    /// # Panics
    ///
    /// Panics if the outcome is not `Err`.
    #[track_caller]
    pub fn unwrap_err(self) -> E
    where
        T: fmt::Debug,
    {
        match self {
            Self::Err(e) => e,
            Self::Ok(v) => panic!("called `Outcome::unwrap_err()` on an `Ok` value: {v:?}"),
            Self::Cancelled => panic!("called `Outcome::unwrap_err()` on a `Cancelled` value"),
        }
    }

    /// Returns the success value or a default.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Ok(v) => v,
            _ => default,
        }
    }

    /// Returns the success value or computes it from a closure.
    pub fn unwrap_or_else<F: FnOnce() -> T>(self, f: F) -> T {
        match self {
            Self::Ok(v) => v,
            _ => f(),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(e) => Self::Err(e),
        }
    }
}

/// Error type for converting an [`Outcome`] to a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError<E> {
    /// Error completion.
    Err(E),
    /// Cancellation.
    Cancelled,
}

impl<E: fmt::Display> fmt::Display for OutcomeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Err(e) => write!(f, "{e}"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for OutcomeError<E> {}
