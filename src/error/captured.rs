//! The captured-invocation error kind.
//!
//! Any failure raised while invoking user code in a completion path is
//! converted into a [`CapturedError`] and delivered on the error channel.
//! Downstream consumers handle this one extra kind no matter how many
//! transforms a chain contains.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

/// Payload from a caught panic.
///
/// This wraps the panic message for transport through an error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicPayload {
    message: String,
}

impl PanicPayload {
    /// Creates a new panic payload with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Builds a payload from the value returned by `catch_unwind`.
    #[must_use]
    pub fn from_any(payload: &(dyn Any + Send)) -> Self {
        Self::new(extract_panic_message(payload))
    }

    /// Returns the panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

#[derive(Clone)]
enum Cause {
    Panic(PanicPayload),
    Failure(Arc<dyn std::error::Error + Send + Sync>),
}

/// A failure raised while invoking user code, captured as a value.
#[derive(Clone)]
pub struct CapturedError {
    cause: Cause,
}

impl CapturedError {
    /// Captures a panic payload returned by `catch_unwind`.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        Self {
            cause: Cause::Panic(PanicPayload::from_any(payload.as_ref())),
        }
    }

    /// Captures a panic known only by its message.
    #[must_use]
    pub fn from_panic_message(message: impl Into<String>) -> Self {
        Self {
            cause: Cause::Panic(PanicPayload::new(message)),
        }
    }

    /// Captures an error reported by a fallible function.
    #[must_use]
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            cause: Cause::Failure(Arc::new(error)),
        }
    }

    /// Returns true if the captured failure was a panic.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self.cause, Cause::Panic(_))
    }

    /// Returns the panic payload, if the failure was a panic.
    #[must_use]
    pub fn panic_payload(&self) -> Option<&PanicPayload> {
        match &self.cause {
            Cause::Panic(p) => Some(p),
            Cause::Failure(_) => None,
        }
    }

    /// Returns the reported error as `E`, if it is one.
    #[must_use]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match &self.cause {
            Cause::Failure(e) => e.downcast_ref::<E>(),
            Cause::Panic(_) => None,
        }
    }
}

impl fmt::Debug for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Cause::Panic(p) => f.debug_tuple("CapturedError::Panic").field(&p.message).finish(),
            Cause::Failure(e) => f.debug_tuple("CapturedError::Failure").field(e).finish(),
        }
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Cause::Panic(p) => write!(f, "{p}"),
            Cause::Failure(e) => write!(f, "invocation failed: {e}"),
        }
    }
}

impl std::error::Error for CapturedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Cause::Failure(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
            Cause::Panic(_) => None,
        }
    }
}

/// Extract a human-readable message from a panic payload.
fn extract_panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
