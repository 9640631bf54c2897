//! Error types and error handling strategy for Asend.
//!
//! Two kinds of failure exist and they never mix:
//!
//! - **Completion errors** travel through a receiver's error channel. Domain
//!   errors are whatever a sender declares; the one error kind the core adds
//!   is [`CapturedError`], produced when user code invoked in the completion
//!   path panics or reports failure.
//! - **Driver errors** ([`Error`]) are returned by the layers around the
//!   protocol: the blocking driver and configuration loading.
//!
//! Failures are never thrown across an operation boundary. Everything raised
//! while running user code is converted to a completion value.

use core::fmt;
use std::sync::Arc;

pub mod captured;

pub use captured::{CapturedError, PanicPayload};

use crate::config::ConfigError;

/// The kind of driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An operation dropped its receiver without completing it.
    Abandoned,
    /// The blocking driver gave up waiting.
    WaitTimeout,
    /// An execution context could not start work.
    Spawn,
    /// Invalid configuration input.
    Config,
    /// A captured invocation failure surfaced as a driver error.
    Captured,
}

impl ErrorKind {
    /// Returns true if this kind signals a broken completion protocol.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::Abandoned)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Abandoned => "receiver abandoned",
            Self::WaitTimeout => "wait timed out",
            Self::Spawn => "spawn failed",
            Self::Config => "invalid configuration",
            Self::Captured => "captured failure",
        };
        f.write_str(name)
    }
}

/// The main error type for Asend driver operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Adds a source error to the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns true if the error reports an abandoned receiver.
    #[must_use]
    pub const fn is_abandoned(&self) -> bool {
        matches!(self.kind, ErrorKind::Abandoned)
    }

    /// Returns true if the error reports a wait timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::WaitTimeout)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<CapturedError> for Error {
    fn from(captured: CapturedError) -> Self {
        Self::new(ErrorKind::Captured)
            .with_message(captured.to_string())
            .with_source(captured)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config)
            .with_message(err.to_string())
            .with_source(err)
    }
}

/// A specialized Result type for Asend driver operations.
pub type Result<T> = core::result::Result<T, Error>;
