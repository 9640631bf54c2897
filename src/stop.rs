//! Stop tokens: the cancellation-signal interface.
//!
//! A receiver exposes a [`StopToken`] through [`Receiver::stop_token`]. Senders
//! that honour cancellation check it before starting work and complete
//! through `set_done` if stop was requested.
//!
//! Requesting stop never completes anything by itself; the operation that
//! observes the token decides when to deliver `set_done`.
//!
//! [`Receiver::stop_token`]: crate::receiver::Receiver::stop_token

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owner side of a stop signal.
#[derive(Debug, Default)]
pub struct StopSource {
    state: Arc<AtomicBool>,
}

impl StopSource {
    /// Creates a source with no stop requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a token observing this source.
    #[must_use]
    pub fn token(&self) -> StopToken {
        StopToken {
            state: Some(Arc::clone(&self.state)),
        }
    }

    /// Requests stop. Returns true if this call made the request.
    pub fn request_stop(&self) -> bool {
        !self.state.swap(true, Ordering::AcqRel)
    }

    /// Returns true if stop has been requested.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.state.load(Ordering::Acquire)
    }
}

/// Observer side of a stop signal.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    state: Option<Arc<AtomicBool>>,
}

impl StopToken {
    /// A token that can never be stopped.
    #[must_use]
    pub const fn never() -> Self {
        Self { state: None }
    }

    /// Returns true if this token is attached to a source.
    #[must_use]
    pub fn stop_possible(&self) -> bool {
        self.state.is_some()
    }

    /// Returns true if stop has been requested.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.load(Ordering::Acquire))
    }
}
