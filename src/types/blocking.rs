//! Blocking classification of a sender.
//!
//! Tells a caller whether waiting for an operation to complete is expected
//! to block the calling context. Combinators that add only synchronous work
//! (such as transform) forward their predecessor's classification.

use core::fmt;

/// Whether waiting on a sender's operation blocks the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Blocking {
    /// Unknown. The operation may or may not complete before `start` returns.
    #[default]
    Maybe,
    /// The operation never completes before `start` returns.
    Never,
    /// The operation completes before `start` returns, possibly on another
    /// thread.
    Always,
    /// The operation completes inside `start`, on the calling thread.
    AlwaysInline,
}

impl Blocking {
    /// Returns true if completion is guaranteed to have happened by the
    /// time `start` returns.
    #[must_use]
    pub const fn completes_before_start_returns(self) -> bool {
        matches!(self, Self::Always | Self::AlwaysInline)
    }

    /// Returns true if completion runs on the thread that called `start`.
    #[must_use]
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::AlwaysInline)
    }
}

impl fmt::Display for Blocking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maybe => write!(f, "maybe"),
            Self::Never => write!(f, "never"),
            Self::Always => write!(f, "always"),
            Self::AlwaysInline => write!(f, "always-inline"),
        }
    }
}
