//! The continuation interface.

use core::any::type_name;
use core::fmt;

/// Identity of one node in a continuation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContinuationInfo {
    /// Type name of the node.
    pub type_name: &'static str,
    /// Address of the node while it is being visited.
    pub address: usize,
}

impl ContinuationInfo {
    /// Describes `value`.
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self {
            type_name: type_name::<T>(),
            address: (value as *const T).cast::<()>() as usize,
        }
    }
}

impl fmt::Display for ContinuationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:#x}", self.type_name, self.address)
    }
}

/// A node in a chain of pending continuations.
///
/// Receivers implement this so a diagnostic walk can list what is waiting
/// on an operation. Adapters that only relay to another receiver report
/// themselves as transparent and visit the receiver they wrap.
pub trait Continuation {
    /// Describes this node.
    fn info(&self) -> ContinuationInfo {
        ContinuationInfo::of(self)
    }

    /// Returns true if the node should be left out of traces.
    fn is_transparent(&self) -> bool {
        false
    }

    /// Calls `visit` once for each continuation this node completes into.
    fn visit_continuations(&self, visit: &mut dyn FnMut(&dyn Continuation)) {
        let _ = visit;
    }
}
