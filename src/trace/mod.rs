//! Continuation-chain introspection.
//!
//! A started operation has a chain of receivers waiting on it. Walking that
//! chain answers "what is waiting here?" without running anything:
//!
//! ```
//! use asend::{async_trace, Continuation};
//!
//! struct Leaf;
//! impl Continuation for Leaf {}
//!
//! let entries = async_trace(&Leaf);
//! assert_eq!(entries.len(), 1);
//! assert!(entries[0].type_name.ends_with("Leaf"));
//! ```
//!
//! Transparent nodes (adapters such as the transform receiver) are not
//! listed; their continuations are reported at the adapter's depth.

pub mod continuation;

pub use continuation::{Continuation, ContinuationInfo};

use core::fmt;

use crate::config::TraceConfig;
use crate::tracing_compat::warn;

/// One listed node of a continuation walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Distance from the root, counting only listed nodes.
    pub depth: usize,
    /// Type name of the node.
    pub type_name: &'static str,
    /// Address of the node during the walk.
    pub address: usize,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:indent$}{} @ {:#x}",
            "",
            self.type_name,
            self.address,
            indent = self.depth * 2
        )
    }
}

/// Walks the chain below `root` with the default [`TraceConfig`].
pub fn async_trace<C: Continuation + ?Sized>(root: &C) -> Vec<TraceEntry> {
    async_trace_with(root, &TraceConfig::default())
}

/// Walks the chain below `root`, depth-first.
///
/// Nodes deeper than `config.max_depth` are not listed.
pub fn async_trace_with<C: Continuation + ?Sized>(
    root: &C,
    config: &TraceConfig,
) -> Vec<TraceEntry> {
    let mut entries = Vec::new();
    let mut truncated = false;
    walk(root, 0, config.max_depth, &mut entries, &mut truncated);
    if truncated {
        warn!(
            max_depth = config.max_depth,
            "continuation trace truncated"
        );
    }
    entries
}

fn walk<C: Continuation + ?Sized>(
    node: &C,
    depth: usize,
    max_depth: usize,
    entries: &mut Vec<TraceEntry>,
    truncated: &mut bool,
) {
    if depth > max_depth {
        *truncated = true;
        return;
    }
    let child_depth = if node.is_transparent() {
        depth
    } else {
        let info = node.info();
        entries.push(TraceEntry {
            depth,
            type_name: info.type_name,
            address: info.address,
        });
        depth + 1
    };
    node.visit_continuations(&mut |child| {
        walk(child, child_depth, max_depth, entries, truncated);
    });
}
