//! Core types for the composition protocol.
//!
//! - [`list`]: Type-level lists of success shapes and error-kind descriptors
//! - [`blocking`]: Blocking classification forwarded through combinators
//! - [`outcome`]: Three-valued outcome observed by the blocking driver

pub mod blocking;
pub mod list;
pub mod outcome;

pub use blocking::Blocking;
pub use list::{Cons, DomainErrors, ErrorKinds, Nil, TypeList, TypeNames, WithCaptured};
pub use outcome::{Outcome, OutcomeError};
