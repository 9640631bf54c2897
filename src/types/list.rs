//! Type-level lists describing what a sender can produce.
//!
//! A sender declares its success shapes as a [`TypeList`] and its error kinds
//! as an [`ErrorKinds`] descriptor. Both are pure types: nothing here exists
//! at runtime except the [`TypeNames`] snapshot returned by `describe`.
//!
//! # Shapes
//!
//! A success shape is the single type handed to `set_value`:
//!
//! - `()` is the empty shape (completion carries no values)
//! - `T` is the one-element shape
//! - `(A, B, ..)` is a multi-element shape
//!
//! # Deduplication
//!
//! Stable Rust cannot decide type equality in a trait, so a list may name
//! the same shape twice. Over-declaring is harmless. The captured-invocation
//! kind is tracked as a flag on the error descriptor ([`WithCaptured`]) rather
//! than as a list element, so it is never duplicated however many transforms
//! are chained. `describe` snapshots are deduplicated.

use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;

use smallvec::SmallVec;

use crate::error::CapturedError;

/// The empty type list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nil;

/// A type list with head `H` and tail `T`.
pub struct Cons<H, T>(PhantomData<fn() -> (H, T)>);

impl<H, T> fmt::Debug for Cons<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cons<{}, {}>", type_name::<H>(), type_name::<T>())
    }
}

/// A compile-time list of types.
pub trait TypeList {
    /// Number of entries, counting repeats.
    const LEN: usize;

    /// Pushes the names of every entry into `names`, in declaration order.
    fn collect_names(names: &mut TypeNames);

    /// Returns the deduplicated names of the entries.
    #[must_use]
    fn describe() -> TypeNames {
        let mut names = TypeNames::new();
        Self::collect_names(&mut names);
        names
    }
}

impl TypeList for Nil {
    const LEN: usize = 0;

    fn collect_names(_names: &mut TypeNames) {}
}

impl<H, T: TypeList> TypeList for Cons<H, T> {
    const LEN: usize = 1 + T::LEN;

    fn collect_names(names: &mut TypeNames) {
        names.insert(type_name::<H>());
        T::collect_names(names);
    }
}

/// Describes the error kinds a sender may complete with.
pub trait ErrorKinds {
    /// Domain errors, forwarded unchanged by combinators.
    type Domain: TypeList;

    /// Whether [`CapturedError`] is among the declared kinds.
    const CAPTURES: bool;

    /// Returns the deduplicated names of all declared error kinds.
    ///
    /// Domain kinds come first; the captured kind, when declared, is last.
    #[must_use]
    fn describe() -> TypeNames {
        let mut names = Self::Domain::describe();
        if Self::CAPTURES {
            names.insert(type_name::<CapturedError>());
        }
        names
    }
}

/// Error kinds made of domain errors only.
pub struct DomainErrors<L>(PhantomData<fn() -> L>);

/// Domain errors plus the captured-invocation kind.
pub struct WithCaptured<L>(PhantomData<fn() -> L>);

impl<L: TypeList> ErrorKinds for DomainErrors<L> {
    type Domain = L;
    const CAPTURES: bool = false;
}

impl<L: TypeList> ErrorKinds for WithCaptured<L> {
    type Domain = L;
    const CAPTURES: bool = true;
}

/// Deduplicated, ordered snapshot of type names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNames {
    names: SmallVec<[&'static str; 4]>,
}

impl TypeNames {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless already present. Returns true if it was added.
    pub fn insert(&mut self, name: &'static str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Returns true if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }

    /// Returns true if the name of `T` is present.
    #[must_use]
    pub fn contains_type<T: ?Sized>(&self) -> bool {
        self.contains(type_name::<T>())
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The names, in first-declared order.
    #[must_use]
    pub fn as_slice(&self) -> &[&'static str] {
        &self.names
    }
}

impl fmt::Display for TypeNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("}")
    }
}
