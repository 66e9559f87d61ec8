//! Exception type hierarchy.
//!
//! Exception types are plain static data: a name for diagnostics and a
//! reference to a supertype. Together they form a tree whose root is its own
//! supertype; that self-reference is the sentinel that terminates every
//! ancestor walk. The crate ships one built-in root, [`EXCEPTION`], which is
//! also the type the engine itself raises for its own faults (see
//! [`crate::runtime`]).
//!
//! # Declaring a hierarchy
//!
//! Types are declared once, as `static` items, and are immutable afterwards.
//! There is no dynamic registration: a type's identity is its address, so two
//! types with the same name are still distinct.
//!
//! ```rust
//! use guardrail::{ExceptionType, EXCEPTION};
//!
//! static IO_ERROR: ExceptionType = ExceptionType::new("IoError", &EXCEPTION);
//! static TIMEOUT: ExceptionType = ExceptionType::new("Timeout", &IO_ERROR);
//!
//! assert!(TIMEOUT.extends(&IO_ERROR));
//! assert!(TIMEOUT.extends(&EXCEPTION));
//! assert!(!IO_ERROR.extends(&TIMEOUT));
//! ```

use std::fmt;
use std::ptr;

/// The built-in root exception type.
///
/// Every hierarchy derived from this type can be caught wholesale by guarding
/// against `EXCEPTION`. The engine raises its own faults (such as exceeding
/// the nested-block limit) with this type, so they are catchable like any
/// user-defined exception.
///
/// Its supertype is itself; the ancestor walk in [`ExceptionType::extends`]
/// stops at that self-reference.
pub static EXCEPTION: ExceptionType = ExceptionType::new("Exception", &EXCEPTION);

/// A node in the exception type hierarchy.
///
/// An `ExceptionType` is identified by its address, not its name: the name is
/// carried for diagnostics only. Instances are intended to be declared as
/// `static` items at module scope and referenced for the life of the process.
///
/// # Example
///
/// ```rust
/// use guardrail::{ExceptionType, EXCEPTION};
///
/// static APP_ERROR: ExceptionType = ExceptionType::new("AppError", &EXCEPTION);
/// static CONFIG_ERROR: ExceptionType = ExceptionType::new("ConfigError", &APP_ERROR);
///
/// assert_eq!(CONFIG_ERROR.name(), "ConfigError");
/// assert!(CONFIG_ERROR.extends(&APP_ERROR));
/// ```
pub struct ExceptionType {
    name: &'static str,
    supertype: &'static ExceptionType,
}

impl ExceptionType {
    /// Creates a new exception type deriving from `supertype`.
    ///
    /// This is a `const fn` so hierarchies can be declared as `static` items
    /// at load time; nothing in the engine creates types dynamically. A
    /// hierarchy root is declared by passing a reference to the item itself
    /// as its own supertype, exactly like the built-in [`EXCEPTION`].
    ///
    /// # Arguments
    ///
    /// * `name` - Diagnostic name, surfaced in uncaught-exception output
    /// * `supertype` - The parent type in the hierarchy
    pub const fn new(name: &'static str, supertype: &'static ExceptionType) -> Self {
        ExceptionType { name, supertype }
    }

    /// Returns the diagnostic name of this type.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the supertype this type derives from.
    ///
    /// For a hierarchy root this is the type itself.
    pub const fn supertype(&self) -> &'static ExceptionType {
        self.supertype
    }

    /// Checks whether this type is a hierarchy root.
    ///
    /// A root is its own supertype; the ancestor walk terminates there.
    pub fn is_root(&self) -> bool {
        ptr::eq(self.supertype, self)
    }

    /// Checks whether `self` and `other` are the same type.
    ///
    /// Types are compared by identity. Two distinct `static` items with equal
    /// names are different types.
    pub fn is(&self, other: &ExceptionType) -> bool {
        ptr::eq(self, other)
    }

    /// Checks whether this type derives (directly or transitively) from
    /// `parent`.
    ///
    /// Walks the supertype chain starting at `self`, stopping at the
    /// self-referencing root sentinel. The walk never reports a type as
    /// extending itself: `extends` is irreflexive, and a root extends
    /// nothing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use guardrail::{ExceptionType, EXCEPTION};
    ///
    /// static IO_ERROR: ExceptionType = ExceptionType::new("IoError", &EXCEPTION);
    ///
    /// assert!(IO_ERROR.extends(&EXCEPTION));
    /// assert!(!IO_ERROR.extends(&IO_ERROR));
    /// assert!(!EXCEPTION.extends(&EXCEPTION));
    /// ```
    pub fn extends(&self, parent: &ExceptionType) -> bool {
        let mut child: &ExceptionType = self;
        while !child.is_root() {
            if ptr::eq(child.supertype, parent) {
                return true;
            }
            child = child.supertype;
        }
        false
    }
}

// Derived Debug would chase the root's self-referencing supertype forever.
impl fmt::Debug for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionType")
            .field("name", &self.name)
            .field("supertype", &self.supertype.name)
            .finish()
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
