//! The in-flight exception record.
//!
//! A [`ExceptionRecord`] captures everything known about the exception that is
//! currently propagating on a thread: its [`ExceptionType`], an opaque
//! owner-supplied payload, and the source location it was raised from. Each
//! execution context holds at most one live record at a time; every raise
//! overwrites it, and handlers read it through
//! [`current_exception`](crate::runtime::current_exception).
//!
//! The payload is untyped from the engine's point of view: it is stored as
//! `Arc<dyn Any + Send + Sync>` and never interpreted. Handlers that
//! know what was raised can recover the concrete value with
//! [`ExceptionRecord::payload_ref`]; diagnostic code can use
//! [`ExceptionRecord::message`] for the common case of a string payload.

use std::any::Any;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::hierarchy::ExceptionType;

/// A snapshot of the exception currently in flight.
///
/// Records are cheap to clone: the payload is reference-counted and the type
/// and origin are `'static` references. The clone handed out by the accessor
/// stays valid after the context's own record has been overwritten by a later
/// raise, which is what makes [`reraise`](crate::runtime::reraise) and
/// deferred inspection safe.
///
/// # Example
///
/// ```rust
/// use guardrail::prelude::*;
///
/// static IO_ERROR: ExceptionType = ExceptionType::new("IoError", &EXCEPTION);
///
/// let summary = Guarded::new(|| -> String { raise(&IO_ERROR, "disk offline") })
///     .catch(&IO_ERROR, |raised| {
///         format!("{}: {}", raised.exception_type().name(), raised.message().unwrap())
///     })
///     .run();
/// assert_eq!(summary, "IoError: disk offline");
/// ```
#[derive(Clone)]
pub struct ExceptionRecord {
    exception_type: &'static ExceptionType,
    payload: Option<Arc<dyn Any + Send + Sync>>,
    origin: Option<&'static Location<'static>>,
}

impl ExceptionRecord {
    pub(crate) fn new(
        exception_type: &'static ExceptionType,
        payload: Option<Arc<dyn Any + Send + Sync>>,
        origin: Option<&'static Location<'static>>,
    ) -> Self {
        ExceptionRecord {
            exception_type,
            payload,
            origin,
        }
    }

    /// Returns the type this exception was raised with.
    pub fn exception_type(&self) -> &'static ExceptionType {
        self.exception_type
    }

    /// Checks whether this record matches `exception_type`.
    ///
    /// A record is an instance of a type when it was raised with exactly that
    /// type or with a type deriving from it. This is the predicate a guarded
    /// block evaluates against each catch clause, in clause order.
    pub fn is_instance_of(&self, exception_type: &ExceptionType) -> bool {
        self.exception_type.is(exception_type) || self.exception_type.extends(exception_type)
    }

    /// Checks whether a payload was attached at the raise site.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Attempts to view the payload as a concrete type.
    ///
    /// Returns `None` when no payload was attached or when the payload is of
    /// a different type. The engine never looks inside the payload; the
    /// contract about what is stored belongs to the code raising and the code
    /// handling.
    pub fn payload_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.as_deref()?.downcast_ref::<T>()
    }

    /// Returns the payload as a string slice, for string payloads.
    ///
    /// Recognizes `&'static str` and `String` payloads; anything else yields
    /// `None`. The uncaught-exception diagnostic uses this to surface the
    /// message without knowing the payload type.
    pub fn message(&self) -> Option<&str> {
        let payload = self.payload.as_deref()?;
        if let Some(message) = payload.downcast_ref::<&'static str>() {
            return Some(message);
        }
        if let Some(message) = payload.downcast_ref::<String>() {
            return Some(message.as_str());
        }
        None
    }

    /// Returns the source location the exception was raised from, if one was
    /// captured.
    ///
    /// Preserved verbatim across [`reraise`](crate::runtime::reraise): the
    /// origin always points at the original raise site.
    pub fn origin(&self) -> Option<&'static Location<'static>> {
        self.origin
    }
}

impl fmt::Debug for ExceptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionRecord")
            .field("exception_type", &self.exception_type.name())
            .field("has_payload", &self.payload.is_some())
            .field("origin", &self.origin.map(|o| (o.file(), o.line())))
            .finish()
    }
}

impl fmt::Display for ExceptionRecord {
    /// Formats as `Name (message) at file:line`, omitting the pieces that are
    /// absent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.exception_type.name())?;
        if let Some(message) = self.message() {
            write!(f, " ({message})")?;
        }
        if let Some(origin) = self.origin {
            write!(f, " at {}:{}", origin.file(), origin.line())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::EXCEPTION;

    static BASE: ExceptionType = ExceptionType::new("Base", &EXCEPTION);
    static DERIVED: ExceptionType = ExceptionType::new("Derived", &BASE);

    fn record_of(
        exception_type: &'static ExceptionType,
        payload: Option<Arc<dyn Any + Send + Sync>>,
    ) -> ExceptionRecord {
        ExceptionRecord::new(exception_type, payload, Some(Location::caller()))
    }

    #[test]
    fn test_is_instance_of_exact_and_ancestor() {
        let record = record_of(&DERIVED, None);
        assert!(record.is_instance_of(&DERIVED));
        assert!(record.is_instance_of(&BASE));
        assert!(record.is_instance_of(&EXCEPTION));
    }

    #[test]
    fn test_is_instance_of_rejects_siblings_and_subtypes() {
        static SIBLING: ExceptionType = ExceptionType::new("Sibling", &EXCEPTION);
        let record = record_of(&BASE, None);
        assert!(!record.is_instance_of(&SIBLING));
        // A Base record is not an instance of the more specific Derived.
        assert!(!record.is_instance_of(&DERIVED));
    }

    #[test]
    fn test_payload_downcast() {
        #[derive(Debug, PartialEq)]
        struct Detail {
            code: u16,
        }

        let record = record_of(&BASE, Some(Arc::new(Detail { code: 7 })));
        assert!(record.has_payload());
        assert_eq!(record.payload_ref::<Detail>(), Some(&Detail { code: 7 }));
        assert!(record.payload_ref::<String>().is_none());
        assert!(record.message().is_none());
    }

    #[test]
    fn test_message_from_str_and_string() {
        let from_str = record_of(&BASE, Some(Arc::new("static message")));
        assert_eq!(from_str.message(), Some("static message"));

        let from_string = record_of(&BASE, Some(Arc::new(String::from("owned message"))));
        assert_eq!(from_string.message(), Some("owned message"));

        let empty = record_of(&BASE, None);
        assert!(!empty.has_payload());
        assert!(empty.message().is_none());
    }

    #[test]
    fn test_display_includes_name_message_and_origin() {
        let record = record_of(&DERIVED, Some(Arc::new("boom")));
        let rendered = record.to_string();
        assert!(rendered.starts_with("Derived (boom) at "));
        assert!(rendered.contains(file!()));

        let bare = ExceptionRecord::new(&DERIVED, None, None);
        assert_eq!(bare.to_string(), "Derived");
    }
}
