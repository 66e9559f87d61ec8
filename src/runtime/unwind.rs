//! Non-local transfer and the fatal propagation terminus.
//!
//! Raising transfers control from the raise site back to the innermost open
//! guarded block. The transfer rides the standard unwinding machinery:
//! [`depart`] calls [`std::panic::resume_unwind`] with a private [`Transfer`]
//! token, and each guarded-block driver recovers the token at its clause
//! boundary with `catch_unwind`. Using `resume_unwind` rather than `panic!`
//! keeps the process panic hook out of ordinary exception flow; the token is
//! private, so nothing outside the crate can observe or forge a transfer.
//!
//! When an exception reaches the top of a thread's context with no handler
//! left, that is not an error value to hand back to anyone: per the engine's
//! contract it is fatal. [`fatal`] writes one diagnostic line to stderr and
//! terminates the process.
//!
//! Because transfers unwind, the crate requires the default `panic = "unwind"`
//! strategy; under `panic = "abort"` the first raise would abort the process.

use std::any::Any;
use std::panic;
use std::process;

use crate::record::ExceptionRecord;

/// Marker carried by an in-flight engine transfer.
///
/// Private zero-sized type: drivers test unwind payloads against it and let
/// every other panic pass through untouched.
pub(crate) struct Transfer;

/// Begins the non-local transfer to the innermost open guarded block.
///
/// The caller must already have marked that frame `uncaught` and stored the
/// record; this only performs the jump.
pub(crate) fn depart() -> ! {
    panic::resume_unwind(Box::new(Transfer))
}

/// Checks whether an unwind payload is an engine transfer.
pub(crate) fn is_transfer(payload: &(dyn Any + Send)) -> bool {
    payload.is::<Transfer>()
}

/// Terminates the process after an exception escaped the outermost frame.
///
/// There is no recovery path here: an uncaught exception at the top of a
/// context is never converted into a return value. The diagnostic names
/// the exception type, its origin when one was captured, and a string payload
/// when one was attached.
pub(crate) fn fatal(record: Option<ExceptionRecord>) -> ! {
    eprintln!("{}", render_uncaught(record.as_ref()));
    process::exit(1);
}

/// Renders the uncaught-exception diagnostic.
///
/// Split from [`fatal`] so the format is testable without terminating the
/// test process.
pub(crate) fn render_uncaught(record: Option<&ExceptionRecord>) -> String {
    match record {
        Some(record) => format!("uncaught exception: {record}"),
        None => String::from("uncaught exception: <no record>"),
    }
}
