//! The engine primitives: block entry, the stage state machine, and raising.
//!
//! These four operations are the whole interface between the engine and the
//! guarded-block driver ([`crate::block`]), and they must be called in the
//! driver protocol order: one [`enter_block`], then repeated
//! [`advance`]`(false)` steps with clause bodies executed between them,
//! [`advance`]`(true)` exactly when a matching handler is about to run, and
//! [`raise`]/[`reraise`] from anywhere inside a clause body. Calling them in
//! any other order leaves the frame stack describing blocks that are not
//! actually open.
//!
//! # Life cycle guarantees
//!
//! The transition rules in [`advance`] give every entered block exactly one
//! pass through `Trying`; a `Catching` pass only while an exception is
//! pending; and exactly one pass through `Finalizing` no matter how the block
//! ends. A frame reaching `Done` still uncaught hands its exception to the
//! enclosing frame, or terminates the process when there is none.

use std::any::Any;
use std::panic::Location;
use std::sync::Arc;

use crate::hierarchy::{ExceptionType, EXCEPTION};
use crate::record::ExceptionRecord;
use crate::runtime::frame::Stage;
use crate::runtime::{context, unwind};

/// Message payload of the engine fault raised when the frame stack is full.
pub(crate) const FRAME_LIMIT_MESSAGE: &str = "too many nested guarded blocks";

/// Message payload of the engine fault raised by [`reraise`] outside any
/// exception.
pub(crate) const RERAISE_MESSAGE: &str = "reraise with no exception in flight";

/// What a completed state-machine step asks the caller to do next.
enum Step {
    /// Keep iterating; a stage before `Done` is active.
    Continue,
    /// The block is complete and nothing is pending.
    Complete,
    /// The popped frame was still uncaught; transfer to the enclosing frame.
    Propagate,
    /// The popped frame was still uncaught and no enclosing frame exists.
    Fatal,
}

/// Opens a guarded block by pushing a fresh frame.
///
/// Returns `true` when the caller should proceed into the block. When the
/// frame stack is already at its configured capacity no frame is pushed;
/// instead the engine raises its own fault: the built-in [`EXCEPTION`] root
/// carrying a message payload readable via
/// [`ExceptionRecord::message`](crate::ExceptionRecord::message). The fault
/// is catchable by enclosing blocks like any other exception.
#[track_caller]
pub fn enter_block() -> bool {
    let overflowed = context::with(|context| {
        if context.depth() >= context.max_frames() {
            true
        } else {
            context.push_frame();
            false
        }
    });
    if overflowed {
        raise(&EXCEPTION, FRAME_LIMIT_MESSAGE);
    }
    true
}

/// Drives the current frame's state machine one step.
///
/// This is the single transition primitive, called once per iteration of the
/// driver loop:
///
/// * With `is_handler_entry` set - a handler clause has matched and is about
///   to run: the pending exception is accepted (`uncaught` cleared), the
///   stage is left untouched, and the clause should be executed.
/// * Otherwise - the stage advances one step, skipping `Catching` entirely
///   when no exception is pending at that point.
///
/// Returns `true` while the surrounding construct should keep iterating
/// (re-reading [`current_stage`] to pick the clause body to run). Returns
/// `false` once the frame has reached `Done` cleanly and been popped. A frame
/// reaching `Done` with its exception still unaccepted does not return: the
/// exception propagates to the enclosing frame's recovery point, or the
/// process terminates when none remains.
pub fn advance(is_handler_entry: bool) -> bool {
    let step = context::with(|context| {
        let Some(frame) = context.current_frame_mut() else {
            // Protocol misuse; there is no block to drive.
            return Step::Complete;
        };

        if is_handler_entry {
            frame.uncaught = false;
            return Step::Continue;
        }

        let uncaught = frame.uncaught;
        frame.stage = frame.stage.next();
        if frame.stage == Stage::Catching && !uncaught {
            frame.stage = frame.stage.next();
        }
        if frame.stage < Stage::Done {
            return Step::Continue;
        }

        context.pop_frame();
        if !uncaught {
            return Step::Complete;
        }
        match context.current_frame_mut() {
            Some(enclosing) => {
                enclosing.uncaught = true;
                Step::Propagate
            }
            None => Step::Fatal,
        }
    });

    match step {
        Step::Continue => true,
        Step::Complete => false,
        Step::Propagate => unwind::depart(),
        Step::Fatal => unwind::fatal(current_exception()),
    }
}

/// Raises an exception of `exception_type` carrying `payload`.
///
/// Never returns normally. The thread's exception record is overwritten with
/// the type, the payload, and the caller's source location; the innermost
/// open guarded block is marked as holding an unaccepted exception; and
/// control transfers non-locally to that block's recovery point, where the
/// state machine will offer the exception to its catch clauses. Raising with
/// no guarded block open on the thread is immediately fatal.
///
/// The payload is opaque to the engine. Use `()` when there is nothing to
/// attach; handlers recover typed payloads via
/// [`ExceptionRecord::payload_ref`](crate::ExceptionRecord::payload_ref).
///
/// # Example
///
/// ```rust
/// use guardrail::prelude::*;
///
/// static LOOKUP_ERROR: ExceptionType = ExceptionType::new("LookupError", &EXCEPTION);
///
/// let fallback = Guarded::new(|| -> i64 { raise(&LOOKUP_ERROR, "missing key") })
///     .catch(&LOOKUP_ERROR, |_| -1)
///     .run();
/// assert_eq!(fallback, -1);
/// ```
#[track_caller]
pub fn raise<P: Any + Send + Sync>(exception_type: &'static ExceptionType, payload: P) -> ! {
    dispatch(ExceptionRecord::new(
        exception_type,
        Some(Arc::new(payload)),
        Some(Location::caller()),
    ))
}

/// Raises the current exception again, unchanged.
///
/// Used by a handler that inspected what it caught and decided not to handle
/// it after all: the record keeps its original type, payload, and origin, and
/// propagation resumes as if this block had never accepted it (its
/// `Finalizing` stage still runs before the exception leaves).
///
/// Calling `reraise` with no exception in flight is itself an engine fault,
/// raised with the built-in root type.
#[track_caller]
pub fn reraise() -> ! {
    match current_exception() {
        Some(record) => dispatch(record),
        None => raise(&EXCEPTION, RERAISE_MESSAGE),
    }
}

/// Stores `record` and transfers to the innermost open frame.
fn dispatch(record: ExceptionRecord) -> ! {
    let marked = context::with(|context| {
        context.set_record(record);
        match context.current_frame_mut() {
            Some(frame) => {
                frame.uncaught = true;
                true
            }
            None => false,
        }
    });
    if marked {
        unwind::depart()
    } else {
        unwind::fatal(current_exception())
    }
}

/// Returns a snapshot of the exception currently in flight, if any.
///
/// The record persists after it has been handled, until the next raise on
/// this thread overwrites it; handlers read it to inspect type, payload, and
/// origin.
pub fn current_exception() -> Option<ExceptionRecord> {
    context::with(|context| context.record().cloned())
}

/// Returns the stage of the innermost open guarded block.
///
/// `None` when no block is open. The driver reads this between [`advance`]
/// steps; it is also handy in tests and debugging.
pub fn current_stage() -> Option<Stage> {
    context::with(|context| context.current_frame().map(|frame| frame.stage))
}

/// Returns how many guarded blocks are open on this thread.
pub fn open_blocks() -> usize {
    context::with(|context| context.depth())
}
