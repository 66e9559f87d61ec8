//! The guarded-block construct.
//!
//! [`Guarded`] is the binding layer over the engine primitives in
//! [`crate::runtime`]: a builder holding the supervised body, an ordered list
//! of `(type, handler)` catch clauses, and an optional finalizer.
//! [`Guarded::run`] drives the engine's state machine through the block's
//! life cycle, executing the clause that matches the current stage on every
//! iteration, exactly as the engine protocol requires.
//!
//! # Stage ordering
//!
//! The body runs exactly once. Catch clauses are only consulted while an
//! exception is pending, in the order they were attached, and the first
//! clause whose type matches accepts the exception. The finalizer runs
//! exactly once per entered block - after the body, after any handler, and
//! also on the way out when the exception matched nothing here and is about
//! to propagate to the enclosing block.
//!
//! # Example
//!
//! ```rust
//! use guardrail::prelude::*;
//!
//! static APP_ERROR: ExceptionType = ExceptionType::new("AppError", &EXCEPTION);
//! static DECODE_ERROR: ExceptionType = ExceptionType::new("DecodeError", &APP_ERROR);
//!
//! fn decode(frame: &[u8]) -> u8 {
//!     match frame.first() {
//!         Some(byte) => *byte,
//!         None => raise(&DECODE_ERROR, "empty frame"),
//!     }
//! }
//!
//! let byte = Guarded::new(|| decode(&[]))
//!     // Matches via the hierarchy: DecodeError extends AppError.
//!     .catch(&APP_ERROR, |raised| {
//!         assert_eq!(raised.message(), Some("empty frame"));
//!         0xFF
//!     })
//!     .finally(|| { /* release the frame buffer */ })
//!     .run();
//! assert_eq!(byte, 0xFF);
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::hierarchy::ExceptionType;
use crate::record::ExceptionRecord;
use crate::runtime::{
    self, advance, current_exception, current_stage, enter_block, open_blocks, Stage,
};

/// One `(type, handler)` catch clause.
struct CatchClause<'a, T> {
    exception_type: &'static ExceptionType,
    handler: Box<dyn FnOnce(&ExceptionRecord) -> T + 'a>,
}

/// What happened inside a supervised clause body.
enum ClauseOutcome<R> {
    /// The clause returned normally.
    Value(R),
    /// An engine transfer landed here; the state machine decides what's next.
    Transferred,
    /// An ordinary Rust panic crossed the clause; it is not an exception and
    /// must continue unwinding once this block has cleaned up.
    Panicked(Box<dyn Any + Send>),
}

/// A guarded block under construction.
///
/// Built from a body closure, zero or more ordered catch clauses, and an
/// optional finalizer, then executed with [`run`](Guarded::run). The body and
/// every handler produce the same type `T`; `run` returns whichever of them
/// completed the block.
///
/// Guarded blocks nest freely - inside bodies, inside handlers, and inside
/// finalizers - each nesting level pushing its own frame on the thread's
/// stack. An exception that matches no clause here propagates to the
/// enclosing block after the finalizer has run.
#[must_use = "a guarded block does nothing until run()"]
pub struct Guarded<'a, T> {
    body: Option<Box<dyn FnOnce() -> T + 'a>>,
    clauses: Vec<CatchClause<'a, T>>,
    finalizer: Option<Box<dyn FnOnce() + 'a>>,
}

impl<'a, T> Guarded<'a, T> {
    /// Starts a guarded block around `body`.
    pub fn new(body: impl FnOnce() -> T + 'a) -> Self {
        Guarded {
            body: Some(Box::new(body)),
            clauses: Vec::new(),
            finalizer: None,
        }
    }

    /// Attaches a catch clause for `exception_type`.
    ///
    /// Clauses are consulted in attachment order against the pending
    /// exception; a clause matches when the exception was raised with exactly
    /// `exception_type` or a type deriving from it. Order matters: put more
    /// specific types first, since an ancestor clause attached earlier wins.
    pub fn catch(
        mut self,
        exception_type: &'static ExceptionType,
        handler: impl FnOnce(&ExceptionRecord) -> T + 'a,
    ) -> Self {
        self.clauses.push(CatchClause {
            exception_type,
            handler: Box::new(handler),
        });
        self
    }

    /// Attaches the cleanup clause.
    ///
    /// Runs exactly once per entered block, whatever the outcome: clean
    /// completion, handled exception, or an exception about to propagate
    /// onward. At most one finalizer is kept; attaching another replaces the
    /// previous one.
    pub fn finally(mut self, finalizer: impl FnOnce() + 'a) -> Self {
        self.finalizer = Some(Box::new(finalizer));
        self
    }

    /// Executes the guarded block.
    ///
    /// Returns the body's value, or the value of the handler that accepted
    /// the exception. Does not return while an exception raised here matches
    /// no clause: after the finalizer, propagation continues to the enclosing
    /// guarded block, and an exception escaping the outermost block
    /// terminates the process.
    ///
    /// Annotated with `#[track_caller]` so an engine fault for exceeding the
    /// nesting limit reports this call site as its origin.
    #[track_caller]
    pub fn run(mut self) -> T {
        let entry_depth = open_blocks();
        let proceed = enter_block();
        debug_assert!(proceed, "enter_block either proceeds or transfers away");

        let mut outcome: Option<T> = None;
        while advance(false) {
            match current_stage() {
                Some(Stage::Trying) => {
                    if let Some(body) = self.body.take() {
                        match shield(body) {
                            ClauseOutcome::Value(value) => outcome = Some(value),
                            ClauseOutcome::Transferred => {}
                            ClauseOutcome::Panicked(payload) => {
                                self.resume_foreign(entry_depth, payload);
                            }
                        }
                    }
                }
                Some(Stage::Catching) => {
                    if let Some(record) = current_exception() {
                        let matched = self
                            .clauses
                            .iter()
                            .position(|clause| record.is_instance_of(clause.exception_type));
                        if let Some(index) = matched {
                            let clause = self.clauses.remove(index);
                            advance(true);
                            match shield(|| (clause.handler)(&record)) {
                                ClauseOutcome::Value(value) => outcome = Some(value),
                                ClauseOutcome::Transferred => {}
                                ClauseOutcome::Panicked(payload) => {
                                    self.resume_foreign(entry_depth, payload);
                                }
                            }
                        }
                    }
                }
                Some(Stage::Finalizing) => {
                    if let Some(finalizer) = self.finalizer.take() {
                        match shield(finalizer) {
                            ClauseOutcome::Value(()) => {}
                            ClauseOutcome::Transferred => {}
                            ClauseOutcome::Panicked(payload) => {
                                self.resume_foreign(entry_depth, payload);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        match outcome {
            Some(value) => value,
            // advance(false) only reports completion after a clean Trying
            // pass or an accepted exception, both of which set the outcome.
            None => unreachable!("guarded block completed without a try or catch value"),
        }
    }

    /// Lets an ordinary panic continue past this block.
    ///
    /// The frames this block (and anything nested in it) had open are
    /// discarded first so the thread's stack describes only the blocks still
    /// actually open, then the finalizer gets its one run, then the panic
    /// resumes unchanged.
    fn resume_foreign(&mut self, entry_depth: usize, payload: Box<dyn Any + Send>) -> ! {
        runtime::with_context(|context| context.truncate_frames(entry_depth));
        if let Some(finalizer) = self.finalizer.take() {
            finalizer();
        }
        panic::resume_unwind(payload)
    }
}

/// Runs one clause body under the recovery point for this frame.
fn shield<R>(clause: impl FnOnce() -> R) -> ClauseOutcome<R> {
    match panic::catch_unwind(AssertUnwindSafe(clause)) {
        Ok(value) => ClauseOutcome::Value(value),
        Err(payload) if runtime::is_transfer(payload.as_ref()) => ClauseOutcome::Transferred,
        Err(payload) => ClauseOutcome::Panicked(payload),
    }
}
