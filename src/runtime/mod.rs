//! The exception-handling runtime engine.
//!
//! This module is the stateful core of the crate: the per-thread frame stack,
//! the stage state machine that drives a guarded block through its life
//! cycle, and the propagation machinery that performs the non-local transfer
//! from a raise site to the nearest matching handler - or to process
//! termination when none exists.
//!
//! # Components
//!
//! - **Frames & stages** ([`Stage`]) - one frame per open guarded block,
//!   driven through `Beginning → Trying → Catching → Finalizing → Done`,
//!   skipping `Catching` when no exception is pending
//! - **Engine primitives** ([`enter_block`], [`advance`], [`raise`],
//!   [`reraise`], [`current_exception`]) - the complete interface the
//!   guarded-block driver is built on
//! - **Execution context** ([`set_max_frames`], [`max_frames`],
//!   [`open_blocks`]) - the thread-local aggregate owning all of the above,
//!   one per thread, never shared
//!
//! # Propagation flow
//!
//! When an exception is raised:
//!
//! 1. The thread's exception record is overwritten with the new type,
//!    payload, and origin
//! 2. The innermost open frame is marked as holding an unaccepted exception
//!    and control transfers non-locally back to its driver
//! 3. The frame's state machine routes through `Catching`; a matching clause
//!    accepts the exception, otherwise `Finalizing` still runs and the
//!    exhausted frame hands the exception to the enclosing frame
//! 4. An exception leaving the outermost frame is fatal: one diagnostic line
//!    on stderr, then process exit
//!
//! Most code never touches these primitives directly and uses
//! [`Guarded`](crate::Guarded) instead, which packages the driver protocol.

mod context;
mod engine;
mod frame;
mod unwind;

pub use context::{max_frames, set_max_frames, DEFAULT_MAX_FRAMES};
pub use engine::{
    advance, current_exception, current_stage, enter_block, open_blocks, raise, reraise,
};
pub use frame::Stage;

pub(crate) use context::with as with_context;
pub(crate) use unwind::is_transfer;
