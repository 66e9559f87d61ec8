//! Guarded-block frames and their life-cycle stages.
//!
//! Every entered guarded block is represented by one [`Frame`] on the
//! thread's frame stack. A frame carries two pieces of state: the [`Stage`]
//! it has reached, and whether an exception raised inside it is still
//! unaccepted. The state machine in [`crate::runtime`] drives each frame
//! through `Beginning → Trying → Catching → Finalizing → Done`, skipping
//! `Catching` when nothing is pending; the original bit-packed encoding of
//! this pair is an implementation detail with no semantic weight, so a plain
//! enum and boolean are used here.

use strum::{Display, EnumIter};

/// The life-cycle stage of a guarded block.
///
/// Stages are totally ordered and advance one step at a time via
/// [`Stage::next`]; `Done` is terminal. The driver reads the current stage
/// between state-machine steps to decide which clause body (try, a matching
/// catch, or finally) to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Stage {
    /// The frame has been pushed but the block body has not started.
    Beginning,
    /// The block body is executing under supervision.
    Trying,
    /// An exception is pending and catch clauses are being considered.
    ///
    /// This stage is skipped entirely when the block completes cleanly or
    /// the pending exception has already been accepted.
    Catching,
    /// The cleanup clause runs, exactly once, regardless of outcome.
    Finalizing,
    /// The frame is exhausted and about to be popped.
    Done,
}

impl Stage {
    /// Returns the next stage in the life cycle.
    ///
    /// `Done` is a fixed point; frames are popped before it would matter.
    pub fn next(self) -> Stage {
        match self {
            Stage::Beginning => Stage::Trying,
            Stage::Trying => Stage::Catching,
            Stage::Catching => Stage::Finalizing,
            Stage::Finalizing => Stage::Done,
            Stage::Done => Stage::Done,
        }
    }
}

/// Per-guarded-block state record.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame {
    /// Where this block is in its life cycle.
    pub(crate) stage: Stage,
    /// True while an exception raised inside this frame has not been accepted
    /// by a matching handler.
    pub(crate) uncaught: bool,
}

impl Frame {
    /// A freshly entered frame: at the beginning, nothing pending.
    pub(crate) fn new() -> Self {
        Frame {
            stage: Stage::Beginning,
            uncaught: false,
        }
    }
}
