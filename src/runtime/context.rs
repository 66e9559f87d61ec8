//! The per-thread execution context.
//!
//! Each thread that uses the engine owns exactly one [`Context`]: the frame
//! stack of its open guarded blocks, the exception record currently in
//! flight, and the configured frame-stack capacity. The context is reached
//! through a `thread_local!` accessor and is lazily initialized to its empty
//! state on first use; it is never shared or migrated across threads, which
//! is why the engine needs no synchronization of any kind.
//!
//! No teardown is required: the context holds no external resources, and
//! thread exit discards it wholesale.

use std::cell::RefCell;

use crate::record::ExceptionRecord;
use crate::runtime::frame::Frame;
use crate::{Error, Result};

/// Default capacity of the frame stack, measured in nested guarded blocks.
///
/// Entering more blocks than this raises the engine's built-in root exception
/// instead of growing the stack; see [`set_max_frames`] for tuning.
pub const DEFAULT_MAX_FRAMES: usize = 128;

/// Thread-local aggregate owning all engine state for one thread.
pub(crate) struct Context {
    frames: Vec<Frame>,
    record: Option<ExceptionRecord>,
    max_frames: usize,
}

impl Context {
    fn new() -> Self {
        Context {
            frames: Vec::new(),
            record: None,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }

    /// Number of currently open guarded blocks.
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub(crate) fn push_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    pub(crate) fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Drops every frame above `depth`.
    ///
    /// Used when a foreign panic tears through guarded blocks: the frames it
    /// crossed must not survive it, or the stack would no longer describe the
    /// blocks that are actually open.
    pub(crate) fn truncate_frames(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    pub(crate) fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub(crate) fn current_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    pub(crate) fn record(&self) -> Option<&ExceptionRecord> {
        self.record.as_ref()
    }

    /// Overwrites the in-flight record. The previous record, if any, is
    /// discarded; there is never more than one live exception per thread.
    pub(crate) fn set_record(&mut self, record: ExceptionRecord) {
        self.record = Some(record);
    }
}

thread_local! {
    static CONTEXT: RefCell<Context> = RefCell::new(Context::new());
}

/// Runs `f` with mutable access to this thread's context.
///
/// The borrow is released before control returns, so callers are free to
/// unwind afterwards; nothing may re-enter the engine while the closure runs.
pub(crate) fn with<R>(f: impl FnOnce(&mut Context) -> R) -> R {
    CONTEXT.with(|context| f(&mut context.borrow_mut()))
}

/// Returns the frame-stack capacity configured for the current thread.
pub fn max_frames() -> usize {
    with(|context| context.max_frames())
}

/// Reconfigures the frame-stack capacity for the current thread.
///
/// The capacity bounds how deeply guarded blocks may nest; entering one more
/// block raises the built-in root exception. The default is
/// [`DEFAULT_MAX_FRAMES`].
///
/// # Errors
///
/// * [`Error::InvalidLimit`] - `limit` is zero, which would make every
///   guarded block an overflow
/// * [`Error::BlocksOpen`] - guarded blocks are currently open on this
///   thread; resizing under them would invalidate the overflow accounting
///
/// # Example
///
/// ```rust
/// guardrail::runtime::set_max_frames(16)?;
/// assert_eq!(guardrail::runtime::max_frames(), 16);
/// # Ok::<(), guardrail::Error>(())
/// ```
pub fn set_max_frames(limit: usize) -> Result<()> {
    with(|context| {
        if limit == 0 {
            return Err(Error::InvalidLimit);
        }
        let open = context.depth();
        if open > 0 {
            return Err(Error::BlocksOpen(open));
        }
        context.max_frames = limit;
        Ok(())
    })
}
