use thiserror::Error;

/// The error type for engine configuration operations.
///
/// This enum is small on purpose: conditions that occur *while code runs under a
/// guarded block* are not Rust errors at all - they are exceptions, raised
/// with [`raise`](crate::runtime::raise) and handled through the hierarchy.
/// Even the engine's own faults (exceeding the nesting limit, reraising with
/// nothing in flight) surface as catchable exceptions of the built-in root
/// type. What remains for a conventional `Result` is API misuse that happens
/// *outside* any exception flow, currently only the reconfiguration of the
/// per-thread frame stack.
///
/// # Examples
///
/// ```rust
/// use guardrail::{runtime::set_max_frames, Error};
///
/// match set_max_frames(0) {
///     Err(Error::InvalidLimit) => {}
///     other => panic!("expected InvalidLimit, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The requested frame-stack capacity was zero.
    ///
    /// A zero capacity would turn every [`enter_block`](crate::runtime::enter_block)
    /// into an overflow fault, making guarded blocks unusable on the thread.
    #[error("frame-stack capacity must allow at least one guarded block")]
    InvalidLimit,

    /// The frame stack was reconfigured while guarded blocks were open.
    ///
    /// Resizing under open frames would invalidate the overflow accounting
    /// for every block already entered. The associated value is the number of
    /// blocks open on the thread at the time of the call.
    #[error("cannot resize the frame stack while {0} guarded block(s) are open")]
    BlocksOpen(usize),
}
