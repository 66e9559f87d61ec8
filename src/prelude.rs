//! # guardrail Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and functions of the library. Import it to declare hierarchies, build
//! guarded blocks, and raise exceptions without naming individual modules.
//!
//! # Example
//!
//! ```rust
//! use guardrail::prelude::*;
//!
//! static WIRE_ERROR: ExceptionType = ExceptionType::new("WireError", &EXCEPTION);
//!
//! let outcome = Guarded::new(|| -> u32 { raise(&WIRE_ERROR, "short read") })
//!     .catch(&WIRE_ERROR, |_| 0)
//!     .run();
//! assert_eq!(outcome, 0);
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The configuration error type
pub use crate::Error;

/// The result type used for configuration operations
pub use crate::Result;

// ================================================================================================
// Exception Types and Records
// ================================================================================================

/// Exception type nodes and the built-in hierarchy root
pub use crate::hierarchy::{ExceptionType, EXCEPTION};

/// The in-flight exception snapshot handlers receive
pub use crate::record::ExceptionRecord;

// ================================================================================================
// Guarded Blocks and Raising
// ================================================================================================

/// The guarded-block builder
pub use crate::block::Guarded;

/// Raising and rethrowing
pub use crate::runtime::{raise, reraise};

/// Reading the exception currently in flight
pub use crate::runtime::current_exception;

/// Guarded-block life-cycle stages
pub use crate::runtime::Stage;
