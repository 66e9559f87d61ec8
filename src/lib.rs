// Copyright 2026 The guardrail Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # guardrail
//!
//! Structured, typed exception handling for Rust: guarded blocks with
//! try/catch/finally-style stages, typed condition hierarchies with
//! ancestor matching, and non-local propagation through nested blocks.
//!
//! `guardrail` is a control-flow engine, not an error-reporting library. A
//! raised condition does not travel back through return values; it unwinds
//! through the open guarded blocks on the current thread until a handler
//! whose type matches accepts it, running each block's cleanup clause exactly
//! once on the way. A condition no handler accepts is fatal: one diagnostic
//! line on stderr, then process exit.
//!
//! ## Features
//!
//! - **Typed hierarchies** - exceptions are `static` type nodes matched by
//!   identity and ancestry, never by name or by string comparison
//! - **Guaranteed cleanup** - the `finally` clause of every entered block
//!   runs exactly once, whether the block completed, handled, or is
//!   propagating onward
//! - **Opaque payloads** - a raise carries any `Any + Send + Sync` value;
//!   handlers downcast it back, the engine never interprets it
//! - **Per-thread isolation** - every thread owns an independent context;
//!   the engine holds no shared state and needs no locking
//! - **Raise-site capture** - origins are recorded via `#[track_caller]`
//!   for uncaught-exception diagnostics
//!
//! ## Quick Start
//!
//! Add `guardrail` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! guardrail = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use guardrail::prelude::*;
//!
//! // Hierarchies are static data; EXCEPTION is the built-in root.
//! static PARSE_ERROR: ExceptionType = ExceptionType::new("ParseError", &EXCEPTION);
//!
//! fn digits(input: &str) -> u32 {
//!     match input.parse() {
//!         Ok(value) => value,
//!         Err(_) => raise(&PARSE_ERROR, format!("not a number: {input}")),
//!     }
//! }
//!
//! let value = Guarded::new(|| digits("12x"))
//!     .catch(&PARSE_ERROR, |raised| {
//!         assert_eq!(raised.message(), Some("not a number: 12x"));
//!         0
//!     })
//!     .finally(|| { /* runs on every path */ })
//!     .run();
//! assert_eq!(value, 0);
//! ```
//!
//! ### Matching Through the Hierarchy
//!
//! A catch clause accepts the pending exception when its type is the raised
//! type or any ancestor of it; clauses are tried in attachment order and the
//! first match wins. Unmatched exceptions propagate to the enclosing guarded
//! block - after the finalizer - and escape to the fatal diagnostic only at
//! the top of the thread.
//!
//! ```rust
//! use guardrail::prelude::*;
//!
//! static IO_ERROR: ExceptionType = ExceptionType::new("IoError", &EXCEPTION);
//! static TIMEOUT: ExceptionType = ExceptionType::new("Timeout", &IO_ERROR);
//!
//! let handled_by = Guarded::new(|| -> &str { raise(&TIMEOUT, ()) })
//!     .catch(&IO_ERROR, |raised| {
//!         // Timeout extends IoError, so this clause accepts it.
//!         raised.exception_type().name()
//!     })
//!     .run();
//! assert_eq!(handled_by, "Timeout");
//! ```
//!
//! ## Architecture
//!
//! `guardrail` is organized into a few focused modules:
//!
//! - [`hierarchy`] - exception type nodes, the built-in [`EXCEPTION`] root,
//!   and the ancestor-matching walk
//! - [`record`] - the in-flight [`ExceptionRecord`]: type, payload, origin
//! - [`runtime`] - the engine: per-thread frame stack, the stage state
//!   machine, raising, and propagation
//! - [`block`] - the [`Guarded`] builder that packages the engine's driver
//!   protocol as a try/catch/finally construct
//! - [`prelude`] - convenient re-exports of all of the above
//!
//! The primitives in [`runtime`] ([`runtime::enter_block`],
//! [`runtime::advance`], [`runtime::raise`], [`runtime::current_exception`])
//! are public for alternative binding layers, but almost all code should use
//! [`Guarded`].
//!
//! ## Panics and Unwinding
//!
//! The non-local transfer rides the standard unwinding machinery with a
//! private token, so the crate requires the default `panic = "unwind"`
//! strategy. Ordinary Rust panics are *not* converted into exceptions: a
//! panic crossing a guarded block still runs that block's finalizer once,
//! then continues unwinding as a panic.
//!
//! ## Error Handling
//!
//! Conditions inside guarded code are exceptions, not `Result`s; the crate's
//! [`Error`] covers only configuration misuse (see
//! [`runtime::set_max_frames`]). The engine's own faults - exceeding the
//! nested-block limit, rethrowing with nothing in flight - are raised as the
//! built-in [`EXCEPTION`] root and are catchable like any user type.

mod error;

/// Convenient re-exports of the most commonly used types and functions.
pub mod prelude;

/// Exception type nodes and the ancestor-matching hierarchy.
///
/// Types are immutable static data compared by identity; see
/// [`hierarchy::ExceptionType`] and the built-in root
/// [`hierarchy::EXCEPTION`].
pub mod hierarchy;

/// The in-flight exception record: type, opaque payload, and origin.
pub mod record;

/// The runtime engine: frame stack, stage state machine, raising, and
/// propagation.
///
/// Exposes the four primitives a binding layer drives
/// ([`runtime::enter_block`], [`runtime::advance`], [`runtime::raise`],
/// [`runtime::current_exception`]) plus per-thread configuration of the
/// frame-stack capacity.
pub mod runtime;

/// The guarded-block construct built on the engine primitives.
pub mod block;

/// `guardrail` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] used by the
/// configuration surface of the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// `guardrail` Error type
///
/// Covers configuration misuse only; in-flight conditions are exceptions,
/// not errors.
pub use error::Error;

/// The guarded-block builder, the main entry point of the crate.
///
/// # Example
///
/// ```rust
/// use guardrail::Guarded;
/// let value = Guarded::new(|| 21 * 2).run();
/// assert_eq!(value, 42);
/// ```
pub use block::Guarded;

/// Exception type nodes and the built-in hierarchy root.
pub use hierarchy::{ExceptionType, EXCEPTION};

/// The snapshot of the exception currently in flight.
pub use record::ExceptionRecord;

/// Raising, rethrowing, and inspecting the current exception.
pub use runtime::{current_exception, raise, reraise};
