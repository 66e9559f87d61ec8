//! Guarded-block integration tests.
//!
//! Exercises the public API end to end:
//! 1. Stage ordering for clean, handled, and propagating blocks
//! 2. Hierarchy matching (exact, ancestor, first-clause-wins)
//! 3. Propagation through nested blocks and rethrow
//! 4. Engine faults (depth overflow, reraise without an exception)
//! 5. Payloads, origins, and the lifetime of the in-flight record

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

use guardrail::prelude::*;
use guardrail::runtime::{open_blocks, set_max_frames};

static APP_ERROR: ExceptionType = ExceptionType::new("AppError", &EXCEPTION);
static IO_ERROR: ExceptionType = ExceptionType::new("IoError", &APP_ERROR);
static TIMEOUT: ExceptionType = ExceptionType::new("Timeout", &IO_ERROR);
static PARSE_ERROR: ExceptionType = ExceptionType::new("ParseError", &APP_ERROR);

#[test]
fn test_clean_block_trying_then_finalizing() {
    let order = RefCell::new(Vec::new());

    let value = Guarded::new(|| {
        order.borrow_mut().push("try");
        11
    })
    .catch(&APP_ERROR, |_| {
        order.borrow_mut().push("catch");
        0
    })
    .finally(|| order.borrow_mut().push("finally"))
    .run();

    assert_eq!(value, 11);
    assert_eq!(*order.borrow(), vec!["try", "finally"]);
    assert_eq!(open_blocks(), 0);
}

#[test]
fn test_ancestor_handler_accepts_descendant() {
    let runs = RefCell::new(0);

    let value = Guarded::new(|| -> u32 { raise(&TIMEOUT, "no answer") })
        .catch(&IO_ERROR, |raised| {
            *runs.borrow_mut() += 1;
            assert!(raised.exception_type().is(&TIMEOUT));
            assert!(raised.is_instance_of(&IO_ERROR));
            assert!(raised.is_instance_of(&EXCEPTION));
            7
        })
        .run();

    assert_eq!(value, 7);
    assert_eq!(*runs.borrow(), 1);
}

#[test]
fn test_first_matching_clause_wins() {
    let chosen = Guarded::new(|| -> &str { raise(&TIMEOUT, ()) })
        .catch(&PARSE_ERROR, |_| "parse")
        .catch(&APP_ERROR, |_| "app")
        .catch(&IO_ERROR, |_| "io")
        .run();

    // AppError is consulted before the more specific IoError clause.
    assert_eq!(chosen, "app");
}

#[test]
fn test_unmatched_propagates_after_finalizer() {
    let order = RefCell::new(Vec::new());

    let value = Guarded::new(|| {
        Guarded::new(|| -> i32 {
            order.borrow_mut().push("inner try");
            raise(&TIMEOUT, ())
        })
        .catch(&PARSE_ERROR, |_| {
            order.borrow_mut().push("inner catch");
            -1
        })
        .finally(|| order.borrow_mut().push("inner finally"))
        .run()
    })
    .catch(&IO_ERROR, |_| {
        order.borrow_mut().push("outer catch");
        -2
    })
    .finally(|| order.borrow_mut().push("outer finally"))
    .run();

    assert_eq!(value, -2);
    assert_eq!(
        *order.borrow(),
        vec!["inner try", "inner finally", "outer catch", "outer finally"]
    );
    assert_eq!(open_blocks(), 0);
}

#[test]
fn test_propagates_through_blocks_without_clauses() {
    let finals = RefCell::new(Vec::new());

    let caught = Guarded::new(|| {
        Guarded::new(|| {
            Guarded::new(|| -> String { raise(&PARSE_ERROR, "bad digit") })
                .finally(|| finals.borrow_mut().push("innermost"))
                .run()
        })
        .finally(|| finals.borrow_mut().push("middle"))
        .run()
    })
    .catch(&EXCEPTION, |raised| raised.message().unwrap_or("?").to_string())
    .run();

    assert_eq!(caught, "bad digit");
    assert_eq!(*finals.borrow(), vec!["innermost", "middle"]);
}

#[test]
fn test_reraise_preserves_type_payload_origin() {
    let observed = RefCell::new(Vec::new());
    let inner_finals = RefCell::new(0);

    let value = Guarded::new(|| {
        Guarded::new(|| -> u64 { raise(&TIMEOUT, 55_u64) })
            .catch(&IO_ERROR, |raised| {
                observed.borrow_mut().push((
                    raised.exception_type().name(),
                    raised.origin().map(|origin| origin.line()),
                ));
                reraise()
            })
            .finally(|| *inner_finals.borrow_mut() += 1)
            .run()
    })
    .catch(&IO_ERROR, |raised| {
        observed.borrow_mut().push((
            raised.exception_type().name(),
            raised.origin().map(|origin| origin.line()),
        ));
        *raised.payload_ref::<u64>().unwrap()
    })
    .run();

    assert_eq!(value, 55);
    assert_eq!(*inner_finals.borrow(), 1);

    // The rethrown record is the original: same type, same origin.
    let observed = observed.borrow();
    assert_eq!(observed.len(), 2);
    assert_eq!(observed[0], observed[1]);
    assert_eq!(observed[0].0, "Timeout");
}

#[test]
fn test_raise_inside_handler_replaces_exception() {
    let finals = RefCell::new(0);

    let name = Guarded::new(|| {
        Guarded::new(|| -> String { raise(&TIMEOUT, ()) })
            .catch(&TIMEOUT, |_| raise(&PARSE_ERROR, "gave up"))
            .finally(|| *finals.borrow_mut() += 1)
            .run()
    })
    .catch(&APP_ERROR, |raised| raised.exception_type().name().to_string())
    .run();

    assert_eq!(name, "ParseError");
    assert_eq!(*finals.borrow(), 1);
}

#[test]
fn test_raise_inside_finalizer_replaces_exception() {
    let name = Guarded::new(|| {
        Guarded::new(|| -> &'static str { raise(&TIMEOUT, ()) })
            .finally(|| raise(&PARSE_ERROR, ()))
            .run()
    })
    .catch(&APP_ERROR, |raised| raised.exception_type().name())
    .run();

    assert_eq!(name, "ParseError");
}

#[test]
fn test_finalizer_raise_on_clean_path_propagates() {
    let name = Guarded::new(|| {
        Guarded::new(|| "fine")
            .finally(|| raise(&PARSE_ERROR, ()))
            .run()
    })
    .catch(&PARSE_ERROR, |raised| raised.exception_type().name())
    .run();

    assert_eq!(name, "ParseError");
}

fn nest(levels: usize) -> usize {
    Guarded::new(|| {
        if levels == 0 {
            0
        } else {
            nest(levels - 1) + 1
        }
    })
    .run()
}

#[test]
fn test_depth_overflow_raises_catchable_root() {
    set_max_frames(8).unwrap();

    let outcome = Guarded::new(|| nest(64))
        .catch(&EXCEPTION, |raised| {
            assert!(raised.exception_type().is(&EXCEPTION));
            assert_eq!(raised.message(), Some("too many nested guarded blocks"));
            usize::MAX
        })
        .run();

    assert_eq!(outcome, usize::MAX);
    assert_eq!(open_blocks(), 0);
}

#[test]
fn test_origin_points_at_raise_site() {
    let (file, line) = Guarded::new(|| -> (String, u32) { raise(&PARSE_ERROR, ()) })
        .catch(&PARSE_ERROR, |raised| {
            let origin = raised.origin().expect("origin captured at the raise site");
            (origin.file().to_string(), origin.line())
        })
        .run();

    assert_eq!(file, file!());
    assert!(line > 0);
}

#[derive(Debug, PartialEq)]
struct Rejection {
    code: u16,
    retriable: bool,
}

#[test]
fn test_typed_payload_roundtrip() {
    let code = Guarded::new(|| -> u16 {
        raise(
            &IO_ERROR,
            Rejection {
                code: 503,
                retriable: true,
            },
        )
    })
    .catch(&IO_ERROR, |raised| {
        let rejection = raised.payload_ref::<Rejection>().expect("typed payload");
        assert!(rejection.retriable);
        assert!(raised.message().is_none());
        rejection.code
    })
    .run();

    assert_eq!(code, 503);
}

#[test]
fn test_record_persists_until_next_raise() {
    // Each test runs on a fresh thread, so nothing is in flight yet.
    assert!(current_exception().is_none());

    Guarded::new(|| raise(&PARSE_ERROR, ()))
        .catch(&PARSE_ERROR, |_| ())
        .run();

    let lingering = current_exception().expect("record outlives the block");
    assert!(lingering.exception_type().is(&PARSE_ERROR));
}

#[test]
fn test_nested_block_inside_handler() {
    let value = Guarded::new(|| -> i32 { raise(&IO_ERROR, ()) })
        .catch(&IO_ERROR, |_| {
            Guarded::new(|| -> i32 { raise(&PARSE_ERROR, ()) })
                .catch(&PARSE_ERROR, |_| 99)
                .run()
        })
        .run();

    assert_eq!(value, 99);
    assert_eq!(open_blocks(), 0);
}

#[test]
fn test_nested_block_inside_finalizer() {
    let cleanups = RefCell::new(0);

    let value = Guarded::new(|| 5)
        .finally(|| {
            Guarded::new(|| raise(&IO_ERROR, ()))
                .catch(&IO_ERROR, |_| *cleanups.borrow_mut() += 1)
                .run();
        })
        .run();

    assert_eq!(value, 5);
    assert_eq!(*cleanups.borrow(), 1);
}

#[test]
fn test_set_max_frames_rejected_inside_block() {
    let denied = Guarded::new(|| set_max_frames(64)).run();
    assert!(matches!(denied, Err(guardrail::Error::BlocksOpen(1))));
}

#[test]
fn test_foreign_panic_runs_finalizer_and_rebalances() {
    let finals = RefCell::new(0);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        Guarded::new(|| panic!("not an exception"))
            .catch(&EXCEPTION, |_| ())
            .finally(|| *finals.borrow_mut() += 1)
            .run()
    }));

    let payload = result.expect_err("panic must cross the block unchanged");
    assert_eq!(
        payload.downcast_ref::<&str>().copied(),
        Some("not an exception")
    );
    assert_eq!(*finals.borrow(), 1);
    assert_eq!(open_blocks(), 0);
}

#[test]
fn test_reraise_outside_exception_is_engine_fault() {
    let message = Guarded::new(|| -> String { reraise() })
        .catch(&EXCEPTION, |raised| {
            raised.message().unwrap_or_default().to_string()
        })
        .run();

    assert_eq!(message, "reraise with no exception in flight");
}
