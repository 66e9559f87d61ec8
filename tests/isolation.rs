//! Thread-isolation integration tests.
//!
//! Every thread owns an independent execution context: raising, handling,
//! and configuration on one thread must never perturb another thread's frame
//! stack, exception record, or capacity. The engine holds no shared state,
//! so these tests pass without any synchronization on the crate's side.

use std::thread;

use guardrail::prelude::*;
use guardrail::runtime::{max_frames, open_blocks, set_max_frames, DEFAULT_MAX_FRAMES};
use rayon::prelude::*;

static WORKER_ERROR: ExceptionType = ExceptionType::new("WorkerError", &EXCEPTION);

#[test]
fn test_threads_have_independent_contexts() {
    let handles: Vec<_> = (0..8_usize)
        .map(|i| {
            thread::spawn(move || {
                Guarded::new(move || -> usize {
                    if i % 2 == 0 {
                        raise(&WORKER_ERROR, i)
                    } else {
                        i
                    }
                })
                .catch(&WORKER_ERROR, |raised| {
                    *raised.payload_ref::<usize>().unwrap() + 100
                })
                .run()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let value = handle.join().unwrap();
        let expected = if i % 2 == 0 { i + 100 } else { i };
        assert_eq!(value, expected);
    }
}

#[test]
fn test_record_is_thread_local() {
    thread::spawn(|| {
        Guarded::new(|| raise(&WORKER_ERROR, ()))
            .catch(&WORKER_ERROR, |_| ())
            .run();
    })
    .join()
    .unwrap();

    // The other thread's handled exception never existed here.
    assert!(current_exception().is_none());
    assert_eq!(open_blocks(), 0);
}

#[test]
fn test_max_frames_is_per_thread() {
    set_max_frames(2).unwrap();
    assert_eq!(max_frames(), 2);

    let elsewhere = thread::spawn(max_frames).join().unwrap();
    assert_eq!(elsewhere, DEFAULT_MAX_FRAMES);
}

#[test]
fn test_parallel_guarded_blocks() {
    let outcomes: Vec<u64> = (0_u64..256)
        .into_par_iter()
        .map(|i| {
            let value = Guarded::new(move || -> u64 {
                if i % 3 == 0 {
                    raise(&WORKER_ERROR, i)
                } else {
                    i
                }
            })
            .catch(&WORKER_ERROR, |raised| {
                *raised.payload_ref::<u64>().unwrap() * 2
            })
            .finally(|| {})
            .run();

            // Worker threads are reused; every block must leave the thread's
            // stack balanced or later items would inherit stale frames.
            assert_eq!(open_blocks(), 0);
            value
        })
        .collect();

    for (i, value) in outcomes.iter().enumerate() {
        let i = i as u64;
        let expected = if i % 3 == 0 { i * 2 } else { i };
        assert_eq!(*value, expected);
    }
}
