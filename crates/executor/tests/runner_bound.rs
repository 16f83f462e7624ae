//! Wall-clock proof that the pool is bounded but parallel, using real
//! processes.
#![cfg(unix)]

use gridbench_core::{Invocation, Role};
use gridbench_executor::ConcurrentRunner;
use std::time::{Duration, Instant};

const DELAY: Duration = Duration::from_millis(400);

fn sleepers(n: usize) -> Vec<Invocation> {
    (0..n)
        .map(|i| Invocation::new(i, Role::Measure, format!("sleep {}; echo {}", DELAY.as_secs_f64(), i)))
        .collect()
}

#[test]
fn test_two_workers_five_sleeps() {
    let runner = ConcurrentRunner::new(2).unwrap();
    let start = Instant::now();
    let results = runner.run(sleepers(5));
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 5);
    assert!(elapsed >= DELAY * 3, "finished too fast: {:?}", elapsed);
    assert!(elapsed < DELAY * 5, "ran serially: {:?}", elapsed);

    let mut ids: Vec<_> = results.iter().map(|r| r.item_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    for r in &results {
        assert!(r.status.is_success());
        assert_eq!(r.captured.trim(), r.item_id.to_string());
    }
}

#[test]
fn test_failures_do_not_abort_batch() {
    let runner = ConcurrentRunner::new(3).unwrap();
    let invocations = vec![
        Invocation::new(0, Role::Build, "echo ok"),
        Invocation::new(1, Role::Build, "echo boom >&2; exit 7"),
        Invocation::new(2, Role::Build, "/nonexistent/gridbench-binary"),
        Invocation::new(3, Role::Build, "echo also ok"),
    ];
    let mut results = runner.run(invocations);
    results.sort_by_key(|r| r.item_id);

    assert_eq!(results.len(), 4);
    assert!(results[0].status.is_success());
    assert_eq!(results[1].captured, "boom\n");
    assert!(!results[1].status.is_success());
    // The shell's "not found" message is part of the capture
    assert!(!results[2].status.is_success());
    assert!(!results[2].captured.is_empty());
    assert_eq!(results[3].captured, "also ok\n");
}
