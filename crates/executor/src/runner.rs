//! Bounded concurrent execution of invocations.
//!
//! A fixed pool of worker threads pulls invocations from a shared queue.
//! Each worker owns one process at a time from spawn to exit, so at most
//! `workers` processes are alive at once. Finished captures go into a single
//! synchronized collector; their order is completion order and carries no
//! meaning (the aggregator restores grid order by id).
//!
//! There is no per-invocation timeout: a process that never exits holds its
//! worker slot forever.

use gridbench_core::{Error, Invocation, InvocationStatus, RawResult, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs one invocation to completion and captures its output.
///
/// Implementations must block until the process has exited and must never
/// panic on a failing process; failures belong in the returned status.
pub trait ProcessLauncher: Send + Sync {
    /// Run `invocation` and return its capture
    fn launch(&self, invocation: &Invocation) -> RawResult;
}

/// Runs commands through `sh -c` with stderr merged into stdout
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    shell: String,
}

impl ShellLauncher {
    /// Launcher using a specific shell binary
    pub fn with_shell(shell: impl Into<String>) -> Self {
        ShellLauncher {
            shell: shell.into(),
        }
    }
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self::with_shell("sh")
    }
}

impl ProcessLauncher for ShellLauncher {
    fn launch(&self, invocation: &Invocation) -> RawResult {
        // Redirect inside the shell so both streams share one pipe and keep
        // their relative order.
        let script = format!("exec 2>&1\n{}", invocation.command);
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(output) => {
                let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
                // Only non-empty if the shell itself failed before the redirect
                captured.push_str(&String::from_utf8_lossy(&output.stderr));
                let status = match output.status.code() {
                    Some(0) => InvocationStatus::Success,
                    code => InvocationStatus::Failed { exit_code: code },
                };
                RawResult::new(invocation, captured, status)
            }
            Err(e) => RawResult::new(
                invocation,
                String::new(),
                InvocationStatus::SpawnFailed {
                    reason: format!("{}: {}", self.shell, e),
                },
            ),
        }
    }
}

/// Executes invocations with at most `workers` in flight
#[derive(Debug)]
pub struct ConcurrentRunner<L = ShellLauncher> {
    workers: usize,
    launcher: L,
}

impl ConcurrentRunner<ShellLauncher> {
    /// Runner spawning real processes through `sh`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `workers` is zero.
    pub fn new(workers: usize) -> Result<Self> {
        Self::with_launcher(workers, ShellLauncher::default())
    }
}

impl<L: ProcessLauncher> ConcurrentRunner<L> {
    /// Runner using a custom launcher
    pub fn with_launcher(workers: usize, launcher: L) -> Result<Self> {
        if workers == 0 {
            return Err(Error::configuration("worker count must be at least 1"));
        }
        Ok(ConcurrentRunner { workers, launcher })
    }

    /// Parallelism bound
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Launcher used for every invocation
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Run every invocation and return one capture per invocation, in
    /// completion order
    pub fn run(&self, invocations: Vec<Invocation>) -> Vec<RawResult> {
        let total = invocations.len();
        if total == 0 {
            return Vec::new();
        }

        let queue = Mutex::new(VecDeque::from(invocations));
        let results = Mutex::new(Vec::with_capacity(total));
        let pool_size = self.workers.min(total);
        let started = Instant::now();
        info!(invocations = total, workers = pool_size, "starting batch");

        std::thread::scope(|scope| {
            let mut spawned = 0;
            for i in 0..pool_size {
                let spawn = std::thread::Builder::new()
                    .name(format!("gridbench-worker-{}", i))
                    .spawn_scoped(scope, || self.worker_loop(&queue, &results));
                match spawn {
                    Ok(_) => spawned += 1,
                    Err(e) => error!(worker = i, error = %e, "failed to spawn worker thread"),
                }
            }
            // Never leave the queue undrained
            if spawned == 0 {
                self.worker_loop(&queue, &results);
            }
        });

        let results = results.into_inner();
        let failed = results.iter().filter(|r| !r.status.is_success()).count();
        info!(
            invocations = results.len(),
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );
        results
    }

    fn worker_loop(&self, queue: &Mutex<VecDeque<Invocation>>, results: &Mutex<Vec<RawResult>>) {
        loop {
            let next = queue.lock().pop_front();
            let Some(invocation) = next else {
                return;
            };

            debug!(item = invocation.item_id, role = %invocation.role, command = %invocation.command, "spawning");
            let launched = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                self.launcher.launch(&invocation)
            }));
            let result = launched.unwrap_or_else(|e| {
                let reason = e
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| e.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "(non-string panic)".to_string());
                RawResult::new(
                    &invocation,
                    String::new(),
                    InvocationStatus::SpawnFailed {
                        reason: format!("launcher panicked: {}", reason),
                    },
                )
            });

            if result.status.is_success() {
                debug!(item = result.item_id, role = %result.role, bytes = result.captured.len(), "invocation finished");
            } else {
                warn!(item = result.item_id, role = %result.role, status = %result.status, "invocation failed");
            }
            results.lock().push(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbench_core::Role;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Sleeps instead of spawning and records peak concurrency
    struct SleepLauncher {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SleepLauncher {
        fn new(delay: Duration) -> Self {
            SleepLauncher {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl ProcessLauncher for SleepLauncher {
        fn launch(&self, invocation: &Invocation) -> RawResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            RawResult::new(
                invocation,
                format!("done {}", invocation.item_id),
                InvocationStatus::Success,
            )
        }
    }

    struct PanickingLauncher;

    impl ProcessLauncher for PanickingLauncher {
        fn launch(&self, invocation: &Invocation) -> RawResult {
            if invocation.item_id == 1 {
                panic!("launcher exploded");
            }
            RawResult::new(invocation, String::new(), InvocationStatus::Success)
        }
    }

    fn invocations(n: usize) -> Vec<Invocation> {
        (0..n)
            .map(|i| Invocation::new(i, Role::Measure, format!("cmd {}", i)))
            .collect()
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = ConcurrentRunner::new(0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_every_invocation_returns_once() {
        let runner =
            ConcurrentRunner::with_launcher(3, SleepLauncher::new(Duration::from_millis(5))).unwrap();
        let mut results = runner.run(invocations(10));
        assert_eq!(results.len(), 10);
        results.sort_by_key(|r| r.item_id);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.item_id, i);
            assert_eq!(r.captured, format!("done {}", i));
        }
    }

    #[test]
    fn test_peak_concurrency_bounded() {
        let runner =
            ConcurrentRunner::with_launcher(2, SleepLauncher::new(Duration::from_millis(30))).unwrap();
        runner.run(invocations(6));
        let peak = runner.launcher.peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "peak concurrency {} exceeds bound", peak);
        assert_eq!(peak, 2);
    }

    #[test]
    fn test_single_worker_is_serial() {
        let runner =
            ConcurrentRunner::with_launcher(1, SleepLauncher::new(Duration::from_millis(5))).unwrap();
        runner.run(invocations(4));
        assert_eq!(runner.launcher.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_batch() {
        let runner = ConcurrentRunner::new(4).unwrap();
        assert!(runner.run(Vec::new()).is_empty());
    }

    #[test]
    fn test_launcher_panic_recorded_not_propagated() {
        let runner = ConcurrentRunner::with_launcher(2, PanickingLauncher).unwrap();
        let mut results = runner.run(invocations(3));
        results.sort_by_key(|r| r.item_id);
        assert_eq!(results.len(), 3);
        assert!(results[0].status.is_success());
        match &results[1].status {
            InvocationStatus::SpawnFailed { reason } => assert!(reason.contains("exploded")),
            other => panic!("expected SpawnFailed, got {:?}", other),
        }
        assert!(results[2].status.is_success());
    }

    #[test]
    #[cfg(unix)]
    fn test_shell_launcher_merges_streams() {
        let launcher = ShellLauncher::default();
        let inv = Invocation::new(0, Role::Build, "echo out; echo err >&2; echo out2");
        let result = launcher.launch(&inv);
        assert_eq!(result.status, InvocationStatus::Success);
        assert_eq!(result.captured, "out\nerr\nout2\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_shell_launcher_nonzero_exit() {
        let launcher = ShellLauncher::default();
        let inv = Invocation::new(0, Role::Build, "echo partial; exit 3");
        let result = launcher.launch(&inv);
        assert_eq!(result.status, InvocationStatus::Failed { exit_code: Some(3) });
        assert_eq!(result.captured, "partial\n");
    }

    #[test]
    fn test_shell_launcher_spawn_failure() {
        let launcher = ShellLauncher::with_shell("/nonexistent/gridbench-shell");
        let inv = Invocation::new(4, Role::Speed, "true");
        let result = launcher.launch(&inv);
        assert_eq!(result.item_id, 4);
        assert!(matches!(result.status, InvocationStatus::SpawnFailed { .. }));
        assert!(result.captured.is_empty());
    }
}
