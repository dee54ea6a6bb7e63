use anyhow::Context;
use postureguard_domain::model::RawFact;
use postureguard_domain::report::TargetOutcome;
use postureguard_types::SkipCause;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared stop signal: a user abort flag plus an optional deadline.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    aborted: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self::with_abort_flag(Arc::new(AtomicBool::new(false)), timeout)
    }

    /// Share a flag that was handed to a signal handler before the run was configured.
    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_abort_flag(aborted: Arc<AtomicBool>, timeout: Option<Duration>) -> Self {
        Self {
            aborted,
            deadline: timeout.and_then(|t| Instant::now().checked_add(t)),
        }
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_reason().is_some()
    }

    pub fn cancel_reason(&self) -> Option<&'static str> {
        if self.aborted.load(Ordering::SeqCst) {
            Some("run aborted")
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some("timeout reached")
        } else {
            None
        }
    }
}

/// Anything the pool can schedule: it only needs the target key for skip records.
pub trait TargetKey {
    fn target_key(&self) -> &str;
}

impl TargetKey for String {
    fn target_key(&self) -> &str {
        self
    }
}

impl TargetKey for RawFact {
    fn target_key(&self) -> &str {
        &self.target
    }
}

/// Bounded pool that evaluates targets independently.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    cancel: Cancellation,
}

impl WorkerPool {
    pub fn new(workers: usize, cancel: Cancellation) -> anyhow::Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("postureguard-worker-{i}"))
            .build()
            .context("build worker pool")?;
        Ok(Self { pool, cancel })
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    /// Run `work` once per target. Once cancelled, targets not yet started are
    /// reported as skipped; started ones finish. Outcomes keep input order.
    pub fn run<I, T, F>(&self, targets: &[I], work: F) -> Vec<TargetOutcome<T>>
    where
        I: TargetKey + Sync,
        T: Send,
        F: Fn(&I) -> TargetOutcome<T> + Sync + Send,
    {
        let cancel = &self.cancel;
        self.pool.install(|| {
            targets
                .par_iter()
                .map(|target| match cancel.cancel_reason() {
                    Some(reason) => TargetOutcome::Skipped {
                        target: target.target_key().to_string(),
                        cause: SkipCause::Cancelled,
                        reason: reason.to_string(),
                    },
                    None => work(target),
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("t{i:02}")).collect()
    }

    #[test]
    fn outcomes_keep_input_order() {
        let pool = WorkerPool::new(4, Cancellation::new(None)).expect("pool");
        let out = pool.run(&targets(20), |t| TargetOutcome::Evaluated {
            target: t.to_string(),
            value: t.len(),
            warnings: Vec::new(),
        });
        let order: Vec<&str> = out.iter().map(|o| o.target()).collect();
        assert_eq!(order, targets(20));
    }

    #[test]
    fn aborted_pool_skips_every_target() {
        let cancel = Cancellation::new(None);
        cancel.abort();
        let pool = WorkerPool::new(2, cancel).expect("pool");
        let out: Vec<TargetOutcome<()>> = pool.run(&targets(5), |_| panic!("must not run"));
        assert!(out.iter().all(|o| matches!(
            o,
            TargetOutcome::Skipped {
                cause: SkipCause::Cancelled,
                ..
            }
        )));
    }

    #[test]
    fn expired_deadline_reports_timeout() {
        let cancel = Cancellation::new(Some(Duration::ZERO));
        assert_eq!(cancel.cancel_reason(), Some("timeout reached"));
    }

    #[test]
    fn unrepresentable_timeout_means_no_deadline() {
        let cancel = Cancellation::new(Some(Duration::from_secs(u64::MAX)));
        assert_eq!(cancel.cancel_reason(), None);

        let pool = WorkerPool::new(2, cancel).expect("pool");
        let out = pool.run(&targets(3), |t| TargetOutcome::Evaluated {
            target: t.to_string(),
            value: (),
            warnings: Vec::new(),
        });
        assert!(out.iter().all(|o| matches!(o, TargetOutcome::Evaluated { .. })));
    }

    #[test]
    fn abort_during_run_skips_remaining_targets() {
        let pool = WorkerPool::new(1, Cancellation::new(None)).expect("pool");
        let handle = pool.cancellation().clone();
        let out = pool.run(&targets(10), |t| {
            if t.as_str() == "t02" {
                handle.abort();
            }
            TargetOutcome::Evaluated {
                target: t.to_string(),
                value: (),
                warnings: Vec::new(),
            }
        });
        let evaluated = out
            .iter()
            .filter(|o| matches!(o, TargetOutcome::Evaluated { .. }))
            .count();
        assert!(evaluated >= 3);
        assert!(evaluated < 10);
    }
}
