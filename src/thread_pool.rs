//! Shared thread pool for survey workers.
//!
//! Every Ising fit walks a `2^n` state space inside nested optimizer and
//! line-search frames, so workers get 8 MB stacks instead of rayon's 2 MB.

#[cfg(feature = "parallel")]
use rayon::ThreadPool;

#[cfg(feature = "parallel")]
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
static THREAD_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

/// Worker stack size.
#[cfg(feature = "parallel")]
const STACK_SIZE: usize = 8 * 1024 * 1024;

/// Get or initialize the shared survey pool.
///
/// One worker per logical CPU. Returns `None` if the pool could not be
/// built, in which case work runs on rayon's global pool.
#[cfg(feature = "parallel")]
pub fn get_thread_pool() -> Option<&'static ThreadPool> {
    THREAD_POOL
        .get_or_init(|| {
            rayon::ThreadPoolBuilder::new()
                .stack_size(STACK_SIZE)
                .thread_name(|i| format!("netstate-worker-{i}"))
                .build()
                .map_err(|e| tracing::warn!(error = %e, "falling back to the global rayon pool"))
                .ok()
        })
        .as_ref()
}

/// Run `op` inside the shared pool, so parallel iterators in `op` use it.
#[cfg(feature = "parallel")]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match get_thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Without the `parallel` feature there is no pool; run `op` directly.
#[cfg(not(feature = "parallel"))]
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R,
{
    op()
}

#[cfg(all(test, feature = "parallel"))]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_install_runs_on_pool() {
        let sum: u64 = install(|| (1..=100u64).into_par_iter().sum());
        assert_eq!(sum, 5050);
    }

    #[test]
    fn test_workers_are_named() {
        let name = install(|| {
            rayon::join(
                || std::thread::current().name().map(str::to_owned),
                || (),
            )
            .0
        });
        if get_thread_pool().is_some() {
            assert!(name.is_some_and(|n| n.starts_with("netstate-worker-")));
        }
    }
}
