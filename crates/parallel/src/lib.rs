//! Worker pools and order-preserving parallel maps for the pair scanner.
//!
//! The `parallel` feature (on by default) backs these helpers with rayon;
//! without it every helper runs on the calling thread. Keeping the `cfg`
//! switches in this crate leaves call sites free of them.
//!
//! # Work split
//!
//! [`partition`] cuts an ordered work list into contiguous ranges, one per
//! worker, [`with_pool`] runs a computation on a pool of exactly that many
//! threads, and [`flat_map_ranges`] concatenates per-range output in range
//! order, so results never depend on scheduling.
//!
//! `force_sequential` forces a single-threaded walk at runtime even when the
//! feature is enabled; the scanner uses it for one-thread runs.
//!
//! # Example
//!
//! ```
//! let pairs: Vec<u32> = (0..10).collect();
//! let ranges = parallel::partition(pairs.len(), 3);
//!
//! let sums = parallel::with_pool(3, || {
//!     parallel::map_slice(&ranges, |r| pairs[r.clone()].iter().sum::<u32>(), false)
//! })
//! .unwrap();
//! assert_eq!(sums.iter().sum::<u32>(), 45);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use std::ops::Range;

// =============================================================================
// Errors
// =============================================================================

/// Worker pool could not be created.
#[derive(Debug, thiserror::Error)]
#[error("failed to build worker pool with {threads} threads: {reason}")]
pub struct PoolError {
    pub threads: usize,
    pub reason: String,
}

// =============================================================================
// Pools and Partitioning
// =============================================================================

/// Number of workers for a configured count; 0 means hardware concurrency.
pub fn resolve_threads(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Run `op` on a dedicated pool of `threads` workers (0 = hardware concurrency).
///
/// Parallel helpers called inside `op` use this pool. Without the `parallel`
/// feature `op` simply runs on the caller's thread.
pub fn with_pool<OP, R>(threads: usize, op: OP) -> Result<R, PoolError>
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    let threads = resolve_threads(threads);

    #[cfg(feature = "parallel")]
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("pair-worker-{i}"))
            .build()
            .map_err(|e| PoolError {
                threads,
                reason: e.to_string(),
            })?;
        Ok(pool.install(op))
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = threads;
        Ok(op())
    }
}

/// Split `0..len` into at most `parts` contiguous, non-empty, ordered ranges
/// whose sizes differ by at most one.
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1).min(len);
    if parts == 0 {
        return Vec::new();
    }
    let base = len / parts;
    let extra = len % parts;
    let mut start = 0;
    (0..parts)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

// =============================================================================
// Slice Operations
// =============================================================================

/// Map a function over a slice, potentially in parallel.
///
/// Returns a Vec of results in the same order as input (parallel preserves order).
///
/// # Parameters
/// - `force_sequential`: When true, forces sequential execution even if parallel feature is enabled
#[inline]
pub fn map_slice<T, F, R>(slice: &[T], f: F, force_sequential: bool) -> Vec<R>
where
    T: Sync,
    F: Fn(&T) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            slice.iter().map(f).collect()
        } else {
            slice.par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        slice.iter().map(f).collect()
    }
}

// =============================================================================
// Range Operations
// =============================================================================

/// Process each contiguous range on its own worker and concatenate the
/// per-range outputs in range order.
///
/// `f` receives the range index and the range; a worker walks its range
/// sequentially.
pub fn flat_map_ranges<F, R>(ranges: &[Range<usize>], f: F, force_sequential: bool) -> Vec<R>
where
    F: Fn(usize, Range<usize>) -> Vec<R> + Sync + Send,
    R: Send,
{
    let indexed: Vec<(usize, Range<usize>)> = ranges.iter().cloned().enumerate().collect();
    map_slice(&indexed, |(i, r)| f(*i, r.clone()), force_sequential)
        .into_iter()
        .flatten()
        .collect()
}
