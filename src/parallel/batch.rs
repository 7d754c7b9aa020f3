//! Batch resolution of independent matchups.
//!
//! Each matchup's stage sequence is strictly ordered, but separate matchups
//! share nothing, so a batch fans out across the worker pool. Output order
//! always follows input order.

use rayon::prelude::*;
use tracing::info;

use crate::combat::{Matchup, ModifierSet, ResolutionResult};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::parallel::pool::WorkerPool;

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use mathhammer::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + usize::from(i < remainder);
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Resolve every matchup on the calling thread.
pub fn resolve_sequential(
    matchups: &[Matchup<'_>],
    modifiers: &ModifierSet,
    config: &EngineConfig,
) -> Vec<ResolutionResult> {
    matchups
        .iter()
        .map(|matchup| matchup.resolve(modifiers, config))
        .collect()
}

/// Resolve every matchup across `pool`.
pub fn resolve_batch(
    matchups: &[Matchup<'_>],
    modifiers: &ModifierSet,
    config: &EngineConfig,
    pool: &WorkerPool,
) -> Result<Vec<ResolutionResult>> {
    info!(
        matchups = matchups.len(),
        workers = pool.workers,
        "resolving batch"
    );
    pool.install(|| {
        matchups
            .par_iter()
            .map(|matchup| matchup.resolve(modifiers, config))
            .collect()
    })
}

/// Resolve `matchups` in `num_batches` chunks, reporting `(done, total)` after each.
pub fn resolve_batch_with_progress<F>(
    matchups: &[Matchup<'_>],
    modifiers: &ModifierSet,
    config: &EngineConfig,
    pool: &WorkerPool,
    num_batches: usize,
    mut on_progress: F,
) -> Result<Vec<ResolutionResult>>
where
    F: FnMut(usize, usize),
{
    let total = matchups.len();
    let mut results = Vec::with_capacity(total);
    on_progress(0, total);
    for (start, end) in batch_ranges(total, num_batches) {
        results.extend(resolve_batch(&matchups[start..end], modifiers, config, pool)?);
        on_progress(end, total);
    }
    Ok(results)
}
