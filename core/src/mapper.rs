//! Map primitives handed to workloads.
//!
//! A workload never spawns threads itself: it expresses its parallel part as
//! a map over independent inputs and the [`Mapper`] decides whether that map
//! runs in order on the calling thread or on a pool of worker threads.

use anyhow::{Result, anyhow};
use rayon::prelude::*;
use std::ops::Range;

/// Split `0..len` into `parts` contiguous ranges of `len / parts` elements;
/// the last range absorbs the remainder and always ends at `len`, so every
/// index is covered exactly once. `parts == 0` is treated as 1.
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let chunk = len / parts;
    (0..parts)
        .map(|idx| {
            let start = idx * chunk;
            let end = if idx + 1 == parts { len } else { start + chunk };
            start..end
        })
        .collect()
}

/// Fixed-size pool of worker threads. Threads are joined when the pool is
/// dropped.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(anyhow!("worker pool needs at least one worker"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|idx| format!("skperf-worker-{idx}"))
            .build()
            .map_err(|e| anyhow!("Failed to create worker pool: {}", e))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `f` to every item on the pool; results keep the input order.
    pub fn map<T, R, F>(&self, f: F, items: Vec<T>) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        self.pool.install(|| items.into_par_iter().map(f).collect())
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool").field("workers", &self.workers).finish()
    }
}

#[derive(Debug)]
pub enum Mapper {
    /// Apply the function to each element in order on the calling thread.
    Sequential,
    Pool(WorkerPool),
}

impl Mapper {
    /// Sequential for one worker, pool-backed otherwise.
    pub fn with_workers(workers: usize) -> Result<Self> {
        match workers {
            0 => Err(anyhow!("parallelism degree must be at least 1")),
            1 => Ok(Mapper::Sequential),
            n => Ok(Mapper::Pool(WorkerPool::new(n)?)),
        }
    }

    pub fn workers(&self) -> usize {
        match self {
            Mapper::Sequential => 1,
            Mapper::Pool(pool) => pool.workers(),
        }
    }

    pub fn map<T, R, F>(&self, f: F, items: Vec<T>) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        match self {
            Mapper::Sequential => items.into_iter().map(f).collect(),
            Mapper::Pool(pool) => pool.map(f, items),
        }
    }

    /// Like [`Mapper::map`] for fallible functions; the first error in input
    /// order wins.
    pub fn try_map<T, R, F>(&self, f: F, items: Vec<T>) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R> + Send + Sync,
    {
        self.map(f, items).into_iter().collect()
    }
}
