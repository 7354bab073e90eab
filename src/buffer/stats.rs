//! Buffer pool statistics tracking.

use std::fmt;

/// Counters kept by the buffer pool.
///
/// The pool is single-threaded, so these are plain integers updated in place
/// and copied out by [`BufferPool::stats`](crate::BufferPool::stats).
///
/// # Example
/// ```
/// use pagepool::BufferPoolStats;
///
/// let stats = BufferPoolStats {
///     cache_hits: 3,
///     cache_misses: 1,
///     ..Default::default()
/// };
/// assert_eq!(stats.hit_rate(), 0.75);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferPoolStats {
    /// Requests served from a resident page.
    pub cache_hits: u64,

    /// Requests that had to load a page.
    pub cache_misses: u64,

    /// Pages removed to make room for another.
    pub evictions: u64,

    /// Blocks read from backing stores.
    pub pages_read: u64,

    /// Blocks written to backing stores.
    pub pages_written: u64,

    /// Dirty pages cleared without a write because the store already held
    /// their exact content.
    pub writes_skipped: u64,
}

impl BufferPoolStats {
    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for BufferPoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.pages_read,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}
