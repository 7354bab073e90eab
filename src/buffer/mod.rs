//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between callers and the
//! backing stores. It holds a fixed number of pages and replaces the least
//! recently used one when full.
//!
//! # Components
//! - [`BufferPool`] - The page cache
//! - [`RecencyList`] - O(1) LRU ordering of resident page ids
//! - [`BufferPoolStats`] - Performance counters

mod buffer_pool;
pub mod recency;
mod stats;

pub use buffer_pool::BufferPool;
pub use recency::RecencyList;
pub use stats::BufferPoolStats;
