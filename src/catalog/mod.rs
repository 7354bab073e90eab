//! Catalog - named files plus the one buffer pool that caches them.
//!
//! The [`Catalog`] is the context object callers construct once and pass
//! around. It owns:
//! - a file table mapping file names to backing stores
//! - the single [`BufferPool`] serving every file
//!
//! The catalog is the only way to reach the pool's loading and flushing
//! operations. Dropping (or [`closing`](Catalog::close)) it flushes every
//! dirty page.

use log::{debug, error, info};

use crate::buffer::BufferPool;
use crate::common::config::DEFAULT_POOL_CAPACITY;
use crate::common::{Error, PageId, Result};
use crate::storage::{BackingStore, FileTable, Page};

/// Registry of named backing stores owning the buffer pool.
///
/// # Example
/// ```
/// use pagepool::{Catalog, MemoryStore, PageId};
///
/// let store = MemoryStore::with_blocks(8);
/// let mut catalog = Catalog::with_capacity(4);
/// catalog.add("orders", Box::new(store.clone())).unwrap();
///
/// let pid = PageId::new("orders", 3);
/// catalog.get_page(&pid).unwrap().as_mut_slice()[0] = 42;
/// catalog.mark_dirty(&pid).unwrap();
///
/// // Removing a file writes its dirty pages back first
/// catalog.remove("orders").unwrap();
/// assert_eq!(store.snapshot(3).unwrap().as_slice()[0], 42);
/// ```
pub struct Catalog {
    files: FileTable,
    pool: BufferPool,
    /// Set by `close`, which has already flushed and reported the result.
    closed: bool,
}

impl Catalog {
    /// Create a catalog whose pool has the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Create a catalog whose pool holds `capacity` pages.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            files: FileTable::new(),
            pool: BufferPool::new(capacity),
            closed: false,
        }
    }

    // ========================================================================
    // File registration
    // ========================================================================

    /// Register `store` under `name`.
    ///
    /// # Errors
    /// `Error::AlreadyExists` if the name is already registered.
    pub fn add(&mut self, name: impl Into<String>, store: Box<dyn BackingStore>) -> Result<()> {
        let name = name.into();
        info!("registering file '{}'", name);
        self.files.insert(name, store)
    }

    /// Unregister `name` and return its store.
    ///
    /// The file's dirty pages are flushed first, then its resident pages are
    /// dropped from the pool so a later file registered under the same name
    /// never sees stale content.
    ///
    /// # Errors
    /// - `Error::NotFound` if the name is not registered
    /// - any error from flushing; the file then stays registered
    pub fn remove(&mut self, name: &str) -> Result<Box<dyn BackingStore>> {
        if !self.files.contains(name) {
            return Err(Error::NotFound(name.to_string()));
        }

        self.pool.flush_file(name, &mut self.files)?;

        let cached: Vec<PageId> = self
            .pool
            .recency_order()
            .filter(|pid| pid.file() == name)
            .cloned()
            .collect();
        for pid in &cached {
            self.pool.discard_page(pid)?;
        }

        info!("removed file '{}' ({} cached pages dropped)", name, cached.len());
        self.files.remove(name)
    }

    /// # Errors
    /// `Error::NotFound` if the name is not registered.
    pub fn get(&self, name: &str) -> Result<&dyn BackingStore> {
        self.files.get(name)
    }

    /// # Errors
    /// `Error::NotFound` if the name is not registered.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut dyn BackingStore> {
        self.files.get_mut(name)
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.names()
    }

    // ========================================================================
    // Buffer pool access
    // ========================================================================

    /// Read-only view of the pool, for queries and stats.
    pub fn buffer_pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Return the page for `pid`, loading it if necessary.
    ///
    /// On a hit the page becomes the most recently used. On a miss with a
    /// full pool the least recently used page is evicted first, written back
    /// if dirty.
    ///
    /// # Errors
    /// - `Error::NotFound` if `pid`'s file is not registered; nothing is
    ///   evicted
    /// - `Error::Io` if the victim's write-back fails (the victim stays
    ///   resident and dirty) or the read fails (nothing is inserted)
    pub fn get_page(&mut self, pid: &PageId) -> Result<&mut Page> {
        self.pool.get_page(pid, &mut self.files)
    }

    /// Record that the resident page `pid` has been modified.
    ///
    /// # Errors
    /// `Error::NotResident` if `pid` is not cached.
    pub fn mark_dirty(&mut self, pid: &PageId) -> Result<()> {
        self.pool.mark_dirty(pid)
    }

    /// # Errors
    /// `Error::NotResident` if `pid` is not cached.
    pub fn is_dirty(&self, pid: &PageId) -> Result<bool> {
        self.pool.is_dirty(pid)
    }

    /// Whether `pid` is cached.
    pub fn contains(&self, pid: &PageId) -> bool {
        self.pool.contains(pid)
    }

    /// Drop `pid` from the pool without writing it back.
    ///
    /// # Errors
    /// `Error::NotResident` if `pid` is not cached.
    pub fn discard_page(&mut self, pid: &PageId) -> Result<()> {
        self.pool.discard_page(pid)
    }

    /// Write `pid` back if dirty and mark it clean.
    ///
    /// # Errors
    /// - `Error::NotResident` if `pid` is not cached
    /// - `Error::Io` if the write fails; the page stays dirty
    pub fn flush_page(&mut self, pid: &PageId) -> Result<()> {
        self.pool.flush_page(pid, &mut self.files)
    }

    /// Flush every dirty page of `name`, in block order, stopping at the
    /// first failure.
    pub fn flush_file(&mut self, name: &str) -> Result<()> {
        self.pool.flush_file(name, &mut self.files)
    }

    /// Flush every dirty page, stopping at the first failure.
    pub fn flush_all_pages(&mut self) -> Result<()> {
        self.pool.flush_all_pages(&mut self.files)
    }

    /// Zero the pool's counters.
    pub fn reset_stats(&mut self) {
        self.pool.reset_stats();
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Flush every dirty page and shut down, reporting any failure.
    ///
    /// Dropping the catalog flushes too, but can only log errors. A failed
    /// close is not retried on drop; unflushed pages are lost.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.flush_all_pages()?;
        debug!("catalog closed: {}", self.pool.stats());
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.pool.flush_all_pages(&mut self.files) {
            error!("failed to flush buffer pool on teardown: {}", err);
        }
    }
}
