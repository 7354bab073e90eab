//! Buffer Pool - the core page caching layer.
//!
//! The [`BufferPool`] provides:
//! - Page caching between backing stores and memory
//! - Strict LRU replacement
//! - Explicit dirty tracking with write-back before eviction
//! - Per-page, per-file and whole-pool flushing

use std::collections::HashMap;
use std::fmt;

use log::{debug, trace, warn};

use crate::buffer::recency::{self, RecencyList};
use crate::buffer::BufferPoolStats;
use crate::common::{Error, PageId, Result};
use crate::storage::{FileTable, Page};

/// A fixed-capacity cache of pages keyed by [`PageId`].
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                        BufferPool                           │
/// │  ┌─────────────────────────┐  ┌──────────────────────────┐  │
/// │  │ resident                │  │ recency: RecencyList     │  │
/// │  │ PageId → Box<Page>      │  │ MRU ⇄ ... ⇄ LRU          │  │
/// │  └─────────────────────────┘  └──────────────────────────┘  │
/// │  ┌─────────────────────────┐  ┌──────────────────────────┐  │
/// │  │ dirty                   │  │ capacity (fixed)         │  │
/// │  │ PageId → bool           │  │ stats                    │  │
/// │  └─────────────────────────┘  └──────────────────────────┘  │
/// └─────────────────────────────────────────────────────────────┘
///                 │ load / flush via FileTable
///                 ▼
///          BackingStore per file name
/// ```
///
/// # Invariants
/// After every public operation:
/// 1. at most `capacity` pages are resident
/// 2. `resident`, `recency` and `dirty` hold exactly the same ids
/// 3. an id appears at most once in `recency`
/// 4. only resident pages can be dirty
///
/// [`BufferPool::validate`] checks all of them. Debug builds check after
/// every mutation.
///
/// # Thread Safety
/// None. Every mutating call takes `&mut self`; callers that share a pool
/// across threads wrap the owning [`Catalog`](crate::Catalog) in one lock.
///
/// # Ownership
/// A pool only exists inside a [`Catalog`](crate::Catalog), which lends it
/// the file table for every load and flush and flushes it on teardown.
/// Callers get read-only access through
/// [`Catalog::buffer_pool`](crate::Catalog::buffer_pool).
///
/// ```compile_fail
/// // A standalone pool could be dropped with dirty pages nobody flushes
/// let pool = pagepool::BufferPool::new(2);
/// ```
pub struct BufferPool {
    /// Owned page buffers.
    resident: HashMap<PageId, Box<Page>>,

    /// Front = most recently used, back = next eviction victim.
    recency: RecencyList,

    /// Modified-since-last-flush flag for every resident page.
    dirty: HashMap<PageId, bool>,

    /// Number of page slots (immutable after construction).
    capacity: usize,

    stats: BufferPoolStats,
}

impl BufferPool {
    /// Create an empty buffer pool with `capacity` page slots.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            resident: HashMap::with_capacity(capacity),
            recency: RecencyList::with_capacity(capacity),
            dirty: HashMap::with_capacity(capacity),
            capacity,
            stats: BufferPoolStats::default(),
        }
    }

    // ========================================================================
    // Public API: Fetch pages
    // ========================================================================

    /// Return the page for `pid`, loading it if necessary.
    ///
    /// On a hit the page becomes the most recently used and no I/O happens.
    /// On a miss with a full pool, the least recently used page is evicted
    /// first (written back if dirty), then the block is read from the store
    /// registered under `pid.file()`.
    ///
    /// # Errors
    /// - `Error::NotFound` if no store is registered for the file. Nothing is
    ///   evicted.
    /// - `Error::Io` if writing back the victim fails. The victim stays
    ///   resident and dirty and the requested page is not loaded.
    /// - `Error::Io` if reading the block fails. The requested page is not
    ///   inserted; an eviction that already happened stays done.
    pub(crate) fn get_page(&mut self, pid: &PageId, files: &mut FileTable) -> Result<&mut Page> {
        if self.recency.touch(pid) {
            self.stats.cache_hits += 1;
            trace!("buffer pool hit for {}", pid);

            return match self.resident.get_mut(pid) {
                Some(page) => Ok(&mut **page),
                None => Err(Error::invariant(format!(
                    "{} is in the recency order but has no page",
                    pid
                ))),
            };
        }

        self.handle_miss(pid, files)
    }

    /// Look at a resident page without changing its recency.
    pub fn peek_page(&self, pid: &PageId) -> Option<&Page> {
        self.resident.get(pid).map(|page| &**page)
    }

    // ========================================================================
    // Public API: Dirty tracking
    // ========================================================================

    /// Record that the resident page `pid` has been modified.
    ///
    /// # Errors
    /// `Error::NotResident` if `pid` is not cached.
    pub(crate) fn mark_dirty(&mut self, pid: &PageId) -> Result<()> {
        match self.dirty.get_mut(pid) {
            Some(flag) => {
                *flag = true;
                Ok(())
            }
            None => Err(Error::NotResident(pid.clone())),
        }
    }

    /// # Errors
    /// `Error::NotResident` if `pid` is not cached.
    pub fn is_dirty(&self, pid: &PageId) -> Result<bool> {
        self.dirty
            .get(pid)
            .copied()
            .ok_or_else(|| Error::NotResident(pid.clone()))
    }

    /// Whether `pid` is cached. Never fails and changes nothing.
    #[inline]
    pub fn contains(&self, pid: &PageId) -> bool {
        self.resident.contains_key(pid)
    }

    /// Resident pages with unflushed changes, in no particular order.
    pub fn dirty_pages(&self) -> impl Iterator<Item = &PageId> {
        self.dirty
            .iter()
            .filter(|&(_, &dirty)| dirty)
            .map(|(pid, _)| pid)
    }

    // ========================================================================
    // Public API: Remove pages
    // ========================================================================

    /// Drop `pid` from the pool without writing it back, even if dirty.
    ///
    /// # Errors
    /// `Error::NotResident` if `pid` is not cached.
    pub(crate) fn discard_page(&mut self, pid: &PageId) -> Result<()> {
        let was_dirty = self.is_dirty(pid)?;

        self.remove_entry(pid)?;
        if was_dirty {
            debug!("discarded {} with unflushed changes", pid);
        }

        self.debug_validate();
        Ok(())
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write `pid` back to its store if it is dirty, then mark it clean.
    ///
    /// A clean page is left alone. If the store reports the exact content as
    /// already persisted, the write is skipped but the page is still marked
    /// clean.
    ///
    /// # Errors
    /// - `Error::NotResident` if `pid` is not cached
    /// - `Error::NotFound` if no store is registered for the file
    /// - `Error::Io` if the write fails; the page stays dirty
    pub(crate) fn flush_page(&mut self, pid: &PageId, files: &mut FileTable) -> Result<()> {
        match self.dirty.get(pid) {
            None => return Err(Error::NotResident(pid.clone())),
            Some(false) => return Ok(()),
            Some(true) => {}
        }

        let page = self
            .resident
            .get(pid)
            .ok_or_else(|| Error::invariant(format!("{} is marked dirty but has no page", pid)))?;
        let store = files.get_mut(pid.file())?;

        if store.already_persisted(pid.index(), page) {
            self.stats.writes_skipped += 1;
            trace!("{} already persisted, skipping write", pid);
        } else {
            store.write_page(page, pid.index())?;
            self.stats.pages_written += 1;
            debug!("flushed {}", pid);
        }

        if let Some(flag) = self.dirty.get_mut(pid) {
            *flag = false;
        }
        Ok(())
    }

    /// Flush every dirty page belonging to `file`.
    ///
    /// Pages are written in block order. The first failure stops the flush;
    /// pages not yet written keep their dirty flag.
    pub(crate) fn flush_file(&mut self, file: &str, files: &mut FileTable) -> Result<()> {
        let mut targets: Vec<PageId> = self
            .dirty_pages()
            .filter(|pid| pid.file() == file)
            .cloned()
            .collect();
        targets.sort();

        for pid in &targets {
            self.flush_page(pid, files)?;
        }

        if !targets.is_empty() {
            debug!("flushed {} dirty pages of '{}'", targets.len(), file);
        }
        Ok(())
    }

    /// Flush every dirty page in the pool.
    ///
    /// Pages are written grouped by file, in block order. The first failure
    /// stops the flush; pages not yet written keep their dirty flag.
    pub(crate) fn flush_all_pages(&mut self, files: &mut FileTable) -> Result<()> {
        let mut targets: Vec<PageId> = self.dirty_pages().cloned().collect();
        targets.sort();

        for pid in &targets {
            self.flush_page(pid, files)?;
        }

        if !targets.is_empty() {
            debug!("flushed all {} dirty pages", targets.len());
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Number of page slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident pages.
    #[inline]
    pub fn len(&self) -> usize {
        self.resident.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resident.is_empty()
    }

    /// Whether the next miss will have to evict.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.resident.len() >= self.capacity
    }

    /// Resident page ids from most to least recently used.
    pub fn recency_order(&self) -> recency::Iter<'_> {
        self.recency.iter()
    }

    pub fn most_recently_used(&self) -> Option<&PageId> {
        self.recency.front()
    }

    /// The page a miss on a full pool would evict.
    pub fn eviction_candidate(&self) -> Option<&PageId> {
        self.recency.back()
    }

    /// Copy of the current counters.
    pub fn stats(&self) -> BufferPoolStats {
        self.stats
    }

    /// Reset all counters to zero.
    pub(crate) fn reset_stats(&mut self) {
        self.stats = BufferPoolStats::default();
    }

    /// Check that the pool's structures agree with each other.
    ///
    /// # Errors
    /// `Error::InvariantViolation` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.resident.len() > self.capacity {
            return Err(Error::invariant(format!(
                "{} pages resident in a pool of {}",
                self.resident.len(),
                self.capacity
            )));
        }

        self.recency.check_links().map_err(Error::InvariantViolation)?;

        if self.recency.len() != self.resident.len() || self.dirty.len() != self.resident.len() {
            return Err(Error::invariant(format!(
                "structure sizes diverge: resident={}, recency={}, dirty={}",
                self.resident.len(),
                self.recency.len(),
                self.dirty.len()
            )));
        }

        // Equal sizes plus inclusion means equal key sets
        for pid in self.resident.keys() {
            if !self.recency.contains(pid) {
                return Err(Error::invariant(format!("{} has no recency entry", pid)));
            }
            if !self.dirty.contains_key(pid) {
                return Err(Error::invariant(format!("{} has no dirty flag", pid)));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Internal: Miss handling and eviction
    // ========================================================================

    /// Load `pid` into a slot, evicting first if the pool is full.
    fn handle_miss(&mut self, pid: &PageId, files: &mut FileTable) -> Result<&mut Page> {
        self.stats.cache_misses += 1;
        debug!("buffer pool miss for {}, loading from store", pid);

        // Unknown file: fail before touching any resident page
        if !files.contains(pid.file()) {
            return Err(Error::NotFound(pid.file().to_string()));
        }

        let mut page = if self.is_full() {
            self.evict_page(files)?
        } else {
            Box::new(Page::new())
        };

        files.get_mut(pid.file())?.read_page(&mut page, pid.index())?;
        self.stats.pages_read += 1;

        self.resident.insert(pid.clone(), page);
        self.dirty.insert(pid.clone(), false);
        self.recency.push_front(pid.clone());
        self.debug_validate();

        self.resident
            .get_mut(pid)
            .map(|page| &mut **page)
            .ok_or_else(|| Error::invariant(format!("{} vanished right after loading", pid)))
    }

    /// Evict the least recently used page and hand back its buffer.
    ///
    /// A dirty victim is written back first; if that write fails the victim
    /// stays resident and dirty.
    fn evict_page(&mut self, files: &mut FileTable) -> Result<Box<Page>> {
        let victim = match self.recency.back() {
            Some(pid) => pid.clone(),
            None => return Err(Error::invariant("pool is full but the recency order is empty")),
        };

        self.flush_page(&victim, files)?;
        let page = self.remove_entry(&victim)?;

        self.stats.evictions += 1;
        debug!("evicted {}", victim);

        Ok(page)
    }

    /// Remove `pid` from all three structures.
    fn remove_entry(&mut self, pid: &PageId) -> Result<Box<Page>> {
        let page = self.resident.remove(pid);
        let flag = self.dirty.remove(pid);
        let linked = self.recency.remove(pid);

        match (page, flag, linked) {
            (Some(page), Some(_), true) => Ok(page),
            (page, flag, linked) => Err(Error::invariant(format!(
                "{} was only partly tracked: page={}, dirty flag={}, recency={}",
                pid,
                page.is_some(),
                flag.is_some(),
                linked
            ))),
        }
    }

    #[inline]
    fn debug_validate(&self) {
        if cfg!(debug_assertions) {
            if let Err(err) = self.validate() {
                panic!("{}", err);
            }
        }
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("capacity", &self.capacity)
            .field("resident", &self.resident.len())
            .field("dirty", &self.dirty_pages().count())
            .field("stats", &self.stats)
            .finish()
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        let unflushed = self.dirty_pages().count();
        if unflushed > 0 {
            warn!("buffer pool dropped with {} unflushed dirty pages", unflushed);
        }
    }
}
