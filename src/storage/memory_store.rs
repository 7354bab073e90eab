//! In-memory backing store.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::storage::backing_store::BackingStore;
use crate::storage::page::Page;

/// A [`BackingStore`] that keeps its blocks in memory.
///
/// Cloning a `MemoryStore` yields another handle to the same blocks, so a
/// caller can register one handle with a [`Catalog`](crate::Catalog) and keep
/// another to inspect what the pool read and wrote.
///
/// The store records every successful block read and write in order, and can
/// be told to fail reads or writes to exercise error paths. Refused writes are
/// counted separately.
///
/// # Example
/// ```
/// use pagepool::{BackingStore, MemoryStore, Page};
///
/// let store = MemoryStore::with_blocks(2);
/// let mut handle = store.clone();
/// handle.write_page(&Page::filled(7), 1).unwrap();
///
/// assert_eq!(store.writes(), vec![1]);
/// assert_eq!(*store.snapshot(1).unwrap(), Page::filled(7));
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    blocks: Vec<Box<Page>>,
    reads: Vec<u32>,
    writes: Vec<u32>,
    failed_writes: usize,
    fail_reads: bool,
    fail_writes: bool,
    skip_identical_writes: bool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `count` zeroed blocks.
    pub fn with_blocks(count: u32) -> Self {
        let store = Self::new();
        store
            .inner
            .lock()
            .blocks
            .extend((0..count).map(|_| Box::new(Page::new())));
        store
    }

    /// Report blocks whose content exactly matches a flushed page as
    /// already persisted, so the flush skips the write.
    pub fn skip_identical_writes(self, enabled: bool) -> Self {
        self.inner.lock().skip_identical_writes = enabled;
        self
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Overwrite a block directly, bypassing the read/write log.
    pub fn set_block(&self, block: u32, page: &Page) {
        let mut inner = self.inner.lock();
        inner.slot(block).copy_from(page);
    }

    /// Copy of a block's current content, if the block exists.
    pub fn snapshot(&self, block: u32) -> Option<Box<Page>> {
        let inner = self.inner.lock();
        inner.blocks.get(block as usize).map(|stored| {
            let mut copy = Box::new(Page::new());
            copy.copy_from(stored);
            copy
        })
    }

    /// Number of blocks held.
    pub fn block_count(&self) -> u32 {
        self.inner.lock().blocks.len() as u32
    }

    /// Blocks read so far, in order.
    pub fn reads(&self) -> Vec<u32> {
        self.inner.lock().reads.clone()
    }

    /// Blocks written so far, in order.
    pub fn writes(&self) -> Vec<u32> {
        self.inner.lock().writes.clone()
    }

    /// Write attempts refused while failures were injected.
    pub fn failed_writes(&self) -> usize {
        self.inner.lock().failed_writes
    }

    /// How many times `block` has been written.
    pub fn write_count(&self, block: u32) -> usize {
        self.inner
            .lock()
            .writes
            .iter()
            .filter(|&&b| b == block)
            .count()
    }

    /// Forget the recorded reads and writes.
    pub fn clear_log(&self) {
        let mut inner = self.inner.lock();
        inner.reads.clear();
        inner.writes.clear();
        inner.failed_writes = 0;
    }
}

impl Inner {
    /// The block at `block`, growing the store with zeroed blocks if needed.
    fn slot(&mut self, block: u32) -> &mut Page {
        let idx = block as usize;
        if idx >= self.blocks.len() {
            self.blocks.resize_with(idx + 1, || Box::new(Page::new()));
        }
        &mut self.blocks[idx]
    }
}

impl BackingStore for MemoryStore {
    fn read_page(&mut self, page: &mut Page, block: u32) -> io::Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_reads {
            return Err(io::Error::other(format!("injected read failure on block {}", block)));
        }

        let stored = inner.blocks.get(block as usize).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("block {} does not exist", block),
            )
        })?;
        page.copy_from(stored);
        inner.reads.push(block);

        Ok(())
    }

    fn write_page(&mut self, page: &Page, block: u32) -> io::Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            inner.failed_writes += 1;
            return Err(io::Error::other(format!("injected write failure on block {}", block)));
        }

        inner.slot(block).copy_from(page);
        inner.writes.push(block);

        Ok(())
    }

    fn already_persisted(&self, block: u32, page: &Page) -> bool {
        let inner = self.inner.lock();
        inner.skip_identical_writes
            && inner
                .blocks
                .get(block as usize)
                .is_some_and(|stored| **stored == *page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_blocks_reads_zeros() {
        let mut store = MemoryStore::with_blocks(3);
        assert_eq!(store.block_count(), 3);

        let mut page = Page::filled(1);
        store.read_page(&mut page, 2).unwrap();
        assert_eq!(page, Page::new());
        assert_eq!(store.reads(), vec![2]);
    }

    #[test]
    fn test_read_missing_block_fails() {
        let mut store = MemoryStore::with_blocks(1);
        let mut page = Page::new();

        let err = store.read_page(&mut page, 5).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(store.reads().is_empty());
    }

    #[test]
    fn test_write_grows_store() {
        let mut store = MemoryStore::new();
        store.write_page(&Page::filled(9), 2).unwrap();

        assert_eq!(store.block_count(), 3);
        assert_eq!(*store.snapshot(2).unwrap(), Page::filled(9));
        assert_eq!(*store.snapshot(0).unwrap(), Page::new());
        assert_eq!(store.write_count(2), 1);
    }

    #[test]
    fn test_clones_share_blocks() {
        let store = MemoryStore::with_blocks(1);
        let mut other = store.clone();
        other.write_page(&Page::filled(4), 0).unwrap();

        assert_eq!(*store.snapshot(0).unwrap(), Page::filled(4));
        assert_eq!(store.writes(), vec![0]);
    }

    #[test]
    fn test_injected_failures() {
        let mut store = MemoryStore::with_blocks(1);
        let mut page = Page::new();

        store.set_fail_reads(true);
        assert!(store.read_page(&mut page, 0).is_err());
        store.set_fail_reads(false);
        assert!(store.read_page(&mut page, 0).is_ok());

        store.set_fail_writes(true);
        assert!(store.write_page(&page, 0).is_err());
        assert!(store.writes().is_empty());
        assert_eq!(store.failed_writes(), 1);
    }

    #[test]
    fn test_already_persisted_is_opt_in() {
        let store = MemoryStore::with_blocks(1);
        assert!(!store.already_persisted(0, &Page::new()));

        let store = store.skip_identical_writes(true);
        assert!(store.already_persisted(0, &Page::new()));
        assert!(!store.already_persisted(0, &Page::filled(1)));
        assert!(!store.already_persisted(7, &Page::new()));
    }

    #[test]
    fn test_clear_log() {
        let mut store = MemoryStore::with_blocks(1);
        let mut page = Page::new();
        store.read_page(&mut page, 0).unwrap();
        store.write_page(&page, 0).unwrap();

        store.set_fail_writes(true);
        assert!(store.write_page(&page, 0).is_err());

        store.clear_log();
        assert!(store.reads().is_empty());
        assert!(store.writes().is_empty());
        assert_eq!(store.failed_writes(), 0);
    }
}
