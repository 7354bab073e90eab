//! The block I/O contract the buffer pool depends on.

use std::io;

use crate::storage::page::Page;

/// Synchronous, block-indexed read/write access to one file.
///
/// Each block is exactly one [`Page`]. Implementations report failures as
/// plain `io::Error`s; the buffer pool hands them to its caller unchanged.
///
/// Stores are `Send` so a whole [`Catalog`](crate::Catalog) can be put behind
/// one lock and shared between threads.
pub trait BackingStore: Send {
    /// Fill `page` with the stored content of `block`.
    ///
    /// # Errors
    /// Fails if the file or block is inaccessible.
    fn read_page(&mut self, page: &mut Page, block: u32) -> io::Result<()>;

    /// Persist `page` as the content of `block`.
    ///
    /// # Errors
    /// Fails if the block cannot be written.
    fn write_page(&mut self, page: &Page, block: u32) -> io::Result<()>;

    /// Whether `page` is already known to be the durable content of `block`.
    ///
    /// When this returns `true`, a flush skips the write but still clears the
    /// page's dirty flag. Only return `true` for an exact match.
    fn already_persisted(&self, _block: u32, _page: &Page) -> bool {
        false
    }
}
