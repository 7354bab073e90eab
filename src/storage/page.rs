//! Page - the fundamental 4KB unit of caching and I/O.
//!
//! A [`Page`] is a raw 4KB byte array holding the content of one on-disk
//! block. It has no identity of its own; the buffer pool keys it by
//! [`PageId`](crate::PageId).

use std::fmt;

use crate::common::config::PAGE_SIZE;

/// A page of data (4KB, 4KB-aligned).
///
/// # Memory Layout
/// - Size: 4096 bytes (4KB)
/// - Alignment: 4096 bytes (for efficient Direct I/O with O_DIRECT)
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` outside tests. Copying 4KB should be
/// explicit, see [`Page::copy_from`].
///
/// # Example
/// ```
/// use pagepool::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Create a page with every byte set to `byte`.
    pub fn filled(byte: u8) -> Self {
        Self {
            data: [byte; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrite this page with the content of `other`.
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Set every byte to `byte`.
    pub fn fill(&mut self, byte: u8) {
        self.data.fill(byte);
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Get the size of a page.
    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.data[..] == other.data[..]
    }
}

impl Eq for Page {}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 4KB of bytes is useless in test output
        f.debug_struct("Page")
            .field("head", &&self.data[..16])
            .finish_non_exhaustive()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.copy_from(self);
        new_page
    }
}
