//! Page identifier type.

use std::fmt;
use std::sync::Arc;

/// Identifies a block of a named file: `(file, index)`.
///
/// This is the buffer pool's cache key. The file name is shared behind an
/// `Arc<str>` so the pool can keep one copy of the key in each of its
/// structures without reallocating the name.
///
/// # Example
/// ```
/// use pagepool::PageId;
///
/// let pid = PageId::new("users.tbl", 3);
/// assert_eq!(pid.file(), "users.tbl");
/// assert_eq!(pid.index(), 3);
/// assert_eq!(pid, PageId::new("users.tbl", 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    file: Arc<str>,
    index: u32,
}

impl PageId {
    /// Create a new PageId.
    #[inline]
    pub fn new(file: impl Into<Arc<str>>, index: u32) -> Self {
        PageId {
            file: file.into(),
            index,
        }
    }

    /// Name of the file this block belongs to.
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Block index within the file.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Same file, different block. Reuses the shared file name.
    pub fn with_index(&self, index: u32) -> Self {
        PageId {
            file: Arc::clone(&self.file),
            index,
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.index)
    }
}
