//! pagepool - a fixed-capacity LRU buffer pool over named backing files.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Catalog                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Buffer Pool (buffer/)                       │   │
//! │  │   resident pages  ·  LRU recency list  ·  dirty flags   │   │
//! │  │      evict LRU on a full miss, write back if dirty       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              File Table (storage/)                       │   │
//! │  │            file name → Box<dyn BackingStore>             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Backing Stores (storage/)                      │   │
//! │  │          FileStore (disk)  ·  MemoryStore (RAM)          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`buffer`] - The buffer pool and its LRU ordering
//! - [`storage`] - Pages, the backing-store contract and its implementations
//! - [`catalog`] - The context object tying files to the pool
//!
//! # Quick Start
//! ```
//! use pagepool::{BackingStore, Catalog, FileStore, Page, PageId};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = FileStore::create(dir.path().join("users.tbl")).unwrap();
//!
//! let mut catalog = Catalog::new();
//! catalog.add("users.tbl", Box::new(store)).unwrap();
//!
//! // Blocks must exist before they can be read; write one through the store
//! let mut blank = Page::new();
//! blank.as_mut_slice()[..5].copy_from_slice(b"alice");
//! catalog.get_mut("users.tbl").unwrap().write_page(&blank, 0).unwrap();
//!
//! let pid = PageId::new("users.tbl", 0);
//! let page = catalog.get_page(&pid).unwrap();
//! assert_eq!(&page.as_slice()[..5], b"alice");
//!
//! catalog.close().unwrap();
//! ```

pub mod buffer;
pub mod catalog;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_POOL_CAPACITY, PAGE_SIZE};
pub use common::{Error, PageId, Result};

pub use buffer::{BufferPool, BufferPoolStats};
pub use catalog::Catalog;
pub use storage::{BackingStore, FileStore, MemoryStore, Page};
