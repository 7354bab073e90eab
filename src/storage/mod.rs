//! Storage layer - pages and the backing stores they live in.
//!
//! This module handles persistent storage:
//! - [`Page`] - The raw 4KB data container
//! - [`BackingStore`] - Block read/write contract used by the buffer pool
//! - `FileTable` - Stores keyed by file name, owned by the catalog
//! - [`FileStore`] - A backing store over one file on disk
//! - [`MemoryStore`] - A backing store held in memory

mod backing_store;
mod file_store;
mod file_table;
mod memory_store;
pub mod page;

pub use backing_store::BackingStore;
pub use file_store::FileStore;
pub(crate) use file_table::FileTable;
pub use memory_store::MemoryStore;
pub use page::Page;
