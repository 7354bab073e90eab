//! File Store - a backing store over one file on disk.
//!
//! The [`FileStore`] handles all direct file operations:
//! - Reading and writing blocks
//! - Tracking how many blocks the file holds
//! - Creating and reopening the file

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::trace;

use crate::common::config::PAGE_SIZE;
use crate::storage::backing_store::BackingStore;
use crate::storage::page::Page;

/// A [`BackingStore`] over a single file.
///
/// # File Layout
/// Blocks are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │ Block 2 │  ...    │ Block N │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// # Durability
/// Every write is followed by `sync_data()`. Writing past the end grows the
/// file; skipped blocks read back as zeros.
pub struct FileStore {
    file: File,
    /// Number of blocks in the file.
    page_count: u32,
}

impl FileStore {
    /// Create a new, empty file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
        })
    }

    /// Open an existing file.
    ///
    /// A trailing partial block is ignored.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self { file, page_count })
    }

    /// Open an existing file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of whole blocks in the file.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Size of the file in bytes, counting whole blocks only.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    /// Flush file data and metadata to the device.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn offset(block: u32) -> u64 {
        (block as u64) * (PAGE_SIZE as u64)
    }
}

impl BackingStore for FileStore {
    fn read_page(&mut self, page: &mut Page, block: u32) -> io::Result<()> {
        if block >= self.page_count {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "block {} is past the end of the file ({} blocks)",
                    block, self.page_count
                ),
            ));
        }

        self.file.seek(SeekFrom::Start(Self::offset(block)))?;
        self.file.read_exact(page.as_mut_slice())?;
        trace!("read block {} from disk", block);

        Ok(())
    }

    fn write_page(&mut self, page: &Page, block: u32) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(Self::offset(block)))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_data()?;

        if block >= self.page_count {
            self.page_count = block + 1;
        }
        trace!("wrote block {} to disk", block);

        Ok(())
    }
}
