//! Configuration constants for pagepool.

/// Size of a page in bytes (4KB).
///
/// Every backing store reads and writes whole blocks of this size, and every
/// slot in the buffer pool holds exactly one page of this size.
///
/// # Memory Layout
/// With 4KB pages and 32-bit block indexes:
/// - Max blocks per file: 2^32 = 4,294,967,296
/// - Max file size: 4,294,967,296 × 4KB = 16TB
pub const PAGE_SIZE: usize = 4096;

/// Number of page slots in a buffer pool built without an explicit capacity.
pub const DEFAULT_POOL_CAPACITY: usize = 50;

/// Maximum number of blocks addressable in one file with a u32 block index.
pub const MAX_PAGES: u64 = (u32::MAX as u64) + 1;

/// Maximum theoretical size of one backing file in bytes.
pub const MAX_FILE_SIZE_BYTES: u64 = MAX_PAGES * PAGE_SIZE as u64;
