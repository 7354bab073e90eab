//! Common types and utilities shared across pagepool.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants
//! - Error types
//! - The page identifier used as the cache key

pub mod config;
pub mod error;
mod page_id;

pub use error::{Error, Result};
pub use page_id::PageId;
