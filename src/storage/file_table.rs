//! Name → backing store registry.

use std::collections::HashMap;

use crate::common::{Error, Result};
use crate::storage::backing_store::BackingStore;

/// Backing stores keyed by file name.
///
/// This is the only route from a [`PageId`](crate::PageId)'s file name to the
/// store holding its blocks. The [`Catalog`](crate::Catalog) owns one and
/// lends it to the buffer pool for every load and flush.
#[derive(Default)]
pub(crate) struct FileTable {
    files: HashMap<String, Box<dyn BackingStore>>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store` under `name`.
    ///
    /// # Errors
    /// `Error::AlreadyExists` if the name is taken; the table is unchanged.
    pub fn insert(&mut self, name: impl Into<String>, store: Box<dyn BackingStore>) -> Result<()> {
        let name = name.into();
        if self.files.contains_key(&name) {
            return Err(Error::AlreadyExists(name));
        }
        self.files.insert(name, store);
        Ok(())
    }

    /// Unregister `name` and hand back its store.
    ///
    /// # Errors
    /// `Error::NotFound` if the name is not registered.
    pub fn remove(&mut self, name: &str) -> Result<Box<dyn BackingStore>> {
        self.files
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// # Errors
    /// `Error::NotFound` if the name is not registered.
    pub fn get(&self, name: &str) -> Result<&dyn BackingStore> {
        match self.files.get(name) {
            Some(store) => Ok(&**store),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    /// # Errors
    /// `Error::NotFound` if the name is not registered.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut dyn BackingStore> {
        match self.files.get_mut(name) {
            Some(store) => Ok(&mut **store),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}
