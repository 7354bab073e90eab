//! Recency order for LRU replacement.
//!
//! A doubly-linked list threaded through a `Vec` arena, plus an index from
//! [`PageId`] to arena slot. Every operation the buffer pool needs is O(1):
//! insert at the front, move to the front, remove anywhere, read the back.

use std::collections::HashMap;

use crate::common::PageId;

const NIL: usize = usize::MAX;

struct Node {
    /// `None` while the slot sits on the free list.
    pid: Option<PageId>,
    prev: usize,
    next: usize,
}

/// Page ids ordered from most to least recently used.
///
/// # Layout
/// ```text
///  index: PageId → slot
///
///  head                                  tail
///   │                                     │
///   ▼                                     ▼
/// [slot 2] ⇄ [slot 0] ⇄ [slot 3] ⇄ ... ⇄ [slot 1]
///   MRU                                  LRU (next victim)
/// ```
/// Freed slots are recycled, so the arena never grows past the largest
/// number of ids held at once.
pub struct RecencyList {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: HashMap<PageId, usize>,
    head: usize,
    tail: usize,
}

impl RecencyList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty list with room for `capacity` ids.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: NIL,
            tail: NIL,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn contains(&self, pid: &PageId) -> bool {
        self.index.contains_key(pid)
    }

    /// Most recently used id.
    pub fn front(&self) -> Option<&PageId> {
        self.pid_at(self.head)
    }

    /// Least recently used id: the next eviction victim.
    pub fn back(&self) -> Option<&PageId> {
        self.pid_at(self.tail)
    }

    /// Insert `pid` as the most recently used id.
    ///
    /// Returns `false` and leaves the list untouched if `pid` is already
    /// present.
    pub fn push_front(&mut self, pid: PageId) -> bool {
        if self.index.contains_key(&pid) {
            return false;
        }

        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot].pid = Some(pid.clone());
                slot
            }
            None => {
                self.nodes.push(Node {
                    pid: Some(pid.clone()),
                    prev: NIL,
                    next: NIL,
                });
                self.nodes.len() - 1
            }
        };

        self.index.insert(pid, slot);
        self.link_front(slot);
        true
    }

    /// Move `pid` to the front. Returns `false` if it is not present.
    pub fn touch(&mut self, pid: &PageId) -> bool {
        let Some(&slot) = self.index.get(pid) else {
            return false;
        };

        if slot != self.head {
            self.unlink(slot);
            self.link_front(slot);
        }
        true
    }

    /// Remove `pid`. Returns `false` if it is not present.
    pub fn remove(&mut self, pid: &PageId) -> bool {
        let Some(slot) = self.index.remove(pid) else {
            return false;
        };

        self.unlink(slot);
        self.nodes[slot].pid = None;
        self.free.push(slot);
        true
    }

    /// Iterate from most to least recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Walk the links and report the first inconsistency found.
    pub(crate) fn check_links(&self) -> std::result::Result<(), String> {
        let mut prev = NIL;
        let mut cursor = self.head;
        let mut seen = 0usize;

        while cursor != NIL {
            if seen >= self.index.len() {
                return Err(format!(
                    "recency list is longer than its index ({} entries)",
                    self.index.len()
                ));
            }

            let node = &self.nodes[cursor];
            if node.prev != prev {
                return Err(format!("recency slot {} has a broken back link", cursor));
            }
            match &node.pid {
                Some(pid) if self.index.get(pid) == Some(&cursor) => {}
                Some(pid) => return Err(format!("recency index disagrees on {}", pid)),
                None => return Err(format!("recency slot {} is linked but vacant", cursor)),
            }

            seen += 1;
            prev = cursor;
            cursor = node.next;
        }

        if prev != self.tail {
            return Err("recency tail does not end the list".to_string());
        }
        if seen != self.index.len() {
            return Err(format!(
                "recency list holds {} ids but its index holds {}",
                seen,
                self.index.len()
            ));
        }
        Ok(())
    }

    fn pid_at(&self, slot: usize) -> Option<&PageId> {
        self.nodes.get(slot).and_then(|node| node.pid.as_ref())
    }

    fn link_front(&mut self, slot: usize) {
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = self.head;

        if self.head != NIL {
            self.nodes[self.head].prev = slot;
        } else {
            self.tail = slot;
        }
        self.head = slot;
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = NIL;
    }
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a> {
    list: &'a RecencyList,
    cursor: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a PageId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.nodes.get(self.cursor)?;
        self.cursor = node.next;
        node.pid.as_ref()
    }
}
