//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::HashMap;

/// Sentinel slot index for "no neighbour".
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node {
    key: String,
    prev: usize,
    next: usize,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys live in an arena of slots linked into a doubly-linked list:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// A key→slot index makes touch, remove and eviction O(1). Freed slots are
/// recycled through a free list.
#[derive(Debug)]
pub struct LruTracker {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: usize,
    tail: usize,
}

impl Default for LruTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to head).
    ///
    /// Unknown keys are inserted at the head.
    pub fn touch(&mut self, key: &str) {
        let idx = match self.index.get(key) {
            Some(&idx) => {
                self.unlink(idx);
                idx
            }
            None => {
                let idx = self.alloc(key.to_string());
                self.index.insert(key.to_string(), idx);
                idx
            }
        };
        self.push_front(idx);
    }

    // == Remove ==
    /// Removes a key from the tracker. Returns false if it was not tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.unlink(idx);
                self.release(idx);
                true
            }
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        self.unlink(idx);
        let key = self.release(idx);
        self.index.remove(&key);
        Some(key)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Clear ==
    /// Forgets every key and releases the arena.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.index.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn alloc(&mut self, key: String) -> usize {
        let node = Node {
            key,
            prev: NIL,
            next: NIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Returns a detached slot to the free list, handing back its key.
    fn release(&mut self, idx: usize) -> String {
        self.free.push(idx);
        std::mem::take(&mut self.nodes[idx].key)
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
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
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }
}
