//! Per-element unique table for ZDD nodes.
//!
//! Every decision node lives in exactly one subtable, the one of its element.
//! Since all nodes of a subtable share the element, lookups are keyed by the
//! `(lo, hi)` children only.
//!
//! # Design (CUDD-inspired)
//!
//! ```text
//! subtables[1] → nodes labelled with element 1
//! subtables[2] → nodes labelled with element 2
//! ...
//! ```
//!
//! Collision chains are intrusive: each [`ZddNode`] stores the next node of its
//! chain, and the subtable only keeps the bucket heads. Buckets double when the
//! load factor exceeds [`MAX_LOAD`], so element subtables stay small until a
//! diagram actually branches on them.

use crate::node::ZddNode;
use crate::reference::ZddId;
use crate::types::{Elem, NodeId};

/// Initial number of bucket bits (2^6 = 64 buckets).
const INITIAL_BUCKET_BITS: u32 = 6;

/// Average chain length that triggers a resize.
const MAX_LOAD: usize = 4;

#[derive(Debug, Clone)]
pub struct Subtable {
    /// The element shared by all nodes in this subtable.
    pub elem: Elem,

    /// Heads of the collision chains; `NodeId::INVALID` marks an empty bucket.
    buckets: Vec<NodeId>,

    /// `bucket_index = hash & bitmask`.
    bitmask: u64,

    /// Number of nodes in this subtable.
    count: usize,
}

impl Subtable {
    pub fn new(elem: Elem) -> Self {
        let num_buckets = 1usize << INITIAL_BUCKET_BITS;
        Self {
            elem,
            buckets: vec![NodeId::INVALID; num_buckets],
            bitmask: (num_buckets - 1) as u64,
            count: 0,
        }
    }

    #[inline]
    fn bucket_index(&self, lo: ZddId, hi: ZddId) -> usize {
        (hash_children(lo, hi) & self.bitmask) as usize
    }

    /// Look up a node by its children.
    pub fn find(&self, lo: ZddId, hi: ZddId, nodes: &[ZddNode]) -> Option<NodeId> {
        let mut current = self.buckets[self.bucket_index(lo, hi)];
        while current != NodeId::INVALID {
            let node = &nodes[current.index()];
            if node.has_children(lo, hi) {
                return Some(current);
            }
            current = node.next;
        }
        None
    }

    /// Insert a freshly allocated node, threading it into its chain.
    pub fn insert(&mut self, id: NodeId, nodes: &mut [ZddNode]) {
        if self.count + 1 > self.buckets.len() * MAX_LOAD {
            self.grow(nodes);
        }
        let node = &nodes[id.index()];
        let bucket = self.bucket_index(node.lo, node.hi);
        nodes[id.index()].next = self.buckets[bucket];
        self.buckets[bucket] = id;
        self.count += 1;
    }

    /// Doubles the bucket array and rethreads every chain.
    fn grow(&mut self, nodes: &mut [ZddNode]) {
        let old = std::mem::take(&mut self.buckets);
        self.buckets = vec![NodeId::INVALID; old.len() * 2];
        self.bitmask = (self.buckets.len() - 1) as u64;

        for head in old {
            let mut current = head;
            while current != NodeId::INVALID {
                let next = nodes[current.index()].next;
                let bucket = self.bucket_index(nodes[current.index()].lo, nodes[current.index()].hi);
                nodes[current.index()].next = self.buckets[bucket];
                self.buckets[bucket] = current;
                current = next;
            }
        }
    }

    /// Number of nodes in this subtable.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Hash function for (lo, hi) children.
#[inline]
fn hash_children(lo: ZddId, hi: ZddId) -> u64 {
    // FNV-1a inspired mixing
    let mut h = 14695981039346656037u64;
    h ^= lo.raw() as u64;
    h = h.wrapping_mul(1099511628211);
    h ^= hi.raw() as u64;
    h = h.wrapping_mul(1099511628211);
    h
}
