//! Arena slots and elements.

use std::fmt;

/// Slot of a node in the manager's arena.
///
/// Slots 0 and 1 belong to the terminals; decision nodes start at 2.
/// [`NodeId::INVALID`] terminates the collision chains of the unique tables.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// An element of the universe, numbered from 1.
///
/// Elements are ordered by their number, and that order is the variable order
/// of every diagram: element 1 is tested first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Elem(u32);

impl Elem {
    /// Placeholder element carried by the terminals.
    pub const ZERO: Elem = Elem(0);

    pub const fn new(id: u32) -> Self {
        debug_assert!(id > 0, "elements are numbered from 1");
        Elem(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }

    /// 0-based position, as used by weight vectors and subtables.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for Elem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Elem> for u32 {
    fn from(elem: Elem) -> u32 {
        elem.0
    }
}
