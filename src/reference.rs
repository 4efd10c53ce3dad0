//! Root handles of families.

use std::fmt;

use crate::types::NodeId;

/// The root of a family inside a [`ZddManager`][crate::zdd::ZddManager].
///
/// Nodes are hash-consed, so two roots of the same manager are equal exactly
/// when they denote the same family. Slots 0 and 1 of the arena hold the
/// terminals:
///
/// - [`ZddId::ZERO`] is ⊥, the family with no members;
/// - [`ZddId::ONE`] is ⊤, the family `{∅}`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ZddId(u32);

impl ZddId {
    pub const ZERO: ZddId = ZddId(0);
    pub const ONE: ZddId = ZddId(1);

    pub const fn new(index: u32) -> Self {
        ZddId(index)
    }

    /// Root of the diagram stored at arena slot `id`.
    pub const fn from_node(id: NodeId) -> Self {
        ZddId(id.raw())
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Arena slot of the root node.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_zero(self) -> bool {
        self.0 == ZddId::ZERO.0
    }

    pub const fn is_one(self) -> bool {
        self.0 == ZddId::ONE.0
    }

    /// Either ⊥ or ⊤.
    pub const fn is_terminal(self) -> bool {
        self.0 <= ZddId::ONE.0
    }
}

impl fmt::Display for ZddId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            f.write_str("⊥")
        } else if self.is_one() {
            f.write_str("⊤")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}
