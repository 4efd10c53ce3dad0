use crate::reference::ZddId;
use crate::types::{Elem, NodeId};

/// A decision node of the diagram.
///
/// The node stands for the family
///
/// ```text
/// F(node) = F(lo) ∪ { S ∪ {elem} | S ∈ F(hi) }
/// ```
///
/// so `lo` holds the members without `elem` and `hi` the members with it
/// (stored without `elem`).
///
/// # Invariants
///
/// - `hi` is never `ZddId::ZERO` (zero suppression).
/// - `elem` is smaller than the top element of both children.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ZddNode {
    pub elem: Elem,
    pub lo: ZddId,
    pub hi: ZddId,
    /// Next node in the collision chain of the owning subtable.
    pub next: NodeId,
}

impl ZddNode {
    /// Placeholder stored in the two terminal slots of the arena.
    pub const TERMINAL: ZddNode = ZddNode {
        elem: Elem::ZERO,
        lo: ZddId::ZERO,
        hi: ZddId::ZERO,
        next: NodeId::INVALID,
    };

    pub fn new(elem: Elem, lo: ZddId, hi: ZddId) -> Self {
        debug_assert!(!hi.is_zero(), "ZDD node cannot have hi=ZERO (zero-suppression rule)");
        Self {
            elem,
            lo,
            hi,
            next: NodeId::INVALID,
        }
    }

    /// Returns true if the node carries exactly these children.
    pub fn has_children(&self, lo: ZddId, hi: ZddId) -> bool {
        self.lo == lo && self.hi == hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = ZddNode::new(Elem::new(1), ZddId::ZERO, ZddId::ONE);
        assert_eq!(node.elem, Elem::new(1));
        assert!(node.has_children(ZddId::ZERO, ZddId::ONE));
        assert!(!node.has_children(ZddId::ONE, ZddId::ONE));
        assert_eq!(node.next, NodeId::INVALID);
    }
}
