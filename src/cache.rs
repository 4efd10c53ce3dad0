//! Operation cache for ZDD computations.
//!
//! Every memoised recursion of the manager stores its results here, keyed by
//! the operation, the first operand and a 32-bit argument. The argument is the
//! raw second operand for binary operations, and an element or a size for the
//! parameterised unary ones. Results that depend on the ground set
//! `{1..num_elems}` also record its size, so they go stale once it grows.

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::reference::ZddId;

/// Operation types for caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Union,
    Intersection,
    Difference,
    SymDiff,
    Join,
    Meet,
    Quotient,
    Subsets,
    Supersets,
    Minimal,
    Maximal,
    Hitting,
    Smaller,
    Larger,
    SameSize,
    Flip,
    Powerset,
    Subset0,
    Subset1,
    Change,
}

/// Cache key: `(op, f, arg)`, plus the ground-set size for ops that read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub op: OpType,
    pub f: ZddId,
    pub arg: u32,
    /// `num_elems` at computation time; 0 for ops independent of it.
    pub ground: u32,
}

impl CacheKey {
    /// Create a key for a commutative operation, normalizing operand order.
    pub fn commutative(op: OpType, f: ZddId, g: ZddId) -> Self {
        let (f, g) = if f <= g { (f, g) } else { (g, f) };
        Self { op, f, arg: g.raw(), ground: 0 }
    }

    /// Create a key for a non-commutative operation.
    pub fn non_commutative(op: OpType, f: ZddId, g: ZddId) -> Self {
        Self { op, f, arg: g.raw(), ground: 0 }
    }

    /// Create a key for a unary operation with a scalar parameter.
    pub fn unary(op: OpType, f: ZddId, arg: u32) -> Self {
        Self { op, f, arg, ground: 0 }
    }

    /// Create a key for an operation relative to the ground set `{1..num_elems}`.
    pub fn grounded(op: OpType, f: ZddId, arg: u32, num_elems: u32) -> Self {
        Self {
            op,
            f,
            arg,
            ground: num_elems,
        }
    }
}

/// Operation cache using HashMap.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    map: HashMap<CacheKey, ZddId>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached result.
    pub fn get(&self, key: &CacheKey) -> Option<ZddId> {
        self.map.get(key).copied()
    }

    /// Insert a result into the cache.
    pub fn insert(&mut self, key: CacheKey, value: ZddId) {
        self.map.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Exact member counts per node.
///
/// Counts are exponential in the number of elements, so they are kept as
/// arbitrary-precision integers.
#[derive(Debug, Clone, Default)]
pub struct CountCache {
    map: HashMap<ZddId, BigUint>,
}

impl CountCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ZddId) -> Option<BigUint> {
        self.map.get(&id).cloned()
    }

    pub fn insert(&mut self, id: ZddId, count: BigUint) {
        self.map.insert(id, count);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
