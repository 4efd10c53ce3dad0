//! Zero-Suppressed Decision Diagram (ZDD) manager.
//!
//! The manager owns the node arena every family lives in, the per-element
//! unique tables that keep nodes hash-consed, the operation caches, and the
//! [`Universe`] bounding the element space.
//!
//! # Overview
//!
//! A ZDD represents a family of sets. Each decision node branches on one
//! element: the `hi` child holds the members containing it, the `lo` child the
//! members without it. The **zero-suppression rule** drops every node whose
//! `hi` child is ⊥, which keeps sparse families small. Together with hash
//! consing this makes the representation canonical: within one manager, two
//! families are equal iff their root handles are equal.
//!
//! # Quick Start
//!
//! ```
//! use num_bigint::BigUint;
//! use setset_rs::zdd::ZddManager;
//!
//! let mgr = ZddManager::new();
//!
//! let x1 = mgr.base(1).unwrap(); // {{1}}
//! let x2 = mgr.base(2).unwrap(); // {{2}}
//!
//! let union = mgr.union(x1, x2); // {{1}, {2}}
//! let joined = mgr.join(x1, x2); // {{1, 2}}
//!
//! assert_eq!(mgr.count(union), BigUint::from(2u32));
//! assert_eq!(mgr.count(joined), BigUint::from(1u32));
//! ```
//!
//! # Concurrency
//!
//! All state sits behind `RefCell`s, so the manager is `!Sync`: handing it to
//! several threads requires an explicit lock around it.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::{self, Debug};

use log::debug;
use num_bigint::BigUint;

use crate::cache::{Cache, CacheKey, CountCache, OpType};
use crate::error::{Error, Result};
use crate::node::ZddNode;
use crate::reference::ZddId;
use crate::subtable::Subtable;
use crate::types::{Elem, NodeId};
use crate::universe::Universe;

/// The ZDD manager: owns all nodes and handles operations.
///
/// # Terminal Semantics
///
/// - `ZddId::ZERO` (⊥): Empty family (no sets)
/// - `ZddId::ONE` (⊤): Family containing only the empty set: {∅}
pub struct ZddManager {
    /// Node storage. Index 0 = ZERO terminal, Index 1 = ONE terminal.
    nodes: RefCell<Vec<ZddNode>>,

    /// Unique tables; `subtables[i]` holds the nodes of element `i + 1`.
    subtables: RefCell<Vec<Subtable>>,

    universe: Cell<Universe>,

    /// Operation cache shared by all memoised recursions.
    cache: RefCell<Cache>,

    /// Counting cache.
    count_cache: RefCell<CountCache>,
}

impl Default for ZddManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ZddManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZddManager")
            .field("nodes", &self.num_nodes())
            .field("universe", &self.universe())
            .field("cached", &self.cache.borrow().len())
            .finish()
    }
}

impl ZddManager {
    // ========================================================================
    // Construction
    // ========================================================================

    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Creates a manager with specified initial node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(capacity, Universe::default())
    }

    /// Creates a manager bounded by the given universe.
    pub fn with_universe(universe: Universe) -> Self {
        Self::build(1024, universe)
    }

    fn build(capacity: usize, universe: Universe) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(2));
        // Index 0: ZERO terminal (⊥), index 1: ONE terminal (⊤)
        nodes.push(ZddNode::TERMINAL);
        nodes.push(ZddNode::TERMINAL);

        Self {
            nodes: RefCell::new(nodes),
            subtables: RefCell::new(Vec::new()),
            universe: Cell::new(universe),
            cache: RefCell::new(Cache::new()),
            count_cache: RefCell::new(CountCache::new()),
        }
    }

    // ========================================================================
    // Universe
    // ========================================================================

    pub fn universe(&self) -> Universe {
        self.universe.get()
    }

    pub fn elem_limit(&self) -> u32 {
        self.universe().elem_limit()
    }

    pub fn num_elems(&self) -> u32 {
        self.universe().num_elems()
    }

    /// Largest element any node of this manager branches on.
    pub fn max_elem_in_use(&self) -> u32 {
        self.subtables.borrow().len() as u32
    }

    pub fn set_elem_limit(&self, elem_limit: u32) -> Result<()> {
        let mut universe = self.universe();
        universe.set_elem_limit(elem_limit, self.max_elem_in_use())?;
        self.universe.set(universe);
        Ok(())
    }

    pub fn set_num_elems(&self, num_elems: u32) -> Result<()> {
        let mut universe = self.universe();
        universe.set_num_elems(num_elems, self.max_elem_in_use())?;
        self.universe.set(universe);
        Ok(())
    }

    /// Checks that `elem` lies within `[1, elem_limit]`, widening the ground
    /// set to include it.
    pub fn admit(&self, elem: impl Into<u64>) -> Result<Elem> {
        let mut universe = self.universe();
        let id = universe.admit(elem.into())?;
        self.universe.set(universe);
        Ok(Elem::new(id))
    }

    /// Checks that `elem` lies within `[1, elem_limit]` without touching the
    /// ground set.
    pub fn check_elem(&self, elem: u32) -> Result<Elem> {
        if elem == 0 || elem > self.elem_limit() {
            return Err(Error::OutOfRange {
                elem: elem as u64,
                limit: self.elem_limit(),
            });
        }
        Ok(Elem::new(elem))
    }

    /// Admits every element of `set`, returning them sorted and deduplicated.
    pub fn admit_set(&self, set: impl IntoIterator<Item = u32>) -> Result<Vec<Elem>> {
        let mut elems = set.into_iter().map(|e| self.admit(e)).collect::<Result<Vec<_>>>()?;
        elems.sort_unstable();
        elems.dedup();
        Ok(elems)
    }

    // ========================================================================
    // Terminal Constants
    // ========================================================================

    /// Returns the empty family (⊥): contains no sets.
    pub fn zero(&self) -> ZddId {
        ZddId::ZERO
    }

    /// Returns the family containing only the empty set (⊤): {∅}.
    pub fn one(&self) -> ZddId {
        ZddId::ONE
    }

    #[inline(always)]
    pub fn is_zero(&self, f: ZddId) -> bool {
        f.is_zero()
    }

    #[inline(always)]
    pub fn is_one(&self, f: ZddId) -> bool {
        f.is_one()
    }

    #[inline(always)]
    pub fn is_terminal(&self, f: ZddId) -> bool {
        f.is_terminal()
    }

    // ========================================================================
    // Node Construction
    // ========================================================================

    /// Creates or retrieves the node `(elem, lo, hi)`.
    ///
    /// This is the core function that enforces the zero-suppression rule:
    /// if `hi = ⊥`, returns `lo` instead of creating a node.
    ///
    /// The caller guarantees that `elem` was admitted into the universe and
    /// lies strictly above both children; [`intern`][Self::intern] is the
    /// checked variant.
    pub fn get_node(&self, elem: Elem, lo: ZddId, hi: ZddId) -> ZddId {
        // Zero-suppression rule: if hi = ⊥, return lo
        if hi.is_zero() {
            return lo;
        }
        debug_assert!(elem.id() < self.top(lo) && elem.id() < self.top(hi));

        let slot = elem.index();
        {
            let subtables = self.subtables.borrow();
            if let Some(subtable) = subtables.get(slot) {
                if let Some(id) = subtable.find(lo, hi, &self.nodes.borrow()) {
                    return ZddId::from_node(id);
                }
            }
        }

        let mut subtables = self.subtables.borrow_mut();
        while subtables.len() <= slot {
            let next = Elem::new(subtables.len() as u32 + 1);
            subtables.push(Subtable::new(next));
        }

        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId::new(nodes.len() as u32);
        nodes.push(ZddNode::new(elem, lo, hi));
        subtables[slot].insert(id, &mut nodes);

        ZddId::from_node(id)
    }

    /// Checked node constructor.
    ///
    /// Validates the element against the universe, the children against the
    /// arena, and the global element order, then applies zero suppression and
    /// hash consing.
    pub fn intern(&self, elem: u32, lo: ZddId, hi: ZddId) -> Result<ZddId> {
        let elem = self.admit(elem)?;
        let num_nodes = self.num_nodes();
        for child in [lo, hi] {
            if child.index() >= num_nodes {
                return Err(Error::NotFound(format!("node {} is not part of this manager", child)));
            }
            if self.top(child) <= elem.id() {
                return Err(Error::Unordered {
                    elem: elem.id(),
                    child: self.top(child),
                });
            }
        }
        Ok(self.get_node(elem, lo, hi))
    }

    /// Access node data.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not created by this manager.
    pub fn node(&self, id: ZddId) -> ZddNode {
        self.nodes.borrow()[id.index()]
    }

    /// The element a node branches on; terminals sort below every element.
    #[inline]
    pub fn top(&self, f: ZddId) -> u32 {
        if f.is_terminal() {
            u32::MAX
        } else {
            self.nodes.borrow()[f.index()].elem.id()
        }
    }

    pub fn lo(&self, f: ZddId) -> ZddId {
        self.node(f).lo
    }

    pub fn hi(&self, f: ZddId) -> ZddId {
        self.node(f).hi
    }

    // ========================================================================
    // Primitive Constructors
    // ========================================================================

    /// Creates a base set: `{{elem}}`.
    pub fn base(&self, elem: u32) -> Result<ZddId> {
        let elem = self.admit(elem)?;
        Ok(self.get_node(elem, ZddId::ZERO, ZddId::ONE))
    }

    /// Creates a singleton family: `{{e1, e2, ..., en}}`.
    pub fn singleton(&self, set: impl IntoIterator<Item = u32>) -> Result<ZddId> {
        let elems = self.admit_set(set)?;
        Ok(self.singleton_of(&elems))
    }

    /// Singleton family over already admitted, sorted elements.
    pub(crate) fn singleton_of(&self, elems: &[Elem]) -> ZddId {
        elems
            .iter()
            .rev()
            .fold(ZddId::ONE, |acc, &elem| self.get_node(elem, ZddId::ZERO, acc))
    }

    /// Creates the power set of the given elements: `2^{set}`.
    pub fn powerset(&self, set: impl IntoIterator<Item = u32>) -> Result<ZddId> {
        let elems = self.admit_set(set)?;
        Ok(elems
            .iter()
            .rev()
            .fold(ZddId::ONE, |acc, &elem| self.get_node(elem, acc, acc)))
    }

    /// Power set of `{from..=num_elems}`.
    pub(crate) fn powerset_from(&self, from: u32) -> ZddId {
        let n = self.num_elems();
        if from > n {
            return ZddId::ONE;
        }
        let key = CacheKey::grounded(OpType::Powerset, ZddId::ONE, from, n);
        if let Some(res) = self.cached(&key) {
            return res;
        }
        let rest = self.powerset_from(from + 1);
        let res = self.get_node(Elem::new(from), rest, rest);
        self.remember(key, res)
    }

    /// Creates all k-element subsets of the given elements.
    pub fn combinations(&self, set: impl IntoIterator<Item = u32>, k: usize) -> Result<ZddId> {
        let elems = self.admit_set(set)?;
        if k > elems.len() {
            return Ok(ZddId::ZERO);
        }
        // table[j] = all j-subsets of the suffix processed so far
        let mut table = vec![ZddId::ZERO; k + 1];
        table[0] = ZddId::ONE;
        for &elem in elems.iter().rev() {
            for j in (1..=k).rev() {
                table[j] = self.get_node(elem, table[j], table[j - 1]);
            }
        }
        Ok(table[k])
    }

    /// Builds the family holding exactly the given sets.
    pub fn from_sets<I, S>(&self, sets: I) -> Result<ZddId>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = u32>,
    {
        let mut family = ZddId::ZERO;
        for set in sets {
            let member = self.singleton(set)?;
            family = self.union(family, member);
        }
        Ok(family)
    }

    // ========================================================================
    // Cofactors
    // ========================================================================

    /// Subset0: sets NOT containing `elem`.
    pub fn subset0(&self, f: ZddId, elem: Elem) -> ZddId {
        let top = self.top(f);
        match top.cmp(&elem.id()) {
            Ordering::Greater => f,
            Ordering::Equal => self.lo(f),
            Ordering::Less => {
                let key = CacheKey::unary(OpType::Subset0, f, elem.id());
                if let Some(res) = self.cached(&key) {
                    return res;
                }
                let node = self.node(f);
                let lo = self.subset0(node.lo, elem);
                let hi = self.subset0(node.hi, elem);
                let res = self.get_node(node.elem, lo, hi);
                self.remember(key, res)
            }
        }
    }

    /// Subset1: sets containing `elem`, with `elem` removed from each.
    pub fn subset1(&self, f: ZddId, elem: Elem) -> ZddId {
        let top = self.top(f);
        match top.cmp(&elem.id()) {
            Ordering::Greater => ZddId::ZERO,
            Ordering::Equal => self.hi(f),
            Ordering::Less => {
                let key = CacheKey::unary(OpType::Subset1, f, elem.id());
                if let Some(res) = self.cached(&key) {
                    return res;
                }
                let node = self.node(f);
                let lo = self.subset1(node.lo, elem);
                let hi = self.subset1(node.hi, elem);
                let res = self.get_node(node.elem, lo, hi);
                self.remember(key, res)
            }
        }
    }

    /// Change: toggle `elem` in all sets.
    pub fn change(&self, f: ZddId, elem: Elem) -> ZddId {
        if f.is_zero() {
            return ZddId::ZERO;
        }
        let top = self.top(f);
        match top.cmp(&elem.id()) {
            // elem is above f's root: add it to every set
            Ordering::Greater => self.get_node(elem, ZddId::ZERO, f),
            Ordering::Equal => {
                let node = self.node(f);
                self.get_node(elem, node.hi, node.lo)
            }
            Ordering::Less => {
                let key = CacheKey::unary(OpType::Change, f, elem.id());
                if let Some(res) = self.cached(&key) {
                    return res;
                }
                let node = self.node(f);
                let lo = self.change(node.lo, elem);
                let hi = self.change(node.hi, elem);
                let res = self.get_node(node.elem, lo, hi);
                self.remember(key, res)
            }
        }
    }

    /// Onset: sets containing `elem` (keeping `elem`).
    pub fn onset(&self, f: ZddId, elem: Elem) -> ZddId {
        let s1 = self.subset1(f, elem);
        self.change(s1, elem)
    }

    /// Offset: sets NOT containing `elem` (same as subset0).
    pub fn offset(&self, f: ZddId, elem: Elem) -> ZddId {
        self.subset0(f, elem)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns true if the family contains the empty set.
    pub fn contains_empty(&self, f: ZddId) -> bool {
        let mut current = f;
        while !current.is_terminal() {
            current = self.lo(current);
        }
        current.is_one()
    }

    /// Returns true if the family contains the given set.
    pub fn contains(&self, f: ZddId, set: &[u32]) -> bool {
        let mut set = set.to_vec();
        set.sort_unstable();
        set.dedup();

        let mut current = f;
        for &elem in &set {
            // Skip the elements absent from the set
            while self.top(current) < elem {
                current = self.lo(current);
            }
            if self.top(current) != elem {
                return false;
            }
            current = self.hi(current);
        }
        self.contains_empty(current)
    }

    // ========================================================================
    // Counting
    // ========================================================================

    /// Counts the number of sets in the family, exactly.
    pub fn count(&self, f: ZddId) -> BigUint {
        if f.is_zero() {
            return BigUint::ZERO;
        }
        if f.is_one() {
            return BigUint::from(1u32);
        }

        if let Some(cached) = self.count_cache.borrow().get(f) {
            return cached;
        }

        let node = self.node(f);
        let count = self.count(node.lo) + self.count(node.hi);

        self.count_cache.borrow_mut().insert(f, count.clone());
        count
    }

    /// Returns the number of decision nodes reachable from `f`.
    pub fn node_count(&self, f: ZddId) -> usize {
        let mut visited = HashSet::new();
        let mut stack = vec![f];
        while let Some(id) = stack.pop() {
            if id.is_terminal() || !visited.insert(id) {
                continue;
            }
            let node = self.node(id);
            stack.push(node.lo);
            stack.push(node.hi);
        }
        visited.len()
    }

    /// Total number of nodes in the manager, terminals included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len()
    }

    // ========================================================================
    // Cache Management
    // ========================================================================

    pub(crate) fn cached(&self, key: &CacheKey) -> Option<ZddId> {
        self.cache.borrow().get(key)
    }

    pub(crate) fn remember(&self, key: CacheKey, res: ZddId) -> ZddId {
        self.cache.borrow_mut().insert(key, res);
        res
    }

    /// Clears all caches. Nodes stay valid.
    pub fn clear_caches(&self) {
        debug!("clearing {} cached results", self.cache.borrow().len());
        self.cache.borrow_mut().clear();
        self.count_cache.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_terminals() {
        let mgr = ZddManager::new();
        assert!(mgr.is_zero(mgr.zero()));
        assert!(mgr.is_one(mgr.one()));
        assert!(mgr.is_terminal(mgr.zero()));
        assert!(mgr.is_terminal(mgr.one()));
        assert_eq!(mgr.count(mgr.zero()), BigUint::ZERO);
        assert_eq!(mgr.count(mgr.one()), BigUint::from(1u32));
    }

    #[test]
    fn test_zero_suppression() {
        let mgr = ZddManager::new();
        let lo = mgr.base(2).unwrap();
        let f = mgr.get_node(Elem::new(1), lo, ZddId::ZERO);
        assert_eq!(f, lo);
    }

    #[test]
    fn test_hash_consing() {
        let mgr = ZddManager::new();
        let a = mgr.singleton([1, 3]).unwrap();
        let before = mgr.num_nodes();
        let b = mgr.singleton([3, 1, 3]).unwrap();
        assert_eq!(a, b);
        assert_eq!(mgr.num_nodes(), before);
    }

    #[test]
    fn test_intern_checks() {
        let mgr = ZddManager::with_universe(Universe::new(4).unwrap());
        let x3 = mgr.base(3).unwrap();

        assert!(mgr.intern(2, ZddId::ZERO, x3).is_ok());
        assert!(matches!(
            mgr.intern(3, ZddId::ZERO, x3),
            Err(Error::Unordered { elem: 3, child: 3 })
        ));
        assert!(matches!(mgr.intern(5, ZddId::ZERO, ZddId::ONE), Err(Error::OutOfRange { .. })));
        assert!(matches!(mgr.intern(0, ZddId::ZERO, ZddId::ONE), Err(Error::OutOfRange { .. })));
        assert_eq!(mgr.intern(1, x3, ZddId::ZERO).unwrap(), x3);
    }

    #[test]
    fn test_universe_grows_and_guards() {
        let mgr = ZddManager::new();
        assert_eq!(mgr.num_elems(), 0);
        mgr.base(5).unwrap();
        assert_eq!(mgr.num_elems(), 5);
        assert_eq!(mgr.max_elem_in_use(), 5);

        assert!(mgr.set_num_elems(3).is_err());
        assert!(mgr.set_num_elems(8).is_ok());
        assert!(mgr.set_elem_limit(4).is_err());
        assert!(mgr.set_elem_limit(8).is_ok());
        assert!(matches!(mgr.base(9), Err(Error::OutOfRange { elem: 9, limit: 8 })));
    }

    #[test]
    fn test_singleton_and_contains() {
        let mgr = ZddManager::new();
        let empty: Vec<u32> = vec![];
        assert!(mgr.is_one(mgr.singleton(empty).unwrap()));

        let s12 = mgr.singleton([1, 2]).unwrap();
        assert_eq!(mgr.count(s12), BigUint::from(1u32));
        assert!(mgr.contains(s12, &[1, 2]));
        assert!(mgr.contains(s12, &[2, 1]));
        assert!(!mgr.contains(s12, &[1]));
        assert!(!mgr.contains(s12, &[]));
        assert!(!mgr.contains(s12, &[1, 2, 3]));
    }

    #[test]
    fn test_powerset() {
        let mgr = ZddManager::new();
        let ps = mgr.powerset([1, 2]).unwrap();
        assert_eq!(mgr.count(ps), BigUint::from(4u32));
        assert!(mgr.contains(ps, &[]));
        assert!(mgr.contains(ps, &[1, 2]));
        assert_eq!(mgr.node_count(ps), 2);
    }

    #[test]
    fn test_powerset_from_ground_set() {
        let mgr = ZddManager::new();
        mgr.set_num_elems(3).unwrap();
        let ps = mgr.powerset_from(1);
        assert_eq!(ps, mgr.powerset([1, 2, 3]).unwrap());
        assert_eq!(mgr.powerset_from(4), ZddId::ONE);
    }

    #[test]
    fn test_count_beyond_u64() {
        let mgr = ZddManager::new();
        let ps = mgr.powerset(1..=64).unwrap();
        assert_eq!(mgr.count(ps), BigUint::from(1u32) << 64);
        assert_eq!(mgr.node_count(ps), 64);
    }

    #[test]
    fn test_combinations() {
        let mgr = ZddManager::new();

        let c42 = mgr.combinations([1, 2, 3, 4], 2).unwrap();
        assert_eq!(mgr.count(c42), BigUint::from(6u32));
        assert!(mgr.contains(c42, &[2, 4]));
        assert!(!mgr.contains(c42, &[2]));

        let c50 = mgr.combinations([1, 2, 3, 4, 5], 0).unwrap();
        assert!(mgr.is_one(c50));

        let c35 = mgr.combinations([1, 2, 3], 5).unwrap();
        assert!(mgr.is_zero(c35));
    }

    #[test]
    fn test_from_sets() {
        let mgr = ZddManager::new();
        let f = mgr.from_sets(vec![vec![1], vec![2, 3], vec![3], vec![3]]).unwrap();
        assert_eq!(mgr.count(f), BigUint::from(3u32));
        assert!(mgr.contains(f, &[3, 2]));
        assert!(mgr.from_sets(vec![vec![0]]).is_err());
    }

    #[test]
    fn test_cofactors() {
        let mgr = ZddManager::new();
        // {{1}, {2}, {1,2}}
        let family = mgr.from_sets(vec![vec![1], vec![2], vec![1, 2]]).unwrap();

        let s0 = mgr.subset0(family, Elem::new(1));
        assert_eq!(s0, mgr.base(2).unwrap());

        // {∅, {2}}
        let s1 = mgr.subset1(family, Elem::new(1));
        assert_eq!(mgr.count(s1), BigUint::from(2u32));
        assert!(mgr.contains(s1, &[]));

        let on2 = mgr.onset(family, Elem::new(2));
        assert_eq!(on2, mgr.from_sets(vec![vec![2], vec![1, 2]]).unwrap());
        assert_eq!(mgr.offset(family, Elem::new(2)), mgr.base(1).unwrap());
    }

    #[test]
    fn test_change() {
        let mgr = ZddManager::new();
        let x1 = mgr.base(1).unwrap();

        assert!(mgr.is_one(mgr.change(x1, Elem::new(1))));
        assert_eq!(mgr.change(ZddId::ONE, Elem::new(1)), x1);

        // {{1}, {2}} toggling 2 gives {{1, 2}, ∅}
        let f = mgr.from_sets(vec![vec![1], vec![2]]).unwrap();
        let g = mgr.change(f, Elem::new(2));
        assert_eq!(g, mgr.from_sets(vec![vec![1, 2], vec![]]).unwrap());
    }
}
