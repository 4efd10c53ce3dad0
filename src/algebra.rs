//! Family algebra over ZDDs.
//!
//! Every operation here is a memoised recursion over the two diagrams. The
//! recursions share one shape: pick the smallest top element `v` of the
//! operands, split each operand into the members without `v` and those with
//! it, recurse, and reassemble with [`ZddManager::get_node`].
//!
//! Operations that complement against a ground set (`hitting`, `flip_all`,
//! `invert`) use `{1..num_elems}` of the manager's universe.

use log::debug;

use crate::cache::{CacheKey, OpType};
use crate::error::{Error, Result};
use crate::reference::ZddId;
use crate::types::Elem;
use crate::zdd::ZddManager;

/// Cardinality comparison used by [`ZddManager::filter_size`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SizeCmp {
    Less,
    Greater,
    Equal,
}

impl SizeCmp {
    fn op(self) -> OpType {
        match self {
            SizeCmp::Less => OpType::Smaller,
            SizeCmp::Greater => OpType::Larger,
            SizeCmp::Equal => OpType::SameSize,
        }
    }
}

impl ZddManager {
    /// Splits `f` on element `v`, which must not lie below `f`'s top element.
    ///
    /// Returns `(f0, f1)`: the members without `v`, and the members with `v`
    /// (with `v` removed).
    #[inline]
    fn branches(&self, f: ZddId, v: u32) -> (ZddId, ZddId) {
        if self.top(f) == v {
            let node = self.node(f);
            (node.lo, node.hi)
        } else {
            (f, ZddId::ZERO)
        }
    }

    // ========================================================================
    // Set-Theoretic Operations
    // ========================================================================

    /// Union: `F ∪ G`.
    pub fn union(&self, f: ZddId, g: ZddId) -> ZddId {
        if f.is_zero() {
            return g;
        }
        if g.is_zero() || f == g {
            return f;
        }

        let key = CacheKey::commutative(OpType::Union, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let v = self.top(f).min(self.top(g));
        let (f0, f1) = self.branches(f, v);
        let (g0, g1) = self.branches(g, v);
        let lo = self.union(f0, g0);
        let hi = self.union(f1, g1);
        let res = self.get_node(Elem::new(v), lo, hi);
        self.remember(key, res)
    }

    /// Intersection: `F ∩ G`.
    pub fn intersection(&self, f: ZddId, g: ZddId) -> ZddId {
        if f.is_zero() || g.is_zero() {
            return ZddId::ZERO;
        }
        if f == g {
            return f;
        }
        if f.is_one() {
            return if self.contains_empty(g) { ZddId::ONE } else { ZddId::ZERO };
        }
        if g.is_one() {
            return if self.contains_empty(f) { ZddId::ONE } else { ZddId::ZERO };
        }

        let key = CacheKey::commutative(OpType::Intersection, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let (ft, gt) = (self.top(f), self.top(g));
        let res = if ft < gt {
            self.intersection(self.lo(f), g)
        } else if ft > gt {
            self.intersection(f, self.lo(g))
        } else {
            let (f_node, g_node) = (self.node(f), self.node(g));
            let lo = self.intersection(f_node.lo, g_node.lo);
            let hi = self.intersection(f_node.hi, g_node.hi);
            self.get_node(f_node.elem, lo, hi)
        };
        self.remember(key, res)
    }

    /// Difference: `F \ G`.
    pub fn difference(&self, f: ZddId, g: ZddId) -> ZddId {
        if f.is_zero() || f == g {
            return ZddId::ZERO;
        }
        if g.is_zero() {
            return f;
        }
        if f.is_one() {
            return if self.contains_empty(g) { ZddId::ZERO } else { ZddId::ONE };
        }

        let key = CacheKey::non_commutative(OpType::Difference, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let (ft, gt) = (self.top(f), self.top(g));
        let res = if ft > gt {
            // Members of g with its top element cannot be in f
            self.difference(f, self.lo(g))
        } else {
            let (f0, f1) = self.branches(f, ft);
            let (g0, g1) = self.branches(g, ft);
            let lo = self.difference(f0, g0);
            let hi = self.difference(f1, g1);
            self.get_node(Elem::new(ft), lo, hi)
        };
        self.remember(key, res)
    }

    /// Symmetric difference: `F △ G`.
    pub fn symmetric_difference(&self, f: ZddId, g: ZddId) -> ZddId {
        if f.is_zero() {
            return g;
        }
        if g.is_zero() {
            return f;
        }
        if f == g {
            return ZddId::ZERO;
        }

        let key = CacheKey::commutative(OpType::SymDiff, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let v = self.top(f).min(self.top(g));
        let (f0, f1) = self.branches(f, v);
        let (g0, g1) = self.branches(g, v);
        let lo = self.symmetric_difference(f0, g0);
        let hi = self.symmetric_difference(f1, g1);
        let res = self.get_node(Elem::new(v), lo, hi);
        self.remember(key, res)
    }

    /// True if `F` and `G` share no member.
    pub fn is_disjoint(&self, f: ZddId, g: ZddId) -> bool {
        self.intersection(f, g).is_zero()
    }

    /// True if every member of `F` is a member of `G`.
    pub fn is_subset(&self, f: ZddId, g: ZddId) -> bool {
        self.difference(f, g).is_zero()
    }

    /// True if every member of `G` is a member of `F`.
    pub fn is_superset(&self, f: ZddId, g: ZddId) -> bool {
        self.is_subset(g, f)
    }

    // ========================================================================
    // Pairwise Set Operations
    // ========================================================================

    /// Join: `{S ∪ T | S ∈ F, T ∈ G}`.
    pub fn join(&self, f: ZddId, g: ZddId) -> ZddId {
        if f.is_zero() || g.is_zero() {
            return ZddId::ZERO;
        }
        if f.is_one() {
            return g;
        }
        if g.is_one() {
            return f;
        }

        let key = CacheKey::commutative(OpType::Join, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let v = self.top(f).min(self.top(g));
        let (f0, f1) = self.branches(f, v);
        let (g0, g1) = self.branches(g, v);

        let lo = self.join(f0, g0);
        // A union contains v as soon as one side does
        let hi_lo = self.join(f1, g0);
        let lo_hi = self.join(f0, g1);
        let hi_hi = self.join(f1, g1);
        let hi = self.union(hi_lo, self.union(lo_hi, hi_hi));

        let res = self.get_node(Elem::new(v), lo, hi);
        self.remember(key, res)
    }

    /// Meet: `{S ∩ T | S ∈ F, T ∈ G}`.
    ///
    /// Empty intersections are kept, so the meet of two non-empty families is
    /// never empty.
    pub fn meet(&self, f: ZddId, g: ZddId) -> ZddId {
        if f.is_zero() || g.is_zero() {
            return ZddId::ZERO;
        }
        if f.is_one() || g.is_one() {
            return ZddId::ONE;
        }

        let key = CacheKey::commutative(OpType::Meet, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let v = self.top(f).min(self.top(g));
        let (f0, f1) = self.branches(f, v);
        let (g0, g1) = self.branches(g, v);

        // v survives only when both sides carry it
        let lo_lo = self.meet(f0, g0);
        let lo_hi = self.meet(f0, g1);
        let hi_lo = self.meet(f1, g0);
        let lo = self.union(lo_lo, self.union(lo_hi, hi_lo));
        let hi = self.meet(f1, g1);

        let res = self.get_node(Elem::new(v), lo, hi);
        self.remember(key, res)
    }

    /// Weak division: the largest `Q` with `join(G, Q) ⊆ F`, where every
    /// quotient member is disjoint from every divisor member.
    ///
    /// Dividing by ⊥ yields ⊥. A divisor containing the empty set is rejected.
    pub fn quotient(&self, f: ZddId, g: ZddId) -> Result<ZddId> {
        if self.contains_empty(g) {
            return Err(Error::EmptySetDivisor);
        }
        if g.is_zero() {
            return Ok(ZddId::ZERO);
        }
        Ok(self.divide(f, g))
    }

    /// Remainder of weak division: `F \ join(G, F / G)`.
    pub fn remainder(&self, f: ZddId, g: ZddId) -> Result<ZddId> {
        let q = self.quotient(f, g)?;
        let product = self.join(g, q);
        Ok(self.difference(f, product))
    }

    fn divide(&self, f: ZddId, g: ZddId) -> ZddId {
        if g.is_one() {
            return f;
        }
        if f == g {
            return ZddId::ONE;
        }
        if f.is_terminal() {
            return ZddId::ZERO;
        }

        let key = CacheKey::non_commutative(OpType::Quotient, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let g_node = self.node(g);
        let v = g_node.elem;
        let f1 = self.subset1(f, v);
        let mut q = self.divide(f1, g_node.hi);
        if !q.is_zero() && !g_node.lo.is_zero() {
            let f0 = self.subset0(f, v);
            let q0 = self.divide(f0, g_node.lo);
            q = self.intersection(q, q0);
        }
        self.remember(key, q)
    }

    // ========================================================================
    // Containment Filters
    // ========================================================================

    /// Members of `F` that are a subset of some member of `G`.
    pub fn subsets(&self, f: ZddId, g: ZddId) -> ZddId {
        if f.is_zero() || g.is_zero() {
            return ZddId::ZERO;
        }
        if f == g || f.is_one() {
            return f;
        }
        if g.is_one() {
            return if self.contains_empty(f) { ZddId::ONE } else { ZddId::ZERO };
        }

        let key = CacheKey::non_commutative(OpType::Subsets, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let v = self.top(f).min(self.top(g));
        let (f0, f1) = self.branches(f, v);
        let (g0, g1) = self.branches(g, v);
        let lo = self.subsets(f0, self.union(g0, g1));
        let hi = self.subsets(f1, g1);
        let res = self.get_node(Elem::new(v), lo, hi);
        self.remember(key, res)
    }

    /// Members of `F` that are a superset of some member of `G`.
    pub fn supersets(&self, f: ZddId, g: ZddId) -> ZddId {
        if f.is_zero() || g.is_zero() {
            return ZddId::ZERO;
        }
        if f == g || self.contains_empty(g) {
            return f;
        }
        if f.is_one() {
            return ZddId::ZERO;
        }

        let key = CacheKey::non_commutative(OpType::Supersets, f, g);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let v = self.top(f).min(self.top(g));
        let (f0, f1) = self.branches(f, v);
        let (g0, g1) = self.branches(g, v);
        let lo = self.supersets(f0, g0);
        let hi = self.supersets(f1, self.union(g0, g1));
        let res = self.get_node(Elem::new(v), lo, hi);
        self.remember(key, res)
    }

    /// Members of `F` that are not a subset of any member of `G`.
    pub fn non_subsets(&self, f: ZddId, g: ZddId) -> ZddId {
        self.difference(f, self.subsets(f, g))
    }

    /// Members of `F` that are not a superset of any member of `G`.
    pub fn non_supersets(&self, f: ZddId, g: ZddId) -> ZddId {
        self.difference(f, self.supersets(f, g))
    }

    /// Members of `F` with no proper subset in `F`.
    pub fn minimal(&self, f: ZddId) -> ZddId {
        if f.is_terminal() {
            return f;
        }
        let key = CacheKey::unary(OpType::Minimal, f, 0);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let node = self.node(f);
        let lo = self.minimal(node.lo);
        let hi = self.non_supersets(self.minimal(node.hi), node.lo);
        let res = self.get_node(node.elem, lo, hi);
        self.remember(key, res)
    }

    /// Members of `F` with no proper superset in `F`.
    pub fn maximal(&self, f: ZddId) -> ZddId {
        if f.is_terminal() {
            return f;
        }
        let key = CacheKey::unary(OpType::Maximal, f, 0);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let node = self.node(f);
        let lo = self.non_subsets(self.maximal(node.lo), node.hi);
        let hi = self.maximal(node.hi);
        let res = self.get_node(node.elem, lo, hi);
        self.remember(key, res)
    }

    /// All subsets of `{1..num_elems}` that intersect every member of `F`.
    pub fn hitting(&self, f: ZddId) -> ZddId {
        debug!("hitting sets of {} over {} elements", f, self.num_elems());
        self.hitting_from(f, 1)
    }

    fn hitting_from(&self, f: ZddId, e: u32) -> ZddId {
        if f.is_zero() {
            return self.powerset_from(e);
        }
        if self.contains_empty(f) {
            return ZddId::ZERO;
        }

        let key = CacheKey::grounded(OpType::Hitting, f, e, self.num_elems());
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let node = self.node(f);
        let res = if node.elem.id() > e {
            let rest = self.hitting_from(f, e + 1);
            self.get_node(Elem::new(e), rest, rest)
        } else {
            // Without e, the remaining elements must also hit the members holding e
            let lo = self.hitting_from(self.union(node.lo, node.hi), e + 1);
            let hi = self.hitting_from(node.lo, e + 1);
            self.get_node(node.elem, lo, hi)
        };
        self.remember(key, res)
    }

    // ========================================================================
    // Size Filters
    // ========================================================================

    /// Members whose cardinality compares to `k` as `cmp` says.
    pub fn filter_size(&self, f: ZddId, k: u32, cmp: SizeCmp) -> ZddId {
        match cmp {
            SizeCmp::Less => {
                if f.is_zero() || k == 0 {
                    return ZddId::ZERO;
                }
                if f.is_one() {
                    return f;
                }
            }
            SizeCmp::Greater => {
                if f.is_terminal() {
                    return ZddId::ZERO;
                }
                if k == 0 {
                    return self.difference(f, ZddId::ONE);
                }
            }
            SizeCmp::Equal => {
                if f.is_zero() {
                    return ZddId::ZERO;
                }
                if f.is_one() || k == 0 {
                    return if self.contains_empty(f) && k == 0 {
                        ZddId::ONE
                    } else {
                        ZddId::ZERO
                    };
                }
            }
        }

        let key = CacheKey::unary(cmp.op(), f, k);
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let node = self.node(f);
        let lo = self.filter_size(node.lo, k, cmp);
        let hi = self.filter_size(node.hi, k - 1, cmp);
        let res = self.get_node(node.elem, lo, hi);
        self.remember(key, res)
    }

    /// Members with fewer than `k` elements.
    pub fn smaller(&self, f: ZddId, k: u32) -> ZddId {
        self.filter_size(f, k, SizeCmp::Less)
    }

    /// Members with more than `k` elements.
    pub fn larger(&self, f: ZddId, k: u32) -> ZddId {
        self.filter_size(f, k, SizeCmp::Greater)
    }

    /// Members with exactly `k` elements.
    pub fn same_size(&self, f: ZddId, k: u32) -> ZddId {
        self.filter_size(f, k, SizeCmp::Equal)
    }

    // ========================================================================
    // Complements
    // ========================================================================

    /// Replaces every member `S` by `{1..num_elems} \ S`.
    pub fn flip_all(&self, f: ZddId) -> ZddId {
        self.flip_from(f, 1)
    }

    fn flip_from(&self, f: ZddId, e: u32) -> ZddId {
        if f.is_zero() || e > self.num_elems() {
            return f;
        }

        let key = CacheKey::grounded(OpType::Flip, f, e, self.num_elems());
        if let Some(res) = self.cached(&key) {
            return res;
        }

        let res = if self.top(f) > e {
            // No member holds e, so every flipped member does
            let hi = self.flip_from(f, e + 1);
            self.get_node(Elem::new(e), ZddId::ZERO, hi)
        } else {
            let node = self.node(f);
            let lo = self.flip_from(node.hi, e + 1);
            let hi = self.flip_from(node.lo, e + 1);
            self.get_node(node.elem, lo, hi)
        };
        self.remember(key, res)
    }

    /// Toggles `elem` in every member.
    pub fn flip_elem(&self, f: ZddId, elem: Elem) -> ZddId {
        self.change(f, elem)
    }

    /// Complement: all subsets of `{1..num_elems}` not in `F`.
    pub fn invert(&self, f: ZddId) -> ZddId {
        self.difference(self.powerset_from(1), f)
    }

    // ========================================================================
    // Element Updates
    // ========================================================================

    /// Adds `elem` to every member.
    pub fn add_elem(&self, f: ZddId, elem: Elem) -> ZddId {
        let without = self.subset0(f, elem);
        let with = self.subset1(f, elem);
        self.change(self.union(without, with), elem)
    }

    /// Removes `elem` from every member.
    pub fn remove_elem(&self, f: ZddId, elem: Elem) -> ZddId {
        let without = self.subset0(f, elem);
        let with = self.subset1(f, elem);
        self.union(without, with)
    }
}
