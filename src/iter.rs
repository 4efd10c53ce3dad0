//! Cursors for enumerating the members of a family.
//!
//! Three strategies are provided:
//!
//! - [`SetIterator`]: sequential depth-first order, ∅ first.
//! - [`RandomIterator`]: uniformly random order without repetition.
//! - [`WeightedIterator`]: best total weight first.
//!
//! The random and weighted cursors keep a private remainder of the family from
//! which they subtract every yielded member. Subtracting may intern new nodes,
//! but the family the cursor was created from is never changed.

use std::collections::HashMap;

use log::debug;
use num_bigint::RandBigInt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::reference::ZddId;
use crate::types::Elem;
use crate::zdd::ZddManager;

/// A resumable enumeration over the members of a family.
pub trait Cursor: Iterator<Item = Vec<Elem>> {
    /// Returns true if [`next`][Iterator::next] would yield another member.
    fn has_more(&self) -> bool;

    /// Rewinds the cursor to its initial state.
    fn restart(&mut self);
}

/// Iterator that yields all sets in a ZDD family.
///
/// Members come out in depth-first order, lo branch before hi branch.
pub struct SetIterator<'a> {
    mgr: &'a ZddManager,
    root: ZddId,
    /// Pending subdiagrams with the elements chosen on the way there.
    /// Only non-empty subdiagrams are ever pushed.
    stack: Vec<(ZddId, Vec<Elem>)>,
}

impl<'a> SetIterator<'a> {
    /// Creates a new iterator over sets in the given ZDD.
    pub fn new(mgr: &'a ZddManager, root: ZddId) -> Self {
        let mut iter = Self {
            mgr,
            root,
            stack: Vec::new(),
        };
        iter.restart();
        iter
    }
}

impl Iterator for SetIterator<'_> {
    type Item = Vec<Elem>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, current_set)) = self.stack.pop() {
            if id.is_one() {
                return Some(current_set);
            }

            let node = self.mgr.node(id);

            // Push hi first so that lo is explored first
            let mut hi_set = current_set.clone();
            hi_set.push(node.elem);
            self.stack.push((node.hi, hi_set));
            if !node.lo.is_zero() {
                self.stack.push((node.lo, current_set));
            }
        }
        None
    }
}

impl Cursor for SetIterator<'_> {
    fn has_more(&self) -> bool {
        !self.stack.is_empty()
    }

    fn restart(&mut self) {
        self.stack.clear();
        if !self.root.is_zero() {
            self.stack.push((self.root, Vec::new()));
        }
    }
}

/// Iterator yielding the members of a family in uniformly random order.
///
/// Each step walks down from the root, taking every branch with probability
/// proportional to the number of members below it, so every member not yet
/// yielded is equally likely to come next.
pub struct RandomIterator<'a> {
    mgr: &'a ZddManager,
    family: ZddId,
    remainder: ZddId,
    seed: u64,
    rng: ChaCha8Rng,
}

impl<'a> RandomIterator<'a> {
    pub fn new(mgr: &'a ZddManager, family: ZddId, seed: u64) -> Self {
        Self {
            mgr,
            family,
            remainder: family,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Restarts the enumeration with a new seed.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.restart();
    }

    fn sample(&mut self) -> Vec<Elem> {
        let mut member = Vec::new();
        let mut current = self.remainder;
        while !current.is_terminal() {
            let node = self.mgr.node(current);
            let lo_count = self.mgr.count(node.lo);
            let total = &lo_count + self.mgr.count(node.hi);
            if self.rng.gen_biguint_below(&total) < lo_count {
                current = node.lo;
            } else {
                member.push(node.elem);
                current = node.hi;
            }
        }
        debug_assert!(current.is_one());
        member
    }
}

impl Iterator for RandomIterator<'_> {
    type Item = Vec<Elem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remainder.is_zero() {
            return None;
        }
        let member = self.sample();
        let drawn = self.mgr.singleton_of(&member);
        self.remainder = self.mgr.difference(self.remainder, drawn);
        Some(member)
    }
}

impl Cursor for RandomIterator<'_> {
    fn has_more(&self) -> bool {
        !self.remainder.is_zero()
    }

    fn restart(&mut self) {
        self.remainder = self.family;
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}

/// Iterator yielding members in order of total weight, best first.
///
/// Element `e` weighs `weights[e - 1]`; elements beyond the slice weigh 0.
/// Among members of equal weight, the one lacking the smallest element at
/// which they differ comes first.
pub struct WeightedIterator<'a> {
    mgr: &'a ZddManager,
    family: ZddId,
    remainder: ZddId,
    weights: Vec<f64>,
    /// `1.0` to maximize, `-1.0` to minimize.
    sign: f64,
    /// Best achievable (signed) weight below each node.
    best: HashMap<ZddId, f64>,
}

impl<'a> WeightedIterator<'a> {
    pub fn maximize(mgr: &'a ZddManager, family: ZddId, weights: &[f64]) -> Self {
        Self::with_sign(mgr, family, weights, 1.0)
    }

    pub fn minimize(mgr: &'a ZddManager, family: ZddId, weights: &[f64]) -> Self {
        Self::with_sign(mgr, family, weights, -1.0)
    }

    fn with_sign(mgr: &'a ZddManager, family: ZddId, weights: &[f64], sign: f64) -> Self {
        Self {
            mgr,
            family,
            remainder: family,
            weights: weights.to_vec(),
            sign,
            best: HashMap::new(),
        }
    }

    fn weight(&self, elem: Elem) -> f64 {
        self.sign * self.weights.get(elem.index()).copied().unwrap_or(0.0)
    }

    /// Best signed weight of any member of `f`, which must not be ⊥.
    fn best_weight(&mut self, f: ZddId) -> f64 {
        if f.is_one() {
            return 0.0;
        }
        if let Some(&w) = self.best.get(&f) {
            return w;
        }
        let node = self.mgr.node(f);
        let hi = self.best_weight(node.hi) + self.weight(node.elem);
        let w = if node.lo.is_zero() {
            hi
        } else {
            self.best_weight(node.lo).max(hi)
        };
        self.best.insert(f, w);
        w
    }

    fn best_member(&mut self) -> Vec<Elem> {
        let mut member = Vec::new();
        let mut current = self.remainder;
        while !current.is_terminal() {
            let node = self.mgr.node(current);
            let hi = self.best_weight(node.hi) + self.weight(node.elem);
            // Ties go to the lo branch
            if !node.lo.is_zero() && self.best_weight(node.lo) >= hi {
                current = node.lo;
            } else {
                member.push(node.elem);
                current = node.hi;
            }
        }
        member
    }
}

impl Iterator for WeightedIterator<'_> {
    type Item = Vec<Elem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remainder.is_zero() {
            return None;
        }
        let member = self.best_member();
        let chosen = self.mgr.singleton_of(&member);
        self.remainder = self.mgr.difference(self.remainder, chosen);
        Some(member)
    }
}

impl Cursor for WeightedIterator<'_> {
    fn has_more(&self) -> bool {
        !self.remainder.is_zero()
    }

    fn restart(&mut self) {
        self.remainder = self.family;
    }
}

impl ZddManager {
    /// Returns an iterator over all sets in the family.
    ///
    /// # Example
    ///
    /// ```
    /// use setset_rs::zdd::ZddManager;
    ///
    /// let mgr = ZddManager::new();
    /// let ps = mgr.powerset([1, 2]).unwrap();
    ///
    /// let sets: Vec<_> = mgr.iter_sets(ps).collect();
    /// assert_eq!(sets.len(), 4);
    /// ```
    pub fn iter_sets(&self, f: ZddId) -> SetIterator<'_> {
        SetIterator::new(self, f)
    }

    /// Returns a cursor yielding the members of `f` in random order.
    pub fn iter_random(&self, f: ZddId, seed: u64) -> RandomIterator<'_> {
        debug!("random cursor over {} with seed {}", f, seed);
        RandomIterator::new(self, f, seed)
    }

    /// Returns a cursor yielding the members of `f` by decreasing weight.
    pub fn maximize(&self, f: ZddId, weights: &[f64]) -> WeightedIterator<'_> {
        WeightedIterator::maximize(self, f, weights)
    }

    /// Returns a cursor yielding the members of `f` by increasing weight.
    pub fn minimize(&self, f: ZddId, weights: &[f64]) -> WeightedIterator<'_> {
        WeightedIterator::minimize(self, f, weights)
    }

    /// Collects all sets into a vector of vectors.
    pub fn collect_sets(&self, f: ZddId) -> Vec<Vec<Elem>> {
        self.iter_sets(f).collect()
    }

    /// Returns one arbitrary set from the family, if non-empty.
    pub fn pick_one(&self, f: ZddId) -> Option<Vec<Elem>> {
        if f.is_zero() {
            return None;
        }

        let mut result = Vec::new();
        let mut current = f;

        // hi is never ⊥, so following it always ends at ⊤
        while !current.is_terminal() {
            let node = self.node(current);
            result.push(node.elem);
            current = node.hi;
        }

        Some(result)
    }
}
