//! Family handles: families of sets as first-class values.
//!
//! A [`Family`] pairs a [`ZddManager`] with a root [`ZddId`]. It is a cheap
//! `Copy` value; every operation returns a new handle, and the `*_update`
//! methods together with the compound assignment operators rebind the handle
//! in place. Diagram nodes themselves are never mutated.
//!
//! ```
//! use setset_rs::family::Family;
//! use setset_rs::zdd::ZddManager;
//!
//! let mgr = ZddManager::new();
//! let a = Family::from_sets(&mgr, vec![vec![1, 2], vec![3]]).unwrap();
//! let b = Family::from_sets(&mgr, vec![vec![3], vec![4]]).unwrap();
//!
//! assert_eq!((a | b).len().unwrap(), 3);
//! assert_eq!((a & b).to_string(), "{{3}}");
//! assert!(a & b <= a);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::io::{self, BufRead};
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Sub, SubAssign};

use num_bigint::BigUint;

use crate::error::{Error, Result};
use crate::frontier::compile_subgraphs;
use crate::graph::SubgraphSpec;
use crate::iter::{RandomIterator, SetIterator, WeightedIterator};
use crate::range::Range;
use crate::reference::ZddId;
use crate::types::Elem;
use crate::zdd::ZddManager;

/// A family of sets living in a [`ZddManager`].
#[derive(Copy, Clone)]
pub struct Family<'m> {
    mgr: &'m ZddManager,
    root: ZddId,
}

impl<'m> Family<'m> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Wraps an existing diagram of `mgr`.
    ///
    /// # Panics
    ///
    /// Panics if `root` is not a node of `mgr`, e.g. a root taken from
    /// another manager that has more nodes.
    pub fn new(mgr: &'m ZddManager, root: ZddId) -> Self {
        assert!(
            root.index() < mgr.num_nodes(),
            "root {} is not a node of this manager ({} nodes)",
            root,
            mgr.num_nodes()
        );
        Self { mgr, root }
    }

    /// The empty family.
    pub fn empty(mgr: &'m ZddManager) -> Self {
        Self::new(mgr, ZddId::ZERO)
    }

    /// The family holding only the empty set.
    pub fn unit(mgr: &'m ZddManager) -> Self {
        Self::new(mgr, ZddId::ONE)
    }

    /// All subsets of `{1..num_elems}`.
    pub fn universe(mgr: &'m ZddManager) -> Self {
        Self::new(mgr, mgr.powerset_from(1))
    }

    pub fn from_sets<I, S>(mgr: &'m ZddManager, sets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = u32>,
    {
        Ok(Self::new(mgr, mgr.from_sets(sets)?))
    }

    /// Builds the subsets of `{1..num_elems}` satisfying every constraint.
    ///
    /// Each value must be a `(min, max, step)` triple. The key `"size"` bounds
    /// the cardinality of each member; a decimal element key bounds how often
    /// that element occurs, so `[1, 1, 1]` forces it in and `[0, 0, 1]` keeps
    /// it out. Element keys widen the ground set as needed.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use setset_rs::family::Family;
    /// use setset_rs::zdd::ZddManager;
    ///
    /// let mgr = ZddManager::new();
    /// mgr.set_num_elems(4).unwrap();
    ///
    /// let mut constraints = BTreeMap::new();
    /// constraints.insert("size".to_string(), vec![2, 2, 1]);
    /// constraints.insert("1".to_string(), vec![1, 1, 1]);
    /// let f = Family::from_constraints(&mgr, &constraints).unwrap();
    /// assert_eq!(f.to_string(), "{{1, 4}, {1, 3}, {1, 2}}");
    /// ```
    pub fn from_constraints(mgr: &'m ZddManager, constraints: &BTreeMap<String, Vec<i64>>) -> Result<Self> {
        let mut size = None;
        let mut elems = Vec::new();
        for (key, values) in constraints {
            let range = Range::from_slice(values)?;
            if key == "size" {
                size = Some(range);
            } else if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
                let elem: u64 = key
                    .parse()
                    .map_err(|_| Error::Config(format!("element key {} is out of range", key)))?;
                elems.push((mgr.admit(elem)?, range));
            } else {
                return Err(Error::Config(format!("unknown constraint key: {:?}", key)));
            }
        }

        let mut family = Self::universe(mgr);
        for (elem, range) in elems {
            family = match (range.contains(0), range.contains(1)) {
                (true, true) => family,
                (false, true) => family.include_elem(elem),
                (true, false) => family.exclude_elem(elem),
                (false, false) => Self::empty(mgr),
            };
        }
        if let Some(range) = size {
            let max = range.max().min(mgr.num_elems());
            let sized = (range.min()..=max)
                .step_by(range.step() as usize)
                .map(|k| mgr.same_size(family.root, k))
                .fold(ZddId::ZERO, |acc, f| mgr.union(acc, f));
            family = family.with(sized);
        }
        Ok(family)
    }

    /// Compiles the edge subsets of a graph satisfying `spec`.
    pub fn subgraphs<V>(mgr: &'m ZddManager, spec: &SubgraphSpec<V>) -> Result<Self>
    where
        V: Clone + Eq + Hash + Ord + fmt::Debug,
    {
        Ok(Self::new(mgr, compile_subgraphs(mgr, spec)?))
    }

    /// Reads a family in text format.
    pub fn load(mgr: &'m ZddManager, reader: impl BufRead) -> Result<Self> {
        Ok(Self::new(mgr, mgr.load(reader)?))
    }

    pub fn loads(mgr: &'m ZddManager, content: &str) -> Result<Self> {
        Ok(Self::new(mgr, mgr.loads(content)?))
    }

    fn with(&self, root: ZddId) -> Self {
        Self::new(self.mgr, root)
    }

    fn check_same_manager(&self, other: &Family<'_>) {
        assert!(
            std::ptr::eq(self.mgr, other.mgr),
            "families from different managers cannot be combined"
        );
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn root(&self) -> ZddId {
        self.root
    }

    pub fn manager(&self) -> &'m ZddManager {
        self.mgr
    }

    /// Exact number of members.
    pub fn size(&self) -> BigUint {
        self.mgr.count(self.root)
    }

    /// Number of members as a native integer.
    ///
    /// Fails with [`Error::Overflow`], carrying the exact count, when it does
    /// not fit in a `u64`.
    pub fn len(&self) -> Result<u64> {
        let size = self.size();
        u64::try_from(&size).map_err(|_| Error::Overflow(size.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_zero()
    }

    pub fn contains(&self, set: impl IntoIterator<Item = u32>) -> bool {
        let set: Vec<u32> = set.into_iter().collect();
        self.mgr.contains(self.root, &set)
    }

    // ========================================================================
    // Set Algebra
    // ========================================================================

    pub fn union(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.union(self.root, other.root))
    }

    pub fn intersection(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.intersection(self.root, other.root))
    }

    pub fn difference(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.difference(self.root, other.root))
    }

    pub fn symmetric_difference(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.symmetric_difference(self.root, other.root))
    }

    pub fn union_update(&mut self, other: Family<'m>) {
        *self = self.union(other);
    }

    pub fn intersection_update(&mut self, other: Family<'m>) {
        *self = self.intersection(other);
    }

    pub fn difference_update(&mut self, other: Family<'m>) {
        *self = self.difference(other);
    }

    pub fn symmetric_difference_update(&mut self, other: Family<'m>) {
        *self = self.symmetric_difference(other);
    }

    /// Union of this family with all `others`.
    pub fn union_all(&self, others: impl IntoIterator<Item = Family<'m>>) -> Self {
        others.into_iter().fold(*self, |acc, f| acc.union(f))
    }

    /// Intersection of this family with all `others`.
    pub fn intersection_all(&self, others: impl IntoIterator<Item = Family<'m>>) -> Self {
        others.into_iter().fold(*self, |acc, f| acc.intersection(f))
    }

    pub fn is_disjoint(&self, other: Family<'m>) -> bool {
        self.check_same_manager(&other);
        self.mgr.is_disjoint(self.root, other.root)
    }

    pub fn is_subset(&self, other: Family<'m>) -> bool {
        self.check_same_manager(&other);
        self.mgr.is_subset(self.root, other.root)
    }

    pub fn is_superset(&self, other: Family<'m>) -> bool {
        self.check_same_manager(&other);
        self.mgr.is_superset(self.root, other.root)
    }

    /// Weak division by `other`; see [`ZddManager::quotient`].
    pub fn quotient(&self, other: Family<'m>) -> Result<Self> {
        self.check_same_manager(&other);
        Ok(self.with(self.mgr.quotient(self.root, other.root)?))
    }

    pub fn remainder(&self, other: Family<'m>) -> Result<Self> {
        self.check_same_manager(&other);
        Ok(self.with(self.mgr.remainder(self.root, other.root)?))
    }

    pub fn quotient_update(&mut self, other: Family<'m>) -> Result<()> {
        *self = self.quotient(other)?;
        Ok(())
    }

    pub fn remainder_update(&mut self, other: Family<'m>) -> Result<()> {
        *self = self.remainder(other)?;
        Ok(())
    }

    /// Pairwise unions of members.
    pub fn join(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.join(self.root, other.root))
    }

    /// Pairwise intersections of members, ∅ included.
    pub fn meet(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.meet(self.root, other.root))
    }

    pub fn subsets(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.subsets(self.root, other.root))
    }

    pub fn supersets(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.supersets(self.root, other.root))
    }

    pub fn non_subsets(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.non_subsets(self.root, other.root))
    }

    pub fn non_supersets(&self, other: Family<'m>) -> Self {
        self.check_same_manager(&other);
        self.with(self.mgr.non_supersets(self.root, other.root))
    }

    // ========================================================================
    // Filters and Transforms
    // ========================================================================

    /// Members containing `elem`.
    pub fn include(&self, elem: u32) -> Result<Self> {
        Ok(self.include_elem(self.mgr.check_elem(elem)?))
    }

    /// Members not containing `elem`.
    pub fn exclude(&self, elem: u32) -> Result<Self> {
        Ok(self.exclude_elem(self.mgr.check_elem(elem)?))
    }

    fn include_elem(&self, elem: Elem) -> Self {
        self.with(self.mgr.onset(self.root, elem))
    }

    fn exclude_elem(&self, elem: Elem) -> Self {
        self.with(self.mgr.offset(self.root, elem))
    }

    pub fn minimal(&self) -> Self {
        self.with(self.mgr.minimal(self.root))
    }

    pub fn maximal(&self) -> Self {
        self.with(self.mgr.maximal(self.root))
    }

    pub fn hitting(&self) -> Self {
        self.with(self.mgr.hitting(self.root))
    }

    pub fn smaller(&self, k: u32) -> Self {
        self.with(self.mgr.smaller(self.root, k))
    }

    pub fn larger(&self, k: u32) -> Self {
        self.with(self.mgr.larger(self.root, k))
    }

    pub fn same_size(&self, k: u32) -> Self {
        self.with(self.mgr.same_size(self.root, k))
    }

    /// Complements every member with respect to `{1..num_elems}`.
    pub fn flip(&self) -> Self {
        self.with(self.mgr.flip_all(self.root))
    }

    /// Toggles `elem` in every member.
    pub fn flip_elem(&self, elem: u32) -> Result<Self> {
        let elem = self.mgr.admit(elem)?;
        Ok(self.with(self.mgr.flip_elem(self.root, elem)))
    }

    /// All subsets of `{1..num_elems}` that are not members.
    pub fn invert(&self) -> Self {
        self.with(self.mgr.invert(self.root))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    pub fn insert_set(&mut self, set: impl IntoIterator<Item = u32>) -> Result<()> {
        let member = self.mgr.singleton(set)?;
        self.root = self.mgr.union(self.root, member);
        Ok(())
    }

    /// Adds `elem` to every member.
    pub fn insert_elem(&mut self, elem: u32) -> Result<()> {
        let elem = self.mgr.admit(elem)?;
        self.root = self.mgr.add_elem(self.root, elem);
        Ok(())
    }

    /// Removes a member, failing if it is absent.
    pub fn remove_set(&mut self, set: impl IntoIterator<Item = u32>) -> Result<()> {
        let set: Vec<u32> = set.into_iter().collect();
        if !self.mgr.contains(self.root, &set) {
            return Err(Error::NotFound(format!("set {:?} is not a member", set)));
        }
        self.discard_set(set);
        Ok(())
    }

    /// Removes a member if present.
    pub fn discard_set(&mut self, set: impl IntoIterator<Item = u32>) {
        let set: Vec<u32> = set.into_iter().collect();
        if !self.mgr.contains(self.root, &set) {
            return;
        }
        // Members only hold admitted elements
        if let Ok(member) = self.mgr.singleton(set) {
            self.root = self.mgr.difference(self.root, member);
        }
    }

    /// Erases `elem` from every member, failing if no member holds it.
    pub fn remove_elem(&mut self, elem: u32) -> Result<()> {
        let checked = self.mgr.check_elem(elem)?;
        if self.include_elem(checked).is_empty() {
            return Err(Error::NotFound(format!("no member contains element {}", elem)));
        }
        self.root = self.mgr.remove_elem(self.root, checked);
        Ok(())
    }

    /// Erases `elem` from every member holding it.
    pub fn discard_elem(&mut self, elem: u32) {
        if let Ok(elem) = self.mgr.check_elem(elem) {
            self.root = self.mgr.remove_elem(self.root, elem);
        }
    }

    pub fn clear(&mut self) {
        self.root = ZddId::ZERO;
    }

    /// Removes and returns the first member in sequential order.
    pub fn pop(&mut self) -> Result<Vec<Elem>> {
        let member = self
            .iter()
            .next()
            .ok_or_else(|| Error::NotFound("pop from an empty family".to_string()))?;
        let single = self.mgr.singleton_of(&member);
        self.root = self.mgr.difference(self.root, single);
        Ok(member)
    }

    // ========================================================================
    // Enumeration
    // ========================================================================

    pub fn iter(&self) -> SetIterator<'m> {
        self.mgr.iter_sets(self.root)
    }

    pub fn iter_random(&self, seed: u64) -> RandomIterator<'m> {
        self.mgr.iter_random(self.root, seed)
    }

    pub fn maximize(&self, weights: &[f64]) -> WeightedIterator<'m> {
        self.mgr.maximize(self.root, weights)
    }

    pub fn minimize(&self, weights: &[f64]) -> WeightedIterator<'m> {
        self.mgr.minimize(self.root, weights)
    }

    pub fn pick_one(&self) -> Option<Vec<Elem>> {
        self.mgr.pick_one(self.root)
    }

    /// Streams the members in sequential order, formatted like [`Display`][fmt::Display].
    pub fn enumerate(&self, mut writer: impl io::Write) -> Result<()> {
        write!(writer, "{{")?;
        for (i, member) in self.iter().enumerate() {
            if i > 0 {
                write!(writer, ", ")?;
            }
            write!(writer, "{}", SetDisplay(&member))?;
        }
        write!(writer, "}}")?;
        Ok(())
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    pub fn dump(&self, writer: impl io::Write) -> Result<()> {
        self.mgr.dump(self.root, writer)
    }

    pub fn dumps(&self) -> String {
        self.mgr.dumps(self.root)
    }
}

impl<'m> IntoIterator for &Family<'m> {
    type Item = Vec<Elem>;
    type IntoIter = SetIterator<'m>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

struct SetDisplay<'a>(&'a [Elem]);

impl fmt::Display for SetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, elem) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", elem)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Family<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, member) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", SetDisplay(&member))?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Family<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Family").field("root", &self.root).finish()
    }
}

impl PartialEq for Family<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.mgr, other.mgr) && self.root == other.root
    }
}

impl Eq for Family<'_> {}

/// Families are ordered by containment; incomparable families yield `None`.
impl PartialOrd for Family<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !std::ptr::eq(self.mgr, other.mgr) {
            return None;
        }
        if self.root == other.root {
            Some(Ordering::Equal)
        } else if self.mgr.is_subset(self.root, other.root) {
            Some(Ordering::Less)
        } else if self.mgr.is_subset(other.root, self.root) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

macro_rules! family_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:ident) => {
        impl<'m> $trait for Family<'m> {
            type Output = Family<'m>;

            fn $method(self, rhs: Family<'m>) -> Family<'m> {
                self.$op(rhs)
            }
        }

        impl<'m> $assign_trait for Family<'m> {
            fn $assign_method(&mut self, rhs: Family<'m>) {
                *self = self.$op(rhs);
            }
        }
    };
}

family_op!(BitOr, bitor, BitOrAssign, bitor_assign, union);
family_op!(BitAnd, bitand, BitAndAssign, bitand_assign, intersection);
family_op!(Sub, sub, SubAssign, sub_assign, difference);
family_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, symmetric_difference);

impl<'m> Not for Family<'m> {
    type Output = Family<'m>;

    fn not(self) -> Family<'m> {
        self.invert()
    }
}
