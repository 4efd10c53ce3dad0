//! Subgraph constraints for the frontier compiler.
//!
//! A [`SubgraphSpec`] describes a graph by its edge list together with the
//! constraints every accepted edge subset must satisfy. Edge `i` of the list
//! becomes element `i + 1` of the compiled family.
//!
//! ```
//! use setset_rs::graph::SubgraphSpec;
//! use setset_rs::range::Range;
//!
//! let spec = SubgraphSpec::new([("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")])
//!     .num_edges(Range::exactly(2))
//!     .no_loop(true);
//! assert_eq!(spec.vertices(), vec!["A", "B", "C", "D"]);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::range::Range;

#[derive(Debug, Clone)]
pub struct SubgraphSpec<V> {
    edges: Vec<(V, V)>,
    vertex_groups: Vec<Vec<V>>,
    degree_constraints: HashMap<V, Range>,
    num_edges: Option<Range>,
    num_comps: Option<usize>,
    no_loop: bool,
}

impl<V> SubgraphSpec<V>
where
    V: Clone + Eq + Hash + Ord + Debug,
{
    /// Creates a spec over the given edges, processed in this order.
    pub fn new(edges: impl IntoIterator<Item = (V, V)>) -> Self {
        Self {
            edges: edges.into_iter().collect(),
            vertex_groups: Vec::new(),
            degree_constraints: HashMap::new(),
            num_edges: None,
            num_comps: None,
            no_loop: false,
        }
    }

    /// Vertices of one group must end up connected; vertices of different
    /// groups must end up in different components.
    pub fn vertex_groups<G>(mut self, groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = V>,
    {
        self.vertex_groups = groups.into_iter().map(|g| g.into_iter().collect()).collect();
        self
    }

    /// Bounds the final degree of `vertex`. Self-loops count twice.
    pub fn degree(mut self, vertex: V, range: Range) -> Self {
        self.degree_constraints.insert(vertex, range);
        self
    }

    pub fn degree_constraints(mut self, constraints: HashMap<V, Range>) -> Self {
        self.degree_constraints = constraints;
        self
    }

    /// Bounds the final degree of `vertex` with an untyped `(min, max, step)`.
    pub fn degree_from_slice(self, vertex: V, values: &[i64]) -> Result<Self> {
        let range = config_range(values)?;
        Ok(self.degree(vertex, range))
    }

    /// Bounds the number of accepted edges.
    pub fn num_edges(mut self, range: Range) -> Self {
        self.num_edges = Some(range);
        self
    }

    /// Bounds the number of accepted edges with an untyped `(min, max, step)`.
    pub fn num_edges_from_slice(self, values: &[i64]) -> Result<Self> {
        let range = config_range(values)?;
        Ok(self.num_edges(range))
    }

    /// Requires exactly `k` connected components, counted over all vertices
    /// of the graph. A vertex without accepted edges is a component.
    pub fn num_comps(mut self, k: usize) -> Self {
        self.num_comps = Some(k);
        self
    }

    /// Rejects edge subsets containing a cycle, self-loops included.
    pub fn no_loop(mut self, no_loop: bool) -> Self {
        self.no_loop = no_loop;
        self
    }

    pub fn edges(&self) -> &[(V, V)] {
        &self.edges
    }

    pub fn groups(&self) -> &[Vec<V>] {
        &self.vertex_groups
    }

    pub fn degree_of(&self, vertex: &V) -> Option<Range> {
        self.degree_constraints.get(vertex).copied()
    }

    pub fn edge_range(&self) -> Option<Range> {
        self.num_edges
    }

    pub fn comp_count(&self) -> Option<usize> {
        self.num_comps
    }

    pub fn is_acyclic(&self) -> bool {
        self.no_loop
    }

    /// All vertices touched by some edge, in ascending order.
    pub fn vertices(&self) -> Vec<V> {
        let vertices: BTreeSet<&V> = self.edges.iter().flat_map(|(u, v)| [u, v]).collect();
        vertices.into_iter().cloned().collect()
    }

    /// Checks the constraints against the graph and the element ceiling.
    pub fn validate(&self, elem_limit: u32) -> Result<()> {
        if self.edges.len() > elem_limit as usize {
            return Err(Error::Config(format!(
                "{} edges exceed the element limit {}",
                self.edges.len(),
                elem_limit
            )));
        }

        let vertices: HashSet<&V> = self.edges.iter().flat_map(|(u, v)| [u, v]).collect();

        let mut grouped: HashMap<&V, usize> = HashMap::new();
        for (g, group) in self.vertex_groups.iter().enumerate() {
            for vertex in group {
                if !vertices.contains(vertex) {
                    return Err(Error::Config(format!("group vertex {:?} is not in the graph", vertex)));
                }
                if let Some(&other) = grouped.get(vertex) {
                    if other != g {
                        return Err(Error::Config(format!(
                            "vertex {:?} belongs to groups {} and {}",
                            vertex, other, g
                        )));
                    }
                }
                grouped.insert(vertex, g);
            }
        }

        for vertex in self.degree_constraints.keys() {
            if !vertices.contains(vertex) {
                return Err(Error::Config(format!(
                    "degree-constrained vertex {:?} is not in the graph",
                    vertex
                )));
            }
        }

        Ok(())
    }
}

fn config_range(values: &[i64]) -> Result<Range> {
    Range::from_slice(values).map_err(|e| Error::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> SubgraphSpec<&'static str> {
        SubgraphSpec::new([("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")])
    }

    #[test]
    fn test_vertices() {
        let spec = SubgraphSpec::new([(3, 1), (1, 2), (2, 2)]);
        assert_eq!(spec.vertices(), vec![1, 2, 3]);
        assert_eq!(spec.edges().len(), 3);
    }

    #[test]
    fn test_builder() {
        let spec = cycle()
            .vertex_groups([vec!["A"], vec!["C"]])
            .degree("B", Range::at_most(1))
            .num_edges(Range::exactly(2))
            .num_comps(2)
            .no_loop(true);
        assert_eq!(spec.groups().len(), 2);
        assert_eq!(spec.degree_of(&"B"), Some(Range::at_most(1)));
        assert_eq!(spec.degree_of(&"A"), None);
        assert_eq!(spec.edge_range(), Some(Range::exactly(2)));
        assert_eq!(spec.comp_count(), Some(2));
        assert!(spec.is_acyclic());
        assert!(spec.validate(10).is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_vertices() {
        let spec = cycle().vertex_groups([vec!["A", "E"]]);
        assert!(matches!(spec.validate(10), Err(Error::Config(_))));

        let spec = cycle().degree("Z", Range::exactly(1));
        assert!(matches!(spec.validate(10), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_overlapping_groups() {
        let spec = cycle().vertex_groups([vec!["A", "B"], vec!["B"]]);
        assert!(matches!(spec.validate(10), Err(Error::Config(_))));

        // Repeating a vertex inside one group is harmless
        let spec = cycle().vertex_groups([vec!["A", "A"]]);
        assert!(spec.validate(10).is_ok());
    }

    #[test]
    fn test_validate_rejects_too_many_edges() {
        assert!(matches!(cycle().validate(3), Err(Error::Config(_))));
        assert!(cycle().validate(4).is_ok());
    }

    #[test]
    fn test_untyped_ranges() {
        assert!(cycle().num_edges_from_slice(&[1, 2, 1]).is_ok());
        assert!(matches!(cycle().num_edges_from_slice(&[3, 2, 1]), Err(Error::Config(_))));
        assert!(matches!(cycle().degree_from_slice("A", &[0, 2]), Err(Error::Config(_))));
    }
}
