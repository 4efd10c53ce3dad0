//! Frontier-based compilation of subgraph constraints into a ZDD.
//!
//! Edges are decided one at a time in the order of the edge list. Before edge
//! `i` is decided, the *frontier* holds the vertices already touched by an
//! earlier edge that still have an undecided incident edge. Everything the
//! remaining decisions can observe about a partial edge subset fits into a
//! small [`State`] over the frontier:
//!
//! - the partial degree of each degree-constrained frontier vertex,
//! - which frontier vertices are already connected (canonical labels),
//! - the group colour of each frontier component,
//! - the number of accepted edges (only when edges are counted),
//! - the number of closed components (only when components are counted).
//!
//! Equal states at one level are merged, so the work grows with the number of
//! distinct states rather than with the number of edge subsets. Once all
//! levels are expanded, the diagram is assembled bottom-up through
//! [`ZddManager::get_node`], which makes the result canonical.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, info};

use crate::error::Result;
use crate::graph::SubgraphSpec;
use crate::range::Range;
use crate::reference::ZddId;
use crate::types::Elem;
use crate::zdd::ZddManager;

/// Compiles all edge subsets satisfying `spec` into a family.
///
/// Edge `i` of the spec becomes element `i + 1`.
///
/// # Example
///
/// ```
/// use num_bigint::BigUint;
/// use setset_rs::frontier::compile_subgraphs;
/// use setset_rs::graph::SubgraphSpec;
/// use setset_rs::zdd::ZddManager;
///
/// let mgr = ZddManager::new();
/// let spec = SubgraphSpec::new([("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")])
///     .no_loop(true)
///     .num_comps(1);
/// let trees = compile_subgraphs(&mgr, &spec).unwrap();
/// assert_eq!(mgr.count(trees), BigUint::from(4u32));
/// ```
pub fn compile_subgraphs<V>(mgr: &ZddManager, spec: &SubgraphSpec<V>) -> Result<ZddId>
where
    V: Clone + Eq + Hash + Ord + Debug,
{
    spec.validate(mgr.elem_limit())?;
    let frontier = Frontier::new(spec);
    let m = frontier.num_levels();
    if m > 0 {
        mgr.admit(m as u64)?;
    }

    let initial = State::default();
    if m == 0 {
        return Ok(if frontier.accepts(&initial) { ZddId::ONE } else { ZddId::ZERO });
    }

    // links[i][s] = (lo, hi) children of state s at level i
    let mut links: Vec<Vec<(Child, Child)>> = Vec::with_capacity(m);
    let mut current = vec![initial];
    for i in 0..m {
        let mut next: HashMap<State, usize> = HashMap::new();
        let mut next_states = Vec::new();
        let mut level = Vec::with_capacity(current.len());

        for state in &current {
            let mut child = |take: bool| match frontier.step(i, state, take) {
                None => Child::Zero,
                Some(s) if i + 1 == m => {
                    if frontier.accepts(&s) {
                        Child::One
                    } else {
                        Child::Zero
                    }
                }
                Some(s) => {
                    let idx = *next.entry(s.clone()).or_insert_with(|| {
                        next_states.push(s);
                        next_states.len() - 1
                    });
                    Child::Node(idx)
                }
            };
            let lo = child(false);
            let hi = child(true);
            level.push((lo, hi));
        }

        debug!(
            "level {}: frontier of {} vertices, {} states, {} successors",
            i,
            frontier.levels[i].ext.len(),
            current.len(),
            next_states.len()
        );
        links.push(level);
        current = next_states;
    }

    // Assemble bottom-up
    let mut ids: Vec<ZddId> = Vec::new();
    for (i, level) in links.iter().enumerate().rev() {
        let elem = Elem::new(i as u32 + 1);
        ids = level
            .iter()
            .map(|&(lo, hi)| {
                let lo = lo.resolve(&ids);
                let hi = hi.resolve(&ids);
                mgr.get_node(elem, lo, hi)
            })
            .collect();
    }

    let root = ids[0];
    info!(
        "compiled {} edges over {} vertices into {} nodes",
        m,
        frontier.num_vertices,
        mgr.node_count(root)
    );
    Ok(root)
}

/// Successor of a state: rejected, accepted, or a state of the next level.
#[derive(Debug, Copy, Clone)]
enum Child {
    Zero,
    One,
    Node(usize),
}

impl Child {
    fn resolve(self, ids: &[ZddId]) -> ZddId {
        match self {
            Child::Zero => ZddId::ZERO,
            Child::One => ZddId::ONE,
            Child::Node(idx) => ids[idx],
        }
    }
}

/// Everything remaining decisions can observe about a partial edge subset.
///
/// The vectors are aligned with the frontier of the level the state lives on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
struct State {
    /// Partial degree; kept at 0 for unconstrained vertices.
    deg: Vec<u32>,
    /// Canonical component label.
    comp: Vec<u32>,
    /// Group of the vertex's component, if any.
    color: Vec<Option<u32>>,
    /// Accepted edges, counted only when the edge count is constrained.
    edges: u32,
    /// Components that lost their last frontier vertex.
    closed: u32,
}

/// Per-level bookkeeping shared by all states of a level.
#[derive(Debug)]
struct Level {
    /// Vertices on the frontier while edge `i` is decided, ascending.
    ext: Vec<usize>,
    /// For each `ext` vertex, its slot in an incoming state, or `None` when
    /// the vertex enters at this edge.
    carried: Vec<Option<usize>>,
    /// Whether each `ext` vertex stays on the frontier after this edge.
    keep: Vec<bool>,
    /// Positions of the edge endpoints in `ext`.
    ends: (usize, usize),
    /// Vertices that have not entered yet once this edge is decided.
    unseen: usize,
}

struct Frontier {
    num_vertices: usize,
    levels: Vec<Level>,
    group: Vec<Option<u32>>,
    /// Index of the edge at which the last vertex of each group enters.
    group_complete: Vec<usize>,
    degree: Vec<Option<Range>>,
    /// Incident edge indices per vertex; self-loops appear twice.
    incident: Vec<Vec<usize>>,
    num_edges: Option<Range>,
    num_comps: Option<usize>,
    no_loop: bool,
}

impl Frontier {
    fn new<V>(spec: &SubgraphSpec<V>) -> Self
    where
        V: Clone + Eq + Hash + Ord + Debug,
    {
        let vertices = spec.vertices();
        let index: HashMap<&V, usize> = vertices.iter().enumerate().map(|(i, v)| (v, i)).collect();
        let n = vertices.len();

        let edges: Vec<(usize, usize)> = spec.edges().iter().map(|(u, v)| (index[u], index[v])).collect();

        let mut first = vec![usize::MAX; n];
        let mut last = vec![0; n];
        let mut incident = vec![Vec::new(); n];
        for (i, &(u, v)) in edges.iter().enumerate() {
            for w in [u, v] {
                first[w] = first[w].min(i);
                last[w] = i;
                incident[w].push(i);
            }
        }

        let mut group = vec![None; n];
        let mut group_complete = vec![0; spec.groups().len()];
        for (g, members) in spec.groups().iter().enumerate() {
            for vertex in members {
                let w = index[vertex];
                group[w] = Some(g as u32);
                group_complete[g] = group_complete[g].max(first[w]);
            }
        }

        let degree = vertices.iter().map(|v| spec.degree_of(v)).collect();

        let mut levels = Vec::with_capacity(edges.len());
        let mut frontier: Vec<usize> = Vec::new();
        for (i, &(u, v)) in edges.iter().enumerate() {
            let mut ext = frontier.clone();
            for w in [u, v] {
                if first[w] == i && !ext.contains(&w) {
                    ext.push(w);
                }
            }
            ext.sort_unstable();

            let carried = ext.iter().map(|w| frontier.binary_search(w).ok()).collect();
            let keep: Vec<bool> = ext.iter().map(|&w| last[w] > i).collect();
            let position = |w: usize| ext.iter().position(|&x| x == w).unwrap_or_default();
            let ends = (position(u), position(v));
            let unseen = first.iter().filter(|&&f| f > i).count();

            frontier = ext.iter().zip(&keep).filter(|&(_, &k)| k).map(|(&w, _)| w).collect();
            levels.push(Level {
                ext,
                carried,
                keep,
                ends,
                unseen,
            });
        }

        Self {
            num_vertices: n,
            levels,
            group,
            group_complete,
            degree,
            incident,
            num_edges: spec.edge_range(),
            num_comps: spec.comp_count(),
            no_loop: spec.is_acyclic(),
        }
    }

    fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Degree still obtainable by vertex `w` from edges after `i`.
    fn remaining_degree(&self, w: usize, i: usize) -> u32 {
        let edges = &self.incident[w];
        (edges.len() - edges.partition_point(|&e| e <= i)) as u32
    }

    /// Decides edge `i` for `state`; `None` if no completion can be accepted.
    fn step(&self, i: usize, state: &State, take: bool) -> Option<State> {
        let level = &self.levels[i];
        let n = level.ext.len();

        let mut deg = vec![0; n];
        let mut comp = vec![0; n];
        let mut color = vec![None; n];
        let mut fresh = state.comp.iter().max().map_or(0, |&c| c + 1);
        for (p, &w) in level.ext.iter().enumerate() {
            match level.carried[p] {
                Some(s) => {
                    deg[p] = state.deg[s];
                    comp[p] = state.comp[s];
                    color[p] = state.color[s];
                }
                None => {
                    comp[p] = fresh;
                    fresh += 1;
                    color[p] = self.group[w];
                }
            }
        }

        let mut edges = state.edges;
        let mut closed = state.closed;
        let (a, b) = level.ends;

        if take {
            if self.num_edges.is_some() {
                edges += 1;
            }
            for p in [a, b] {
                if self.degree[level.ext[p]].is_some() {
                    deg[p] += 1;
                }
            }

            let (ca, cb) = (comp[a], comp[b]);
            if ca == cb {
                if self.no_loop {
                    return None;
                }
            } else {
                let merged = match (color[a], color[b]) {
                    (Some(x), Some(y)) if x != y => return None,
                    (x, y) => x.or(y),
                };
                for p in 0..n {
                    if comp[p] == cb {
                        comp[p] = ca;
                    }
                    if comp[p] == ca {
                        color[p] = merged;
                    }
                }
            }
        }

        for p in [a, b] {
            let w = level.ext[p];
            if let Some(range) = self.degree[w] {
                if deg[p] > range.max() || deg[p] + self.remaining_degree(w, i) < range.min() {
                    return None;
                }
            }
        }

        // Retire leaving vertices
        for p in (0..n).filter(|&p| !level.keep[p]) {
            if let Some(range) = self.degree[level.ext[p]] {
                if !range.contains(deg[p]) {
                    return None;
                }
            }

            let c = comp[p];
            let first_leaving = (0..p).all(|q| level.keep[q] || comp[q] != c);
            let stays = (0..n).any(|q| level.keep[q] && comp[q] == c);
            if !first_leaving || stays {
                continue;
            }

            closed += 1;
            if let Some(g) = color[p] {
                // A closed group component must hold the whole group
                if i < self.group_complete[g as usize] {
                    return None;
                }
                if (0..n).any(|q| comp[q] != c && color[q] == Some(g)) {
                    return None;
                }
            }
        }

        let mut next = State {
            deg: Vec::new(),
            comp: Vec::new(),
            color: Vec::new(),
            edges,
            closed: if self.num_comps.is_some() { closed } else { 0 },
        };
        let mut relabel: HashMap<u32, u32> = HashMap::new();
        for p in (0..n).filter(|&p| level.keep[p]) {
            let label = relabel.len() as u32;
            next.deg.push(deg[p]);
            next.comp.push(*relabel.entry(comp[p]).or_insert(label));
            next.color.push(color[p]);
        }

        let remaining_edges = (self.num_levels() - i - 1) as u32;
        if let Some(range) = self.num_edges {
            if edges > range.max() || edges + remaining_edges < range.min() {
                return None;
            }
        }

        if let Some(k) = self.num_comps {
            let closed = closed as usize;
            let open = relabel.len() + level.unseen;
            if closed > k || closed + open < k || (open > 0 && closed >= k) {
                return None;
            }
        }

        Some(next)
    }

    /// Acceptance once every edge is decided.
    fn accepts(&self, state: &State) -> bool {
        let edges_ok = self.num_edges.map_or(true, |r| r.contains(state.edges));
        let comps_ok = self.num_comps.map_or(true, |k| state.closed as usize == k);
        edges_ok && comps_ok
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use test_log::test;

    use super::*;
    use crate::error::Error;
    use crate::universe::Universe;

    fn cycle() -> SubgraphSpec<&'static str> {
        SubgraphSpec::new([("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")])
    }

    fn count<V: Clone + Eq + Hash + Ord + Debug>(spec: &SubgraphSpec<V>) -> BigUint {
        let mgr = ZddManager::new();
        let f = compile_subgraphs(&mgr, spec).unwrap();
        mgr.count(f)
    }

    #[test]
    fn test_unconstrained_cycle() {
        assert_eq!(count(&cycle()), BigUint::from(16u32));
    }

    #[test]
    fn test_edge_count() {
        assert_eq!(count(&cycle().num_edges(Range::exactly(2))), BigUint::from(6u32));
        assert_eq!(count(&cycle().num_edges(Range::new(0, 4, 2).unwrap())), BigUint::from(8u32));
    }

    #[test]
    fn test_spanning_trees_of_cycle() {
        let mgr = ZddManager::new();
        let spec = cycle().no_loop(true).num_comps(1);
        let f = compile_subgraphs(&mgr, &spec).unwrap();
        assert_eq!(mgr.count(f), BigUint::from(4u32));
        // Every spanning path drops exactly one edge
        assert_eq!(mgr.same_size(f, 3), f);
        assert!(mgr.contains(f, &[1, 2, 3]));
        assert!(!mgr.contains(f, &[1, 2, 3, 4]));
    }

    #[test]
    fn test_forests_of_cycle() {
        // Every proper subset of the cycle is a forest
        assert_eq!(count(&cycle().no_loop(true)), BigUint::from(15u32));
    }

    #[test]
    fn test_component_count_includes_isolated_vertices() {
        // 1 edge subset with 4 components (∅), 4 with 3, 6 with 2, 4+1 with 1
        assert_eq!(count(&cycle().num_comps(4)), BigUint::from(1u32));
        assert_eq!(count(&cycle().num_comps(3)), BigUint::from(4u32));
        assert_eq!(count(&cycle().num_comps(2)), BigUint::from(6u32));
        assert_eq!(count(&cycle().num_comps(1)), BigUint::from(5u32));
    }

    #[test]
    fn test_degree_constraints() {
        let spec = ["A", "B", "C", "D"]
            .into_iter()
            .fold(cycle(), |spec, v| spec.degree(v, Range::exactly(2)));
        let mgr = ZddManager::new();
        let f = compile_subgraphs(&mgr, &spec).unwrap();
        assert_eq!(mgr.count(f), BigUint::from(1u32));
        assert!(mgr.contains(f, &[1, 2, 3, 4]));

        // Matchings: every degree at most 1
        let spec = ["A", "B", "C", "D"]
            .into_iter()
            .fold(cycle(), |spec, v| spec.degree(v, Range::at_most(1)));
        assert_eq!(count(&spec), BigUint::from(7u32));
    }

    #[test]
    fn test_vertex_groups() {
        let path = || SubgraphSpec::new([("A", "B"), ("B", "C")]);
        assert_eq!(count(&path().vertex_groups([vec!["A", "C"]])), BigUint::from(1u32));
        assert_eq!(count(&path().vertex_groups([vec!["A"], vec!["C"]])), BigUint::from(3u32));
    }

    #[test]
    fn test_self_loop() {
        let spec = SubgraphSpec::new([(1, 1), (1, 2)]);
        assert_eq!(count(&spec), BigUint::from(4u32));
        assert_eq!(count(&spec.clone().no_loop(true)), BigUint::from(2u32));
        // The loop alone gives vertex 1 degree 2
        assert_eq!(count(&spec.degree(1, Range::exactly(2))), BigUint::from(1u32));
    }

    #[test]
    fn test_empty_graph() {
        let spec: SubgraphSpec<u32> = SubgraphSpec::new([]);
        let mgr = ZddManager::new();
        assert_eq!(compile_subgraphs(&mgr, &spec).unwrap(), ZddId::ONE);
        let spec = spec.num_edges(Range::exactly(1));
        assert_eq!(compile_subgraphs(&mgr, &spec).unwrap(), ZddId::ZERO);
    }

    #[test]
    fn test_config_errors_before_compiling() {
        let mgr = ZddManager::with_universe(Universe::new(3).unwrap());
        assert!(matches!(compile_subgraphs(&mgr, &cycle()), Err(Error::Config(_))));
        assert_eq!(mgr.num_nodes(), 2);

        let mgr = ZddManager::new();
        let spec = cycle().vertex_groups([vec!["X"]]);
        assert!(matches!(compile_subgraphs(&mgr, &spec), Err(Error::Config(_))));
    }
}
