//! # setset-rs: Families of Sets as Zero-Suppressed Decision Diagrams
//!
//! **`setset-rs`** is a manager-centric library for manipulating very large
//! families of sets, represented as **Zero-suppressed Binary Decision Diagrams (ZDDs)**.
//! A family with billions of members often fits in a few thousand nodes, and every
//! set-algebra operation works directly on the compressed form.
//!
//! ## What is a ZDD?
//!
//! A ZDD is a directed acyclic graph with two terminals: ⊥ (the empty family) and
//! ⊤ (the family holding only ∅). Each inner node tests one element: its *hi* edge
//! leads to the members containing the element, its *lo* edge to the rest. Nodes whose
//! *hi* edge points to ⊥ are suppressed, which keeps sparse families small.
//! For a fixed element order the diagram is **canonical**, so equal families share
//! the same root.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: Nodes live in a [`ZddManager`][crate::zdd::ZddManager]
//!   arena with per-element unique tables and a shared operation cache.
//! - **Set Algebra**: union, intersection, difference, join, meet, weak division,
//!   subset/superset filters, minimal/maximal, hitting sets, and complements.
//! - **Exact Counting**: cardinalities are arbitrary-precision [`BigUint`][num_bigint::BigUint]s.
//! - **Enumeration**: sequential, uniformly random, and weight-ordered cursors.
//! - **Graph Compilation**: the frontier method builds families of subgraphs
//!   (paths, trees, forests, matchings, ...) without enumerating them.
//!
//! ## Basic Usage
//!
//! ```rust
//! use setset_rs::family::Family;
//! use setset_rs::zdd::ZddManager;
//!
//! // 1. Initialize the manager
//! let mgr = ZddManager::default();
//!
//! // 2. Build families from explicit members
//! let a = Family::from_sets(&mgr, vec![vec![1, 2], vec![2, 3]]).unwrap();
//! let b = Family::from_sets(&mgr, vec![vec![2, 3], vec![4]]).unwrap();
//!
//! // 3. Combine them
//! let both = a & b;
//! assert_eq!(both.to_string(), "{{2, 3}}");
//!
//! // 4. Query
//! assert_eq!((a | b).len().unwrap(), 3);
//! assert!(both <= a);
//! ```
//!
//! ## Core Components
//!
//! - **[`zdd`]**: The [`ZddManager`][crate::zdd::ZddManager] and node construction.
//! - **[`algebra`]**: Binary and unary operations on families.
//! - **[`family`]**: The [`Family`][crate::family::Family] handle with operator overloading.
//! - **[`iter`]**: Cursors over the members of a family.
//! - **[`io`]**: Text serialization.
//! - **[`frontier`]**: The subgraph compiler, configured through [`graph::SubgraphSpec`].

pub mod algebra;
pub mod cache;
pub mod error;
pub mod family;
pub mod frontier;
pub mod graph;
pub mod io;
pub mod iter;
pub mod node;
pub mod range;
pub mod reference;
pub mod subtable;
pub mod types;
pub mod universe;
pub mod zdd;

pub use crate::error::{Error, Result};
pub use crate::family::Family;
pub use crate::frontier::compile_subgraphs;
pub use crate::graph::SubgraphSpec;
pub use crate::iter::Cursor;
pub use crate::range::Range;
pub use crate::reference::ZddId;
pub use crate::types::Elem;
pub use crate::universe::Universe;
pub use crate::zdd::ZddManager;
