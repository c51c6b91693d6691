#![warn(missing_docs)]

//! # `posetcover`
//!
//! A solver for the minimum poset cover problem: given a set Υ of linear orders of the same labels, find the fewest
//! posets whose linear extensions, taken together, are exactly Υ.
//! Parse the orders (see [`parse_orders`] or [`LinearOrder`]'s [`FromStr`](std::str::FromStr)), then call
//! [`minimum_poset_cover`] for the bare search, or build a [`Solver`] from a [`SolverConfig`] to get a
//! [`PosetCover`] with label and time limits and parallel search.
//!
//! # Internals
//! Two linear orders are adjacent when they differ by one adjacent transposition; the resulting graph (the
//! adjacent transposition graph, or ATG) is a subgraph of the permutohedron. The linear extensions of a poset always
//! form a connected subgraph, so every connected component of Υ's ATG is covered on its own.
//!
//! For a component, try `k = 1, 2, ...`:
//! 1. `k = 1` succeeds iff the component is convex, i.e. equal to the linear extensions of the intersection of its
//! orders' relations.
//! 2. Otherwise every group of `k - 1` anchors, each an ordered pair of labels swapped along some ATG edge, selects
//! the orders obeying it. When those orders are themselves a poset's extensions, that poset is relaxed greedily
//! around the anchors (see [`grow`]) into a maximal "leg" still inside Υ.
//! 3. The first `k` legs whose union is the whole component form the cover. Once `k` reaches the component size, one
//! singleton leg per order always works, so the search terminates.
//!
//! Everything is exhaustive over small inputs: linear extension enumeration is factorial in the number of labels,
//! which is why [`Solver`] rejects inputs wider than [`SolverConfig::max_labels`].

pub use atg::Atg;
pub use config::{ConfigError, SolverConfig};
pub use cover::{exact_k_poset_cover, minimum_poset_cover, PosetCover};
pub use error::{CoverError, Result};
pub use grower::grow;
pub use order::{parse_orders, AnchorPair, Label, LinearOrder, OrderSet};
pub use relation::{generate_convex, is_convex, partial_order_of_convex, HasseDiagram, PartialOrder};
pub use solver::Solver;

pub mod atg;
pub mod config;
pub(crate) mod cover;
pub(crate) mod error;
pub(crate) mod grower;
pub(crate) mod order;
pub mod relation;
pub(crate) mod solver;
mod tests;
