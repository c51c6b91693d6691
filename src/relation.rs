use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::Array2;
use petgraph::algo::dijkstra;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Bfs, Reversed};
use petgraph::Direction;
use serde::Serialize;

use crate::error::{CoverError, Result};
use crate::order::{common_labels, Label, LinearOrder, OrderSet};

/// A set of pairs `(a, b)`, each meaning `a` precedes `b`.
///
/// Callers need not close the relation transitively; [`PartialOrder::hasse_diagram`] and
/// [`PartialOrder::linear_extensions`] work from its closure.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct PartialOrder(BTreeSet<(Label, Label)>);

impl PartialOrder {
    /// The empty relation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `a < b` is in the relation.
    pub fn contains(&self, a: Label, b: Label) -> bool {
        self.0.contains(&(a, b))
    }

    /// Add `a < b`. Returns whether the pair was new.
    pub fn insert(&mut self, a: Label, b: Label) -> bool {
        self.0.insert((a, b))
    }

    /// Drop `a < b`. Returns whether the pair was present.
    pub fn remove(&mut self, a: Label, b: Label) -> bool {
        self.0.remove(&(a, b))
    }

    /// The pairs in ascending order.
    pub fn pairs(&self) -> impl Iterator<Item = (Label, Label)> + '_ {
        self.0.iter().copied()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The pairs present in both `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    fn graph(&self, labels: &[Label]) -> DiGraphMap<Label, ()> {
        let mut graph = DiGraphMap::with_capacity(labels.len(), self.len());
        for label in labels {
            graph.add_node(*label);
        }
        for (a, b) in self.pairs() {
            graph.add_edge(a, b, ());
        }
        graph
    }

    /// All total orders of `labels` (and any label mentioned by the relation) consistent with `self`.
    ///
    /// This is an exhaustive enumeration of topological orderings, exponential in the number of
    /// incomparable labels; it is only meant for the handful of labels a permutation problem can afford.
    /// A cyclic or reflexive relation has no extensions.
    pub fn linear_extensions(&self, labels: &[Label]) -> OrderSet {
        let graph = self.graph(labels);

        let mut in_degree: BTreeMap<Label, usize> = graph.nodes()
            .map(|node| (node, graph.neighbors_directed(node, Direction::Incoming).count()))
            .collect();
        let mut prefix = Vec::with_capacity(in_degree.len());
        let mut extensions = OrderSet::new();

        extend_topological(&graph, &mut in_degree, &mut prefix, &mut extensions);
        extensions
    }

    /// Transitive reduction of the closure of `self` over `labels`.
    pub fn hasse_diagram(&self, labels: &[Label]) -> HasseDiagram {
        let nodes = labels.iter().copied()
            .chain(self.pairs().flat_map(|(a, b)| [a, b]))
            .sorted_unstable()
            .dedup()
            .collect_vec();
        let index = |label: Label| nodes.binary_search(&label).ok();

        let n = nodes.len();
        let mut closure = Array2::from_elem((n, n), false);
        for (a, b) in self.pairs() {
            if let (Some(i), Some(j)) = (index(a), index(b)) {
                closure[[i, j]] = true;
            }
        }
        // warshall
        for k in 0..n {
            for i in 0..n {
                if !closure[[i, k]] {
                    continue;
                }
                for j in 0..n {
                    if closure[[k, j]] {
                        closure[[i, j]] = true;
                    }
                }
            }
        }

        let mut graph = DiGraphMap::with_capacity(n, n);
        for node in &nodes {
            graph.add_node(*node);
        }
        for (i, j) in (0..n).cartesian_product(0..n) {
            if i == j || !closure[[i, j]] {
                continue;
            }
            // i -> j is a cover unless some k sits strictly between them
            let shortcut = (0..n).any(|k| k != i && k != j && closure[[i, k]] && closure[[k, j]]);
            if !shortcut {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }

        HasseDiagram { graph }
    }
}

fn extend_topological(graph: &DiGraphMap<Label, ()>, in_degree: &mut BTreeMap<Label, usize>, prefix: &mut Vec<Label>,
                      extensions: &mut OrderSet) {
    if prefix.len() == in_degree.len() {
        extensions.insert(LinearOrder::from_distinct(prefix.clone()));
        return;
    }

    let available = in_degree.iter()
        .filter(|(label, degree)| **degree == 0 && !prefix.contains(*label))
        .map(|(label, _)| *label)
        .collect_vec();

    for label in available {
        for successor in graph.neighbors_directed(label, Direction::Outgoing) {
            if let Some(degree) = in_degree.get_mut(&successor) {
                *degree -= 1;
            }
        }
        prefix.push(label);

        extend_topological(graph, in_degree, prefix, extensions);

        prefix.pop();
        for successor in graph.neighbors_directed(label, Direction::Outgoing) {
            if let Some(degree) = in_degree.get_mut(&successor) {
                *degree += 1;
            }
        }
    }
}

impl FromIterator<(Label, Label)> for PartialOrder {
    fn from_iter<T: IntoIterator<Item = (Label, Label)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for PartialOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pairs().map(|(a, b)| format!("{a}<{b}")).join(" "))
    }
}

/// The cover relation of a poset as a DAG: an edge `x -> y` means `y` covers `x`.
#[derive(Clone, Debug)]
pub struct HasseDiagram {
    graph: DiGraphMap<Label, ()>,
}

impl HasseDiagram {
    /// Labels reachable backwards from `node`, excluding `node`.
    pub fn ancestors(&self, node: Label) -> BTreeSet<Label> {
        if !self.graph.contains_node(node) {
            return BTreeSet::new();
        }
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, node);
        let mut found = BTreeSet::new();
        while let Some(next) = bfs.next(reversed) {
            found.insert(next);
        }
        found.remove(&node);
        found
    }

    /// Labels reachable forwards from `node`, excluding `node`.
    pub fn descendants(&self, node: Label) -> BTreeSet<Label> {
        if !self.graph.contains_node(node) {
            return BTreeSet::new();
        }
        let mut bfs = Bfs::new(&self.graph, node);
        let mut found = BTreeSet::new();
        while let Some(next) = bfs.next(&self.graph) {
            found.insert(next);
        }
        found.remove(&node);
        found
    }

    /// Shortest path length between `x` and `y` in whichever direction connects them.
    ///
    /// `None` stands for infinity: neither label reaches the other.
    pub fn distance(&self, x: Label, y: Label) -> Option<usize> {
        let one_way = |from: Label, to: Label| {
            if !self.graph.contains_node(from) || !self.graph.contains_node(to) {
                return None;
            }
            dijkstra(&self.graph, from, Some(to), |_| 1usize).get(&to).copied()
        };

        match (one_way(x, y), one_way(y, x)) {
            (Some(forward), Some(backward)) => Some(forward.min(backward)),
            (forward, backward) => forward.or(backward),
        }
    }

    /// Whether `y` covers `x`.
    pub fn covers(&self, x: Label, y: Label) -> bool {
        self.graph.contains_edge(x, y)
    }

    /// The cover relation itself.
    pub fn cover_relation(&self) -> PartialOrder {
        self.graph.all_edges().map(|(a, b, _)| (a, b)).collect()
    }
}

/// The intersection of the full relations of `orders`: the partial order of the smallest convex set containing them.
///
/// Fails with [`CoverError::InvalidInput`] if `orders` is empty.
pub fn partial_order_of_convex<'a>(orders: impl IntoIterator<Item = &'a LinearOrder>) -> Result<PartialOrder> {
    orders.into_iter()
        .map(LinearOrder::relation)
        .reduce(|acc, relation| acc.intersection(&relation))
        .ok_or_else(|| CoverError::InvalidInput("cannot take the convex closure of no linear orders".to_string()))
}

/// The smallest convex set of linear orders containing `orders`.
///
/// Fails with [`CoverError::InvalidInput`] if `orders` is empty or the orders do not share one label set.
pub fn generate_convex(orders: &OrderSet) -> Result<OrderSet> {
    let labels = common_labels(orders)?;
    Ok(partial_order_of_convex(orders)?.linear_extensions(&labels))
}

/// Whether `orders` is exactly the set of linear extensions of some poset.
pub fn is_convex(orders: &OrderSet) -> Result<bool> {
    Ok(generate_convex(orders)? == *orders)
}

/// [`generate_convex`] for callers that already know the labels; empty input gives an empty set.
pub(crate) fn convex_hull<'a>(orders: impl IntoIterator<Item = &'a LinearOrder>, labels: &[Label]) -> OrderSet {
    match partial_order_of_convex(orders) {
        Ok(relation) => relation.linear_extensions(labels),
        Err(_) => OrderSet::new(),
    }
}
