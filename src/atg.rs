use std::cmp::{max, min};
use std::collections::BTreeSet;

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use unordered_pair::UnorderedPair;

use crate::error::Result;
use crate::order::{AnchorPair, Label, LinearOrder, OrderSet};

/// The adjacent transposition graph over a set of linear orders.
///
/// Nodes are indices into [`Atg::orders`]; an edge joins two orders that differ by one adjacent transposition and
/// carries the unordered pair of labels swapped. The linear extensions of any poset form a connected subgraph, so
/// the components of this graph can be covered independently.
pub struct Atg {
    orders: Vec<LinearOrder>,
    graph: UnGraphMap<usize, UnorderedPair<Label>>,
}

impl Atg {
    /// Build the graph over `orders`, ignoring repeats.
    ///
    /// Fails with [`CoverError::InvalidInput`](crate::CoverError::InvalidInput) if two orders differ in length.
    pub fn build<'a>(orders: impl IntoIterator<Item = &'a LinearOrder>) -> Result<Self> {
        let orders = orders.into_iter().cloned().sorted().dedup().collect_vec();

        let mut graph = UnGraphMap::with_capacity(orders.len(), orders.len());
        for index in 0..orders.len() {
            graph.add_node(index);
        }

        for (i, j) in (0..orders.len()).tuple_combinations() {
            if let Some(swapped) = orders[i].adjacent_swap(&orders[j])? {
                graph.add_edge(i, j, swapped);
            }
        }

        Ok(Self { orders, graph })
    }

    /// The orders in ascending order; node `i` is `orders()[i]`.
    pub fn orders(&self) -> &[LinearOrder] {
        &self.orders
    }

    /// Number of adjacent pairs.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The labels swapped along the edge between `a` and `b`, if both are nodes and adjacent.
    pub fn edge_label(&self, a: &LinearOrder, b: &LinearOrder) -> Option<UnorderedPair<Label>> {
        let a = self.orders.binary_search(a).ok()?;
        let b = self.orders.binary_search(b).ok()?;
        self.graph.edge_weight(a, b).copied()
    }

    /// Every edge as its two endpoints and the labels swapped between them.
    pub fn edges(&self) -> impl Iterator<Item = (&LinearOrder, &LinearOrder, UnorderedPair<Label>)> + '_ {
        self.graph.all_edges()
            .map(|(a, b, swapped)| (&self.orders[a], &self.orders[b], *swapped))
    }

    /// The orders of each connected component, components listed by their smallest order.
    pub fn connected_components(&self) -> Vec<OrderSet> {
        let mut seen = vec![false; self.orders.len()];
        let mut components = Vec::new();

        for start in 0..self.orders.len() {
            if seen[start] {
                continue;
            }
            let mut component = OrderSet::new();
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(node) = bfs.next(&self.graph) {
                seen[node] = true;
                component.insert(self.orders[node].clone());
            }
            components.push(component);
        }

        components
    }

    /// Both directions of every swapped pair, ascending and without repeats.
    pub fn anchor_candidates(&self) -> Vec<AnchorPair> {
        self.graph.all_edges()
            .flat_map(|(_, _, swapped)| {
                let pair = AnchorPair(min(swapped.0, swapped.1), max(swapped.0, swapped.1));
                [pair, pair.reversed()]
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
