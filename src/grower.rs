use std::collections::{BTreeSet, VecDeque};

use itertools::Itertools;
use tracing::trace;

use crate::order::{AnchorPair, Label, OrderSet};
use crate::relation::{convex_hull, HasseDiagram, PartialOrder};

/// A relation the grower may try to drop, with its Hasse distance.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    pair: (Label, Label),
    distance: usize,
}

/// Relax `seed` around `anchors` until its linear extensions are maximal inside `domain`, and return them.
///
/// Requires every anchor to be in `seed` and every extension of `seed` to be in `domain`.
///
/// Candidates are the pairs `(x, y)` bracketing an anchor `(a, b)` in the seed's Hasse diagram, i.e.
/// `x` at or above `a` and `y` at or below `b`, visited nearest first. Dropping `(x, y)` lets every covered order
/// holding `x` directly before `y` flip the two; the step is taken only if every such flip lands on an uncovered
/// order of `domain` and the hull of the grown set stays inside `domain`. A rejected pair blacklists every pair
/// strictly bracketing it. Visiting stops once a whole distance layer passes without reaching the next one.
///
/// Never fails: at worst this returns the seed's own extensions.
pub fn grow(domain: &OrderSet, anchors: &[AnchorPair], seed: &PartialOrder) -> OrderSet {
    let Some(first) = domain.first() else {
        return OrderSet::new();
    };
    let labels = first.label_set();

    let mut covered = seed.linear_extensions(&labels);
    let mut uncovered: OrderSet = domain.difference(&covered).cloned().collect();
    let hasse = seed.hasse_diagram(&labels);

    let mut relation = seed.clone();
    let mut blacklist: BTreeSet<(Label, Label)> = BTreeSet::new();
    let mut worklist = candidates(&hasse, anchors);
    let mut last_distance: Option<usize> = None;

    while let Some(Candidate { pair: (x, y), distance }) = worklist.pop_front() {
        if blacklist.contains(&(x, y)) {
            continue;
        }
        if last_distance.is_some_and(|last| distance > last.saturating_add(1)) {
            break;
        }
        last_distance = Some(distance);

        let adjacent = covered.iter()
            .filter(|order| order.is_immediately_before(x, y))
            .collect_vec();
        let mirrors: OrderSet = adjacent.iter()
            .filter_map(|order| order.swap_adjacent(x, y).ok())
            .filter(|mirror| uncovered.contains(mirror))
            .collect();

        let grown = if !adjacent.is_empty() && adjacent.len() == mirrors.len() {
            let hull = convex_hull(covered.iter().chain(&mirrors), &labels);
            hull.is_subset(domain).then_some(hull)
        } else {
            None
        };

        match grown {
            Some(hull) => {
                trace!(event = "relax", x, y, distance, added = hull.len() - covered.len());
                relation.remove(x, y);
                uncovered.retain(|order| !hull.contains(order));
                covered = hull;
            }
            None => {
                trace!(event = "reject", x, y, distance);
                let below = hasse.descendants(y).into_iter().collect_vec();
                blacklist.extend(hasse.ancestors(x).into_iter().cartesian_product(below));
            }
        }
    }

    trace!(event = "grown", relation = %relation, size = covered.len());
    covered
}

/// Every pair bracketing an anchor, nearest first, ties in ascending pair order.
fn candidates(hasse: &HasseDiagram, anchors: &[AnchorPair]) -> VecDeque<Candidate> {
    let bracket = |anchor: &AnchorPair| {
        let above = hasse.ancestors(anchor.0).into_iter().chain([anchor.0]).collect_vec();
        let below = hasse.descendants(anchor.1).into_iter().chain([anchor.1]).collect_vec();
        above.into_iter().cartesian_product(below)
    };

    anchors.iter()
        .flat_map(bracket)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|(x, y)| Candidate {
            pair: (x, y),
            distance: hasse.distance(x, y).unwrap_or(usize::MAX),
        })
        .sorted_by_key(|candidate| candidate.distance)
        .collect()
}
