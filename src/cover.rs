use std::time::{Duration, Instant};

use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::atg::Atg;
use crate::error::{CoverError, Result};
use crate::grower::grow;
use crate::order::{common_labels, AnchorPair, Label, OrderSet};
use crate::relation::{is_convex, partial_order_of_convex, PartialOrder};

/// How many leg combinations are tried between deadline checks.
const DEADLINE_STRIDE: usize = 1 << 12;

/// Limits and fan-out shared by every step of one search.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Search {
    deadline: Option<(Instant, Duration)>,
    parallel: bool,
}

impl Search {
    pub(crate) fn new(time_limit: Option<Duration>, parallel: bool) -> Self {
        Self {
            deadline: time_limit.map(|limit| (Instant::now() + limit, limit)),
            parallel,
        }
    }

    fn check(&self) -> Result<()> {
        match self.deadline {
            Some((at, limit)) if Instant::now() >= at => Err(CoverError::DeadlineExceeded(limit)),
            _ => Ok(()),
        }
    }

    /// Map `items` through `f`, on the rayon pool if allowed. Output order always matches input order.
    fn map<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        if self.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

/// A poset cover: legs, each the linear extensions of one poset, whose union is the input.
#[derive(Clone, Debug, Serialize)]
pub struct PosetCover {
    posets: Vec<PartialOrder>,
    cover_relations: Vec<PartialOrder>,
    legs: Vec<OrderSet>,
}

impl PosetCover {
    /// Derive the defining partial order and cover relation of each leg.
    ///
    /// Fails with [`CoverError::InvalidInput`] if a leg is empty or mixes label sets.
    pub fn from_legs(legs: Vec<OrderSet>) -> Result<Self> {
        let mut posets = Vec::with_capacity(legs.len());
        let mut cover_relations = Vec::with_capacity(legs.len());

        for leg in &legs {
            let labels = common_labels(leg)?;
            let poset = partial_order_of_convex(leg)?;
            cover_relations.push(poset.hasse_diagram(&labels).cover_relation());
            posets.push(poset);
        }

        Ok(Self { posets, cover_relations, legs })
    }

    /// The linear extension set of each poset.
    pub fn legs(&self) -> &[OrderSet] {
        &self.legs
    }

    /// The partial order of each leg, as the intersection of its orders' relations.
    pub fn posets(&self) -> &[PartialOrder] {
        &self.posets
    }

    /// The Hasse edges of each poset.
    pub fn cover_relations(&self) -> &[PartialOrder] {
        &self.cover_relations
    }

    /// Number of posets.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Whether there are no posets at all.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Every order of every leg.
    pub fn union(&self) -> OrderSet {
        self.legs.iter().flatten().cloned().collect()
    }

    /// Whether the legs reproduce `upsilon` exactly and each leg is a poset's full set of linear extensions.
    pub fn verify(&self, upsilon: &OrderSet) -> bool {
        self.union() == *upsilon && self.legs.iter().all(|leg| is_convex(leg).unwrap_or(false))
    }
}

/// A smallest set of posets whose linear extensions together are exactly `upsilon`, as their legs.
///
/// Each connected component of the adjacent transposition graph of `upsilon` is minimised on its own and the
/// results are concatenated in component order.
///
/// Fails with [`CoverError::InvalidInput`] if `upsilon` is empty or its orders do not share one label set.
pub fn minimum_poset_cover(upsilon: &OrderSet) -> Result<Vec<OrderSet>> {
    minimum_poset_cover_with(upsilon, &Search::default())
}

/// Search for a cover of `upsilon` by exactly `k` posets, returning their legs, or `None` if the search finds none.
///
/// `upsilon` is expected to be ATG-connected and `k` its minimum cover size. For a `k` above the minimum the result
/// is unspecified: the search may come back empty even though a cover of that size exists.
///
/// Fails with [`CoverError::InvalidInput`] if `k` is zero, `upsilon` is empty, or its orders do not share one
/// label set.
pub fn exact_k_poset_cover(upsilon: &OrderSet, k: usize) -> Result<Option<Vec<OrderSet>>> {
    exact_k_poset_cover_with(upsilon, k, &Search::default())
}

pub(crate) fn minimum_poset_cover_with(upsilon: &OrderSet, search: &Search) -> Result<Vec<OrderSet>> {
    common_labels(upsilon)?;
    let components = Atg::build(upsilon)?.connected_components();
    debug!(event = "decompose", orders = upsilon.len(), components = components.len());

    let covers = search.map(&components, |component| minimum_cover_of_component(component, search))?;
    Ok(covers.into_iter().flatten().collect())
}

fn minimum_cover_of_component(upsilon: &OrderSet, search: &Search) -> Result<Vec<OrderSet>> {
    let n = upsilon.len();

    for k in 1..=n {
        search.check()?;
        debug!(event = "try_k", k, orders = n);

        if k == 1 {
            if is_convex(upsilon)? {
                return Ok(vec![upsilon.clone()]);
            }
        } else if k == n {
            return Ok(upsilon.iter().map(|order| OrderSet::from([order.clone()])).collect());
        } else if let Some(cover) = exact_k_poset_cover_with(upsilon, k, search)? {
            return Ok(cover);
        }
    }

    // only reached for an empty component, which the ATG never produces
    Ok(Vec::new())
}

pub(crate) fn exact_k_poset_cover_with(upsilon: &OrderSet, k: usize, search: &Search) -> Result<Option<Vec<OrderSet>>> {
    if k == 0 {
        return Err(CoverError::InvalidInput("a cover needs at least one poset".to_string()));
    }
    let labels = common_labels(upsilon)?;
    if k == 1 {
        return Ok(is_convex(upsilon)?.then(|| vec![upsilon.clone()]));
    }

    let anchors = Atg::build(upsilon)?.anchor_candidates();
    let groups = anchors.into_iter()
        .combinations(k - 1)
        .filter(|group| !contradicts_itself(group))
        .collect_vec();

    let legs = search.map(&groups, |group| {
        search.check()?;
        Ok(leg_of_anchors(upsilon, group, &labels))
    })?;
    let legs = legs.into_iter().flatten().unique().collect_vec();
    debug!(event = "legs", k, anchor_groups = groups.len(), legs = legs.len());

    for (tried, chosen) in (0..legs.len()).combinations(k).enumerate() {
        if tried % DEADLINE_STRIDE == 0 {
            search.check()?;
        }
        if chosen.iter().map(|i| legs[*i].len()).sum::<usize>() < upsilon.len() {
            continue;
        }
        if chosen.iter().flat_map(|i| &legs[*i]).unique().count() == upsilon.len() {
            return Ok(Some(chosen.into_iter().map(|i| legs[i].clone()).collect()));
        }
    }

    Ok(None)
}

/// A group holding both `(a, b)` and `(b, a)` selects no order.
fn contradicts_itself(group: &[AnchorPair]) -> bool {
    group.iter().tuple_combinations().any(|(p, q)| p.reversed() == *q)
}

/// Grow the orders of `upsilon` satisfying every anchor into a leg, if they form a poset's extensions.
fn leg_of_anchors(upsilon: &OrderSet, anchors: &[AnchorPair], labels: &[Label]) -> Option<OrderSet> {
    let selected: OrderSet = upsilon.iter()
        .filter(|order| anchors.iter().all(|anchor| anchor.holds_in(order)))
        .cloned()
        .collect();
    if selected.is_empty() {
        return None;
    }

    let seed = partial_order_of_convex(&selected).ok()?;
    if seed.linear_extensions(labels) != selected {
        return None;
    }

    Some(grow(upsilon, anchors, &seed))
}
