use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
use serde::{Serialize, Serializer};
use unordered_pair::UnorderedPair;

use crate::error::{CoverError, Result};
use crate::relation::PartialOrder;

/// An element of the ground set being ordered. Conventionally `1..=n`.
pub type Label = u8;

/// A set of linear orders, iterated in lexicographic order.
pub type OrderSet = BTreeSet<LinearOrder>;

/// A total order of distinct labels, e.g. `2134`.
///
/// Equality, ordering and hashing all go by the label sequence.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct LinearOrder(Vec<Label>);

impl LinearOrder {
    /// Build a linear order from `labels`, which must not repeat.
    pub fn new(labels: Vec<Label>) -> Result<Self> {
        if let Some(dupe) = labels.iter().duplicates().next() {
            return Err(CoverError::InvalidInput(format!("label {dupe} appears twice in {labels:?}")));
        }
        Ok(Self(labels))
    }

    /// Wrap labels already known to be distinct, such as a topological sort.
    pub(crate) fn from_distinct(labels: Vec<Label>) -> Self {
        Self(labels)
    }

    /// The order `1 2 ... n`.
    pub fn identity(n: Label) -> Self {
        Self((1..=n).collect())
    }

    /// The labels in the order they appear.
    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    /// The labels in ascending order.
    pub fn label_set(&self) -> Vec<Label> {
        self.0.iter().copied().sorted_unstable().collect()
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of `label`, if present.
    pub fn position(&self, label: Label) -> Option<usize> {
        self.0.iter().position(|l| *l == label)
    }

    /// Every pair `(self[i], self[j])` with `i < j`.
    pub fn relation(&self) -> PartialOrder {
        self.0.iter()
            .tuple_combinations()
            .map(|(a, b)| (*a, *b))
            .collect()
    }

    /// Whether `x` occurs anywhere before `y`. False if either is missing.
    pub fn is_before(&self, x: Label, y: Label) -> bool {
        match (self.position(x), self.position(y)) {
            (Some(i), Some(j)) => i < j,
            _ => false,
        }
    }

    /// Whether `y` sits directly after `x`.
    pub fn is_immediately_before(&self, x: Label, y: Label) -> bool {
        self.position(x).is_some_and(|i| self.0.get(i + 1) == Some(&y))
    }

    /// Transpose `x` and the `y` immediately following it.
    ///
    /// Fails with [`CoverError::PreconditionViolation`] unless `y` directly follows `x`.
    pub fn swap_adjacent(&self, x: Label, y: Label) -> Result<Self> {
        match self.position(x) {
            Some(i) if self.0.get(i + 1) == Some(&y) => {
                let mut swapped = self.0.clone();
                swapped.swap(i, i + 1);
                Ok(Self(swapped))
            }
            _ => Err(CoverError::PreconditionViolation(format!("{y} does not immediately succeed {x} in {self}"))),
        }
    }

    /// The unordered pair of labels transposed between `self` and `other`, if the two differ by exactly one
    /// adjacent transposition.
    ///
    /// Fails with [`CoverError::InvalidInput`] if the lengths differ.
    pub fn adjacent_swap(&self, other: &Self) -> Result<Option<UnorderedPair<Label>>> {
        if self.len() != other.len() {
            return Err(CoverError::InvalidInput(format!("linear orders must have equal lengths, got {self} and {other}")));
        }

        let diff = (0..self.len())
            .filter(|i| self.0[*i] != other.0[*i])
            .collect_vec();

        Ok(match diff.as_slice() {
            [i, j] if *j == i + 1 && self.0[*i] == other.0[*j] && self.0[*j] == other.0[*i] => {
                Some(UnorderedPair::from((self.0[*i], self.0[*j])))
            }
            _ => None,
        })
    }
}

impl Display for LinearOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // single digits print bare, like the input format; anything wider needs a separator
        if self.0.iter().all(|l| *l < 10) {
            self.0.iter().try_for_each(|l| write!(f, "{l}"))
        } else {
            write!(f, "{}", self.0.iter().join(","))
        }
    }
}

impl FromStr for LinearOrder {
    type Err = CoverError;

    /// Parse digits such as `"2134"`, or comma separated labels such as `"2,1,3,4"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let labels = if s.contains(',') {
            s.split(',')
                .map(|part| part.trim().parse::<Label>()
                    .map_err(|_| CoverError::InvalidInput(format!("bad label {part:?} in {s:?}"))))
                .collect::<Result<Vec<_>>>()?
        } else {
            s.chars()
                .map(|c| c.to_digit(10)
                    .map(|d| d as Label)
                    .ok_or_else(|| CoverError::InvalidInput(format!("bad label {c:?} in {s:?}"))))
                .collect::<Result<Vec<_>>>()?
        };

        if labels.is_empty() {
            return Err(CoverError::InvalidInput("empty linear order".to_string()));
        }
        Self::new(labels)
    }
}

impl Serialize for LinearOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An ordered pair `(a, b)` requiring `a` before `b`; the relation a seed poset is grown around.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct AnchorPair(pub Label, pub Label);

impl AnchorPair {
    /// The same pair pointing the other way.
    pub fn reversed(self) -> Self {
        Self(self.1, self.0)
    }

    /// Whether `order` puts `self.0` before `self.1`.
    pub fn holds_in(&self, order: &LinearOrder) -> bool {
        order.is_before(self.0, self.1)
    }
}

impl From<(Label, Label)> for AnchorPair {
    fn from(value: (Label, Label)) -> Self {
        Self(value.0, value.1)
    }
}

impl From<AnchorPair> for (Label, Label) {
    fn from(value: AnchorPair) -> Self {
        (value.0, value.1)
    }
}

impl Display for AnchorPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<{}", self.0, self.1)
    }
}

impl FromStr for AnchorPair {
    type Err = CoverError;

    /// Parse `"a<b"`.
    fn from_str(s: &str) -> Result<Self> {
        let parse = |part: &str| part.trim().parse::<Label>()
            .map_err(|_| CoverError::InvalidInput(format!("bad label {part:?} in relation {s:?}")));

        match s.split_once('<') {
            Some((a, b)) => {
                let pair = Self(parse(a)?, parse(b)?);
                if pair.0 == pair.1 {
                    return Err(CoverError::InvalidInput(format!("relation {s:?} is reflexive")));
                }
                Ok(pair)
            }
            None => Err(CoverError::InvalidInput(format!("expected a relation like 1<2, got {s:?}"))),
        }
    }
}

/// Parse whitespace separated linear orders into a set.
pub fn parse_orders(text: &str) -> Result<OrderSet> {
    text.split_whitespace()
        .map(LinearOrder::from_str)
        .collect()
}

/// The common ascending label set of `orders`.
///
/// Fails with [`CoverError::InvalidInput`] if `orders` is empty, or the orders differ in length or in labels.
pub(crate) fn common_labels<'a>(orders: impl IntoIterator<Item = &'a LinearOrder>) -> Result<Vec<Label>> {
    let mut orders = orders.into_iter();
    let first = orders.next()
        .ok_or_else(|| CoverError::InvalidInput("at least one linear order is required".to_string()))?;
    let labels = first.label_set();

    for order in orders {
        if order.len() != first.len() {
            return Err(CoverError::InvalidInput(format!("linear orders must have equal lengths, got {first} and {order}")));
        }
        if order.label_set() != labels {
            return Err(CoverError::InvalidInput(format!("{first} and {order} order different labels")));
        }
    }

    Ok(labels)
}
