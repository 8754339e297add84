//! Per-document pattern counts
//!
//! Every internal node of every tree is offered to both patterns in
//! pre-order. A node that already took part in a match of a pattern, as
//! trigger or as a supporting node, cannot trigger that pattern again, so
//! overlapping occurrences are counted once. The two patterns keep separate
//! participant sets and may overlap each other freely.

use crate::shape::{Match, Pattern};
use crate::tree::{Forest, NodeId};
use rustc_hash::FxHashSet;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use tracing::debug;

/// Match counts for one document, or summed over many
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub partially_independent: usize,
    pub fully_embedded: usize,
}

impl Statistics {
    /// Count both patterns over a forest
    pub fn of(forest: &Forest) -> Self {
        Self::of_with(forest, |_| {})
    }

    /// Count both patterns, handing each confirmed match to `on_match`
    pub fn of_with(forest: &Forest, mut on_match: impl FnMut(&Match)) -> Self {
        let mut census = Census::default();

        for idx in forest.iter_preorder() {
            let node = forest.node(idx);
            if node.is_leaf() {
                continue;
            }

            for (pattern, tally) in Pattern::ALL.into_iter().zip(census.tallies.iter_mut()) {
                if tally.seen.contains(&node.id) {
                    continue;
                }
                if let Some(m) = pattern.find(forest, idx) {
                    debug!(
                        target: "rsdstats::matches",
                        pattern = %m.pattern,
                        shape = m.shape,
                        participants = ?m.participants,
                        "match"
                    );
                    tally.record(&m);
                    on_match(&m);
                }
            }
        }

        census.statistics()
    }

    pub fn count(&self, pattern: Pattern) -> usize {
        match pattern {
            Pattern::PartiallyIndependent => self.partially_independent,
            Pattern::FullyEmbedded => self.fully_embedded,
        }
    }
}

impl Add for Statistics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            partially_independent: self.partially_independent + rhs.partially_independent,
            fully_embedded: self.fully_embedded + rhs.fully_embedded,
        }
    }
}

impl AddAssign for Statistics {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Statistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Traversal state for one forest, one tally per entry of `Pattern::ALL`
#[derive(Default)]
struct Census {
    tallies: [Tally; 2],
}

impl Census {
    fn statistics(&self) -> Statistics {
        let [pis, fes] = &self.tallies;
        Statistics {
            partially_independent: pis.count,
            fully_embedded: fes.count,
        }
    }
}

#[derive(Default)]
struct Tally {
    count: usize,
    seen: FxHashSet<NodeId>,
}

impl Tally {
    fn record(&mut self, m: &Match) {
        self.count += 1;
        self.seen.extend(m.participants.iter().copied());
    }
}
