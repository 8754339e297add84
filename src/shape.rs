//! Discourse structure patterns
//!
//! Both patterns are local identifier-offset configurations around a
//! trigger node N. Each is written as a list of [`Shape`] templates; a
//! template names the nodes it needs by their position relative to a scan
//! position among N's children (or, for depth-2 shapes, among the children
//! of one of N's children) and the identifier offset from N each must have.
//!
//! Partially-independent structure (PIS):
//!
//! ```text
//! left:   N has children N-3, N-1 (adjacent); N-3's last child is N-2
//! right:  N has children N+1, N+3 (adjacent); N+3's first child is N+2
//! ```
//!
//! Fully-embedded structure (FES):
//!
//! ```text
//! depth-1 left:   N has adjacent children N-2, N-1, N+1
//! depth-1 right:  N has adjacent children N-1, N+1, N+2
//! depth-2 left:   N has child N-2, whose adjacent children are N-3, N-1
//! depth-2 right:  N has child N+2, whose adjacent children are N+1, N+3
//! ```

use crate::tree::{Forest, NodeId};

/// Where a template slot is found, relative to the scan position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locus {
    /// The node `k` places after the scan position
    Child(usize),
    /// First child of `Child(k)`
    FirstGrandchild(usize),
    /// Last child of `Child(k)`
    LastGrandchild(usize),
}

impl Locus {
    /// Resolve to an arena index; `None` when the position doesn't exist
    #[inline]
    fn resolve(self, forest: &Forest, scope: &[usize], pos: usize) -> Option<usize> {
        match self {
            Locus::Child(k) => scope.get(pos + k).copied(),
            Locus::FirstGrandchild(k) => forest.children(*scope.get(pos + k)?).first().copied(),
            Locus::LastGrandchild(k) => forest.children(*scope.get(pos + k)?).last().copied(),
        }
    }
}

/// One fixed local configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub name: &'static str,
    /// Offset of the trigger's child whose children are scanned instead of
    /// the trigger's own
    pub pivot: Option<i64>,
    /// Required identifier offset from the trigger for each slot
    pub slots: &'static [(Locus, i64)],
}

impl Shape {
    /// Participants of the first fit at `trigger`, scanning left to right.
    ///
    /// Participants are the trigger, the pivot if the shape has one, then
    /// the slots in template order.
    pub fn find(&self, forest: &Forest, trigger: usize) -> Option<Vec<NodeId>> {
        let node = forest.node(trigger);
        let base = i64::from(node.id);

        let (scope, pivot) = match self.pivot {
            None => (node.children.as_slice(), None),
            Some(offset) => {
                let pivot = *node
                    .children
                    .iter()
                    .find(|&&child| i64::from(forest.node(child).id) == base + offset)?;
                (forest.children(pivot), Some(forest.node(pivot).id))
            }
        };

        let slots = (0..scope.len()).find_map(|pos| self.matches_at(forest, scope, pos, base))?;

        let mut participants = Vec::with_capacity(2 + slots.len());
        participants.push(node.id);
        participants.extend(pivot);
        participants.extend(slots);
        Some(participants)
    }

    /// Check the slots at one scan position of `scope`.
    ///
    /// Returns the slot identifiers in template order. A slot whose
    /// position falls outside the tree is a mismatch, not an error.
    pub fn matches_at(
        &self,
        forest: &Forest,
        scope: &[usize],
        pos: usize,
        base: i64,
    ) -> Option<Vec<NodeId>> {
        self.slots
            .iter()
            .map(|&(locus, offset)| {
                let id = forest.node(locus.resolve(forest, scope, pos)?).id;
                (i64::from(id) == base + offset).then_some(id)
            })
            .collect()
    }
}

const PIS_SHAPES: [Shape; 2] = [
    Shape {
        name: "left-nested",
        pivot: None,
        slots: &[
            (Locus::Child(0), -3),
            (Locus::Child(1), -1),
            (Locus::LastGrandchild(0), -2),
        ],
    },
    Shape {
        name: "right-nested",
        pivot: None,
        slots: &[
            (Locus::Child(0), 1),
            (Locus::Child(1), 3),
            (Locus::FirstGrandchild(1), 2),
        ],
    },
];

const FES_SHAPES: [Shape; 4] = [
    Shape {
        name: "depth-1 left",
        pivot: None,
        slots: &[(Locus::Child(0), -2), (Locus::Child(1), -1), (Locus::Child(2), 1)],
    },
    Shape {
        name: "depth-1 right",
        pivot: None,
        slots: &[(Locus::Child(0), -1), (Locus::Child(1), 1), (Locus::Child(2), 2)],
    },
    Shape {
        name: "depth-2 left",
        pivot: Some(-2),
        slots: &[(Locus::Child(0), -3), (Locus::Child(1), -1)],
    },
    Shape {
        name: "depth-2 right",
        pivot: Some(2),
        slots: &[(Locus::Child(0), 1), (Locus::Child(1), 3)],
    },
];

/// The structures being counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    PartiallyIndependent,
    FullyEmbedded,
}

impl Pattern {
    pub const ALL: [Pattern; 2] = [Pattern::PartiallyIndependent, Pattern::FullyEmbedded];

    /// Templates in the order they are tried
    pub fn shapes(self) -> &'static [Shape] {
        match self {
            Pattern::PartiallyIndependent => &PIS_SHAPES,
            Pattern::FullyEmbedded => &FES_SHAPES,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pattern::PartiallyIndependent => "partially-independent",
            Pattern::FullyEmbedded => "fully-embedded",
        }
    }

    /// First shape of this pattern that fits at `trigger`
    pub fn find(self, forest: &Forest, trigger: usize) -> Option<Match> {
        self.shapes().iter().find_map(|shape| {
            shape.find(forest, trigger).map(|participants| Match {
                pattern: self,
                shape: shape.name,
                participants,
            })
        })
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A confirmed occurrence of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub pattern: Pattern,
    pub shape: &'static str,
    /// Trigger first, then the supporting nodes
    pub participants: Vec<NodeId>,
}

impl Match {
    pub fn trigger(&self) -> NodeId {
        self.participants[0]
    }
}
