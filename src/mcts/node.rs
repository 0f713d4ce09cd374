//! MCTS node types for tree storage.
//!
//! Nodes live in an arena and refer to each other by index: a parent owns
//! its children through `children`, and `parent` is a plain back-index used
//! only when propagating results upward.

use serde::{Deserialize, Serialize};

use crate::board::Move;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the MCTS tree: one position, reached by `mv` from its parent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Back-index to the parent (None for the root)
    pub parent: Option<NodeId>,

    /// Move that led here from the parent (None for the root)
    pub mv: Option<Move>,

    /// Number of simulations that went through this node
    pub visits: u32,

    /// Sum of simulation outcomes, scored for the side to move at this node
    /// (1 win, 0.5 tie, 0 loss)
    pub value: f64,

    /// Distance from the root
    pub depth: u32,

    /// Children: (move, node_id) pairs in move generation order
    pub children: Vec<(Move, NodeId)>,
}

impl Node {
    pub fn root() -> Self {
        Self {
            parent: None,
            mv: None,
            visits: 0,
            value: 0.0,
            depth: 0,
            children: Vec::new(),
        }
    }

    pub fn child(parent: NodeId, mv: Move, depth: u32) -> Self {
        Self {
            parent: Some(parent),
            mv: Some(mv),
            visits: 0,
            value: 0.0,
            depth,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Mean outcome for the side to move here, 0 if never visited
    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value / self.visits as f64
        }
    }

    /// UCB1 score of this node as seen by the player choosing it.
    ///
    /// The chooser is the parent's side to move, so its accumulated reward
    /// here is `visits - value`:
    ///
    /// ```text
    /// (visits - value) / (visits + 1) + sqrt(c · ln(N) / (visits + 1))
    /// ```
    pub fn ucb1(&self, total_simulations: u64, exploration: f64) -> f64 {
        let n = self.visits as f64 + 1.0;
        let exploit = (self.visits as f64 - self.value) / n;
        let ln_total = (total_simulations.max(1) as f64).ln();
        exploit + (exploration * ln_total / n).sqrt()
    }
}
