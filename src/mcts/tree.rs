//! Arena-allocated MCTS tree.
//!
//! The tree keeps the statistics of every explored line from its root
//! position, along with the number of simulations run so far (the `N` of
//! UCB1) and the Zobrist hash of the root so a caller can tell whether the
//! tree still describes the position it is about to search.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::Move;
use crate::error::Result;

use super::node::{Node, NodeId};

/// Arena-allocated MCTS tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
    simulations: u64,
    root_hash: u64,
}

/// Statistics of one root move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveStats {
    pub mv: Move,
    pub visits: u32,
    /// Mean outcome for the opponent after this move
    pub opponent_value: f64,
}

impl Tree {
    /// Create a new tree with an empty root for the position hashed `root_hash`.
    pub fn new(root_hash: u64) -> Self {
        Self {
            nodes: vec![Node::root()],
            simulations: 0,
            root_hash,
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &Node {
        self.get(NodeId::ROOT)
    }

    #[inline]
    pub fn root_hash(&self) -> u64 {
        self.root_hash
    }

    /// Simulations run since the tree was created
    #[inline]
    pub fn simulations(&self) -> u64 {
        self.simulations
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child reached by `mv` and return its ID
    pub fn add_child(&mut self, parent: NodeId, mv: Move) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.get(parent).depth + 1;
        self.nodes.push(Node::child(parent, mv, depth));
        self.get_mut(parent).children.push((mv, id));
        id
    }

    /// Child of `id` reached by `mv`, if it was expanded
    pub fn child(&self, id: NodeId, mv: Move) -> Option<NodeId> {
        self.get(id)
            .children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|&(_, child)| child)
    }

    /// Child of `id` with the highest UCB1 score (first one on ties).
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child) in &self.get(id).children {
            let score = self.get(child).ucb1(self.simulations, exploration);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((child, score));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Record one simulation whose outcome for the side to move at `leaf`
    /// is `outcome`. Every ancestor sees the complement of its child's
    /// outcome.
    pub fn backpropagate(&mut self, leaf: NodeId, outcome: f64) {
        let mut current = Some(leaf);
        let mut reward = outcome;
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            node.value += reward;
            reward = 1.0 - reward;
            current = node.parent;
        }
        self.simulations += 1;
    }

    /// Statistics of every root move, in generation order
    pub fn root_stats(&self) -> Vec<MoveStats> {
        self.root()
            .children
            .iter()
            .map(|&(mv, id)| {
                let node = self.get(id);
                MoveStats {
                    mv,
                    visits: node.visits,
                    opponent_value: node.mean_value(),
                }
            })
            .collect()
    }

    /// The move to play from the root.
    ///
    /// Among visited children, the one whose mean outcome for the opponent
    /// is lowest; ties go to the more visited child, then to the earlier
    /// one. Falls back to the first child when none was visited.
    ///
    /// This compares means rather than the accumulated opponent value: a
    /// raw sum is smallest for the least visited child, so it would pick
    /// barely sampled moves.
    pub fn best_move(&self) -> Option<Move> {
        let stats = self.root_stats();
        let mut best: Option<MoveStats> = None;
        for s in stats.iter().filter(|s| s.visits > 0) {
            let better = match best {
                None => true,
                Some(b) => {
                    s.opponent_value < b.opponent_value
                        || (s.opponent_value == b.opponent_value && s.visits > b.visits)
                }
            };
            if better {
                best = Some(*s);
            }
        }
        best.or_else(|| stats.first().copied()).map(|s| s.mv)
    }

    /// Re-root the tree at the child reached by `mv`, creating it if it was
    /// never expanded, and drop every other branch.
    ///
    /// The kept subtree is copied into a fresh arena so memory held by
    /// discarded branches is released. The simulation counter carries over.
    pub fn advance_root(&mut self, mv: Move, new_hash: u64) {
        let child = match self.child(NodeId::ROOT, mv) {
            Some(child) => child,
            None => self.add_child(NodeId::ROOT, mv),
        };

        let base_depth = self.get(child).depth;
        let mut nodes = Vec::new();
        // (old id, new parent)
        let mut queue = std::collections::VecDeque::from([(child, None::<NodeId>)]);

        while let Some((old, parent)) = queue.pop_front() {
            let new_id = NodeId(nodes.len());
            let source = &self.nodes[old.0];
            nodes.push(Node {
                parent,
                mv: if parent.is_some() { source.mv } else { None },
                visits: source.visits,
                value: source.value,
                depth: source.depth - base_depth,
                children: Vec::with_capacity(source.children.len()),
            });
            if let Some(p) = parent {
                let mv = source.mv.unwrap_or(mv);
                nodes[p.0].children.push((mv, new_id));
            }
            for &(_, grandchild) in &source.children {
                queue.push_back((grandchild, Some(new_id)));
            }
        }

        self.nodes = nodes;
        self.root_hash = new_hash;
    }

    /// Write the tree as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a tree written by [`Tree::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Stone;

    fn mv(row: u8, col: u8) -> Move {
        Move::place(Stone::Black, row, col)
    }

    #[test]
    fn test_tree_creation() {
        let tree = Tree::new(7);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_hash(), 7);
        assert_eq!(tree.simulations(), 0);
        assert_eq!(tree.best_move(), None);
    }

    #[test]
    fn test_add_child() {
        let mut tree = Tree::new(0);
        let id = tree.add_child(NodeId::ROOT, mv(2, 3));

        assert_eq!(id.index(), 1);
        assert_eq!(tree.get(id).parent, Some(NodeId::ROOT));
        assert_eq!(tree.get(id).depth, 1);
        assert_eq!(tree.child(NodeId::ROOT, mv(2, 3)), Some(id));
        assert_eq!(tree.child(NodeId::ROOT, mv(3, 2)), None);
    }

    #[test]
    fn test_backpropagate_alternates() {
        let mut tree = Tree::new(0);
        let a = tree.add_child(NodeId::ROOT, mv(2, 3));
        let b = tree.add_child(a, Move::place(Stone::White, 2, 2));

        tree.backpropagate(b, 1.0);
        assert_eq!(tree.get(b).value, 1.0);
        assert_eq!(tree.get(a).value, 0.0);
        assert_eq!(tree.root().value, 1.0);
        assert_eq!(tree.root().visits, 1);
        assert_eq!(tree.simulations(), 1);

        tree.backpropagate(a, 0.5);
        assert_eq!(tree.get(a).value, 0.5);
        assert_eq!(tree.get(a).visits, 2);
        assert_eq!(tree.root().value, 1.5);
    }

    #[test]
    fn test_best_move_minimises_opponent_value() {
        let mut tree = Tree::new(0);
        let a = tree.add_child(NodeId::ROOT, mv(2, 3));
        let b = tree.add_child(NodeId::ROOT, mv(3, 2));
        let c = tree.add_child(NodeId::ROOT, mv(4, 5));

        // Opponent wins after a, loses after b
        tree.backpropagate(a, 1.0);
        tree.backpropagate(b, 0.0);
        tree.backpropagate(b, 0.0);
        let _ = c;

        assert_eq!(tree.best_move(), Some(mv(3, 2)));
    }

    #[test]
    fn test_best_move_tie_prefers_visits() {
        let mut tree = Tree::new(0);
        let a = tree.add_child(NodeId::ROOT, mv(2, 3));
        let b = tree.add_child(NodeId::ROOT, mv(3, 2));
        tree.backpropagate(a, 0.0);
        tree.backpropagate(b, 0.0);
        tree.backpropagate(b, 0.0);

        assert_eq!(tree.best_move(), Some(mv(3, 2)));
    }

    #[test]
    fn test_best_move_uses_mean_not_sum() {
        let mut tree = Tree::new(0);
        let a = tree.add_child(NodeId::ROOT, mv(2, 3));
        let b = tree.add_child(NodeId::ROOT, mv(3, 2));
        // a: sum 0.5 over 1 visit; b: sum 1.0 over 4 visits
        tree.backpropagate(a, 0.5);
        tree.backpropagate(b, 1.0);
        for _ in 0..3 {
            tree.backpropagate(b, 0.0);
        }

        assert_eq!(tree.best_move(), Some(mv(3, 2)));
    }

    #[test]
    fn test_best_move_unvisited_falls_back_to_first() {
        let mut tree = Tree::new(0);
        tree.add_child(NodeId::ROOT, mv(2, 3));
        tree.add_child(NodeId::ROOT, mv(3, 2));
        assert_eq!(tree.best_move(), Some(mv(2, 3)));
    }

    #[test]
    fn test_select_child_prefers_chooser_wins() {
        let mut tree = Tree::new(0);
        let a = tree.add_child(NodeId::ROOT, mv(2, 3));
        let b = tree.add_child(NodeId::ROOT, mv(3, 2));
        for _ in 0..5 {
            tree.backpropagate(a, 1.0);
            tree.backpropagate(b, 0.0);
        }
        assert_eq!(tree.select_child(NodeId::ROOT, 2.0), Some(b));
    }

    #[test]
    fn test_advance_root_keeps_subtree() {
        let mut tree = Tree::new(1);
        let a = tree.add_child(NodeId::ROOT, mv(2, 3));
        let b = tree.add_child(NodeId::ROOT, mv(3, 2));
        let a1 = tree.add_child(a, Move::place(Stone::White, 2, 2));
        let a2 = tree.add_child(a, Move::place(Stone::White, 2, 4));
        tree.add_child(b, Move::place(Stone::White, 2, 2));
        tree.backpropagate(a1, 1.0);
        tree.backpropagate(a2, 0.0);

        tree.advance_root(mv(2, 3), 99);

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root_hash(), 99);
        assert_eq!(tree.simulations(), 2);
        assert!(tree.root().parent.is_none());
        assert!(tree.root().mv.is_none());
        assert_eq!(tree.root().visits, 2);
        assert_eq!(tree.root().depth, 0);

        let kept = tree.child(NodeId::ROOT, Move::place(Stone::White, 2, 2)).unwrap();
        assert_eq!(tree.get(kept).parent, Some(NodeId::ROOT));
        assert_eq!(tree.get(kept).depth, 1);
        assert_eq!(tree.get(kept).value, 1.0);
    }

    #[test]
    fn test_advance_root_creates_missing_child() {
        let mut tree = Tree::new(1);
        tree.add_child(NodeId::ROOT, mv(2, 3));
        tree.advance_root(mv(5, 4), 2);

        assert_eq!(tree.len(), 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().visits, 0);
    }
}
