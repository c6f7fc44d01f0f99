//! Monte Carlo Tree Search (MCTS) with UCB1 selection.
//!
//! This module implements MCTS with:
//! - An arena-allocated search tree addressed by [`NodeId`] handles
//! - UCB1 child selection, with unvisited children always tried first
//! - Random rollouts on the lightweight grid for value estimation
//! - Backpropagation that credits each node from the perspective of the
//!   side to move at that node
//!
//! Each playout is one indivisible unit of work: tree policy, rollout, and
//! backup. Stop conditions (cancellation, deadline, playout budget) are only
//! checked between playouts, so a cancellation takes effect after at most one
//! more playout.
//!
//! Note on expansion: when the tree policy reaches a childless node it
//! expands that node and returns *the node itself* as the rollout source,
//! not one of the new children. The first rollout after an expansion is
//! therefore spent on a position that has already been visited. This departs
//! from textbook MCTS and is kept as is.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::evaluation::Evaluator;
use crate::movegen::MoveGenerator;
use crate::playout::{RolloutScore, rollout};
use crate::position::{Move, Position};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the search tree: one visited position.
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent handle (NONE for root). Only used to walk upward during backup.
    pub parent: NodeId,
    /// One child per legal move, created all at once on expansion.
    pub children: Vec<NodeId>,
    /// Move from the parent's position (NONE for root).
    pub mv: Move,
    /// Playouts whose path passed through this node.
    pub visits: u32,
    /// Sum of rollout scores seen by the side to move at this node.
    pub value: i64,
    /// Owned snapshot of the position.
    pub position: Position,
}

impl Node {
    fn new(parent: NodeId, mv: Move, position: Position) -> Self {
        Self {
            parent,
            children: Vec::new(),
            mv,
            visits: 0,
            value: 0,
            position,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Mean score, 0 for an unvisited node.
    #[inline]
    pub fn mean_value(&self) -> i32 {
        if self.visits == 0 {
            0
        } else {
            (self.value / self.visits as i64) as i32
        }
    }
}

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<Node>,
}

impl SearchTree {
    /// Create a tree holding only the root.
    pub fn new(root: Position) -> Self {
        Self {
            nodes: vec![Node::new(NodeId::NONE, Move::NONE, root)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Give `parent` one child per move, each holding its own copy of the
    /// resulting position.
    pub fn expand(&mut self, parent: NodeId, moves: &[Move]) {
        debug_assert!(self.get(parent).is_leaf(), "node expanded twice");
        let mut children = Vec::with_capacity(moves.len());
        for &mv in moves {
            let mut position = self.get(parent).position.clone();
            position.apply_move(mv);
            children.push(self.allocate(Node::new(parent, mv, position)));
        }
        self.get_mut(parent).children = children;
    }

    /// Select a child by UCB1.
    ///
    /// The first unvisited child wins outright. Otherwise the child with the
    /// highest `value/visits + c * sqrt(ln(parent visits) / visits)` is
    /// chosen, ties going to the earlier child. Returns `None` for a leaf.
    pub fn best_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(id);
        let ln_parent = (node.visits as f64).ln();

        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for &child_id in &node.children {
            let child = self.get(child_id);
            if child.visits == 0 {
                return Some(child_id);
            }

            let visits = child.visits as f64;
            let mut score = child.value as f64 / visits;
            if exploration > 0.0 {
                score += exploration * (ln_parent / visits).sqrt();
            }
            if score > best_score {
                best = Some(child_id);
                best_score = score;
            }
        }
        best
    }

    /// Credit `score` to `leaf` and every ancestor up to the root.
    pub fn backup(&mut self, leaf: NodeId, score: RolloutScore) {
        let mut id = leaf;
        while id.is_some() {
            let node = self.get_mut(id);
            node.visits += 1;
            node.value += score.for_side(node.position.side_to_move()) as i64;
            id = node.parent;
        }
    }

    /// Handles from the root down to `id`.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cur = id;
        while cur.is_some() {
            path.push(cur);
            cur = self.get(cur).parent;
        }
        path.reverse();
        path
    }
}

/// Timing and size figures for a finished search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchDiagnostics {
    /// Completed playouts.
    pub playouts: u32,
    /// Nodes allocated in the tree.
    pub tree_size: usize,
    /// Wall-clock time spent searching.
    pub elapsed: Duration,
}

/// Result of one search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Chosen move, or [`Move::NONE`] when nothing could be chosen.
    pub best_move: Move,
    /// Mean score of the chosen child, from the perspective of the side to
    /// move after the chosen move.
    pub eval: i32,
    pub diagnostics: SearchDiagnostics,
}

/// Drives playouts over one [`SearchTree`].
pub struct SearchEngine<'a, M: MoveGenerator + ?Sized, E: Evaluator + ?Sized> {
    tree: SearchTree,
    config: &'a SearchConfig,
    movegen: &'a M,
    evaluator: &'a E,
    rng: fastrand::Rng,
    playouts: u32,
    trace: Option<Vec<NodeId>>,
    /// Root moves generated by `run`, consumed by the root's expansion.
    root_moves: Option<Vec<Move>>,
}

impl<'a, M, E> SearchEngine<'a, M, E>
where
    M: MoveGenerator + ?Sized,
    E: Evaluator + ?Sized,
{
    pub fn new(
        root: Position,
        config: &'a SearchConfig,
        movegen: &'a M,
        evaluator: &'a E,
        rng: fastrand::Rng,
    ) -> Self {
        Self {
            tree: SearchTree::new(root),
            config,
            movegen,
            evaluator,
            rng,
            playouts: 0,
            trace: None,
            root_moves: None,
        }
    }

    /// Record the node each playout simulates from.
    pub fn record_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    /// Simulated nodes in playout order, when recording.
    pub fn trace(&self) -> Option<&[NodeId]> {
        self.trace.as_deref()
    }

    #[inline]
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    #[inline]
    pub fn playouts(&self) -> u32 {
        self.playouts
    }

    /// Descend by UCB1 to a leaf, expand it, and return that leaf.
    pub fn tree_policy(&mut self) -> NodeId {
        let mut id = self.tree.root();
        while let Some(child) = self.tree.best_child(id, self.config.exploration_constant) {
            id = child;
        }
        self.expand(id);
        id
    }

    fn expand(&mut self, id: NodeId) {
        let cached = if id == self.tree.root() { self.root_moves.take() } else { None };
        let moves = cached.unwrap_or_else(|| {
            self.movegen
                .legal_moves(&self.tree.get(id).position, true, self.config.promotion_mode)
        });
        self.tree.expand(id, &moves);
    }

    /// Run one full playout and return the node it simulated from.
    pub fn playout(&mut self) -> NodeId {
        let leaf = self.tree_policy();
        let score = rollout(
            &self.tree.get(leaf).position,
            self.config.playout_depth_limit,
            self.movegen,
            self.evaluator,
            &mut self.rng,
        );
        self.tree.backup(leaf, score);
        self.playouts += 1;

        if let Some(trace) = self.trace.as_mut() {
            trace.push(leaf);
        }
        trace!(
            playout = self.playouts,
            node = leaf.0,
            white = score.white,
            black = score.black,
            "playout"
        );
        leaf
    }

    fn should_stop(&self, cancel: &AtomicBool, deadline: Option<Instant>) -> bool {
        if cancel.load(Ordering::Relaxed) {
            return true;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return true;
        }
        self.config.limit_playouts && self.playouts >= self.config.max_playouts
    }

    /// Run playouts until the budget is spent or `cancel` is observed, then
    /// pick the final move.
    pub fn run(&mut self, cancel: &AtomicBool) -> SearchOutcome {
        let start = Instant::now();
        let deadline = self
            .config
            .time_limit_enabled
            .then(|| start + self.config.search_time);

        let root = self.tree.root();
        let root_moves = self
            .movegen
            .legal_moves(&self.tree.get(root).position, true, self.config.promotion_mode);
        if root_moves.is_empty() {
            debug!("no legal moves at root");
            return SearchOutcome {
                best_move: Move::NONE,
                eval: 0,
                diagnostics: self.diagnostics(start.elapsed()),
            };
        }

        debug!(
            legal_moves = root_moves.len(),
            max_playouts = self.config.limit_playouts.then_some(self.config.max_playouts),
            "search started"
        );
        self.root_moves = Some(root_moves);

        while !self.should_stop(cancel, deadline) {
            self.playout();
        }

        let (best_move, eval) = self.best_move();
        let diagnostics = self.diagnostics(start.elapsed());
        debug!(
            best_move = %best_move,
            eval,
            playouts = diagnostics.playouts,
            tree_size = diagnostics.tree_size,
            elapsed_ms = diagnostics.elapsed.as_millis() as u64,
            "search finished"
        );

        SearchOutcome {
            best_move,
            eval,
            diagnostics,
        }
    }

    /// Final choice: UCB1 at the root with no exploration term.
    ///
    /// An unvisited root child still wins outright here, which can make the
    /// choice unstable under very small budgets.
    pub fn best_move(&self) -> (Move, i32) {
        match self.tree.best_child(self.tree.root(), 0.0) {
            Some(id) => {
                let child = self.tree.get(id);
                (child.mv, child.mean_value())
            }
            None => (Move::NONE, 0),
        }
    }

    fn diagnostics(&self, elapsed: Duration) -> SearchDiagnostics {
        SearchDiagnostics {
            playouts: self.playouts,
            tree_size: self.tree.len(),
            elapsed,
        }
    }
}

/// Print debug information about the root's children.
pub fn dump_children(tree: &SearchTree) {
    let root = tree.get(tree.root());
    for &id in &root.children {
        let child = tree.get(id);
        eprintln!(
            "move {} v={} value={} mean={}",
            child.mv,
            child.visits,
            child.value,
            child.mean_value()
        );
    }
}
