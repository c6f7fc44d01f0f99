//! Chess-MCTS: a Monte Carlo Tree Search chess move selector.
//!
//! This crate picks a move for a chess position by running budgeted random
//! simulations and aggregating their outcomes in a search tree. It is an
//! anytime approximation, not a perfect-play solver.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, piece values and search defaults
//! - [`piece`] - Colors, piece kinds and category indexing
//! - [`piece_index`] - O(1) per-category piece location tracking
//! - [`board`] - Lightweight grid used by rollouts
//! - [`position`] - Canonical position, moves, FEN
//! - [`movegen`] - Legal and pseudo-legal move generation
//! - [`evaluation`] - Static evaluation of rollout end states
//! - [`playout`] - Random rollouts
//! - [`mcts`] - Search tree and playout loop
//! - [`config`] - Search configuration and validation
//! - [`search`] - Search requests, cancellation and results
//!
//! ## Example
//!
//! ```
//! use std::sync::atomic::AtomicBool;
//!
//! use chess_mcts::config::SearchConfig;
//! use chess_mcts::evaluation::MaterialEvaluator;
//! use chess_mcts::mcts::SearchEngine;
//! use chess_mcts::movegen::StandardMoveGenerator;
//! use chess_mcts::position::Position;
//!
//! let config = SearchConfig::default().with_playouts(100).with_seed(7);
//! let mut engine = SearchEngine::new(
//!     Position::new(),
//!     &config,
//!     &StandardMoveGenerator,
//!     &MaterialEvaluator,
//!     config.make_rng(),
//! );
//! let outcome = engine.run(&AtomicBool::new(false));
//! println!("Best move: {}", outcome.best_move);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod evaluation;
pub mod mcts;
pub mod movegen;
pub mod piece;
pub mod piece_index;
pub mod playout;
pub mod position;
pub mod search;
