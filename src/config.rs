//! Search configuration parameters.

use std::time::Duration;

use thiserror::Error;

use crate::constants::{
    DEFAULT_EXPLORATION, DEFAULT_MAX_PLAYOUTS, DEFAULT_PLAYOUT_DEPTH, DEFAULT_SEARCH_TIME_MS,
};
use crate::piece::PieceKind;

/// Which promotion pieces the move generator emits when expanding a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionMode {
    #[default]
    All,
    QueenOnly,
    QueenAndKnight,
}

impl PromotionMode {
    pub fn kinds(self) -> &'static [PieceKind] {
        match self {
            PromotionMode::All => &[
                PieceKind::Queen,
                PieceKind::Rook,
                PieceKind::Bishop,
                PieceKind::Knight,
            ],
            PromotionMode::QueenOnly => &[PieceKind::Queen],
            PromotionMode::QueenAndKnight => &[PieceKind::Queen, PieceKind::Knight],
        }
    }
}

/// Errors reported by [`SearchConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("exploration constant must be finite and non-negative, got {0}")]
    InvalidExploration(f64),

    #[error("search time must be positive when the time limit is enabled")]
    ZeroSearchTime,

    #[error("search is unbounded: enable the playout limit or the time limit")]
    Unbounded,
}

/// Configuration for one search request.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// UCB1 exploration coefficient. Higher values spread playouts over more
    /// children; zero is pure exploitation.
    pub exploration_constant: f64,

    /// Whether `max_playouts` is enforced.
    pub limit_playouts: bool,

    /// Playout budget when `limit_playouts` is set.
    pub max_playouts: u32,

    /// Maximum number of simulated moves per rollout.
    pub playout_depth_limit: u32,

    /// Stop at the `search_time` deadline, checked once per playout.
    pub time_limit_enabled: bool,

    pub search_time: Duration,

    /// Run the request on a spawned worker thread.
    pub run_on_worker_thread: bool,

    pub promotion_mode: PromotionMode,

    /// Seed for the rollout RNG; drawn from entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_constant: DEFAULT_EXPLORATION,
            limit_playouts: true,
            max_playouts: DEFAULT_MAX_PLAYOUTS,
            playout_depth_limit: DEFAULT_PLAYOUT_DEPTH,
            time_limit_enabled: false,
            search_time: Duration::from_millis(DEFAULT_SEARCH_TIME_MS),
            run_on_worker_thread: false,
            promotion_mode: PromotionMode::All,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Create a fast, seeded config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_playouts: 64,
            playout_depth_limit: 8,
            seed: Some(0x5EED),
            ..Self::default()
        }
    }

    /// Builder pattern: enforce a playout budget.
    pub fn with_playouts(mut self, n: u32) -> Self {
        self.limit_playouts = true;
        self.max_playouts = n;
        self
    }

    /// Builder pattern: lift the playout budget.
    pub fn without_playout_limit(mut self) -> Self {
        self.limit_playouts = false;
        self
    }

    /// Builder pattern: set the rollout depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.playout_depth_limit = depth;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: enable the time limit.
    pub fn with_time_limit(mut self, time: Duration) -> Self {
        self.time_limit_enabled = true;
        self.search_time = time;
        self
    }

    /// Builder pattern: run on a worker thread.
    pub fn on_worker_thread(mut self, worker: bool) -> Self {
        self.run_on_worker_thread = worker;
        self
    }

    /// Builder pattern: set the promotion kinds to expand.
    pub fn with_promotions(mut self, mode: PromotionMode) -> Self {
        self.promotion_mode = mode;
        self
    }

    /// Builder pattern: seed the rollout RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = self.exploration_constant;
        if !c.is_finite() || c < 0.0 {
            return Err(ConfigError::InvalidExploration(c));
        }
        if self.time_limit_enabled && self.search_time.is_zero() {
            return Err(ConfigError::ZeroSearchTime);
        }
        if !self.limit_playouts && !self.time_limit_enabled {
            return Err(ConfigError::Unbounded);
        }
        Ok(())
    }

    /// Fresh RNG for one request.
    pub fn make_rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!((config.exploration_constant - 0.7).abs() < 1e-12);
        assert!(config.limit_playouts);
        assert!(!config.time_limit_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_playouts(10)
            .with_depth(3)
            .with_exploration(1.4)
            .with_seed(9);
        assert_eq!(config.max_playouts, 10);
        assert_eq!(config.playout_depth_limit, 3);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_validation_rejects_bad_exploration() {
        let config = SearchConfig::default().with_exploration(-0.1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidExploration(-0.1))
        );
        let config = SearchConfig::default().with_exploration(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unbounded() {
        let config = SearchConfig::default().without_playout_limit();
        assert_eq!(config.validate(), Err(ConfigError::Unbounded));

        let config = config.with_time_limit(Duration::from_millis(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_time() {
        let config = SearchConfig::default().with_time_limit(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroSearchTime));
    }

    #[test]
    fn test_seeded_rngs_agree() {
        let config = SearchConfig::default().with_seed(42);
        let mut a = config.make_rng();
        let mut b = config.make_rng();
        for _ in 0..16 {
            assert_eq!(a.u64(..), b.u64(..));
        }
    }

    #[test]
    fn test_promotion_kinds() {
        assert_eq!(PromotionMode::All.kinds().len(), 4);
        assert_eq!(PromotionMode::QueenOnly.kinds(), &[PieceKind::Queen]);
        assert!(PromotionMode::QueenAndKnight.kinds().contains(&PieceKind::Knight));
    }
}
