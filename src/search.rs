//! Search requests: start, cancel, and collect the result.
//!
//! A [`SearchController`] owns the configuration and the move generator and
//! evaluator collaborators. Each call to [`SearchController::start_search`]
//! builds a fresh tree and RNG, runs the search either inline or on a worker
//! thread, and hands back a [`SearchHandle`] that resolves exactly once.
//!
//! Cancellation is cooperative. [`SearchController::cancel`] sets a flag
//! that the playout loop reads between playouts, so the search stops after
//! at most one more full playout.
//!
//! ## Example
//!
//! ```
//! use chess_mcts::config::SearchConfig;
//! use chess_mcts::position::Position;
//! use chess_mcts::search::SearchController;
//!
//! let config = SearchConfig::default().with_playouts(50).with_seed(1);
//! let mut controller = SearchController::new(config).unwrap();
//! let outcome = controller.start_search(&Position::new()).unwrap().wait().unwrap();
//! assert!(outcome.best_move.is_valid());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SearchConfig};
use crate::evaluation::{Evaluator, MaterialEvaluator};
use crate::mcts::SearchEngine;
pub use crate::mcts::{SearchDiagnostics, SearchOutcome};
use crate::movegen::{MoveGenerator, StandardMoveGenerator};
use crate::position::Position;

/// Errors from running a search request.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to spawn search worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("search finished without reporting a result")]
    Disconnected,
}

/// Entry point for search requests.
pub struct SearchController<M = StandardMoveGenerator, E = MaterialEvaluator> {
    config: SearchConfig,
    movegen: Arc<M>,
    evaluator: Arc<E>,
    /// Cancellation flag of the most recent request.
    cancel: Arc<AtomicBool>,
    last_diagnostics: Arc<Mutex<Option<SearchDiagnostics>>>,
}

impl SearchController {
    /// Create a controller with the standard collaborators.
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        Self::with_collaborators(config, StandardMoveGenerator, MaterialEvaluator)
    }
}

impl<M, E> SearchController<M, E>
where
    M: MoveGenerator + 'static,
    E: Evaluator + 'static,
{
    /// Create a controller with custom collaborators.
    pub fn with_collaborators(config: SearchConfig, movegen: M, evaluator: E) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            movegen: Arc::new(movegen),
            evaluator: Arc::new(evaluator),
            cancel: Arc::new(AtomicBool::new(false)),
            last_diagnostics: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Launch one search from `position`.
    ///
    /// With `run_on_worker_thread` unset the search runs to completion before
    /// this returns and the handle is already resolved.
    pub fn start_search(&mut self, position: &Position) -> Result<SearchHandle, SearchError> {
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Arc::clone(&cancel);

        let (tx, rx) = mpsc::channel();
        let config = self.config.clone();
        let movegen = Arc::clone(&self.movegen);
        let evaluator = Arc::clone(&self.evaluator);
        let last = Arc::clone(&self.last_diagnostics);
        let root = position.clone();
        let flag = Arc::clone(&cancel);

        let job = move || {
            let rng = config.make_rng();
            let mut engine = SearchEngine::new(root, &config, &*movegen, &*evaluator, rng);
            let outcome = engine.run(&flag);
            if let Ok(mut slot) = last.lock() {
                *slot = Some(outcome.diagnostics);
            }
            if tx.send(outcome).is_err() {
                debug!("search result dropped: handle already gone");
            }
        };

        let worker = if self.config.run_on_worker_thread {
            info!("starting search on worker thread");
            Some(thread::Builder::new().name("mcts-search".to_string()).spawn(job)?)
        } else {
            job();
            None
        };

        Ok(SearchHandle {
            rx,
            cancel,
            worker,
            result: None,
        })
    }

    /// Ask the in-flight request to stop after its current playout.
    pub fn cancel(&self) {
        info!("search cancellation requested");
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Diagnostics of the last completed request.
    pub fn last_diagnostics(&self) -> Option<SearchDiagnostics> {
        self.last_diagnostics.lock().ok().and_then(|d| *d)
    }
}

/// Single-resolution handle to a search result.
pub struct SearchHandle {
    rx: Receiver<SearchOutcome>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    result: Option<SearchOutcome>,
}

impl SearchHandle {
    /// Request cooperative cancellation of this search.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Non-blocking check for the result.
    ///
    /// `Ok(None)` while the search is still running. Fails with
    /// [`SearchError::Disconnected`] once the search has ended without
    /// reporting, e.g. because the worker panicked.
    pub fn try_result(&mut self) -> Result<Option<SearchOutcome>, SearchError> {
        if self.result.is_none() {
            match self.rx.try_recv() {
                Ok(outcome) => self.result = Some(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    warn!("search ended without reporting a result");
                    return Err(SearchError::Disconnected);
                }
            }
        }
        Ok(self.result)
    }

    /// Block until the search completes.
    pub fn wait(mut self) -> Result<SearchOutcome, SearchError> {
        let outcome = match self.result.take() {
            Some(outcome) => outcome,
            None => self.rx.recv().map_err(|_| SearchError::Disconnected)?,
        };
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("search worker panicked after reporting");
            }
        }
        Ok(outcome)
    }
}
