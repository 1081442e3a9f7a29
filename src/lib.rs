//! # Gomoku Zero
//!
//! A web opponent for Gomoku (five-in-a-row) driven by a frozen
//! AlphaZero-style policy-value network.
//!
//! ## Features
//!
//! - **Game Engine**: 8×8 board replay, legality tracking and win detection
//! - **Parameter Bridge**: loads a legacy 16-array parameter bundle into a
//!   correctly-oriented tch network
//! - **AI Engine**: Monte Carlo Tree Search guided by the network
//! - **Server Components**: axum HTTP API and static frontend hosting

/// Core game logic: board replay and win detection
pub mod game;

/// Monte Carlo Tree Search move selection
pub mod mcts;

/// Neural network components: parameter bundle, bridge, evaluator
pub mod neural;

/// Server components (HTTP API, static assets)
pub mod servers;

/// Turn orchestration and the process-wide AI handle
pub mod services;

/// Main error type for the Gomoku Zero library
#[derive(Debug, thiserror::Error)]
pub enum GomokuError {
    /// Parameter file missing or unreadable at startup. The AI stays
    /// uninitialized but the rest of the service keeps running.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// The legacy bundle has the wrong number of arrays.
    #[error("parameter bundle holds {actual} arrays, expected {expected}")]
    BundleArity { expected: usize, actual: usize },

    /// One bundle array disagrees with the shape its position implies.
    #[error(
        "parameter bundle mismatch at position {position} ({role}): \
         expected shape {expected:?}, got {actual:?}"
    )]
    BridgeShape {
        position: usize,
        role: &'static str,
        expected: Vec<i64>,
        actual: Vec<i64>,
    },

    /// The client submitted a move that is not available on the board.
    #[error("invalid move sequence: {0}")]
    InvalidMove(usize),

    /// A move was requested while the AI engine never initialized.
    #[error("AI model not loaded")]
    ServiceUnavailable,

    /// Move selection failed (no legal moves, poisoned lock, ...).
    #[error("search error: {0}")]
    Search(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tensor error: {0}")]
    Tch(#[from] tch::TchError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GomokuError>;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
