use thiserror::Error;

/// Errors returned by the game engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("board must hold between 1 and {max} cells, got {width}x{height}", max = super::config::MAX_CELLS)]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("game has not been initialized")]
    NotInitialized,
}
