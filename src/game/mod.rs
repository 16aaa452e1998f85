//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Renderers, input handlers and loop drivers call into [`GameEngine`] and read
//! its state back afterwards.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, Turn};
pub use config::{GameConfig, SpeedConfig};
pub use engine::{GameEngine, GameSnapshot, Phase, StepOutcome};
pub use error::EngineError;
pub use state::{Board, Cell, Position, Snake};
