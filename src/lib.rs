//! Wrap Snake - a grid snake game whose board edges wrap around
//!
//! This library provides:
//! - Core game logic (game module)
//! - Keyboard input mapping (input module)
//! - TUI rendering (render module)
//! - Session stats (metrics module)
//! - The interactive loop driver (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
