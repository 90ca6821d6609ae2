//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Sound and high-score persistence are reached only through the traits in
//! `crate::audio` and `crate::storage`.

pub mod action;
pub mod config;
pub mod engine;
pub mod food;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use engine::{GameOverCause, GameSession, Phase, TickOutcome, TimerHandle};
pub use food::Food;
pub use state::{CollisionType, Position, Snake};
