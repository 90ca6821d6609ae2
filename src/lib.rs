//! Grid Snake - a single-player Snake game for the terminal
//!
//! This library provides:
//! - Core game logic: snake, food and the session state machine (game module)
//! - Sound and high-score seams the session reports to (audio, storage modules)
//! - Terminal input mapping and TUI rendering (input, render modules)
//! - The interactive driver that owns the tick timer (modes module)

pub mod audio;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
