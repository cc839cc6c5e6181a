//! # Stemmix
//!
//! Layered game-music mixing and one-shot sound effects. A mix is a set of
//! tracks, each built from simultaneously playing layers that can be toggled
//! and volume-faded independently; switching the active track silences the
//! previous one. A separate one-shot player fires fire-and-forget effects
//! with optional pitch variance.

pub mod error;
pub mod mixer;
pub mod oneshot;
pub mod output;
pub mod scheduler;
pub mod settings;
