//! Player-side tasks: the per-player agent and the automated key-press
//! generator.

pub mod agent;
pub mod generator;

pub use agent::PlayerAgent;
