//! Simulation module
//!
//! All gameplay logic lives here. This module must be deterministic for a
//! given seed and command sequence:
//! - Virtual milliseconds only (the host feeds elapsed time)
//! - Seeded RNG only
//! - One discrete step per clock action or command
//! - No rendering or platform dependencies

pub mod clock;
pub mod generator;
pub mod scoring;
pub mod session;
pub mod state;

pub use clock::{Clock, ClockAction};
pub use generator::{
    base_size, bomb_probability, kind_for_roll, spawn, spawn_interval_ms, speed,
};
pub use scoring::{PopOutcome, ScoringPolicy, apply_score_delta};
pub use session::{Command, GamePhase, Simulation, StartError};
pub use state::{
    Bubble, BubbleId, BubbleKind, EndReason, GameEvent, GameMode, PlayArea, SessionState,
};
