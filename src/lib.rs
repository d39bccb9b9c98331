//! Simulated digital twin of three neurochemical indicators.
//!
//! The engine mutates dopamine, oxytocin and cortisol levels with a small
//! weighted rule table on a fixed interval, keeps a rolling chart history and
//! an event feed, and derives recommendations from the current levels.

pub mod buffers;
pub mod chemistry;
pub mod cli;
pub mod config;
pub mod engine;
pub mod interaction;
pub mod presenter;
pub mod recommendation;

pub use buffers::{HistoryPoint, LogEntry, HISTORY_CAPACITY, LOG_CAPACITY};
pub use chemistry::ChemistryState;
pub use config::Config;
pub use engine::{ChemistrySimulationEngine, EngineSnapshot, SimulationCore, TickOutcome};
pub use interaction::InteractionKind;
pub use recommendation::{derive_recommendations, Recommendation, RecommendationCategory};
