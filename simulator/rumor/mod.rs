// Rumor Routing Simulator Module

pub mod config;
pub mod event_sink;
pub mod runner;
pub mod stats;

// Re-export commonly used types
pub use config::{parse_seed_hex, RumorConfig};
pub use runner::RumorRunner;
pub use stats::SimulationResult;
