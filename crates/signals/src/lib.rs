pub mod advisor;
pub mod composite;
pub mod engine;
pub mod indicators;
pub mod risk;
pub mod sessions;
pub mod techniques;

pub use advisor::GroqAdvisor;
pub use engine::{SignalEngine, SummaryEntry};
