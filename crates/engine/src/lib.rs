pub mod engine;
pub mod markov;
pub mod paths;
pub mod shapley;

pub use engine::{AttributionEngine, AttributionReport};
pub use markov::absorption::AbsorptionOutcome;
pub use markov::matrix::TransitionMatrix;
pub use markov::normalize::AttributionResult;
pub use markov::removal::RemovalEffectResult;
pub use markov::transition::TrainedModel;
pub use paths::{PathGroup, PathSummary};
pub use shapley::coalition::CoalitionTable;
