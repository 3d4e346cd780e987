pub mod config;
pub mod error;
pub mod journey;
pub mod state;

pub use config::{EngineConfig, SolverConfig};
pub use error::*;
pub use journey::*;
pub use state::*;
