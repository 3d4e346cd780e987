use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Solver ────────────────────────────────────────────────────

/// Termination settings for the absorption solver, typically parsed from
/// TOML or the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Remaining transient mass below which a solve counts as converged.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Hard cap on propagation sweeps. Hitting it flags the result as an
    /// approximation; it never errors.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_epsilon() -> f64 {
    1e-9
}
fn default_max_iterations() -> usize {
    10_000
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl SolverConfig {
    /// Build from `TOUCHFLOW_SOLVER_*` env vars (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            epsilon: env_f64("TOUCHFLOW_SOLVER_EPSILON", default_epsilon()),
            max_iterations: env_usize(
                "TOUCHFLOW_SOLVER_MAX_ITERATIONS",
                default_max_iterations(),
            ),
        }
    }
}

// ── Engine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub solver: SolverConfig,
    /// Number of path groups kept in the report summary.
    #[serde(default = "default_top_paths")]
    pub top_paths: usize,
}

fn default_top_paths() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            top_paths: default_top_paths(),
        }
    }
}

impl EngineConfig {
    /// Build from env vars (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            solver: SolverConfig::from_env(),
            top_paths: env_usize("TOUCHFLOW_TOP_PATHS", default_top_paths()),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  solver:  epsilon={:e}, max_iterations={}",
            self.solver.epsilon,
            self.solver.max_iterations
        );
        tracing::info!("  report:  top_paths={}", self.top_paths);
    }
}
