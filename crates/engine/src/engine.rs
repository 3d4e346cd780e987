use std::time::Instant;

use indexmap::IndexMap;
use serde::Serialize;
use touchflow_core::{ChannelId, EngineConfig, Journey, TouchflowError};
use tracing::info;

use crate::markov::matrix::TransitionMatrix;
use crate::markov::{normalize, removal, transition};
use crate::paths::{self, PathGroup};
use crate::shapley::calculator;
use crate::shapley::coalition::CoalitionTable;

/// Everything one attribution run produces, bundled for consumers.
///
/// A read-only snapshot: retraining on a new journey set builds a new
/// report, never mutates this one.
#[derive(Debug, Clone, Serialize)]
pub struct AttributionReport {
    /// The channel vocabulary in declared order.
    pub channels: Vec<ChannelId>,
    /// State display names in matrix index order.
    pub states: Vec<String>,
    pub state_index: IndexMap<String, usize>,
    pub matrix: TransitionMatrix,
    pub visit_counts: IndexMap<String, u64>,
    pub base_conversion_rate: f64,
    pub removal_effects: IndexMap<ChannelId, f64>,
    /// Normalized Markov (removal-effect) credit shares.
    pub attribution: IndexMap<ChannelId, f64>,
    /// True when any absorption solve stopped at the iteration cap.
    pub approximate: bool,
    /// Game-theoretic credit per channel, in conversion-rate units.
    pub shapley: IndexMap<ChannelId, f64>,
    /// Non-empty coalitions never observed in the journey set.
    pub unobserved_coalitions: usize,
    pub top_paths: Vec<PathGroup>,
}

/// Runs the full attribution pipeline over one journey set.
///
/// Stateless: every `run` call takes explicit inputs and returns a fresh
/// report, so concurrent callers with independent journey sets need no
/// locking.
pub struct AttributionEngine {
    config: EngineConfig,
}

impl AttributionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Train the transition model, measure removal effects, normalize them,
    /// and compute Shapley values over the coalition table.
    pub fn run(
        &self,
        journeys: &[Journey],
        channels: &[ChannelId],
    ) -> Result<AttributionReport, TouchflowError> {
        let start = Instant::now();

        info!("Training transition model...");
        let step = Instant::now();
        let model = transition::train(journeys, channels)?;
        info!(
            "  {} states from {} journeys in {:.1}ms",
            model.space.len(),
            journeys.len(),
            millis(step)
        );

        info!("Computing removal effects...");
        let step = Instant::now();
        let removal = removal::removal_effects(&model, &self.config.solver);
        info!(
            "  removal effects done in {:.1}ms (base rate {:.4})",
            millis(step),
            removal.base_conversion_rate
        );

        let attribution = normalize::normalize(&removal.removal_effects);

        info!("Computing Shapley values...");
        let step = Instant::now();
        let table = CoalitionTable::build(journeys, channels)?;
        let shapley = calculator::shapley_values(&table);
        info!(
            "  Shapley done in {:.1}ms over {} coalitions",
            millis(step),
            table.coalition_count()
        );

        let summary = paths::summarize(journeys);

        info!("Attribution complete in {:.1}ms", millis(start));

        Ok(AttributionReport {
            channels: channels.to_vec(),
            states: model.space.names(),
            state_index: model.state_index(),
            visit_counts: model.visit_counts.clone(),
            matrix: model.matrix,
            base_conversion_rate: removal.base_conversion_rate,
            removal_effects: removal.removal_effects,
            attribution: attribution.attribution,
            approximate: removal.approximate,
            shapley,
            unobserved_coalitions: table.unobserved(),
            top_paths: summary.top(self.config.top_paths).to_vec(),
        })
    }
}

fn millis(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
