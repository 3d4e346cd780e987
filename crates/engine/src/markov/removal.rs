use indexmap::IndexMap;
use serde::Serialize;
use touchflow_core::{ChannelId, SolverConfig, StateSpace};
use tracing::debug;

use crate::markov::absorption;
use crate::markov::matrix::TransitionMatrix;
use crate::markov::transition::TrainedModel;

/// Removal effects for every channel, relative to the base conversion rate.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalEffectResult {
    pub base_conversion_rate: f64,
    /// Per-channel relative drop in conversion probability under ablation.
    /// Values are only meaningful relative to `base_conversion_rate` and are
    /// not required to sum to 1: several channels can each be individually
    /// necessary along different paths.
    pub removal_effects: IndexMap<ChannelId, f64>,
    /// True when any constituent solve stopped at the iteration cap.
    pub approximate: bool,
}

/// Measure each channel's removal effect by ablating it and re-solving.
///
/// Ablation redirects every edge that targeted the channel to `null` and
/// excludes the channel's own row from the solve: traffic that would have
/// entered the channel leaves the funnel instead. A zero baseline yields
/// all-zero effects rather than dividing by zero.
pub fn removal_effects(model: &TrainedModel, config: &SolverConfig) -> RemovalEffectResult {
    let space = &model.space;
    let base = absorption::conversion_probability(&model.matrix, space, config);
    let mut approximate = !base.converged;

    let mut effects = IndexMap::with_capacity(space.channel_count());
    for channel in space.channels() {
        let index = match space.channel(channel) {
            Some(i) => i,
            None => continue,
        };

        let effect = if base.probability > 0.0 {
            let ablated = ablate(&model.matrix, space, index);
            let outcome =
                absorption::conversion_probability_without(&ablated, space, index, config);
            approximate |= !outcome.converged;
            // Float noise can push the ratio slightly past 1; clamp at zero.
            (1.0 - outcome.probability / base.probability).max(0.0)
        } else {
            0.0
        };

        debug!(channel = %channel, effect, "removal effect");
        effects.insert(channel.clone(), effect);
    }

    RemovalEffectResult {
        base_conversion_rate: base.probability,
        removal_effects: effects,
        approximate,
    }
}

/// Copy of the matrix with every edge into `channel` redirected to `null`.
fn ablate(matrix: &TransitionMatrix, space: &StateSpace, channel: usize) -> TransitionMatrix {
    let mut modified = matrix.clone();
    let null = space.null();

    for from in 0..modified.len() {
        if from == channel {
            continue; // the channel's own row is excluded from the solve
        }
        let p = modified.get(from, channel);
        if p > 0.0 {
            modified.set(from, channel, 0.0);
            modified.add(from, null, p);
        }
    }
    modified
}
