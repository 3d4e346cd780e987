use indexmap::IndexMap;
use serde::Serialize;
use touchflow_core::ChannelId;

/// Normalized per-channel credit shares.
#[derive(Debug, Clone, Serialize)]
pub struct AttributionResult {
    /// Non-negative shares summing to 1, or all equal when no channel
    /// individually matters.
    pub attribution: IndexMap<ChannelId, f64>,
}

/// Rescale removal effects into a proper credit distribution.
///
/// Individual effects can sum above 1 (several channels can each be
/// necessary along different paths); dividing by the total restores a
/// distribution. A zero total falls back to an equal share per channel,
/// covering the degenerate case where no conversions were observed.
pub fn normalize(removal_effects: &IndexMap<ChannelId, f64>) -> AttributionResult {
    let total: f64 = removal_effects.values().sum();
    let n = removal_effects.len();

    let attribution = if n == 0 {
        IndexMap::new()
    } else if total <= 0.0 {
        let share = 1.0 / n as f64;
        removal_effects.keys().map(|c| (c.clone(), share)).collect()
    } else {
        removal_effects
            .iter()
            .map(|(c, &e)| (c.clone(), e / total))
            .collect()
    };

    AttributionResult { attribution }
}
