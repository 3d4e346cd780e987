use indexmap::IndexMap;
use serde::Serialize;
use touchflow_core::ChannelId;
use tracing::warn;

use crate::shapley::coalition::{CoalitionTable, EXACT_CHANNEL_CEILING};

/// One coalition's line in a channel's marginal breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct MarginalContribution {
    /// The coalition S the channel joins (canonical sorted order).
    pub coalition: Vec<ChannelId>,
    pub value_without: f64,
    pub value_with: f64,
    /// `|S|! (n-|S|-1)! / n!`: the share of orderings in which the channel
    /// joins exactly this coalition.
    pub weight: f64,
    pub contribution: f64,
}

/// Exact Shapley values for every channel in the table.
pub fn shapley_values(table: &CoalitionTable) -> IndexMap<ChannelId, f64> {
    shapley_from_fn(table.channels(), |mask| table.value(mask))
}

/// Exact Shapley values over an arbitrary coalition value function.
///
/// `phi_i = Σ_{S ⊆ N\{i}} |S|! (n-|S|-1)! / n! × (v(S∪{i}) − v(S))`,
/// with subsets enumerated by bitmask and factorial weights precomputed.
/// O(2^n · n); past `EXACT_CHANNEL_CEILING` channels this still runs but a
/// warning is logged, since sampling estimators are the better tool there.
pub fn shapley_from_fn(
    channels: &[ChannelId],
    value: impl Fn(usize) -> f64,
) -> IndexMap<ChannelId, f64> {
    let n = channels.len();
    if n > EXACT_CHANNEL_CEILING {
        warn!(
            channels = n,
            ceiling = EXACT_CHANNEL_CEILING,
            "exact Shapley enumeration past the practical ceiling"
        );
    }

    let fact = factorials(n);
    let full = 1usize << n;

    let mut values = IndexMap::with_capacity(n);
    for (i, channel) in channels.iter().enumerate() {
        let bit = 1usize << i;
        let mut phi = 0.0;

        for mask in 0..full {
            if mask & bit != 0 {
                continue;
            }
            let s = mask.count_ones() as usize;
            let weight = fact[s] * fact[n - s - 1] / fact[n];
            phi += weight * (value(mask | bit) - value(mask));
        }

        values.insert(channel.clone(), phi);
    }
    values
}

/// Per-coalition breakdown of one channel's Shapley value, in mask order.
/// `None` for a channel outside the table's vocabulary.
pub fn marginal_breakdown(
    table: &CoalitionTable,
    channel: &str,
) -> Option<Vec<MarginalContribution>> {
    let channels = table.channels();
    let i = channels.iter().position(|c| c == channel)?;
    let n = channels.len();
    let bit = 1usize << i;
    let fact = factorials(n);

    let mut breakdown = Vec::with_capacity(1 << (n - 1));
    for mask in 0..(1usize << n) {
        if mask & bit != 0 {
            continue;
        }
        let s = mask.count_ones() as usize;
        let weight = fact[s] * fact[n - s - 1] / fact[n];
        let value_without = table.value(mask);
        let value_with = table.value(mask | bit);

        breakdown.push(MarginalContribution {
            coalition: table.signature(mask),
            value_without,
            value_with,
            weight,
            contribution: weight * (value_with - value_without),
        });
    }
    Some(breakdown)
}

fn factorials(n: usize) -> Vec<f64> {
    let mut fact = vec![1.0; n + 1];
    for k in 1..=n {
        fact[k] = fact[k - 1] * k as f64;
    }
    fact
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchflow_core::Journey;

    fn vocab(names: &[&str]) -> Vec<ChannelId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// v({A})=0.2, v({B})=0.2, v({A,B})=0.5, v(∅)=0.
    fn symmetric_value(mask: usize) -> f64 {
        match mask {
            0b00 => 0.0,
            0b01 | 0b10 => 0.2,
            0b11 => 0.5,
            _ => unreachable!(),
        }
    }

    #[test]
    fn symmetric_channels_split_evenly() {
        let values = shapley_from_fn(&vocab(&["A", "B"]), symmetric_value);

        assert!((values["A"] - 0.25).abs() < 1e-12);
        assert!((values["B"] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn efficiency_holds_for_efficient_value_functions() {
        let values = shapley_from_fn(&vocab(&["A", "B"]), symmetric_value);
        let total: f64 = values.values().sum();
        assert!((total - 0.5).abs() < 1e-12);
    }

    #[test]
    fn dummy_channel_gets_nothing() {
        // C never changes any coalition's value.
        let value = |mask: usize| -> f64 {
            let without_c = mask & 0b011;
            symmetric_value(without_c)
        };
        let values = shapley_from_fn(&vocab(&["A", "B", "C"]), value);

        assert!(values["C"].abs() < 1e-12);
        assert!((values["A"] - 0.25).abs() < 1e-12);
        assert!((values["B"] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn single_channel_takes_the_full_value() {
        let values = shapley_from_fn(&vocab(&["A"]), |mask| if mask == 1 { 0.4 } else { 0.0 });
        assert!((values["A"] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn empirical_table_matches_hand_computed_values() {
        let journey = |touches: &[&str], converted: bool| Journey {
            touches: touches.iter().map(|s| s.to_string()).collect(),
            converted,
        };
        // v({A}) = 1/2, v({B}) = 0, v({A,B}) = 1.
        let journeys = vec![
            journey(&["A"], true),
            journey(&["A"], false),
            journey(&["B"], false),
            journey(&["A", "B"], true),
        ];
        let table = CoalitionTable::build(&journeys, &vocab(&["A", "B"])).unwrap();
        let values = shapley_values(&table);

        // phi_A = 1/2·(0.5-0) + 1/2·(1-0) = 0.75
        // phi_B = 1/2·(0-0) + 1/2·(1-0.5) = 0.25
        assert!((values["A"] - 0.75).abs() < 1e-12);
        assert!((values["B"] - 0.25).abs() < 1e-12);
        let total: f64 = values.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn breakdown_sums_to_the_shapley_value() {
        let journey = |touches: &[&str], converted: bool| Journey {
            touches: touches.iter().map(|s| s.to_string()).collect(),
            converted,
        };
        let journeys = vec![
            journey(&["A"], true),
            journey(&["B"], false),
            journey(&["A", "B"], true),
        ];
        let table = CoalitionTable::build(&journeys, &vocab(&["A", "B"])).unwrap();

        let values = shapley_values(&table);
        let breakdown = marginal_breakdown(&table, "A").unwrap();

        assert_eq!(breakdown.len(), 2);
        let total: f64 = breakdown.iter().map(|line| line.contribution).sum();
        assert!((total - values["A"]).abs() < 1e-12);

        // Weights over all coalitions a channel can join sum to 1.
        let weights: f64 = breakdown.iter().map(|line| line.weight).sum();
        assert!((weights - 1.0).abs() < 1e-12);
    }

    #[test]
    fn breakdown_for_unknown_channel_is_none() {
        let table = CoalitionTable::build(&[], &vocab(&["A"])).unwrap();
        assert!(marginal_breakdown(&table, "X").is_none());
    }
}
