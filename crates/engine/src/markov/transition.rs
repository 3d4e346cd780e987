use indexmap::IndexMap;
use touchflow_core::{ChannelId, Journey, StateSpace, TouchflowError};
use tracing::debug;

use crate::markov::matrix::TransitionMatrix;

/// Output of one training run: the row-stochastic matrix, the state arena it
/// is indexed by, and per-state visit diagnostics.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub matrix: TransitionMatrix,
    pub space: StateSpace,
    /// How many times each state was entered during training (`start` counts
    /// once per journey). Reporting only; a zero for a channel marks a dead
    /// state with no outgoing path.
    pub visit_counts: IndexMap<String, u64>,
}

impl TrainedModel {
    /// Stable state name → index mapping for consumers addressing the matrix.
    pub fn state_index(&self) -> IndexMap<String, usize> {
        self.space
            .states()
            .iter()
            .enumerate()
            .map(|(i, s)| (s.to_string(), i))
            .collect()
    }
}

/// Build a trained Markov model from recorded journeys.
///
/// Counts every consecutive (from, to) pair along the implied chain
/// `start → touches… → conversion|null` (consecutive repeated touches become
/// self-transitions), then normalizes each non-absorbing row by its total.
/// A row with no observed transitions stays all-zero rather than dividing by
/// zero. Only aggregate counts matter, so journey order is irrelevant and
/// identical input reproduces the matrix bit for bit.
pub fn train(
    journeys: &[Journey],
    channels: &[ChannelId],
) -> Result<TrainedModel, TouchflowError> {
    let space = StateSpace::new(channels)?;
    let n = space.len();

    // Resolve every touch up front so validation fails before any matrix work.
    let mut resolved: Vec<Vec<usize>> = Vec::with_capacity(journeys.len());
    for (j, journey) in journeys.iter().enumerate() {
        let mut indices = Vec::with_capacity(journey.touches.len());
        for touch in &journey.touches {
            match space.channel(touch) {
                Some(i) => indices.push(i),
                None => {
                    return Err(TouchflowError::UnknownChannel {
                        channel: touch.clone(),
                        journey: j,
                    })
                }
            }
        }
        resolved.push(indices);
    }

    let mut counts = vec![vec![0u64; n]; n];
    let mut visits = vec![0u64; n];

    for (journey, indices) in journeys.iter().zip(&resolved) {
        let mut from = space.start();
        visits[from] += 1;
        for &to in indices {
            counts[from][to] += 1;
            visits[to] += 1;
            from = to;
        }
        let end = if journey.converted {
            space.conversion()
        } else {
            space.null()
        };
        counts[from][end] += 1;
        visits[end] += 1;
    }

    let mut matrix = TransitionMatrix::zero(n);
    for i in 0..n {
        if space.is_absorbing(i) {
            matrix.set(i, i, 1.0);
            continue;
        }
        let total: u64 = counts[i].iter().sum();
        if total == 0 {
            continue; // dead state: no outgoing path
        }
        for (j, &count) in counts[i].iter().enumerate() {
            if count > 0 {
                matrix.set(i, j, count as f64 / total as f64);
            }
        }
    }

    let visit_counts = space
        .states()
        .iter()
        .zip(&visits)
        .map(|(s, &v)| (s.to_string(), v))
        .collect();

    debug!(
        journeys = journeys.len(),
        states = n,
        "transition model trained"
    );

    Ok(TrainedModel {
        matrix,
        space,
        visit_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(names: &[&str]) -> Vec<ChannelId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn journey(touches: &[&str], converted: bool) -> Journey {
        Journey {
            touches: touches.iter().map(|s| s.to_string()).collect(),
            converted,
        }
    }

    /// 50 converted `[A]` journeys and 50 abandoned `[B]` journeys.
    fn split_journeys() -> Vec<Journey> {
        let mut journeys = Vec::new();
        for _ in 0..50 {
            journeys.push(journey(&["A"], true));
            journeys.push(journey(&["B"], false));
        }
        journeys
    }

    #[test]
    fn split_traffic_probabilities() {
        let model = train(&split_journeys(), &vocab(&["A", "B"])).unwrap();
        let space = &model.space;
        let (start, a, b) = (space.start(), 1, 2);

        assert_eq!(model.matrix.get(start, a), 0.5);
        assert_eq!(model.matrix.get(start, b), 0.5);
        assert_eq!(model.matrix.get(a, space.conversion()), 1.0);
        assert_eq!(model.matrix.get(b, space.null()), 1.0);
    }

    #[test]
    fn consecutive_repeats_count_self_loops() {
        let model = train(&[journey(&["A", "A", "B"], true)], &vocab(&["A", "B"])).unwrap();

        assert!(model.matrix.get(1, 1) > 0.0, "A→A self-loop expected");
        assert!(model.matrix.get(1, 2) > 0.0, "A→B expected");
        // A was left twice: once to itself, once to B.
        assert_eq!(model.matrix.get(1, 1), 0.5);
        assert_eq!(model.matrix.get(1, 2), 0.5);
    }

    #[test]
    fn non_absorbing_rows_are_stochastic_or_zero() {
        let journeys = vec![
            journey(&["A", "B", "A"], true),
            journey(&["B"], false),
            journey(&["A"], true),
        ];
        let model = train(&journeys, &vocab(&["A", "B", "C"])).unwrap();

        for i in 0..model.space.len() {
            if model.space.is_absorbing(i) {
                continue;
            }
            let sum = model.matrix.row_sum(i);
            assert!(
                sum == 0.0 || (sum - 1.0).abs() < 1e-9,
                "row {} sums to {}",
                i,
                sum
            );
        }
    }

    #[test]
    fn unvisited_channel_has_zero_row_and_zero_visits() {
        let model = train(&[journey(&["A"], true)], &vocab(&["A", "C"])).unwrap();
        let c = model.space.channel("C").unwrap();

        assert_eq!(model.matrix.row_sum(c), 0.0);
        assert_eq!(model.visit_counts["C"], 0);
    }

    #[test]
    fn absorbing_rows_are_self_loops() {
        let model = train(&[journey(&["A"], true)], &vocab(&["A"])).unwrap();
        let space = &model.space;

        assert_eq!(model.matrix.get(space.conversion(), space.conversion()), 1.0);
        assert_eq!(model.matrix.get(space.null(), space.null()), 1.0);
        assert_eq!(model.matrix.row_sum(space.conversion()), 1.0);
        assert_eq!(model.matrix.row_sum(space.null()), 1.0);
    }

    #[test]
    fn visit_counts_track_entries() {
        let journeys = vec![journey(&["A", "A", "B"], true), journey(&["B"], false)];
        let model = train(&journeys, &vocab(&["A", "B"])).unwrap();

        assert_eq!(model.visit_counts["(start)"], 2);
        assert_eq!(model.visit_counts["A"], 2);
        assert_eq!(model.visit_counts["B"], 2);
        assert_eq!(model.visit_counts["(conversion)"], 1);
        assert_eq!(model.visit_counts["(null)"], 1);
    }

    #[test]
    fn unknown_touch_fails_with_journey_index() {
        let journeys = vec![journey(&["A"], true), journey(&["A", "X"], false)];
        let err = train(&journeys, &vocab(&["A"])).unwrap_err();

        match err {
            TouchflowError::UnknownChannel { channel, journey } => {
                assert_eq!(channel, "X");
                assert_eq!(journey, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_journey_list_trains_zero_matrix() {
        let model = train(&[], &vocab(&["A", "B"])).unwrap();
        for i in 0..model.space.len() {
            if model.space.is_transient(i) {
                assert_eq!(model.matrix.row_sum(i), 0.0);
            }
        }
    }

    #[test]
    fn training_is_bit_identical_and_order_invariant() {
        let vocabulary = vocab(&["A", "B"]);
        let mut journeys = split_journeys();

        let first = train(&journeys, &vocabulary).unwrap();
        let second = train(&journeys, &vocabulary).unwrap();
        assert_eq!(first.matrix, second.matrix);

        journeys.reverse();
        let reversed = train(&journeys, &vocabulary).unwrap();
        assert_eq!(first.matrix, reversed.matrix);
    }

    #[test]
    fn state_index_is_bijective() {
        let model = train(&[journey(&["A"], true)], &vocab(&["A", "B"])).unwrap();
        let index = model.state_index();

        assert_eq!(index.len(), model.space.len());
        for (i, name) in model.space.names().iter().enumerate() {
            assert_eq!(index[name], i);
        }
    }
}
