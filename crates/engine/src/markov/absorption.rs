use touchflow_core::{SolverConfig, StateSpace};
use tracing::debug;

use crate::markov::matrix::TransitionMatrix;

/// Result of one absorption solve.
///
/// `converged == false` means the iteration cap was hit and `probability` is
/// the best available approximation. A diagnostic, never an error.
#[derive(Debug, Clone, Copy)]
pub struct AbsorptionOutcome {
    /// Probability mass absorbed at `conversion`, in [0, 1].
    pub probability: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// Probability of eventually being absorbed at `conversion` starting from
/// `start`.
///
/// Iterative mass propagation: all probability mass begins at `start`; each
/// sweep redistributes transient mass through the transient→transient
/// entries while accumulating whatever flows into `conversion` and `null`.
/// Terminates when the remaining transient mass drops below `epsilon` or at
/// the iteration cap. Preferred over exact fundamental-matrix inversion
/// because count-derived matrices can be near-singular.
pub fn conversion_probability(
    matrix: &TransitionMatrix,
    space: &StateSpace,
    config: &SolverConfig,
) -> AbsorptionOutcome {
    solve(matrix, space, None, config)
}

/// Same solve with one channel's row excluded from the transient set, for
/// removal-effect analysis.
pub fn conversion_probability_without(
    matrix: &TransitionMatrix,
    space: &StateSpace,
    excluded: usize,
    config: &SolverConfig,
) -> AbsorptionOutcome {
    solve(matrix, space, Some(excluded), config)
}

fn solve(
    matrix: &TransitionMatrix,
    space: &StateSpace,
    excluded: Option<usize>,
    config: &SolverConfig,
) -> AbsorptionOutcome {
    let n = space.len();
    let conversion = space.conversion();
    let null = space.null();

    let mut mass = vec![0.0; n];
    mass[space.start()] = 1.0;
    let mut absorbed_conversion = 0.0;
    let mut absorbed_null = 0.0;

    for iteration in 1..=config.max_iterations {
        let mut next = vec![0.0; n];

        for from in 0..n {
            if space.is_absorbing(from) || Some(from) == excluded {
                continue;
            }
            let m = mass[from];
            if m == 0.0 {
                continue;
            }
            for (to, &p) in matrix.row(from).iter().enumerate() {
                if p == 0.0 {
                    continue;
                }
                let flow = m * p;
                if to == conversion {
                    absorbed_conversion += flow;
                } else if to == null {
                    absorbed_null += flow;
                } else if Some(to) == excluded {
                    // Ablated state cannot be entered; the mass leaves the chain.
                } else {
                    next[to] += flow;
                }
            }
        }

        mass = next;
        let remaining: f64 = mass
            .iter()
            .enumerate()
            .filter(|&(i, _)| space.is_transient(i))
            .map(|(_, &m)| m)
            .sum();

        if remaining < config.epsilon {
            debug!(
                iterations = iteration,
                conversion = absorbed_conversion,
                null = absorbed_null,
                "absorption solve converged"
            );
            return AbsorptionOutcome {
                probability: absorbed_conversion.clamp(0.0, 1.0),
                converged: true,
                iterations: iteration,
            };
        }
    }

    debug!(
        max_iterations = config.max_iterations,
        conversion = absorbed_conversion,
        "absorption solve hit iteration cap"
    );
    AbsorptionOutcome {
        probability: absorbed_conversion.clamp(0.0, 1.0),
        converged: false,
        iterations: config.max_iterations,
    }
}
