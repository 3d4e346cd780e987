use serde::Serialize;

/// Dense row-major transition matrix over a state space.
///
/// After training, every non-absorbing row sums to 1 within tolerance or is
/// identically zero (a state that was never left). Absorbing rows are
/// explicit self-loops with probability 1. A built matrix is never mutated;
/// retraining produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransitionMatrix {
    rows: Vec<Vec<f64>>,
}

impl TransitionMatrix {
    /// All-zero n×n matrix.
    pub fn zero(n: usize) -> Self {
        Self {
            rows: vec![vec![0.0; n]; n],
        }
    }

    /// Number of states (the matrix is square).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.rows[from][to]
    }

    pub fn set(&mut self, from: usize, to: usize, p: f64) {
        self.rows[from][to] = p;
    }

    pub fn add(&mut self, from: usize, to: usize, p: f64) {
        self.rows[from][to] += p;
    }

    /// Probabilities out of one state.
    pub fn row(&self, from: usize) -> &[f64] {
        &self.rows[from]
    }

    pub fn row_sum(&self, from: usize) -> f64 {
        self.rows[from].iter().sum()
    }
}
