use std::collections::HashMap;

use serde::Serialize;
use touchflow_core::{ChannelId, Journey};

/// Journeys sharing one exact touch sequence.
#[derive(Debug, Clone, Serialize)]
pub struct PathGroup {
    pub touches: Vec<ChannelId>,
    pub total: u64,
    pub conversions: u64,
    pub conversion_rate: f64,
}

/// Volume-sorted summary of the distinct paths in a journey set.
///
/// Reporting only; the summary never feeds back into attribution math.
#[derive(Debug, Clone, Serialize)]
pub struct PathSummary {
    groups: Vec<PathGroup>,
}

impl PathSummary {
    pub fn groups(&self) -> &[PathGroup] {
        &self.groups
    }

    /// The `n` highest-volume paths (fewer if the set is smaller).
    pub fn top(&self, n: usize) -> &[PathGroup] {
        &self.groups[..n.min(self.groups.len())]
    }
}

/// Group journeys by exact touch sequence. Sorted by volume, ties broken by
/// the sequence itself, so repeated runs produce identical output.
pub fn summarize(journeys: &[Journey]) -> PathSummary {
    let mut tallies: HashMap<&[ChannelId], (u64, u64)> = HashMap::new();
    for journey in journeys {
        let entry = tallies.entry(&journey.touches).or_insert((0, 0));
        entry.0 += 1;
        if journey.converted {
            entry.1 += 1;
        }
    }

    let mut groups: Vec<PathGroup> = tallies
        .into_iter()
        .map(|(touches, (total, conversions))| PathGroup {
            touches: touches.to_vec(),
            total,
            conversions,
            conversion_rate: conversions as f64 / total as f64,
        })
        .collect();

    groups.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.touches.cmp(&b.touches)));

    PathSummary { groups }
}
