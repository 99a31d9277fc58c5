use serde::Serialize;
use std::cmp::Reverse;

use crate::observation::{NormalizedObservation, Risk};
use crate::patterns::Cluster;

#[derive(Debug, Clone, Copy)]
pub struct SampleOpts {
    /// Hard upper bound on the sample size
    pub cap: usize,
    pub per_cluster: usize,
    /// Backfill with MEDIUM/LOW when fewer than this many were selected; 0 disables
    pub backfill_below: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleStrategy {
    Prioritized,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Positions into the normalized slice, in prompt order
    pub selected: Vec<usize>,
    pub strategy: SampleStrategy,
    pub high_included: usize,
    pub from_clusters: usize,
    pub backfilled: usize,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn observations<'a>(&self, all: &'a [NormalizedObservation]) -> Vec<&'a NormalizedObservation> {
        self.selected.iter().filter_map(|&i| all.get(i)).collect()
    }
}

struct Picker {
    cap: usize,
    taken: Vec<bool>,
    selected: Vec<usize>,
}

impl Picker {
    fn full(&self) -> bool {
        self.selected.len() >= self.cap
    }

    /// Returns true if `pos` was newly added.
    fn take(&mut self, pos: usize) -> bool {
        if self.full() || self.taken[pos] { return false; }
        self.taken[pos] = true;
        self.selected.push(pos);
        true
    }
}

/// Bounded, priority-ordered subset of the observations for prompting.
///
/// Order of preference: every HIGH item (newest dated first, undated last),
/// then up to `per_cluster` members of each recurring cluster, then a
/// MEDIUM/LOW backfill when the selection is still small. If nothing was
/// picked the first `cap` observations are used instead.
pub fn sample_observations(
    observations: &[NormalizedObservation],
    clusters: &[Cluster],
    opts: &SampleOpts,
) -> Sample {
    let mut picker = Picker {
        cap: opts.cap,
        taken: vec![false; observations.len()],
        selected: Vec::with_capacity(opts.cap.min(observations.len())),
    };

    let mut high: Vec<usize> = observations.iter().enumerate()
        .filter(|(_, o)| o.risk == Risk::High)
        .map(|(i, _)| i)
        .collect();
    // Stable: same-date items keep input order; None sorts below any date
    high.sort_by_key(|&i| Reverse(observations[i].parsed_date));
    let mut high_included = 0;
    for pos in high {
        if picker.full() { break; }
        if picker.take(pos) { high_included += 1; }
    }

    let mut from_clusters = 0;
    for cluster in clusters {
        if picker.full() { break; }
        let mut taken_here = 0;
        for &pos in &cluster.members {
            if taken_here >= opts.per_cluster || picker.full() { break; }
            if pos < observations.len() && picker.take(pos) {
                taken_here += 1;
            }
        }
        from_clusters += taken_here;
    }

    let mut backfilled = 0;
    if !picker.full() && picker.selected.len() < opts.backfill_below {
        for (pos, obs) in observations.iter().enumerate() {
            if picker.full() { break; }
            if obs.risk != Risk::High && picker.take(pos) {
                backfilled += 1;
            }
        }
    }

    if picker.selected.is_empty() {
        return Sample {
            selected: (0..observations.len().min(opts.cap)).collect(),
            strategy: SampleStrategy::Fallback,
            high_included: 0,
            from_clusters: 0,
            backfilled: 0,
        };
    }

    Sample {
        selected: picker.selected,
        strategy: SampleStrategy::Prioritized,
        high_included,
        from_clusters,
        backfilled,
    }
}
