use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::observation::{NormalizedObservation, Risk};

/// Per-level counts. All three buckets are always reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    #[serde(rename = "HIGH")]
    pub high: usize,
    #[serde(rename = "MEDIUM")]
    pub medium: usize,
    #[serde(rename = "LOW")]
    pub low: usize,
}

impl RiskDistribution {
    pub fn get(&self, risk: Risk) -> usize {
        match risk {
            Risk::High => self.high,
            Risk::Medium => self.medium,
            Risk::Low => self.low,
        }
    }

    fn bump(&mut self, risk: Risk) {
        match risk {
            Risk::High => self.high += 1,
            Risk::Medium => self.medium += 1,
            Risk::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_observations: usize,
    pub risk_distribution: RiskDistribution,
    /// (category, count), most frequent first
    pub top_categories: Vec<(String, usize)>,
    pub locations_affected: usize,
}

impl Statistics {
    /// Share of all observations in `risk`, as a whole percentage.
    pub fn percentage(&self, risk: Risk) -> u32 {
        percentage(self.risk_distribution.get(risk), self.total_observations)
    }
}

/// round(count / total * 100); 0 when total is 0.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 { return 0; }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

/// Statistics over every observation in the request. Callers pass the full
/// normalized set, never the sampled subset.
pub fn compute_statistics(observations: &[NormalizedObservation], top_limit: usize) -> Statistics {
    let mut risk_distribution = RiskDistribution::default();
    // Insertion-ordered counts: position in `categories` is first-seen order
    let mut category_slots: AHashMap<&str, usize> = AHashMap::new();
    let mut categories: Vec<(String, usize)> = Vec::new();
    let mut locations: AHashSet<&str> = AHashSet::new();

    for obs in observations {
        risk_distribution.bump(obs.risk);

        match category_slots.get(obs.category.as_str()) {
            Some(&slot) => categories[slot].1 += 1,
            None => {
                category_slots.insert(obs.category.as_str(), categories.len());
                categories.push((obs.category.clone(), 1));
            }
        }

        if !obs.location.is_empty() {
            locations.insert(obs.location.as_str());
        }
    }

    // sort_by is stable, so equal counts keep first-seen order
    categories.sort_by(|a, b| b.1.cmp(&a.1));
    categories.truncate(top_limit);

    Statistics {
        total_observations: observations.len(),
        risk_distribution,
        top_categories: categories,
        locations_affected: locations.len(),
    }
}
