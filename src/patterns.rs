use ahash::AHashMap;
use serde::Serialize;

use crate::observation::{NormalizedObservation, Risk};

/// Observations sharing the exact same (category, location) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub category: String,
    pub location: String,
    /// Positions in the normalized slice, in original order
    pub members: Vec<usize>,
    pub highest_risk: Risk,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Recurring clusters: groups with at least `threshold` members, largest
/// first. Equal sizes keep the order in which their key was first seen.
pub fn cluster_observations(observations: &[NormalizedObservation], threshold: usize) -> Vec<Cluster> {
    let mut slots: AHashMap<(&str, &str), usize> = AHashMap::new();
    let mut groups: Vec<Cluster> = Vec::new();

    for (pos, obs) in observations.iter().enumerate() {
        let key = (obs.category.as_str(), obs.location.as_str());
        match slots.get(&key) {
            Some(&slot) => {
                let group = &mut groups[slot];
                group.members.push(pos);
                // Risk orders High < Medium < Low
                group.highest_risk = group.highest_risk.min(obs.risk);
            }
            None => {
                slots.insert(key, groups.len());
                groups.push(Cluster {
                    category: obs.category.clone(),
                    location: obs.location.clone(),
                    members: vec![pos],
                    highest_risk: obs.risk,
                });
            }
        }
    }

    groups.retain(|g| g.size() >= threshold);
    groups.sort_by(|a, b| b.size().cmp(&a.size()));
    groups
}
