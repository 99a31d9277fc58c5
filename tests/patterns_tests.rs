use inspection_report::observation::{normalize_all, Observation, Risk};
use inspection_report::patterns::cluster_observations;

fn obs(risk: &str, category: &str, location: &str) -> Observation {
    Observation {
        risk: Some(risk.to_string()),
        category: Some(category.to_string()),
        location: Some(location.to_string()),
        ..Default::default()
    }
}

#[test]
fn three_matching_observations_form_one_cluster() {
    let raw = vec![
        obs("LOW", "Lighting", "Site A"),
        obs("HIGH", "Lighting", "Site A"),
        obs("LOW", "Lighting", "Site B"),
        obs("MEDIUM", "Lighting", "Site A"),
    ];
    let clusters = cluster_observations(&normalize_all(&raw), 3);
    assert_eq!(clusters.len(), 1);
    let c = &clusters[0];
    assert_eq!(c.category, "Lighting");
    assert_eq!(c.location, "Site A");
    assert_eq!(c.size(), 3);
    assert_eq!(c.members, vec![0, 1, 3]);
    assert_eq!(c.highest_risk, Risk::High);
}

#[test]
fn matching_is_exact_and_case_sensitive() {
    let raw = vec![
        obs("LOW", "Lighting", "Site A"),
        obs("LOW", "lighting", "Site A"),
        obs("LOW", "Lighting", "site a"),
    ];
    assert!(cluster_observations(&normalize_all(&raw), 3).is_empty());
}

#[test]
fn defaulted_fields_cluster_together() {
    let raw = vec![Observation::default(), Observation::default(), Observation::default()];
    let clusters = cluster_observations(&normalize_all(&raw), 3);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].category, "Unknown");
    assert_eq!(clusters[0].location, "Unknown location");
    assert_eq!(clusters[0].highest_risk, Risk::Medium);
}

#[test]
fn clusters_ordered_by_size_then_first_seen() {
    let mut raw = Vec::new();
    for _ in 0..3 { raw.push(obs("LOW", "Housekeeping", "Dock")); }
    for _ in 0..5 { raw.push(obs("LOW", "PPE", "Gate")); }
    for _ in 0..3 { raw.push(obs("LOW", "Signage", "Dock")); }
    raw.push(obs("LOW", "Other", "Dock"));
    let clusters = cluster_observations(&normalize_all(&raw), 3);
    let keys: Vec<(&str, usize)> = clusters.iter().map(|c| (c.category.as_str(), c.size())).collect();
    assert_eq!(keys, vec![("PPE", 5), ("Housekeeping", 3), ("Signage", 3)]);
}

#[test]
fn threshold_is_configurable() {
    let raw = vec![obs("LOW", "a", "b"), obs("LOW", "a", "b"), obs("LOW", "c", "d")];
    let normalized = normalize_all(&raw);
    assert!(cluster_observations(&normalized, 3).is_empty());
    assert_eq!(cluster_observations(&normalized, 2).len(), 1);
    assert_eq!(cluster_observations(&normalized, 1).len(), 2);
}
