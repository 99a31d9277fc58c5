use inspection_report::observation::{normalize, normalize_all, Observation, Risk};

fn raw(risk: Option<&str>, category: Option<&str>, location: Option<&str>) -> Observation {
    Observation {
        risk: risk.map(String::from),
        category: category.map(String::from),
        location: location.map(String::from),
        ..Default::default()
    }
}

#[test]
fn empty_observation_gets_defaults() {
    let n = normalize(0, &Observation::default());
    assert_eq!(n.risk, Risk::Medium);
    assert_eq!(n.category, "Unknown");
    assert_eq!(n.location, "Unknown location");
    assert_eq!(n.status, "Not specified");
    assert_eq!(n.description, "No description provided");
    assert!(n.date.is_none());
    assert!(n.parsed_date.is_none());
}

#[test]
fn risk_is_case_insensitive_and_unknown_becomes_medium() {
    assert_eq!(Risk::from_raw(Some("high")), Risk::High);
    assert_eq!(Risk::from_raw(Some(" Low ")), Risk::Low);
    assert_eq!(Risk::from_raw(Some("medium")), Risk::Medium);
    assert_eq!(Risk::from_raw(Some("critical")), Risk::Medium);
    assert_eq!(Risk::from_raw(Some("")), Risk::Medium);
    assert_eq!(Risk::from_raw(None), Risk::Medium);
}

#[test]
fn present_values_are_kept_literally() {
    let n = normalize(4, &raw(Some("LOW"), Some("Fire Safety"), Some("Site A ")));
    assert_eq!(n.index, 4);
    assert_eq!(n.category, "Fire Safety");
    assert_eq!(n.location, "Site A ");
}

#[test]
fn lenient_fields_from_json() {
    let o: Observation = serde_json::from_str(
        r#"{"risk": null, "category": 42, "location": "   ", "status": true, "description": {"x": 1}, "date": "2024-02-01", "extra": "ignored"}"#,
    ).unwrap();
    let n = normalize(0, &o);
    assert_eq!(n.risk, Risk::Medium);
    assert_eq!(n.category, "42");
    assert_eq!(n.location, "Unknown location");
    assert_eq!(n.status, "true");
    assert_eq!(n.description, "No description provided");
    assert_eq!(n.date.as_deref(), Some("2024-02-01"));
    assert!(n.parsed_date.is_some());
}

#[test]
fn normalize_all_preserves_order_and_indices() {
    let input = vec![raw(Some("HIGH"), None, None), raw(None, Some("Slip"), None)];
    let out = normalize_all(&input);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].index, 0);
    assert_eq!(out[0].risk, Risk::High);
    assert_eq!(out[1].index, 1);
    assert_eq!(out[1].category, "Slip");
}
