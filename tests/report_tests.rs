use inspection_report::config::PipelineConfig;
use inspection_report::error::GenerationError;
use inspection_report::report::{generate_report, prepare_report, prepare_report_with_config};
use inspection_report::request::ReportRequest;
use inspection_report::requestor::ReportGenerator;
use inspection_report::sampler::SampleStrategy;

struct Echo;
impl ReportGenerator for Echo {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(format!("REPORT ({} chars)", prompt.len()))
    }
}

struct Down;
impl ReportGenerator for Down {
    fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Timeout { timeout_secs: 60 })
    }
}

fn example_request() -> ReportRequest {
    ReportRequest::from_json(
        r#"{"observations": [
            {"risk": "HIGH", "category": "Fire", "location": "A"},
            {"risk": "LOW", "category": "Fire", "location": "A"},
            {"risk": "medium", "category": "Slip", "location": "B"}
        ], "siteInfo": {"siteName": "Depot"}}"#,
    )
    .unwrap()
}

#[test]
fn prepares_statistics_sample_and_prompt() {
    let prepared = prepare_report(&example_request());
    let stats = serde_json::to_value(&prepared.statistics).unwrap();
    assert_eq!(stats["riskDistribution"], serde_json::json!({"HIGH": 1, "MEDIUM": 1, "LOW": 1}));
    assert_eq!(stats["topCategories"], serde_json::json!([["Fire", 2], ["Slip", 1]]));
    assert_eq!(stats["locationsAffected"], 2);
    assert!(prepared.recurring_issues.is_empty());
    assert_eq!(prepared.sample.strategy, SampleStrategy::Prioritized);
    assert_eq!(prepared.sample.size, 3);
    assert_eq!(prepared.sample.observations[0].category, "Fire");
    assert!(prepared.prompt.contains("Site: Depot"));
}

#[test]
fn statistics_cover_all_observations_not_just_the_sample() {
    let items: Vec<String> = (0..200)
        .map(|i| format!(r#"{{"risk": "{}", "category": "C{}", "location": "L{}"}}"#, if i < 30 { "HIGH" } else { "LOW" }, i % 7, i % 11))
        .collect();
    let body = format!(r#"{{"observations": [{}]}}"#, items.join(","));
    let req = ReportRequest::from_json(&body).unwrap();
    let cfg = PipelineConfig { sample_cap: 40, ..Default::default() };
    let prepared = prepare_report_with_config(&req, &cfg);
    assert_eq!(prepared.statistics.total_observations, 200);
    assert_eq!(prepared.statistics.risk_distribution.high, 30);
    assert_eq!(prepared.statistics.locations_affected, 11);
    assert!(prepared.sample.size <= 40);
    assert_eq!(prepared.sample.high_included, 30);
    assert!(!prepared.recurring_issues.is_empty());
    assert!(prepared.prompt.contains("showing 40 of 200"));
}

#[test]
fn generation_success_carries_report_and_statistics() {
    let resp = generate_report(&example_request(), &PipelineConfig::default(), &Echo);
    assert!(resp.report.as_deref().unwrap().starts_with("REPORT ("));
    assert!(resp.error.is_none());
    assert_eq!(resp.statistics.total_observations, 3);
}

#[test]
fn generation_failure_still_returns_statistics() {
    let resp = generate_report(&example_request(), &PipelineConfig::default(), &Down);
    assert!(resp.report.is_none());
    assert_eq!(resp.error.as_deref(), Some("generation service timed out after 60s"));
    assert_eq!(resp.statistics.risk_distribution.total(), 3);
    let json = serde_json::to_value(&resp).unwrap();
    assert!(json.get("report").is_none());
    assert!(json["generatedAt"].is_string());
}
