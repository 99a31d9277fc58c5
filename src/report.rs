use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::observation::{normalize_all, NormalizedObservation, SiteInfo};
use crate::patterns::{cluster_observations, Cluster};
use crate::prompt::PromptBuilder;
use crate::request::ReportRequest;
use crate::requestor::ReportGenerator;
use crate::sampler::{sample_observations, SampleStrategy};
use crate::stats::{compute_statistics, Statistics};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringOut {
    pub category: String,
    pub location: String,
    pub count: usize,
    pub highest_risk: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleOut {
    pub strategy: SampleStrategy,
    pub size: usize,
    pub high_included: usize,
    pub from_clusters: usize,
    pub backfilled: usize,
    pub observations: Vec<NormalizedObservation>,
}

/// Everything the pipeline derives for one request, ready to hand to a generator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedReport {
    pub site_info: SiteInfo,
    pub statistics: Statistics,
    pub recurring_issues: Vec<RecurringOut>,
    pub sample: SampleOut,
    pub prompt: String,
}

/// Caller-facing result. Statistics are present even when generation fails.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generated_at: String,
}

pub fn prepare_report(request: &ReportRequest) -> PreparedReport {
    prepare_report_with_config(request, &PipelineConfig::default())
}

/// Runs normalize → aggregate/cluster → sample → assemble over one request.
pub fn prepare_report_with_config(request: &ReportRequest, config: &PipelineConfig) -> PreparedReport {
    let normalized = normalize_all(request.observations());
    let statistics = compute_statistics(&normalized, config.top_category_limit);
    let clusters = cluster_observations(&normalized, config.recurring_threshold);
    if clusters.is_empty() {
        warn!(threshold = config.recurring_threshold, "no recurring clusters; prompt omits repetition emphasis");
    }

    let sample = sample_observations(&normalized, &clusters, &config.sample_opts());
    if sample.strategy == SampleStrategy::Fallback {
        warn!(size = sample.len(), "no observation matched sampling priorities; using input prefix");
    }
    debug!(
        total = statistics.total_observations,
        clusters = clusters.len(),
        sampled = sample.len(),
        high = sample.high_included,
        from_clusters = sample.from_clusters,
        backfilled = sample.backfilled,
        "pipeline stages complete"
    );

    let sampled = sample.observations(&normalized);
    let prompt = PromptBuilder::new(&request.site, &statistics, &sampled)
        .with_recurring(&clusters)
        .with_opts(config.prompt_opts())
        .build();

    PreparedReport {
        site_info: request.site.clone(),
        recurring_issues: clusters.iter().map(recurring_out).collect(),
        sample: SampleOut {
            strategy: sample.strategy,
            size: sample.len(),
            high_included: sample.high_included,
            from_clusters: sample.from_clusters,
            backfilled: sample.backfilled,
            observations: sampled.into_iter().cloned().collect(),
        },
        statistics,
        prompt,
    }
}

/// Prepares the prompt and asks `generator` for the report text.
pub fn generate_report(
    request: &ReportRequest,
    config: &PipelineConfig,
    generator: &dyn ReportGenerator,
) -> ReportResponse {
    let prepared = prepare_report_with_config(request, config);
    info!(
        site = %prepared.site_info.site_name,
        prompt_chars = prepared.prompt.len(),
        "requesting report generation"
    );
    let (report, error) = match generator.generate(&prepared.prompt) {
        Ok(text) => (Some(text), None),
        Err(e) => {
            warn!(error = %e, "report generation failed; returning statistics only");
            (None, Some(e.to_string()))
        }
    };
    ReportResponse {
        report,
        statistics: prepared.statistics,
        error,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

fn recurring_out(c: &Cluster) -> RecurringOut {
    RecurringOut {
        category: c.category.clone(),
        location: c.location.clone(),
        count: c.size(),
        highest_risk: c.highest_risk.to_string(),
    }
}
