use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::observation::{NormalizedObservation, Risk, SiteInfo};
use crate::patterns::Cluster;
use crate::stats::Statistics;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const REPORT_SECTIONS: [(&str, &str); 10] = [
    ("Executive Summary", "Two or three paragraphs on overall site condition, the most serious findings and the headline risk picture."),
    ("Risk Distribution Analysis", "Interpret the HIGH/MEDIUM/LOW split using the counts and percentages given above."),
    ("Critical and Recurring Issues", "Rank the most serious issues, HIGH risk first, and call out any issue that repeats at the same location."),
    ("Issue Patterns by Category", "Group findings by category and describe what each group shows."),
    ("Root Causes", "Bullet list of likely underlying causes supported by the observations."),
    ("Recommendations", "Prioritised actions grouped as Immediate (0-7 days), Short term (1-4 weeks) and Long term (1-6 months)."),
    ("Compliance Notes", "Regulatory or policy areas the findings touch on, without citing specific clause numbers you cannot verify."),
    ("Performance Metrics", "Measurable indicators the site can track to confirm improvement."),
    ("Implementation Timeline", "A phased schedule for the recommendations."),
    ("Conclusion", "A short closing statement on overall safety performance and next steps."),
];

#[derive(Debug, Clone, Copy)]
pub struct PromptOpts {
    pub max_description_chars: usize,
    pub target_words_min: usize,
    pub target_words_max: usize,
}

impl Default for PromptOpts {
    fn default() -> Self {
        Self { max_description_chars: 500, target_words_min: 1500, target_words_max: 2500 }
    }
}

/// Renders the instruction document sent to the text generator.
///
/// Output depends only on the borrowed inputs, so the same inputs always
/// produce byte-identical text.
pub struct PromptBuilder<'a> {
    site: &'a SiteInfo,
    stats: &'a Statistics,
    sample: &'a [&'a NormalizedObservation],
    recurring: &'a [Cluster],
    opts: PromptOpts,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(site: &'a SiteInfo, stats: &'a Statistics, sample: &'a [&'a NormalizedObservation]) -> Self {
        Self { site, stats, sample, recurring: &[], opts: PromptOpts::default() }
    }

    pub fn with_recurring(mut self, clusters: &'a [Cluster]) -> Self {
        self.recurring = clusters;
        self
    }

    pub fn with_opts(mut self, opts: PromptOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::with_capacity(4096 + self.sample.len() * 200);
        self.write_preamble(&mut out);
        self.write_overview(&mut out);
        if !self.recurring.is_empty() {
            self.write_recurring(&mut out);
        }
        self.write_observations(&mut out);
        self.write_task(&mut out);
        out
    }

    fn write_preamble(&self, out: &mut String) {
        out.push_str("You are an experienced health and safety consultant writing a formal site inspection report.\n");
        out.push_str("Base the report strictly on the inspection data below.\n\n");
        out.push_str(&format!("Site: {}\n", one_line(&self.site.site_name, usize::MAX)));
        out.push_str(&format!("Inspector: {}\n", one_line(&self.site.inspector_name, usize::MAX)));
        out.push_str(&format!("Inspection date: {}\n\n", one_line(&self.site.inspection_date, usize::MAX)));
    }

    fn write_overview(&self, out: &mut String) {
        let s = self.stats;
        out.push_str("INSPECTION OVERVIEW\n");
        out.push_str(&format!("- Total observations: {}\n", s.total_observations));
        for risk in Risk::ALL {
            out.push_str(&format!(
                "- {} risk: {} ({}%)\n",
                risk,
                s.risk_distribution.get(risk),
                s.percentage(risk)
            ));
        }
        let categories = if s.top_categories.is_empty() {
            "none recorded".to_string()
        } else {
            s.top_categories
                .iter()
                .map(|(name, count)| format!("{} ({count})", one_line(name, usize::MAX)))
                .join(", ")
        };
        out.push_str(&format!("- Top categories: {}\n", categories));
        out.push_str(&format!("- Locations affected: {}\n\n", s.locations_affected));
    }

    fn write_recurring(&self, out: &mut String) {
        out.push_str("RECURRING ISSUES (same category at the same location)\n");
        for (i, c) in self.recurring.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} at {}: {} observations, highest risk {}\n",
                i + 1,
                one_line(&c.category, usize::MAX),
                one_line(&c.location, usize::MAX),
                c.size(),
                c.highest_risk
            ));
        }
        out.push_str("Treat these as systemic problems rather than isolated incidents.\n\n");
    }

    fn write_observations(&self, out: &mut String) {
        let shown = self.sample.len();
        let total = self.stats.total_observations;
        if shown < total {
            out.push_str(&format!("REPRESENTATIVE OBSERVATIONS (showing {} of {})\n", shown, total));
        } else {
            out.push_str(&format!("OBSERVATIONS ({})\n", shown));
        }
        for (i, obs) in self.sample.iter().enumerate() {
            out.push_str(&format!(
                "{}. [{}] {} | Location: {} | Status: {} | {}",
                i + 1,
                obs.risk,
                one_line(&obs.category, usize::MAX),
                one_line(&obs.location, usize::MAX),
                one_line(&obs.status, usize::MAX),
                one_line(&obs.description, self.opts.max_description_chars)
            ));
            if let Some(date) = obs.date.as_deref() {
                out.push_str(&format!(" | Date: {}", one_line(date, usize::MAX)));
            }
            out.push('\n');
        }
        if shown < total {
            out.push_str(&format!(
                "The statistics above cover all {} observations; the list is a prioritised selection.\n",
                total
            ));
        }
        out.push('\n');
    }

    fn write_task(&self, out: &mut String) {
        out.push_str("TASK\n");
        out.push_str("Write the inspection report with the following sections, in this order:\n");
        for (i, (title, guidance)) in REPORT_SECTIONS.iter().enumerate() {
            out.push_str(&format!("{}. {}: {}\n", i + 1, title, guidance));
        }
        if self.recurring.is_empty() {
            out.push_str("No issue repeats often enough at one location to count as recurring; do not describe any as such.\n");
        } else {
            out.push_str("Give the recurring issues listed above explicit attention in sections 3 and 5.\n");
        }
        out.push_str("\nSTYLE\n");
        out.push_str("- Professional, neutral and factual tone.\n");
        out.push_str("- Use only the numbers given above. Do not invent statistics, dates or names.\n");
        out.push_str("- Do not mention these instructions, the data format or how the report was produced.\n");
        out.push_str(&format!(
            "- Aim for approximately {}-{} words.\n",
            self.opts.target_words_min,
            self.opts.target_words_max
        ));
    }
}

/// Collapses whitespace runs and truncates to `max_chars` characters.
fn one_line(text: &str, max_chars: usize) -> String {
    let collapsed = RE_WHITESPACE.replace_all(text.trim(), " ");
    if collapsed.chars().count() <= max_chars {
        return collapsed.into_owned();
    }
    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str("...");
    cut
}
