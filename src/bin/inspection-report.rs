use anyhow::Context;
use clap::Parser;
use rayon::prelude::*;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

use inspection_report::config::{ConfigOverrides, GeneratorConfig, PipelineConfig};
use inspection_report::report::{generate_report, prepare_report_with_config};
use inspection_report::request::ReportRequest;
use inspection_report::requestor::{ChatCompletionsGenerator, ReportGenerator};

fn init_parallelism() {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = num_cpus::get();
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("inspection_report=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Parser, Debug)]
#[command(name = "inspection-report", version, about = "Safety inspection statistics and report prompts")]
struct Cli {
    /// Request files (`-` for stdin). May be repeated.
    #[arg(required = false)]
    input: Vec<String>,

    /// Print only a specific section: stats | clusters | sample | prompt
    #[arg(long = "only")]
    only: Option<String>,

    /// Send the prompt to the generation service and print its response
    #[arg(long = "generate", default_value_t = false, conflicts_with = "only")]
    generate: bool,

    /// TOML file with pipeline settings
    #[arg(long = "config")]
    config: Option<PathBuf>,

    #[arg(long = "sample-cap")] sample_cap: Option<usize>,
    #[arg(long = "cluster-threshold")] cluster_threshold: Option<usize>,
    #[arg(long = "top-categories")] top_categories: Option<usize>,
    #[arg(long = "per-cluster")] per_cluster: Option<usize>,
    #[arg(long = "backfill-below")] backfill_below: Option<usize>,

    /// Compact single-line JSON instead of pretty output
    #[arg(long = "compact", default_value_t = false)]
    compact: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let overrides = ConfigOverrides {
        sample_cap: cli.sample_cap,
        recurring_threshold: cli.cluster_threshold,
        top_category_limit: cli.top_categories,
        per_cluster_samples: cli.per_cluster,
        backfill_below: cli.backfill_below,
    };
    let cfg = PipelineConfig::load(cli.config.as_deref(), |k| std::env::var(k).ok(), &overrides)
        .with_context(|| match &cli.config {
            Some(path) => format!("loading configuration from {}", path.display()),
            None => "loading configuration".to_string(),
        })?;
    Ok(cfg)
}

fn read_input(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut s = String::new();
        io::stdin().lock().read_to_string(&mut s)?;
        Ok(s)
    } else {
        std::fs::read_to_string(path)
    }
}

fn to_json<T: serde::Serialize>(v: &T, compact: bool) -> serde_json::Result<String> {
    if compact { serde_json::to_string(v) } else { serde_json::to_string_pretty(v) }
}

fn render(
    path: &str,
    cli: &Cli,
    cfg: &PipelineConfig,
    generator: Option<&dyn ReportGenerator>,
) -> anyhow::Result<String> {
    let body = read_input(path).with_context(|| format!("reading {path}"))?;
    let request = ReportRequest::from_json(&body).with_context(|| format!("invalid request in {path}"))?;

    if let Some(generator) = generator {
        let resp = generate_report(&request, cfg, generator);
        return Ok(to_json(&resp, cli.compact)?);
    }

    let prepared = prepare_report_with_config(&request, cfg);
    let out = match cli.only.as_deref() {
        Some("stats") => to_json(&prepared.statistics, cli.compact)?,
        Some("clusters") => to_json(&prepared.recurring_issues, cli.compact)?,
        Some("sample") => to_json(&prepared.sample, cli.compact)?,
        Some("prompt") => prepared.prompt,
        Some(other) => anyhow::bail!("unknown section {other:?}; expected stats, clusters, sample or prompt"),
        None => to_json(&prepared, cli.compact)?,
    };
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_logging();
    init_parallelism();
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    let generator = if cli.generate {
        let gen_cfg = GeneratorConfig::from_env()?;
        Some(ChatCompletionsGenerator::new(gen_cfg)?)
    } else {
        None
    };
    let generator_ref: Option<&dyn ReportGenerator> = generator.as_ref().map(|g| g as &dyn ReportGenerator);

    // Default to stdin if no input specified
    let inputs = if cli.input.is_empty() { vec!["-".to_string()] } else { cli.input.clone() };

    // Each request is independent; results are printed in input order
    let results: Vec<anyhow::Result<String>> = inputs
        .par_iter()
        .map(|p| render(p, &cli, &cfg, generator_ref))
        .collect();

    let mut failed = 0usize;
    for (path, res) in inputs.iter().zip(results) {
        match res {
            Ok(text) => println!("{text}"),
            Err(e) => {
                failed += 1;
                tracing::error!(input = %path, "{e:#}");
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} input(s) failed", inputs.len());
    }
    Ok(())
}
