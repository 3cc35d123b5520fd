//  ██████╗██╗████████╗ █████╗ ████████╗██╗ ██████╗ ███╗   ██╗
// ██╔════╝██║╚══██╔══╝██╔══██╗╚══██╔══╝██║██╔═══██╗████╗  ██║
// ██║     ██║   ██║   ███████║   ██║   ██║██║   ██║██╔██╗ ██║
// ██║     ██║   ██║   ██╔══██║   ██║   ██║██║   ██║██║╚██╗██║
// ╚██████╗██║   ██║   ██║  ██║   ██║   ██║╚██████╔╝██║ ╚████║
//  ╚═════╝╚═╝   ╚═╝   ╚═╝  ╚═╝   ╚═╝   ╚═╝ ╚═════╝ ╚═╝  ╚═══╝
//
// R A D A R
//
// Feed it what the chatbots said. It tells you whether they said our name.

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use citation_radar_engine::config::{Config, RunMode};
use citation_radar_engine::pipeline::{forward_shutdown, BatchRunner};
use citation_radar_engine::{KeywordSet, QueryVariationGenerator, ScheduleEntry};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleReport {
    schedule: Vec<ScheduleEntry>,
    high_priority_queries: Vec<String>,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(true).init();
    }
}

fn print_banner() {
    eprintln!(
        r#"
    ╔══════════════════════════════════════════════════════════╗
    ║   📡 CITATION RADAR                                      ║
    ║   Who do the AI models recommend in Kurdistan logistics? ║
    ║   Models:    ChatGPT | Google AI | Perplexity            ║
    ║   Languages: English | العربية | کوردی | فارسی            ║
    ╚══════════════════════════════════════════════════════════╝
    "#
    );
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

async fn read_input(config: &Config) -> Result<String> {
    if config.reads_stdin() {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("failed to read batch from stdin")?;
        Ok(raw)
    } else {
        tokio::fs::read_to_string(&config.input)
            .await
            .with_context(|| format!("failed to read batch from {}", config.input))
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let mode_arg = std::env::args().nth(1);
    let config = Config::from_env()
        .and_then(|c| c.with_mode_arg(mode_arg.as_deref()))
        .context("invalid configuration")?;

    init_tracing(config.log_json);
    print_banner();

    info!(
        mode = %config.mode,
        input = %config.input,
        language = %config.language,
        default_model = %config.default_model,
        "Citation radar starting"
    );

    let keywords = KeywordSet::shared();

    match config.mode {
        RunMode::Variations => {
            let query = config
                .query
                .as_deref()
                .context("variations mode needs CITATION_RADAR_QUERY")?;
            let set = QueryVariationGenerator::new(keywords).generate_variations(query);
            info!(total_queries = set.total_queries, "Variations generated");
            return emit(&set, config.pretty);
        }
        RunMode::Schedule => {
            let generator = QueryVariationGenerator::new(keywords);
            let report = ScheduleReport {
                schedule: generator.generate_monitoring_schedule(),
                high_priority_queries: generator.get_high_priority_queries(),
            };
            return emit(&report, config.pretty);
        }
        RunMode::Landscape | RunMode::Metrics | RunMode::Detect => {}
    }

    let raw = read_input(&config).await?;
    let runner = BatchRunner::new(&config, keywords).context("failed to build batch runner")?;
    let metrics = runner.metrics();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(signal::ctrl_c(), shutdown_tx));

    let output = runner.run(&raw, shutdown_rx).await;

    let snapshot = metrics.snapshot();
    info!(
        analyzed = snapshot.responses_analyzed,
        cited = snapshot.citations_detected,
        weak = snapshot.weak_citations,
        competitors = snapshot.competitor_mentions,
        rejected = snapshot.records_rejected,
        per_second = format!("{:.1}", snapshot.responses_per_second),
        "Run metrics"
    );

    let output = output.context("batch run failed")?;
    emit(&output, config.pretty)
}
