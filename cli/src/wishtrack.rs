use clap::Parser;
use lib_common::analytics::{analyze, log_summary, AnalyticsSummary, ChartSink};
use lib_common::configs::config_app::load_config;
use lib_common::exports::report::{build_report, save_characters, save_report, save_wishes};
use lib_common::hoyo::aggregator::Aggregator;
use lib_common::hoyo::endpoints::{default_endpoints, Credentials};
use lib_common::hoyo::models::{characters_from_record, user_info_from_record, wishes_from_record};
use lib_common::loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions};
use lib_common::loggers::sink::{Level, LogSink};
use lib_common::retrieve::fetcher::{Fetcher, RetryPolicy};
use lib_common::retrieve::ky_http::RestClient;
use lib_common::utils::misc::format_duration;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Fetches a game account's statistics and wish history, analyzes them and
/// exports the results.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Queries the account APIs for the player profile, wish history, game record and daily-reward status, prints a wish analysis, and exports characters, wishes and a user report as JSON/CSV files. Endpoints that fail after retries degrade the run instead of aborting it."
)]
struct Args {
    /// Account session id (the ltuid cookie).
    #[arg(long, env = "WISHTRACK_LTUID")]
    ltuid: String,

    /// Account session token (the ltoken cookie).
    #[arg(long, env = "WISHTRACK_LTOKEN")]
    ltoken: String,

    /// The in-game account id.
    #[arg(long, env = "WISHTRACK_UID")]
    uid: String,

    /// Path to a configuration file. Defaults are used when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the exported files.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum fetch attempts per endpoint.
    #[arg(long)]
    max_retries: Option<u32>,

    /// First backoff delay in seconds.
    #[arg(long)]
    initial_delay: Option<u64>,

    /// Budget for the whole aggregation run, in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Item-ranking truncation for the textual summary.
    #[arg(long)]
    top_text: Option<usize>,

    /// Item-ranking truncation for the charts.
    #[arg(long)]
    top_chart: Option<usize>,

    /// Skip the terminal charts.
    #[arg(long)]
    no_charts: bool,

    /// Also write log records to a rotated file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Terminal renderer for the analytics summary.
struct TermCharts;

impl ChartSink for TermCharts {
    fn rarity_pie(&self, distribution: &BTreeMap<u8, usize>) {
        let total: usize = distribution.values().sum();
        if total == 0 {
            return;
        }
        println!("\nRarity Distribution in Wishes");
        for (rarity, count) in distribution {
            let share = *count as f64 * 100.0 / total as f64;
            println!("  {}*  {:>5.1}%  ({} pulls)", rarity, share, count);
        }
    }

    fn top_items_bars(&self, items: &[(String, usize)]) {
        let max = items.iter().map(|(_, c)| *c).max().unwrap_or(0);
        if max == 0 {
            return;
        }
        println!("\nTop {} Items Obtained", items.len());
        for (name, count) in items {
            let width = (count * 40 / max).max(1);
            println!("  {:<28} {} {}", name, "#".repeat(width), count);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let started = Instant::now();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(initial_delay) = args.initial_delay {
        config.initial_delay_secs = initial_delay;
    }
    if let Some(timeout) = args.timeout {
        config.aggregation_timeout_secs = timeout;
    }
    if let Some(top_text) = args.top_text {
        config.top_items_text = top_text;
    }
    if let Some(top_chart) = args.top_chart {
        config.top_items_chart = top_chart;
    }
    config.validate()?;

    let logger_options = LoggerLocalOptions {
        use_file: args.log_dir.as_ref().map(|_| {
            vec![
                Level::Debug,
                Level::Info,
                Level::Success,
                Level::Warning,
                Level::Error,
            ]
        }),
        log_dir: args.log_dir,
        ..LoggerLocalOptions::default()
    };
    let logger: Arc<dyn LogSink> =
        Arc::new(LoggerLocal::new("wishtrack".to_string(), Some(logger_options)));

    // Boundary validation is the only fatal failure class of a run.
    let credentials = Credentials {
        ltuid: args.ltuid,
        ltoken: args.ltoken,
        uid: args.uid,
    };
    if let Err(e) = credentials.validate() {
        logger.error(&format!("Error: {}", e));
        return Err(e.into());
    }

    let transport = Arc::new(RestClient::new(logger.clone()));
    let fetcher = Fetcher::new(
        transport,
        logger.clone(),
        RetryPolicy {
            max_retries: config.max_retries,
            initial_delay: config.initial_delay(),
        },
    );
    let aggregator = Aggregator::new(fetcher, logger.clone());

    let endpoints = default_endpoints(&credentials.uid);
    logger.info(&format!(
        "Querying {} endpoints for account {}",
        endpoints.len(),
        credentials.uid
    ));
    let record = aggregator
        .aggregate_within(&credentials, &endpoints, config.aggregation_timeout())
        .await;

    let wishes = wishes_from_record(&record, logger.as_ref());
    let characters = characters_from_record(&record, logger.as_ref());
    let user = user_info_from_record(&record, logger.as_ref());

    match analyze(&wishes, config.top_items_text) {
        Some(summary) => log_summary(&summary, logger.as_ref()),
        None => logger.warn("No wishes found. There may be an issue with retrieving the data."),
    }

    std::fs::create_dir_all(&config.output_dir)?;
    save_characters(&characters, &config.output_dir, logger.as_ref());
    save_wishes(&wishes, &config.output_dir, logger.as_ref());
    match build_report(user.as_ref(), &characters, &wishes) {
        Ok(report) => save_report(&report, &config.output_dir, logger.as_ref()),
        Err(e) => logger.error(&format!("Cannot build user report: {}", e)),
    }

    if !args.no_charts {
        if let Some(summary) = analyze(&wishes, config.top_items_chart) {
            render_charts(&summary, &TermCharts);
        }
    }

    logger.info(&format!(
        "Run finished in {}",
        format_duration(started.elapsed())
    ));
    Ok(())
}

/// Hands the summary to the chart sink. The summary is known non-empty
/// here; the sink owns everything about how it looks.
fn render_charts(summary: &AnalyticsSummary, charts: &dyn ChartSink) {
    charts.rarity_pie(&summary.rarity_distribution);
    charts.top_items_bars(&summary.top_items);
}
