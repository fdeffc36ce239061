//! CLI entry point for the bank rater tool.
//!
//! Loads a monthly banking-metrics CSV and provides subcommands for the
//! weighted institution ranking and for the descriptive and filtered views
//! built on the same data.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bank_rater::analyzers::aggregate::aggregate;
use bank_rater::analyzers::score::Weights;
use bank_rater::{
    Metric, Record, ScoringConfig, output, parser::load_records, rank, stats, views,
};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bank_rater")]
#[command(about = "Rank banking institutions by weighted monthly metrics", long_about = None)]
struct Cli {
    /// CSV file with one row per institution and month
    #[arg(short, long, global = true, default_value = "tasas_bancos_completo.csv")]
    input: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank institutions by weighted composite score
    Rank {
        /// Override weights, e.g. "ActiveRate=0.2,ClientCount=0.2,..." (all six metrics)
        #[arg(short, long)]
        weights: Option<Weights>,

        /// CSV file to write the full ranking to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the ranking as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the monthly series of one metric for a single institution
    Institution {
        /// Institution name as written in the CSV
        name: String,

        #[arg(short, long, default_value = "MonthlyComplaints")]
        metric: Metric,
    },
    /// Show a sample of the most recent months
    Recent {
        /// Size of the trailing window in calendar months
        #[arg(short, long, default_value_t = 6)]
        months: u32,

        /// Number of rows to print
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
    /// Compare key metric averages across institutions
    Compare {
        /// Metrics to compare (defaults to rate, satisfaction and complaints)
        #[arg(short, long, value_delimiter = ',')]
        metrics: Vec<Metric>,
    },
    /// Correlations between metric averages across institutions
    Correlations,
    /// Monthly series of one metric for every institution
    Series {
        #[arg(short, long, default_value = "ActiveRate")]
        metric: Metric,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bank_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bank_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let records = load_records(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;

    match cli.command {
        Commands::Rank {
            weights,
            output,
            json,
        } => run_rank(&records, weights, output.as_deref(), json)?,
        Commands::Institution { name, metric } => {
            let rows = views::filter_institution(&records, &name);
            if rows.is_empty() {
                anyhow::bail!("no records for institution '{name}'");
            }
            println!("### Monthly {} - {} ###", metric.name(), name);
            print!("{}", output::render_records(&rows, &[metric])?);
        }
        Commands::Recent { months, limit } => {
            let rows = views::trailing_months(&records, months);
            info!(months, rows = rows.len(), "Trailing window selected");
            let sample: Vec<&Record> = rows.into_iter().take(limit).collect();
            println!("=== Last {months} months - sample ===");
            print!("{}", output::render_records(&sample, &[Metric::ActiveRate])?);
        }
        Commands::Compare { metrics } => {
            let metrics = if metrics.is_empty() {
                stats::COMPARISON_METRICS.to_vec()
            } else {
                metrics
            };
            let summaries = aggregate(&records)?;
            let rows = stats::comparison(&summaries, &metrics);
            print!("{}", output::render_comparison(&rows)?);
        }
        Commands::Correlations => {
            let summaries = aggregate(&records)?;
            if summaries.len() < 2 {
                warn!(institutions = summaries.len(), "Too few institutions to correlate");
            }
            let matrix = stats::correlation_matrix(&summaries);
            print!("{}", output::render_correlations(&matrix)?);
        }
        Commands::Series { metric } => {
            let series = views::metric_series(&records, metric);
            let range = views::metric_range(&records, metric);
            print!("{}", output::render_series(metric, &series, range)?);
        }
    }

    Ok(())
}

/// Ranks institutions and prints or exports the result.
#[tracing::instrument(skip(records, weights))]
fn run_rank(
    records: &[Record],
    weights: Option<Weights>,
    output_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = match weights {
        Some(weights) => ScoringConfig::default().with_weights(weights),
        None => ScoringConfig::default(),
    };

    let ranked = rank(records, &config)?;

    if json {
        println!("{}", output::to_json(&ranked)?);
    } else {
        print!("{}", output::render_ranking(&ranked)?);
    }

    if let Some(path) = output_path {
        output::write_ranking_csv(path, &ranked)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "Ranking written");
    }

    Ok(())
}
