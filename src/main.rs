use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use drawcast::application::bootstrap::{PersistenceBootstrap, ServicesBootstrap};
use drawcast::application::ensemble::Ensemble;
use drawcast::application::services::{BacktestRequest, BacktestWindow, PredictionOutcome};
use drawcast::config::{AlgorithmEnvConfig, Config};
use drawcast::domain::cancellation::CancelFlag;
use drawcast::domain::lottery::GameType;
use drawcast::domain::ports::DrawSource;
use drawcast::domain::prediction::VotingPolicy;
use drawcast::infrastructure::sources::{generate_draws, write_draws};
use drawcast::infrastructure::{CsvDrawSource, LogPublisher, SyntheticDrawSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Lottery draw prediction and backtesting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Game variant (MEGA_6_45 or POWER_6_55)
    #[arg(short, long, default_value = "MEGA_6_45")]
    game: GameType,

    /// CSV export of past draws: sequence_index,observed_at,n1..n6[,jackpot,winners]
    #[arg(long, conflicts_with = "synthetic", required_unless_present = "synthetic")]
    input: Option<PathBuf>,

    /// Use N seeded synthetic draws instead of a CSV. Nothing is persisted.
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for synthetic draws
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the next draw with the algorithm ensemble
    Predict {
        #[command(flatten)]
        source: SourceArgs,

        /// Voting policy (weighted, majority, confidence_weighted)
        #[arg(long)]
        voting: Option<VotingPolicy>,
    },
    /// Walk-forward backtest of each algorithm
    Backtest {
        #[command(flatten)]
        source: SourceArgs,

        /// Algorithms to test (comma separated ids); defaults to ENABLED_ALGORITHMS
        #[arg(short, long)]
        algorithms: Option<String>,

        /// Scored rounds when testing the most recent draws
        #[arg(long)]
        test_size: Option<usize>,

        /// Draws used for training before the first scored round
        #[arg(long)]
        min_training: Option<usize>,

        /// Test the draws of the last N days instead of the last N draws
        #[arg(long, conflicts_with_all = ["from", "to"])]
        days: Option<i64>,

        /// Start of a custom test period (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End of a custom test period (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Write the report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write seeded synthetic draws as CSV
    Generate {
        /// Game variant (MEGA_6_45 or POWER_6_55)
        #[arg(short, long, default_value = "MEGA_6_45")]
        game: GameType,

        /// Number of draws
        #[arg(short, long, default_value_t = 300)]
        count: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Destination CSV file
        #[arg(short, long, default_value = "data/draws.csv")]
        output: PathBuf,
    },
}

fn parse_day(raw: &str, end_of_day: bool) -> anyhow::Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {} (expected YYYY-MM-DD)", raw))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .with_context(|| format!("Invalid date: {}", raw))
}

fn draw_source(args: &SourceArgs) -> anyhow::Result<Arc<dyn DrawSource>> {
    match (&args.input, args.synthetic) {
        (Some(path), _) => Ok(Arc::new(CsvDrawSource::new(path.clone()))),
        (None, Some(count)) => Ok(Arc::new(SyntheticDrawSource::new(count, args.seed))),
        (None, None) => anyhow::bail!("Either --input or --synthetic is required"),
    }
}

/// Flip the flag on Ctrl-C so long runs stop between rounds.
fn cancel_on_ctrl_c() -> CancelFlag {
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            flag.cancel();
        }
    });
    cancel
}

fn print_prediction(game: GameType, outcome: &PredictionOutcome) {
    let result = &outcome.result;
    println!("\n{} prediction: {}", game, result.final_numbers);
    println!(
        "Policy {} | consensus {:.2} | {} draws | {} algorithms | {:?}",
        result.voting_policy,
        result.consensus_score,
        outcome.draws_used,
        outcome.algorithms_used(),
        outcome.duration
    );
    for (contribution, prediction) in result.contributions.iter().zip(&result.predictions) {
        println!(
            "  {:<20} {}  weight {:.2}  confidence {:.2}  matches final {}",
            contribution.algorithm_id,
            prediction.numbers,
            contribution.weight,
            contribution.confidence,
            contribution.match_count_against_final
        );
    }
    if let Some(best) = Ensemble::best_algorithm(&result.contributions) {
        println!("Closest to final: {}", best.algorithm_id);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load config")?;

    match cli.command {
        Commands::Predict { source, voting } => {
            if let Some(policy) = voting {
                config.algorithms.voting_policy = policy;
            }
            let persistence = if source.synthetic.is_some() {
                PersistenceBootstrap::in_memory()
            } else {
                PersistenceBootstrap::init(&config.storage).await?
            };
            let services = ServicesBootstrap::init(
                &config,
                &persistence,
                draw_source(&source)?,
                Some(Arc::new(LogPublisher::new())),
            )?;

            let outcome = services
                .prediction_service
                .predict(source.game)
                .await
                .context("Prediction failed")?;
            print_prediction(source.game, &outcome);
        }
        Commands::Backtest {
            source,
            algorithms,
            test_size,
            min_training,
            days,
            from,
            to,
            output,
        } => {
            if let Some(raw) = &algorithms {
                config.algorithms.enabled_algorithms = AlgorithmEnvConfig::parse_algorithms(raw)
                    .context("Failed to parse --algorithms")?;
            }
            if let Some(size) = test_size {
                config.backtest.test_size = size;
            }
            if let Some(rounds) = min_training {
                config.backtest.min_training_rounds = rounds;
            }

            let window = match (days, from, to) {
                (Some(days), _, _) => BacktestWindow::LastDays(days),
                (None, Some(from), Some(to)) => {
                    BacktestWindow::Between(parse_day(&from, false)?, parse_day(&to, true)?)
                }
                _ => BacktestWindow::LastDraws(config.backtest.window()),
            };

            let persistence = if source.synthetic.is_some() {
                PersistenceBootstrap::in_memory()
            } else {
                PersistenceBootstrap::init(&config.storage).await?
            };
            let services =
                ServicesBootstrap::init(&config, &persistence, draw_source(&source)?, None)?;

            let requested: Vec<String> = config
                .algorithms
                .enabled_algorithms
                .iter()
                .map(|kind| kind.id().to_string())
                .collect();
            let request = BacktestRequest::new(source.game, window).with_algorithms(requested);
            let report = services
                .backtest_service
                .run_with_cancel(request, cancel_on_ctrl_c())
                .await
                .context("Backtest failed")?;

            println!("\n{}", report.render_table());
            if let Some(path) = output {
                report.write_json(&path)?;
                info!("Report written to {}", path.display());
            }
        }
        Commands::Generate {
            game,
            count,
            seed,
            output,
        } => {
            let draws = generate_draws(game, count, seed)?;
            write_draws(&output, &draws)?;
            println!("Wrote {} {} draws to {}", draws.len(), game, output.display());
        }
    }

    Ok(())
}
