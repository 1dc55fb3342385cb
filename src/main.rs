use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use club_league::config::{self, AppConfig, Weights};
use club_league::models::RankingRun;
use club_league::pipeline::{self, InputSources};
use club_league::report;
use club_league::sentiment::LexiconScorer;

#[derive(Parser)]
#[command(name = "club-league")]
#[command(about = "Ranks student clubs from survey, chat and event activity", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Survey responses CSV
    #[arg(long)]
    survey: Option<PathBuf>,
    /// Event log CSV
    #[arg(long)]
    events: Option<PathBuf>,
    /// Chat exports, one file per club named after the club
    #[arg(long, num_args = 1..)]
    chat: Vec<PathBuf>,
    /// Ignore dated events before this day (YYYY-MM-DD)
    #[arg(long)]
    events_since: Option<NaiveDate>,
    /// JSON file with weights and category keywords
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    weights: WeightArgs,
}

#[derive(Args)]
struct WeightArgs {
    #[arg(long)]
    w_awareness: Option<f64>,
    #[arg(long)]
    w_participation: Option<f64>,
    #[arg(long)]
    w_sentiment: Option<f64>,
    #[arg(long)]
    w_messages: Option<f64>,
    #[arg(long)]
    w_events: Option<f64>,
}

impl WeightArgs {
    fn apply(&self, base: Weights) -> Weights {
        Weights {
            awareness: self.w_awareness.unwrap_or(base.awareness),
            participation: self.w_participation.unwrap_or(base.participation),
            sentiment: self.w_sentiment.unwrap_or(base.sentiment),
            message_activity: self.w_messages.unwrap_or(base.message_activity),
            event_count: self.w_events.unwrap_or(base.event_count),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the league table and category winners
    Rank {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Emit the full table as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown league report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value_t = 25)]
        limit: usize,
        #[arg(long, default_value = "league-report.md")]
        out: PathBuf,
    },
    /// Write the league table and winners as CSV files
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,
    },
    /// Show the category assigned to each club
    Classify {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn execute(input: &InputArgs) -> anyhow::Result<RankingRun> {
    let app_config = match &input.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    let taxonomy = app_config.taxonomy()?;
    let weights = input
        .weights
        .apply(app_config.weights.unwrap_or_default())
        .validated()
        .context("invalid combiner weights")?;

    let inputs = pipeline::gather(InputSources {
        survey: input.survey.clone(),
        events: input.events.clone(),
        chats: input.chat.clone(),
        events_since: input.events_since,
    })
    .await?;

    let run = pipeline::run(&inputs, &taxonomy, weights, &LexiconScorer)?;
    Ok(run)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Rank { input, limit, json } => {
            let run = execute(&input).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&run.table)?);
                return Ok(());
            }
            if run.table.is_empty() {
                println!("No clubs found in the supplied inputs.");
                return Ok(());
            }

            println!("League table:");
            for entry in run.table.iter().take(limit) {
                println!(
                    "{:>3}. {} ({}) score {:.3}",
                    entry.rank, entry.club_name, entry.category, entry.overall_score
                );
            }
            println!();
            println!("Category winners:");
            for winner in &run.winners {
                println!(
                    "- {}: {} ({:.3})",
                    winner.category, winner.entry.club_name, winner.entry.overall_score
                );
            }
        }
        Commands::Report { input, limit, out } => {
            let run = execute(&input).await?;
            let report = report::build_report(&run, limit);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { input, out_dir } => {
            let run = execute(&input).await?;
            let (table, winners) = report::export_csv(&run, &out_dir)?;
            println!(
                "Wrote {} clubs to {} and {} winners to {}.",
                run.table.len(),
                table.display(),
                run.winners.len(),
                winners.display()
            );
        }
        Commands::Classify { input } => {
            let run = execute(&input).await?;
            let mut clubs = run.clubs;
            clubs.sort_by_key(|c| c.key());
            for club in &clubs {
                println!(
                    "{} -> {} ({} survey responses, {} participants in chat)",
                    club.name,
                    club.category,
                    club.survey_responses,
                    club.participant_count.map_or_else(|| "no".to_string(), |n| n.to_string())
                );
            }
        }
    }

    Ok(())
}
