use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use feed::{ResultSync, load_format, open_feed};
use storage::{Database, PgPredictionStore};
use tournament::{
    MemoryStore, PoolService, PredictionStore, Scope, TournamentFormat, validation::FormatValidator,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "porra-feed")]
#[command(about = "World Cup prediction pool: official results feed", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Tournament format JSON. Defaults to the embedded World Cup 2026 format.
    #[arg(long, env = "TOURNAMENT_FORMAT")]
    format: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a tournament format document
    Validate { file: PathBuf },
    /// Pull official results and write them to the official scope
    Sync {
        /// Results JSON file or http(s) URL
        #[arg(long)]
        results: String,
    },
    /// Print the group tables of a scope
    Standings {
        #[arg(long, default_value = "official")]
        scope: String,
    },
    /// Print the leaderboard
    Leaderboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "porra_feed={},feed={},tournament={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &cli.command {
        Commands::Validate { file } => handle_validate(file).await?,
        Commands::Sync { results } => {
            let pool = open_pool(&cli).await?;
            handle_sync(&pool, results).await?;
        }
        Commands::Standings { scope } => {
            let pool = open_pool(&cli).await?;
            handle_standings(&pool, scope).await?;
        }
        Commands::Leaderboard => {
            let pool = open_pool(&cli).await?;
            handle_leaderboard(&pool).await?;
        }
    }

    Ok(())
}

async fn open_pool(cli: &Cli) -> Result<PoolService, Box<dyn std::error::Error>> {
    let format = load_format(cli.format.as_deref())?;
    tracing::info!("Using format '{}'", format.name);

    let store: Arc<dyn PredictionStore> = match cli.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::new(database_url).await?;
            db.run_migrations().await?;
            Arc::new(PgPredictionStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using an empty in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(PoolService::new(format, store)?)
}

async fn handle_validate(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Loading format from: {}", file.display());

    let json = tokio::fs::read_to_string(file).await?;
    let format: TournamentFormat = serde_json::from_str(&json)?;

    tracing::info!(
        "Loaded format: {} ({} groups, {} knockout rounds)",
        format.name,
        format.groups.len(),
        format.knockout.rounds.len()
    );

    let report = FormatValidator::validate(&format)?;
    report.log_warnings();
    tracing::info!(
        "✓ Validation successful ({} warning(s))",
        report.warnings.len()
    );

    Ok(())
}

async fn handle_sync(pool: &PoolService, source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let feed = open_feed(source)?;
    tracing::info!("Fetching official results from {}", feed.describe());

    let document = feed.fetch().await?;
    if let Some(updated_at) = document.updated_at {
        tracing::info!("Feed last updated at {}", updated_at);
    }
    tracing::info!("Received {} result(s)", document.results.len());

    let report = ResultSync::new(pool).apply(&document).await?;
    if report.rejected > 0 {
        return Err(format!("{} result(s) rejected", report.rejected).into());
    }

    Ok(())
}

async fn handle_standings(pool: &PoolService, scope: &str) -> Result<(), Box<dyn std::error::Error>> {
    let scope: Scope = scope.parse()?;

    for table in pool.group_tables(&scope).await? {
        let status = if table.is_complete() {
            "complete".to_string()
        } else {
            format!("{}/{}", table.played_matches, table.expected_matches)
        };
        println!("Group {} ({})", table.group, status);
        for row in &table.rows {
            println!(
                "  {:>2}. {:<24} {:>2} {:>2} {:>2} {:>2} {:>3}:{:<3} {:>+4} {:>3}",
                row.position,
                row.team,
                row.played,
                row.wins,
                row.draws,
                row.losses,
                row.goals_for,
                row.goals_against,
                row.goal_difference,
                row.points
            );
        }
    }

    Ok(())
}

async fn handle_leaderboard(pool: &PoolService) -> Result<(), Box<dyn std::error::Error>> {
    let leaderboard = pool.leaderboard().await?;
    if leaderboard.is_empty() {
        tracing::warn!("No participants registered");
        return Ok(());
    }

    for entry in leaderboard {
        println!(
            "{:>3}. {:<32} {:>4} pts ({} exact)",
            entry.position, entry.name, entry.total, entry.exact_hits
        );
    }

    Ok(())
}
