use std::sync::Arc;

use anyhow::Context;
use storage::{Database, PgPredictionStore};
use tournament::{MemoryStore, PoolService, PredictionStore, TournamentFormat};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod routes;

use config::Config;
use features::{bracket, leaderboard, participants, predictions, standings};
use middleware::auth::ApiKeys;

#[derive(OpenApi)]
#[openapi(
    paths(
        participants::handlers::list_participants,
        participants::handlers::create_participant,
        participants::handlers::get_participant_score,
        standings::handlers::list_group_tables,
        standings::handlers::get_qualification,
        bracket::handlers::get_bracket,
        bracket::handlers::generate_round,
        bracket::handlers::get_slot,
        bracket::handlers::record_winner,
        bracket::handlers::clear_winner,
        predictions::handlers::submit_result,
        predictions::handlers::clear_result,
        predictions::handlers::reset_scope,
        leaderboard::handlers::get_leaderboard,
        leaderboard::handlers::list_exact_hitters,
        leaderboard::handlers::get_format,
    ),
    components(
        schemas(
            storage::dto::participant::CreateParticipantRequest,
            storage::dto::participant::ParticipantResponse,
            storage::dto::prediction::SubmitResultRequest,
            storage::dto::prediction::RecordWinnerRequest,
            storage::dto::prediction::ScoreResponse,
            storage::dto::prediction::ClearResponse,
            storage::dto::prediction::ResetResponse,
            storage::dto::groups::StandingRowResponse,
            storage::dto::groups::GroupTableResponse,
            storage::dto::groups::ThirdPlaceResponse,
            storage::dto::groups::QualificationResponse,
            storage::dto::bracket::OccupantResponse,
            storage::dto::bracket::SlotResponse,
            storage::dto::bracket::RoundResponse,
            storage::dto::bracket::BracketResponse,
            storage::dto::leaderboard::LeaderboardEntryResponse,
            storage::dto::leaderboard::RoundPresenceResponse,
            storage::dto::leaderboard::MatchBadgeResponse,
            storage::dto::leaderboard::ParticipantScoreResponse,
            storage::dto::format::FormatResponse,
            storage::dto::format::GroupSummary,
            storage::dto::format::MatchSummary,
            storage::dto::format::RoundSummary,
            storage::dto::format::PointsResponse,
        )
    ),
    tags(
        (name = "participants", description = "Pool participants and their scores"),
        (name = "standings", description = "Group tables and qualification"),
        (name = "bracket", description = "Knockout bracket generation and picks"),
        (name = "predictions", description = "Group match results and predictions"),
        (name = "leaderboard", description = "Rankings and tournament format"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

fn load_format(path: Option<&str>) -> anyhow::Result<TournamentFormat> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read tournament format {}", path))?;
            TournamentFormat::from_json(&json).context("Invalid tournament format")
        }
        None => TournamentFormat::world_cup_2026().context("Invalid embedded tournament format"),
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn PredictionStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, predictions are kept in memory only");
        return Ok(Arc::new(MemoryStore::new()));
    };

    tracing::info!(
        "Connecting to database at: {}",
        database_url.split('@').next_back().unwrap_or("unknown")
    );
    let db = Database::new(database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    Ok(Arc::new(PgPredictionStore::new(db)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting prediction pool API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let format = load_format(config.tournament_format.as_deref())?;
    tracing::info!(
        "Loaded format '{}': {} groups, {} knockout rounds",
        format.name,
        format.groups.len(),
        format.knockout.rounds.len()
    );

    let store = open_store(&config).await?;
    let pool = PoolService::new(format, store)
        .context("Failed to build the prediction pool")?
        .with_lock_at(config.predictions_lock_at);
    if let Some(lock_at) = config.predictions_lock_at {
        tracing::info!("Participant predictions lock at {}", lock_at);
    }

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, official results cannot be written");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    let app = routes::router(pool, api_keys)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
