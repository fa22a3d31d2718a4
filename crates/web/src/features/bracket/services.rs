use storage::dto::bracket::{BracketResponse, RoundResponse, SlotResponse};
use tournament::{PoolService, Result, Scope, Score, SlotKey};

pub async fn get_bracket(pool: &PoolService, scope: &Scope) -> Result<BracketResponse> {
    let bracket = pool.bracket(scope).await?;
    Ok(BracketResponse::from(&bracket))
}

/// Generate a round, dropping picks whose pair changed upstream
pub async fn generate_round(pool: &PoolService, scope: &Scope, round_id: &str) -> Result<RoundResponse> {
    let round = pool.generate_round(scope, round_id).await?;
    Ok(RoundResponse::from(&round))
}

pub async fn get_slot(pool: &PoolService, scope: &Scope, key: SlotKey) -> Result<SlotResponse> {
    let slot = pool.resolve_slot(scope, key).await?;
    Ok(SlotResponse::from(&slot))
}

pub async fn record_winner(
    pool: &PoolService,
    scope: &Scope,
    key: SlotKey,
    team: &str,
    score: Option<Score>,
) -> Result<SlotResponse> {
    let slot = pool.record_winner(scope, key, team, score).await?;
    Ok(SlotResponse::from(&slot))
}

pub async fn clear_winner(pool: &PoolService, scope: &Scope, key: SlotKey) -> Result<bool> {
    pool.clear_winner(scope, key).await
}
