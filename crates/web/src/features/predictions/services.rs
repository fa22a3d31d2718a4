use storage::dto::{groups::GroupTableResponse, prediction::ResetResponse};
use tournament::{MatchId, PoolService, Result, Scope};

pub async fn submit_result(
    pool: &PoolService,
    scope: &Scope,
    match_id: &MatchId,
    home_goals: i32,
    away_goals: i32,
) -> Result<GroupTableResponse> {
    let table = pool
        .submit_result(scope, match_id, home_goals, away_goals)
        .await?;
    Ok(GroupTableResponse::from(&table))
}

pub async fn clear_result(pool: &PoolService, scope: &Scope, match_id: &MatchId) -> Result<bool> {
    pool.clear_result(scope, match_id).await
}

pub async fn reset_scope(pool: &PoolService, scope: &Scope) -> Result<ResetResponse> {
    let removed = pool.reset(scope).await?;
    Ok(ResetResponse {
        scope: scope.to_string(),
        removed,
    })
}
