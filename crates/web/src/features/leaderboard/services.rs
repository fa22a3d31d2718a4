use storage::dto::{
    format::FormatResponse, leaderboard::LeaderboardEntryResponse,
    participant::ParticipantResponse,
};
use tournament::{MatchId, PoolService, Result};

pub async fn get_leaderboard(pool: &PoolService) -> Result<Vec<LeaderboardEntryResponse>> {
    let entries = pool.leaderboard().await?;
    Ok(entries.into_iter().map(Into::into).collect())
}

pub async fn list_exact_hitters(
    pool: &PoolService,
    match_id: &MatchId,
) -> Result<Vec<ParticipantResponse>> {
    let hitters = pool.exact_hitters(match_id).await?;
    Ok(hitters.into_iter().map(Into::into).collect())
}

pub fn get_format(pool: &PoolService) -> FormatResponse {
    FormatResponse::new(pool.format(), pool.lock_at())
}
