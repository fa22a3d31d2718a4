use storage::dto::leaderboard::ParticipantScoreResponse;
use storage::dto::participant::ParticipantResponse;
use tournament::{PoolService, Result};

pub async fn list_participants(pool: &PoolService) -> Result<Vec<ParticipantResponse>> {
    let participants = pool.participants().await?;
    Ok(participants.into_iter().map(ParticipantResponse::from).collect())
}

pub async fn create_participant(pool: &PoolService, name: &str) -> Result<ParticipantResponse> {
    Ok(pool.create_participant(name).await?.into())
}

/// Score breakdown of one participant, with a badge per group match
pub async fn get_participant_score(
    pool: &PoolService,
    participant_id: &str,
) -> Result<ParticipantScoreResponse> {
    let score = pool.participant_score(participant_id).await?;
    let matches = pool.match_breakdown(participant_id).await?;
    Ok(ParticipantScoreResponse::new(score, matches))
}
