use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::{
    format::FormatResponse, leaderboard::LeaderboardEntryResponse,
    participant::ParticipantResponse,
};
use tournament::{MatchId, PoolService};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    responses(
        (status = 200, description = "Participants ranked by total points", body = Vec<LeaderboardEntryResponse>)
    ),
    tag = "leaderboard"
)]
pub async fn get_leaderboard(State(pool): State<PoolService>) -> Result<Response, WebError> {
    let leaderboard = services::get_leaderboard(&pool).await?;

    Ok(Json(leaderboard).into_response())
}

#[utoipa::path(
    get,
    path = "/api/matches/{match_id}/exact-hitters",
    params(
        ("match_id" = String, Path, description = "Group match id, `<home> vs <away>`")
    ),
    responses(
        (status = 200, description = "Participants who predicted the official score exactly", body = Vec<ParticipantResponse>),
        (status = 404, description = "Unknown match")
    ),
    tag = "leaderboard"
)]
pub async fn list_exact_hitters(
    State(pool): State<PoolService>,
    Path(match_id): Path<String>,
) -> Result<Response, WebError> {
    let hitters = services::list_exact_hitters(&pool, &MatchId::from(match_id)).await?;

    Ok(Json(hitters).into_response())
}

#[utoipa::path(
    get,
    path = "/api/format",
    responses(
        (status = 200, description = "Tournament format and points rules", body = FormatResponse)
    ),
    tag = "leaderboard"
)]
pub async fn get_format(State(pool): State<PoolService>) -> Response {
    Json(services::get_format(&pool)).into_response()
}
