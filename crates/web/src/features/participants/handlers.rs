use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::{
    leaderboard::ParticipantScoreResponse,
    participant::{CreateParticipantRequest, ParticipantResponse},
};
use tournament::PoolService;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/participants",
    responses(
        (status = 200, description = "List all participants", body = Vec<ParticipantResponse>)
    ),
    tag = "participants"
)]
pub async fn list_participants(State(pool): State<PoolService>) -> Result<Response, WebError> {
    let participants = services::list_participants(&pool).await?;

    Ok(Json(participants).into_response())
}

#[utoipa::path(
    post,
    path = "/api/participants",
    request_body = CreateParticipantRequest,
    responses(
        (status = 201, description = "Participant registered", body = ParticipantResponse),
        (status = 400, description = "Invalid name"),
        (status = 409, description = "Name already taken")
    ),
    tag = "participants"
)]
pub async fn create_participant(
    State(pool): State<PoolService>,
    Json(payload): Json<CreateParticipantRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;

    let participant = services::create_participant(&pool, &payload.name).await?;

    Ok((StatusCode::CREATED, Json(participant)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/participants/{participant_id}/score",
    params(
        ("participant_id" = String, Path, description = "Participant ID")
    ),
    responses(
        (status = 200, description = "Points of a participant, per stage and per match", body = ParticipantScoreResponse),
        (status = 404, description = "Participant not found")
    ),
    tag = "participants"
)]
pub async fn get_participant_score(
    State(pool): State<PoolService>,
    Path(participant_id): Path<String>,
) -> Result<Response, WebError> {
    let score = services::get_participant_score(&pool, &participant_id).await?;

    Ok(Json(score).into_response())
}
