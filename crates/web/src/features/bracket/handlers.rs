use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::{
    bracket::{BracketResponse, RoundResponse, SlotResponse},
    prediction::{ClearResponse, RecordWinnerRequest},
};
use tournament::{PoolService, SlotKey};
use validator::Validate;

use crate::error::WebError;
use crate::features::parse_scope;

use super::services;

#[utoipa::path(
    get,
    path = "/api/scopes/{scope}/bracket",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`")
    ),
    responses(
        (status = 200, description = "Every knockout round with resolved occupants", body = BracketResponse),
        (status = 404, description = "Participant not found")
    ),
    tag = "bracket"
)]
pub async fn get_bracket(
    State(pool): State<PoolService>,
    Path(scope): Path<String>,
) -> Result<Response, WebError> {
    let scope = parse_scope(&scope)?;
    let bracket = services::get_bracket(&pool, &scope).await?;

    Ok(Json(bracket).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scopes/{scope}/rounds/{round}",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`"),
        ("round" = String, Path, description = "Round id, e.g. R32")
    ),
    responses(
        (status = 200, description = "Generated round. Stale picks are cleared", body = RoundResponse),
        (status = 404, description = "Unknown round or participant")
    ),
    tag = "bracket"
)]
pub async fn generate_round(
    State(pool): State<PoolService>,
    Path((scope, round)): Path<(String, String)>,
) -> Result<Response, WebError> {
    let scope = parse_scope(&scope)?;
    let round = services::generate_round(&pool, &scope, &round).await?;

    Ok(Json(round).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scopes/{scope}/slots/{key}",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`"),
        ("key" = u32, Path, description = "Slot key (match number)")
    ),
    responses(
        (status = 200, description = "Resolved slot", body = SlotResponse),
        (status = 404, description = "Unknown slot or participant")
    ),
    tag = "bracket"
)]
pub async fn get_slot(
    State(pool): State<PoolService>,
    Path((scope, key)): Path<(String, SlotKey)>,
) -> Result<Response, WebError> {
    let scope = parse_scope(&scope)?;
    let slot = services::get_slot(&pool, &scope, key).await?;

    Ok(Json(slot).into_response())
}

#[utoipa::path(
    put,
    path = "/api/scopes/{scope}/slots/{key}/winner",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`"),
        ("key" = u32, Path, description = "Slot key (match number)")
    ),
    request_body = RecordWinnerRequest,
    responses(
        (status = 200, description = "Winner recorded", body = SlotResponse),
        (status = 400, description = "Slot not ready or team not in the slot"),
        (status = 401, description = "Official scope requires an API key"),
        (status = 403, description = "Predictions are locked"),
        (status = 409, description = "Concurrent update")
    ),
    tag = "bracket",
    security(("bearer_auth" = []))
)]
pub async fn record_winner(
    State(pool): State<PoolService>,
    Path((scope, key)): Path<(String, SlotKey)>,
    Json(payload): Json<RecordWinnerRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;
    let scope = parse_scope(&scope)?;
    let score = payload.score().map_err(WebError::BadRequest)?;

    let slot = services::record_winner(&pool, &scope, key, &payload.team, score).await?;

    Ok(Json(slot).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/scopes/{scope}/slots/{key}/winner",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`"),
        ("key" = u32, Path, description = "Slot key (match number)")
    ),
    responses(
        (status = 200, description = "Winner and score removed", body = ClearResponse),
        (status = 401, description = "Official scope requires an API key"),
        (status = 403, description = "Predictions are locked")
    ),
    tag = "bracket",
    security(("bearer_auth" = []))
)]
pub async fn clear_winner(
    State(pool): State<PoolService>,
    Path((scope, key)): Path<(String, SlotKey)>,
) -> Result<Response, WebError> {
    let scope = parse_scope(&scope)?;
    let cleared = services::clear_winner(&pool, &scope, key).await?;

    Ok(Json(ClearResponse { cleared }).into_response())
}
