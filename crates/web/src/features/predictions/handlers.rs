use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::{
    groups::GroupTableResponse,
    prediction::{ClearResponse, ResetResponse, SubmitResultRequest},
};
use tournament::{MatchId, PoolService};
use validator::Validate;

use crate::error::WebError;
use crate::features::parse_scope;

use super::services;

#[utoipa::path(
    put,
    path = "/api/scopes/{scope}/matches/{match_id}",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`"),
        ("match_id" = String, Path, description = "Group match id, `<home> vs <away>`")
    ),
    request_body = SubmitResultRequest,
    responses(
        (status = 200, description = "Score stored, refreshed group table", body = GroupTableResponse),
        (status = 400, description = "Negative goals"),
        (status = 401, description = "Official scope requires an API key"),
        (status = 403, description = "Predictions are locked"),
        (status = 404, description = "Unknown match or participant")
    ),
    tag = "predictions",
    security(("bearer_auth" = []))
)]
pub async fn submit_result(
    State(pool): State<PoolService>,
    Path((scope, match_id)): Path<(String, String)>,
    Json(payload): Json<SubmitResultRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;
    let scope = parse_scope(&scope)?;
    let match_id = MatchId::from(match_id);

    let table = services::submit_result(
        &pool,
        &scope,
        &match_id,
        payload.home_goals,
        payload.away_goals,
    )
    .await?;

    Ok(Json(table).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/scopes/{scope}/matches/{match_id}",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`"),
        ("match_id" = String, Path, description = "Group match id, `<home> vs <away>`")
    ),
    responses(
        (status = 200, description = "Score removed if present", body = ClearResponse),
        (status = 401, description = "Official scope requires an API key"),
        (status = 404, description = "Unknown match or participant")
    ),
    tag = "predictions",
    security(("bearer_auth" = []))
)]
pub async fn clear_result(
    State(pool): State<PoolService>,
    Path((scope, match_id)): Path<(String, String)>,
) -> Result<Response, WebError> {
    let scope = parse_scope(&scope)?;
    let cleared = services::clear_result(&pool, &scope, &MatchId::from(match_id)).await?;

    Ok(Json(ClearResponse { cleared }).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/scopes/{scope}",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`")
    ),
    responses(
        (status = 200, description = "Every prediction of the scope removed", body = ResetResponse),
        (status = 401, description = "Official scope requires an API key"),
        (status = 403, description = "Predictions are locked"),
        (status = 404, description = "Participant not found")
    ),
    tag = "predictions",
    security(("bearer_auth" = []))
)]
pub async fn reset_scope(
    State(pool): State<PoolService>,
    Path(scope): Path<String>,
) -> Result<Response, WebError> {
    let scope = parse_scope(&scope)?;
    let reset = services::reset_scope(&pool, &scope).await?;

    Ok(Json(reset).into_response())
}
