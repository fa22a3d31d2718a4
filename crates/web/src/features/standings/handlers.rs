use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::groups::{GroupTableResponse, QualificationResponse};
use tournament::PoolService;

use crate::error::WebError;
use crate::features::parse_scope;

use super::services;

#[utoipa::path(
    get,
    path = "/api/scopes/{scope}/groups",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`")
    ),
    responses(
        (status = 200, description = "Group tables, sorted", body = Vec<GroupTableResponse>),
        (status = 404, description = "Participant not found")
    ),
    tag = "standings"
)]
pub async fn list_group_tables(
    State(pool): State<PoolService>,
    Path(scope): Path<String>,
) -> Result<Response, WebError> {
    let scope = parse_scope(&scope)?;
    let tables = services::list_group_tables(&pool, &scope).await?;

    Ok(Json(tables).into_response())
}

#[utoipa::path(
    get,
    path = "/api/scopes/{scope}/qualification",
    params(
        ("scope" = String, Path, description = "Participant ID or `official`")
    ),
    responses(
        (status = 200, description = "Group qualifiers and the best-third ranking", body = QualificationResponse),
        (status = 404, description = "Participant not found")
    ),
    tag = "standings"
)]
pub async fn get_qualification(
    State(pool): State<PoolService>,
    Path(scope): Path<String>,
) -> Result<Response, WebError> {
    let scope = parse_scope(&scope)?;
    let qualification = services::get_qualification(&pool, &scope).await?;

    Ok(Json(qualification).into_response())
}
