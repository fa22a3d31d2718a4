use axum::Router;
use tournament::PoolService;

use crate::features::{bracket, leaderboard, participants, predictions, standings};
use crate::middleware::auth::ApiKeys;

pub fn router(pool: PoolService, api_keys: ApiKeys) -> Router {
    let api = Router::new()
        .merge(participants::routes::routes())
        .merge(standings::routes::routes())
        .merge(bracket::routes::routes(api_keys.clone()))
        .merge(predictions::routes::routes(api_keys))
        .merge(leaderboard::routes::routes());

    Router::new().nest("/api", api).with_state(pool)
}
