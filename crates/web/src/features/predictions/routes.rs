use axum::{
    Router, middleware,
    routing::{delete, put},
};
use tournament::PoolService;

use super::handlers::{clear_result, reset_scope, submit_result};
use crate::middleware::auth::{ApiKeys, require_official_auth};

pub fn routes(api_keys: ApiKeys) -> Router<PoolService> {
    Router::new()
        .route("/scopes/:scope", delete(reset_scope))
        .route(
            "/scopes/:scope/matches/:match_id",
            put(submit_result).delete(clear_result),
        )
        .route_layer(middleware::from_fn_with_state(api_keys, require_official_auth))
}
