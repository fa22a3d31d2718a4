use axum::{Router, routing::get};
use tournament::PoolService;

use super::handlers::{get_qualification, list_group_tables};

pub fn routes() -> Router<PoolService> {
    Router::new()
        .route("/scopes/:scope/groups", get(list_group_tables))
        .route("/scopes/:scope/qualification", get(get_qualification))
}
