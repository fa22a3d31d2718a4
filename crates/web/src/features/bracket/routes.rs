use axum::{
    Router, middleware,
    routing::{get, put},
};
use tournament::PoolService;

use super::handlers::{clear_winner, generate_round, get_bracket, get_slot, record_winner};
use crate::middleware::auth::{ApiKeys, require_official_auth};

pub fn routes(api_keys: ApiKeys) -> Router<PoolService> {
    let protected = Router::new()
        .route("/scopes/:scope/slots/:key/winner", put(record_winner).delete(clear_winner))
        .route_layer(middleware::from_fn_with_state(api_keys, require_official_auth));

    Router::new()
        .route("/scopes/:scope/bracket", get(get_bracket))
        .route("/scopes/:scope/rounds/:round", get(generate_round))
        .route("/scopes/:scope/slots/:key", get(get_slot))
        .merge(protected)
}
