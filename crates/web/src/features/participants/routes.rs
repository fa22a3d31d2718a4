use axum::{
    Router,
    routing::get,
};
use tournament::PoolService;

use super::handlers::{create_participant, get_participant_score, list_participants};

pub fn routes() -> Router<PoolService> {
    Router::new()
        .route("/participants", get(list_participants).post(create_participant))
        .route("/participants/:participant_id/score", get(get_participant_score))
}
