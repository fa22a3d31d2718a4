use axum::{Router, routing::get};
use tournament::PoolService;

use super::handlers::{get_format, get_leaderboard, list_exact_hitters};

pub fn routes() -> Router<PoolService> {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/matches/:match_id/exact-hitters", get(list_exact_hitters))
        .route("/format", get(get_format))
}
