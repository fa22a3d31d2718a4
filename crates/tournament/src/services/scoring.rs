use crate::models::{PointsTable, Score};

/// Points earned by one predicted score against the actual result.
///
/// Total over every `i32` input: negative goals are rejected upstream, not here.
pub fn score_prediction(actual: Option<Score>, predicted: Score, points: &PointsTable) -> u32 {
    let Some(actual) = actual else {
        return 0;
    };

    if actual == predicted {
        points.exact_score
    } else if actual.outcome() == predicted.outcome() {
        points.correct_outcome
    } else {
        0
    }
}
