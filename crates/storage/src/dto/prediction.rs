use serde::{Deserialize, Serialize};
use tournament::Score;
use utoipa::ToSchema;
use validator::Validate;

/// Score of a group match. Negative goals are rejected by the engine.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitResultRequest {
    #[validate(range(max = 99, message = "home_goals must be at most 99"))]
    pub home_goals: i32,
    #[validate(range(max = 99, message = "away_goals must be at most 99"))]
    pub away_goals: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordWinnerRequest {
    #[validate(length(min = 1, message = "team is required"))]
    pub team: String,
    /// Optional final score, both sides or neither.
    #[serde(default)]
    pub home_goals: Option<i32>,
    #[serde(default)]
    pub away_goals: Option<i32>,
}

impl RecordWinnerRequest {
    pub fn score(&self) -> Result<Option<Score>, String> {
        match (self.home_goals, self.away_goals) {
            (Some(home), Some(away)) => Ok(Some(Score::new(home, away))),
            (None, None) => Ok(None),
            _ => Err("home_goals and away_goals must be given together".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreResponse {
    pub home_goals: i32,
    pub away_goals: i32,
}

impl From<Score> for ScoreResponse {
    fn from(score: Score) -> Self {
        Self {
            home_goals: score.home,
            away_goals: score.away,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearResponse {
    pub cleared: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub scope: String,
    pub removed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_score_needs_both_sides() {
        let request = RecordWinnerRequest {
            team: "Brasil".to_string(),
            home_goals: Some(2),
            away_goals: None,
        };
        assert!(request.score().is_err());

        let request = RecordWinnerRequest {
            team: "Brasil".to_string(),
            home_goals: Some(2),
            away_goals: Some(1),
        };
        assert_eq!(request.score(), Ok(Some(Score::new(2, 1))));
    }

    #[test]
    fn test_submit_result_limits() {
        let request = SubmitResultRequest {
            home_goals: 120,
            away_goals: 0,
        };
        assert!(request.validate().is_err());
    }
}
