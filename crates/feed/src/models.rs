use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tournament::{MatchId, Score};

use crate::error::{FeedError, Result};

/// Official results as published by a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsDocument {
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub results: Vec<ResultEntry>,
}

/// One group match. Both goal counts are null until the match is played.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEntry {
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub home_goals: Option<i32>,
    #[serde(default)]
    pub away_goals: Option<i32>,
}

impl ResultEntry {
    pub fn match_id(&self) -> MatchId {
        MatchId::new(&self.home, &self.away)
    }

    pub fn score(&self) -> Result<Option<Score>> {
        match (self.home_goals, self.away_goals) {
            (Some(home), Some(away)) => Ok(Some(Score::checked(home, away)?)),
            (None, None) => Ok(None),
            _ => Err(FeedError::ValidationError(format!(
                "'{}' has only one goal count",
                self.match_id()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(home_goals: Option<i32>, away_goals: Option<i32>) -> ResultEntry {
        ResultEntry {
            home: "Canadá".to_string(),
            away: "Catar".to_string(),
            home_goals,
            away_goals,
        }
    }

    #[test]
    fn test_parses_document_with_pending_matches() {
        let json = r#"{
            "updated_at": "2026-06-12T22:00:00Z",
            "results": [
                {"home": "México", "away": "Sudáfrica", "home_goals": 2, "away_goals": 0},
                {"home": "Corea del Sur", "away": "Rep. UEFA 4", "home_goals": null, "away_goals": null},
                {"home": "Canadá", "away": "Rep. UEFA 1"}
            ]
        }"#;
        let document: ResultsDocument = serde_json::from_str(json).unwrap();

        assert!(document.updated_at.is_some());
        assert_eq!(document.results.len(), 3);
        assert_eq!(
            document.results[0].match_id(),
            MatchId::from("México vs Sudáfrica")
        );
        assert_eq!(document.results[0].score().unwrap(), Some(Score::new(2, 0)));
        assert_eq!(document.results[1].score().unwrap(), None);
        assert_eq!(document.results[2].score().unwrap(), None);
    }

    #[test]
    fn test_rejects_half_negative_and_oversized_scores() {
        assert!(matches!(
            entry(Some(1), None).score(),
            Err(FeedError::ValidationError(_))
        ));
        assert!(matches!(
            entry(Some(-1), Some(0)).score(),
            Err(FeedError::EngineError(_))
        ));
        assert!(matches!(
            entry(Some(i32::MAX), Some(0)).score(),
            Err(FeedError::EngineError(_))
        ));
    }
}
