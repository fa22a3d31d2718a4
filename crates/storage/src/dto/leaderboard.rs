use serde::{Deserialize, Serialize};
use tournament::services::{LeaderboardEntry, MatchBreakdown, ParticipantScore};
use utoipa::ToSchema;

use super::prediction::ScoreResponse;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntryResponse {
    pub position: usize,
    pub participant_id: String,
    pub name: String,
    pub total: u32,
    pub exact_hits: u32,
}

impl From<LeaderboardEntry> for LeaderboardEntryResponse {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            position: entry.position,
            participant_id: entry.participant_id,
            name: entry.name,
            total: entry.total,
            exact_hits: entry.exact_hits,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoundPresenceResponse {
    pub round: String,
    pub matched_teams: Vec<String>,
    pub points: u32,
}

/// Per-match badge: the participant's pick next to the official result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchBadgeResponse {
    pub match_id: String,
    pub group: String,
    pub round: u32,
    pub home: String,
    pub away: String,
    pub predicted: Option<ScoreResponse>,
    pub official: Option<ScoreResponse>,
    pub points: u32,
}

impl From<MatchBreakdown> for MatchBadgeResponse {
    fn from(row: MatchBreakdown) -> Self {
        Self {
            match_id: row.match_id.to_string(),
            group: row.group,
            round: row.round,
            home: row.home,
            away: row.away,
            predicted: row.predicted.map(ScoreResponse::from),
            official: row.official.map(ScoreResponse::from),
            points: row.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantScoreResponse {
    pub participant_id: String,
    pub name: String,
    pub group_stage_points: u32,
    pub exact_hits: u32,
    pub outcome_hits: u32,
    pub knockout_points: u32,
    pub champion_bonus: u32,
    pub rounds: Vec<RoundPresenceResponse>,
    pub total: u32,
    pub matches: Vec<MatchBadgeResponse>,
}

impl ParticipantScoreResponse {
    pub fn new(score: ParticipantScore, matches: Vec<MatchBreakdown>) -> Self {
        Self {
            participant_id: score.participant.id,
            name: score.participant.name,
            group_stage_points: score.group_stage.points,
            exact_hits: score.group_stage.exact_hits,
            outcome_hits: score.group_stage.outcome_hits,
            knockout_points: score.knockout.total - score.knockout.champion_bonus,
            champion_bonus: score.knockout.champion_bonus,
            rounds: score
                .knockout
                .rounds
                .into_iter()
                .map(|round| RoundPresenceResponse {
                    round: round.round,
                    matched_teams: round.matched_teams,
                    points: round.points,
                })
                .collect(),
            total: score.total,
            matches: matches.into_iter().map(MatchBadgeResponse::from).collect(),
        }
    }
}
