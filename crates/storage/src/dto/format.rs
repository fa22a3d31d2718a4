use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tournament::TournamentFormat;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchSummary {
    pub match_id: String,
    pub round: u32,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupSummary {
    pub label: String,
    pub teams: Vec<String>,
    pub matches: Vec<MatchSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoundSummary {
    pub id: String,
    pub name: String,
    pub slots: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PointsResponse {
    pub exact_score: u32,
    pub correct_outcome: u32,
    pub round_presence: BTreeMap<String, u32>,
    pub champion_bonus: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormatResponse {
    pub name: String,
    pub teams_per_group: usize,
    pub best_thirds: usize,
    pub groups: Vec<GroupSummary>,
    pub rounds: Vec<RoundSummary>,
    pub final_slot: u32,
    pub points: PointsResponse,
    /// Participant predictions are rejected from this instant on.
    pub predictions_lock_at: Option<DateTime<Utc>>,
}

impl FormatResponse {
    pub fn new(format: &TournamentFormat, lock_at: Option<DateTime<Utc>>) -> Self {
        Self {
            name: format.name.clone(),
            teams_per_group: format.teams_per_group,
            best_thirds: format.best_thirds,
            groups: format
                .groups
                .iter()
                .map(|group| GroupSummary {
                    label: group.label.clone(),
                    teams: group.teams.clone(),
                    matches: group
                        .matches
                        .iter()
                        .map(|m| MatchSummary {
                            match_id: m.id().to_string(),
                            round: m.round,
                            home: m.home.clone(),
                            away: m.away.clone(),
                        })
                        .collect(),
                })
                .collect(),
            rounds: format
                .knockout
                .rounds
                .iter()
                .map(|round| RoundSummary {
                    id: round.id.clone(),
                    name: round.name.clone(),
                    slots: round.slots.iter().map(|slot| slot.key).collect(),
                })
                .collect(),
            final_slot: format.knockout.final_slot,
            points: PointsResponse {
                exact_score: format.points.exact_score,
                correct_outcome: format.points.correct_outcome,
                round_presence: format.points.round_presence.clone(),
                champion_bonus: format.points.champion_bonus,
            },
            predictions_lock_at: lock_at,
        }
    }
}
