use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tournament::services::{Qualification, ThirdPlaceCandidate};
use tournament::{GroupTable, StandingRow, TableStatus, Zone};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StandingRowResponse {
    pub position: usize,
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: u32,
    /// `direct`, `third_place_candidate` or `eliminated`
    pub zone: String,
}

impl From<&StandingRow> for StandingRowResponse {
    fn from(row: &StandingRow) -> Self {
        let zone = match row.zone {
            Zone::Direct => "direct",
            Zone::ThirdPlaceCandidate => "third_place_candidate",
            Zone::Eliminated => "eliminated",
        };
        Self {
            position: row.position,
            team: row.team.clone(),
            played: row.played,
            wins: row.wins,
            draws: row.draws,
            losses: row.losses,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goal_difference,
            points: row.points,
            zone: zone.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupTableResponse {
    pub group: String,
    /// `complete` or `partial`
    pub status: String,
    pub played_matches: usize,
    pub expected_matches: usize,
    pub rows: Vec<StandingRowResponse>,
}

impl From<&GroupTable> for GroupTableResponse {
    fn from(table: &GroupTable) -> Self {
        let status = match table.status() {
            TableStatus::Complete => "complete",
            TableStatus::Partial { .. } => "partial",
        };
        Self {
            group: table.group.clone(),
            status: status.to_string(),
            played_matches: table.played_matches,
            expected_matches: table.expected_matches,
            rows: table.rows.iter().map(StandingRowResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThirdPlaceResponse {
    pub rank: usize,
    pub group: String,
    pub team: String,
    pub points: u32,
    pub goal_difference: i32,
    pub goals_for: i32,
    pub played: u32,
    pub qualified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QualificationResponse {
    pub determined: bool,
    pub pending_matches: usize,
    pub group_winners: BTreeMap<String, String>,
    pub runners_up: BTreeMap<String, String>,
    pub third_place_ranking: Vec<ThirdPlaceResponse>,
}

impl From<&Qualification> for QualificationResponse {
    fn from(qualification: &Qualification) -> Self {
        let third = |(idx, candidate): (usize, &ThirdPlaceCandidate)| ThirdPlaceResponse {
            rank: idx + 1,
            group: candidate.group.clone(),
            team: candidate.team.clone(),
            points: candidate.points,
            goal_difference: candidate.goal_difference,
            goals_for: candidate.goals_for,
            played: candidate.played,
            qualified: idx < qualification.best_thirds.len(),
        };
        Self {
            determined: qualification.is_determined(),
            pending_matches: qualification.pending_matches,
            group_winners: qualification.group_winners.clone(),
            runners_up: qualification.runners_up.clone(),
            third_place_ranking: qualification
                .third_place_ranking
                .iter()
                .enumerate()
                .map(third)
                .collect(),
        }
    }
}
