use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Rendering hint for a table row, derived from its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Direct,
    ThirdPlaceCandidate,
    Eliminated,
}

impl Zone {
    pub fn for_position(position: usize) -> Self {
        match position {
            1 | 2 => Zone::Direct,
            3 => Zone::ThirdPlaceCandidate,
            _ => Zone::Eliminated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
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
    pub zone: Zone,
}

impl StandingRow {
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            position: 0,
            team: team.into(),
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            zone: Zone::Eliminated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableStatus {
    Complete,
    Partial { played: usize, expected: usize },
}

/// Derived standings of one group. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTable {
    pub group: String,
    pub rows: Vec<StandingRow>,
    pub played_matches: usize,
    pub expected_matches: usize,
}

impl GroupTable {
    pub fn is_complete(&self) -> bool {
        self.played_matches >= self.expected_matches
    }

    pub fn status(&self) -> TableStatus {
        if self.is_complete() {
            TableStatus::Complete
        } else {
            TableStatus::Partial {
                played: self.played_matches,
                expected: self.expected_matches,
            }
        }
    }

    pub fn missing_matches(&self) -> usize {
        self.expected_matches.saturating_sub(self.played_matches)
    }

    /// Final order of the group, available once every match has a result.
    pub fn final_positions(&self) -> Result<&[StandingRow]> {
        if !self.is_complete() {
            return Err(EngineError::IncompleteGroupData {
                group: self.group.clone(),
                played: self.played_matches,
                expected: self.expected_matches,
            });
        }
        Ok(&self.rows)
    }

    /// Row at a 1-based position.
    pub fn row_at(&self, position: usize) -> Option<&StandingRow> {
        position.checked_sub(1).and_then(|idx| self.rows.get(idx))
    }
}
