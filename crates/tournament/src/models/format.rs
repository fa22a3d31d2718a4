use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::validation::FormatValidator;

/// Stable match number of a knockout slot (73..=104 in the 2026 format).
pub type SlotKey = u32;

/// Identifier of a group-stage match: `"<home> vs <away>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(home: &str, away: &str) -> Self {
        Self(format!("{home} vs {away}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MatchId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MatchId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMatch {
    /// Matchday ("jornada") within the group.
    pub round: u32,
    pub home: String,
    pub away: String,
}

impl GroupMatch {
    pub fn id(&self) -> MatchId {
        MatchId::new(&self.home, &self.away)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub label: String,
    /// Teams in draw order. The order doubles as the final tie-break.
    pub teams: Vec<String>,
    pub matches: Vec<GroupMatch>,
}

impl GroupSpec {
    pub fn contains(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }
}

/// Where a knockout slot side gets its team from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotReference {
    Team(String),
    WinnerOf(SlotKey),
    LoserOf(SlotKey),
    Qualifier(QualifierRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pool", rename_all = "snake_case")]
pub enum QualifierRef {
    /// 1-based final position in a group.
    GroupPosition { group: String, position: usize },
    /// 1-based rank among the qualifying third-placed teams. `eligible_groups`
    /// restricts which groups' thirds may fill the slot.
    BestThird {
        rank: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        eligible_groups: Vec<String>,
    },
}

impl QualifierRef {
    /// Label shown while the qualifier pool is not yet determined.
    pub fn placeholder(&self) -> String {
        match self {
            QualifierRef::GroupPosition { group, position: 1 } => format!("Winner Group {group}"),
            QualifierRef::GroupPosition { group, position: 2 } => {
                format!("Runner-up Group {group}")
            }
            QualifierRef::GroupPosition { group, position } => {
                format!("#{position} Group {group}")
            }
            QualifierRef::BestThird { rank, .. } => format!("Best Third #{rank}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub key: SlotKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub home: SlotReference,
    pub away: SlotReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSpec {
    /// Short identifier, also the key into `PointsTable::round_presence`.
    pub id: String,
    pub name: String,
    pub slots: Vec<SlotSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutSpec {
    /// Rounds in play order; each round only references the one before it.
    pub rounds: Vec<RoundSpec>,
    /// The championship match. Its winner is the champion.
    pub final_slot: SlotKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsTable {
    pub exact_score: u32,
    pub correct_outcome: u32,
    /// Points per team present in the same round of both brackets.
    pub round_presence: BTreeMap<String, u32>,
    pub champion_bonus: u32,
}

impl Default for PointsTable {
    fn default() -> Self {
        let round_presence = [("R32", 2), ("R16", 3), ("QF", 4), ("SF", 5), ("F", 6)]
            .into_iter()
            .map(|(round, points)| (round.to_string(), points))
            .collect();

        Self {
            exact_score: 5,
            correct_outcome: 2,
            round_presence,
            champion_bonus: 4,
        }
    }
}

impl PointsTable {
    pub fn presence_points(&self, round_id: &str) -> u32 {
        self.round_presence.get(round_id).copied().unwrap_or(0)
    }
}

/// Static tournament configuration: groups, schedules, bracket topology and
/// the points rules. Loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentFormat {
    pub name: String,
    pub teams_per_group: usize,
    /// How many third-placed teams qualify across all groups.
    pub best_thirds: usize,
    pub groups: Vec<GroupSpec>,
    pub knockout: KnockoutSpec,
    #[serde(default)]
    pub points: PointsTable,
}

const WORLD_CUP_2026: &str = include_str!("../../formats/world_cup_2026.json");

impl TournamentFormat {
    /// Parses and validates a format document.
    pub fn from_json(json: &str) -> Result<Self> {
        let format: TournamentFormat =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidFormat(e.to_string()))?;
        let report = FormatValidator::validate(&format)?;
        report.log_warnings();
        Ok(format)
    }

    /// The 48-team, 12-group FIFA World Cup 2026 format.
    pub fn world_cup_2026() -> Result<Self> {
        Self::from_json(WORLD_CUP_2026)
    }

    pub fn group(&self, label: &str) -> Option<&GroupSpec> {
        self.groups.iter().find(|g| g.label == label)
    }

    pub fn find_match(&self, id: &MatchId) -> Option<(&GroupSpec, &GroupMatch)> {
        self.groups.iter().find_map(|group| {
            group
                .matches
                .iter()
                .find(|m| m.id() == *id)
                .map(|m| (group, m))
        })
    }

    pub fn group_matches(&self) -> impl Iterator<Item = (&GroupSpec, &GroupMatch)> {
        self.groups
            .iter()
            .flat_map(|group| group.matches.iter().map(move |m| (group, m)))
    }

    pub fn total_group_matches(&self) -> usize {
        self.groups.iter().map(|g| g.matches.len()).sum()
    }

    pub fn round(&self, id: &str) -> Option<&RoundSpec> {
        self.knockout.rounds.iter().find(|r| r.id == id)
    }
}
