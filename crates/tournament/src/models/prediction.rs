use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::format::{MatchId, SlotKey};
use super::score::Score;

/// Owner of a set of predictions: one participant, or the official results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Official,
    Participant(String),
}

impl Scope {
    pub fn participant(id: impl Into<String>) -> Self {
        Self::Participant(id.into())
    }

    pub fn is_official(&self) -> bool {
        matches!(self, Scope::Official)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Official => f.write_str("official"),
            Scope::Participant(id) => f.write_str(id),
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("scope cannot be empty".to_string()),
            "official" => Ok(Scope::Official),
            id => Ok(Scope::Participant(id.to_string())),
        }
    }
}

/// Key of one stored prediction within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PredictionKey {
    Match(MatchId),
    Slot(SlotKey),
}

impl fmt::Display for PredictionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionKey::Match(id) => write!(f, "match:{id}"),
            PredictionKey::Slot(key) => write!(f, "slot:{key}"),
        }
    }
}

impl FromStr for PredictionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix("match:") {
            return Ok(PredictionKey::Match(MatchId::from(id)));
        }
        if let Some(key) = s.strip_prefix("slot:") {
            return key
                .parse()
                .map(PredictionKey::Slot)
                .map_err(|_| format!("invalid slot key '{key}'"));
        }
        Err(format!("unrecognised prediction key '{s}'"))
    }
}

/// A resolved slot side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Occupant {
    Team(String),
    Tbd,
    /// The qualifier pool is not determined yet, e.g. "Best Third #3".
    Placeholder(String),
}

impl Occupant {
    pub fn team(&self) -> Option<&str> {
        match self {
            Occupant::Team(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, Occupant::Team(_))
    }

    pub fn display_name(&self) -> &str {
        match self {
            Occupant::Team(name) | Occupant::Placeholder(name) => name,
            Occupant::Tbd => "TBD",
        }
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Stored state of a knockout slot: the pair it was last generated with and
/// the picked winner for that pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub home: Occupant,
    pub away: Occupant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
}

impl SlotRecord {
    pub fn pairing(home: Occupant, away: Occupant) -> Self {
        Self {
            home,
            away,
            winner: None,
            score: None,
        }
    }

    pub fn has_pair(&self, home: &Occupant, away: &Occupant) -> bool {
        self.home == *home && self.away == *away
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredictionValue {
    Score(Score),
    Slot(SlotRecord),
}

/// A participant of the pool. Its id scopes its predictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

impl Participant {
    pub fn scope(&self) -> Scope {
        Scope::Participant(self.id.clone())
    }
}

/// Point-in-time view of one scope's predictions. Every derivation reads
/// from a snapshot so it never observes a half-applied set of writes.
#[derive(Debug, Clone, Default)]
pub struct PredictionSet {
    results: HashMap<MatchId, Score>,
    slots: HashMap<SlotKey, SlotRecord>,
}

impl PredictionSet {
    pub fn from_entries(entries: impl IntoIterator<Item = (PredictionKey, PredictionValue)>) -> Self {
        let mut set = Self::default();
        for (key, value) in entries {
            match (key, value) {
                (PredictionKey::Match(id), PredictionValue::Score(score)) => {
                    set.results.insert(id, score);
                }
                (PredictionKey::Slot(key), PredictionValue::Slot(record)) => {
                    set.slots.insert(key, record);
                }
                (key, _) => warn!("Ignoring mismatched value stored under {}", key),
            }
        }
        set
    }

    pub fn with_result(mut self, id: MatchId, score: Score) -> Self {
        self.results.insert(id, score);
        self
    }

    pub fn with_slot(mut self, key: SlotKey, record: SlotRecord) -> Self {
        self.slots.insert(key, record);
        self
    }

    pub fn result(&self, id: &MatchId) -> Option<Score> {
        self.results.get(id).copied()
    }

    pub fn slot(&self, key: SlotKey) -> Option<&SlotRecord> {
        self.slots.get(&key)
    }

    pub fn results(&self) -> impl Iterator<Item = (&MatchId, &Score)> {
        self.results.iter()
    }
}
