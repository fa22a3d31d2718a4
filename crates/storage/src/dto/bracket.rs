use serde::{Deserialize, Serialize};
use tournament::Occupant;
use tournament::services::{ResolvedBracket, ResolvedRound, ResolvedSlot, RoundBlock};
use utoipa::ToSchema;

use super::prediction::ScoreResponse;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OccupantResponse {
    /// `team`, `tbd` or `placeholder`
    pub kind: String,
    pub name: String,
}

impl From<&Occupant> for OccupantResponse {
    fn from(occupant: &Occupant) -> Self {
        let kind = match occupant {
            Occupant::Team(_) => "team",
            Occupant::Tbd => "tbd",
            Occupant::Placeholder(_) => "placeholder",
        };
        Self {
            kind: kind.to_string(),
            name: occupant.display_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotResponse {
    pub key: u32,
    pub label: String,
    pub home: OccupantResponse,
    pub away: OccupantResponse,
    pub winner: Option<String>,
    pub score: Option<ScoreResponse>,
    /// Both sides are known teams, so a winner can be picked.
    pub ready: bool,
}

impl From<&ResolvedSlot> for SlotResponse {
    fn from(slot: &ResolvedSlot) -> Self {
        Self {
            key: slot.key,
            label: slot.label.clone(),
            home: OccupantResponse::from(&slot.home),
            away: OccupantResponse::from(&slot.away),
            winner: slot.winner.clone(),
            score: slot.score.map(ScoreResponse::from),
            ready: slot.is_ready(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoundResponse {
    pub id: String,
    pub name: String,
    pub blocked: bool,
    /// Group results still missing while the first round is blocked.
    pub missing_results: Option<usize>,
    pub slots: Vec<SlotResponse>,
}

impl From<&ResolvedRound> for RoundResponse {
    fn from(round: &ResolvedRound) -> Self {
        let missing_results = round.blocked.map(|block| match block {
            RoundBlock::GroupStageIncomplete { missing_results } => missing_results,
        });
        Self {
            id: round.id.clone(),
            name: round.name.clone(),
            blocked: round.blocked.is_some(),
            missing_results,
            slots: round.slots.iter().map(SlotResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BracketResponse {
    pub rounds: Vec<RoundResponse>,
    pub champion: Option<String>,
}

impl From<&ResolvedBracket> for BracketResponse {
    fn from(bracket: &ResolvedBracket) -> Self {
        Self {
            rounds: bracket.rounds.iter().map(RoundResponse::from).collect(),
            champion: bracket.champion.clone(),
        }
    }
}
