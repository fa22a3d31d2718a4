use std::collections::BTreeSet;

use serde::Serialize;

use super::bracket::{ResolvedBracket, ResolvedRound};
use crate::models::{PointsTable, SlotKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundPresence {
    pub round: String,
    pub matched_teams: Vec<String>,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KnockoutScore {
    pub rounds: Vec<RoundPresence>,
    pub champion_bonus: u32,
    pub total: u32,
}

/// Presence points of a participant's bracket against the official one.
///
/// A team scores for a round when it appears anywhere in that round of both
/// brackets, whatever the slot. In the round holding the final only the final
/// itself counts, so reaching the third-place match earns nothing.
pub fn score_knockout(
    official: &ResolvedBracket,
    participant: &ResolvedBracket,
    final_slot: SlotKey,
    points: &PointsTable,
) -> KnockoutScore {
    let mut score = KnockoutScore::default();

    for (official_round, participant_round) in official.rounds.iter().zip(&participant.rounds) {
        let official_teams = round_teams(official_round, final_slot);
        let participant_teams = round_teams(participant_round, final_slot);
        let matched_teams: Vec<String> = official_teams
            .intersection(&participant_teams)
            .map(|team| team.to_string())
            .collect();
        let round_points = matched_teams.len() as u32 * points.presence_points(&official_round.id);

        score.total += round_points;
        score.rounds.push(RoundPresence {
            round: official_round.id.clone(),
            matched_teams,
            points: round_points,
        });
    }

    if official.champion.is_some() && official.champion == participant.champion {
        score.champion_bonus = points.champion_bonus;
        score.total += points.champion_bonus;
    }

    score
}

fn round_teams(round: &ResolvedRound, final_slot: SlotKey) -> BTreeSet<&str> {
    let holds_final = round.slots.iter().any(|slot| slot.key == final_slot);
    round
        .slots
        .iter()
        .filter(|slot| !holds_final || slot.key == final_slot)
        .flat_map(|slot| [slot.home.team(), slot.away.team()])
        .flatten()
        .collect()
}
