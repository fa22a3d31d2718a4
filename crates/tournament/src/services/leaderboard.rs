use serde::Serialize;

use super::presence::KnockoutScore;
use super::scoring::score_prediction;
use crate::models::{MatchId, Participant, PredictionSet, Score, TournamentFormat};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStageScore {
    pub points: u32,
    pub exact_hits: u32,
    pub outcome_hits: u32,
}

/// One group match as seen by a participant: their pick, the official
/// result and what the pick earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchBreakdown {
    pub match_id: MatchId,
    pub group: String,
    pub round: u32,
    pub home: String,
    pub away: String,
    pub predicted: Option<Score>,
    pub official: Option<Score>,
    pub points: u32,
}

pub fn match_breakdown(
    format: &TournamentFormat,
    official: &PredictionSet,
    picks: &PredictionSet,
) -> Vec<MatchBreakdown> {
    format
        .group_matches()
        .map(|(group, m)| {
            let match_id = m.id();
            let predicted = picks.result(&match_id);
            let actual = official.result(&match_id);
            let points = predicted
                .map(|p| score_prediction(actual, p, &format.points))
                .unwrap_or(0);
            MatchBreakdown {
                group: group.label.clone(),
                round: m.round,
                home: m.home.clone(),
                away: m.away.clone(),
                predicted,
                official: actual,
                points,
                match_id,
            }
        })
        .collect()
}

pub fn score_group_stage(
    format: &TournamentFormat,
    official: &PredictionSet,
    picks: &PredictionSet,
) -> GroupStageScore {
    let mut score = GroupStageScore::default();
    for (_, m) in format.group_matches() {
        let id = m.id();
        let (Some(actual), Some(predicted)) = (official.result(&id), picks.result(&id)) else {
            continue;
        };
        let points = score_prediction(Some(actual), predicted, &format.points);
        score.points += points;
        if actual == predicted {
            score.exact_hits += 1;
        } else if actual.outcome() == predicted.outcome() {
            score.outcome_hits += 1;
        }
    }
    score
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantScore {
    pub participant: Participant,
    pub group_stage: GroupStageScore,
    pub knockout: KnockoutScore,
    pub total: u32,
}

impl ParticipantScore {
    pub fn new(participant: Participant, group_stage: GroupStageScore, knockout: KnockoutScore) -> Self {
        let total = group_stage.points + knockout.total;
        Self {
            participant,
            group_stage,
            knockout,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub participant_id: String,
    pub name: String,
    pub total: u32,
    pub exact_hits: u32,
}

/// Orders by total, then exact hits, then name.
pub fn rank_participants(mut scores: Vec<ParticipantScore>) -> Vec<LeaderboardEntry> {
    scores.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then(b.group_stage.exact_hits.cmp(&a.group_stage.exact_hits))
            .then_with(|| a.participant.name.cmp(&b.participant.name))
    });

    scores
        .into_iter()
        .enumerate()
        .map(|(idx, score)| LeaderboardEntry {
            position: idx + 1,
            participant_id: score.participant.id,
            name: score.participant.name,
            total: score.total,
            exact_hits: score.group_stage.exact_hits,
        })
        .collect()
}
