use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{GroupTable, QualifierRef, SlotKey, SlotReference, TournamentFormat};

/// A third-placed team as it enters the cross-group ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThirdPlaceCandidate {
    pub group: String,
    pub team: String,
    pub points: u32,
    pub goal_difference: i32,
    pub goals_for: i32,
    pub played: u32,
}

/// Qualifier pool derived from the group tables.
///
/// Only complete groups contribute. While any group match is missing the
/// pool is partial and `is_determined` is false.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Qualification {
    /// Final order of each complete group.
    pub positions: BTreeMap<String, Vec<String>>,
    pub group_winners: BTreeMap<String, String>,
    pub runners_up: BTreeMap<String, String>,
    pub third_place_ranking: Vec<ThirdPlaceCandidate>,
    pub best_thirds: Vec<ThirdPlaceCandidate>,
    pub pending_matches: usize,
}

impl Qualification {
    pub fn is_determined(&self) -> bool {
        self.pending_matches == 0
    }

    /// Team at a 1-based position of a complete group.
    pub fn team_at(&self, group: &str, position: usize) -> Option<&str> {
        self.positions
            .get(group)
            .and_then(|teams| teams.get(position.checked_sub(1)?))
            .map(String::as_str)
    }

    /// Qualifying third at a 1-based rank.
    pub fn best_third(&self, rank: usize) -> Option<&ThirdPlaceCandidate> {
        self.best_thirds.get(rank.checked_sub(1)?)
    }
}

/// Recomputes the qualifier pool from scratch.
pub fn resolve_qualification(format: &TournamentFormat, tables: &[GroupTable]) -> Qualification {
    let mut qualification = Qualification::default();

    for table in tables {
        qualification.pending_matches += table.missing_matches();

        let rows = match table.final_positions() {
            Ok(rows) => rows,
            Err(e) => {
                debug!("Excluding group from qualification: {}", e);
                continue;
            }
        };

        let order: Vec<String> = rows.iter().map(|r| r.team.clone()).collect();
        if let Some(first) = order.first() {
            qualification
                .group_winners
                .insert(table.group.clone(), first.clone());
        }
        if let Some(second) = order.get(1) {
            qualification
                .runners_up
                .insert(table.group.clone(), second.clone());
        }
        if let Some(third) = table.row_at(3) {
            qualification.third_place_ranking.push(ThirdPlaceCandidate {
                group: table.group.clone(),
                team: third.team.clone(),
                points: third.points,
                goal_difference: third.goal_difference,
                goals_for: third.goals_for,
                played: third.played,
            });
        }
        qualification.positions.insert(table.group.clone(), order);
    }

    qualification.third_place_ranking.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then(a.played.cmp(&b.played))
            .then(a.group.cmp(&b.group))
    });
    qualification.best_thirds = qualification
        .third_place_ranking
        .iter()
        .take(format.best_thirds)
        .cloned()
        .collect();

    qualification
}

/// Team placed behind each best-third reference, keyed by the referenced rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThirdPlaceAllocation {
    by_rank: BTreeMap<usize, String>,
}

impl ThirdPlaceAllocation {
    pub fn team_for(&self, rank: usize) -> Option<&str> {
        self.by_rank.get(&rank).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_rank.is_empty()
    }
}

struct ThirdSlot<'a> {
    key: SlotKey,
    rank: usize,
    eligible: &'a [String],
}

/// Places the qualifying thirds into the slots that reference them.
///
/// Without eligibility lists rank N fills the slot naming rank N. With them,
/// slots are filled in key order by the first assignment, trying thirds in
/// ranking order, that respects every slot's eligible groups.
pub fn allocate_best_thirds(
    format: &TournamentFormat,
    qualification: &Qualification,
) -> ThirdPlaceAllocation {
    if !qualification.is_determined() {
        return ThirdPlaceAllocation::default();
    }

    let mut slots: Vec<ThirdSlot<'_>> = format
        .knockout
        .rounds
        .iter()
        .flat_map(|round| round.slots.iter())
        .flat_map(|slot| [(slot.key, &slot.home), (slot.key, &slot.away)])
        .filter_map(|(key, reference)| match reference {
            SlotReference::Qualifier(QualifierRef::BestThird {
                rank,
                eligible_groups,
            }) => Some(ThirdSlot {
                key,
                rank: *rank,
                eligible: eligible_groups,
            }),
            _ => None,
        })
        .collect();
    slots.sort_by_key(|slot| slot.key);

    let by_rank_order = || ThirdPlaceAllocation {
        by_rank: slots
            .iter()
            .filter_map(|slot| {
                qualification
                    .best_third(slot.rank)
                    .map(|third| (slot.rank, third.team.clone()))
            })
            .collect(),
    };

    if slots.iter().all(|slot| slot.eligible.is_empty()) {
        return by_rank_order();
    }

    let mut used = vec![false; qualification.best_thirds.len()];
    let mut chosen = Vec::with_capacity(slots.len());
    if assign(&slots, &qualification.best_thirds, &mut used, &mut chosen) {
        let by_rank: BTreeMap<usize, String> = slots
            .iter()
            .zip(chosen)
            .map(|(slot, idx)| (slot.rank, qualification.best_thirds[idx].team.clone()))
            .collect();
        return ThirdPlaceAllocation { by_rank };
    }

    let groups: Vec<&str> = qualification
        .best_thirds
        .iter()
        .map(|third| third.group.as_str())
        .collect();
    warn!(
        "No eligible placement for best thirds from groups {:?}, falling back to rank order",
        groups
    );
    by_rank_order()
}

fn assign(
    slots: &[ThirdSlot<'_>],
    thirds: &[ThirdPlaceCandidate],
    used: &mut [bool],
    chosen: &mut Vec<usize>,
) -> bool {
    let Some(slot) = slots.get(chosen.len()) else {
        return true;
    };

    for (idx, third) in thirds.iter().enumerate() {
        if used[idx] || !(slot.eligible.is_empty() || slot.eligible.contains(&third.group)) {
            continue;
        }
        used[idx] = true;
        chosen.push(idx);
        if assign(slots, thirds, used, chosen) {
            return true;
        }
        chosen.pop();
        used[idx] = false;
    }
    false
}
