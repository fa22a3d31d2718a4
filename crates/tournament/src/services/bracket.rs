use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::qualification::{Qualification, ThirdPlaceAllocation};
use crate::error::{EngineError, Result};
use crate::models::{
    Occupant, PredictionSet, QualifierRef, Score, SlotKey, SlotRecord, SlotReference,
    TournamentFormat,
};

#[derive(Debug, Clone)]
pub struct BracketNode {
    pub key: SlotKey,
    pub label: String,
    pub round: usize,
    pub home: SlotReference,
    pub away: SlotReference,
}

#[derive(Debug, Clone)]
pub struct BracketRound {
    pub id: String,
    pub name: String,
    /// Indexes into the node arena, in format order.
    pub nodes: Vec<usize>,
}

/// Static slot dependency graph: an arena of slots indexed by key.
///
/// Built once per format. Each round only depends on the one before it, and
/// the first round only on the qualifier pool.
#[derive(Debug, Clone)]
pub struct BracketGraph {
    nodes: Vec<BracketNode>,
    index: HashMap<SlotKey, usize>,
    rounds: Vec<BracketRound>,
    final_slot: SlotKey,
}

impl BracketGraph {
    pub fn from_format(format: &TournamentFormat) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut index = HashMap::new();
        let mut rounds = Vec::with_capacity(format.knockout.rounds.len());

        for (round_idx, round) in format.knockout.rounds.iter().enumerate() {
            let mut members = Vec::with_capacity(round.slots.len());
            for slot in &round.slots {
                if index.insert(slot.key, nodes.len()).is_some() {
                    return Err(EngineError::InvalidFormat(format!(
                        "Duplicate slot key: {}",
                        slot.key
                    )));
                }
                members.push(nodes.len());
                nodes.push(BracketNode {
                    key: slot.key,
                    label: slot
                        .label
                        .clone()
                        .unwrap_or_else(|| format!("Match {}", slot.key)),
                    round: round_idx,
                    home: slot.home.clone(),
                    away: slot.away.clone(),
                });
            }
            rounds.push(BracketRound {
                id: round.id.clone(),
                name: round.name.clone(),
                nodes: members,
            });
        }

        for node in &nodes {
            for reference in [&node.home, &node.away] {
                if let SlotReference::WinnerOf(upstream) | SlotReference::LoserOf(upstream) = reference {
                    let upstream_round = index.get(upstream).map(|&idx| nodes[idx].round);
                    if upstream_round.is_none() || upstream_round.map(|r| r + 1) != Some(node.round) {
                        return Err(EngineError::InvalidFormat(format!(
                            "Slot {} references slot {} outside the previous round",
                            node.key, upstream
                        )));
                    }
                }
            }
        }

        if !index.contains_key(&format.knockout.final_slot) {
            return Err(EngineError::UnknownSlot(format.knockout.final_slot));
        }

        Ok(Self {
            nodes,
            index,
            rounds,
            final_slot: format.knockout.final_slot,
        })
    }

    pub fn node(&self, key: SlotKey) -> Option<&BracketNode> {
        self.index.get(&key).map(|&idx| &self.nodes[idx])
    }

    pub fn rounds(&self) -> &[BracketRound] {
        &self.rounds
    }

    pub fn round_index(&self, id: &str) -> Option<usize> {
        self.rounds.iter().position(|round| round.id == id)
    }

    pub fn round_of(&self, key: SlotKey) -> Option<usize> {
        self.node(key).map(|node| node.round)
    }

    pub fn final_slot(&self) -> SlotKey {
        self.final_slot
    }

    pub fn round_nodes(&self, round: usize) -> impl Iterator<Item = &BracketNode> {
        self.rounds
            .get(round)
            .into_iter()
            .flat_map(move |round| round.nodes.iter().map(move |&idx| &self.nodes[idx]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSlot {
    pub key: SlotKey,
    pub label: String,
    pub home: Occupant,
    pub away: Occupant,
    /// Recorded pick, only while it still matches the resolved pair.
    pub winner: Option<String>,
    pub score: Option<Score>,
}

impl ResolvedSlot {
    pub fn is_ready(&self) -> bool {
        self.home.is_team() && self.away.is_team()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RoundBlock {
    GroupStageIncomplete { missing_results: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRound {
    pub id: String,
    pub name: String,
    pub slots: Vec<ResolvedSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<RoundBlock>,
}

impl ResolvedRound {
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .flat_map(|slot| [slot.home.team(), slot.away.team()])
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBracket {
    pub rounds: Vec<ResolvedRound>,
    pub champion: Option<String>,
}

/// Resolves slot occupants for one scope from a single snapshot.
///
/// The memo lives as long as the resolver, i.e. one read. Nothing is cached
/// across calls.
pub struct BracketResolver<'a> {
    graph: &'a BracketGraph,
    qualification: &'a Qualification,
    thirds: &'a ThirdPlaceAllocation,
    picks: &'a PredictionSet,
    memo: HashMap<SlotKey, (Occupant, Occupant)>,
}

impl<'a> BracketResolver<'a> {
    pub fn new(
        graph: &'a BracketGraph,
        qualification: &'a Qualification,
        thirds: &'a ThirdPlaceAllocation,
        picks: &'a PredictionSet,
    ) -> Self {
        Self {
            graph,
            qualification,
            thirds,
            picks,
            memo: HashMap::new(),
        }
    }

    /// The pair currently occupying a slot. Undetermined sides come back as
    /// `Tbd` or a placeholder, never as an error.
    pub fn resolve_slot(&mut self, key: SlotKey) -> Result<(Occupant, Occupant)> {
        if let Some(pair) = self.memo.get(&key) {
            return Ok(pair.clone());
        }
        let graph = self.graph;
        let node = graph.node(key).ok_or(EngineError::UnknownSlot(key))?;

        let home = self.resolve_reference(&node.home);
        let away = self.resolve_reference(&node.away);
        debug!("Slot {} resolves to {} vs {}", key, home, away);

        self.memo.insert(key, (home.clone(), away.clone()));
        Ok((home, away))
    }

    /// Winner of a slot, if one was recorded for the pair it currently holds.
    pub fn winner_of(&mut self, key: SlotKey) -> Option<String> {
        let (home, away) = self.resolve_slot(key).ok()?;
        let record = self.picks.slot(key)?;
        valid_winner(record, &home, &away).map(str::to_string)
    }

    pub fn loser_of(&mut self, key: SlotKey) -> Option<String> {
        let (home, away) = self.resolve_slot(key).ok()?;
        let record = self.picks.slot(key)?;
        let winner = valid_winner(record, &home, &away)?;
        if home.team() == Some(winner) {
            away.team().map(str::to_string)
        } else {
            home.team().map(str::to_string)
        }
    }

    fn resolve_reference(&mut self, reference: &SlotReference) -> Occupant {
        match reference {
            SlotReference::Team(name) => Occupant::Team(name.clone()),
            SlotReference::WinnerOf(upstream) => {
                self.winner_of(*upstream).map_or(Occupant::Tbd, Occupant::Team)
            }
            SlotReference::LoserOf(upstream) => {
                self.loser_of(*upstream).map_or(Occupant::Tbd, Occupant::Team)
            }
            SlotReference::Qualifier(qualifier) => self.resolve_qualifier(qualifier),
        }
    }

    fn resolve_qualifier(&self, qualifier: &QualifierRef) -> Occupant {
        if !self.qualification.is_determined() {
            return Occupant::Placeholder(qualifier.placeholder());
        }
        let team = match qualifier {
            QualifierRef::GroupPosition { group, position } => {
                self.qualification.team_at(group, *position)
            }
            QualifierRef::BestThird { rank, .. } => self.thirds.team_for(*rank),
        };
        team.map_or_else(
            || Occupant::Placeholder(qualifier.placeholder()),
            |team| Occupant::Team(team.to_string()),
        )
    }

    pub fn resolve_round(&mut self, round: usize) -> Result<ResolvedRound> {
        let (graph, picks) = (self.graph, self.picks);
        let layout = graph
            .rounds()
            .get(round)
            .ok_or_else(|| EngineError::UnknownRound(round.to_string()))?;

        let blocked = (round == 0 && !self.qualification.is_determined()).then_some(
            RoundBlock::GroupStageIncomplete {
                missing_results: self.qualification.pending_matches,
            },
        );

        let mut slots = Vec::with_capacity(layout.nodes.len());
        for node in graph.round_nodes(round) {
            let (home, away) = self.resolve_slot(node.key)?;
            let record = picks.slot(node.key).filter(|r| r.has_pair(&home, &away));
            slots.push(ResolvedSlot {
                key: node.key,
                label: node.label.clone(),
                winner: record
                    .and_then(|r| valid_winner(r, &home, &away))
                    .map(str::to_string),
                score: record.and_then(|r| r.score),
                home,
                away,
            });
        }

        Ok(ResolvedRound {
            id: layout.id.clone(),
            name: layout.name.clone(),
            slots,
            blocked,
        })
    }

    pub fn resolve_all(&mut self) -> Result<ResolvedBracket> {
        let rounds = (0..self.graph.rounds().len())
            .map(|idx| self.resolve_round(idx))
            .collect::<Result<Vec<_>>>()?;
        let champion = self.winner_of(self.graph.final_slot());
        Ok(ResolvedBracket { rounds, champion })
    }
}

/// A stored pick only counts for the exact pair it was recorded against.
fn valid_winner<'r>(record: &'r SlotRecord, home: &Occupant, away: &Occupant) -> Option<&'r str> {
    if !record.has_pair(home, away) || !home.is_team() || !away.is_team() {
        return None;
    }
    let winner = record.winner.as_deref()?;
    (home.team() == Some(winner) || away.team() == Some(winner)).then_some(winner)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{KnockoutSpec, PointsTable, RoundSpec, SlotSpec};
    use crate::services::qualification::tests::draw_order_results;
    use crate::services::qualification::{allocate_best_thirds, resolve_qualification};
    use crate::services::standings::compute_all_tables;

    fn team(name: &str) -> SlotReference {
        SlotReference::Team(name.to_string())
    }

    fn slot(key: SlotKey, home: SlotReference, away: SlotReference) -> SlotSpec {
        SlotSpec {
            key,
            label: None,
            home,
            away,
        }
    }

    /// Literal-team bracket: 74 and 77 feed 89, 75 and 78 feed 90, and the
    /// last round holds a third-place match and the final.
    pub(crate) fn literal_format() -> TournamentFormat {
        use SlotReference::{LoserOf, WinnerOf};
        let round = |id: &str, slots| RoundSpec {
            id: id.to_string(),
            name: id.to_string(),
            slots,
        };
        TournamentFormat {
            name: "Mini".to_string(),
            teams_per_group: 4,
            best_thirds: 0,
            groups: vec![],
            knockout: KnockoutSpec {
                rounds: vec![
                    round(
                        "QF",
                        vec![
                            slot(74, team("X"), team("Y")),
                            slot(77, team("Z"), team("W")),
                            slot(75, team("P"), team("Q")),
                            slot(78, team("R"), team("S")),
                        ],
                    ),
                    round(
                        "SF",
                        vec![slot(89, WinnerOf(74), WinnerOf(77)), slot(90, WinnerOf(75), WinnerOf(78))],
                    ),
                    round(
                        "F",
                        vec![slot(103, LoserOf(89), LoserOf(90)), slot(104, WinnerOf(89), WinnerOf(90))],
                    ),
                ],
                final_slot: 104,
            },
            points: PointsTable::default(),
        }
    }

    fn pick(home: &str, away: &str, winner: &str) -> SlotRecord {
        SlotRecord {
            winner: Some(winner.to_string()),
            ..SlotRecord::pairing(Occupant::Team(home.to_string()), Occupant::Team(away.to_string()))
        }
    }

    struct Fixture {
        graph: BracketGraph,
        qualification: Qualification,
        thirds: ThirdPlaceAllocation,
    }

    impl Fixture {
        fn literal() -> Self {
            Self {
                graph: BracketGraph::from_format(&literal_format()).unwrap(),
                qualification: Qualification::default(),
                thirds: ThirdPlaceAllocation::default(),
            }
        }

        fn resolver<'a>(&'a self, picks: &'a PredictionSet) -> BracketResolver<'a> {
            BracketResolver::new(&self.graph, &self.qualification, &self.thirds, picks)
        }
    }

    #[test]
    fn test_winner_feeds_next_round_with_tbd() {
        let fixture = Fixture::literal();
        let picks = PredictionSet::default().with_slot(74, pick("X", "Y", "X"));
        let mut resolver = fixture.resolver(&picks);

        assert_eq!(
            resolver.resolve_slot(89).unwrap(),
            (Occupant::Team("X".to_string()), Occupant::Tbd)
        );
        assert_eq!(resolver.resolve_slot(104).unwrap(), (Occupant::Tbd, Occupant::Tbd));
    }

    #[test]
    fn test_stale_pick_is_ignored() {
        let fixture = Fixture::literal();
        // 89 was picked while 74 was won by Y. Now X holds it.
        let picks = PredictionSet::default()
            .with_slot(74, pick("X", "Y", "X"))
            .with_slot(77, pick("Z", "W", "Z"))
            .with_slot(89, pick("Y", "Z", "Y"));
        let mut resolver = fixture.resolver(&picks);

        let round = resolver.resolve_round(1).unwrap();
        assert_eq!(round.slots[0].home, Occupant::Team("X".to_string()));
        assert_eq!(round.slots[0].winner, None);
        assert_eq!(resolver.winner_of(89), None);
    }

    #[test]
    fn test_losers_feed_third_place_match() {
        let fixture = Fixture::literal();
        let picks = PredictionSet::default()
            .with_slot(74, pick("X", "Y", "Y"))
            .with_slot(77, pick("Z", "W", "W"))
            .with_slot(75, pick("P", "Q", "P"))
            .with_slot(78, pick("R", "S", "S"))
            .with_slot(89, pick("Y", "W", "W"))
            .with_slot(90, pick("P", "S", "P"))
            .with_slot(104, pick("W", "P", "P"));
        let bracket = fixture.resolver(&picks).resolve_all().unwrap();

        let third_place = &bracket.rounds[2].slots[0];
        assert_eq!(third_place.home, Occupant::Team("Y".to_string()));
        assert_eq!(third_place.away, Occupant::Team("S".to_string()));
        assert_eq!(bracket.champion.as_deref(), Some("P"));
        assert_eq!(bracket.rounds[0].teams().count(), 8);
    }

    #[test]
    fn test_pick_outside_pair_is_ignored() {
        let fixture = Fixture::literal();
        let picks = PredictionSet::default().with_slot(74, pick("X", "Y", "Z"));
        assert_eq!(fixture.resolver(&picks).winner_of(74), None);
    }

    #[test]
    fn test_unknown_slot() {
        let fixture = Fixture::literal();
        let picks = PredictionSet::default();
        assert!(matches!(
            fixture.resolver(&picks).resolve_slot(1),
            Err(EngineError::UnknownSlot(1))
        ));
    }

    #[test]
    fn test_first_round_blocked_until_groups_complete() {
        let format = TournamentFormat::world_cup_2026().unwrap();
        let graph = BracketGraph::from_format(&format).unwrap();
        let picks = PredictionSet::default();
        let qualification = resolve_qualification(&format, &compute_all_tables(&format, &picks));
        let thirds = allocate_best_thirds(&format, &qualification);
        let mut resolver = BracketResolver::new(&graph, &qualification, &thirds, &picks);

        let round = resolver.resolve_round(0).unwrap();
        assert_eq!(
            round.blocked,
            Some(RoundBlock::GroupStageIncomplete { missing_results: 72 })
        );
        assert!(round.slots.iter().all(|s| !s.home.is_team() && !s.away.is_team()));
        assert_eq!(
            round.slots[1].away,
            Occupant::Placeholder("Best Third #1".to_string())
        );
    }

    #[test]
    fn test_world_cup_first_round() {
        let format = TournamentFormat::world_cup_2026().unwrap();
        let graph = BracketGraph::from_format(&format).unwrap();
        let results = draw_order_results(&format);
        let qualification = resolve_qualification(&format, &compute_all_tables(&format, &results));
        let thirds = allocate_best_thirds(&format, &qualification);
        let mut resolver = BracketResolver::new(&graph, &qualification, &thirds, &results);

        let round = resolver.resolve_round(0).unwrap();
        assert_eq!(round.blocked, None);
        assert!(round.slots.iter().all(ResolvedSlot::is_ready));
        assert_eq!(round.teams().count(), 32);

        let m74 = &round.slots[1];
        assert_eq!(m74.key, 74);
        assert_eq!(m74.home, Occupant::Team("Alemania".to_string()));
        assert_eq!(m74.away, Occupant::Team("Corea del Sur".to_string()));

        let m76 = &round.slots[3];
        assert_eq!(m76.home, Occupant::Team("Brasil".to_string()));
        assert_eq!(m76.away, Occupant::Team("Japón".to_string()));
    }

    #[test]
    fn test_graph_rejects_skipping_reference() {
        let mut format = literal_format();
        format.knockout.rounds[2].slots[1].home = SlotReference::WinnerOf(74);
        assert!(matches!(
            BracketGraph::from_format(&format),
            Err(EngineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_graph_lookups() {
        let graph = BracketGraph::from_format(&literal_format()).unwrap();
        assert_eq!(graph.round_of(90), Some(1));
        assert_eq!(graph.round_index("F"), Some(2));
        assert_eq!(graph.final_slot(), 104);
        assert_eq!(graph.node(103).unwrap().label, "Match 103");
        assert_eq!(graph.round_nodes(1).count(), 2);
    }
}
