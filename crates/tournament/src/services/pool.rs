use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::bracket::{BracketGraph, BracketResolver, ResolvedBracket, ResolvedRound, ResolvedSlot};
use super::leaderboard::{
    LeaderboardEntry, MatchBreakdown, ParticipantScore, match_breakdown, rank_participants,
    score_group_stage,
};
use super::presence::score_knockout;
use super::qualification::{
    Qualification, ThirdPlaceAllocation, allocate_best_thirds, resolve_qualification,
};
use super::standings::compute_all_tables;
use crate::error::{EngineError, Result};
use crate::models::{
    GroupTable, MatchId, Participant, PredictionKey, PredictionSet, PredictionValue, Scope, Score,
    SlotKey, SlotRecord, TournamentFormat,
};
use crate::store::{PredictionStore, StoreError};

const MAX_WRITE_ATTEMPTS: usize = 3;

/// Everything derived from one snapshot of a scope.
struct Derived {
    picks: PredictionSet,
    qualification: Qualification,
    thirds: ThirdPlaceAllocation,
}

/// Entry point of the engine for delivery layers.
///
/// Reads derive everything from a fresh snapshot of the scope. Writes go
/// through the store and then re-run the bracket from the changed key.
#[derive(Clone)]
pub struct PoolService {
    format: Arc<TournamentFormat>,
    graph: Arc<BracketGraph>,
    store: Arc<dyn PredictionStore>,
    lock_at: Option<DateTime<Utc>>,
}

impl PoolService {
    pub fn new(format: TournamentFormat, store: Arc<dyn PredictionStore>) -> Result<Self> {
        let graph = BracketGraph::from_format(&format)?;
        Ok(Self {
            format: Arc::new(format),
            graph: Arc::new(graph),
            store,
            lock_at: None,
        })
    }

    /// Participant predictions are read-only from this instant on.
    pub fn with_lock_at(mut self, lock_at: Option<DateTime<Utc>>) -> Self {
        self.lock_at = lock_at;
        self
    }

    pub fn format(&self) -> &TournamentFormat {
        &self.format
    }

    pub fn graph(&self) -> &BracketGraph {
        &self.graph
    }

    pub fn lock_at(&self) -> Option<DateTime<Utc>> {
        self.lock_at
    }

    pub async fn snapshot(&self, scope: &Scope) -> Result<PredictionSet> {
        let entries = self.store.entries(scope).await?;
        Ok(PredictionSet::from_entries(entries))
    }

    fn derive(&self, picks: PredictionSet) -> Derived {
        let tables = compute_all_tables(&self.format, &picks);
        let qualification = resolve_qualification(&self.format, &tables);
        let thirds = allocate_best_thirds(&self.format, &qualification);
        Derived {
            picks,
            qualification,
            thirds,
        }
    }

    async fn derive_scope(&self, scope: &Scope) -> Result<Derived> {
        let picks = self.snapshot(scope).await?;
        Ok(self.derive(picks))
    }

    fn resolver<'a>(&'a self, derived: &'a Derived) -> BracketResolver<'a> {
        BracketResolver::new(
            &self.graph,
            &derived.qualification,
            &derived.thirds,
            &derived.picks,
        )
    }

    fn check_lock(&self, scope: &Scope) -> Result<()> {
        match (scope, self.lock_at) {
            (Scope::Participant(_), Some(lock_at)) if Utc::now() >= lock_at => {
                Err(EngineError::PredictionsLocked(lock_at))
            }
            _ => Ok(()),
        }
    }

    async fn ensure_scope(&self, scope: &Scope) -> Result<()> {
        if let Scope::Participant(id) = scope {
            self.participant(id).await?;
        }
        Ok(())
    }

    /// Raw value under a slot key, read straight from the store. An
    /// unreadable value is deleted; the flag reports that it was.
    async fn read_slot_value(
        &self,
        scope: &Scope,
        key: &PredictionKey,
    ) -> Result<(Option<PredictionValue>, bool)> {
        match self.store.get(scope, key).await {
            Ok(value) => Ok((value, false)),
            Err(StoreError::Corrupt { key: raw, reason }) => {
                warn!("Dropping unreadable value under {} for {}: {}", raw, scope, reason);
                self.store.delete(scope, key).await?;
                Ok((None, true))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_slot(&self, key: SlotKey) -> Result<usize> {
        self.graph.round_of(key).ok_or(EngineError::UnknownSlot(key))
    }

    /// Records a group match score and returns the refreshed table of its group.
    pub async fn submit_result(
        &self,
        scope: &Scope,
        match_id: &MatchId,
        home: i32,
        away: i32,
    ) -> Result<GroupTable> {
        self.check_lock(scope)?;
        let score = Score::checked(home, away)?;
        let (group, _) = self
            .format
            .find_match(match_id)
            .ok_or_else(|| EngineError::UnknownMatch(match_id.to_string()))?;
        let label = group.label.clone();
        self.ensure_scope(scope).await?;

        let key = PredictionKey::Match(match_id.clone());
        self.store
            .set(scope, &key, &PredictionValue::Score(score))
            .await?;
        info!("Recorded {} {} for {}", match_id, score, scope);

        self.recompute_from(scope, &key).await?;
        self.group_table(scope, &label).await
    }

    pub async fn clear_result(&self, scope: &Scope, match_id: &MatchId) -> Result<bool> {
        self.check_lock(scope)?;
        if self.format.find_match(match_id).is_none() {
            return Err(EngineError::UnknownMatch(match_id.to_string()));
        }
        self.ensure_scope(scope).await?;

        let key = PredictionKey::Match(match_id.clone());
        let removed = self.store.delete(scope, &key).await?;
        if removed {
            info!("Cleared {} for {}", match_id, scope);
            self.recompute_from(scope, &key).await?;
        }
        Ok(removed)
    }

    pub async fn group_tables(&self, scope: &Scope) -> Result<Vec<GroupTable>> {
        self.ensure_scope(scope).await?;
        let picks = self.snapshot(scope).await?;
        Ok(compute_all_tables(&self.format, &picks))
    }

    pub async fn group_table(&self, scope: &Scope, label: &str) -> Result<GroupTable> {
        self.group_tables(scope)
            .await?
            .into_iter()
            .find(|table| table.group == label)
            .ok_or_else(|| EngineError::UnknownGroup(label.to_string()))
    }

    pub async fn qualification(&self, scope: &Scope) -> Result<Qualification> {
        self.ensure_scope(scope).await?;
        Ok(self.derive_scope(scope).await?.qualification)
    }

    pub async fn resolve_slot(&self, scope: &Scope, key: SlotKey) -> Result<ResolvedSlot> {
        let round = self.ensure_slot(key)?;
        self.ensure_scope(scope).await?;
        let derived = self.derive_scope(scope).await?;
        let resolved = self.resolver(&derived).resolve_round(round)?;
        resolved
            .slots
            .into_iter()
            .find(|slot| slot.key == key)
            .ok_or(EngineError::UnknownSlot(key))
    }

    /// Generates a round for a scope, clearing every stored pick whose pair
    /// no longer matches what the round resolves to.
    pub async fn generate_round(&self, scope: &Scope, round_id: &str) -> Result<ResolvedRound> {
        let round = self
            .graph
            .round_index(round_id)
            .ok_or_else(|| EngineError::UnknownRound(round_id.to_string()))?;
        self.ensure_scope(scope).await?;
        let (resolved, _) = self.sync_round(scope, round).await?;
        Ok(resolved)
    }

    /// Re-derives every round affected by `changed` and returns how many
    /// stale slot records were reset. Stops at a blocked round.
    pub async fn recompute_from(&self, scope: &Scope, changed: &PredictionKey) -> Result<usize> {
        let start = match changed {
            PredictionKey::Match(_) => 0,
            PredictionKey::Slot(key) => self.ensure_slot(*key)? + 1,
        };

        let mut invalidated = 0;
        for round in start..self.graph.rounds().len() {
            let (resolved, cleared) = self.sync_round(scope, round).await?;
            invalidated += cleared;
            if resolved.blocked.is_some() {
                debug!("Round {} is blocked, stopping recompute", resolved.id);
                break;
            }
        }
        if invalidated > 0 {
            info!(
                "Recompute from {} reset {} slot(s) for {}",
                changed, invalidated, scope
            );
        }
        Ok(invalidated)
    }

    async fn sync_round(&self, scope: &Scope, round: usize) -> Result<(ResolvedRound, usize)> {
        let derived = self.derive_scope(scope).await?;
        let resolved = self.resolver(&derived).resolve_round(round)?;
        if resolved.blocked.is_some() {
            return Ok((resolved, 0));
        }

        let mut cleared = 0;
        for slot in &resolved.slots {
            let Some(stored) = derived.picks.slot(slot.key) else {
                continue;
            };
            if stored.has_pair(&slot.home, &slot.away) {
                continue;
            }

            let key = PredictionKey::Slot(slot.key);
            let expected = PredictionValue::Slot(stored.clone());
            let fresh =
                PredictionValue::Slot(SlotRecord::pairing(slot.home.clone(), slot.away.clone()));
            if self
                .store
                .compare_and_swap(scope, &key, Some(&expected), Some(&fresh))
                .await?
            {
                cleared += 1;
                info!(
                    "Slot {} for {} now {} vs {}, was {} vs {} (pick {:?} dropped)",
                    slot.key, scope, slot.home, slot.away, stored.home, stored.away, stored.winner
                );
            } else {
                warn!(
                    "Slot {} for {} changed during regeneration, leaving it to the writer",
                    slot.key, scope
                );
            }
        }
        Ok((resolved, cleared))
    }

    /// Records the picked winner of a slot. Both sides must already be teams.
    pub async fn record_winner(
        &self,
        scope: &Scope,
        key: SlotKey,
        team: &str,
        score: Option<Score>,
    ) -> Result<ResolvedSlot> {
        self.check_lock(scope)?;
        self.ensure_slot(key)?;
        if let Some(score) = score {
            Score::checked(score.home, score.away)?;
        }
        self.ensure_scope(scope).await?;

        let prediction_key = PredictionKey::Slot(key);
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let derived = self.derive_scope(scope).await?;
            let (home, away) = self.resolver(&derived).resolve_slot(key)?;
            if !home.is_team() || !away.is_team() {
                return Err(EngineError::UnresolvedSlotReference {
                    slot: key,
                    home: home.to_string(),
                    away: away.to_string(),
                });
            }
            if home.team() != Some(team) && away.team() != Some(team) {
                return Err(EngineError::UnknownWinnerChoice {
                    slot: key,
                    choice: team.to_string(),
                    home: home.to_string(),
                    away: away.to_string(),
                });
            }

            let (expected, _) = self.read_slot_value(scope, &prediction_key).await?;
            if let Some(other @ PredictionValue::Score(_)) = &expected {
                warn!("Overwriting non-slot value {:?} under slot {}", other, key);
            }
            let record = SlotRecord {
                winner: Some(team.to_string()),
                score,
                ..SlotRecord::pairing(home, away)
            };
            let written = self
                .store
                .compare_and_swap(
                    scope,
                    &prediction_key,
                    expected.as_ref(),
                    Some(&PredictionValue::Slot(record)),
                )
                .await?;
            if written {
                info!("Recorded {} as winner of slot {} for {}", team, key, scope);
                self.recompute_from(scope, &prediction_key).await?;
                return self.resolve_slot(scope, key).await;
            }
            debug!("Slot {} changed concurrently (attempt {})", key, attempt);
        }

        Err(EngineError::WriteConflict(format!("slot {key}")))
    }

    /// Removes a slot's winner and any score stored with it. Returns whether
    /// anything was cleared.
    pub async fn clear_winner(&self, scope: &Scope, key: SlotKey) -> Result<bool> {
        self.check_lock(scope)?;
        self.ensure_slot(key)?;
        self.ensure_scope(scope).await?;

        let prediction_key = PredictionKey::Slot(key);
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let stored = match self.read_slot_value(scope, &prediction_key).await? {
                (Some(PredictionValue::Slot(record)), _) => record,
                (Some(other), _) => {
                    warn!("Dropping non-slot value {:?} under slot {}", other, key);
                    let removed = self
                        .store
                        .compare_and_swap(scope, &prediction_key, Some(&other), None)
                        .await?;
                    if removed {
                        return Ok(true);
                    }
                    debug!("Slot {} changed concurrently (attempt {})", key, attempt);
                    continue;
                }
                (None, dropped) => return Ok(dropped),
            };
            if stored.winner.is_none() && stored.score.is_none() {
                return Ok(false);
            }

            let cleared = SlotRecord::pairing(stored.home.clone(), stored.away.clone());
            let written = self
                .store
                .compare_and_swap(
                    scope,
                    &prediction_key,
                    Some(&PredictionValue::Slot(stored)),
                    Some(&PredictionValue::Slot(cleared)),
                )
                .await?;
            if written {
                info!("Cleared winner of slot {} for {}", key, scope);
                self.recompute_from(scope, &prediction_key).await?;
                return Ok(true);
            }
            debug!("Slot {} changed concurrently (attempt {})", key, attempt);
        }

        Err(EngineError::WriteConflict(format!("slot {key}")))
    }

    pub async fn bracket(&self, scope: &Scope) -> Result<ResolvedBracket> {
        self.ensure_scope(scope).await?;
        let derived = self.derive_scope(scope).await?;
        self.resolver(&derived).resolve_all()
    }

    /// Deletes every prediction of a scope.
    pub async fn reset(&self, scope: &Scope) -> Result<u64> {
        self.check_lock(scope)?;
        self.ensure_scope(scope).await?;
        let removed = self.store.clear_scope(scope).await?;
        info!("Reset {}: {} prediction(s) removed", scope, removed);
        Ok(removed)
    }

    pub async fn create_participant(&self, name: &str) -> Result<Participant> {
        let participant = self.store.create_participant(name.trim()).await?;
        info!("Registered participant {} ({})", participant.name, participant.id);
        Ok(participant)
    }

    pub async fn participants(&self) -> Result<Vec<Participant>> {
        Ok(self.store.list_participants().await?)
    }

    async fn participant(&self, id: &str) -> Result<Participant> {
        self.store
            .get_participant(id)
            .await?
            .ok_or_else(|| EngineError::UnknownParticipant(id.to_string()))
    }

    fn score_against(
        &self,
        participant: Participant,
        official: &PredictionSet,
        official_bracket: &ResolvedBracket,
        picks: PredictionSet,
    ) -> Result<ParticipantScore> {
        let group_stage = score_group_stage(&self.format, official, &picks);
        let derived = self.derive(picks);
        let bracket = self.resolver(&derived).resolve_all()?;
        let knockout = score_knockout(
            official_bracket,
            &bracket,
            self.graph.final_slot(),
            &self.format.points,
        );
        Ok(ParticipantScore::new(participant, group_stage, knockout))
    }

    pub async fn participant_score(&self, participant_id: &str) -> Result<ParticipantScore> {
        let participant = self.participant(participant_id).await?;
        let official = self.derive_scope(&Scope::Official).await?;
        let official_bracket = self.resolver(&official).resolve_all()?;
        let picks = self.snapshot(&participant.scope()).await?;
        self.score_against(participant, &official.picks, &official_bracket, picks)
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let official = self.derive_scope(&Scope::Official).await?;
        let official_bracket = self.resolver(&official).resolve_all()?;

        let mut scores = Vec::new();
        for participant in self.store.list_participants().await? {
            let picks = self.snapshot(&participant.scope()).await?;
            scores.push(self.score_against(participant, &official.picks, &official_bracket, picks)?);
        }
        Ok(rank_participants(scores))
    }

    /// Participants whose prediction of a match equals the official result.
    pub async fn exact_hitters(&self, match_id: &MatchId) -> Result<Vec<Participant>> {
        if self.format.find_match(match_id).is_none() {
            return Err(EngineError::UnknownMatch(match_id.to_string()));
        }
        let key = PredictionKey::Match(match_id.clone());
        let Some(PredictionValue::Score(actual)) = self.store.get(&Scope::Official, &key).await?
        else {
            return Ok(Vec::new());
        };

        let mut hitters = Vec::new();
        for participant in self.store.list_participants().await? {
            let predicted = self.store.get(&participant.scope(), &key).await?;
            if predicted == Some(PredictionValue::Score(actual)) {
                hitters.push(participant);
            }
        }
        Ok(hitters)
    }

    pub async fn match_breakdown(&self, participant_id: &str) -> Result<Vec<MatchBreakdown>> {
        let participant = self.participant(participant_id).await?;
        let official = self.snapshot(&Scope::Official).await?;
        let picks = self.snapshot(&participant.scope()).await?;
        Ok(match_breakdown(&self.format, &official, &picks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Occupant;
    use crate::services::bracket::RoundBlock;
    use crate::services::bracket::tests::literal_format;
    use crate::services::qualification::tests::draw_order_results;
    use crate::store::{MemoryStore, StoreResult};

    fn setup(format: TournamentFormat) -> (PoolService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = PoolService::new(format, store.clone()).unwrap();
        (service, store)
    }

    fn team(name: &str) -> Occupant {
        Occupant::Team(name.to_string())
    }

    async fn stored_slot(store: &MemoryStore, scope: &Scope, key: SlotKey) -> Option<SlotRecord> {
        match store.get(scope, &PredictionKey::Slot(key)).await.unwrap() {
            Some(PredictionValue::Slot(record)) => Some(record),
            _ => None,
        }
    }

    async fn record_all(service: &PoolService, scope: &Scope, picks: &[(SlotKey, &str)]) {
        for &(key, winner) in picks {
            service.record_winner(scope, key, winner, None).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_submit_result_returns_group_table() {
        let (service, _) = setup(TournamentFormat::world_cup_2026().unwrap());
        let table = service
            .submit_result(&Scope::Official, &MatchId::new("México", "Sudáfrica"), 2, 0)
            .await
            .unwrap();

        assert_eq!(table.group, "A");
        assert_eq!(table.rows[0].team, "México");
        assert_eq!(table.rows[0].points, 3);
        assert_eq!(table.played_matches, 1);
    }

    #[tokio::test]
    async fn test_submit_result_validation() {
        let (service, _) = setup(TournamentFormat::world_cup_2026().unwrap());
        let opener = MatchId::new("México", "Sudáfrica");

        let err = service
            .submit_result(&Scope::Official, &opener, -1, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidResult { home: -1, away: 0 }));
        assert!(err.is_validation());

        let err = service
            .submit_result(&Scope::Official, &MatchId::from("México vs Brasil"), 1, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownMatch(_)));

        let err = service
            .submit_result(&Scope::participant("ghost"), &opener, 1, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownParticipant(_)));
    }

    #[tokio::test]
    async fn test_oversized_scores_never_reach_the_store() {
        let (service, store) = setup(TournamentFormat::world_cup_2026().unwrap());
        for id in [
            MatchId::new("México", "Sudáfrica"),
            MatchId::new("México", "Corea del Sur"),
        ] {
            let err = service
                .submit_result(&Scope::Official, &id, i32::MAX, 0)
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidResult { .. }));
        }

        assert!(store.entries(&Scope::Official).await.unwrap().is_empty());
        let table = service.group_table(&Scope::Official, "A").await.unwrap();
        assert_eq!(table.played_matches, 0);

        let err = service
            .record_winner(&Scope::Official, 74, "X", Some(Score::new(100, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidResult { .. }));
    }

    #[tokio::test]
    async fn test_lock_applies_to_participants_only() {
        let (service, _) = setup(TournamentFormat::world_cup_2026().unwrap());
        let service = service.with_lock_at(Some(Utc::now() - chrono::Duration::hours(1)));
        let ana = service.create_participant("Ana").await.unwrap();
        let opener = MatchId::new("México", "Sudáfrica");

        let err = service
            .submit_result(&ana.scope(), &opener, 1, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PredictionsLocked(_)));
        assert!(service.reset(&ana.scope()).await.is_err());
        assert!(service
            .submit_result(&Scope::Official, &opener, 1, 0)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unresolved_side_rejects_winner() {
        let (service, _) = setup(literal_format());
        let scope = Scope::Official;
        service.record_winner(&scope, 74, "X", None).await.unwrap();

        let slot = service.resolve_slot(&scope, 89).await.unwrap();
        assert_eq!(slot.home, team("X"));
        assert_eq!(slot.away, Occupant::Tbd);

        let err = service
            .record_winner(&scope, 89, "X", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnresolvedSlotReference { slot: 89, .. }));
    }

    #[tokio::test]
    async fn test_unknown_winner_choice() {
        let (service, _) = setup(literal_format());
        let err = service
            .record_winner(&Scope::Official, 74, "Z", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownWinnerChoice { slot: 74, .. }));

        let err = service
            .record_winner(&Scope::Official, 7, "X", None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownSlot(7)));
    }

    #[tokio::test]
    async fn test_upstream_change_clears_downstream_picks() {
        let (service, store) = setup(literal_format());
        let scope = Scope::Official;
        record_all(
            &service,
            &scope,
            &[(74, "X"), (77, "Z"), (89, "X"), (75, "P"), (78, "R"), (90, "P"), (104, "X")],
        )
        .await;
        assert_eq!(service.bracket(&scope).await.unwrap().champion.as_deref(), Some("X"));

        service.record_winner(&scope, 74, "Y", None).await.unwrap();

        let m89 = stored_slot(&store, &scope, 89).await.unwrap();
        assert_eq!((m89.home, m89.away, m89.winner), (team("Y"), team("Z"), None));
        let m104 = stored_slot(&store, &scope, 104).await.unwrap();
        assert_eq!((m104.home, m104.away, m104.winner), (Occupant::Tbd, team("P"), None));
        assert_eq!(stored_slot(&store, &scope, 90).await.unwrap().winner.as_deref(), Some("P"));

        let bracket = service.bracket(&scope).await.unwrap();
        assert_eq!(bracket.champion, None);
        assert_eq!(bracket.rounds[1].slots[0].winner, None);
    }

    #[tokio::test]
    async fn test_same_pick_again_keeps_downstream() {
        let (service, store) = setup(literal_format());
        let scope = Scope::Official;
        record_all(&service, &scope, &[(74, "X"), (77, "Z"), (89, "Z")]).await;

        service.record_winner(&scope, 74, "X", None).await.unwrap();
        assert_eq!(stored_slot(&store, &scope, 89).await.unwrap().winner.as_deref(), Some("Z"));
    }

    #[tokio::test]
    async fn test_clear_winner_removes_score_and_cascades() {
        let (service, store) = setup(literal_format());
        let scope = Scope::Official;
        service
            .record_winner(&scope, 74, "X", Some(Score::new(2, 1)))
            .await
            .unwrap();
        record_all(&service, &scope, &[(77, "W"), (89, "W")]).await;

        assert!(service.clear_winner(&scope, 74).await.unwrap());
        let m74 = stored_slot(&store, &scope, 74).await.unwrap();
        assert_eq!((m74.winner, m74.score), (None, None));
        assert_eq!(stored_slot(&store, &scope, 89).await.unwrap().winner, None);
        assert!(!service.clear_winner(&scope, 74).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_slot_value_under_slot_key_is_replaced() {
        let (service, store) = setup(literal_format());
        let scope = Scope::Official;
        let key = PredictionKey::Slot(74);
        let stray = PredictionValue::Score(Score::new(1, 0));

        store.set(&scope, &key, &stray).await.unwrap();
        let resolved = service.record_winner(&scope, 74, "X", None).await.unwrap();
        assert_eq!(resolved.winner.as_deref(), Some("X"));
        assert_eq!(stored_slot(&store, &scope, 74).await.unwrap().winner.as_deref(), Some("X"));

        store.set(&scope, &key, &stray).await.unwrap();
        assert!(service.clear_winner(&scope, 74).await.unwrap());
        assert_eq!(store.get(&scope, &key).await.unwrap(), None);
        assert!(!service.clear_winner(&scope, 74).await.unwrap());
    }

    /// Reports one key as unreadable until it is deleted.
    struct UnreadableSlotStore {
        inner: MemoryStore,
        unreadable: std::sync::Mutex<Option<PredictionKey>>,
    }

    impl UnreadableSlotStore {
        fn is_unreadable(&self, key: &PredictionKey) -> bool {
            self.unreadable.lock().unwrap().as_ref() == Some(key)
        }
    }

    #[async_trait::async_trait]
    impl PredictionStore for UnreadableSlotStore {
        async fn get(&self, scope: &Scope, key: &PredictionKey) -> StoreResult<Option<PredictionValue>> {
            if self.is_unreadable(key) {
                return Err(StoreError::Corrupt {
                    key: format!("{key:?}"),
                    reason: "unparseable payload".to_string(),
                });
            }
            self.inner.get(scope, key).await
        }

        async fn set(&self, scope: &Scope, key: &PredictionKey, value: &PredictionValue) -> StoreResult<()> {
            self.inner.set(scope, key, value).await
        }

        async fn delete(&self, scope: &Scope, key: &PredictionKey) -> StoreResult<bool> {
            {
                let mut unreadable = self.unreadable.lock().unwrap();
                if unreadable.as_ref() == Some(key) {
                    *unreadable = None;
                    return Ok(true);
                }
            }
            self.inner.delete(scope, key).await
        }

        async fn compare_and_swap(
            &self,
            scope: &Scope,
            key: &PredictionKey,
            expected: Option<&PredictionValue>,
            new: Option<&PredictionValue>,
        ) -> StoreResult<bool> {
            if self.is_unreadable(key) {
                return Ok(false);
            }
            self.inner.compare_and_swap(scope, key, expected, new).await
        }

        async fn entries(&self, scope: &Scope) -> StoreResult<Vec<(PredictionKey, PredictionValue)>> {
            self.inner.entries(scope).await
        }

        async fn clear_scope(&self, scope: &Scope) -> StoreResult<u64> {
            self.inner.clear_scope(scope).await
        }

        async fn create_participant(&self, name: &str) -> StoreResult<Participant> {
            self.inner.create_participant(name).await
        }

        async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
            self.inner.list_participants().await
        }

        async fn get_participant(&self, id: &str) -> StoreResult<Option<Participant>> {
            self.inner.get_participant(id).await
        }
    }

    #[tokio::test]
    async fn test_unreadable_slot_value_is_dropped() {
        let scope = Scope::Official;
        let unreadable = || UnreadableSlotStore {
            inner: MemoryStore::new(),
            unreadable: std::sync::Mutex::new(Some(PredictionKey::Slot(74))),
        };

        let service = PoolService::new(literal_format(), Arc::new(unreadable())).unwrap();
        let resolved = service.record_winner(&scope, 74, "Y", None).await.unwrap();
        assert_eq!(resolved.winner.as_deref(), Some("Y"));

        let service = PoolService::new(literal_format(), Arc::new(unreadable())).unwrap();
        assert!(service.clear_winner(&scope, 74).await.unwrap());
        assert!(!service.clear_winner(&scope, 74).await.unwrap());
    }

    #[tokio::test]
    async fn test_first_round_waits_for_group_stage() {
        let format = TournamentFormat::world_cup_2026().unwrap();
        let results = draw_order_results(&format);
        let (service, _) = setup(format);
        let scope = Scope::Official;

        let mut all: Vec<(MatchId, Score)> = results.results().map(|(id, s)| (id.clone(), *s)).collect();
        let (last_id, last_score) = all.pop().unwrap();
        for (id, score) in &all {
            service.submit_result(&scope, id, score.home, score.away).await.unwrap();
        }

        let round = service.generate_round(&scope, "R32").await.unwrap();
        assert_eq!(round.blocked, Some(RoundBlock::GroupStageIncomplete { missing_results: 1 }));
        assert_eq!(round.teams().count(), 0);

        service
            .submit_result(&scope, &last_id, last_score.home, last_score.away)
            .await
            .unwrap();
        let round = service.generate_round(&scope, "R32").await.unwrap();
        assert_eq!(round.blocked, None);
        assert_eq!(round.teams().count(), 32);
        assert!(service.qualification(&scope).await.unwrap().is_determined());
    }

    #[tokio::test]
    async fn test_group_change_invalidates_first_round_pick() {
        let format = TournamentFormat::world_cup_2026().unwrap();
        let results = draw_order_results(&format);
        let decider = format
            .group("E")
            .and_then(|group| {
                group.matches.iter().find(|m| {
                    [m.home.as_str(), m.away.as_str()].contains(&"Alemania")
                        && [m.home.as_str(), m.away.as_str()].contains(&"Curazao")
                })
            })
            .cloned()
            .unwrap();
        let (service, store) = setup(format);
        let scope = Scope::Official;
        for (id, score) in results.results() {
            service.submit_result(&scope, id, score.home, score.away).await.unwrap();
        }
        service.record_winner(&scope, 74, "Alemania", None).await.unwrap();

        let upset = if decider.home == "Curazao" { (5, 0) } else { (0, 5) };
        service
            .submit_result(&scope, &decider.id(), upset.0, upset.1)
            .await
            .unwrap();

        let m74 = service.resolve_slot(&scope, 74).await.unwrap();
        assert_eq!(m74.home, team("Curazao"));
        assert_eq!(m74.winner, None);
        let stored = stored_slot(&store, &scope, 74).await.unwrap();
        assert_eq!(stored.home, team("Curazao"));
        assert_eq!(stored.winner, None);
    }

    #[tokio::test]
    async fn test_reset_scope() {
        let (service, _) = setup(TournamentFormat::world_cup_2026().unwrap());
        let ana = service.create_participant("Ana").await.unwrap();
        let opener = MatchId::new("México", "Sudáfrica");
        service.submit_result(&ana.scope(), &opener, 1, 1).await.unwrap();

        assert_eq!(service.reset(&ana.scope()).await.unwrap(), 1);
        assert!(service.snapshot(&ana.scope()).await.unwrap().result(&opener).is_none());
        assert!(!service.clear_result(&ana.scope(), &opener).await.unwrap());
    }

    #[tokio::test]
    async fn test_leaderboard_combines_group_and_knockout_points() {
        let (service, _) = setup(literal_format());
        let ana = service.create_participant("Ana").await.unwrap();
        let bruno = service.create_participant("Bruno").await.unwrap();

        let official = [(74, "X"), (77, "Z"), (75, "P"), (78, "R"), (89, "X"), (90, "P"), (104, "X")];
        record_all(&service, &Scope::Official, &official).await;
        record_all(&service, &ana.scope(), &official).await;
        record_all(
            &service,
            &bruno.scope(),
            &[(74, "Y"), (77, "Z"), (75, "P"), (78, "R"), (89, "Z"), (90, "R"), (104, "R")],
        )
        .await;

        let ana_score = service.participant_score(&ana.id).await.unwrap();
        assert_eq!(ana_score.knockout.champion_bonus, 4);
        assert_eq!(ana_score.total, 8 * 4 + 4 * 5 + 2 * 6 + 4);

        let board = service.leaderboard().await.unwrap();
        assert_eq!(board[0].name, "Ana");
        assert_eq!(board[1].name, "Bruno");
        assert_eq!(board[1].total, 8 * 4 + 3 * 5);
    }

    #[tokio::test]
    async fn test_exact_hitters_and_breakdown() {
        let (service, _) = setup(TournamentFormat::world_cup_2026().unwrap());
        let ana = service.create_participant("Ana").await.unwrap();
        let bruno = service.create_participant("Bruno").await.unwrap();
        let opener = MatchId::new("México", "Sudáfrica");

        assert!(service.exact_hitters(&opener).await.unwrap().is_empty());

        service.submit_result(&Scope::Official, &opener, 2, 0).await.unwrap();
        service.submit_result(&ana.scope(), &opener, 2, 0).await.unwrap();
        service.submit_result(&bruno.scope(), &opener, 1, 0).await.unwrap();

        let hitters = service.exact_hitters(&opener).await.unwrap();
        assert_eq!(hitters, vec![ana.clone()]);

        let rows = service.match_breakdown(&bruno.id).await.unwrap();
        let row = rows.iter().find(|r| r.match_id == opener).unwrap();
        assert_eq!(row.points, 2);
        assert_eq!(row.predicted, Some(Score::new(1, 0)));
    }

    #[tokio::test]
    async fn test_duplicate_participant() {
        let (service, _) = setup(literal_format());
        service.create_participant("Ana").await.unwrap();
        let err = service.create_participant(" Ana ").await.unwrap_err();
        assert!(matches!(err, EngineError::Store(crate::store::StoreError::DuplicateParticipant(_))));
    }
}
