pub mod format;
pub mod prediction;
pub mod score;
pub mod standing;

pub use format::{
    GroupMatch, GroupSpec, KnockoutSpec, MatchId, PointsTable, QualifierRef, RoundSpec, SlotKey,
    SlotReference, SlotSpec, TournamentFormat,
};
pub use prediction::{
    Occupant, Participant, PredictionKey, PredictionSet, PredictionValue, Scope, SlotRecord,
};
pub use score::{MAX_GOALS, Outcome, Score};
pub use standing::{GroupTable, StandingRow, TableStatus, Zone};
