pub mod bracket;
pub mod leaderboard;
pub mod pool;
pub mod presence;
pub mod qualification;
pub mod scoring;
pub mod standings;

pub use bracket::{BracketGraph, BracketResolver, ResolvedBracket, ResolvedRound, ResolvedSlot, RoundBlock};
pub use leaderboard::{GroupStageScore, LeaderboardEntry, MatchBreakdown, ParticipantScore};
pub use pool::PoolService;
pub use presence::{KnockoutScore, RoundPresence};
pub use qualification::{Qualification, ThirdPlaceAllocation, ThirdPlaceCandidate};
