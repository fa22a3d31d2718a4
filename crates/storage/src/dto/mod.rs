pub mod bracket;
pub mod format;
pub mod groups;
pub mod leaderboard;
pub mod participant;
pub mod prediction;
