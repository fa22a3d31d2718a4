use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::SlotKey;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid result {home}-{away}: goal counts must be between 0 and 99")]
    InvalidResult { home: i32, away: i32 },

    #[error("Slot {slot} is not ready yet ({home} vs {away})")]
    UnresolvedSlotReference {
        slot: SlotKey,
        home: String,
        away: String,
    },

    #[error("'{choice}' does not play in slot {slot} ({home} vs {away})")]
    UnknownWinnerChoice {
        slot: SlotKey,
        choice: String,
        home: String,
        away: String,
    },

    #[error("Group {group} has {played} of {expected} results")]
    IncompleteGroupData {
        group: String,
        played: usize,
        expected: usize,
    },

    #[error("Unknown match '{0}'")]
    UnknownMatch(String),

    #[error("Unknown slot {0}")]
    UnknownSlot(SlotKey),

    #[error("Unknown round '{0}'")]
    UnknownRound(String),

    #[error("Unknown group '{0}'")]
    UnknownGroup(String),

    #[error("Unknown participant '{0}'")]
    UnknownParticipant(String),

    #[error("Predictions are locked since {0}")]
    PredictionsLocked(DateTime<Utc>),

    #[error("Concurrent update on {0}, please retry")]
    WriteConflict(String),

    #[error("Invalid tournament format: {0}")]
    InvalidFormat(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// True for errors caused by the caller's input rather than by the backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidResult { .. }
                | EngineError::UnresolvedSlotReference { .. }
                | EngineError::UnknownWinnerChoice { .. }
                | EngineError::IncompleteGroupData { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownMatch(_)
                | EngineError::UnknownSlot(_)
                | EngineError::UnknownRound(_)
                | EngineError::UnknownGroup(_)
                | EngineError::UnknownParticipant(_)
        )
    }
}
