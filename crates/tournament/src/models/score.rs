use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Goals scored by each side of a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub home: i32,
    pub away: i32,
}

/// Upper bound on goals accepted from any input path.
pub const MAX_GOALS: i32 = 99;

impl Score {
    pub const fn new(home: i32, away: i32) -> Self {
        Self { home, away }
    }

    /// Builds a score from user input. Negative or implausibly large goal
    /// counts are rejected here, before they can reach the table calculator.
    pub fn checked(home: i32, away: i32) -> Result<Self> {
        if !(0..=MAX_GOALS).contains(&home) || !(0..=MAX_GOALS).contains(&away) {
            return Err(EngineError::InvalidResult { home, away });
        }
        Ok(Self { home, away })
    }

    pub fn is_valid(&self) -> bool {
        (0..=MAX_GOALS).contains(&self.home) && (0..=MAX_GOALS).contains(&self.away)
    }

    /// Sign of the goal difference, compared without subtraction so it stays
    /// total over the whole `i32` range.
    pub fn outcome(&self) -> Outcome {
        match self.home.cmp(&self.away) {
            Ordering::Greater => Outcome::HomeWin,
            Ordering::Equal => Outcome::Draw,
            Ordering::Less => Outcome::AwayWin,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}
