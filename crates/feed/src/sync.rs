use tournament::{PoolService, Scope};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::ResultsDocument;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub recorded: usize,
    pub cleared: usize,
    pub unchanged: usize,
    /// Entries naming a match the format does not schedule.
    pub skipped: usize,
    /// Entries with an unusable score.
    pub rejected: usize,
}

/// Writes a feed's results into the official scope. Each changed result goes
/// through the pool so the official bracket is recomputed.
pub struct ResultSync<'a> {
    pool: &'a PoolService,
}

impl<'a> ResultSync<'a> {
    pub fn new(pool: &'a PoolService) -> Self {
        Self { pool }
    }

    pub async fn apply(&self, document: &ResultsDocument) -> Result<SyncReport> {
        let scope = Scope::Official;
        let current = self.pool.snapshot(&scope).await?;
        let mut report = SyncReport::default();

        for entry in &document.results {
            let match_id = entry.match_id();
            if self.pool.format().find_match(&match_id).is_none() {
                warn!("Skipping unknown match '{}'", match_id);
                report.skipped += 1;
                continue;
            }

            let score = match entry.score() {
                Ok(score) => score,
                Err(e) => {
                    warn!("Rejecting result for '{}': {}", match_id, e);
                    report.rejected += 1;
                    continue;
                }
            };

            match score {
                Some(score) if current.result(&match_id) == Some(score) => {
                    debug!("'{}' already at {}", match_id, score);
                    report.unchanged += 1;
                }
                Some(score) => {
                    self.pool
                        .submit_result(&scope, &match_id, score.home, score.away)
                        .await?;
                    report.recorded += 1;
                }
                None => {
                    if self.pool.clear_result(&scope, &match_id).await? {
                        report.cleared += 1;
                    } else {
                        report.unchanged += 1;
                    }
                }
            }
        }

        info!(
            "Sync done: {} recorded, {} cleared, {} unchanged, {} skipped, {} rejected",
            report.recorded, report.cleared, report.unchanged, report.skipped, report.rejected
        );
        Ok(report)
    }
}
