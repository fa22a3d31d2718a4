use crate::Result;
use crate::models::ResultsDocument;

/// A source of officially confirmed group-stage results.
#[async_trait::async_trait]
pub trait ResultFeed: Send + Sync {
    async fn fetch(&self) -> Result<ResultsDocument>;

    /// Human readable origin, for logs.
    fn describe(&self) -> String;
}
