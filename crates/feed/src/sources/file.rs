use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{FeedError, Result};
use crate::models::ResultsDocument;
use crate::traits::ResultFeed;

/// Results exported to a JSON file on disk.
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultFeed for FileFeed {
    async fn fetch(&self) -> Result<ResultsDocument> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FeedError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_results_file() {
        let path = std::env::temp_dir().join(format!("porra-feed-{}.json", std::process::id()));
        tokio::fs::write(
            &path,
            r#"{"results": [{"home": "México", "away": "Sudáfrica", "home_goals": 1, "away_goals": 1}]}"#,
        )
        .await
        .unwrap();

        let document = FileFeed::new(&path).fetch().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(document.results.len(), 1);
        assert_eq!(document.results[0].home_goals, Some(1));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let err = FileFeed::new("/nonexistent/results.json")
            .fetch()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/results.json"));
    }
}
