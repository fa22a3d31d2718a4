pub mod file;
pub mod http;

use std::path::Path;

use tournament::TournamentFormat;

pub use file::FileFeed;
pub use http::HttpFeed;

use crate::error::{FeedError, Result};
use crate::traits::ResultFeed;

/// Picks a feed for `source`: an `http(s)://` URL or a local JSON file.
pub fn open_feed(source: &str) -> Result<Box<dyn ResultFeed>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Box::new(HttpFeed::new(source)?))
    } else {
        Ok(Box::new(FileFeed::new(source)))
    }
}

/// Loads and validates a format document, or the embedded 2026 format.
pub fn load_format(path: Option<&Path>) -> Result<TournamentFormat> {
    let Some(path) = path else {
        return Ok(TournamentFormat::world_cup_2026()?);
    };
    let json = std::fs::read_to_string(path).map_err(|source| FeedError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    Ok(TournamentFormat::from_json(&json)?)
}
