pub mod bracket;
pub mod leaderboard;
pub mod participants;
pub mod predictions;
pub mod standings;

use tournament::Scope;

use crate::error::WebError;

/// Parses the `{scope}` path segment: a participant id or `official`.
pub fn parse_scope(raw: &str) -> Result<Scope, WebError> {
    raw.parse().map_err(WebError::BadRequest)
}
