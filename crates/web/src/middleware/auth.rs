use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::WebError;

/// Guards writes to the `official` scope behind a bearer API key.
/// Participant scopes pass through.
pub async fn require_official_auth(
    State(api_keys): State<ApiKeys>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Response {
    if params.get("scope").map(String::as_str) != Some("official") {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if api_keys.is_valid(token.trim()) => next.run(request).await,
        Some(_) => {
            tracing::warn!("Invalid API key attempt");
            WebError::Unauthorized.into_response()
        }
        None => WebError::Unauthorized.into_response(),
    }
}

#[derive(Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_comma_separated_keys() {
        let keys = ApiKeys::from_comma_separated(" alpha, ,beta ");
        assert!(keys.is_valid("alpha"));
        assert!(keys.is_valid("beta"));
        assert!(!keys.is_valid(""));
        assert!(ApiKeys::from_comma_separated("").is_empty());
    }
}
