//! Shared-secret gate in front of every route.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use super::{ApiError, AppState};

/// Header callers put the server secret in.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject the request unless `x-api-key` equals the configured secret.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let verdict = match request.headers().get(API_KEY_HEADER) {
        None => Err("missing"),
        Some(value) => match value.to_str() {
            Ok(key) if secrets_match(key, &state.secret) => Ok(()),
            _ => Err("wrong"),
        },
    };

    match verdict {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            tracing::warn!(path = %request.uri().path(), reason, "rejected request: api key");
            ApiError::Unauthorized.into_response()
        }
    }
}

/// Length-independent byte comparison so timing does not reveal a prefix match.
fn secrets_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_compare_exactly() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cre", "s3cret"));
        assert!(!secrets_match("s3cret!", "s3cret"));
        assert!(!secrets_match("S3CRET", "s3cret"));
        assert!(!secrets_match("", "s3cret"));
    }
}
