//! HTTP source of badge snapshots.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::notify::counts::UnreadCounts;

/// Errors from fetching a badge snapshot.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Cannot reach the clinic server at {0}")]
    Unreachable(String),
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("Server returned status {0}")]
    Status(u16),
    #[error("Malformed counts payload: {0}")]
    Decode(String),
}

/// Source of badge snapshots.
///
/// The polling client only sees this seam, so tests can swap in a
/// scripted source instead of a live server.
pub trait CountsFetcher: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, Result<UnreadCounts, FetchError>>;
}

impl<F: CountsFetcher + ?Sized> CountsFetcher for Arc<F> {
    fn fetch(&self) -> BoxFuture<'_, Result<UnreadCounts, FetchError>> {
        (**self).fetch()
    }
}

/// Fetches `GET /unread-counts` from the clinic API.
pub struct HttpCountsFetcher {
    base_url: String,
    client: reqwest::Client,
    bearer: Option<String>,
}

impl HttpCountsFetcher {
    /// Create a fetcher pointing at the clinic API base URL.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            bearer: None,
        }
    }

    /// Attach a session token sent as a bearer credential on every fetch.
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl CountsFetcher for HttpCountsFetcher {
    fn fetch(&self) -> BoxFuture<'_, Result<UnreadCounts, FetchError>> {
        Box::pin(async move {
            let url = format!("{}/unread-counts", self.base_url);
            let mut request = self.client.get(&url);
            if let Some(token) = &self.bearer {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(|e| {
                if e.is_connect() {
                    FetchError::Unreachable(self.base_url.clone())
                } else if e.is_timeout() {
                    FetchError::Transport("request timed out".to_string())
                } else {
                    FetchError::Transport(e.to_string())
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            response
                .json::<UnreadCounts>()
                .await
                .map_err(|e| FetchError::Decode(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let fetcher = HttpCountsFetcher::new("http://localhost:8080/");
        assert_eq!(fetcher.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_unreachable() {
        // Port 1 is never listening; the connection is refused immediately.
        let fetcher = HttpCountsFetcher::new("http://127.0.0.1:1");
        let err = fetcher.fetch().await.unwrap_err();
        assert!(
            matches!(err, FetchError::Unreachable(_)),
            "expected Unreachable, got {err:?}"
        );
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = FetchError::Unreachable("http://127.0.0.1:1".to_string());
        assert!(err.to_string().contains("http://127.0.0.1:1"));

        let err = FetchError::Status(500);
        assert!(err.to_string().contains("500"));
    }
}
