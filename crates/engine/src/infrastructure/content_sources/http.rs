//! Catalog content fetched over HTTP.

use async_trait::async_trait;

use crate::infrastructure::ports::{ContentError, ContentPort};

/// Fetches catalog documents from a remote base URL.
///
/// No internal retry: catalog loads fail loudly and callers decide retry
/// policy.
pub struct HttpContentSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ContentPort for HttpContentSource {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value, ContentError> {
        let url = self.url_for(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ContentError::Unavailable(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            return Err(ContentError::Unavailable(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ContentError::Malformed {
                path: path.to_string(),
                detail: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_duplicate_slashes() {
        let source = HttpContentSource::new("https://content.example.com/catalogs/");
        assert_eq!(
            source.url_for("/stages.json"),
            "https://content.example.com/catalogs/stages.json"
        );
    }
}
