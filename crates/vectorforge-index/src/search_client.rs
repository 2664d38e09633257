use serde_json::Value;

use crate::error::IndexError;

/// The minimal REST surface this core depends on: bulk indexing, truncation,
/// and index existence/creation. Full query-DSL building is out of scope.
pub struct SearchClusterClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: Option<String>,
}

impl SearchClusterClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_auth_header(base_url, None)
    }

    pub fn with_auth_header(base_url: impl Into<String>, auth_header: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            auth_header,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if let Some(header) = &self.auth_header {
            builder = builder.header("authorization", header);
        }
        builder
    }

    /// `POST /_bulk` with a newline-delimited body. Returns the raw parsed
    /// JSON response for the caller to triage with [`crate::parse_bulk_errors`].
    pub async fn bulk_index(&self, ndjson_body: String) -> Result<Value, IndexError> {
        let response = self
            .request(reqwest::Method::POST, "/_bulk")
            .header("content-type", "application/x-ndjson")
            .body(ndjson_body)
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))
    }

    /// `POST /<index>/_delete_by_query` with a `match_all` query, to truncate
    /// an index. Confirmation is the caller's concern.
    pub async fn truncate(&self, index: &str) -> Result<(), IndexError> {
        self.request(
            reqwest::Method::POST,
            &format!("/{index}/_delete_by_query"),
        )
        .json(&serde_json::json!({ "query": { "match_all": {} } }))
        .send()
        .await
        .map_err(|e| IndexError::Transport(e.to_string()))?;
        Ok(())
    }

    pub async fn index_exists(&self, index: &str) -> Result<bool, IndexError> {
        let response = self
            .request(reqwest::Method::HEAD, &format!("/{index}"))
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;
        Ok(response.status().is_success())
    }

    pub async fn create_index(&self, index: &str, body: Value) -> Result<(), IndexError> {
        self.request(reqwest::Method::PUT, &format!("/{index}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;
        Ok(())
    }
}
