//! HTTPS `Source` backend.

use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::error::{EptError, EptResult};

/// Fetches dataset files over HTTPS, rooted at a base URL.
pub struct HttpSource {
    client: Client,
    root: Url,
}

impl HttpSource {
    pub fn new(uri: &str) -> EptResult<Self> {
        let root = Url::parse(uri).map_err(|e| EptError::UnknownScheme(e.to_string()))?;
        Ok(Self {
            client: Client::new(),
            root,
        })
    }

    #[must_use]
    pub fn with_client(client: Client, root: Url) -> Self {
        Self { client, root }
    }

    fn join(&self, path: &str) -> EptResult<Url> {
        self.root
            .join(&format!("{}/{path}", self.root.path().trim_end_matches('/')))
            .map_err(|e| EptError::UnknownScheme(e.to_string()))
    }

    async fn fetch(&self, path: &str) -> EptResult<Bytes> {
        let url = self.join(path)?;
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(EptError::from)
            .map_err(|e| e.into_fetch_failed(url.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(
                EptError::MalformedInfo(format!("unexpected status {}", response.status()))
                    .into_fetch_failed(url.to_string()),
            );
        }

        response
            .bytes()
            .await
            .map_err(EptError::from)
            .map_err(|e| e.into_fetch_failed(url.to_string()))
    }

    pub async fn get_json(&self, path: &str) -> EptResult<Value> {
        let bytes = self.fetch(path).await?;
        serde_json::from_slice(&bytes).map_err(EptError::from)
    }

    pub async fn get_bytes(&self, path: &str) -> EptResult<Bytes> {
        self.fetch(path).await
    }
}
