//! HTTP client for the DocGenie backend
//!
//! Wraps reqwest::Client with a base origin, JSON bodies and uniform status
//! checking. Every failure comes back as an [`ApiError`].

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Errors from talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid server URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Connection-level failure (the server never answered).
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }

    /// HTTP status for non-ok responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client bound to one backend origin.
#[derive(Clone)]
pub struct DocGenieClient {
    http: reqwest::Client,
    base: Url,
}

impl DocGenieClient {
    /// Build a client for the given origin, e.g. "http://127.0.0.1:8888".
    pub fn new(server_url: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(server_url).map_err(|source| ApiError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })?;
        // Url::join drops the last path segment unless it ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidUrl {
                url: format!("{}{}", self.base, path),
                source,
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        tracing::debug!("{} {}", method, url);

        let mut req = self
            .http
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        check_response(resp, url.as_str()).await
    }

    /// GET a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path, &[])?;
        let resp = self.send::<()>(Method::GET, url.clone(), None).await?;
        decode(resp, &url).await
    }

    /// POST a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        let resp = self.send(Method::POST, url.clone(), Some(body)).await?;
        decode(resp, &url).await
    }

    /// POST with query parameters and no body.
    pub async fn post_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        let resp = self.send::<()>(Method::POST, url.clone(), None).await?;
        decode(resp, &url).await
    }

    /// PUT a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        let resp = self.send(Method::PUT, url.clone(), Some(body)).await?;
        decode(resp, &url).await
    }

    /// DELETE with a JSON body. The response body is ignored.
    pub async fn delete<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let url = self.url(path, &[])?;
        self.send(Method::DELETE, url, Some(body)).await?;
        Ok(())
    }
}

/// Turn any non-success status into [`ApiError::Status`].
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }
    Ok(resp)
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response, url: &Url) -> Result<T, ApiError> {
    resp.json().await.map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}
