//! Reqwest-backed remote store.
//!
//! Speaks a plain REST document protocol: `GET/DELETE {base}/{collection}`
//! for whole collections and `GET/PUT/DELETE {base}/{collection}/{key}` for
//! single documents. Collections owned by a user sit under
//! `{base}/users/{user id}/{collection}`. The adapter owns transport details
//! only: URL building, timeout and status mapping, and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;

use crate::domain::ports::{RemoteStore, RemoteStoreError};
use crate::domain::{CollectionPath, EntityKey, USERS_SEGMENT};

/// Errors raised while building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpRemoteStoreBuildError {
    /// The base URL cannot have path segments appended.
    #[error("remote base URL {url} cannot be used as a base")]
    InvalidBase { url: Url },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Remote store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base: Url,
}

impl HttpRemoteStore {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when `base` cannot carry a path or the client cannot
    /// be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, HttpRemoteStoreBuildError> {
        if base.cannot_be_a_base() {
            return Err(HttpRemoteStoreBuildError::InvalidBase { url: base });
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn endpoint(
        &self,
        path: &CollectionPath,
        key: Option<&EntityKey>,
    ) -> Result<Url, RemoteStoreError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                RemoteStoreError::unavailable(format!("invalid remote base URL {}", self.base))
            })?;
            segments.pop_if_empty();
            if let Some(owner) = path.owner() {
                segments.push(USERS_SEGMENT).push(owner.as_str());
            }
            segments.push(path.collection().as_str());
            if let Some(key) = key {
                segments.push(key.as_str());
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, RemoteStoreError> {
        request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<Option<Value>, RemoteStoreError> {
        let url = self.endpoint(path, Some(key))?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = success_body(response).await?;
        parse_document(&body).map(Some)
    }

    async fn get_all(&self, path: &CollectionPath) -> Result<Vec<Value>, RemoteStoreError> {
        let url = self.endpoint(path, None)?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let body = success_body(response).await?;
        parse_collection(&body)
    }

    async fn put(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
        document: &Value,
    ) -> Result<(), RemoteStoreError> {
        let url = self.endpoint(path, Some(key))?;
        let response = self.send(self.client.put(url).json(document)).await?;
        success_body(response).await.map(drop)
    }

    async fn delete(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<(), RemoteStoreError> {
        let url = self.endpoint(path, Some(key))?;
        let response = self.send(self.client.delete(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        success_body(response).await.map(drop)
    }

    async fn clear(&self, path: &CollectionPath) -> Result<(), RemoteStoreError> {
        let url = self.endpoint(path, None)?;
        let response = self.send(self.client.delete(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        success_body(response).await.map(drop)
    }
}

async fn success_body(response: Response) -> Result<Vec<u8>, RemoteStoreError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    Ok(body.to_vec())
}

fn parse_document(body: &[u8]) -> Result<Value, RemoteStoreError> {
    serde_json::from_slice(body)
        .map_err(|error| RemoteStoreError::decode(format!("invalid JSON document: {error}")))
}

fn parse_collection(body: &[u8]) -> Result<Vec<Value>, RemoteStoreError> {
    match parse_document(body)? {
        Value::Array(documents) => Ok(documents),
        other => Err(RemoteStoreError::decode(format!(
            "expected a JSON array of documents, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn map_transport_error(error: reqwest::Error) -> RemoteStoreError {
    if error.is_timeout() {
        RemoteStoreError::unavailable(format!("request timed out: {error}"))
    } else {
        RemoteStoreError::unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RemoteStoreError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned()
    } else {
        preview
    };
    RemoteStoreError::rejected(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
