//! REST client for the metadata store.

use crate::{MetadataStore, Properties};
use async_trait::async_trait;
use marquee_core::CallOutcome;
use marquee_error::{MarqueeResult, StoreError, StoreErrorKind};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::{Value as JsonValue, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Metadata store reached over HTTP.
///
/// | Operation    | Request                                      |
/// |--------------|----------------------------------------------|
/// | `set`        | `PUT {base}/items/{ref}/properties/{key}`    |
/// | `get`        | `GET {base}/items/{ref}/properties/{key}`    |
/// | `delete`     | `DELETE {base}/items/{ref}/properties/{key}` |
/// | `merge`      | `PATCH {base}/items/{ref}/properties`        |
/// | `fetch_all`  | `GET {base}/items/{ref}/properties`          |
/// | `add_to_set` | `POST {base}/items/{ref}/sets/{name}`        |
///
/// A 404 maps to [`CallOutcome::NotFound`]; every other failure maps to
/// [`CallOutcome::Transient`].
#[derive(Debug, Clone)]
pub struct HttpMetadataStore {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpMetadataStore {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL cannot serve as a base or the client cannot be built.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> MarqueeResult<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            StoreError::new(StoreErrorKind::ClientCreation(format!(
                "invalid base URL {base_url}: {e}"
            )))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(StoreError::new(StoreErrorKind::ClientCreation(format!(
                "{base_url} cannot be used as a base URL"
            )))
            .into());
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::new(StoreErrorKind::ClientCreation(e.to_string())))?;

        debug!(base_url = %parsed, "Created metadata store client");
        Ok(Self {
            client,
            base_url: parsed,
            token,
        })
    }

    /// URL for `items/{ref}/<tail...>`, one encoded segment per part.
    pub(crate) fn url_for(&self, item_ref: &str, tail: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StoreError::new(StoreErrorKind::ClientCreation(self.base_url.to_string()))
            })?;
            segments.pop_if_empty().push("items").push(item_ref);
            segments.extend(tail);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::new(StoreErrorKind::Transport(e.to_string())))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::new(StoreErrorKind::HttpStatus {
            status_code: status.as_u16(),
            message,
        }))
    }

    async fn execute(
        &self,
        operation: &str,
        request: Result<RequestBuilder, StoreError>,
    ) -> CallOutcome<Response> {
        let result = match request {
            Ok(request) => self.send(request).await,
            Err(e) => Err(e),
        };
        into_outcome(operation, result)
    }
}

fn into_outcome<T>(operation: &str, result: Result<T, StoreError>) -> CallOutcome<T> {
    match result {
        Ok(value) => CallOutcome::Success(value),
        Err(StoreError {
            kind: StoreErrorKind::HttpStatus { status_code, .. },
            ..
        }) if status_code == StatusCode::NOT_FOUND.as_u16() => CallOutcome::NotFound,
        Err(e) => {
            warn!(operation, error = %e, "Metadata store call failed");
            CallOutcome::Transient(e.kind.to_string())
        }
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    operation: &str,
    outcome: CallOutcome<Response>,
) -> CallOutcome<T> {
    match outcome {
        CallOutcome::Success(response) => {
            let result = response
                .json::<T>()
                .await
                .map_err(|e| StoreError::new(StoreErrorKind::Parse(e.to_string())));
            into_outcome(operation, result)
        }
        CallOutcome::NotFound => CallOutcome::NotFound,
        CallOutcome::Transient(reason) => CallOutcome::Transient(reason),
    }
}

#[async_trait]
impl MetadataStore for HttpMetadataStore {
    #[instrument(skip(self, value))]
    async fn set(&self, item_ref: &str, key: &str, value: &JsonValue) -> CallOutcome<()> {
        let request = self
            .url_for(item_ref, &["properties", key])
            .map(|url| self.request(Method::PUT, url).json(value));
        self.execute("set", request).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn get(&self, item_ref: &str, key: &str) -> CallOutcome<JsonValue> {
        let request = self
            .url_for(item_ref, &["properties", key])
            .map(|url| self.request(Method::GET, url));
        decode("get", self.execute("get", request).await).await
    }

    #[instrument(skip(self, properties), fields(keys = properties.len()))]
    async fn merge(&self, item_ref: &str, properties: &Properties) -> CallOutcome<()> {
        let request = self
            .url_for(item_ref, &["properties"])
            .map(|url| self.request(Method::PATCH, url).json(properties));
        self.execute("merge", request).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn delete(&self, item_ref: &str, key: &str) -> CallOutcome<()> {
        let request = self
            .url_for(item_ref, &["properties", key])
            .map(|url| self.request(Method::DELETE, url));
        self.execute("delete", request).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn add_to_set(&self, item_ref: &str, set: &str, value: &str) -> CallOutcome<()> {
        let request = self
            .url_for(item_ref, &["sets", set])
            .map(|url| self.request(Method::POST, url).json(&json!({ "value": value })));
        self.execute("add_to_set", request).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn fetch_all(&self, item_ref: &str) -> CallOutcome<Properties> {
        let request = self
            .url_for(item_ref, &["properties"])
            .map(|url| self.request(Method::GET, url));
        decode("fetch_all", self.execute("fetch_all", request).await).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str) -> HttpMetadataStore {
        HttpMetadataStore::new(base, None, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_property_url() {
        let url = store("http://store.local/api/")
            .url_for("a1b2", &["properties", "title.original"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://store.local/api/items/a1b2/properties/title.original"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        let url = store("http://store.local")
            .url_for("dir/file name", &["sets", "genres"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://store.local/items/dir%2Ffile%20name/sets/genres"
        );
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(HttpMetadataStore::new("not a url", None, Duration::from_secs(1)).is_err());
        assert!(HttpMetadataStore::new("mailto:x@y", None, Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_status_mapping() {
        let missing: Result<(), _> = Err(StoreError::new(StoreErrorKind::HttpStatus {
            status_code: 404,
            message: String::new(),
        }));
        assert_eq!(into_outcome("t", missing), CallOutcome::NotFound);

        let busy: Result<(), _> = Err(StoreError::new(StoreErrorKind::HttpStatus {
            status_code: 503,
            message: "busy".to_string(),
        }));
        assert!(matches!(into_outcome("t", busy), CallOutcome::Transient(_)));
    }
}
